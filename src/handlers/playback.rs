use actix_web::{get, post, web, HttpResponse, Responder};
use log::{info, warn};
use crate::errors::{ApiError, ControllerError};
use crate::models::{AppState, PlayRequest, StatusResponse};
use crate::services::narrator::Status;

#[post("/play_words")]
pub async fn play_words(
    data: web::Data<AppState>,
    body: web::Json<PlayRequest>,
) -> Result<HttpResponse, ApiError> {
    // Blank entries are rejected so `current_word` indexes the list as sent
    let mut words = Vec::with_capacity(body.words.len());
    for (i, item) in body.into_inner().words.into_iter().enumerate() {
        let word = item.english.trim();
        if word.is_empty() {
            return Err(ApiError::BadRequest(format!("word {} has no English text", i)));
        }
        words.push(word.to_string());
    }

    let response = match data.narrator.start(words) {
        Ok(total) => {
            info!("Play request accepted: {} entries", total);
            HttpResponse::Ok().json(StatusResponse::plain("started"))
        }
        Err(ControllerError::Busy(state)) => {
            warn!("Play request rejected: narration already {}", state);
            let current = data.narrator.snapshot().current_word;
            HttpResponse::Conflict().json(StatusResponse::at("busy", current))
        }
        Err(e) => {
            warn!("Play request failed: {}", e);
            HttpResponse::InternalServerError().json(StatusResponse::plain("error"))
        }
    };
    Ok(response)
}

#[post("/stop_words")]
pub async fn stop_words(data: web::Data<AppState>) -> impl Responder {
    match data.narrator.stop() {
        Ok(()) => HttpResponse::Ok().json(StatusResponse::plain("stopped")),
        Err(_) => HttpResponse::Ok().json(StatusResponse::plain("idle")),
    }
}

#[post("/pause_words")]
pub async fn pause_words(data: web::Data<AppState>) -> impl Responder {
    match data.narrator.pause_or_resume() {
        Ok(toggle) => {
            let label = match toggle.status {
                Status::Paused => "paused",
                _ => "resumed",
            };
            HttpResponse::Ok().json(StatusResponse::at(label, toggle.current_word))
        }
        Err(ControllerError::Stopping) => {
            let current = data.narrator.snapshot().current_word;
            HttpResponse::Ok().json(StatusResponse::at("stopping", current))
        }
        Err(_) => HttpResponse::Ok().json(StatusResponse::at("idle", 0)),
    }
}

#[get("/status")]
pub async fn status(data: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(data.narrator.snapshot())
}
