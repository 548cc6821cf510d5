use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("word data unavailable from {path}: {reason}")]
    DataUnavailable { path: String, reason: String },
    #[error("column '{0}' is missing from the header row")]
    MissingColumn(&'static str),
    #[error("worksheet has no header row")]
    EmptySheet,
}

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("speech engine failed to initialize: {0}")]
    Init(String),
    #[error("voice #{wanted} requested but only {available} voice(s) installed")]
    NoVoice { wanted: usize, available: usize },
    #[error("speech synthesis failed: {0}")]
    Synthesis(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ControllerError {
    #[error("a narration session is already {0}")]
    Busy(&'static str),
    #[error("no narration session is active")]
    NotPlaying,
    #[error("narration is stopping")]
    Stopping,
    #[error("failed to spawn narration worker: {0}")]
    Spawn(String),
}

/// Errors surfaced by HTTP handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}
