use actix_web::{get, post, web, HttpResponse, Responder};
use log::info;
use serde_json::Value;
use crate::errors::ApiError;
use crate::models::{AppState, WordsQuery};
use crate::services::catalog::FilterQuery;

const PAGE: &str = include_str!("../../templates/index.html");

/// Text form of a request field, matching how sheet cells are normalized
fn field_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && n.is_f64() => Some(format!("{}", f as i64)),
            _ => Some(n.to_string()),
        },
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn required(value: &Option<Value>, name: &str) -> Result<String, ApiError> {
    value
        .as_ref()
        .and_then(field_text)
        .ok_or_else(|| ApiError::BadRequest(format!("missing or invalid field '{}'", name)))
}

#[get("/")]
pub async fn index(data: web::Data<AppState>) -> impl Responder {
    let options = serde_json::to_string(&data.options)
        .unwrap_or_else(|_| "{}".to_string())
        .replace("</", "<\\/");

    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(PAGE.replace("__OPTIONS__", &options))
}

#[get("/options")]
pub async fn get_options(data: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(&data.options)
}

#[post("/get_words")]
pub async fn get_words(
    data: web::Data<AppState>,
    body: web::Json<WordsQuery>,
) -> Result<HttpResponse, ApiError> {
    let grade = required(&body.grade, "grade")?;
    let semester = required(&body.semester, "semester")?;
    let model = required(&body.model, "model")?;
    let unit = required(&body.unit, "unit")?;
    let category = body.category.as_ref().and_then(field_text);

    let entries = data.catalog.filter(&FilterQuery {
        grade: &grade,
        semester: &semester,
        model: &model,
        unit: &unit,
        category: category.as_deref(),
    });

    info!(
        "Filter grade={} semester={} model={} unit={} category={}: {} rows",
        grade,
        semester,
        model,
        unit,
        category.as_deref().unwrap_or("-"),
        entries.len()
    );

    Ok(HttpResponse::Ok().json(entries))
}
