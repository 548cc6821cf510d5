use actix_web::web;
use crate::errors::ApiError;

pub mod playback;
pub mod words;

/// Register every route on an app or test service
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(words::index)
        .service(words::get_options)
        .service(words::get_words)
        .service(playback::play_words)
        .service(playback::stop_words)
        .service(playback::pause_words)
        .service(playback::status);
}

/// Report unreadable JSON bodies as 400 with an `{error}` body
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into())
}
