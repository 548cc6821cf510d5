use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::services::catalog::{Catalog, SelectionOptions};
use crate::services::narrator::Narrator;

/// Application state shared across all handlers
pub struct AppState {
    pub catalog: Catalog,
    pub options: SelectionOptions,
    pub narrator: Narrator,
}

impl AppState {
    pub fn new(catalog: Catalog, narrator: Narrator) -> Self {
        let options = catalog.options();
        AppState { catalog, options, narrator }
    }
}

/// Body of `POST /get_words`. Fields may arrive as strings or numbers.
#[derive(Deserialize)]
pub struct WordsQuery {
    pub grade: Option<Value>,
    pub semester: Option<Value>,
    pub model: Option<Value>,
    pub unit: Option<Value>,
    pub category: Option<Value>,
}

#[derive(Deserialize)]
pub struct PlayItem {
    #[serde(rename = "English")]
    pub english: String,
}

#[derive(Deserialize)]
pub struct PlayRequest {
    pub words: Vec<PlayItem>,
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_word: Option<usize>,
}

impl StatusResponse {
    pub fn plain(status: &'static str) -> Self {
        StatusResponse { status, current_word: None }
    }

    pub fn at(status: &'static str, current_word: usize) -> Self {
        StatusResponse { status, current_word: Some(current_word) }
    }
}
