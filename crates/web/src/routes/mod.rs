use askama::Template;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::error;

use crate::AppState;

pub mod analysis;

const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub title: String,
    pub start_fen: String,
    pub depth: u8,
    pub multipv: u32,
    pub commentary_enabled: bool,
}

/// Error body shaped as `{"detail": "..."}`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    pub fn internal(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: detail.into(),
        }
    }
}

impl From<chess_commentary_core::Error> for ApiError {
    fn from(err: chess_commentary_core::Error) -> Self {
        if err.is_client_error() {
            return Self {
                status: StatusCode::BAD_REQUEST,
                detail: err.public_message(),
            };
        }

        error!("Request failed: {}", err);
        Self::internal(err.public_message())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

pub async fn index(State(state): State<Arc<AppState>>) -> Result<Html<String>, ApiError> {
    let template = IndexTemplate {
        title: "Stockfish + Gemini Chess Analyzer".to_string(),
        start_fen: START_FEN.to_string(),
        depth: state.config.engine.default_depth,
        multipv: state.config.engine.default_multipv,
        commentary_enabled: state.commentator.is_some(),
    };
    template.render().map(Html).map_err(|e| {
        error!("Template error: {}", e);
        ApiError::internal("Failed to render page")
    })
}

pub async fn health() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_commentary_core::Error;

    #[test]
    fn test_client_errors_map_to_400() {
        let api: ApiError = Error::InvalidPosition("expected 6 fields, found 3".into()).into();
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(api.detail, "Invalid FEN: expected 6 fields, found 3");
    }

    #[test]
    fn test_engine_errors_map_to_500() {
        let api: ApiError = Error::EngineUnavailable("/usr/games/stockfish missing".into()).into();
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!api.detail.contains("/usr/games"));
    }

    #[test]
    fn test_index_template_renders() {
        let page = IndexTemplate {
            title: "Analyzer".into(),
            start_fen: START_FEN.into(),
            depth: 18,
            multipv: 3,
            commentary_enabled: false,
        }
        .render()
        .unwrap();
        assert!(page.contains("<title>Analyzer</title>"));
        assert!(page.contains("KQkq - 0 1"));
    }
}
