use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

use chess_commentary_core::{build_prompt, Error, SweepReport};

use super::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub fen: String,
    pub depth: Option<u32>,
    pub multipv: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub fen: String,
    pub depth: u8,
    pub multipv: u32,
    pub board: String,
    pub stockfish_lines: String,
    pub gemini: String,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzePgnRequest {
    pub pgn: String,
    pub depth: Option<u32>,
}

/// Engine lines for one position plus model commentary on them.
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let depth = resolve_depth(req.depth, state.config.engine.default_depth)?;
    let multipv = req.multipv.unwrap_or(state.config.engine.default_multipv);

    // Engine I/O blocks; keep it off the async workers
    let worker = state.clone();
    let fen = req.fen.clone();
    let report = tokio::task::spawn_blocking(move || {
        worker.analyzer.analyze_position(&fen, depth, multipv)
    })
    .await
    .map_err(|e| ApiError::internal(format!("analysis task failed: {}", e)))??;

    let gemini = match &state.commentator {
        Some(client) => {
            let prompt = build_prompt(&report.fen, depth, multipv, &report.engine_lines);
            match client.generate(&prompt).await {
                Ok(text) => text,
                Err(e) => {
                    warn!("Commentary failed: {}", e);
                    e.public_message()
                }
            }
        }
        None => "Commentary disabled: GOOGLE_API_KEY is not set.".to_string(),
    };

    Ok(Json(AnalyzeResponse {
        fen: report.fen,
        depth,
        multipv,
        board: report.board,
        stockfish_lines: report.engine_lines,
        gemini,
    }))
}

/// Mistakes and blunders across a whole game.
pub async fn analyze_pgn(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalyzePgnRequest>,
) -> Result<Json<SweepReport>, ApiError> {
    let depth = resolve_depth(req.depth, state.config.engine.default_depth)?;

    let worker = state.clone();
    let report = tokio::task::spawn_blocking(move || worker.analyzer.analyze_sweep(&req.pgn, depth))
        .await
        .map_err(|e| ApiError::internal(format!("sweep task failed: {}", e)))??;

    Ok(Json(report))
}

/// Falls back to the configured default and rejects depths the engine
/// cannot be asked for.
fn resolve_depth(requested: Option<u32>, default: u8) -> Result<u8, Error> {
    match requested {
        None => Ok(default),
        Some(depth) => u8::try_from(depth)
            .map_err(|_| Error::InvalidRequest(format!("depth must be between 1 and {}", u8::MAX))),
    }
}
