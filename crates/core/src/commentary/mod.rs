//! Natural-language commentary from a hosted language model

mod client;
mod types;

pub use client::GeminiClient;
pub use types::*;

/// Builds the prompt sent alongside a position's engine lines.
pub fn build_prompt(fen: &str, depth: u8, multipv: u32, engine_lines: &str) -> String {
    format!(
        "FEN Position: {fen}\n\
         \n\
         Stockfish depth={depth}, MultiPV={multipv} top {multipv} lines (verbatim):\n\
         {engine_lines}\n\
         \n\
         Explain the best moves from this position. Reference these exact Stockfish lines.\n\
         What strategic ideas are behind each line? Who has advantage and why?\n"
    )
}
