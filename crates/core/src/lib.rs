//! Chess Commentary Core Library
//!
//! Drives a UCI engine to evaluate positions, converts its output into
//! readable notation, and sweeps whole games for mistakes and blunders.

pub mod commentary;
pub mod config;
pub mod engine;
pub mod error;
pub mod notation;
pub mod parser;
pub mod service;
pub mod sweep;

pub use commentary::{build_prompt, GeminiClient};
pub use config::{AppConfig, CommentaryConfig, EngineConfig};
pub use engine::{BestEvaluation, EvaluationLine, Evaluator, Score, StockfishEvaluator};
pub use error::{Error, Result};
pub use service::{Analyzer, PositionReport};
pub use sweep::{Classification, CriticalMoment, GameSweeper, SweepReport};
