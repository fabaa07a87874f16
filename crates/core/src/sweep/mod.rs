//! Game sweep: replays a game and flags mistakes and blunders

mod sweeper;
mod types;

pub use sweeper::GameSweeper;
pub use types::*;
