//! Chess engine integration
//!
//! Provides interface to UCI-compatible engines like Stockfish. Every query
//! runs in its own freshly spawned engine process.

pub mod analysis;
pub mod info;
pub mod session;

use shakmaty::{Chess, Color, Position};
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::Result;
use crate::notation::to_fen;

// Re-export main types for convenience
pub use analysis::{format_lines, BestEvaluation, EvaluationLine, Score, MATE_SCORE};
pub use info::{parse_info_line, PvTable};
pub use session::{EngineSession, SearchOutcome, SessionState};

/// Source of position evaluations.
pub trait Evaluator {
    /// Up to `line_count` ranked lines, scores from the side to move.
    fn evaluate_top_lines(
        &self,
        position: &Chess,
        depth: u8,
        line_count: u32,
    ) -> Result<Vec<EvaluationLine>>;

    /// Best line's score from White's perspective and its first move.
    fn evaluate_best(&self, position: &Chess, depth: u8) -> Result<BestEvaluation>;
}

impl<E: Evaluator + ?Sized> Evaluator for &E {
    fn evaluate_top_lines(
        &self,
        position: &Chess,
        depth: u8,
        line_count: u32,
    ) -> Result<Vec<EvaluationLine>> {
        (**self).evaluate_top_lines(position, depth, line_count)
    }

    fn evaluate_best(&self, position: &Chess, depth: u8) -> Result<BestEvaluation> {
        (**self).evaluate_best(position, depth)
    }
}

/// Evaluator backed by a UCI engine executable
#[derive(Debug, Clone)]
pub struct StockfishEvaluator {
    config: EngineConfig,
}

impl StockfishEvaluator {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Runs one search in a fresh process, terminating it afterwards even
    /// when the search failed.
    fn run_search(&self, position: &Chess, depth: u8, multipv: Option<u32>) -> Result<SearchOutcome> {
        let mut session = EngineSession::spawn(&self.config)?;

        let outcome = session
            .configure(multipv)
            .and_then(|_| session.set_position(&to_fen(position)))
            .and_then(|_| session.search(depth));

        let quit = session.quit();
        let outcome = outcome?;
        quit?;
        Ok(outcome)
    }
}

impl Evaluator for StockfishEvaluator {
    fn evaluate_top_lines(
        &self,
        position: &Chess,
        depth: u8,
        line_count: u32,
    ) -> Result<Vec<EvaluationLine>> {
        let outcome = self.run_search(position, depth, Some(line_count))?;
        let lines = outcome.table.into_lines(line_count);
        debug!("Engine returned {} of {} lines", lines.len(), line_count);
        Ok(lines)
    }

    fn evaluate_best(&self, position: &Chess, depth: u8) -> Result<BestEvaluation> {
        // No legal moves: the engine has no line to report
        if position.is_checkmate() {
            let white_cp = match position.turn() {
                Color::White => -MATE_SCORE,
                Color::Black => MATE_SCORE,
            };
            return Ok(BestEvaluation {
                white_cp,
                best_move: String::new(),
            });
        }
        if position.is_stalemate() {
            return Ok(BestEvaluation::default());
        }

        let outcome = self.run_search(position, depth, None)?;
        Ok(match outcome.table.best() {
            Some(line) => BestEvaluation::from_side_to_move(
                position,
                line.score,
                line.pv.first().cloned().unwrap_or_default(),
            ),
            None => BestEvaluation::default(),
        })
    }
}


#[cfg(test)]
mod tests {
    use super::testing::fake_engine;
    use super::*;
    use crate::error::Error;
    use crate::notation::parse_position;

    const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
    const AFTER_E4: &str = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1";

    #[test]
    fn test_top_lines_keep_latest_per_rank() {
        let (_dir, config) = fake_engine(&[
            "info depth 1 multipv 1 score cp 10 pv e2e4",
            "info string garbage from the engine",
            "info depth 2 multipv 1 score cp 31 pv e2e4 e7e5 g1f3",
            "info depth 2 multipv 2 score cp -5 pv d2d4 d7d5 zzzz",
            "bestmove e2e4 ponder e7e5",
        ]);
        let evaluator = StockfishEvaluator::new(config);
        let pos = parse_position(START).unwrap();

        let lines = evaluator.evaluate_top_lines(&pos, 2, 3).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].score, Score::Centipawns(31));

        assert_eq!(
            format_lines(&lines, &pos),
            "(+0.31) 1. e4 e5 2. Nf3\n(-0.05) 1. d4 d5"
        );
    }

    #[test]
    fn test_top_lines_black_to_move_numbering() {
        let (_dir, config) = fake_engine(&[
            "info depth 5 multipv 1 score cp 20 pv c7c5 g1f3 d7d6",
            "bestmove c7c5",
        ]);
        let evaluator = StockfishEvaluator::new(config);
        let pos = parse_position(AFTER_E4).unwrap();

        let lines = evaluator.evaluate_top_lines(&pos, 5, 1).unwrap();
        assert_eq!(format_lines(&lines, &pos), "(+0.20) 1... c5 2. Nf3 d6");
    }

    #[test]
    fn test_no_parseable_lines_gives_empty_result() {
        let (_dir, config) = fake_engine(&["info string nothing useful", "bestmove e2e4"]);
        let evaluator = StockfishEvaluator::new(config);
        let pos = parse_position(START).unwrap();

        assert!(evaluator.evaluate_top_lines(&pos, 3, 3).unwrap().is_empty());
        assert_eq!(
            evaluator.evaluate_best(&pos, 3).unwrap(),
            BestEvaluation::default()
        );
    }

    #[test]
    fn test_best_is_white_relative() {
        let (_dir, config) = fake_engine(&[
            "info depth 3 score cp 15 pv e7e6",
            "info depth 4 score cp 40 pv e7e5 g1f3",
            "bestmove e7e5",
        ]);
        let evaluator = StockfishEvaluator::new(config);
        let pos = parse_position(AFTER_E4).unwrap();

        let best = evaluator.evaluate_best(&pos, 4).unwrap();
        assert_eq!(best.white_cp, -40);
        assert_eq!(best.best_move, "e7e5");
    }

    #[test]
    fn test_best_is_idempotent_for_deterministic_engine() {
        let (_dir, config) = fake_engine(&["info depth 6 score cp 27 pv d2d4", "bestmove d2d4"]);
        let evaluator = StockfishEvaluator::new(config);
        let pos = parse_position(START).unwrap();

        let first = evaluator.evaluate_best(&pos, 6).unwrap();
        let second = evaluator.evaluate_best(&pos, 6).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_engine_exit_mid_search() {
        let (_dir, config) = fake_engine(&["info depth 1 score cp 5 pv e2e4", "EXIT"]);
        let evaluator = StockfishEvaluator::new(config);
        let pos = parse_position(START).unwrap();

        assert!(matches!(
            evaluator.evaluate_top_lines(&pos, 3, 1),
            Err(Error::EngineUnavailable(_))
        ));
    }

    #[test]
    fn test_terminal_positions_skip_engine() {
        // Engine path does not exist; these must not spawn it
        let evaluator = StockfishEvaluator::new(EngineConfig::new("/nonexistent/engine"));

        // Fool's mate, White to move and mated
        let mated = parse_position("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3")
            .unwrap();
        assert_eq!(evaluator.evaluate_best(&mated, 10).unwrap().white_cp, -MATE_SCORE);

        let stalemate = parse_position("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert_eq!(
            evaluator.evaluate_best(&stalemate, 10).unwrap(),
            BestEvaluation::default()
        );
    }

    #[test]
    fn test_spawn_failure_is_fatal() {
        let evaluator = StockfishEvaluator::new(EngineConfig::new("/nonexistent/engine"));
        let pos = parse_position(START).unwrap();
        assert!(matches!(
            evaluator.evaluate_top_lines(&pos, 3, 1),
            Err(Error::EngineUnavailable(_))
        ));
    }

    #[test]
    #[ignore] // Ignore by default - requires stockfish installed
    fn test_stockfish_starting_position() {
        let evaluator = StockfishEvaluator::new(EngineConfig::new("stockfish"));
        let pos = parse_position(START).unwrap();

        let lines = evaluator.evaluate_top_lines(&pos, 10, 1).unwrap();
        assert_eq!(lines.len(), 1);
        match lines[0].score {
            Score::Centipawns(cp) => assert!(cp.abs() < 100, "near-equal start, got {}", cp),
            Score::Mate(_) => panic!("no mate from the starting position"),
        }
        let first = crate::notation::coordinate_to_algebraic(&lines[0].pv[0], &pos);
        assert!(first.is_ok());

        let a = evaluator.evaluate_best(&pos, 10).unwrap();
        let b = evaluator.evaluate_best(&pos, 10).unwrap();
        println!("Best: {} ({})", a.best_move, a.white_cp);
        assert!(!b.best_move.is_empty());
    }
}
