//! Move-by-move evaluation of a whole game

use shakmaty::{san::SanPlus, Chess, Color, Position};
use tracing::{debug, info, warn};

use super::types::*;
use crate::engine::Evaluator;
use crate::error::Result;
use crate::notation::{coordinate_to_algebraic, to_fen};
use crate::parser::{parse_game, ParsedGame};

pub struct GameSweeper<E: Evaluator> {
    evaluator: E,
}

impl<E: Evaluator> GameSweeper<E> {
    pub fn new(evaluator: E) -> Self {
        Self { evaluator }
    }

    /// Parses a PGN and sweeps its main line.
    pub fn sweep(&self, pgn: &str, depth: u8) -> Result<SweepReport> {
        let game = parse_game(pgn)?;
        info!("Sweeping {} at depth {}", game.summary(), depth);

        let critical_moments = self.sweep_game(&game, depth)?;
        Ok(SweepReport {
            game_summary: game.summary(),
            critical_moments,
        })
    }

    /// Evaluates the position before and after every move and keeps the
    /// moves whose loss crosses a threshold, in game order.
    ///
    /// Each position in the middle of the game is searched twice, once as
    /// "after" and once as "before" the next move.
    pub fn sweep_game(&self, game: &ParsedGame, depth: u8) -> Result<Vec<CriticalMoment>> {
        let mut moments = Vec::new();
        let mut position = game.initial_position.clone();

        for (ply, mv) in game.moves.iter().enumerate() {
            let mover = position.turn();
            let sign = match mover {
                Color::White => 1,
                Color::Black => -1,
            };
            let move_number = position.fullmoves().get();
            let fen_before = to_fen(&position);

            let best = self.evaluator.evaluate_best(&position, depth)?;
            let best_mover_cp = i64::from(best.white_cp) * sign;

            let mut after = position.clone();
            let played = SanPlus::from_move_and_play_unchecked(&mut after, mv.clone()).to_string();

            let result = self.evaluator.evaluate_best(&after, depth)?;
            let actual_mover_cp = i64::from(result.white_cp) * sign;

            let loss = (best_mover_cp - actual_mover_cp) as f64 / 100.0;

            match Classification::from_loss(loss) {
                Some(classification) => {
                    let best_move = best_move_san(&best.best_move, &position);
                    info!(
                        "Ply {}: {} {} (-{:.2}), engine preferred {}",
                        ply + 1,
                        classification.as_str(),
                        played,
                        loss,
                        best_move
                    );
                    moments.push(CriticalMoment {
                        move_number,
                        side: match mover {
                            Color::White => Side::White,
                            Color::Black => Side::Black,
                        },
                        played,
                        fen_before,
                        classification,
                        delta_eval: round2(loss),
                        best_move,
                        best_eval: round2(best_mover_cp as f64 / 100.0),
                    });
                }
                None => debug!("Ply {}: {} loses {:.2}", ply + 1, played, loss),
            }

            position = after;
        }

        Ok(moments)
    }
}

/// SAN for the engine's suggestion, falling back to its raw coordinate form.
fn best_move_san(uci: &str, position: &Chess) -> String {
    if uci.is_empty() {
        return String::new();
    }
    match coordinate_to_algebraic(uci, position) {
        Ok(san) => san,
        Err(e) => {
            warn!("Keeping engine move in coordinate form: {}", e);
            uci.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{BestEvaluation, EvaluationLine};
    use crate::error::Error;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Answers `evaluate_best` from a queue and records what it was asked.
    #[derive(Default)]
    struct ScriptedEvaluator {
        answers: RefCell<VecDeque<Result<BestEvaluation>>>,
        asked: RefCell<Vec<String>>,
    }

    impl ScriptedEvaluator {
        fn new(answers: &[(i32, &str)]) -> Self {
            Self {
                answers: RefCell::new(
                    answers
                        .iter()
                        .map(|(cp, mv)| {
                            Ok(BestEvaluation {
                                white_cp: *cp,
                                best_move: mv.to_string(),
                            })
                        })
                        .collect(),
                ),
                asked: RefCell::default(),
            }
        }
    }

    impl Evaluator for ScriptedEvaluator {
        fn evaluate_top_lines(&self, _: &Chess, _: u8, _: u32) -> Result<Vec<EvaluationLine>> {
            Ok(Vec::new())
        }

        fn evaluate_best(&self, position: &Chess, _depth: u8) -> Result<BestEvaluation> {
            self.asked.borrow_mut().push(to_fen(position));
            self.answers
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Ok(BestEvaluation::default()))
        }
    }

    #[test]
    fn test_flags_mistake_and_blunder() {
        let evaluator = ScriptedEvaluator::new(&[
            (30, "e2e4"),  // before 1. e4
            (25, ""),      // after 1. e4
            (25, "e7e5"),  // before 1... f6
            (110, ""),     // after 1... f6
            (110, "d2d4"), // before 2. Qh5+
            (-90, ""),     // after 2. Qh5+
        ]);
        let sweeper = GameSweeper::new(&evaluator);

        let report = sweeper.sweep("1. e4 f6 2. Qh5+ *", 12).unwrap();
        assert_eq!(report.game_summary, "Unknown vs Unknown - *, 3 moves");
        assert_eq!(report.critical_moments.len(), 2);

        let mistake = &report.critical_moments[0];
        assert_eq!(mistake.classification, Classification::Mistake);
        assert_eq!(mistake.move_number, 1);
        assert_eq!(mistake.side, Side::Black);
        assert_eq!(mistake.played, "f6");
        assert_eq!(
            mistake.fen_before,
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1"
        );
        assert_eq!(mistake.delta_eval, 0.85);
        assert_eq!(mistake.best_move, "e5");
        assert_eq!(mistake.best_eval, -0.25);

        let blunder = &report.critical_moments[1];
        assert_eq!(blunder.classification, Classification::Blunder);
        assert_eq!(blunder.move_number, 2);
        assert_eq!(blunder.side, Side::White);
        assert_eq!(blunder.played, "Qh5+");
        assert_eq!(blunder.delta_eval, 2.0);
        assert_eq!(blunder.best_move, "d4");
        assert_eq!(blunder.best_eval, 1.1);

        assert_eq!(report.count(Classification::Blunder), 1);
        assert_eq!(report.count(Classification::Mistake), 1);
    }

    #[test]
    fn test_two_searches_per_move() {
        let evaluator = ScriptedEvaluator::default();
        let sweeper = GameSweeper::new(&evaluator);

        let report = sweeper.sweep("1. d4 d5 2. c4 *", 8).unwrap();
        assert!(report.critical_moments.is_empty());

        let asked = evaluator.asked.borrow();
        assert_eq!(asked.len(), 6);
        // "after move N" and "before move N+1" are the same position
        assert_eq!(asked[1], asked[2]);
        assert_eq!(asked[3], asked[4]);
        assert_eq!(asked[0], "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
    }

    #[test]
    fn test_gains_are_not_flagged() {
        // Black's reply swings the evaluation in Black's favour
        let evaluator = ScriptedEvaluator::new(&[(20, "e2e4"), (20, ""), (20, "e7e5"), (-300, "")]);
        let sweeper = GameSweeper::new(&evaluator);
        let report = sweeper.sweep("1. e4 e5 *", 10).unwrap();
        assert!(report.critical_moments.is_empty());
    }

    #[test]
    fn test_extreme_scores_do_not_overflow() {
        let evaluator = ScriptedEvaluator::new(&[
            (20, "e2e4"),
            (20, ""),
            (i32::MIN, "e7e5"),
            (i32::MAX, ""),
        ]);
        let sweeper = GameSweeper::new(&evaluator);
        let report = sweeper.sweep("1. e4 f6 *", 10).unwrap();

        assert_eq!(report.critical_moments.len(), 1);
        assert_eq!(report.critical_moments[0].classification, Classification::Blunder);
        assert!(report.critical_moments[0].delta_eval > 0.0);
    }

    #[test]
    fn test_unplayable_engine_suggestion_kept_raw() {
        let evaluator = ScriptedEvaluator::new(&[(200, "e2e5"), (0, "")]);
        let sweeper = GameSweeper::new(&evaluator);
        let report = sweeper.sweep("1. a3 *", 10).unwrap();

        assert_eq!(report.critical_moments.len(), 1);
        assert_eq!(report.critical_moments[0].best_move, "e2e5");
        assert_eq!(report.critical_moments[0].classification, Classification::Blunder);
    }

    #[test]
    fn test_engine_failure_propagates() {
        let evaluator = ScriptedEvaluator::default();
        evaluator
            .answers
            .borrow_mut()
            .push_back(Err(Error::EngineUnavailable("gone".into())));
        let sweeper = GameSweeper::new(&evaluator);

        assert!(matches!(
            sweeper.sweep("1. e4 *", 10),
            Err(Error::EngineUnavailable(_))
        ));
    }

    #[test]
    fn test_invalid_game_never_queries_engine() {
        let evaluator = ScriptedEvaluator::default();
        let sweeper = GameSweeper::new(&evaluator);

        assert!(matches!(sweeper.sweep("", 10), Err(Error::InvalidGame(_))));
        assert!(matches!(
            sweeper.sweep("[Event \"?\"]\n\n*", 10),
            Err(Error::InvalidGame(_))
        ));
        assert!(evaluator.asked.borrow().is_empty());
    }

    #[test]
    #[ignore] // Ignore by default - requires stockfish installed
    fn test_stockfish_finds_hung_mate() {
        use crate::config::EngineConfig;
        use crate::engine::StockfishEvaluator;

        let sweeper = GameSweeper::new(StockfishEvaluator::new(EngineConfig::new("stockfish")));
        let report = sweeper
            .sweep("1. e4 e5 2. Qh5 Nc6 3. Bc4 Nf6 4. Qxf7# 1-0", 12)
            .unwrap();

        let blunder = report
            .critical_moments
            .iter()
            .find(|m| m.played == "Nf6")
            .expect("Nf6 allows mate in one");
        assert_eq!(blunder.classification, Classification::Blunder);
        assert!(blunder.delta_eval >= 1.50);
        assert_ne!(blunder.best_move, blunder.played);
    }
}
