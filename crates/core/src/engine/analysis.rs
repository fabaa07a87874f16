//! Types for representing engine analysis results

use serde::{Deserialize, Serialize};
use shakmaty::{Chess, Color, Position};
use std::fmt;

use crate::notation::{line_to_sans, number_line};

/// Centipawn value used for forced mates.
pub const MATE_SCORE: i32 = 10_000;

/// Score reported by the engine, from the side to move's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Score {
    Centipawns(i32),
    /// Moves to mate; negative when the side to move is getting mated
    Mate(i32),
}

impl Score {
    /// Collapses the score to centipawns, mapping mates to `±MATE_SCORE`.
    pub fn to_centipawns(self) -> i32 {
        match self {
            Score::Centipawns(cp) => cp,
            Score::Mate(moves) if moves > 0 => MATE_SCORE,
            Score::Mate(_) => -MATE_SCORE,
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Score::Centipawns(cp) => {
                let pawns = *cp as f64 / 100.0;
                if *cp > 0 {
                    write!(f, "+{:.2}", pawns)
                } else if *cp < 0 {
                    write!(f, "{:.2}", pawns)
                } else {
                    write!(f, "0.00")
                }
            }
            Score::Mate(moves) => write!(f, "M{}", moves),
        }
    }
}

/// One ranked candidate line from a multi-line search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationLine {
    /// 1 = best
    pub rank: u32,
    /// Search depth of the report this line came from
    pub depth: u32,
    /// Side-to-move perspective, as reported
    pub score: Score,
    /// Principal variation in coordinate notation
    pub pv: Vec<String>,
}

impl EvaluationLine {
    /// Renders `(<score>) <numbered SAN line>`, e.g. `(+0.31) 1. e4 e5 2. Nf3`.
    pub fn format(&self, position: &Chess) -> String {
        let sans = line_to_sans(&self.pv, position);
        let numbered = number_line(&sans, position);
        if numbered.is_empty() {
            format!("({})", self.score)
        } else {
            format!("({}) {}", self.score, numbered)
        }
    }
}

/// Renders ranked lines one per line, in rank order.
pub fn format_lines(lines: &[EvaluationLine], position: &Chess) -> String {
    lines
        .iter()
        .map(|line| line.format(position))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Result of a single-line search, normalised to White's perspective
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestEvaluation {
    /// Positive = White is better
    pub white_cp: i32,
    /// Coordinate move, empty when the engine reported no line
    pub best_move: String,
}

impl BestEvaluation {
    /// Converts a side-to-move score for `position` to White's perspective.
    pub fn from_side_to_move(position: &Chess, score: Score, best_move: String) -> Self {
        let cp = score.to_centipawns();
        let white_cp = match position.turn() {
            Color::White => cp,
            Color::Black => cp.saturating_neg(),
        };
        Self {
            white_cp,
            best_move,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notation::parse_position;

    #[test]
    fn test_score_display() {
        assert_eq!(Score::Centipawns(31).to_string(), "+0.31");
        assert_eq!(Score::Centipawns(-250).to_string(), "-2.50");
        assert_eq!(Score::Centipawns(0).to_string(), "0.00");
        assert_eq!(Score::Mate(3).to_string(), "M3");
        assert_eq!(Score::Mate(-2).to_string(), "M-2");
    }

    #[test]
    fn test_mate_to_centipawns() {
        assert_eq!(Score::Mate(4).to_centipawns(), MATE_SCORE);
        assert_eq!(Score::Mate(-1).to_centipawns(), -MATE_SCORE);
        assert_eq!(Score::Mate(0).to_centipawns(), -MATE_SCORE);
    }

    #[test]
    fn test_format_line() {
        let pos = parse_position("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1")
            .unwrap();
        let line = EvaluationLine {
            rank: 1,
            depth: 20,
            score: Score::Centipawns(31),
            pv: vec!["e2e4".into(), "e7e5".into(), "g1f3".into()],
        };
        assert_eq!(line.format(&pos), "(+0.31) 1. e4 e5 2. Nf3");

        let empty = EvaluationLine {
            pv: vec!["e2e5".into()],
            ..line
        };
        assert_eq!(empty.format(&pos), "(+0.31)");
    }

    #[test]
    fn test_white_perspective_conversion() {
        let black_to_move =
            parse_position("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1").unwrap();
        let best = BestEvaluation::from_side_to_move(
            &black_to_move,
            Score::Centipawns(40),
            "e7e5".into(),
        );
        assert_eq!(best.white_cp, -40);

        let white_to_move =
            parse_position("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1").unwrap();
        let best = BestEvaluation::from_side_to_move(&white_to_move, Score::Mate(2), "".into());
        assert_eq!(best.white_cp, MATE_SCORE);
    }

    #[test]
    fn test_extreme_engine_score_saturates() {
        let black_to_move =
            parse_position("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1").unwrap();
        let best = BestEvaluation::from_side_to_move(
            &black_to_move,
            Score::Centipawns(i32::MIN),
            "e7e5".into(),
        );
        assert_eq!(best.white_cp, i32::MAX);
    }
}
