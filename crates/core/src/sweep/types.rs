//! Critical moment types

use serde::{Deserialize, Serialize};

/// Evaluation loss, in pawns, at which a move becomes a blunder.
pub const BLUNDER_THRESHOLD: f64 = 1.50;
/// Evaluation loss, in pawns, at which a move becomes a mistake.
pub const MISTAKE_THRESHOLD: f64 = 0.75;

/// Severity of a flagged move
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Classification {
    /// >= 0.75 pawns lost
    Mistake,
    /// >= 1.50 pawns lost
    Blunder,
}

impl Classification {
    /// `None` for losses below the mistake threshold.
    pub fn from_loss(loss: f64) -> Option<Self> {
        match loss {
            l if l >= BLUNDER_THRESHOLD => Some(Classification::Blunder),
            l if l >= MISTAKE_THRESHOLD => Some(Classification::Mistake),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Mistake => "Mistake",
            Classification::Blunder => "Blunder",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    White,
    Black,
}

/// A flagged move within a swept game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriticalMoment {
    pub move_number: u32,
    pub side: Side,
    /// Move played, in SAN
    #[serde(rename = "move")]
    pub played: String,
    pub fen_before: String,
    #[serde(rename = "type")]
    pub classification: Classification,
    /// Pawns lost by the move, from the mover's perspective
    pub delta_eval: f64,
    /// Engine's preferred move in the position before, in SAN
    pub best_move: String,
    /// Mover-perspective evaluation of `best_move`, in pawns
    pub best_eval: f64,
}

/// Sweep result in game order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepReport {
    pub game_summary: String,
    pub critical_moments: Vec<CriticalMoment>,
}

impl SweepReport {
    pub fn count(&self, classification: Classification) -> usize {
        self.critical_moments
            .iter()
            .filter(|m| m.classification == classification)
            .count()
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
