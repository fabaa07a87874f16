//! Position parsing and move notation
//!
//! Converts engine coordinate moves ("e2e4", "e7e8q") into SAN and renders
//! positions as plain text diagrams.

use shakmaty::{
    fen::Fen, san::SanPlus, uci::UciMove, CastlingMode, Chess, Color, EnPassantMode, File,
    Position, Rank, Square,
};
use tracing::warn;

use crate::error::{Error, Result};

/// Number of whitespace separated FEN fields we accept.
pub const FEN_FIELDS: usize = 6;

/// Parses a full six-field FEN into a legal position.
pub fn parse_position(fen: &str) -> Result<Chess> {
    let fields = fen.split_whitespace().count();
    if fields != FEN_FIELDS {
        return Err(Error::InvalidPosition(format!(
            "expected {} fields, found {}",
            FEN_FIELDS, fields
        )));
    }

    let parsed: Fen = fen
        .trim()
        .parse()
        .map_err(|e| Error::InvalidPosition(format!("{}", e)))?;

    parsed
        .into_position(CastlingMode::Standard)
        .map_err(|e| Error::InvalidPosition(format!("illegal position: {}", e)))
}

pub fn to_fen(position: &Chess) -> String {
    Fen::from_position(position, EnPassantMode::Legal).to_string()
}

/// Renders the board as an 8x8 grid, rank 8 first, with a file header.
///
/// ```text
///   a b c d e f g h
/// 8 r n b q k b n r
/// 7 p p p p p p p p
/// ...
/// ```
pub fn render_board(fen: &str) -> Result<String> {
    let position = parse_position(fen)?;
    Ok(render_position(&position))
}

pub fn render_position(position: &Chess) -> String {
    let board = position.board();
    let mut out = vec!["  a b c d e f g h".to_string()];

    for rank in Rank::ALL.into_iter().rev() {
        let cells: Vec<String> = File::ALL
            .into_iter()
            .map(|file| match board.piece_at(Square::from_coords(file, rank)) {
                Some(piece) => piece.char().to_string(),
                None => ".".to_string(),
            })
            .collect();
        out.push(format!("{} {}", rank.char(), cells.join(" ")));
    }

    out.join("\n")
}

/// Plays one coordinate move, returning its SAN and the resulting position.
pub fn play_coordinate(uci: &str, position: &Chess) -> Result<(String, Chess)> {
    let illegal = || Error::IllegalMove {
        uci: uci.to_string(),
        fen: to_fen(position),
    };

    let parsed: UciMove = uci.parse().map_err(|_| illegal())?;
    let m = parsed.to_move(position).map_err(|_| illegal())?;

    let mut next = position.clone();
    let san = SanPlus::from_move_and_play_unchecked(&mut next, m);
    Ok((san.to_string(), next))
}

/// Converts a single coordinate move to SAN.
pub fn coordinate_to_algebraic(uci: &str, position: &Chess) -> Result<String> {
    play_coordinate(uci, position).map(|(san, _)| san)
}

/// Converts a sequence of coordinate moves to SAN tokens.
///
/// Engine lines sometimes end in a token that is not legal against the
/// advancing position; conversion stops there and the prefix is kept.
pub fn line_to_sans<S: AsRef<str>>(moves: &[S], position: &Chess) -> Vec<String> {
    let mut current = position.clone();
    let mut sans = Vec::with_capacity(moves.len());

    for uci in moves {
        match play_coordinate(uci.as_ref(), &current) {
            Ok((san, next)) => {
                sans.push(san);
                current = next;
            }
            Err(e) => {
                warn!("Dropping rest of line: {}", e);
                break;
            }
        }
    }

    sans
}

pub fn line_to_algebraic<S: AsRef<str>>(moves: &[S], position: &Chess) -> String {
    line_to_sans(moves, position).join(" ")
}

/// Interleaves move numbers into a SAN sequence played from `position`.
///
/// The first move gets `N.` or `N...` depending on the side to move, and
/// every later White move gets `N.`. No number is emitted without a move
/// after it.
pub fn number_line(sans: &[String], position: &Chess) -> String {
    let mut turn = position.turn();
    let mut fullmove = position.fullmoves().get();
    let mut tokens = Vec::with_capacity(sans.len() * 2);

    for (i, san) in sans.iter().enumerate() {
        if i == 0 && turn == Color::Black {
            tokens.push(format!("{}...", fullmove));
        } else if turn == Color::White {
            tokens.push(format!("{}.", fullmove));
        }
        tokens.push(san.clone());

        if turn == Color::Black {
            fullmove += 1;
        }
        turn = turn.other();
    }

    tokens.join(" ")
}
