//! PGN parsing into a starting position plus the moves played

use pgn_reader::{RawTag, SanPlus, Skip, Visitor};
use shakmaty::{Chess, Move, Position};
use std::io::Cursor;
use std::ops::ControlFlow;

use crate::error::{Error, Result};
use crate::notation::parse_position;

/// A game ready to be replayed move by move
#[derive(Debug, Clone)]
pub struct ParsedGame {
    pub event: Option<String>,
    pub white: Option<String>,
    pub black: Option<String>,
    pub result: Option<String>,
    /// Standard start, or the position from a `FEN` tag
    pub initial_position: Chess,
    pub moves: Vec<Move>,
}

impl ParsedGame {
    pub fn move_count(&self) -> usize {
        self.moves.len()
    }

    pub fn summary(&self) -> String {
        let white = self.white.as_deref().unwrap_or("Unknown");
        let black = self.black.as_deref().unwrap_or("Unknown");
        let result = self.result.as_deref().unwrap_or("*");
        format!("{} vs {} - {}, {} moves", white, black, result, self.move_count())
    }
}

#[derive(Default)]
struct GameTags {
    event: Option<String>,
    white: Option<String>,
    black: Option<String>,
    result: Option<String>,
    fen: Option<String>,
}

struct GameMoves {
    tags: GameTags,
    initial_position: Chess,
    current_position: Chess,
    moves: Vec<Move>,
}

struct GameParser;

impl Visitor for GameParser {
    type Tags = GameTags;
    type Movetext = GameMoves;
    type Output = Result<ParsedGame>;

    fn begin_tags(&mut self) -> ControlFlow<Self::Output, Self::Tags> {
        ControlFlow::Continue(GameTags::default())
    }

    fn tag(
        &mut self,
        tags: &mut Self::Tags,
        name: &[u8],
        value: RawTag<'_>,
    ) -> ControlFlow<Self::Output> {
        let name_str = String::from_utf8_lossy(name);
        let value_str = value.decode_utf8_lossy().to_string();

        match name_str.as_ref() {
            "Event" => tags.event = Some(value_str),
            "White" => tags.white = Some(value_str),
            "Black" => tags.black = Some(value_str),
            "Result" => tags.result = Some(value_str),
            "FEN" => tags.fen = Some(value_str),
            _ => {}
        }

        ControlFlow::Continue(())
    }

    fn begin_movetext(&mut self, tags: Self::Tags) -> ControlFlow<Self::Output, Self::Movetext> {
        let initial_position = match tags.fen.as_deref() {
            Some(fen) => match parse_position(fen) {
                Ok(pos) => pos,
                Err(e) => {
                    return ControlFlow::Break(Err(Error::InvalidGame(format!(
                        "bad FEN tag: {}",
                        e
                    ))))
                }
            },
            None => Chess::default(),
        };

        ControlFlow::Continue(GameMoves {
            tags,
            current_position: initial_position.clone(),
            initial_position,
            moves: Vec::new(),
        })
    }

    fn san(&mut self, movetext: &mut Self::Movetext, san: SanPlus) -> ControlFlow<Self::Output> {
        let ply = movetext.moves.len() + 1;
        let illegal = || {
            ControlFlow::Break(Err(Error::InvalidGame(format!(
                "illegal move {} at ply {}",
                san, ply
            ))))
        };

        let Ok(m) = san.san.to_move(&movetext.current_position) else {
            return illegal();
        };
        match movetext.current_position.clone().play(m.clone()) {
            Ok(new_pos) => {
                movetext.current_position = new_pos;
                movetext.moves.push(m);
                ControlFlow::Continue(())
            }
            Err(_) => illegal(),
        }
    }

    fn begin_variation(
        &mut self,
        _movetext: &mut Self::Movetext,
    ) -> ControlFlow<Self::Output, Skip> {
        ControlFlow::Continue(Skip(true))
    }

    fn end_game(&mut self, movetext: Self::Movetext) -> Self::Output {
        Ok(ParsedGame {
            event: movetext.tags.event,
            white: movetext.tags.white,
            black: movetext.tags.black,
            result: movetext.tags.result,
            initial_position: movetext.initial_position,
            moves: movetext.moves,
        })
    }
}

/// Parses the first game of a PGN string. Games without moves are rejected.
pub fn parse_game(pgn: &str) -> Result<ParsedGame> {
    let mut parser = GameParser;
    let cursor = Cursor::new(pgn.as_bytes());
    let mut reader = pgn_reader::Reader::new(cursor);

    let game = match reader.read_game(&mut parser) {
        Ok(Some(output)) => output?,
        Ok(None) => return Err(Error::InvalidGame("no game found".into())),
        Err(e) => return Err(Error::InvalidGame(e.to_string())),
    };

    if game.moves.is_empty() {
        return Err(Error::InvalidGame("game contains no moves".into()));
    }
    Ok(game)
}
