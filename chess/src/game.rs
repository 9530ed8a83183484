//! Game state machine: moves, results and administrative actions
//!
//! # Example
//!
//! ```
//! # use arbiter::{Game, GameResult, WinReason, Color, Move};
//! # use std::str::FromStr;
//! #
//! let mut game = Game::new();
//! for mv in ["f2f3", "e7e5", "g2g4", "d8h4"] {
//!     game.make_move(Move::from_str(mv).unwrap()).unwrap();
//! }
//! assert_eq!(game.result(), GameResult::win(Color::Black, WinReason::Checkmate));
//! assert_eq!(game.san_list().to_string(), "1. f3 e5 2. g4 Qh4#");
//! ```

use crate::board::{Board, Pretty, PrettyStyle};
use crate::fen::{self, Fen, FenError};
use crate::moves::Move;
use crate::rules::{self, MoveList, Snapshot};
use crate::types::{CastlingRights, Color, Coord, DrawReason, GameResult, WinReason};

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, trace};

/// Reason why [`Game::make_move`] rejected a move
#[derive(Debug, Copy, Clone, Error, PartialEq, Eq)]
pub enum IllegalMove {
    #[error("game is over: {0}")]
    GameOver(GameResult),
    #[error("no piece on {0}")]
    EmptySource(Coord),
    #[error("piece on {0} does not belong to the side to move")]
    WrongSide(Coord),
    #[error("move {0} must specify a promotion piece")]
    PromotionRequired(Move),
    #[error("move {0} cannot promote")]
    UnexpectedPromotion(Move),
    #[error("move {0} is not legal")]
    NotLegal(Move),
}

/// Reason why an administrative action was rejected
#[derive(Debug, Copy, Clone, Error, PartialEq, Eq)]
pub enum ActionError {
    #[error("game is over: {0}")]
    GameOver(GameResult),
    #[error("no pending draw offer from {}", .0.as_long_str())]
    NoDrawOffer(Color),
}

/// Source of the remaining time for each side
pub trait Clock {
    fn remaining(&self, c: Color) -> Duration;
}

/// Chess game from a start position up to the current one
///
/// Keeps the move history together with the signatures of the positions, so repetitions are
/// detected. Once the result becomes terminal, no more moves are accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    start: Fen,
    snapshot: Snapshot,
    halfmove_clock: u32,
    fullmove_number: u32,
    history: Vec<(Move, u64)>,
    repeat: HashMap<u64, usize>,
    draw_offer: Option<Color>,
    result: GameResult,
}

impl Game {
    /// Creates a game from the initial position
    pub fn new() -> Game {
        Game::from_position(Fen::initial())
    }

    /// Creates a game from the position described by FEN
    pub fn from_fen(s: &str) -> Result<Game, FenError> {
        Ok(Game::from_position(fen::parse(s)?))
    }

    /// Creates a game from the given position and computes its result
    pub fn from_position(start: Fen) -> Game {
        let mut repeat = HashMap::new();
        repeat.insert(start.snapshot.signature(), 1);
        let mut game = Game {
            snapshot: start.snapshot.clone(),
            halfmove_clock: start.halfmove_clock,
            fullmove_number: start.fullmove_number,
            start,
            history: Vec::new(),
            repeat,
            draw_offer: None,
            result: GameResult::Ongoing,
        };
        game.result = game.calc_result();
        game
    }

    fn calc_result(&self) -> GameResult {
        let s = &self.snapshot;
        if !s.has_legal_moves() {
            return if s.is_check() {
                GameResult::win(s.side.inv(), WinReason::Checkmate)
            } else {
                GameResult::Draw(DrawReason::Stalemate)
            };
        }
        if self.halfmove_clock >= 100 {
            return GameResult::Draw(DrawReason::FiftyMoves);
        }
        if self.repeat_count() >= 3 {
            return GameResult::Draw(DrawReason::Repetition);
        }
        GameResult::Ongoing
    }

    fn check_move(&self, mv: Move) -> Result<(), IllegalMove> {
        if self.result.is_finished() {
            return Err(IllegalMove::GameOver(self.result));
        }
        let s = &self.snapshot;
        let (color, piece) = s
            .board
            .get(mv.src())
            .parts()
            .ok_or(IllegalMove::EmptySource(mv.src()))?;
        if color != s.side {
            return Err(IllegalMove::WrongSide(mv.src()));
        }
        if !s.legal_moves(mv.src()).has(mv.dst()) {
            return Err(IllegalMove::NotLegal(mv));
        }
        match (rules::needs_promotion(piece, color, mv.dst()), mv.promote()) {
            (true, None) => Err(IllegalMove::PromotionRequired(mv)),
            (false, Some(_)) => Err(IllegalMove::UnexpectedPromotion(mv)),
            _ => Ok(()),
        }
    }

    /// Makes move `mv`
    ///
    /// The move is fully validated first. On error, the game is left unchanged.
    pub fn make_move(&mut self, mv: Move) -> Result<(), IllegalMove> {
        self.check_move(mv)?;
        let applied = self
            .snapshot
            .make_move_unchecked(mv)
            .ok_or(IllegalMove::EmptySource(mv.src()))?;

        if applied.is_irreversible() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock = self.halfmove_clock.saturating_add(1);
        }
        // Counters imported from FEN may already be at the top of the range
        if applied.side == Color::Black {
            self.fullmove_number = self.fullmove_number.saturating_add(1);
        }
        let signature = self.snapshot.signature();
        self.history.push((mv, signature));
        *self.repeat.entry(signature).or_insert(0) += 1;
        self.draw_offer = None;
        trace!(%mv, side = ?applied.side, kind = ?applied.kind, "applied move");

        self.result = self.calc_result();
        if self.result.is_finished() {
            debug!(result = %self.result, plies = self.history.len(), "game finished");
        }
        Ok(())
    }

    /// Returns `true` if [`Game::make_move`] would accept `mv`
    #[inline]
    pub fn is_move_legal(&self, mv: Move) -> bool {
        self.check_move(mv).is_ok()
    }

    /// Returns the legal destinations of the piece on `src`
    ///
    /// The result is empty if the square is empty, holds a piece of the side not to move, or
    /// if the game is over.
    pub fn legal_moves(&self, src: Coord) -> Vec<Coord> {
        if self.result.is_finished() {
            return Vec::new();
        }
        self.snapshot.legal_moves(src).into_iter().collect()
    }

    /// Returns all legal moves of the side to move
    pub fn all_legal_moves(&self) -> MoveList {
        if self.result.is_finished() {
            return MoveList::new();
        }
        self.snapshot.all_legal_moves()
    }

    /// Ends the game with a result that does not come from the board
    pub(crate) fn finish(&mut self, result: GameResult) -> Result<(), ActionError> {
        if self.result.is_finished() {
            return Err(ActionError::GameOver(self.result));
        }
        debug!(%result, plies = self.history.len(), "game finished by action");
        self.result = result;
        self.draw_offer = None;
        Ok(())
    }

    /// Ends the game as a loss of `c`
    pub fn resign(&mut self, c: Color) -> Result<(), ActionError> {
        self.finish(GameResult::win(c.inv(), WinReason::Resignation))
    }

    /// Ends the game as a loss of `c`, who ran out of time
    pub fn flag_timeout(&mut self, c: Color) -> Result<(), ActionError> {
        self.finish(GameResult::win(c.inv(), WinReason::TimeForfeit))
    }

    /// Offers a draw on behalf of `c`
    ///
    /// The offer stays pending until the opponent accepts it or until the next move.
    pub fn offer_draw(&mut self, c: Color) -> Result<(), ActionError> {
        if self.result.is_finished() {
            return Err(ActionError::GameOver(self.result));
        }
        debug!(side = ?c, "draw offered");
        self.draw_offer = Some(c);
        Ok(())
    }

    /// Accepts the draw offered by the opponent of `c`
    pub fn accept_draw(&mut self, c: Color) -> Result<(), ActionError> {
        if self.result.is_finished() {
            return Err(ActionError::GameOver(self.result));
        }
        if self.draw_offer != Some(c.inv()) {
            return Err(ActionError::NoDrawOffer(c.inv()));
        }
        self.finish(GameResult::Draw(DrawReason::Agreement))
    }

    /// Flags the side to move if `clock` reports no remaining time for it
    ///
    /// Returns the result after the check.
    pub fn poll_clock(&mut self, clock: &impl Clock) -> GameResult {
        let side = self.side();
        if self.result.is_ongoing() && clock.remaining(side).is_zero() {
            // Cannot fail, the game is in progress
            let _ = self.flag_timeout(side);
        }
        self.result
    }

    #[inline]
    pub fn in_play(&self) -> bool {
        self.result.is_ongoing()
    }

    #[inline]
    pub fn result(&self) -> GameResult {
        self.result
    }

    #[inline]
    pub fn side(&self) -> Color {
        self.snapshot.side
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.snapshot.board
    }

    #[inline]
    pub fn castling(&self) -> CastlingRights {
        self.snapshot.context.castling
    }

    #[inline]
    pub fn en_passant(&self) -> Option<Coord> {
        self.snapshot.context.en_passant
    }

    #[inline]
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    #[inline]
    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    /// Returns the moves made so far, each with the signature of the position after it
    #[inline]
    pub fn history(&self) -> &[(Move, u64)] {
        &self.history
    }

    #[inline]
    pub fn is_check(&self) -> bool {
        self.snapshot.is_check()
    }

    #[inline]
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Returns the position the game started from
    #[inline]
    pub fn start(&self) -> &Fen {
        &self.start
    }

    #[inline]
    pub fn draw_offer(&self) -> Option<Color> {
        self.draw_offer
    }

    /// Returns how many times the current position has occurred
    pub fn repeat_count(&self) -> usize {
        self.repeat
            .get(&self.snapshot.signature())
            .copied()
            .unwrap_or(0)
    }

    /// Returns the current position as FEN
    pub fn fen(&self) -> String {
        fen::format(&self.snapshot, self.halfmove_clock, self.fullmove_number)
    }

    pub fn pretty(&self, style: PrettyStyle) -> Pretty<'_> {
        self.snapshot.board.pretty_with_side(style, self.snapshot.side)
    }

    /// Replays the game from the start position
    pub fn walk(&self) -> Walker<'_> {
        Walker {
            snapshot: self.start.snapshot.clone(),
            fullmove_number: self.start.fullmove_number,
            history: &self.history,
            pos: 0,
            pending: None,
        }
    }

    /// Returns the history in SAN with move numbers, like `1. e4 e5 2. Nf3`
    pub fn san_list(&self) -> SanList<'_> {
        SanList(self)
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

/// Replays the moves of a game, yielding each move with the position it was made from
pub struct Walker<'a> {
    snapshot: Snapshot,
    fullmove_number: u32,
    history: &'a [(Move, u64)],
    pos: usize,
    pending: Option<Move>,
}

impl<'a> Walker<'a> {
    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Returns the next move together with its fullmove number and the position before it
    pub fn next(&mut self) -> Option<(u32, &Snapshot, Move)> {
        if let Some(mv) = self.pending.take() {
            self.snapshot.make_move_unchecked(mv);
            if self.snapshot.side == Color::White {
                self.fullmove_number = self.fullmove_number.saturating_add(1);
            }
        }
        let &(mv, _) = self.history.get(self.pos)?;
        self.pos += 1;
        self.pending = Some(mv);
        Some((self.fullmove_number, &self.snapshot, mv))
    }
}

pub struct SanList<'a>(&'a Game);

impl<'a> fmt::Display for SanList<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        let mut walker = self.0.walk();
        let mut first = true;
        while let Some((num, s, mv)) = walker.next() {
            let san = mv.san(s).map_err(|_| fmt::Error)?;
            if !first {
                write!(f, " ")?;
            }
            match s.side {
                Color::White => write!(f, "{}. ", num)?,
                Color::Black if first => write!(f, "{}... ", num)?,
                Color::Black => {}
            }
            write!(f, "{}", san)?;
            first = false;
        }
        Ok(())
    }
}
