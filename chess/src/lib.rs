//! # Arbiter
//!
//! Chess rules engine: legal move generation, game results, and the FEN, PGN and SAN
//! notations.
//!
//! The main entry point is [`Game`], which validates moves, keeps the history and tracks the
//! result. Stateless rules live in [`rules`], working on a [`Board`] with a [`Context`].
//!
//! # Example
//!
//! ```
//! # use arbiter::{Game, Coord, Move};
//! # use std::str::FromStr;
//! #
//! let mut game = Game::new();
//! let e2 = Coord::from_str("e2").unwrap();
//! assert_eq!(game.legal_moves(e2).len(), 2);
//!
//! let mv = Move::from_san("e4", game.snapshot()).unwrap();
//! game.make_move(mv).unwrap();
//! assert_eq!(
//!     game.fen(),
//!     "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1",
//! );
//! ```

pub mod board;
pub mod fen;
pub mod game;
pub mod moves;
pub mod pattern;
pub mod pgn;
pub mod rules;

mod zobrist;

pub use arbiter_base::{bitboard, bitboard_consts, geometry, types};

pub use bitboard::Bitboard;
pub use board::Board;
pub use game::{Clock, Game, IllegalMove};
pub use moves::{Move, PromotePiece};
pub use rules::{Context, MoveList, Snapshot};
pub use types::{
    CastlingRights, CastlingSide, Cell, Color, Coord, CoordError, DrawReason, File,
    GameResult, Piece, Rank, WinReason,
};
