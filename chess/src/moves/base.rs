use crate::types::{Coord, Piece, Rank};

use thiserror::Error;

/// Target piece for promotion
///
/// Promoting to a king or to a pawn is not representable.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PromotePiece {
    Knight = 1,
    Bishop = 2,
    Rook = 3,
    Queen = 4,
}

impl PromotePiece {
    /// All the promotion targets, from the strongest one
    pub const ALL: [PromotePiece; 4] = [
        PromotePiece::Queen,
        PromotePiece::Rook,
        PromotePiece::Bishop,
        PromotePiece::Knight,
    ];
}

impl From<PromotePiece> for Piece {
    #[inline]
    fn from(p: PromotePiece) -> Self {
        match p {
            PromotePiece::Knight => Piece::Knight,
            PromotePiece::Bishop => Piece::Bishop,
            PromotePiece::Rook => Piece::Rook,
            PromotePiece::Queen => Piece::Queen,
        }
    }
}

impl TryFrom<Piece> for PromotePiece {
    type Error = MoveError;

    #[inline]
    fn try_from(p: Piece) -> Result<Self, Self::Error> {
        match p {
            Piece::Knight => Ok(PromotePiece::Knight),
            Piece::Bishop => Ok(PromotePiece::Bishop),
            Piece::Rook => Ok(PromotePiece::Rook),
            Piece::Queen => Ok(PromotePiece::Queen),
            Piece::Pawn | Piece::King => Err(MoveError::BadPromotePiece(p)),
        }
    }
}

/// Error creating a [`Move`]
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum MoveError {
    /// Source and destination are the same square
    #[error("source and destination are the same square {0}")]
    SameSquare(Coord),
    /// Cannot promote to this kind of piece
    #[error("cannot promote to {0:?}")]
    BadPromotePiece(Piece),
    /// Promotion is requested, but the destination is not on the first or the last rank
    #[error("cannot promote on square {0}")]
    BadPromoteSquare(Coord),
}

/// Chess move
///
/// A move is just a pair of squares with an optional promotion. Castling is represented as a
/// two-square king move (`e1g1`), and en passant as a diagonal pawn move onto the en passant
/// target square. The exact kind of the move is inferred from the board when the move is applied.
///
/// Constructors reject moves which cannot be legal in any position: moves with the same source
/// and destination, and promotions which don't end on the first or the last rank. Everything else
/// depends on the position and is checked by [`Game::make_move()`](crate::game::Game::make_move).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Move {
    src: Coord,
    dst: Coord,
    promote: Option<PromotePiece>,
}

impl Move {
    /// Creates a move without promotion
    pub fn new(src: Coord, dst: Coord) -> Result<Move, MoveError> {
        Move::from_parts(src, dst, None)
    }

    /// Creates a promotion move
    ///
    /// Fails if `piece` is a king or a pawn.
    pub fn with_promotion(src: Coord, dst: Coord, piece: Piece) -> Result<Move, MoveError> {
        Move::from_parts(src, dst, Some(PromotePiece::try_from(piece)?))
    }

    /// Creates a move from its parts and checks that it is well-formed
    pub fn from_parts(
        src: Coord,
        dst: Coord,
        promote: Option<PromotePiece>,
    ) -> Result<Move, MoveError> {
        if src == dst {
            return Err(MoveError::SameSquare(src));
        }
        if promote.is_some() && !matches!(dst.rank(), Rank::R1 | Rank::R8) {
            return Err(MoveError::BadPromoteSquare(dst));
        }
        Ok(Move { src, dst, promote })
    }

    /// Creates a move without any checks
    ///
    /// Only used for candidate moves generated from the board, which are well-formed anyway.
    #[inline]
    pub(crate) const fn new_unchecked(
        src: Coord,
        dst: Coord,
        promote: Option<PromotePiece>,
    ) -> Move {
        Move { src, dst, promote }
    }

    #[inline]
    pub const fn src(&self) -> Coord {
        self.src
    }

    #[inline]
    pub const fn dst(&self) -> Coord {
        self.dst
    }

    #[inline]
    pub const fn promote(&self) -> Option<PromotePiece> {
        self.promote
    }
}
