//! Long algebraic (UCI) text form of moves, like `e2e4` or `e7e8q`

use super::base::{Move, MoveError, PromotePiece};
use crate::types::{Coord, CoordError};

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Error parsing a move in UCI format
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum ParseError {
    /// Bad string length
    #[error("bad string length")]
    BadLength,
    /// Bad source square
    #[error("bad source: {0}")]
    BadSrc(CoordError),
    /// Bad destination square
    #[error("bad destination: {0}")]
    BadDst(CoordError),
    /// Bad promote character
    #[error("bad promote char {0:?}")]
    BadPromote(char),
    /// The parsed move is not well-formed
    #[error("cannot create move: {0}")]
    Create(#[from] MoveError),
}

fn promote_from_char(c: char) -> Option<PromotePiece> {
    match c {
        'n' => Some(PromotePiece::Knight),
        'b' => Some(PromotePiece::Bishop),
        'r' => Some(PromotePiece::Rook),
        'q' => Some(PromotePiece::Queen),
        _ => None,
    }
}

fn promote_to_char(p: PromotePiece) -> char {
    match p {
        PromotePiece::Knight => 'n',
        PromotePiece::Bishop => 'b',
        PromotePiece::Rook => 'r',
        PromotePiece::Queen => 'q',
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}{}", self.src(), self.dst())?;
        if let Some(p) = self.promote() {
            write!(f, "{}", promote_to_char(p))?;
        }
        Ok(())
    }
}

impl FromStr for Move {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Move, Self::Err> {
        if !matches!(s.len(), 4 | 5) || !s.is_ascii() {
            return Err(ParseError::BadLength);
        }
        let src = Coord::from_str(&s[0..2]).map_err(ParseError::BadSrc)?;
        let dst = Coord::from_str(&s[2..4]).map_err(ParseError::BadDst)?;
        let promote = match s[4..].chars().next() {
            Some(c) => Some(promote_from_char(c).ok_or(ParseError::BadPromote(c))?),
            None => None,
        };
        Ok(Move::from_parts(src, dst, promote)?)
    }
}
