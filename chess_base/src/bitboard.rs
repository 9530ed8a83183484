//! Sets of squares packed into 64-bit words

use crate::types::Coord;
use derive_more::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not};
use std::fmt;

/// Set of squares
///
/// Bit `i` stands for the square with index `i`, so a1 is the lowest bit and h8 the highest.
/// Iteration goes in the same order, from a1 to h8 rank by rank.
#[derive(
    Default,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    BitAnd,
    BitAndAssign,
    BitOr,
    BitOrAssign,
    BitXor,
    BitXorAssign,
    Not,
)]
pub struct Bitboard(u64);

impl Bitboard {
    pub const EMPTY: Bitboard = Bitboard(0);

    #[inline]
    pub const fn from_raw(val: u64) -> Bitboard {
        Bitboard(val)
    }

    #[inline]
    pub const fn as_raw(&self) -> u64 {
        self.0
    }

    /// Returns a copy of the set with `c` added
    #[inline]
    pub const fn with(self, c: Coord) -> Bitboard {
        Bitboard(self.0 | (1_u64 << c.index()))
    }

    /// Returns a copy of the set with `c` removed
    #[inline]
    pub const fn without(self, c: Coord) -> Bitboard {
        Bitboard(self.0 & !(1_u64 << c.index()))
    }

    #[inline]
    pub fn set(&mut self, c: Coord) {
        *self = self.with(c);
    }

    #[inline]
    pub fn unset(&mut self, c: Coord) {
        *self = self.without(c);
    }

    #[inline]
    pub const fn has(&self, c: Coord) -> bool {
        (self.0 >> c.index()) & 1 != 0
    }

    /// Returns the square with the lowest index, or `None` if the set is empty
    #[inline]
    pub const fn first(&self) -> Option<Coord> {
        match self.0 {
            0 => None,
            v => Some(Coord::from_index(v.trailing_zeros() as usize)),
        }
    }

    #[inline]
    pub const fn popcount(&self) -> u32 {
        self.0.count_ones()
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_nonempty(&self) -> bool {
        self.0 != 0
    }
}

impl fmt::Debug for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        f.debug_set().entries(*self).finish()
    }
}

/// Draws the set as a board, with the eighth rank on top
///
/// Squares in the set are shown as `x`, and all the others as `.`.
impl fmt::Display for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        for rank in (0..8).rev() {
            for file in 0..8 {
                let c = if (self.0 >> (rank * 8 + file)) & 1 != 0 {
                    'x'
                } else {
                    '.'
                };
                write!(f, "{}", c)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Iterator over the squares of a [`Bitboard`]
pub struct Iter(u64);

impl Iterator for Iter {
    type Item = Coord;

    #[inline]
    fn next(&mut self) -> Option<Coord> {
        let res = Bitboard(self.0).first()?;
        self.0 &= self.0 - 1;
        Some(res)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.0.count_ones() as usize;
        (len, Some(len))
    }
}

impl ExactSizeIterator for Iter {}

impl IntoIterator for Bitboard {
    type Item = Coord;
    type IntoIter = Iter;

    #[inline]
    fn into_iter(self) -> Iter {
        Iter(self.0)
    }
}

impl FromIterator<Coord> for Bitboard {
    fn from_iter<I: IntoIterator<Item = Coord>>(iter: I) -> Bitboard {
        iter.into_iter().fold(Bitboard::EMPTY, Bitboard::with)
    }
}
