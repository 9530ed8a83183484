//! Raw movement patterns of the pieces
//!
//! These functions know nothing about checks, castling or en passant. They only describe which
//! squares a piece attacks from a given square, given the occupancy of the board.

use crate::bitboard::Bitboard;
use crate::board::Board;
use crate::types::{Color, Coord, Piece};

const fn bb(val: u64) -> Bitboard {
    Bitboard::from_raw(val)
}

include!(concat!(env!("OUT_DIR"), "/jumps.rs"));

const ROOK_DIRS: [(isize, isize); 4] = [(0, 1), (0, -1), (-1, 0), (1, 0)];
const BISHOP_DIRS: [(isize, isize); 4] = [(-1, 1), (-1, -1), (1, -1), (1, 1)];

#[inline]
pub fn king_jumps(c: Coord) -> Bitboard {
    KING_JUMPS[c.index()]
}

#[inline]
pub fn knight_jumps(c: Coord) -> Bitboard {
    KNIGHT_JUMPS[c.index()]
}

/// Squares attacked by a pawn of color `color` standing on `c`
#[inline]
pub fn pawn_captures(color: Color, c: Coord) -> Bitboard {
    PAWN_CAPTURES[color.index()][c.index()]
}

fn rays(occupied: Bitboard, c: Coord, dirs: &[(isize, isize)]) -> Bitboard {
    let mut res = Bitboard::EMPTY;
    for &(delta_file, delta_rank) in dirs {
        let mut p = c;
        while let Some(next) = p.try_shift(delta_file, delta_rank) {
            res.set(next);
            if occupied.has(next) {
                break;
            }
            p = next;
        }
    }
    res
}

/// Squares attacked by a bishop on `c`, including the first blocker on every ray
pub fn bishop_attacks(occupied: Bitboard, c: Coord) -> Bitboard {
    rays(occupied, c, &BISHOP_DIRS)
}

/// Squares attacked by a rook on `c`, including the first blocker on every ray
pub fn rook_attacks(occupied: Bitboard, c: Coord) -> Bitboard {
    rays(occupied, c, &ROOK_DIRS)
}

pub fn queen_attacks(occupied: Bitboard, c: Coord) -> Bitboard {
    bishop_attacks(occupied, c) | rook_attacks(occupied, c)
}

/// Squares attacked by piece `piece` of color `color` if it stood on `c`
///
/// The result may contain squares occupied by pieces of both colors.
pub fn piece_attacks(piece: Piece, color: Color, board: &Board, c: Coord) -> Bitboard {
    match piece {
        Piece::Pawn => pawn_captures(color, c),
        Piece::Knight => knight_jumps(c),
        Piece::Bishop => bishop_attacks(board.occupied(), c),
        Piece::Rook => rook_attacks(board.occupied(), c),
        Piece::Queen => queen_attacks(board.occupied(), c),
        Piece::King => king_jumps(c),
    }
}

/// Returns the raw attack pattern of the piece on square `c`
///
/// An empty square attacks nothing.
pub fn attacks(board: &Board, c: Coord) -> Bitboard {
    match board.get(c).parts() {
        Some((color, piece)) => piece_attacks(piece, color, board, c),
        None => Bitboard::EMPTY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Cell, File, Rank};
    use std::str::FromStr;

    fn coords(s: &str) -> Bitboard {
        s.split_whitespace()
            .map(|c| Coord::from_str(c).unwrap())
            .collect()
    }

    #[test]
    fn test_jumps() {
        let a1 = Coord::from_parts(File::A, Rank::R1);
        let d4 = Coord::from_parts(File::D, Rank::R4);
        assert_eq!(knight_jumps(a1), coords("b3 c2"));
        assert_eq!(knight_jumps(d4).popcount(), 8);
        assert_eq!(king_jumps(a1), coords("a2 b1 b2"));
        assert_eq!(king_jumps(d4).popcount(), 8);
        assert_eq!(pawn_captures(Color::White, d4), coords("c5 e5"));
        assert_eq!(pawn_captures(Color::Black, d4), coords("c3 e3"));
        assert_eq!(pawn_captures(Color::White, a1), coords("b2"));
    }

    #[test]
    fn test_sliders() {
        let d4 = Coord::from_parts(File::D, Rank::R4);
        assert_eq!(rook_attacks(Bitboard::EMPTY, d4).popcount(), 14);
        assert_eq!(bishop_attacks(Bitboard::EMPTY, d4).popcount(), 13);
        assert_eq!(queen_attacks(Bitboard::EMPTY, d4).popcount(), 27);

        let blockers = coords("d6 f4 b2");
        assert_eq!(
            rook_attacks(blockers, d4),
            coords("d5 d6 d3 d2 d1 c4 b4 a4 e4 f4")
        );
        assert_eq!(
            bishop_attacks(blockers, d4),
            coords("c5 b6 a7 e5 f6 g7 h8 c3 b2 e3 f2 g1")
        );
    }

    #[test]
    fn test_board() {
        let mut board = Board::empty();
        let d4 = Coord::from_parts(File::D, Rank::R4);
        assert_eq!(attacks(&board, d4), Bitboard::EMPTY);

        board.put(d4, Cell::from_parts(Color::White, Piece::Rook));
        board.put(
            Coord::from_parts(File::D, Rank::R6),
            Cell::from_parts(Color::Black, Piece::Pawn),
        );
        board.put(
            Coord::from_parts(File::F, Rank::R4),
            Cell::from_parts(Color::White, Piece::Knight),
        );
        // The pattern stops at and includes blockers of either color
        assert_eq!(
            attacks(&board, d4),
            coords("d5 d6 d3 d2 d1 c4 b4 a4 e4 f4")
        );
    }
}
