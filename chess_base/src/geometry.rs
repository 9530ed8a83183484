//! Rank and square constants that depend on the side to move

use crate::types::{CastlingSide, Color, Coord, File, Rank};

pub const fn castling_rank(c: Color) -> Rank {
    match c {
        Color::White => Rank::R1,
        Color::Black => Rank::R8,
    }
}

/// Rank from which pawns of color `c` may advance two squares
pub const fn double_move_src_rank(c: Color) -> Rank {
    match c {
        Color::White => Rank::R2,
        Color::Black => Rank::R7,
    }
}

pub const fn double_move_dst_rank(c: Color) -> Rank {
    match c {
        Color::White => Rank::R4,
        Color::Black => Rank::R5,
    }
}

/// Rank on which pawns of color `c` promote
pub const fn promote_rank(c: Color) -> Rank {
    match c {
        Color::White => Rank::R8,
        Color::Black => Rank::R1,
    }
}

/// Rank where a pawn of color `c` stands before capturing en passant
pub const fn enpassant_src_rank(c: Color) -> Rank {
    match c {
        Color::White => Rank::R5,
        Color::Black => Rank::R4,
    }
}

/// Rank of the en passant target square when color `c` is to move
pub const fn enpassant_dst_rank(c: Color) -> Rank {
    match c {
        Color::White => Rank::R6,
        Color::Black => Rank::R3,
    }
}

/// Rank delta of a single pawn push
pub const fn pawn_forward_delta(c: Color) -> isize {
    match c {
        Color::White => 1,
        Color::Black => -1,
    }
}

pub const fn king_src(c: Color) -> Coord {
    Coord::from_parts(File::E, castling_rank(c))
}

pub const fn castling_king_dst(c: Color, s: CastlingSide) -> Coord {
    match s {
        CastlingSide::King => Coord::from_parts(File::G, castling_rank(c)),
        CastlingSide::Queen => Coord::from_parts(File::C, castling_rank(c)),
    }
}

pub const fn castling_rook_src(c: Color, s: CastlingSide) -> Coord {
    match s {
        CastlingSide::King => Coord::from_parts(File::H, castling_rank(c)),
        CastlingSide::Queen => Coord::from_parts(File::A, castling_rank(c)),
    }
}

/// Square the rook lands on, which is also the square the king passes through
pub const fn castling_rook_dst(c: Color, s: CastlingSide) -> Coord {
    match s {
        CastlingSide::King => Coord::from_parts(File::F, castling_rank(c)),
        CastlingSide::Queen => Coord::from_parts(File::D, castling_rank(c)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_castling_squares() {
        assert_eq!(king_src(Color::White).to_string(), "e1");
        assert_eq!(king_src(Color::Black).to_string(), "e8");
        assert_eq!(
            castling_king_dst(Color::White, CastlingSide::King).to_string(),
            "g1"
        );
        assert_eq!(
            castling_rook_src(Color::Black, CastlingSide::Queen).to_string(),
            "a8"
        );
        assert_eq!(
            castling_rook_dst(Color::Black, CastlingSide::Queen).to_string(),
            "d8"
        );
    }

    #[test]
    fn test_pawn_ranks() {
        for c in [Color::White, Color::Black] {
            let delta = pawn_forward_delta(c);
            let src = double_move_src_rank(c).index() as isize;
            assert_eq!(double_move_dst_rank(c).index() as isize, src + 2 * delta);
            assert_eq!(
                enpassant_dst_rank(c).index() as isize,
                enpassant_src_rank(c).index() as isize + delta
            );
            assert_eq!(enpassant_src_rank(c), double_move_dst_rank(c.inv()));
        }
    }
}
