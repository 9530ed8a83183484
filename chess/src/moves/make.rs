//! Applying moves to the board
//!
//! Nothing here checks legality. The functions assume that the move was already validated by
//! [`rules`](crate::rules) and only perform the mechanics of the move.

use super::base::{Move, PromotePiece};
use crate::board::Board;
use crate::geometry;
use crate::rules::Context;
use crate::types::{CastlingSide, Cell, Color, Coord, Piece};

/// Kind of the move, as inferred from the board
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MoveKind {
    /// Non-pawn move or capture, except castling
    Simple,
    /// Single pawn move, either non-capture or capture
    PawnSimple,
    /// Double pawn move
    PawnDouble,
    /// En passant capture
    Enpassant,
    /// Castling, the king moves two squares and the rook jumps over it
    Castling(CastlingSide),
    /// Pawn promotion, either non-capture or capture
    Promote(PromotePiece),
}

/// Summary of an applied move
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Applied {
    pub kind: MoveKind,
    /// Color of the moved piece
    pub side: Color,
    /// Kind of the moved piece before the move
    pub piece: Piece,
    pub captured: Option<Piece>,
}

impl Applied {
    #[inline]
    pub fn is_capture(&self) -> bool {
        self.captured.is_some()
    }

    /// Returns `true` if the move resets the halfmove clock
    #[inline]
    pub fn is_irreversible(&self) -> bool {
        self.piece == Piece::Pawn || self.is_capture()
    }
}

/// Infers the kind of move `mv` on board `b`
///
/// Returns `None` if the source square is empty.
pub fn classify(b: &Board, mv: Move) -> Option<MoveKind> {
    let (color, piece) = b.get(mv.src()).parts()?;
    let (src, dst) = (mv.src(), mv.dst());
    let kind = match piece {
        Piece::Pawn => {
            if let Some(p) = mv.promote() {
                MoveKind::Promote(p)
            } else if src.file() != dst.file() && b.get(dst).is_free() {
                MoveKind::Enpassant
            } else if src.rank().index().abs_diff(dst.rank().index()) == 2 {
                MoveKind::PawnDouble
            } else {
                MoveKind::PawnSimple
            }
        }
        Piece::King if src == geometry::king_src(color) => {
            if dst == geometry::castling_king_dst(color, CastlingSide::King) {
                MoveKind::Castling(CastlingSide::King)
            } else if dst == geometry::castling_king_dst(color, CastlingSide::Queen) {
                MoveKind::Castling(CastlingSide::Queen)
            } else {
                MoveKind::Simple
            }
        }
        _ => MoveKind::Simple,
    };
    Some(kind)
}

/// Applies move `mv` to board `b`
///
/// Returns `None` and leaves the board untouched if the source square is empty.
pub fn apply(b: &mut Board, mv: Move) -> Option<Applied> {
    let kind = classify(b, mv)?;
    let (src, dst) = (mv.src(), mv.dst());
    let moved = b.remove(src);
    let (side, piece) = moved.parts()?;

    let captured = match kind {
        MoveKind::Enpassant => {
            let victim = Coord::from_parts(dst.file(), src.rank());
            b.remove(victim).piece()
        }
        _ => b.remove(dst).piece(),
    };

    match kind {
        MoveKind::Promote(p) => b.put(dst, Cell::from_parts(side, p.into())),
        MoveKind::Castling(castling) => {
            b.put(dst, moved);
            let rook = b.remove(geometry::castling_rook_src(side, castling));
            b.put(geometry::castling_rook_dst(side, castling), rook);
        }
        _ => b.put(dst, moved),
    }

    Some(Applied {
        kind,
        side,
        piece,
        captured,
    })
}

/// Returns the context of the position after move `mv` described by `applied`
///
/// Castling rights are revoked when the king moves, and when a rook leaves or is captured on its
/// home square. The en passant target is set only after a double pawn move.
pub fn next_context(ctx: &Context, mv: Move, applied: &Applied) -> Context {
    let mut castling = ctx.castling;
    if applied.piece == Piece::King {
        castling.unset_color(applied.side);
    }
    for color in [Color::White, Color::Black] {
        for side in [CastlingSide::King, CastlingSide::Queen] {
            let home = geometry::castling_rook_src(color, side);
            if mv.src() == home || mv.dst() == home {
                castling.unset(color, side);
            }
        }
    }

    let en_passant = match applied.kind {
        MoveKind::PawnDouble => mv
            .src()
            .try_shift(0, geometry::pawn_forward_delta(applied.side)),
        _ => None,
    };

    Context {
        castling,
        en_passant,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CastlingRights;
    use std::str::FromStr;

    fn mv(s: &str) -> Move {
        Move::from_str(s).unwrap()
    }

    fn coord(s: &str) -> Coord {
        Coord::from_str(s).unwrap()
    }

    #[test]
    fn test_simple() {
        let mut b = Board::initial();
        let ctx = Context::initial();

        let applied = apply(&mut b, mv("e2e4")).unwrap();
        assert_eq!(applied.kind, MoveKind::PawnDouble);
        assert_eq!(applied.side, Color::White);
        assert!(applied.is_irreversible());
        assert_eq!(b.to_string(), "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR");
        let ctx = next_context(&ctx, mv("e2e4"), &applied);
        assert_eq!(ctx.en_passant, Some(coord("e3")));
        assert_eq!(ctx.castling, CastlingRights::FULL);

        let applied = apply(&mut b, mv("g8f6")).unwrap();
        assert_eq!(applied.kind, MoveKind::Simple);
        assert!(!applied.is_irreversible());
        let ctx = next_context(&ctx, mv("g8f6"), &applied);
        assert_eq!(ctx.en_passant, None);
    }

    #[test]
    fn test_empty_source() {
        let mut b = Board::initial();
        assert_eq!(apply(&mut b, mv("e4e5")), None);
        assert_eq!(b, Board::initial());
    }

    #[test]
    fn test_castling() {
        let mut b = Board::initial();
        for s in ["f1", "g1", "b8", "c8", "d8"] {
            b.remove(coord(s));
        }
        let ctx = Context::initial();

        let applied = apply(&mut b, mv("e1g1")).unwrap();
        assert_eq!(applied.kind, MoveKind::Castling(CastlingSide::King));
        assert_eq!(b.to_string(), "r3kbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQ1RK1");
        let ctx = next_context(&ctx, mv("e1g1"), &applied);
        assert_eq!(ctx.castling.to_string(), "kq");

        let applied = apply(&mut b, mv("e8c8")).unwrap();
        assert_eq!(applied.kind, MoveKind::Castling(CastlingSide::Queen));
        assert_eq!(b.to_string(), "2kr1bnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQ1RK1");
        let ctx = next_context(&ctx, mv("e8c8"), &applied);
        assert_eq!(ctx.castling, CastlingRights::EMPTY);
    }

    #[test]
    fn test_rook_capture() {
        let mut b = Board::empty();
        b.put(coord("e1"), Cell::from_parts(Color::White, Piece::King));
        b.put(coord("e8"), Cell::from_parts(Color::Black, Piece::King));
        b.put(coord("a1"), Cell::from_parts(Color::White, Piece::Rook));
        b.put(coord("h8"), Cell::from_parts(Color::Black, Piece::Rook));
        b.put(coord("b7"), Cell::from_parts(Color::White, Piece::Bishop));
        b.put(coord("a8"), Cell::from_parts(Color::Black, Piece::Rook));
        let ctx = Context {
            castling: CastlingRights::from_str("Qkq").unwrap(),
            en_passant: None,
        };

        let applied = apply(&mut b, mv("b7a8")).unwrap();
        assert_eq!(applied.captured, Some(Piece::Rook));
        let ctx = next_context(&ctx, mv("b7a8"), &applied);
        assert_eq!(ctx.castling.to_string(), "Qk");

        let applied = apply(&mut b, mv("h8h1")).unwrap();
        let ctx = next_context(&ctx, mv("h8h1"), &applied);
        assert_eq!(ctx.castling.to_string(), "Q");
    }

    #[test]
    fn test_enpassant() {
        let mut b = Board::empty();
        b.put(coord("e1"), Cell::from_parts(Color::White, Piece::King));
        b.put(coord("e8"), Cell::from_parts(Color::Black, Piece::King));
        b.put(coord("e5"), Cell::from_parts(Color::White, Piece::Pawn));
        b.put(coord("d5"), Cell::from_parts(Color::Black, Piece::Pawn));

        let applied = apply(&mut b, mv("e5d6")).unwrap();
        assert_eq!(applied.kind, MoveKind::Enpassant);
        assert_eq!(applied.captured, Some(Piece::Pawn));
        assert!(b.get(coord("d5")).is_free());
        assert_eq!(b.get(coord("d6")), Cell::from_parts(Color::White, Piece::Pawn));
    }

    #[test]
    fn test_promote() {
        let mut b = Board::empty();
        b.put(coord("a1"), Cell::from_parts(Color::White, Piece::King));
        b.put(coord("h8"), Cell::from_parts(Color::Black, Piece::King));
        b.put(coord("b2"), Cell::from_parts(Color::Black, Piece::Pawn));
        b.put(coord("c1"), Cell::from_parts(Color::White, Piece::Knight));

        let applied = apply(&mut b, mv("b2c1r")).unwrap();
        assert_eq!(applied.kind, MoveKind::Promote(PromotePiece::Rook));
        assert_eq!(applied.captured, Some(Piece::Knight));
        assert_eq!(b.get(coord("c1")), Cell::from_parts(Color::Black, Piece::Rook));
        assert_eq!(b.piece2(Color::Black, Piece::Pawn).popcount(), 0);
    }
}
