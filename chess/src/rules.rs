//! Legality of moves
//!
//! All the functions here are stateless. They take a [`Board`] together with a [`Context`], which
//! holds the parts of the position not visible on the board.
//!
//! Legality is checked by copying: a candidate move is applied to a clone of the board, and
//! rejected if the king of the side that moved stays under attack.

use crate::bitboard::Bitboard;
use crate::board::Board;
use crate::moves::{make, Move, PromotePiece};
use crate::{geometry, pattern, zobrist};
use crate::types::{CastlingRights, CastlingSide, Cell, Color, Coord, Piece};

use arrayvec::ArrayVec;

/// List of moves
///
/// No chess position has more than 218 legal moves, so it never overflows.
pub type MoveList = ArrayVec<Move, 256>;

/// Parts of the position which are not visible on the board
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Context {
    pub castling: CastlingRights,
    /// Square passed over by the pawn which has just made a double move
    pub en_passant: Option<Coord>,
}

impl Context {
    /// Returns the context of the initial position
    pub const fn initial() -> Context {
        Context {
            castling: CastlingRights::FULL,
            en_passant: None,
        }
    }
}

/// Returns `true` if square `c` is attacked by any piece of color `by`
///
/// Castling never attacks anything, and en passant is not taken into account.
pub fn is_square_attacked(b: &Board, c: Coord, by: Color) -> bool {
    let occupied = b.occupied();
    let queens = b.piece2(by, Piece::Queen);
    (pattern::pawn_captures(by.inv(), c) & b.piece2(by, Piece::Pawn)).is_nonempty()
        || (pattern::knight_jumps(c) & b.piece2(by, Piece::Knight)).is_nonempty()
        || (pattern::king_jumps(c) & b.piece2(by, Piece::King)).is_nonempty()
        || (pattern::bishop_attacks(occupied, c) & (b.piece2(by, Piece::Bishop) | queens))
            .is_nonempty()
        || (pattern::rook_attacks(occupied, c) & (b.piece2(by, Piece::Rook) | queens))
            .is_nonempty()
}

/// Returns `true` if the king of color `c` is attacked
///
/// # Panics
///
/// Panics if there is no king of color `c` on the board.
pub fn is_in_check(b: &Board, c: Color) -> bool {
    is_square_attacked(b, b.king_pos(c), c.inv())
}

/// Returns the squares strictly between the king and the rook for castling
fn castling_gap(color: Color, side: CastlingSide) -> Bitboard {
    let king = geometry::king_src(color);
    let rook = geometry::castling_rook_src(color, side);
    let (lo, hi) = if king.file() < rook.file() {
        (king, rook)
    } else {
        (rook, king)
    };
    (lo.file().index() + 1..hi.file().index())
        .map(|file| Coord::from_index(lo.index() - lo.file().index() + file))
        .collect()
}

fn castling_candidates(b: &Board, color: Color, ctx: &Context) -> Bitboard {
    let mut res = Bitboard::EMPTY;
    for side in [CastlingSide::King, CastlingSide::Queen] {
        if ctx.castling.has(color, side)
            && b.get(geometry::castling_rook_src(color, side))
                == Cell::from_parts(color, Piece::Rook)
            && (castling_gap(color, side) & b.occupied()).is_empty()
        {
            res.set(geometry::castling_king_dst(color, side));
        }
    }
    res
}

fn pawn_pseudo_legal(b: &Board, src: Coord, color: Color, ctx: &Context) -> Bitboard {
    let mut res = Bitboard::EMPTY;
    let forward = geometry::pawn_forward_delta(color);
    if let Some(one) = src.try_shift(0, forward) {
        if b.get(one).is_free() {
            res.set(one);
            if src.rank() == geometry::double_move_src_rank(color) {
                if let Some(two) = one.try_shift(0, forward) {
                    if b.get(two).is_free() {
                        res.set(two);
                    }
                }
            }
        }
    }
    let mut targets = b.pieces(color.inv());
    if let Some(ep) = ctx.en_passant {
        if ep.rank() == geometry::enpassant_dst_rank(color) && b.get(ep).is_free() {
            targets.set(ep);
        }
    }
    res | (pattern::pawn_captures(color, src) & targets)
}

/// Returns the pseudo-legal destinations of the piece on square `src`
///
/// These are the destinations allowed by the movement rules of the piece, without checking
/// whether the king of the moving side stays safe. For a king, castling destinations are included
/// if the right is held, the king and the rook stand on their home squares and the squares between
/// them are empty.
pub fn pseudo_legal(b: &Board, src: Coord, ctx: &Context) -> Bitboard {
    let (color, piece) = match b.get(src).parts() {
        Some(parts) => parts,
        None => return Bitboard::EMPTY,
    };
    let own = b.pieces(color);
    match piece {
        Piece::Pawn => pawn_pseudo_legal(b, src, color, ctx),
        Piece::King if src == geometry::king_src(color) => {
            (pattern::king_jumps(src) & !own) | castling_candidates(b, color, ctx)
        }
        _ => pattern::piece_attacks(piece, color, b, src) & !own,
    }
}

/// Applies the move on a copy of the board and checks that the king of `color` is safe
fn keeps_king_safe(b: &Board, mv: Move, color: Color) -> bool {
    let mut next = b.clone();
    match make::apply(&mut next, mv) {
        Some(_) => !is_in_check(&next, color),
        None => false,
    }
}

fn is_legal_destination(
    b: &Board,
    src: Coord,
    dst: Coord,
    color: Color,
    piece: Piece,
    ctx: &Context,
) -> bool {
    let is_castling = piece == Piece::King
        && src.file().index().abs_diff(dst.file().index()) == 2;
    if is_castling {
        let side = if dst.file() > src.file() {
            CastlingSide::King
        } else {
            CastlingSide::Queen
        };
        if is_in_check(b, color)
            || is_square_attacked(b, geometry::castling_rook_dst(color, side), color.inv())
        {
            return false;
        }
    }

    let is_enpassant = piece == Piece::Pawn && src.file() != dst.file() && b.get(dst).is_free();
    if is_enpassant {
        let victim = Coord::from_parts(dst.file(), src.rank());
        if ctx.en_passant != Some(dst) || b.get(victim) != Cell::from_parts(color.inv(), Piece::Pawn)
        {
            return false;
        }
    }

    keeps_king_safe(b, Move::new_unchecked(src, dst, None), color)
}

/// Returns the legal destinations of the piece on square `src`
///
/// The side to move is not checked here: the result is computed as if the owner of the piece
/// were to move. For an empty square, returns an empty bitboard.
pub fn legal_moves(b: &Board, src: Coord, ctx: &Context) -> Bitboard {
    let (color, piece) = match b.get(src).parts() {
        Some(parts) => parts,
        None => return Bitboard::EMPTY,
    };
    pseudo_legal(b, src, ctx)
        .into_iter()
        .filter(|&dst| is_legal_destination(b, src, dst, color, piece, ctx))
        .collect()
}

/// Returns `true` if a pawn of color `color` moving to `dst` must promote
#[inline]
pub fn needs_promotion(piece: Piece, color: Color, dst: Coord) -> bool {
    piece == Piece::Pawn && dst.rank() == geometry::promote_rank(color)
}

/// Returns all the legal moves of side `side`
///
/// Each promotion destination produces four moves, one per promotion piece.
pub fn all_legal_moves(b: &Board, side: Color, ctx: &Context) -> MoveList {
    let mut res = MoveList::new();
    for src in b.pieces(side) {
        let piece = match b.get(src).piece() {
            Some(piece) => piece,
            None => continue,
        };
        for dst in legal_moves(b, src, ctx) {
            if needs_promotion(piece, side, dst) {
                for p in PromotePiece::ALL {
                    res.push(Move::new_unchecked(src, dst, Some(p)));
                }
            } else {
                res.push(Move::new_unchecked(src, dst, None));
            }
        }
    }
    res
}

/// Returns `true` if side `side` has at least one legal move
pub fn has_any_legal_move(b: &Board, side: Color, ctx: &Context) -> bool {
    b.pieces(side).into_iter().any(|src| {
        let piece = match b.get(src).piece() {
            Some(piece) => piece,
            None => return false,
        };
        pseudo_legal(b, src, ctx)
            .into_iter()
            .any(|dst| is_legal_destination(b, src, dst, side, piece, ctx))
    })
}

/// Position without move counters
///
/// Contains everything needed to find the legal moves: the board, the side to move and the
/// context. Two snapshots with equal signatures are the same position for the purpose of
/// repetition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Snapshot {
    pub board: Board,
    pub side: Color,
    pub context: Context,
}

impl Snapshot {
    /// Returns the initial position
    pub fn initial() -> Snapshot {
        Snapshot {
            board: Board::initial(),
            side: Color::White,
            context: Context::initial(),
        }
    }

    /// Returns the Zobrist hash of the position
    pub fn signature(&self) -> u64 {
        let mut hash = self.board.zobrist_hash()
            ^ zobrist::castling(self.context.castling)
            ^ zobrist::move_side(self.side);
        if let Some(ep) = self.context.en_passant {
            hash ^= zobrist::enpassant(ep);
        }
        hash
    }

    #[inline]
    pub fn is_check(&self) -> bool {
        is_in_check(&self.board, self.side)
    }

    #[inline]
    pub fn has_legal_moves(&self) -> bool {
        has_any_legal_move(&self.board, self.side, &self.context)
    }

    /// Returns the legal destinations from `src`, or nothing if `src` is not occupied by the
    /// side to move
    pub fn legal_moves(&self, src: Coord) -> Bitboard {
        if self.board.get(src).color() != Some(self.side) {
            return Bitboard::EMPTY;
        }
        legal_moves(&self.board, src, &self.context)
    }

    #[inline]
    pub fn all_legal_moves(&self) -> MoveList {
        all_legal_moves(&self.board, self.side, &self.context)
    }

    /// Returns `true` if `mv` is legal, including the promotion policy
    pub fn is_legal(&self, mv: Move) -> bool {
        let piece = match self.board.get(mv.src()).parts() {
            Some((color, piece)) if color == self.side => piece,
            _ => return false,
        };
        needs_promotion(piece, self.side, mv.dst()) == mv.promote().is_some()
            && self.legal_moves(mv.src()).has(mv.dst())
    }

    /// Applies `mv` and passes the move to the opponent
    ///
    /// The move is not validated, so it must be legal. Returns `None` and leaves the position
    /// untouched if the source square is empty.
    pub fn make_move_unchecked(&mut self, mv: Move) -> Option<make::Applied> {
        let applied = make::apply(&mut self.board, mv)?;
        self.context = make::next_context(&self.context, mv, &applied);
        self.side = self.side.inv();
        Some(applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fen;
    use std::str::FromStr;

    fn coord(s: &str) -> Coord {
        Coord::from_str(s).unwrap()
    }

    fn coords(s: &str) -> Bitboard {
        s.split_whitespace().map(coord).collect()
    }

    fn position(fen: &str) -> (Board, Color, Context) {
        let s = fen::parse(fen).unwrap().snapshot;
        (s.board, s.side, s.context)
    }

    #[test]
    fn test_initial() {
        let b = Board::initial();
        let ctx = Context::initial();
        assert_eq!(all_legal_moves(&b, Color::White, &ctx).len(), 20);
        assert_eq!(all_legal_moves(&b, Color::Black, &ctx).len(), 20);
        assert_eq!(legal_moves(&b, coord("g1"), &ctx), coords("f3 h3"));
        assert_eq!(legal_moves(&b, coord("e2"), &ctx), coords("e3 e4"));
        assert_eq!(legal_moves(&b, coord("d1"), &ctx), Bitboard::EMPTY);
        assert_eq!(legal_moves(&b, coord("e4"), &ctx), Bitboard::EMPTY);
        assert!(!is_in_check(&b, Color::White));
        assert!(has_any_legal_move(&b, Color::White, &ctx));
    }

    #[test]
    fn test_attacks() {
        let (b, _, _) = position("4k3/8/8/8/1Q4K1/8/8/8 w - - 0 1");
        assert!(!is_in_check(&b, Color::Black));
        assert!(is_square_attacked(&b, coord("e7"), Color::White));
        assert!(is_square_attacked(&b, coord("b8"), Color::White));
        assert!(is_square_attacked(&b, coord("f8"), Color::White));
        assert!(!is_square_attacked(&b, coord("d8"), Color::White));
        assert!(is_square_attacked(&b, coord("f8"), Color::Black));
    }

    #[test]
    fn test_pinned() {
        let (b, _, ctx) = position("4k3/4r3/8/8/8/8/4N3/4K3 w - - 0 1");
        assert_eq!(pseudo_legal(&b, coord("e2"), &ctx).popcount(), 6);
        assert_eq!(legal_moves(&b, coord("e2"), &ctx), Bitboard::EMPTY);
        assert_eq!(
            legal_moves(&b, coord("e1"), &ctx),
            coords("d1 f1 d2 f2")
        );
    }

    #[test]
    fn test_castling() {
        let (b, _, ctx) = position("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        assert_eq!(
            legal_moves(&b, coord("e1"), &ctx),
            coords("d1 f1 d2 e2 f2 c1 g1")
        );

        // No castling through an attacked square
        let (b, _, ctx) = position("r3k2r/8/8/8/8/8/5r2/R3K2R w KQkq - 0 1");
        assert!(!legal_moves(&b, coord("e1"), &ctx).has(coord("g1")));

        // No castling out of check
        let (b, _, ctx) = position("r3k2r/8/8/8/8/8/4r3/R3K2R w KQkq - 0 1");
        assert!(!legal_moves(&b, coord("e1"), &ctx).has(coord("g1")));
        assert!(!legal_moves(&b, coord("e1"), &ctx).has(coord("c1")));

        // b1 may be attacked for queenside castling, but it must be empty
        let (b, _, ctx) = position("1r2k2r/8/8/8/8/8/8/R3K2R w KQk - 0 1");
        assert!(legal_moves(&b, coord("e1"), &ctx).has(coord("c1")));
        let (b, _, ctx) = position("r3k2r/8/8/8/8/8/8/RN2K2R w KQkq - 0 1");
        assert!(!legal_moves(&b, coord("e1"), &ctx).has(coord("c1")));

        // No right, no castling
        let (b, _, ctx) = position("r3k2r/8/8/8/8/8/8/R3K2R w kq - 0 1");
        assert_eq!(legal_moves(&b, coord("e1"), &ctx), coords("d1 f1 d2 e2 f2"));
    }

    #[test]
    fn test_enpassant() {
        let (b, side, ctx) = position("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2");
        assert_eq!(side, Color::White);
        assert_eq!(legal_moves(&b, coord("e5"), &ctx), coords("e6 d6"));

        let no_ep = Context {
            en_passant: None,
            ..ctx
        };
        assert_eq!(legal_moves(&b, coord("e5"), &no_ep), coords("e6"));

        // Capturing en passant would expose the king along the rank
        let (b, _, ctx) = position("8/8/8/K2pP2r/8/8/8/4k3 w - d6 0 2");
        assert!(!legal_moves(&b, coord("e5"), &ctx).has(coord("d6")));
    }

    #[test]
    fn test_promotion() {
        let (b, side, ctx) = position("8/4P3/8/8/8/8/k7/4K3 w - - 0 1");
        let moves = all_legal_moves(&b, side, &ctx);
        let promotions: Vec<_> = moves
            .iter()
            .filter(|mv| mv.src() == coord("e7"))
            .map(|mv| mv.to_string())
            .collect();
        assert_eq!(promotions, vec!["e7e8q", "e7e8r", "e7e8b", "e7e8n"]);
        assert!(needs_promotion(Piece::Pawn, Color::White, coord("e8")));
        assert!(!needs_promotion(Piece::Pawn, Color::Black, coord("e8")));
    }

    #[test]
    fn test_mate_and_stalemate() {
        let (b, side, ctx) = position("R5k1/5ppp/8/8/8/8/8/6K1 b - - 1 1");
        assert!(is_in_check(&b, side));
        assert!(!has_any_legal_move(&b, side, &ctx));
        assert_eq!(legal_moves(&b, coord("g8"), &ctx), Bitboard::EMPTY);

        let (b, side, ctx) = position("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1");
        assert!(!is_in_check(&b, side));
        assert!(!has_any_legal_move(&b, side, &ctx));
        assert!(all_legal_moves(&b, side, &ctx).is_empty());
    }

    #[test]
    fn test_snapshot() {
        let mut s = Snapshot::initial();
        let initial = s.signature();
        assert!(s.is_legal(Move::from_str("e2e4").unwrap()));
        assert!(!s.is_legal(Move::from_str("e2e5").unwrap()));
        assert!(!s.is_legal(Move::from_str("e7e5").unwrap()));
        assert_eq!(s.legal_moves(coord("e7")), Bitboard::EMPTY);

        s.make_move_unchecked(Move::from_str("g1f3").unwrap()).unwrap();
        assert_eq!(s.side, Color::Black);
        assert_ne!(s.signature(), initial);
        for mv in ["g8f6", "f3g1", "f6g8"] {
            s.make_move_unchecked(Move::from_str(mv).unwrap()).unwrap();
        }
        assert_eq!(s, Snapshot::initial());
        assert_eq!(s.signature(), initial);

        // Promotion must be given exactly when the pawn reaches the last rank
        let (board, side, context) = position("8/4P3/8/8/8/8/k7/4K3 w - - 0 1");
        let s = Snapshot {
            board,
            side,
            context,
        };
        assert!(s.is_legal(Move::from_str("e7e8n").unwrap()));
        assert!(!s.is_legal(Move::from_str("e7e8").unwrap()));
        assert!(s.is_legal(Move::from_str("e1d1").unwrap()));
        assert!(!s.is_legal(Move::from_str("e1d1q").unwrap()));
    }

    #[test]
    fn test_closure() {
        // Every pseudo-legal move is either returned as legal, or leaves the king in check
        let (b, side, ctx) =
            position("r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4");
        for src in b.pieces(side) {
            let legal = legal_moves(&b, src, &ctx);
            for dst in pseudo_legal(&b, src, &ctx) {
                let mut next = b.clone();
                make::apply(&mut next, Move::new_unchecked(src, dst, None)).unwrap();
                assert_eq!(legal.has(dst), !is_in_check(&next, side), "{} {}", src, dst);
            }
        }
    }
}
