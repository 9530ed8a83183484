use crate::types::{CastlingRights, Cell, Color, Coord};

include!(concat!(env!("OUT_DIR"), "/zobrist.rs"));

pub fn pieces(cell: Cell, coord: Coord) -> u64 {
    PIECES[cell.index()][coord.index()]
}

pub fn enpassant(coord: Coord) -> u64 {
    ENPASSANT[coord.index()]
}

pub fn castling(rights: CastlingRights) -> u64 {
    CASTLING[rights.index()]
}

pub fn move_side(side: Color) -> u64 {
    match side {
        Color::White => 0,
        Color::Black => MOVE_SIDE,
    }
}
