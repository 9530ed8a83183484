//! Reading and writing positions in Forsyth–Edwards notation
//!
//! # Example
//!
//! ```
//! # use arbiter::fen::{self, Fen};
//! # use std::str::FromStr;
//! #
//! let fen = Fen::from_str("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1").unwrap();
//! assert_eq!(fen.halfmove_clock, 0);
//! assert_eq!(fen.fullmove_number, 1);
//! assert_eq!(fen.to_string(), "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1");
//! ```

use crate::board::Board;
use crate::rules::{self, Context, Snapshot};
use crate::types::{
    CastlingRights, CastlingRightsParseError, Cell, Color, ColorParseError, Coord, CoordError,
    File, Piece, Rank,
};
use crate::{bitboard_consts, geometry};

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use thiserror::Error;

/// Error parsing the first field of FEN (i.e. the positions of pieces on the board)
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum CellsParseError {
    /// Rank is too large
    #[error("too many items in rank {0}")]
    RankOverflow(Rank),
    /// Rank is too small
    #[error("not enough items in rank {0}")]
    RankUnderflow(Rank),
    /// Two digits in a row
    #[error("consecutive digits in rank {0}")]
    ConsecutiveDigits(Rank),
    /// Too many ranks
    #[error("too many ranks")]
    Overflow,
    /// Not enough ranks
    #[error("not enough ranks")]
    Underflow,
    /// Unexpected character
    #[error("unexpected char {0:?}")]
    UnexpectedChar(char),
}

/// Position described by FEN is not valid
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum ValidateError {
    /// One of the sides doesn't have a king
    #[error("no king of color {0:?}")]
    NoKing(Color),
    /// One of the sides has more than one king
    #[error("more than one king of color {0:?}")]
    TooManyKings(Color),
    /// There is a pawn on the first or on the last rank
    #[error("invalid pawn position {0}")]
    InvalidPawn(Coord),
    /// The king of the side which is not to move is under attack
    #[error("opponent's king is attacked")]
    OpponentKingAttacked,
}

/// Error parsing FEN
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum FenError {
    /// FEN contains non-ASCII characters
    #[error("non-ASCII data in FEN")]
    NonAscii,
    /// FEN doesn't consist of exactly six fields
    #[error("expected 6 fields, got {0}")]
    FieldCount(usize),
    /// Error parsing board from FEN
    #[error("bad board: {0}")]
    Board(#[from] CellsParseError),
    /// Error parsing move side from FEN
    #[error("bad move side: {0}")]
    MoveSide(#[from] ColorParseError),
    /// Error parsing castling rights from FEN
    #[error("bad castling rights: {0}")]
    Castling(#[from] CastlingRightsParseError),
    /// Error parsing en passant from FEN
    #[error("bad enpassant: {0}")]
    Enpassant(#[from] CoordError),
    /// En passant square is on the wrong rank for the side to move
    #[error("invalid enpassant rank {0}")]
    InvalidEnpassantRank(Rank),
    /// Error parsing halfmove clock
    #[error("bad halfmove clock: {0}")]
    HalfmoveClock(ParseIntError),
    /// Error parsing fullmove number
    #[error("bad fullmove number: {0}")]
    FullmoveNumber(ParseIntError),
    /// Fullmove number is zero
    #[error("fullmove number must be positive")]
    ZeroFullmoveNumber,
    /// The position is not valid
    #[error("invalid position: {0}")]
    Valid(#[from] ValidateError),
}

/// Position together with move counters, as described by FEN
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fen {
    pub snapshot: Snapshot,
    /// Number of half-moves since the last capture or pawn move
    pub halfmove_clock: u32,
    /// Move number, incremented after each move by Black
    pub fullmove_number: u32,
}

impl Fen {
    /// Returns the initial position
    pub fn initial() -> Fen {
        Fen {
            snapshot: Snapshot::initial(),
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }
}

fn parse_rank(s: &str, rank: Rank, board: &mut Board) -> Result<(), CellsParseError> {
    type Error = CellsParseError;

    let mut file = 0_usize;
    let mut prev_digit = false;
    for b in s.bytes() {
        match b {
            b'1'..=b'8' => {
                if prev_digit {
                    return Err(Error::ConsecutiveDigits(rank));
                }
                prev_digit = true;
                file += (b - b'0') as usize;
                if file > 8 {
                    return Err(Error::RankOverflow(rank));
                }
            }
            _ => {
                prev_digit = false;
                let cell = match Cell::from_char(b as char) {
                    Some(cell) if cell.is_occupied() => cell,
                    _ => return Err(Error::UnexpectedChar(b as char)),
                };
                if file >= 8 {
                    return Err(Error::RankOverflow(rank));
                }
                board.put2(File::from_index(file), rank, cell);
                file += 1;
            }
        }
    }
    if file < 8 {
        return Err(Error::RankUnderflow(rank));
    }
    Ok(())
}

fn parse_cells(s: &str) -> Result<Board, CellsParseError> {
    let mut board = Board::empty();
    let mut ranks = Rank::iter().rev();
    for part in s.split('/') {
        let rank = ranks.next().ok_or(CellsParseError::Overflow)?;
        parse_rank(part, rank, &mut board)?;
    }
    if ranks.next().is_some() {
        return Err(CellsParseError::Underflow);
    }
    Ok(board)
}

fn parse_enpassant(s: &str, side: Color) -> Result<Option<Coord>, FenError> {
    if s == "-" {
        return Ok(None);
    }
    let enpassant = Coord::from_str(s)?;
    if enpassant.rank() != geometry::enpassant_dst_rank(side) {
        return Err(FenError::InvalidEnpassantRank(enpassant.rank()));
    }
    Ok(Some(enpassant))
}

fn validate_board(b: &Board) -> Result<(), ValidateError> {
    for color in [Color::White, Color::Black] {
        match b.piece2(color, Piece::King).popcount() {
            0 => return Err(ValidateError::NoKing(color)),
            1 => {}
            _ => return Err(ValidateError::TooManyKings(color)),
        }
    }
    let pawns = b.piece2(Color::White, Piece::Pawn) | b.piece2(Color::Black, Piece::Pawn);
    let edges = bitboard_consts::rank(Rank::R1) | bitboard_consts::rank(Rank::R8);
    if let Some(c) = (pawns & edges).first() {
        return Err(ValidateError::InvalidPawn(c));
    }
    Ok(())
}

/// Returns `true` if a pawn of the opponent could have just made a double move over `ep`
fn is_enpassant_plausible(b: &Board, side: Color, ep: Coord) -> bool {
    let pawn = Coord::from_parts(ep.file(), geometry::enpassant_src_rank(side));
    let origin = Coord::from_parts(ep.file(), geometry::double_move_src_rank(side.inv()));
    b.get(pawn) == Cell::from_parts(side.inv(), Piece::Pawn)
        && b.get(ep).is_free()
        && b.get(origin).is_free()
}

/// Parses FEN string `s`
///
/// Castling rights which contradict the placement of kings and rooks are silently dropped. The
/// same happens to an en passant square if no pawn could have just made a double move over it.
pub fn parse(s: &str) -> Result<Fen, FenError> {
    type Error = FenError;

    if !s.is_ascii() {
        return Err(Error::NonAscii);
    }
    let fields: Vec<&str> = s.split_ascii_whitespace().collect();
    if fields.len() != 6 {
        return Err(Error::FieldCount(fields.len()));
    }

    let board = parse_cells(fields[0])?;
    let side = Color::from_str(fields[1])?;
    let castling = CastlingRights::from_str(fields[2])?;
    let en_passant = parse_enpassant(fields[3], side)?;
    let halfmove_clock = u32::from_str(fields[4]).map_err(Error::HalfmoveClock)?;
    let fullmove_number = u32::from_str(fields[5]).map_err(Error::FullmoveNumber)?;
    if fullmove_number == 0 {
        return Err(Error::ZeroFullmoveNumber);
    }

    validate_board(&board)?;
    if rules::is_in_check(&board, side.inv()) {
        return Err(ValidateError::OpponentKingAttacked.into());
    }

    let castling = castling.narrowed_to(|c| board.get(c));
    let en_passant = en_passant.filter(|&ep| is_enpassant_plausible(&board, side, ep));

    Ok(Fen {
        snapshot: Snapshot {
            board,
            side,
            context: Context {
                castling,
                en_passant,
            },
        },
        halfmove_clock,
        fullmove_number,
    })
}

/// Formats the position `s` with the given counters as FEN
pub fn format(s: &Snapshot, halfmove_clock: u32, fullmove_number: u32) -> String {
    let mut res = format!("{} {} {} ", s.board, s.side, s.context.castling);
    match s.context.en_passant {
        Some(ep) => res += &ep.to_string(),
        None => res.push('-'),
    }
    res + &format!(" {} {}", halfmove_clock, fullmove_number)
}

impl FromStr for Fen {
    type Err = FenError;

    #[inline]
    fn from_str(s: &str) -> Result<Fen, FenError> {
        parse(s)
    }
}

impl fmt::Display for Fen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(
            f,
            "{}",
            format(&self.snapshot, self.halfmove_clock, self.fullmove_number)
        )
    }
}
