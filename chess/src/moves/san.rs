//! Utilities to work with moves in SAN format

use super::base::{self, PromotePiece};
use super::make::{self, MoveKind};
use crate::bitboard::Bitboard;
use crate::bitboard_consts;
use crate::geometry;
use crate::rules::Snapshot;
use crate::types::{CastlingSide, Cell, Coord, CoordError, File, Piece, Rank};

use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use thiserror::Error;

/// Error parsing SAN representation from string
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum RawParseError {
    /// String is empty
    #[error("string is empty")]
    EmptyString,
    /// String contains non-ASCII characters
    #[error("non-ASCII data in move")]
    NonAscii,
    /// Destination cell is invalid
    #[error("invalid destination cell")]
    InvalidDst(#[from] CoordError),
    /// Extra bytes in non-pawn move
    #[error("non-pawn move too long")]
    NonPawnMoveTooLong,
    /// String for pawn move is too short
    #[error("pawn move too short")]
    PawnMoveTooShort,
    /// Extra bytes in pawn move
    #[error("pawn move too long")]
    PawnMoveTooLong,
    /// Parsing failed for unspecified reasons
    #[error("syntax error")]
    Syntax,
}

/// Error converting SAN move into [`moves::Move`](super::Move)
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum IntoMoveError {
    /// Capture sign is put when the move is non-capture
    #[error("got capture sign on a non-capture move")]
    CaptureExpected,
    /// Cannot find a corresponding legal move described by the given SAN string
    #[error("no such move")]
    NotFound,
    /// The description given by SAN string is ambiguous
    #[error("ambiguous move (candidates are at least `{0}` and `{1}`)")]
    Ambiguity(base::Move, base::Move),
}

/// Error parsing [`moves::Move`](super::Move) from SAN string
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum ParseError {
    /// Cannot parse SAN string
    #[error("cannot parse move: {0}")]
    Parse(#[from] RawParseError),
    /// Cannot convert a parsed string into a legal move
    #[error("cannot convert move: {0}")]
    Convert(#[from] IntoMoveError),
}

/// Error converting [`moves::Move`](super::Move) into SAN
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum FormatError {
    /// Only legal moves can be written in SAN
    #[error("move `{0}` is not legal")]
    NotLegal(base::Move),
}

/// Style for formatting SAN moves
///
/// Note that the style can be used only for _formatting_. Move parser only accepts
/// ASCII characters as piece names and doesn't accept Unicode pieces.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Style {
    /// Use capital Latin letters for pieces
    #[default]
    Algebraic,
    /// Use Unicode chess symbols for pieces
    Utf8,
}

trait PieceTheme {
    fn marker() -> PhantomData<Self>;
    fn piece_to_char(piece: Piece) -> char;
    fn promote_sign() -> &'static str;

    fn promote_to_char(promote: PromotePiece) -> char {
        Self::piece_to_char(promote.into())
    }
}

struct Utf8Theme;

impl PieceTheme for Utf8Theme {
    fn marker() -> PhantomData<Self> {
        PhantomData
    }

    fn promote_sign() -> &'static str {
        ""
    }

    fn piece_to_char(piece: Piece) -> char {
        match piece {
            Piece::Pawn => '♙',
            Piece::Knight => '♘',
            Piece::Bishop => '♗',
            Piece::Rook => '♖',
            Piece::Queen => '♕',
            Piece::King => '♔',
        }
    }
}

struct AlgebraicTheme;

impl PieceTheme for AlgebraicTheme {
    fn marker() -> PhantomData<Self> {
        PhantomData
    }

    fn promote_sign() -> &'static str {
        "="
    }

    fn piece_to_char(piece: Piece) -> char {
        piece.as_char()
    }
}

/// Parsed SAN string, without check indicator
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Data {
    /// Castling
    Castling(CastlingSide),
    /// Simple pawn move
    PawnMove {
        /// Destination square
        dst: Coord,
        /// Piece to promote, if any
        promote: Option<PromotePiece>,
    },
    /// Pawn capture
    PawnCapture {
        /// Source file
        src: File,
        /// Destination square
        dst: Coord,
        /// Piece to promote, if any
        promote: Option<PromotePiece>,
    },
    /// Non-pawn move
    Simple {
        /// Piece to move
        piece: Piece,
        /// Source file, if specified
        file: Option<File>,
        /// Source rank, if specified
        rank: Option<Rank>,
        /// Is the move capture?
        is_capture: bool,
        /// Destination square
        dst: Coord,
    },
}

struct PromoteFmt<T: PieceTheme>(Option<PromotePiece>, PhantomData<T>);

impl<T: PieceTheme> fmt::Display for PromoteFmt<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self.0 {
            None => Ok(()),
            Some(promote) => write!(f, "{}{}", T::promote_sign(), T::promote_to_char(promote)),
        }
    }
}

/// Finds out which parts of the source square are needed to tell `mv` apart from other moves
/// of the same kind of piece to the same square
struct AmbigDetector {
    mv: base::Move,
    sim_any: bool,
    sim_file: bool,
    sim_rank: bool,
}

impl AmbigDetector {
    fn new(mv: base::Move) -> Self {
        Self {
            mv,
            sim_any: false,
            sim_file: false,
            sim_rank: false,
        }
    }

    fn file(&self) -> Option<File> {
        if self.sim_any && (self.sim_rank || !self.sim_file) {
            return Some(self.mv.src().file());
        }
        None
    }

    fn rank(&self) -> Option<Rank> {
        if self.sim_any && self.sim_file {
            return Some(self.mv.src().rank());
        }
        None
    }

    fn push(&mut self, mv: base::Move) {
        if mv.src() == self.mv.src() {
            return;
        }
        self.sim_any = true;
        if self.mv.src().file() == mv.src().file() {
            self.sim_file = true;
        }
        if self.mv.src().rank() == mv.src().rank() {
            self.sim_rank = true;
        }
    }
}

#[derive(Copy, Clone)]
enum AmbigSearcherState {
    Empty,
    Found(base::Move),
    Ambiguity(base::Move, base::Move),
}

struct AmbigSearcher {
    srcs: Bitboard,
    state: AmbigSearcherState,
}

impl AmbigSearcher {
    fn new(file: Option<File>, rank: Option<Rank>) -> AmbigSearcher {
        let mut srcs = !Bitboard::EMPTY;
        if let Some(file) = file {
            srcs &= bitboard_consts::file(file);
        }
        if let Some(rank) = rank {
            srcs &= bitboard_consts::rank(rank);
        }
        AmbigSearcher {
            srcs,
            state: AmbigSearcherState::Empty,
        }
    }

    fn get_move(&self) -> Result<base::Move, IntoMoveError> {
        match &self.state {
            AmbigSearcherState::Empty => Err(IntoMoveError::NotFound),
            AmbigSearcherState::Found(mv) => Ok(*mv),
            AmbigSearcherState::Ambiguity(mv, mv2) => Err(IntoMoveError::Ambiguity(*mv, *mv2)),
        }
    }

    fn push(&mut self, mv: base::Move) {
        if !self.srcs.has(mv.src()) {
            return;
        }
        self.state = match self.state {
            AmbigSearcherState::Empty => AmbigSearcherState::Found(mv),
            AmbigSearcherState::Found(mv2) => AmbigSearcherState::Ambiguity(mv2, mv),
            s @ AmbigSearcherState::Ambiguity(_, _) => s,
        };
    }
}

impl Data {
    /// Returns the wrapper which helps to format the move with the given style `style`
    ///
    /// See [`Move::styled()`] doc for details.
    #[inline]
    pub fn styled(&self, style: Style) -> StyledData<'_> {
        StyledData(self, style)
    }

    /// Creates the parsed SAN from move `mv` of piece `piece` in position `s`
    ///
    /// The move must be legal, otherwise the result is meaningless.
    fn from_legal_move(mv: base::Move, piece: Piece, s: &Snapshot) -> Data {
        let b = &s.board;
        match piece {
            Piece::Pawn if mv.src().file() == mv.dst().file() => Data::PawnMove {
                dst: mv.dst(),
                promote: mv.promote(),
            },
            Piece::Pawn => Data::PawnCapture {
                src: mv.src().file(),
                dst: mv.dst(),
                promote: mv.promote(),
            },
            _ => {
                if let Some(MoveKind::Castling(side)) = make::classify(b, mv) {
                    return Data::Castling(side);
                }
                let mut detector = AmbigDetector::new(mv);
                for other in s.all_legal_moves() {
                    if other.dst() == mv.dst() && b.get(other.src()).piece() == Some(piece) {
                        detector.push(other);
                    }
                }
                Data::Simple {
                    piece,
                    file: detector.file(),
                    rank: detector.rank(),
                    is_capture: b.get(mv.dst()).is_occupied(),
                    dst: mv.dst(),
                }
            }
        }
    }

    fn matches(&self, mv: base::Move, s: &Snapshot) -> bool {
        let piece = s.board.get(mv.src()).piece();
        let file_changes = mv.src().file() != mv.dst().file();
        match *self {
            Data::Castling(side) => {
                piece == Some(Piece::King)
                    && make::classify(&s.board, mv) == Some(MoveKind::Castling(side))
            }
            Data::PawnMove { dst, promote } => {
                piece == Some(Piece::Pawn)
                    && mv.dst() == dst
                    && !file_changes
                    && mv.promote() == promote
            }
            Data::PawnCapture { src, dst, promote } => {
                piece == Some(Piece::Pawn)
                    && mv.src().file() == src
                    && mv.dst() == dst
                    && file_changes
                    && mv.promote() == promote
            }
            Data::Simple {
                piece: expected,
                dst,
                ..
            } => {
                piece == Some(expected)
                    && mv.dst() == dst
                    && make::classify(&s.board, mv) == Some(MoveKind::Simple)
            }
        }
    }

    /// Converts the parsed SAN into [`moves::Move`](super::Move) in the position `s`
    ///
    /// The resulting move is guaranteed to be legal.
    pub fn into_move(self, s: &Snapshot) -> Result<base::Move, IntoMoveError> {
        let mut searcher = match self {
            Data::Simple {
                file,
                rank,
                is_capture,
                dst,
                ..
            } => {
                if is_capture && s.board.get(dst).is_free() {
                    return Err(IntoMoveError::CaptureExpected);
                }
                AmbigSearcher::new(file, rank)
            }
            Data::PawnCapture { dst, .. } => {
                if s.board.get(dst).is_free() && s.context.en_passant != Some(dst) {
                    return Err(IntoMoveError::CaptureExpected);
                }
                AmbigSearcher::new(None, None)
            }
            _ => AmbigSearcher::new(None, None),
        };
        for mv in s.all_legal_moves() {
            if self.matches(mv, s) {
                searcher.push(mv);
            }
        }
        searcher.get_move()
    }

    /// Finds the move described by the parsed SAN by looking only at where the pieces stand
    ///
    /// Unlike [`Data::into_move()`], the move is not checked for legality. This is useful to
    /// report why a well-formed move cannot be made. Returns `None` if no single piece of the
    /// side to move fits the description.
    pub fn candidate(&self, s: &Snapshot) -> Option<base::Move> {
        let b = &s.board;
        let pawn = Cell::from_parts(s.side, Piece::Pawn);
        let back = -geometry::pawn_forward_delta(s.side);
        let (src, dst, promote) = match *self {
            Data::Castling(side) => (
                b.try_king_pos(s.side)?,
                geometry::castling_king_dst(s.side, side),
                None,
            ),
            Data::PawnMove { dst, promote } => {
                let mut src = dst.try_shift(0, back)?;
                if b.get(src).is_free() {
                    src = src.try_shift(0, back)?;
                }
                (src, dst, promote)
            }
            Data::PawnCapture { src, dst, promote } => {
                let delta = src.index() as isize - dst.file().index() as isize;
                (dst.try_shift(delta, back)?, dst, promote)
            }
            Data::Simple {
                piece,
                file,
                rank,
                dst,
                ..
            } => {
                let mut searcher = AmbigSearcher::new(file, rank);
                for src in b.piece2(s.side, piece) {
                    if src != dst {
                        searcher.push(base::Move::new_unchecked(src, dst, None));
                    }
                }
                return searcher.get_move().ok();
            }
        };
        if !matches!(*self, Data::Castling(_)) && b.get(src) != pawn {
            return None;
        }
        base::Move::from_parts(src, dst, promote).ok()
    }

    fn do_fmt<P: PieceTheme>(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match *self {
            Self::Castling(CastlingSide::King) => write!(f, "O-O"),
            Self::Castling(CastlingSide::Queen) => write!(f, "O-O-O"),
            Self::PawnMove { dst, promote } => {
                write!(f, "{}{}", dst, PromoteFmt(promote, P::marker()))
            }
            Self::PawnCapture { src, dst, promote } => {
                write!(
                    f,
                    "{}x{}{}",
                    src.as_char(),
                    dst,
                    PromoteFmt(promote, P::marker())
                )
            }
            Self::Simple {
                piece,
                file,
                rank,
                is_capture,
                dst,
            } => {
                write!(f, "{}", P::piece_to_char(piece))?;
                if let Some(file) = file {
                    write!(f, "{}", file.as_char())?;
                }
                if let Some(rank) = rank {
                    write!(f, "{}", rank.as_char())?;
                }
                if is_capture {
                    write!(f, "x")?;
                }
                write!(f, "{}", dst)
            }
        }
    }
}

impl fmt::Display for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        self.do_fmt::<AlgebraicTheme>(f)
    }
}

impl<'a> fmt::Display for StyledData<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self.1 {
            Style::Algebraic => self.0.do_fmt::<AlgebraicTheme>(f),
            Style::Utf8 => self.0.do_fmt::<Utf8Theme>(f),
        }
    }
}

fn piece_from_byte(b: u8) -> Option<Piece> {
    match b {
        b'N' | b'B' | b'R' | b'Q' | b'K' => Piece::from_char(b as char),
        _ => None,
    }
}

impl FromStr for Data {
    type Err = RawParseError;

    fn from_str(data: &str) -> Result<Data, Self::Err> {
        if data == "O-O" || data == "0-0" {
            return Ok(Self::Castling(CastlingSide::King));
        }
        if data == "O-O-O" || data == "0-0-0" {
            return Ok(Self::Castling(CastlingSide::Queen));
        }
        if data.is_empty() {
            return Err(RawParseError::EmptyString);
        }
        if !data.is_ascii() {
            return Err(RawParseError::NonAscii);
        }

        if let Some(piece) = piece_from_byte(data.as_bytes()[0]) {
            let rest = &data[1..];
            if rest.len() < 2 {
                return Err(RawParseError::Syntax);
            }
            let (rest, dst) = rest.split_at(rest.len() - 2);
            let dst = Coord::from_str(dst)?;
            let mut bytes = rest.as_bytes();
            let file = match bytes.first() {
                Some(b @ b'a'..=b'h') => {
                    bytes = &bytes[1..];
                    File::from_char(*b as char)
                }
                _ => None,
            };
            let rank = match bytes.first() {
                Some(b @ b'1'..=b'8') => {
                    bytes = &bytes[1..];
                    Rank::from_char(*b as char)
                }
                _ => None,
            };
            let is_capture = match bytes.first() {
                Some(b'x' | b':') => {
                    bytes = &bytes[1..];
                    true
                }
                _ => false,
            };
            if !bytes.is_empty() {
                return Err(RawParseError::NonPawnMoveTooLong);
            }
            return Ok(Data::Simple {
                piece,
                file,
                rank,
                is_capture,
                dst,
            });
        }

        let (promote, rest) = match data.as_bytes().split_last() {
            Some((&b @ (b'N' | b'B' | b'R' | b'Q'), _)) => {
                let promote = piece_from_byte(b).and_then(|p| PromotePiece::try_from(p).ok());
                let rest = &data[..data.len() - 1];
                (promote, rest.strip_suffix('=').unwrap_or(rest))
            }
            _ => (None, data),
        };

        if rest.len() < 2 {
            return Err(RawParseError::PawnMoveTooShort);
        }
        let (rest, dst) = rest.split_at(rest.len() - 2);
        let dst = Coord::from_str(dst)?;

        match rest.as_bytes() {
            [] => Ok(Data::PawnMove { dst, promote }),
            [src @ b'a'..=b'h', b':' | b'x'] => Ok(Data::PawnCapture {
                src: File::from_char(*src as char).ok_or(RawParseError::Syntax)?,
                dst,
                promote,
            }),
            [_] | [_, _] => Err(RawParseError::Syntax),
            _ => Err(RawParseError::PawnMoveTooLong),
        }
    }
}

/// Check indication
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum CheckMark {
    /// Check (a.k.a. "+")
    Single,
    /// Checkmate (a.k.a "#")
    Checkmate,
}

/// Parsed SAN move with a [`CheckMark`]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Move {
    /// Data without check mark
    pub data: Data,
    /// Check mark, if any
    pub check: Option<CheckMark>,
}

/// Wrapper to format [`Data`] with the given style
///
/// See [`Move::styled()`] doc for details.
pub struct StyledData<'a>(&'a Data, Style);

/// Wrapper to format [`Move`] with the given style
///
/// See [`Move::styled()`] doc for details.
pub struct StyledMove<'a>(&'a Move, Style);

impl Move {
    /// Returns the wrapper which helps to format the move with the given style `style`
    ///
    /// The resulting wrapper implements [`fmt::Display`], so can be used with
    /// `write!()`, `println!()`, or `ToString::to_string`.
    #[inline]
    pub fn styled(&self, style: Style) -> StyledMove<'_> {
        StyledMove(self, style)
    }

    fn do_fmt<P: PieceTheme>(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        self.data.do_fmt::<P>(f)?;
        match self.check {
            Some(CheckMark::Single) => write!(f, "+")?,
            Some(CheckMark::Checkmate) => write!(f, "#")?,
            None => {}
        };
        Ok(())
    }

    /// Creates the SAN for move `mv` in position `s`
    pub fn from_move(mv: base::Move, s: &Snapshot) -> Result<Move, FormatError> {
        let piece = match s.board.get(mv.src()).piece() {
            Some(piece) if s.is_legal(mv) => piece,
            _ => return Err(FormatError::NotLegal(mv)),
        };
        let data = Data::from_legal_move(mv, piece, s);
        let mut next = s.clone();
        next.make_move_unchecked(mv)
            .ok_or(FormatError::NotLegal(mv))?;
        let check = if next.is_check() {
            if next.has_legal_moves() {
                Some(CheckMark::Single)
            } else {
                Some(CheckMark::Checkmate)
            }
        } else {
            None
        };
        Ok(Move { data, check })
    }

    /// Converts the parsed SAN into [`moves::Move`](super::Move) in the position `s`
    ///
    /// The check mark is not verified.
    #[inline]
    pub fn into_move(self, s: &Snapshot) -> Result<base::Move, IntoMoveError> {
        self.data.into_move(s)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        self.do_fmt::<AlgebraicTheme>(f)
    }
}

impl<'a> fmt::Display for StyledMove<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self.1 {
            Style::Algebraic => self.0.do_fmt::<AlgebraicTheme>(f),
            Style::Utf8 => self.0.do_fmt::<Utf8Theme>(f),
        }
    }
}

impl FromStr for Move {
    type Err = RawParseError;

    fn from_str(s: &str) -> Result<Move, Self::Err> {
        let s = s.trim_end_matches(&['!', '?'][..]);
        let (check, s) = if let Some(rest) = s.strip_suffix('#') {
            (Some(CheckMark::Checkmate), rest)
        } else if let Some(rest) = s.strip_suffix("++") {
            (Some(CheckMark::Checkmate), rest)
        } else if let Some(rest) = s.strip_suffix('+') {
            (Some(CheckMark::Single), rest)
        } else {
            (None, s)
        };
        Ok(Move {
            data: Data::from_str(s)?,
            check,
        })
    }
}

impl base::Move {
    /// Creates a move from the SAN string `s` in position `snapshot`
    ///
    /// The returned move is guaranteed to be legal.
    pub fn from_san(s: &str, snapshot: &Snapshot) -> Result<base::Move, ParseError> {
        Ok(Move::from_str(s)?.into_move(snapshot)?)
    }

    /// Converts the move into SAN in position `snapshot`
    #[inline]
    pub fn san(&self, snapshot: &Snapshot) -> Result<Move, FormatError> {
        Move::from_move(*self, snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fen;

    fn snapshot(fen: &str) -> Snapshot {
        fen::parse(fen).unwrap().snapshot
    }

    fn uci(s: &str) -> base::Move {
        base::Move::from_str(s).unwrap()
    }

    #[test]
    fn test_simple() {
        let mut s = Snapshot::initial();
        for (mv_str, uci_str) in [
            ("e4", "e2e4"),
            ("Nc6", "b8c6"),
            ("Nf3", "g1f3"),
            ("e5", "e7e5"),
            ("Bb5", "f1b5"),
            ("Nf6", "g8f6"),
            ("O-O", "e1g1"),
            ("Nxe4", "f6e4"),
            ("Re1", "f1e1"),
            ("Qh4", "d8h4"),
            ("Kh1", "g1h1"),
        ] {
            let m = base::Move::from_san(mv_str, &s).unwrap();
            assert_eq!(m, uci(uci_str));
            assert_eq!(
                Move::from_str(mv_str).unwrap(),
                Move::from_move(m, &s).unwrap()
            );
            assert_eq!(m.san(&s).unwrap().to_string(), mv_str);
            s.make_move_unchecked(m).unwrap();
        }
        assert_eq!(
            fen::format(&s, 3, 6),
            "r1b1kb1r/pppp1ppp/2n5/1B2p3/4n2q/5N2/PPPP1PPP/RNBQR2K b kq - 3 6"
        );
    }

    #[test]
    fn test_conflict() {
        let s = snapshot("k5K1/8/5q2/6n1/8/2P5/5q2/8 b - - 0 1");
        for (san_str, uci_str) in [
            ("Qe5", "f6e5"),
            ("Qxc3", "f6c3"),
            ("Qb2", "f2b2"),
            ("Qe3", "f2e3"),
            ("Q2d4", "f2d4"),
            ("Q6d4", "f6d4"),
            ("Qf6d4", "f6d4"),
            ("Qfe5", "f6e5"),
            ("Q6e5", "f6e5"),
            ("Qf6e5", "f6e5"),
            ("Kaa7", "a8a7"),
        ] {
            assert_eq!(base::Move::from_san(san_str, &s), Ok(uci(uci_str)));
        }
        for san_str in ["Qa1", "Qg5", "Qge5", "Q5e5", "Qg5e5"] {
            assert_eq!(
                base::Move::from_san(san_str, &s),
                Err(ParseError::Convert(IntoMoveError::NotFound))
            );
        }
        for san_str in ["Qd4", "Qfd4"] {
            assert!(matches!(
                base::Move::from_san(san_str, &s),
                Err(ParseError::Convert(IntoMoveError::Ambiguity(_, _)))
            ));
        }
    }

    #[test]
    fn test_capture() {
        let s = snapshot("k5K1/8/p4q2/1P4n1/8/2P5/5q2/8 b - - 0 1");
        assert_eq!(
            base::Move::from_san("Qxe5", &s),
            Err(ParseError::Convert(IntoMoveError::CaptureExpected))
        );
        assert_eq!(base::Move::from_san("Qe5", &s), Ok(uci("f6e5")));
        assert_eq!(base::Move::from_san("Qc3", &s), Ok(uci("f6c3")));
        assert_eq!(base::Move::from_san("Qxc3", &s), Ok(uci("f6c3")));
        assert_eq!(base::Move::from_san("axb5", &s), Ok(uci("a6b5")));
        assert_eq!(
            base::Move::from_san("b5", &s),
            Err(ParseError::Convert(IntoMoveError::NotFound))
        );
        assert_eq!(
            base::Move::from_san("axa5", &s),
            Err(ParseError::Convert(IntoMoveError::CaptureExpected))
        );
        assert_eq!(base::Move::from_san("a5", &s), Ok(uci("a6a5")));
    }

    #[test]
    fn test_pawns() {
        for (fen_str, uci_str, mv_str) in [
            ("8/8/8/4p3/3P4/8/3P4/5K1k w - - 0 1", "d4e5", "dxe5"),
            ("8/8/8/2PpP3/8/8/5k1K/8 w - d6 0 1", "c5d6", "cxd6"),
            ("8/8/8/2PpP3/8/8/5k1K/8 w - d6 0 1", "e5d6", "exd6"),
            ("8/8/8/3pP3/2P5/8/5k1K/8 w - d6 0 1", "c4d5", "cxd5"),
            ("8/8/8/3pP3/2P5/8/5k1K/8 w - d6 0 1", "e5d6", "exd6"),
            ("2n2n1n/3P2P1/8/8/8/8/3K1k2/8 w - - 0 1", "d7d8n", "d8=N"),
            ("2n2n1n/3P2P1/8/8/8/8/3K1k2/8 w - - 0 1", "d7c8b", "dxc8=B"),
            ("2n2n1n/3P2P1/8/8/8/8/3K1k2/8 w - - 0 1", "g7f8r", "gxf8=R+"),
            ("2n2n1n/3P2P1/8/8/8/8/3K1k2/8 w - - 0 1", "g7h8q", "gxh8=Q"),
            ("8/8/8/8/3p3k/2P5/1PP4K/8 w - - 0 1", "b2b3", "b3"),
            ("8/8/8/8/3p3k/2P5/1PP4K/8 w - - 0 1", "b2b4", "b4"),
            ("8/8/8/8/3p3k/2P5/1PP4K/8 w - - 0 1", "c3c4", "c4"),
            ("8/8/8/8/3p3k/2P5/1PP4K/8 w - - 0 1", "c3d4", "cxd4"),
        ] {
            let s = snapshot(fen_str);
            let m = base::Move::from_san(mv_str, &s).unwrap();
            assert_eq!(m, uci(uci_str));
            assert_eq!(m.san(&s).unwrap().to_string(), mv_str);
            assert!(s.is_legal(m));
        }
    }

    #[test]
    fn test_promote_required() {
        let s = snapshot("2n2n1n/3P2P1/8/8/8/8/3K1k2/8 w - - 0 1");
        assert_eq!(
            base::Move::from_san("d8", &s),
            Err(ParseError::Convert(IntoMoveError::NotFound))
        );
        assert_eq!(base::Move::from_san("d8Q", &s), Ok(uci("d7d8q")));
        assert_eq!(
            uci("d7d8").san(&s),
            Err(FormatError::NotLegal(uci("d7d8")))
        );
    }

    #[test]
    fn test_tricky() {
        for (fen_str, uci_str, mv_str) in [
            ("4k3/6K1/8/2N5/8/8/8/N7 w - - 0 1", "a1b3", "Nab3"),
            ("4k3/6K1/8/N7/8/8/8/N7 w - - 0 1", "a1b3", "N1b3"),
            ("4k3/6K1/8/8/8/8/8/N1N5 w - - 0 1", "a1b3", "Nab3"),
            ("4k3/6K1/8/N1N5/8/8/8/N1N5 w - - 0 1", "a1b3", "Na1b3"),
            ("5k2/8/5K2/8/3R3R/8/8/b7 w - - 0 1", "h4f4", "Rf4"),
            ("4k3/6K1/8/2N5/8/1r6/8/N7 w - - 0 1", "a1b3", "Naxb3"),
            ("4k3/6K1/8/N7/8/1r6/8/N7 w - - 0 1", "a1b3", "N1xb3"),
            ("4k3/6K1/8/8/8/1r6/8/N1N5 w - - 0 1", "a1b3", "Naxb3"),
            ("4k3/6K1/8/N1N5/8/1r6/8/N1N5 w - - 0 1", "a1b3", "Na1xb3"),
        ] {
            let s = snapshot(fen_str);
            let m = base::Move::from_san(mv_str, &s).unwrap();
            assert_eq!(m, uci(uci_str));
            assert_eq!(
                Move::from_str(mv_str).unwrap(),
                Move::from_move(m, &s).unwrap()
            );
            assert_eq!(m.san(&s).unwrap().to_string(), mv_str);
        }
    }

    #[test]
    fn test_styled() {
        let s = snapshot("8/2P5/8/8/8/8/4k1K1/8 w - - 0 1");
        let king = uci("g2h2").san(&s).unwrap();
        assert_eq!(king.styled(Style::Utf8).to_string(), "♔h2");
        assert_eq!(king.styled(Style::Algebraic).to_string(), "Kh2");
        assert_eq!(
            uci("c7c8b").san(&s).unwrap().styled(Style::Utf8).to_string(),
            "c8♗"
        );
    }

    #[test]
    fn test_check() {
        let s = snapshot("1r5k/8/8/8/8/6p1/r7/5K2 b - - 0 1");
        assert_eq!(uci("g3g2").san(&s).unwrap().to_string(), "g2+");
        assert_eq!(uci("b8b1").san(&s).unwrap().to_string(), "Rb1#");
        for (san_str, uci_str) in [
            ("g2", "g3g2"),
            ("g2+", "g3g2"),
            ("Rb1", "b8b1"),
            ("Rb1+", "b8b1"),
            ("Rb1#", "b8b1"),
            ("Rb1#!?", "b8b1"),
        ] {
            assert_eq!(base::Move::from_san(san_str, &s), Ok(uci(uci_str)));
        }
    }

    #[test]
    fn test_castling() {
        let s = snapshot("r3k2r/8/8/8/8/8/8/R3K2R b KQkq - 0 1");
        assert_eq!(base::Move::from_san("O-O", &s), Ok(uci("e8g8")));
        assert_eq!(base::Move::from_san("0-0-0", &s), Ok(uci("e8c8")));
        assert_eq!(uci("e8c8").san(&s).unwrap().to_string(), "O-O-O");
        // Plain king moves are never written as castling
        assert_eq!(uci("e8f8").san(&s).unwrap().to_string(), "Kf8");
        assert_eq!(
            base::Move::from_san("Kg8", &s),
            Err(ParseError::Convert(IntoMoveError::NotFound))
        );
    }

    #[test]
    fn test_candidate() {
        let s = snapshot("rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2");
        let candidate = |san: &str| Move::from_str(san).unwrap().data.candidate(&s);
        assert_eq!(candidate("Ke3"), Some(uci("e1e3")));
        assert_eq!(candidate("e5"), Some(uci("e4e5")));
        assert_eq!(candidate("d4"), Some(uci("d2d4")));
        assert_eq!(candidate("dxe3"), Some(uci("d2e3")));
        assert_eq!(candidate("O-O"), Some(uci("e1g1")));
        assert_eq!(candidate("Rad4"), Some(uci("a1d4")));
        assert_eq!(candidate("Rd4"), None);
        assert_eq!(candidate("e6"), None);
        assert_eq!(candidate("a3"), Some(uci("a2a3")));
        assert_eq!(candidate("a6"), None);
    }

    #[test]
    fn test_bad_syntax() {
        assert_eq!(Move::from_str(""), Err(RawParseError::EmptyString));
        assert_eq!(Move::from_str("N"), Err(RawParseError::Syntax));
        assert_eq!(Move::from_str("e"), Err(RawParseError::PawnMoveTooShort));
        assert_eq!(Move::from_str("Nbd2d4"), Err(RawParseError::NonPawnMoveTooLong));
        assert_eq!(Move::from_str("exd4d5"), Err(RawParseError::PawnMoveTooLong));
        assert_eq!(
            Move::from_str("e9"),
            Err(RawParseError::InvalidDst(CoordError::UnexpectedRankChar('9')))
        );
        assert_eq!(Move::from_str("♘f3"), Err(RawParseError::NonAscii));
    }
}
