//! Board and related things

use crate::bitboard::Bitboard;
use crate::types::{Cell, Color, Coord, File, Piece, Rank};
use crate::zobrist;

use std::fmt::{self, Display};

/// Chess board
///
/// Holds the contents of all 64 squares, together with the indices derived from them (occupancy
/// of each color, squares of each kind of piece and the hash of the placement). The indices are
/// always kept in sync with the cells, as all the mutations go through [`Board::put()`] and
/// [`Board::remove()`].
///
/// The board knows nothing about the side to move, castling rights or en passant, and performs
/// no legality checks. See [`Game`](crate::game::Game) for the full state of the game.
///
/// # Example
///
/// ```
/// # use arbiter::{Board, Cell, Color, Coord, File, Piece, Rank};
/// #
/// let mut board = Board::empty();
/// let e4 = Coord::from_parts(File::E, Rank::R4);
/// board.put(e4, Cell::from_parts(Color::White, Piece::Knight));
/// assert_eq!(board.get(e4), Cell::from_parts(Color::White, Piece::Knight));
/// assert!(board.pieces(Color::White).has(e4));
/// assert_eq!(board.remove(e4), Cell::from_parts(Color::White, Piece::Knight));
/// assert!(board.get(e4).is_free());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    cells: [Cell; 64],
    colors: [Bitboard; 2],
    pieces: [Bitboard; Cell::COUNT],
    hash: u64,
}

impl Board {
    /// Returns a board without any pieces
    pub const fn empty() -> Board {
        Board {
            cells: [Cell::EMPTY; 64],
            colors: [Bitboard::EMPTY; 2],
            pieces: [Bitboard::EMPTY; Cell::COUNT],
            hash: 0,
        }
    }

    /// Returns a board with the initial position
    pub fn initial() -> Board {
        let mut res = Board::empty();
        for (color, back_rank, pawn_rank) in [
            (Color::White, Rank::R1, Rank::R2),
            (Color::Black, Rank::R8, Rank::R7),
        ] {
            for file in File::iter() {
                res.put2(file, pawn_rank, Cell::from_parts(color, Piece::Pawn));
            }
            for (file, piece) in File::iter().zip([
                Piece::Rook,
                Piece::Knight,
                Piece::Bishop,
                Piece::Queen,
                Piece::King,
                Piece::Bishop,
                Piece::Knight,
                Piece::Rook,
            ]) {
                res.put2(file, back_rank, Cell::from_parts(color, piece));
            }
        }
        res
    }

    /// Returns the contents of square `c`
    #[inline]
    pub fn get(&self, c: Coord) -> Cell {
        self.cells[c.index()]
    }

    /// Returns the contents of the square with file `file` and rank `rank`
    #[inline]
    pub fn get2(&self, file: File, rank: Rank) -> Cell {
        self.get(Coord::from_parts(file, rank))
    }

    /// Puts `cell` on square `c`, replacing whatever stood there
    ///
    /// Putting [`Cell::EMPTY`] is the same as calling [`Board::remove()`].
    pub fn put(&mut self, c: Coord, cell: Cell) {
        self.remove(c);
        if let Some(color) = cell.color() {
            self.cells[c.index()] = cell;
            self.colors[color.index()].set(c);
            self.pieces[cell.index()].set(c);
            self.hash ^= zobrist::pieces(cell, c);
        }
    }

    #[inline]
    pub fn put2(&mut self, file: File, rank: Rank, cell: Cell) {
        self.put(Coord::from_parts(file, rank), cell);
    }

    /// Clears square `c` and returns its previous contents
    pub fn remove(&mut self, c: Coord) -> Cell {
        let old = self.cells[c.index()];
        if let Some(color) = old.color() {
            self.cells[c.index()] = Cell::EMPTY;
            self.colors[color.index()].unset(c);
            self.pieces[old.index()].unset(c);
            self.hash ^= zobrist::pieces(old, c);
        }
        old
    }

    /// Returns the squares occupied by pieces of color `c`
    #[inline]
    pub fn pieces(&self, c: Color) -> Bitboard {
        self.colors[c.index()]
    }

    /// Returns the squares occupied by pieces of either color
    #[inline]
    pub fn occupied(&self) -> Bitboard {
        self.colors[0] | self.colors[1]
    }

    /// Returns the squares which contain `cell`
    ///
    /// For [`Cell::EMPTY`], returns an empty bitboard.
    #[inline]
    pub fn piece(&self, cell: Cell) -> Bitboard {
        self.pieces[cell.index()]
    }

    #[inline]
    pub fn piece2(&self, c: Color, p: Piece) -> Bitboard {
        self.piece(Cell::from_parts(c, p))
    }

    /// Returns the position of the king of color `c`, or `None` if there is no such king
    ///
    /// If there are multiple kings, returns the first one in scan order.
    #[inline]
    pub fn try_king_pos(&self, c: Color) -> Option<Coord> {
        self.piece2(c, Piece::King).first()
    }

    /// Returns the position of the king of color `c`
    ///
    /// # Panics
    ///
    /// Panics if there is no king of color `c`. Boards owned by a game always have one king of
    /// each color, so this indicates a broken invariant.
    pub fn king_pos(&self, c: Color) -> Coord {
        match self.try_king_pos(c) {
            Some(pos) => pos,
            None => panic!("board has no {} king", c.as_long_str()),
        }
    }

    /// Returns the hash of the piece placement
    ///
    /// Only pieces contribute to it. The hash of the full position also includes the side to
    /// move, castling rights and en passant.
    #[inline]
    pub fn zobrist_hash(&self) -> u64 {
        self.hash
    }

    /// Wraps the board to allow pretty-printing with the given style `Style`
    ///
    /// The resulting wrapper implements [`fmt::Display`], so can be used with
    /// `write!()`, `println!()`, or `ToString::to_string`.
    ///
    /// # Example
    ///
    /// ```
    /// # use arbiter::{Board, board::PrettyStyle};
    /// #
    /// let b = Board::initial();
    ///
    /// let res = r#"
    /// 8|rnbqkbnr
    /// 7|pppppppp
    /// 6|........
    /// 5|........
    /// 4|........
    /// 3|........
    /// 2|PPPPPPPP
    /// 1|RNBQKBNR
    /// -+--------
    ///  |abcdefgh
    /// "#;
    /// assert_eq!(b.pretty(PrettyStyle::Ascii).to_string().trim_matches('\n'), res.trim_matches('\n'));
    /// ```
    #[inline]
    pub fn pretty(&self, style: PrettyStyle) -> Pretty<'_> {
        Pretty {
            board: self,
            side: None,
            style,
        }
    }

    /// Same as [`Board::pretty()`], but also marks the side to move in the corner
    #[inline]
    pub fn pretty_with_side(&self, style: PrettyStyle, side: Color) -> Pretty<'_> {
        Pretty {
            board: self,
            side: Some(side),
            style,
        }
    }
}

impl Default for Board {
    #[inline]
    fn default() -> Board {
        Board::empty()
    }
}

/// Formats the piece placement, as in the first field of FEN
impl Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        for rank in Rank::iter().rev() {
            if rank != Rank::R8 {
                write!(f, "/")?;
            }
            let mut empty = 0;
            for file in File::iter() {
                let cell = self.get2(file, rank);
                if cell.is_free() {
                    empty += 1;
                    continue;
                }
                if empty != 0 {
                    write!(f, "{}", (b'0' + empty) as char)?;
                    empty = 0;
                }
                write!(f, "{}", cell)?;
            }
            if empty != 0 {
                write!(f, "{}", (b'0' + empty) as char)?;
            }
        }
        Ok(())
    }
}

/// Style for [`Board::pretty()`]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PrettyStyle {
    /// Print pieces and frames as ASCII characters
    Ascii,
    /// Print pieces and frames as fancy Unicode characters
    Utf8,
}

/// Wrapper to pretty-print the board
///
/// See docs for [`Board::pretty()`] for more details.
pub struct Pretty<'a> {
    board: &'a Board,
    side: Option<Color>,
    style: PrettyStyle,
}

trait StyleTable {
    const HORZ_FRAME: char;
    const VERT_FRAME: char;
    const ANGLE_FRAME: char;
    const WHITE_INDICATOR: char;
    const BLACK_INDICATOR: char;

    fn cell(c: Cell) -> char;

    fn indicator(c: Option<Color>) -> char {
        match c {
            Some(Color::White) => Self::WHITE_INDICATOR,
            Some(Color::Black) => Self::BLACK_INDICATOR,
            None => ' ',
        }
    }

    fn fmt(b: &Board, side: Option<Color>, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        for rank in Rank::iter().rev() {
            write!(f, "{}{}", rank, Self::VERT_FRAME)?;
            for file in File::iter() {
                write!(f, "{}", Self::cell(b.get2(file, rank)))?;
            }
            writeln!(f)?;
        }
        write!(f, "{}{}", Self::HORZ_FRAME, Self::ANGLE_FRAME)?;
        for _ in File::iter() {
            write!(f, "{}", Self::HORZ_FRAME)?;
        }
        writeln!(f)?;
        write!(f, "{}{}", Self::indicator(side), Self::VERT_FRAME)?;
        for file in File::iter() {
            write!(f, "{}", file)?;
        }
        writeln!(f)?;
        Ok(())
    }
}

struct AsciiStyleTable;
struct Utf8StyleTable;

impl StyleTable for AsciiStyleTable {
    const HORZ_FRAME: char = '-';
    const VERT_FRAME: char = '|';
    const ANGLE_FRAME: char = '+';
    const WHITE_INDICATOR: char = 'W';
    const BLACK_INDICATOR: char = 'B';

    fn cell(c: Cell) -> char {
        c.as_char()
    }
}

impl StyleTable for Utf8StyleTable {
    const HORZ_FRAME: char = '─';
    const VERT_FRAME: char = '│';
    const ANGLE_FRAME: char = '┼';
    const WHITE_INDICATOR: char = '○';
    const BLACK_INDICATOR: char = '●';

    fn cell(c: Cell) -> char {
        c.as_utf8_char()
    }
}

impl<'a> Display for Pretty<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self.style {
            PrettyStyle::Ascii => AsciiStyleTable::fmt(self.board, self.side, f),
            PrettyStyle::Utf8 => Utf8StyleTable::fmt(self.board, self.side, f),
        }
    }
}
