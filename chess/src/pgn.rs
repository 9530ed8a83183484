//! Reading and writing games in Portable Game Notation
//!
//! Only a single game per input is supported. Comments, NAGs and variations are skipped on
//! import, and the export never produces them.
//!
//! # Example
//!
//! ```
//! # use arbiter::{Game, Move};
//! # use arbiter::pgn::{self, ExportOptions};
//! # use std::str::FromStr;
//! #
//! let mut game = Game::new();
//! for mv in ["e2e4", "e7e5", "g1f3"] {
//!     game.make_move(Move::from_str(mv).unwrap()).unwrap();
//! }
//! let text = pgn::export(&game, &ExportOptions::default());
//! assert!(text.ends_with("\n1. e4 e5 2. Nf3 *\n"));
//!
//! let imported = pgn::import(&text).unwrap();
//! assert_eq!(imported.game.fen(), game.fen());
//! assert_eq!(imported.tag("Result"), Some("*"));
//! ```

use crate::fen::{self, FenError};
use crate::game::{ActionError, Game, IllegalMove};
use crate::moves::san::{self, IntoMoveError};
use crate::types::{Color, DrawReason, GameResult, WinReason};

use std::iter::Peekable;
use std::str::{Chars, FromStr};

use thiserror::Error;
use tracing::debug;

/// Error importing PGN
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PgnError {
    /// Malformed tag pair
    #[error("bad tag pair at line {line}")]
    BadTag { line: usize },
    /// Comment in braces is not closed
    #[error("unterminated comment at line {line}")]
    UnterminatedComment { line: usize },
    /// Parentheses of variations do not match
    #[error("unbalanced variation at line {line}")]
    UnbalancedVariation { line: usize },
    /// `FEN` tag is invalid
    #[error("bad FEN tag: {0}")]
    Fen(#[from] FenError),
    /// Move text cannot be resolved in the current position
    #[error("cannot parse move #{ply} `{token}`: {source}")]
    Notation {
        ply: usize,
        token: String,
        source: san::ParseError,
    },
    /// Move was rejected by the game
    #[error("illegal move #{ply}: {source}")]
    Move { ply: usize, source: IllegalMove },
    /// Result token contradicts the result on the board
    #[error("result token `{token}` contradicts the final position ({actual})")]
    ResultMismatch { token: String, actual: GameResult },
    /// Result cannot be applied to the game
    #[error("cannot apply result: {0}")]
    Action(#[from] ActionError),
}

/// Tag values and layout used by [`export`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    pub event: String,
    pub site: String,
    pub date: String,
    pub round: String,
    pub white: String,
    pub black: String,
    /// Tags written after the standard ones
    pub extra: Vec<(String, String)>,
    /// Maximum length of a movetext line
    pub line_width: usize,
}

impl Default for ExportOptions {
    fn default() -> Self {
        ExportOptions {
            event: "?".to_string(),
            site: "?".to_string(),
            date: "????.??.??".to_string(),
            round: "?".to_string(),
            white: "?".to_string(),
            black: "?".to_string(),
            extra: Vec::new(),
            line_width: 80,
        }
    }
}

/// Game imported from PGN, with its tags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pgn {
    /// Tag pairs in the order of appearance
    pub tags: Vec<(String, String)>,
    pub game: Game,
}

impl Pgn {
    /// Returns the value of the first tag named `name`
    pub fn tag(&self, name: &str) -> Option<&str> {
        find_tag(&self.tags, name)
    }
}

fn find_tag<'a>(tags: &'a [(String, String)], name: &str) -> Option<&'a str> {
    tags.iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

fn termination(result: GameResult) -> Option<&'static str> {
    match result {
        GameResult::Win {
            reason: WinReason::TimeForfeit,
            ..
        } => Some("time forfeit"),
        GameResult::Win {
            reason: WinReason::Resignation,
            ..
        }
        | GameResult::Draw(DrawReason::Agreement) => Some("normal"),
        _ => None,
    }
}

fn wrap(tokens: impl Iterator<Item = String>, width: usize) -> String {
    let mut res = String::new();
    let mut line_len = 0;
    for token in tokens {
        if line_len != 0 && line_len + 1 + token.len() > width {
            res.push('\n');
            line_len = 0;
        }
        if line_len != 0 {
            res.push(' ');
            line_len += 1;
        }
        line_len += token.len();
        res += &token;
    }
    res.push('\n');
    res
}

/// Writes `game` as PGN
///
/// The Seven Tag Roster always comes first. `SetUp` and `FEN` are added for games that did
/// not start from the initial position, and `Termination` for results not implied by the
/// board.
pub fn export(game: &Game, opts: &ExportOptions) -> String {
    let result = game.result();
    let mut tags = vec![
        ("Event", opts.event.clone()),
        ("Site", opts.site.clone()),
        ("Date", opts.date.clone()),
        ("Round", opts.round.clone()),
        ("White", opts.white.clone()),
        ("Black", opts.black.clone()),
        ("Result", result.pgn_token().to_string()),
    ];
    let start = game.start();
    if *start != fen::Fen::initial() {
        tags.push(("SetUp", "1".to_string()));
        tags.push(("FEN", start.to_string()));
    }
    if let Some(term) = termination(result) {
        tags.push(("Termination", term.to_string()));
    }

    let mut res = String::new();
    for (name, value) in tags
        .iter()
        .map(|(k, v)| (*k, v.as_str()))
        .chain(opts.extra.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    {
        res += &format!("[{} \"{}\"]\n", name, escape(value));
    }
    res.push('\n');

    let moves = game.san_list().to_string();
    let tokens = moves
        .split_ascii_whitespace()
        .map(str::to_string)
        .chain(std::iter::once(result.pgn_token().to_string()));
    res += &wrap(tokens, opts.line_width);
    res
}

enum Token {
    Tag(String, String),
    Word(String),
}

struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
    line_start: bool,
}

impl<'a> Lexer<'a> {
    fn new(s: &'a str) -> Self {
        Lexer {
            chars: s.chars().peekable(),
            line: 1,
            line_start: true,
        }
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.line_start = c == '\n';
        if self.line_start {
            self.line += 1;
        }
        Some(c)
    }

    fn skip_line(&mut self) {
        while let Some(c) = self.bump() {
            if c == '\n' {
                break;
            }
        }
    }

    fn skip_comment(&mut self) -> Result<(), PgnError> {
        let line = self.line;
        loop {
            match self.bump() {
                Some('}') => return Ok(()),
                Some(_) => {}
                None => return Err(PgnError::UnterminatedComment { line }),
            }
        }
    }

    fn skip_variation(&mut self) -> Result<(), PgnError> {
        let line = self.line;
        let mut depth = 0_usize;
        loop {
            match self.bump() {
                Some('(') => depth += 1,
                Some(')') => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                Some('{') => self.skip_comment()?,
                Some(';') => self.skip_line(),
                Some(_) => {}
                None => return Err(PgnError::UnbalancedVariation { line }),
            }
        }
    }

    fn skip_spaces(&mut self) {
        while self.chars.peek().is_some_and(|c| c.is_whitespace()) {
            self.bump();
        }
    }

    fn tag(&mut self) -> Result<Token, PgnError> {
        let err = PgnError::BadTag { line: self.line };
        self.bump();
        self.skip_spaces();
        let mut name = String::new();
        while let Some(&c) = self.chars.peek() {
            if !(c.is_ascii_alphanumeric() || c == '_') {
                break;
            }
            name.push(c);
            self.bump();
        }
        self.skip_spaces();
        if name.is_empty() || self.bump() != Some('"') {
            return Err(err);
        }
        let mut value = String::new();
        loop {
            match self.bump() {
                Some('"') => break,
                Some('\\') => value.push(self.bump().ok_or_else(|| err.clone())?),
                Some('\n') | None => return Err(err),
                Some(c) => value.push(c),
            }
        }
        self.skip_spaces();
        if self.bump() != Some(']') {
            return Err(err);
        }
        Ok(Token::Tag(name, value))
    }

    fn word(&mut self) -> Token {
        let mut word: String = self.bump().into_iter().collect();
        while let Some(&c) = self.chars.peek() {
            if c.is_whitespace() || "{}()[];$".contains(c) {
                break;
            }
            word.push(c);
            self.bump();
        }
        Token::Word(word)
    }

    fn next_token(&mut self) -> Result<Option<Token>, PgnError> {
        loop {
            let c = match self.chars.peek() {
                Some(&c) => c,
                None => return Ok(None),
            };
            match c {
                c if c.is_whitespace() => {
                    self.bump();
                }
                '{' => {
                    self.bump();
                    self.skip_comment()?;
                }
                ';' => self.skip_line(),
                '%' if self.line_start => self.skip_line(),
                '$' => {
                    self.bump();
                    while self.chars.peek().is_some_and(|c| c.is_ascii_digit()) {
                        self.bump();
                    }
                }
                '(' => self.skip_variation()?,
                ')' | '}' => return Err(PgnError::UnbalancedVariation { line: self.line }),
                '[' => return self.tag().map(Some),
                ']' => return Err(PgnError::BadTag { line: self.line }),
                _ => return Ok(Some(self.word())),
            }
        }
    }
}

fn parse_result(token: &str, termination: Option<&str>) -> Option<GameResult> {
    let time_forfeit = termination.is_some_and(|t| t.eq_ignore_ascii_case("time forfeit"));
    let win_reason = if time_forfeit {
        WinReason::TimeForfeit
    } else {
        WinReason::Resignation
    };
    match token {
        "1-0" => Some(GameResult::win(Color::White, win_reason)),
        "0-1" => Some(GameResult::win(Color::Black, win_reason)),
        "1/2-1/2" => Some(GameResult::Draw(DrawReason::Agreement)),
        _ => None,
    }
}

fn is_result_token(word: &str) -> bool {
    matches!(word, "1-0" | "0-1" | "1/2-1/2" | "*")
}

/// Removes a move number like `12.` or `12...` from the start of `word`
fn strip_move_number(word: &str) -> &str {
    if !word.starts_with(|c: char| c.is_ascii_digit()) {
        return word;
    }
    match word.rfind('.') {
        Some(pos) => &word[pos + 1..],
        None => word,
    }
}

/// Reads a game from PGN
///
/// Moves are replayed through [`Game::make_move`]. If the final position is not terminal,
/// the result token is applied, using the `Termination` tag to tell a time forfeit from a
/// resignation.
pub fn import(s: &str) -> Result<Pgn, PgnError> {
    let mut lexer = Lexer::new(s);
    let mut tags = Vec::new();
    let mut words = Vec::new();
    let mut result_token = None;
    while let Some(token) = lexer.next_token()? {
        match token {
            Token::Tag(name, value) => tags.push((name, value)),
            Token::Word(word) if is_result_token(&word) => {
                result_token = Some(word);
                break;
            }
            Token::Word(word) => words.push(word),
        }
    }

    let mut game = start_game(&tags)?;
    let mut ply = 0;
    for word in &words {
        let word = strip_move_number(word);
        if word.is_empty() {
            continue;
        }
        ply += 1;
        let notation = |source: san::ParseError| PgnError::Notation {
            ply,
            token: word.to_string(),
            source,
        };
        let parsed = san::Move::from_str(word).map_err(|e| notation(e.into()))?;
        let mv = match parsed.into_move(game.snapshot()) {
            Ok(mv) => mv,
            // Let the game explain why a well-formed move cannot be made
            Err(IntoMoveError::NotFound) => parsed
                .data
                .candidate(game.snapshot())
                .ok_or_else(|| notation(IntoMoveError::NotFound.into()))?,
            Err(e) => return Err(notation(e.into())),
        };
        game.make_move(mv)
            .map_err(|source| PgnError::Move { ply, source })?;
    }

    let token = result_token
        .as_deref()
        .or_else(|| find_tag(&tags, "Result"))
        .unwrap_or("*");
    if let Some(result) = parse_result(token, find_tag(&tags, "Termination")) {
        if game.in_play() {
            game.finish(result)?;
        } else if game.result().pgn_token() != token {
            return Err(PgnError::ResultMismatch {
                token: token.to_string(),
                actual: game.result(),
            });
        }
    }
    debug!(plies = ply, result = %game.result(), "imported game");

    Ok(Pgn { tags, game })
}

fn start_game(tags: &[(String, String)]) -> Result<Game, PgnError> {
    match find_tag(tags, "FEN") {
        Some(fen) => Ok(Game::from_fen(fen)?),
        None => Ok(Game::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::Move;
    use crate::types::Coord;

    fn play(game: &mut Game, moves: &str) {
        for m in moves.split_whitespace() {
            game.make_move(Move::from_str(m).unwrap()).unwrap();
        }
    }

    #[test]
    fn test_export() {
        let mut game = Game::new();
        play(&mut game, "f2f3 e7e5 g2g4 d8h4");
        let opts = ExportOptions {
            white: "Fool".to_string(),
            black: "Scholar \"the\" Second".to_string(),
            ..ExportOptions::default()
        };
        assert_eq!(
            export(&game, &opts),
            r#"[Event "?"]
[Site "?"]
[Date "????.??.??"]
[Round "?"]
[White "Fool"]
[Black "Scholar \"the\" Second"]
[Result "0-1"]

1. f3 e5 2. g4 Qh4# 0-1
"#
        );
    }

    #[test]
    fn test_export_setup() {
        let mut game =
            Game::from_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1").unwrap();
        play(&mut game, "e7e5");
        game.resign(Color::White).unwrap();
        let text = export(&game, &ExportOptions::default());
        assert!(text.contains("[SetUp \"1\"]\n"));
        assert!(text.contains(
            "[FEN \"rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1\"]\n"
        ));
        assert!(text.contains("[Termination \"normal\"]\n"));
        assert!(text.ends_with("\n1... e5 0-1\n"));

        let imported = import(&text).unwrap();
        assert_eq!(imported.game.fen(), game.fen());
        assert_eq!(imported.game.result(), game.result());
    }

    #[test]
    fn test_wrap() {
        let mut game = Game::new();
        play(
            &mut game,
            "g1f3 g8f6 b1c3 b8c6 f3g1 f6g8 c3b1 c6b8 e2e4 e7e5 g1f3 g8f6 b1c3 b8c6 \
             f3g1 f6g8 c3b1 c6b8",
        );
        let text = export(&game, &ExportOptions::default());
        let movetext = text.split("\n\n").nth(1).unwrap();
        assert!(movetext.lines().count() > 1);
        assert!(movetext.lines().all(|l| l.len() <= 80));
        assert_eq!(import(&text).unwrap().game, game);
    }

    #[test]
    fn test_import() {
        const PGN: &str = r#"[Event "Casual game"]
[White "A"]
[Black "B"]
[Result "1-0"]
[Termination "time forfeit"]

% escaped line
1. e4 {best by test} e5 2. Nf3 $1 Nc6 (2... d6 3. d4 {Philidor} (3. Bc4)) 3. Bb5 ; Spanish
3... a6! 4.Ba4 1-0
"#;
        let pgn = import(PGN).unwrap();
        assert_eq!(pgn.tag("Event"), Some("Casual game"));
        assert_eq!(pgn.tags.len(), 5);
        assert_eq!(pgn.game.history().len(), 7);
        assert_eq!(
            pgn.game.result(),
            GameResult::win(Color::White, WinReason::TimeForfeit)
        );
        assert_eq!(
            pgn.game.board().get(Coord::from_str("a4").unwrap()).to_string(),
            "B"
        );
    }

    #[test]
    fn test_import_results() {
        let pgn = import("1. f3 e5 2. g4 Qh4# 0-1").unwrap();
        assert_eq!(
            pgn.game.result(),
            GameResult::win(Color::Black, WinReason::Checkmate)
        );
        let pgn = import("1. e4 e5 1/2-1/2").unwrap();
        assert_eq!(pgn.game.result(), GameResult::Draw(DrawReason::Agreement));
        let pgn = import("1. e4 e5 0-1").unwrap();
        assert_eq!(
            pgn.game.result(),
            GameResult::win(Color::Black, WinReason::Resignation)
        );
        let pgn = import("1. e4 *").unwrap();
        assert!(pgn.game.in_play());
        assert_eq!(
            import("1. f3 e5 2. g4 Qh4# 1-0"),
            Err(PgnError::ResultMismatch {
                token: "1-0".to_string(),
                actual: GameResult::win(Color::Black, WinReason::Checkmate),
            })
        );
    }

    #[test]
    fn test_import_errors() {
        assert!(matches!(
            import("1. e4 e5 2. Ke3"),
            Err(PgnError::Move {
                ply: 3,
                source: IllegalMove::NotLegal(_),
            })
        ));
        assert!(matches!(
            import("1. e4 e5 2. Nd4"),
            Err(PgnError::Notation { ply: 3, .. })
        ));
        assert!(matches!(
            import("1. f3 e5 2. g4 Qh4# 3. Kf2"),
            Err(PgnError::Move {
                ply: 5,
                source: IllegalMove::GameOver(_),
            })
        ));
        assert_eq!(
            import("1. e4 ] e5"),
            Err(PgnError::BadTag { line: 1 })
        );
        assert!(matches!(
            import("1. e4 e5 2. Nf3 %Nc6"),
            Err(PgnError::Notation { ply: 4, .. })
        ));
        assert!(matches!(
            import("[FEN \"8/8/8/8/8/8/8/8 w - - 0 1\"]\n1. e4"),
            Err(PgnError::Fen(_))
        ));
        assert_eq!(
            import("[Event \"x]\n1. e4"),
            Err(PgnError::BadTag { line: 1 })
        );
        assert_eq!(
            import("1. e4 {unclosed"),
            Err(PgnError::UnterminatedComment { line: 1 })
        );
        assert_eq!(
            import("1. e4 (1. d4\n"),
            Err(PgnError::UnbalancedVariation { line: 1 })
        );
        assert_eq!(
            import("1. e4 )"),
            Err(PgnError::UnbalancedVariation { line: 1 })
        );
    }
}
