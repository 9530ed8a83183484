use arbiter::moves::make;
use arbiter::pgn::{self, ExportOptions};
use arbiter::{rules, Cell, Coord, Game, Move, Piece, PromotePiece, Snapshot};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

const GAMES: u64 = 24;
const SHORT_PLIES: usize = 160;
const FULL_PLIES: usize = 3000;

fn random_game(seed: u64, max_plies: usize, mut check: impl FnMut(&Game)) -> Game {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut game = Game::new();
    for _ in 0..max_plies {
        check(&game);
        if !game.in_play() {
            return game;
        }
        let moves = game.all_legal_moves();
        let Some(&mv) = moves.choose(&mut rng) else {
            break;
        };
        game.make_move(mv).unwrap();
    }
    check(&game);
    game
}

fn check_fen(game: &Game) {
    let fen = game.fen();
    assert_eq!(Game::from_fen(&fen).unwrap().fen(), fen);
}

fn check_san(game: &Game) {
    let s = game.snapshot();
    for mv in game.all_legal_moves() {
        let san = mv.san(s).unwrap().to_string();
        assert_eq!(Move::from_san(&san, s), Ok(mv), "{} in {}", san, game.fen());
    }
}

fn leaves_king_attacked(s: &Snapshot, mv: Move) -> bool {
    let mut b = s.board.clone();
    make::apply(&mut b, mv).unwrap();
    rules::is_in_check(&b, s.side)
}

fn check_closure(game: &Game) {
    if !game.in_play() {
        return;
    }
    let s = game.snapshot();
    for mv in game.all_legal_moves() {
        assert!(!leaves_king_attacked(s, mv), "{} in {}", mv, game.fen());
    }
    for src in s.board.pieces(s.side) {
        let pseudo = rules::pseudo_legal(&s.board, src, &s.context);
        let legal = rules::legal_moves(&s.board, src, &s.context);
        assert_eq!(legal & !pseudo, arbiter::Bitboard::EMPTY);
        for dst in pseudo & !legal {
            let cell = s.board.get(src);
            let is_castling = cell.piece() == Some(Piece::King)
                && src.file().index().abs_diff(dst.file().index()) == 2;
            if is_castling {
                continue;
            }
            let mv = if cell == Cell::from_parts(s.side, Piece::Pawn)
                && rules::needs_promotion(Piece::Pawn, s.side, dst)
            {
                Move::with_promotion(src, dst, PromotePiece::Queen.into()).unwrap()
            } else {
                Move::new(src, dst).unwrap()
            };
            assert!(leaves_king_attacked(s, mv), "{} in {}", mv, game.fen());
        }
    }
}

#[test]
fn fen_round_trip() {
    for seed in 0..GAMES {
        random_game(seed, SHORT_PLIES, check_fen);
    }
}

#[test]
fn san_round_trip() {
    for seed in 0..GAMES / 4 {
        random_game(seed, SHORT_PLIES, check_san);
    }
}

#[test]
fn legality_closure() {
    for seed in 0..GAMES / 2 {
        random_game(seed, SHORT_PLIES, check_closure);
    }
}

#[test]
fn pgn_fidelity() {
    let mut finished = 0;
    for seed in 0..GAMES {
        let game = random_game(seed, FULL_PLIES, |_| {});
        if !game.in_play() {
            finished += 1;
        }
        let text = pgn::export(&game, &ExportOptions::default());
        let imported = pgn::import(&text).unwrap().game;
        assert_eq!(imported.fen(), game.fen(), "{}", text);
        assert_eq!(imported.result(), game.result());
        assert_eq!(imported.history(), game.history());
    }
    assert!(finished > GAMES / 2, "only {} games finished", finished);
}

#[test]
fn history_signatures() {
    let game = random_game(GAMES, FULL_PLIES, |_| {});
    let mut s = Snapshot::initial();
    for &(mv, signature) in game.history() {
        assert!(s.is_legal(mv));
        s.make_move_unchecked(mv).unwrap();
        assert_eq!(s.signature(), signature);
    }
    assert_eq!(&s, game.snapshot());
    assert!(Coord::iter().all(|c| s.board.get(c) == game.board().get(c)));
}
