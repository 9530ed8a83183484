// Simple command-line application to play chess
//
// Set `RUST_LOG=arbiter=trace` to see every applied move.

use arbiter::{
    board::PrettyStyle,
    pgn::{self, ExportOptions},
    Game, Move,
};
use std::io::{self, BufRead, Write};
use tracing_subscriber::EnvFilter;

fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let mut stdin = io::stdin().lock();
    let mut game = Game::new();

    while game.in_play() {
        println!("{}", game.pretty(PrettyStyle::Ascii));
        print!(
            "{} move ({}): ",
            game.side().as_long_str(),
            game.fullmove_number()
        );
        io::stdout().flush()?;
        let mut s = String::new();
        if stdin.read_line(&mut s)? == 0 {
            break;
        }
        let s = s.trim();

        if s == "resign" {
            let side = game.side();
            if let Err(e) = game.resign(side) {
                println!("Cannot resign: {}", e);
            }
            continue;
        }

        // Both SAN and UCI notations are accepted.
        let mv = match Move::from_san(s, game.snapshot()) {
            Ok(mv) => mv,
            Err(san_err) => match s.parse::<Move>() {
                Ok(mv) => mv,
                Err(_) => {
                    println!("Bad move: {}", san_err);
                    println!();
                    continue;
                }
            },
        };
        if let Err(e) = game.make_move(mv) {
            println!("Illegal move: {}", e);
        }
        println!();
    }

    println!("Game finished: {}", game.result());
    println!("{}", pgn::export(&game, &ExportOptions::default()));
    Ok(())
}
