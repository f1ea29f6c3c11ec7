//! Load a position file, replay its move list and print the resulting
//! multiverse with its turn status.
//!
//! Usage: `replay [position-file]` — with no argument the standard start
//! is shown. Set `RUST_LOG=quince_chess=debug` to watch the engine accept
//! and reject moves while the list replays.

use std::env;
use std::fs;
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use quince_chess::game_state::game_session::{GameSession, STANDARD_POSITION};
use quince_chess::utils::render_game_state::render_multiverse;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let text = match env::args().nth(1) {
        Some(path) => match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) => {
                eprintln!("cannot read {}: {}", path, err);
                return ExitCode::FAILURE;
            }
        },
        None => STANDARD_POSITION.to_owned(),
    };

    let session = match GameSession::from_notation(&text) {
        Ok(session) => session,
        Err(err) => {
            eprintln!("position rejected: {}", err);
            return ExitCode::FAILURE;
        }
    };

    print!("{}", render_multiverse(session.multiverse()));

    let (turn, side) = session.get_current_present();
    println!("To move: {} on turn {}", side, turn);

    let status = session.get_current_timeline_status();
    println!(
        "Timelines: mandatory {:?}, optional {:?}, unplayable {:?}",
        status.mandatory, status.optional, status.unplayable
    );

    let movable = session.get_movable_pieces();
    if !movable.is_empty() {
        let listed: Vec<String> = movable.iter().map(|c| c.to_string()).collect();
        println!("Movable: {}", listed.join(" "));
    }

    for (attacker, target) in session.get_current_checks() {
        println!("Check: {} threatens {}", attacker, target);
    }

    println!(
        "Status: {} (submit {}, undo {}, redo {})",
        session.get_match_status(),
        session.can_submit(),
        session.can_undo(),
        session.can_redo()
    );
    ExitCode::SUCCESS
}
