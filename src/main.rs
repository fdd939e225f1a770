/*!
 * schedsim - Control REPL
 *
 * Line-oriented control surface over stdin/stdout:
 * - `NEW <name> <burst_time_ms> <priority>` prints the assigned pid
 * - `WAIT <pid> <duration_ms>` blocks a process for simulated I/O
 * - `STATS` prints the scheduler report
 */

use log::info;
use schedsim::control::{render, Command};
use schedsim::Engine;
use std::error::Error;
use std::io::{self, BufRead, Write};

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let engine = Engine::new();
    engine.start()?;
    info!("schedsim ready: NEW <name> <burst_ms> <priority> | WAIT <pid> <duration_ms> | STATS");

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("STATS") {
            print!("{}", render(&engine));
            io::stdout().flush()?;
            continue;
        }
        match Command::parse(input).and_then(|cmd| cmd.apply(&engine)) {
            Ok(Some(pid)) => println!("{}", pid),
            Ok(None) => {}
            Err(e) => eprintln!("error: {}", e),
        }
    }

    engine.stop();
    Ok(())
}
