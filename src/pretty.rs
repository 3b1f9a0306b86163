//! Console log formatting for the server operator.

use owo_colors::OwoColorize;
use std::io::IsTerminal;

fn colored() -> bool {
    std::io::stdout().is_terminal()
}

/// Log a broadcast line as it goes out on the wire.
pub fn log_broadcast(line: &str) {
    if colored() {
        println!("{} {}", "[CAST]".cyan(), line);
    } else {
        println!("[CAST] {}", line);
    }
}

/// Log a lifecycle event (admission, barrier, round progress).
pub fn log_game(text: &str) {
    if colored() {
        println!("{} {}", "[GAME]".green(), text);
    } else {
        println!("[GAME] {}", text);
    }
}

/// Log a per-session event (handshake, departure).
pub fn log_session(text: &str) {
    if colored() {
        println!("{} {}", "[SESS]".yellow(), text);
    } else {
        println!("[SESS] {}", text);
    }
}
