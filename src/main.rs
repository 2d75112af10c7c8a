use std::io::{self, BufRead, Write};
use std::sync::atomic::Ordering;
use std::sync::mpsc::channel;
use std::thread;

use quince_chess::uci::uci_top::UciState;

/// Three threads: stdin reader (this one), command worker, and response
/// printer. `go` blocks the worker while it searches, so `stop` and `quit`
/// flip the engine's stop flag from here before being forwarded.
fn main() {
    env_logger::init();

    let (command_tx, command_rx) = channel::<String>();
    let (response_tx, response_rx) = channel::<String>();

    let mut uci = UciState::new();
    let stop_flag = uci.stop_handle();

    let worker = thread::spawn(move || {
        while let Ok(line) = command_rx.recv() {
            let mut respond = |text: String| {
                let _ = response_tx.send(text);
            };
            if uci.handle_command(&line, &mut respond) {
                break;
            }
        }
    });

    let printer = thread::spawn(move || {
        while let Ok(line) = response_rx.recv() {
            println!("{line}");
            let _ = io::stdout().flush();
        }
    });

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let Ok(line) = line else {
            break;
        };
        let trimmed = line.trim().to_owned();
        if trimmed.is_empty() {
            continue;
        }

        let is_quit = trimmed == "quit";
        if is_quit || trimmed == "stop" {
            stop_flag.store(true, Ordering::Relaxed);
        }
        if command_tx.send(trimmed).is_err() || is_quit {
            break;
        }
    }

    drop(command_tx);
    let _ = worker.join();
    let _ = printer.join();
}
