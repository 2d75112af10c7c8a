//! UCI protocol front-end.
//!
//! Parses commands, maintains the current game position, routes `go`
//! requests to the engine, and emits protocol-compliant responses through
//! a callback so the binary can run it behind channels. Cancellation is
//! not handled here: the stdin thread flips the engine's shared stop flag
//! directly, which a running search observes cooperatively.

use crate::driver::engine_trait::{Engine, GoParams};
use crate::driver::iterative_engine::{IterativeEngine, DEFAULT_HASH_MB};
use crate::movegen::make_unmake::make_move_in_place;
use crate::position::position::Position;
use crate::utils::board_display::render_position;
use crate::utils::long_algebraic::{move_to_long_algebraic, parse_uci_move};

const UCI_ENGINE_NAME: &str = "Quince Chess";
const UCI_ENGINE_AUTHOR: &str = "the Quince Chess developers";

pub struct UciState {
    position: Position,
    engine: Box<dyn Engine>,
    debug_mode: bool,
}

impl Default for UciState {
    fn default() -> Self {
        Self::new()
    }
}

impl UciState {
    pub fn new() -> Self {
        Self {
            position: Position::new_game(),
            engine: Box::new(IterativeEngine::new(DEFAULT_HASH_MB)),
            debug_mode: false,
        }
    }

    /// The engine's shared stop flag, for the stdin thread.
    pub fn stop_handle(&self) -> std::sync::Arc<std::sync::atomic::AtomicBool> {
        self.engine.stop_handle()
    }

    /// Process one command line. Returns `true` when the session should
    /// terminate.
    pub fn handle_command(&mut self, line: &str, respond: &mut dyn FnMut(String)) -> bool {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return false;
        }
        let mut parts = trimmed.split_whitespace();
        let command = parts.next().unwrap_or_default();

        match command {
            "uci" => {
                respond(format!("id name {UCI_ENGINE_NAME}"));
                respond(format!("id author {UCI_ENGINE_AUTHOR}"));
                respond("option name Hash type spin default 64 min 1 max 4096".to_owned());
                respond("option name MoveOverhead type spin default 30 min 0 max 5000".to_owned());
                respond(
                    "option name TimeStrategy type combo default adaptive var adaptive var fraction20"
                        .to_owned(),
                );
                respond("uciok".to_owned());
            }
            "debug" => {
                self.debug_mode = parts.next().unwrap_or_default().eq_ignore_ascii_case("on");
            }
            "isready" => respond("readyok".to_owned()),
            "setoption" => {
                if let Err(err) = self.handle_setoption(trimmed) {
                    respond(format!("info string setoption error: {err}"));
                }
            }
            "ucinewgame" => {
                self.position = Position::new_game();
                self.engine.new_game();
            }
            "position" => {
                if let Err(err) = self.handle_position(trimmed) {
                    respond(format!("info string position error: {err}"));
                }
            }
            "go" => {
                let params = parse_go_params(trimmed);
                match self.engine.choose_move(&self.position, &params, respond) {
                    Ok(output) => {
                        let text = output
                            .best_move
                            .map(move_to_long_algebraic)
                            .unwrap_or_else(|| "0000".to_owned());
                        respond(format!("bestmove {text}"));
                    }
                    Err(err) => {
                        respond(format!("info string go error: {err}"));
                        respond("bestmove 0000".to_owned());
                    }
                }
            }
            "stop" => {
                // The stop flag is flipped by the stdin thread before this
                // command is even dequeued; nothing left to do.
            }
            "d" | "display" => {
                for row in render_position(&self.position).lines() {
                    respond(format!("info string {row}"));
                }
            }
            "quit" => return true,
            _ => {
                // Unknown commands are ignored for UCI compatibility.
            }
        }

        false
    }

    fn handle_setoption(&mut self, line: &str) -> Result<(), String> {
        let mut tokens = line.split_whitespace();
        let _ = tokens.next(); // setoption

        let mut name_tokens = Vec::<&str>::new();
        let mut value_tokens = Vec::<&str>::new();
        let mut mode = "";
        for token in tokens {
            match token {
                "name" => mode = "name",
                "value" => mode = "value",
                _ if mode == "name" => name_tokens.push(token),
                _ if mode == "value" => value_tokens.push(token),
                _ => {}
            }
        }

        let name = name_tokens.join(" ");
        if name.is_empty() {
            return Err("missing option name".to_owned());
        }
        self.engine.set_option(&name, &value_tokens.join(" "))
    }

    fn handle_position(&mut self, line: &str) -> Result<(), String> {
        let mut tokens = line.split_whitespace().peekable();
        let _ = tokens.next(); // position

        let mut position = match tokens.next() {
            Some("startpos") => Position::new_game(),
            Some("fen") => {
                let mut fen_parts = Vec::<&str>::new();
                while let Some(&next) = tokens.peek() {
                    if next == "moves" {
                        break;
                    }
                    fen_parts.push(tokens.next().unwrap_or_default());
                }
                if fen_parts.is_empty() {
                    return Err("missing FEN after 'position fen'".to_owned());
                }
                Position::from_fen(&fen_parts.join(" ")).map_err(|err| err.to_string())?
            }
            Some(other) => return Err(format!("unsupported position token '{other}'")),
            None => return Err("incomplete position command".to_owned()),
        };

        if tokens.peek() == Some(&"moves") {
            let _ = tokens.next();
            for lan in tokens {
                // Unplayable move text is the sentinel, not a crash; the
                // position simply stops advancing there.
                let Some(mv) = parse_uci_move(&mut position, lan) else {
                    self.position = position;
                    return Err(format!("illegal or malformed move '{lan}'"));
                };
                make_move_in_place(&mut position, mv).map_err(|err| err.to_string())?;
            }
        }

        self.position = position;
        Ok(())
    }
}

fn parse_go_params(line: &str) -> GoParams {
    let mut params = GoParams::default();
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let mut i = 0usize;
    while i < tokens.len() {
        match tokens[i] {
            "depth" => {
                i += 1;
                params.depth = tokens.get(i).and_then(|x| x.parse().ok());
            }
            "nodes" => {
                i += 1;
                params.nodes = tokens.get(i).and_then(|x| x.parse().ok());
            }
            "movetime" => {
                i += 1;
                params.movetime_ms = tokens.get(i).and_then(|x| x.parse().ok());
            }
            "wtime" => {
                i += 1;
                params.wtime_ms = tokens.get(i).and_then(|x| x.parse().ok());
            }
            "btime" => {
                i += 1;
                params.btime_ms = tokens.get(i).and_then(|x| x.parse().ok());
            }
            "winc" => {
                i += 1;
                params.winc_ms = tokens.get(i).and_then(|x| x.parse().ok());
            }
            "binc" => {
                i += 1;
                params.binc_ms = tokens.get(i).and_then(|x| x.parse().ok());
            }
            "movestogo" => {
                i += 1;
                params.movestogo = tokens.get(i).and_then(|x| x.parse().ok());
            }
            "infinite" => params.infinite = true,
            _ => {}
        }
        i += 1;
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::piece_types::Color;

    fn drain(state: &mut UciState, line: &str) -> Vec<String> {
        let mut out = Vec::new();
        state.handle_command(line, &mut |s| out.push(s));
        out
    }

    #[test]
    fn uci_handshake_identifies_the_engine() {
        let mut state = UciState::new();
        let lines = drain(&mut state, "uci");
        assert!(lines.iter().any(|l| l.starts_with("id name ")));
        assert!(lines.iter().any(|l| l.contains("option name Hash")));
        assert_eq!(lines.last().map(String::as_str), Some("uciok"));

        assert_eq!(drain(&mut state, "isready"), vec!["readyok".to_owned()]);
    }

    #[test]
    fn position_startpos_with_moves_updates_state() {
        let mut state = UciState::new();
        let lines = drain(&mut state, "position startpos moves e2e4 e7e5 g1f3");
        assert!(lines.is_empty(), "unexpected output: {lines:?}");
        assert_eq!(state.position.side_to_move, Color::Black);
        assert_eq!(state.position.fullmove_number, 2);
    }

    #[test]
    fn position_fen_without_moves_updates_state() {
        let mut state = UciState::new();
        let lines = drain(&mut state, "position fen 8/8/8/8/8/8/4P3/4K2k w - - 0 1");
        assert!(lines.is_empty(), "unexpected output: {lines:?}");
        assert_eq!(state.position.to_fen(), "8/8/8/8/8/8/4P3/4K2k w - - 0 1");
    }

    #[test]
    fn malformed_move_reports_and_survives() {
        let mut state = UciState::new();
        let lines = drain(&mut state, "position startpos moves e2e4 banana e7e5");
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("banana"));
        // The session continues; the next well-formed command still works.
        assert_eq!(drain(&mut state, "isready"), vec!["readyok".to_owned()]);
    }

    #[test]
    fn go_depth_produces_info_and_bestmove() {
        let mut state = UciState::new();
        let lines = drain(&mut state, "go depth 2");
        assert!(lines.iter().any(|l| l.starts_with("info depth ")));
        let last = lines.last().expect("output expected");
        assert!(last.starts_with("bestmove "));
        assert_ne!(last, "bestmove 0000");
    }

    #[test]
    fn go_on_a_mated_position_reports_the_null_move() {
        let mut state = UciState::new();
        drain(
            &mut state,
            "position fen rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3",
        );
        let lines = drain(&mut state, "go depth 2");
        assert_eq!(lines.last().map(String::as_str), Some("bestmove 0000"));
    }

    #[test]
    fn parse_go_params_reads_clock_fields() {
        let params = parse_go_params("go wtime 120000 btime 60000 winc 1000 binc 1000 movestogo 24");
        assert_eq!(params.wtime_ms, Some(120_000));
        assert_eq!(params.btime_ms, Some(60_000));
        assert_eq!(params.winc_ms, Some(1_000));
        assert_eq!(params.binc_ms, Some(1_000));
        assert_eq!(params.movestogo, Some(24));
        assert_eq!(params.movetime_ms, None);

        let params = parse_go_params("go depth 6 nodes 50000 infinite");
        assert_eq!(params.depth, Some(6));
        assert_eq!(params.nodes, Some(50_000));
        assert!(params.infinite);
    }

    #[test]
    fn setoption_routes_to_the_engine() {
        let mut state = UciState::new();
        assert!(drain(&mut state, "setoption name Hash value 16").is_empty());
        let lines = drain(&mut state, "setoption name Hash value banana");
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("setoption error"));
    }

    #[test]
    fn quit_ends_the_session_and_unknowns_do_not() {
        let mut state = UciState::new();
        let mut out = Vec::new();
        assert!(!state.handle_command("xyzzy", &mut |s| out.push(s)));
        assert!(state.handle_command("quit", &mut |s| out.push(s)));
        assert!(out.is_empty());
    }
}
