//! Engine abstraction used by the UCI front-end.
//!
//! Defines the input parameters and output payload so the protocol layer
//! stays independent of the concrete search implementation.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::movegen::move_encoding::Move;
use crate::position::position::Position;

#[derive(Debug, Clone, Default)]
pub struct GoParams {
    pub depth: Option<u8>,
    pub nodes: Option<u64>,
    pub movetime_ms: Option<u64>,
    pub wtime_ms: Option<u64>,
    pub btime_ms: Option<u64>,
    pub winc_ms: Option<u64>,
    pub binc_ms: Option<u64>,
    pub movestogo: Option<u16>,
    pub infinite: bool,
}

#[derive(Debug, Clone, Default)]
pub struct EngineOutput {
    pub best_move: Option<Move>,
}

pub trait Engine: Send {
    fn new_game(&mut self) {}

    fn set_option(&mut self, _name: &str, _value: &str) -> Result<(), String> {
        Ok(())
    }

    /// Shared cancellation flag; setting it makes a running `choose_move`
    /// wind down cooperatively.
    fn stop_handle(&self) -> Arc<AtomicBool>;

    /// Pick a move for `position` under `params`, emitting protocol
    /// progress lines through `emit` as the search deepens.
    fn choose_move(
        &mut self,
        position: &Position,
        params: &GoParams,
        emit: &mut dyn FnMut(String),
    ) -> Result<EngineOutput, String>;
}
