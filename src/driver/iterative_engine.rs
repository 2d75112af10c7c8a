//! The canonical engine: adaptive time budgeting in front of the
//! iterative-deepening search, with UCI info formatting and a guaranteed
//! legal fallback move at the protocol boundary.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{info, warn};

use crate::driver::engine_trait::{Engine, EngineOutput, GoParams};
use crate::driver::time_management::{resolve_time_budget, TimeManagementStrategy};
use crate::position::position::Position;
use crate::search::evaluation::TaperedScorer;
use crate::search::move_ordering::MAX_PLY;
use crate::search::search_engine::{
    iterative_deepening_search, mate_distance, DepthReport, EngineContext, SearchConfig,
};
use crate::utils::long_algebraic::move_to_long_algebraic;

pub const DEFAULT_HASH_MB: usize = 64;
const DEFAULT_MOVE_OVERHEAD_MS: u64 = 30;

pub struct IterativeEngine {
    ctx: EngineContext,
    scorer: TaperedScorer,
    strategy: TimeManagementStrategy,
    move_overhead_ms: u64,
}

impl IterativeEngine {
    pub fn new(hash_mb: usize) -> Self {
        Self {
            ctx: EngineContext::new_with_hash_mb(hash_mb),
            scorer: TaperedScorer,
            strategy: TimeManagementStrategy::Adaptive,
            move_overhead_ms: DEFAULT_MOVE_OVERHEAD_MS,
        }
    }
}

impl Engine for IterativeEngine {
    fn new_game(&mut self) {
        self.ctx.new_game();
    }

    fn set_option(&mut self, name: &str, value: &str) -> Result<(), String> {
        if name.eq_ignore_ascii_case("Hash") {
            let mb = value
                .parse::<usize>()
                .map_err(|_| format!("invalid Hash value '{value}'"))?;
            self.ctx = EngineContext::new_with_hash_mb(mb.max(1));
            info!("transposition table resized to {} entries", self.ctx.tt.len());
            Ok(())
        } else if name.eq_ignore_ascii_case("MoveOverhead") {
            self.move_overhead_ms = value
                .parse::<u64>()
                .map_err(|_| format!("invalid MoveOverhead value '{value}'"))?;
            Ok(())
        } else if name.eq_ignore_ascii_case("TimeStrategy") {
            self.strategy = if value.eq_ignore_ascii_case("fraction20") {
                TimeManagementStrategy::Fraction20
            } else {
                TimeManagementStrategy::Adaptive
            };
            Ok(())
        } else {
            // Unknown options are ignored for GUI compatibility.
            Ok(())
        }
    }

    fn stop_handle(&self) -> Arc<AtomicBool> {
        self.ctx.stop_flag.clone()
    }

    fn choose_move(
        &mut self,
        position: &Position,
        params: &GoParams,
        emit: &mut dyn FnMut(String),
    ) -> Result<EngineOutput, String> {
        self.ctx.stop_flag.store(false, Ordering::Relaxed);

        let budget = resolve_time_budget(position, params, self.strategy)
            .map(|ms| ms.saturating_sub(self.move_overhead_ms).max(1));
        let config = SearchConfig {
            max_depth: params.depth.unwrap_or((MAX_PLY - 1) as u8),
            movetime_ms: budget,
            max_nodes: params.nodes,
        };

        let result = iterative_deepening_search(
            position,
            &self.scorer,
            &config,
            &mut self.ctx,
            |report| emit(format_info_line(report)),
        )
        .map_err(|err| err.to_string())?;

        let best_move = match result.best_move {
            Some(mv) => Some(mv),
            None => {
                // Search was stopped before any depth completed; anything
                // legal beats forfeiting. Only a true terminal position
                // yields no move at all.
                let mut probe = position.clone();
                let legal = crate::movegen::move_generation::legal_moves(&mut probe)
                    .map_err(|err| err.to_string())?;
                if !legal.is_empty() {
                    warn!("search published no move; falling back to first legal move");
                }
                legal.first().copied()
            }
        };

        Ok(EngineOutput { best_move })
    }
}

fn format_info_line(report: &DepthReport) -> String {
    let score_text = match mate_distance(report.score) {
        Some(mate_in) => format!("score mate {mate_in}"),
        None => format!("score cp {}", report.score),
    };
    let pv_text = report
        .pv
        .iter()
        .map(|&mv| move_to_long_algebraic(mv))
        .collect::<Vec<_>>()
        .join(" ");
    format!(
        "info depth {} {} nodes {} nps {} time {} pv {}",
        report.depth, score_text, report.nodes, report.nps, report.elapsed_ms, pv_text
    )
}
