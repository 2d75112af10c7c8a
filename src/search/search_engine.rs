//! Iterative-deepening principal variation search.
//!
//! One `EngineContext` owns every piece of mutable search state: the
//! transposition table, the killer/history/countermove tables, and the
//! shared stop flag. The search itself is single-threaded and synchronous;
//! cancellation is cooperative, polled at a fixed node interval and at the
//! top of every root-move iteration. A depth's best move is published only
//! once that depth has fully completed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::debug;

use crate::movegen::attack_checks::is_king_in_check;
use crate::movegen::make_unmake::{make_null_move, unmake_null_move, MoveGuard};
use crate::movegen::move_encoding::*;
use crate::movegen::move_generation::{legal_moves, pseudo_legal_tactical_moves, MoveGenError};
use crate::position::chess_rules::FIFTY_MOVE_RULE_CLOCK;
use crate::position::piece_types::*;
use crate::position::position::Position;
use crate::search::evaluation::{piece_value, BoardScorer, MATE_SCORE};
use crate::search::move_ordering::{
    order_moves, order_tactical_moves, static_exchange_evaluation, SearchHeuristics, MAX_PLY,
};
use crate::search::transposition_table::{Bound, TranspositionTable, MATE_TT_THRESHOLD};

pub const INFINITY_SCORE: i32 = 32000;

const ASPIRATION_MIN_DEPTH: u8 = 5;
const ASPIRATION_WINDOW: i32 = 75;
const RAZOR_MARGIN_BASE: i32 = 300;
const RAZOR_MARGIN_PER_DEPTH: i32 = 100;
const FUTILITY_MARGIN_PER_DEPTH: i32 = 300;
const REVERSE_FUTILITY_MARGIN_PER_DEPTH: i32 = 100;
const DELTA_PRUNING_MARGIN: i32 = 200;
const PROBCUT_MARGIN: i32 = 120;
const PROBCUT_MIN_DEPTH: u8 = 5;
const PROBCUT_MOVE_LIMIT: usize = 3;
const NULL_VERIFY_MIN_DEPTH: u8 = 8;
const IID_MIN_DEPTH: u8 = 4;
const ABORT_POLL_MASK: u64 = 1023;

/// All mutable state a search needs, owned by the caller so independent
/// engine instances cannot corrupt each other.
pub struct EngineContext {
    pub tt: TranspositionTable,
    pub heuristics: SearchHeuristics,
    pub stop_flag: Arc<AtomicBool>,
}

impl EngineContext {
    pub fn new_with_hash_mb(size_mb: usize) -> Self {
        Self {
            tt: TranspositionTable::new_with_mb(size_mb),
            heuristics: SearchHeuristics::default(),
            stop_flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Reset persistent state between independent games.
    pub fn new_game(&mut self) {
        self.tt.clear();
        self.heuristics.clear();
        self.stop_flag.store(false, Ordering::Relaxed);
    }
}

#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub max_depth: u8,
    pub movetime_ms: Option<u64>,
    pub max_nodes: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_depth: (MAX_PLY - 1) as u8,
            movetime_ms: None,
            max_nodes: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchResult {
    pub best_move: Option<Move>,
    pub best_score: i32,
    pub reached_depth: u8,
    pub nodes: u64,
    pub elapsed_ms: u64,
    pub nps: u64,
    pub pv: Vec<Move>,
}

/// Progress snapshot emitted after each fully-completed depth.
#[derive(Debug, Clone)]
pub struct DepthReport {
    pub depth: u8,
    pub score: i32,
    pub nodes: u64,
    pub elapsed_ms: u64,
    pub nps: u64,
    pub pv: Vec<Move>,
}

/// Distance-to-mate in full moves when `score` is in the mate band;
/// negative means the side to move is being mated.
pub fn mate_distance(score: i32) -> Option<i32> {
    if score >= MATE_TT_THRESHOLD {
        Some((MATE_SCORE - score + 1) / 2)
    } else if score <= -MATE_TT_THRESHOLD {
        Some(-((MATE_SCORE + score) / 2))
    } else {
        None
    }
}

pub fn iterative_deepening_search<S: BoardScorer>(
    position: &Position,
    scorer: &S,
    config: &SearchConfig,
    ctx: &mut EngineContext,
    mut on_depth: impl FnMut(&DepthReport),
) -> Result<SearchResult, MoveGenError> {
    let started = Instant::now();
    let deadline = config
        .movetime_ms
        .map(|ms| started + Duration::from_millis(ms.max(1)));
    let max_nodes = config.max_nodes.filter(|&cap| cap > 0);

    let mut root = position.clone();
    let root_moves = legal_moves(&mut root)?;

    let mut result = SearchResult {
        best_score: -INFINITY_SCORE,
        ..SearchResult::default()
    };

    if root_moves.is_empty() {
        // Already terminal; report the verdict rather than a move.
        result.best_score = if is_king_in_check(&root, root.side_to_move) {
            -MATE_SCORE
        } else {
            0
        };
        result.elapsed_ms = started.elapsed().as_millis() as u64;
        return Ok(result);
    }

    if config.max_depth == 0 {
        result.best_score = scorer.score(&root);
        result.nodes = 1;
        result.elapsed_ms = started.elapsed().as_millis() as u64;
        return Ok(result);
    }

    ctx.heuristics.decay_history();

    let mut total_nodes = 0u64;
    let mut prev_score = 0i32;

    for depth in 1..=config.max_depth.min((MAX_PLY - 1) as u8) {
        ctx.tt.new_generation();

        let mut runner = SearchRunner {
            scorer,
            tt: &mut ctx.tt,
            heuristics: &mut ctx.heuristics,
            stop_flag: ctx.stop_flag.as_ref(),
            deadline,
            node_cap: max_nodes,
            nodes: total_nodes,
            aborted: false,
        };

        // Aspiration: a narrow window around the previous score, with one
        // full-window re-search when the result lands on or outside it.
        let completed = if depth >= ASPIRATION_MIN_DEPTH {
            let alpha = (prev_score - ASPIRATION_WINDOW).max(-INFINITY_SCORE);
            let beta = (prev_score + ASPIRATION_WINDOW).min(INFINITY_SCORE);
            match runner.search_root(&mut root, depth, alpha, beta)? {
                Some((_, score)) if score <= alpha || score >= beta => {
                    runner.search_root(&mut root, depth, -INFINITY_SCORE, INFINITY_SCORE)?
                }
                other => other,
            }
        } else {
            runner.search_root(&mut root, depth, -INFINITY_SCORE, INFINITY_SCORE)?
        };

        total_nodes = runner.nodes;

        // An aborted depth never publishes: its partial best is typically
        // worse than the previous depth's fully-searched move.
        let Some((best_move, best_score)) = completed else {
            break;
        };

        result.best_move = Some(best_move);
        result.best_score = best_score;
        result.reached_depth = depth;
        result.nodes = total_nodes;
        prev_score = best_score;

        let elapsed_ms = started.elapsed().as_millis() as u64;
        result.pv = principal_variation(&root, &mut ctx.tt, depth);
        if result.pv.is_empty() {
            result.pv.push(best_move);
        }
        let report = DepthReport {
            depth,
            score: best_score,
            nodes: total_nodes,
            elapsed_ms,
            nps: if elapsed_ms == 0 {
                0
            } else {
                total_nodes.saturating_mul(1000) / elapsed_ms
            },
            pv: result.pv.clone(),
        };
        debug!(
            "depth {} score {} nodes {} pv {} moves",
            report.depth,
            report.score,
            report.nodes,
            report.pv.len()
        );
        on_depth(&report);
    }

    result.elapsed_ms = started.elapsed().as_millis() as u64;
    result.nps = if result.elapsed_ms == 0 {
        0
    } else {
        result.nodes.saturating_mul(1000) / result.elapsed_ms
    };
    Ok(result)
}

/// Walk the table's best-move chain from the root. Each step is validated
/// against the legality oracle, and a repetition guard stops cycles.
fn principal_variation(
    position: &Position,
    tt: &mut TranspositionTable,
    max_len: u8,
) -> Vec<Move> {
    let mut pv = Vec::new();
    let mut state = position.clone();
    let mut seen_keys = Vec::new();

    for _ in 0..max_len {
        let Some(entry) = tt.probe(state.zobrist_key) else {
            break;
        };
        if entry.best_move == NULL_MOVE || seen_keys.contains(&state.zobrist_key) {
            break;
        }
        seen_keys.push(state.zobrist_key);

        let Ok(legal) = legal_moves(&mut state) else {
            break;
        };
        if !legal.contains(&entry.best_move) {
            break;
        }
        pv.push(entry.best_move);
        if crate::movegen::make_unmake::make_move_in_place(&mut state, entry.best_move).is_err() {
            break;
        }
    }

    pv
}

struct SearchRunner<'a, S: BoardScorer> {
    scorer: &'a S,
    tt: &'a mut TranspositionTable,
    heuristics: &'a mut SearchHeuristics,
    stop_flag: &'a AtomicBool,
    deadline: Option<Instant>,
    node_cap: Option<u64>,
    nodes: u64,
    aborted: bool,
}

impl<S: BoardScorer> SearchRunner<'_, S> {
    /// Cheap abort check; the clock and flag are consulted only every
    /// `ABORT_POLL_MASK + 1` nodes.
    #[inline]
    fn should_abort(&mut self) -> bool {
        if self.aborted {
            return true;
        }
        if let Some(cap) = self.node_cap {
            if self.nodes >= cap {
                self.aborted = true;
                return true;
            }
        }
        if (self.nodes & ABORT_POLL_MASK) == 0 {
            if self.stop_flag.load(Ordering::Relaxed) {
                self.aborted = true;
                return true;
            }
            if let Some(limit) = self.deadline {
                if Instant::now() >= limit {
                    self.aborted = true;
                    return true;
                }
            }
        }
        false
    }

    /// Hard abort check that always consults flag and clock, for the root
    /// move loop.
    fn should_abort_now(&mut self) -> bool {
        if self.aborted {
            return true;
        }
        if self.stop_flag.load(Ordering::Relaxed) {
            self.aborted = true;
        }
        if let Some(limit) = self.deadline {
            if Instant::now() >= limit {
                self.aborted = true;
            }
        }
        if let Some(cap) = self.node_cap {
            if self.nodes >= cap {
                self.aborted = true;
            }
        }
        self.aborted
    }

    fn search_root(
        &mut self,
        position: &mut Position,
        depth: u8,
        mut alpha: i32,
        beta: i32,
    ) -> Result<Option<(Move, i32)>, MoveGenError> {
        let mut moves = legal_moves(position)?;
        let tt_move = self
            .tt
            .probe(position.zobrist_key)
            .map(|entry| entry.best_move)
            .unwrap_or(NULL_MOVE);
        order_moves(position, &mut moves, tt_move, NULL_MOVE, 0, self.heuristics);

        let mut best_move = NULL_MOVE;
        let mut best_score = -INFINITY_SCORE;

        for mv in moves {
            if self.should_abort_now() {
                return Ok(None);
            }

            let score_opt = {
                let mut guard = MoveGuard::apply(position, mv)?;
                self.negamax(guard.position(), depth.saturating_sub(1), -beta, -alpha, 1, true, true, mv)?
            };
            let Some(score) = score_opt else {
                return Ok(None);
            };
            let score = -score;

            if score > best_score {
                best_score = score;
                best_move = mv;
            }
            if score > alpha {
                alpha = score;
            }
            if alpha >= beta {
                break;
            }
        }

        if best_move != NULL_MOVE && !self.aborted {
            self.tt
                .store(position.zobrist_key, depth, best_score, Bound::Exact, best_move, 0);
        }
        Ok(Some((best_move, best_score)))
    }

    /// One internal node. `Ok(None)` means the search was aborted and the
    /// frame is unwinding; no score from this subtree may be trusted or
    /// stored.
    #[allow(clippy::too_many_arguments)]
    fn negamax(
        &mut self,
        position: &mut Position,
        depth: u8,
        mut alpha: i32,
        mut beta: i32,
        ply: u8,
        is_pv: bool,
        allow_null: bool,
        prev_move: Move,
    ) -> Result<Option<i32>, MoveGenError> {
        if self.should_abort() {
            return Ok(None);
        }
        if usize::from(ply) >= MAX_PLY - 1 {
            return Ok(Some(self.scorer.score(position)));
        }
        if is_draw(position) {
            return Ok(Some(0));
        }

        // Mate-distance pruning: no line from here can beat an already
        // proven shorter mate.
        alpha = alpha.max(-MATE_SCORE + i32::from(ply));
        beta = beta.min(MATE_SCORE - i32::from(ply) - 1);
        if alpha >= beta {
            return Ok(Some(alpha));
        }

        let alpha_orig = alpha;
        let probe = self
            .tt
            .probe_usable(position.zobrist_key, depth, ply, alpha, beta);
        if let Some(score) = probe.cutoff {
            return Ok(Some(score));
        }
        let mut tt_move = probe.best_move;

        if depth == 0 {
            return self.quiescence(position, alpha, beta, ply);
        }

        self.nodes += 1;

        let in_check = is_king_in_check(position, position.side_to_move);
        let depth = if in_check { depth.saturating_add(1) } else { depth };
        let static_eval = if in_check {
            None
        } else {
            Some(self.scorer.score(position))
        };

        // Reverse futility: a quiet position already far above beta.
        if let Some(eval) = static_eval {
            if !is_pv
                && depth >= 3
                && alpha > -MATE_TT_THRESHOLD
                && beta < MATE_TT_THRESHOLD
            {
                let margin = REVERSE_FUTILITY_MARGIN_PER_DEPTH * i32::from(depth);
                if eval - margin >= beta {
                    return Ok(Some(eval - margin));
                }
            }
        }

        // Null move: hand the opponent a free tempo; if the position still
        // beats beta, a real move will too. Skipped in check, in pawn-only
        // endgames, and when mate bounds are in play.
        if allow_null
            && !is_pv
            && !in_check
            && depth >= 3
            && beta < MATE_TT_THRESHOLD
            && has_non_pawn_material(position, position.side_to_move)
        {
            let reduction = 2 + depth / 6;
            let null_undo = make_null_move(position);
            let null_score = self.negamax(
                position,
                depth.saturating_sub(1 + reduction),
                -beta,
                -beta + 1,
                ply.saturating_add(1),
                false,
                false,
                NULL_MOVE,
            )?;
            unmake_null_move(position, null_undo);

            let Some(null_score) = null_score else {
                return Ok(None);
            };
            let null_score = -null_score;
            if null_score >= beta {
                if depth >= NULL_VERIFY_MIN_DEPTH {
                    // Zugzwang safeguard: confirm without the null move.
                    let verify = self.negamax(
                        position,
                        depth.saturating_sub(1 + reduction),
                        beta - 1,
                        beta,
                        ply,
                        false,
                        false,
                        prev_move,
                    )?;
                    let Some(verify) = verify else {
                        return Ok(None);
                    };
                    if verify >= beta {
                        return Ok(Some(verify));
                    }
                } else {
                    // Never return an unproven mate from a null search.
                    return Ok(Some(null_score.min(MATE_TT_THRESHOLD - 1)));
                }
            }
        }

        // Razoring: hopeless quiet positions drop straight to quiescence.
        if let Some(eval) = static_eval {
            if depth <= 3 && alpha < MATE_TT_THRESHOLD && alpha > -MATE_TT_THRESHOLD {
                let margin = RAZOR_MARGIN_BASE + RAZOR_MARGIN_PER_DEPTH * i32::from(depth);
                if eval + margin < alpha {
                    let q_score =
                        self.quiescence(position, alpha - margin, alpha - margin + 1, ply)?;
                    let Some(q_score) = q_score else {
                        return Ok(None);
                    };
                    if q_score + margin < alpha {
                        return Ok(Some(q_score));
                    }
                }
            }
        }

        // Probcut: a few forcing captures searched shallow against a
        // raised beta can prove an early fail-high.
        if !is_pv && depth >= PROBCUT_MIN_DEPTH && beta < MATE_TT_THRESHOLD {
            let raised_beta = beta + PROBCUT_MARGIN;
            let mut tactical = Vec::with_capacity(32);
            pseudo_legal_tactical_moves(position, &mut tactical)?;
            tactical.retain(|&mv| static_exchange_evaluation(position, mv) > 0);
            order_tactical_moves(position, &mut tactical);

            let mover = position.side_to_move;
            for &mv in tactical.iter().take(PROBCUT_MOVE_LIMIT) {
                let score_opt = {
                    let mut guard = MoveGuard::apply(position, mv)?;
                    if is_king_in_check(guard.position(), mover) {
                        continue;
                    }
                    self.negamax(
                        guard.position(),
                        depth.saturating_sub(4),
                        -raised_beta,
                        -raised_beta + 1,
                        ply.saturating_add(1),
                        false,
                        allow_null,
                        mv,
                    )?
                };
                let Some(score) = score_opt else {
                    return Ok(None);
                };
                if -score >= raised_beta {
                    return Ok(Some(-score));
                }
            }
        }

        // Internal iterative deepening seeds ordering when the table has
        // no move for this node.
        if tt_move == NULL_MOVE && depth >= IID_MIN_DEPTH {
            let iid = self.negamax(
                position,
                depth - 2,
                alpha,
                beta,
                ply,
                is_pv,
                false,
                prev_move,
            )?;
            if iid.is_none() {
                return Ok(None);
            }
            tt_move = self
                .tt
                .probe(position.zobrist_key)
                .map(|entry| entry.best_move)
                .unwrap_or(NULL_MOVE);
        }

        let mut moves = legal_moves(position)?;
        if moves.is_empty() {
            return Ok(Some(if in_check {
                -MATE_SCORE + i32::from(ply)
            } else {
                0
            }));
        }

        // Futility: at shallow depth with a hopeless static eval, quiet
        // moves are skipped once one move has been searched.
        let futile = match static_eval {
            Some(eval) if depth <= 3 && alpha > -MATE_TT_THRESHOLD && beta < MATE_TT_THRESHOLD => {
                eval + FUTILITY_MARGIN_PER_DEPTH * i32::from(depth) < alpha
            }
            _ => false,
        };

        order_moves(
            position,
            &mut moves,
            tt_move,
            prev_move,
            usize::from(ply),
            self.heuristics,
        );

        let mut best = -INFINITY_SCORE;
        let mut best_move = NULL_MOVE;
        let mut searched = 0usize;

        for (index, mv) in moves.into_iter().enumerate() {
            if self.should_abort() {
                return Ok(None);
            }
            if futile && searched > 0 && is_quiet(mv) {
                continue;
            }

            let score_opt = {
                let mut guard = MoveGuard::apply(position, mv)?;
                let child = guard.position();
                let gives_check = is_king_in_check(child, child.side_to_move);
                let child_depth = depth - 1;
                let reduction =
                    lmr_reduction(depth, index, is_pv, in_check, gives_check, mv);

                if index == 0 {
                    self.negamax(child, child_depth, -beta, -alpha, ply + 1, is_pv, true, mv)?
                } else {
                    // PVS: null-window probe, reduced for late quiet moves,
                    // widened only when it surprises us.
                    let mut probe_score = {
                        let probed = self.negamax(
                            child,
                            child_depth.saturating_sub(reduction),
                            -alpha - 1,
                            -alpha,
                            ply + 1,
                            false,
                            true,
                            mv,
                        )?;
                        match probed {
                            Some(score) => score,
                            None => return Ok(None),
                        }
                    };

                    if reduction > 0 && -probe_score > alpha {
                        let probed = self.negamax(
                            child,
                            child_depth,
                            -alpha - 1,
                            -alpha,
                            ply + 1,
                            false,
                            true,
                            mv,
                        )?;
                        match probed {
                            Some(score) => probe_score = score,
                            None => return Ok(None),
                        }
                    }

                    if -probe_score > alpha && -probe_score < beta {
                        self.negamax(child, child_depth, -beta, -alpha, ply + 1, true, true, mv)?
                    } else {
                        Some(probe_score)
                    }
                }
            };

            let Some(score) = score_opt else {
                return Ok(None);
            };
            let score = -score;
            searched += 1;

            if score > best {
                best = score;
                best_move = mv;
            }
            if score > alpha {
                alpha = score;
            }
            if alpha >= beta {
                if is_quiet(mv) {
                    self.heuristics.record_cutoff(
                        position.side_to_move,
                        usize::from(ply),
                        prev_move,
                        mv,
                        depth,
                    );
                }
                break;
            }
        }

        if !self.aborted {
            let bound = if best <= alpha_orig {
                Bound::Upper
            } else if best >= beta {
                Bound::Lower
            } else {
                Bound::Exact
            };
            self.tt
                .store(position.zobrist_key, depth, best, bound, best_move, ply);
        }

        Ok(Some(best))
    }

    /// Horizon resolution: captures, promotions, and check evasions only.
    fn quiescence(
        &mut self,
        position: &mut Position,
        mut alpha: i32,
        beta: i32,
        ply: u8,
    ) -> Result<Option<i32>, MoveGenError> {
        if self.should_abort() {
            return Ok(None);
        }
        if is_draw(position) {
            return Ok(Some(0));
        }
        self.nodes += 1;
        if usize::from(ply) >= MAX_PLY - 1 {
            return Ok(Some(self.scorer.score(position)));
        }

        let mover = position.side_to_move;
        let in_check = is_king_in_check(position, mover);

        if in_check {
            // No stand-pat while in check; every evasion gets searched.
            let mut evasions = legal_moves(position)?;
            if evasions.is_empty() {
                return Ok(Some(-MATE_SCORE + i32::from(ply)));
            }
            order_tactical_moves(position, &mut evasions);

            let mut best = -INFINITY_SCORE;
            for mv in evasions {
                let score_opt = {
                    let mut guard = MoveGuard::apply(position, mv)?;
                    self.quiescence(guard.position(), -beta, -alpha, ply.saturating_add(1))?
                };
                let Some(score) = score_opt else {
                    return Ok(None);
                };
                let score = -score;
                best = best.max(score);
                if score >= beta {
                    return Ok(Some(score));
                }
                if score > alpha {
                    alpha = score;
                }
            }
            return Ok(Some(best));
        }

        let stand_pat = self.scorer.score(position);
        if stand_pat >= beta {
            return Ok(Some(stand_pat));
        }
        // Even winning a queen cannot rescue this position.
        if stand_pat + piece_value(PieceKind::Queen) + DELTA_PRUNING_MARGIN < alpha {
            return Ok(Some(alpha));
        }
        if stand_pat > alpha {
            alpha = stand_pat;
        }

        let mut tactical = Vec::with_capacity(32);
        pseudo_legal_tactical_moves(position, &mut tactical)?;
        tactical.retain(|&mv| {
            if promotion_piece(mv).is_some() {
                return true;
            }
            let victim = captured_piece(mv).map(piece_value).unwrap_or(0);
            if stand_pat + victim + DELTA_PRUNING_MARGIN < alpha {
                return false;
            }
            static_exchange_evaluation(position, mv) >= 0
        });
        order_tactical_moves(position, &mut tactical);

        for mv in tactical {
            if self.should_abort() {
                return Ok(None);
            }
            let score_opt = {
                let mut guard = MoveGuard::apply(position, mv)?;
                if is_king_in_check(guard.position(), mover) {
                    continue;
                }
                self.quiescence(guard.position(), -beta, -alpha, ply.saturating_add(1))?
            };
            let Some(score) = score_opt else {
                return Ok(None);
            };
            let score = -score;
            if score >= beta {
                return Ok(Some(score));
            }
            if score > alpha {
                alpha = score;
            }
        }

        Ok(Some(alpha))
    }
}

/// Draw by the fifty-move rule or by repetition inside the irreversible-
/// move window. Checked before move generation at every node.
fn is_draw(position: &Position) -> bool {
    if position.halfmove_clock >= FIFTY_MOVE_RULE_CLOCK {
        return true;
    }

    let current = position.zobrist_key;
    let window = usize::from(position.halfmove_clock).saturating_add(1);
    let scan = window.min(position.repetition_history.len());
    let mut seen = 0usize;
    for key in position.repetition_history.iter().rev().take(scan) {
        if *key == current {
            seen += 1;
            if seen >= 2 {
                return true;
            }
        }
    }
    false
}

#[inline]
fn has_non_pawn_material(position: &Position, color: Color) -> bool {
    let idx = color.index();
    position.pieces[idx][PieceKind::Knight.index()] != 0
        || position.pieces[idx][PieceKind::Bishop.index()] != 0
        || position.pieces[idx][PieceKind::Rook.index()] != 0
        || position.pieces[idx][PieceKind::Queen.index()] != 0
}

/// Late-move reduction: logarithmic in both remaining depth and move
/// index, quiet non-checking moves only, never the first few.
fn lmr_reduction(
    depth: u8,
    index: usize,
    is_pv: bool,
    in_check: bool,
    gives_check: bool,
    mv: Move,
) -> u8 {
    if depth < 3 || index < 4 || in_check || gives_check || !is_quiet(mv) {
        return 0;
    }
    let base = (f32::from(depth).ln() * (index as f32).ln() / 2.25) as i32;
    let reduced = if is_pv { base - 1 } else { base };
    reduced.clamp(1, 3) as u8
}
