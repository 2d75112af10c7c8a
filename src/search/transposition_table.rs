//! Transposition table keyed by the position Zobrist hash.
//!
//! A fixed, power-of-two array of entries overwritten in place. Replacement
//! is depth-and-age aware: a same-generation entry is never displaced by a
//! shallower one at the same key. Mate scores are stored root-relative (the
//! current ply folded in on store, folded back out on probe) so an entry is
//! valid from any path that reaches the position.

use crate::movegen::move_encoding::{Move, NULL_MOVE};
use crate::search::evaluation::MATE_SCORE;

/// Scores at or beyond this magnitude are treated as mate-distance scores.
pub const MATE_TT_THRESHOLD: i32 = MATE_SCORE - 1000;

/// A genuine forced mate cannot be proven below this remaining depth; a
/// mate-range hit there indicates an index collision and is treated as a
/// miss.
const MATE_PROBE_MIN_DEPTH: u8 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Exact,
    Lower,
    Upper,
}

#[derive(Debug, Clone, Copy)]
pub struct TTEntry {
    pub key: u64,
    pub depth: u8,
    pub score: i32,
    pub bound: Bound,
    pub best_move: Move,
    pub age: u8,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TTStats {
    pub probes: u64,
    pub hits: u64,
    pub stores: u64,
}

/// Outcome of a search-facing probe: a score usable for an immediate
/// cutoff, and/or a move usable for ordering regardless of stored depth.
#[derive(Debug, Clone, Copy, Default)]
pub struct TTProbe {
    pub cutoff: Option<i32>,
    pub best_move: Move,
}

#[derive(Debug, Clone)]
pub struct TranspositionTable {
    entries: Vec<Option<TTEntry>>,
    index_mask: usize,
    current_age: u8,
    stats: TTStats,
}

impl TranspositionTable {
    pub fn new_with_mb(size_mb: usize) -> Self {
        let bytes = size_mb.max(1) * 1024 * 1024;
        let slot_size = std::mem::size_of::<Option<TTEntry>>().max(1);
        let entry_count = (bytes / slot_size).next_power_of_two().max(1);
        Self {
            entries: vec![None; entry_count],
            index_mask: entry_count - 1,
            current_age: 0,
            stats: TTStats::default(),
        }
    }

    #[inline]
    pub fn new_generation(&mut self) {
        self.current_age = self.current_age.wrapping_add(1);
    }

    pub fn clear(&mut self) {
        self.entries.fill(None);
        self.current_age = 0;
        self.stats = TTStats::default();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn stats(&self) -> TTStats {
        self.stats
    }

    #[inline]
    fn index(&self, key: u64) -> usize {
        (key as usize) & self.index_mask
    }

    /// Raw probe; refreshes the entry's age on a hit.
    pub fn probe(&mut self, key: u64) -> Option<TTEntry> {
        self.stats.probes += 1;
        let index = self.index(key);
        if let Some(entry) = &mut self.entries[index] {
            if entry.key == key {
                self.stats.hits += 1;
                entry.age = self.current_age;
                return Some(*entry);
            }
        }
        None
    }

    /// Search-facing probe: applies the depth requirement, the ply-relative
    /// mate adjustment, the shallow-mate rejection, and the bound logic.
    /// Entries too shallow for a cutoff still contribute their move.
    pub fn probe_usable(
        &mut self,
        key: u64,
        depth: u8,
        ply: u8,
        alpha: i32,
        beta: i32,
    ) -> TTProbe {
        let Some(entry) = self.probe(key) else {
            return TTProbe::default();
        };

        let mut result = TTProbe {
            cutoff: None,
            best_move: entry.best_move,
        };
        if entry.depth < depth {
            return result;
        }

        let score = score_from_tt(entry.score, ply);
        if score.abs() >= MATE_TT_THRESHOLD && depth < MATE_PROBE_MIN_DEPTH {
            return result;
        }

        result.cutoff = match entry.bound {
            Bound::Exact => Some(score),
            Bound::Lower if score >= beta => Some(score),
            Bound::Upper if score <= alpha => Some(score),
            _ => None,
        };
        result
    }

    /// Record an entry; `score` is position-relative and `ply` folds it to
    /// root-relative for storage.
    pub fn store(&mut self, key: u64, depth: u8, score: i32, bound: Bound, best_move: Move, ply: u8) {
        self.stats.stores += 1;
        let index = self.index(key);
        let incoming = TTEntry {
            key,
            depth,
            score: score_to_tt(score, ply),
            bound,
            best_move,
            age: self.current_age,
        };

        match &self.entries[index] {
            Some(existing) => {
                let stale = existing.age != self.current_age;
                let same_key = existing.key == key;
                // A same-generation deeper entry survives a shallower store,
                // whether or not the keys match.
                if stale || incoming.depth >= existing.depth {
                    // Keep a known move rather than erasing it with none.
                    let best_move = if same_key && incoming.best_move == NULL_MOVE {
                        existing.best_move
                    } else {
                        incoming.best_move
                    };
                    self.entries[index] = Some(TTEntry {
                        best_move,
                        ..incoming
                    });
                }
            }
            None => self.entries[index] = Some(incoming),
        }
    }
}

/// Fold the current ply into a score before storing, making mate distances
/// root-relative.
#[inline]
pub fn score_to_tt(score: i32, ply: u8) -> i32 {
    if score >= MATE_TT_THRESHOLD {
        score.saturating_add(i32::from(ply))
    } else if score <= -MATE_TT_THRESHOLD {
        score.saturating_sub(i32::from(ply))
    } else {
        score
    }
}

/// Undo `score_to_tt` with the probing node's own ply.
#[inline]
pub fn score_from_tt(score: i32, ply: u8) -> i32 {
    if score >= MATE_TT_THRESHOLD {
        score.saturating_sub(i32::from(ply))
    } else if score <= -MATE_TT_THRESHOLD {
        score.saturating_add(i32::from(ply))
    } else {
        score
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_and_probe_round_trip() {
        let mut tt = TranspositionTable::new_with_mb(1);
        tt.store(123, 5, 42, Bound::Exact, 99, 0);
        let entry = tt.probe(123).expect("entry should exist");
        assert_eq!(entry.depth, 5);
        assert_eq!(entry.score, 42);
        assert_eq!(entry.best_move, 99);
        assert!(tt.probe(456).is_none());
    }

    #[test]
    fn shallower_store_never_displaces_deeper_same_generation_entry() {
        let mut tt = TranspositionTable::new_with_mb(1);
        tt.store(555, 6, 10, Bound::Exact, 7, 0);
        tt.store(555, 3, 99, Bound::Exact, 8, 0);
        let entry = tt.probe(555).expect("entry should exist");
        assert_eq!(entry.depth, 6);
        assert_eq!(entry.score, 10);
    }

    #[test]
    fn stale_entries_become_replaceable() {
        let mut tt = TranspositionTable::new_with_mb(1);
        tt.store(555, 9, 10, Bound::Exact, 7, 0);
        tt.new_generation();
        tt.store(555, 2, 99, Bound::Upper, 8, 0);
        let entry = tt.probe(555).expect("entry should exist");
        assert_eq!(entry.depth, 2);
        assert_eq!(entry.score, 99);
    }

    #[test]
    fn mate_scores_round_trip_through_ply_adjustment() {
        let ply = 7u8;
        let mate_win = MATE_SCORE - 12;
        let mate_loss = -MATE_SCORE + 9;
        assert_eq!(score_from_tt(score_to_tt(mate_win, ply), ply), mate_win);
        assert_eq!(score_from_tt(score_to_tt(mate_loss, ply), ply), mate_loss);
        // Ordinary scores pass through untouched.
        assert_eq!(score_to_tt(137, ply), 137);
        assert_eq!(score_from_tt(-252, ply), -252);
    }

    #[test]
    fn shallow_mate_hits_are_treated_as_misses() {
        let mut tt = TranspositionTable::new_with_mb(1);
        tt.store(777, 4, MATE_SCORE - 3, Bound::Exact, 0, 0);
        let probe = tt.probe_usable(777, 4, 0, -MATE_SCORE, MATE_SCORE);
        assert_eq!(probe.cutoff, None);
    }

    #[test]
    fn shallow_entry_still_supplies_its_move_for_ordering() {
        let mut tt = TranspositionTable::new_with_mb(1);
        tt.store(888, 2, 30, Bound::Exact, 41, 0);
        let probe = tt.probe_usable(888, 6, 0, -100, 100);
        assert_eq!(probe.cutoff, None);
        assert_eq!(probe.best_move, 41);
    }

    #[test]
    fn bound_logic_gates_cutoffs() {
        let mut tt = TranspositionTable::new_with_mb(1);
        tt.store(999, 5, 80, Bound::Lower, 0, 0);
        assert_eq!(tt.probe_usable(999, 5, 0, 0, 50).cutoff, Some(80));
        assert_eq!(tt.probe_usable(999, 5, 0, 0, 200).cutoff, None);

        tt.store(1001, 5, -80, Bound::Upper, 0, 0);
        assert_eq!(tt.probe_usable(1001, 5, 0, -50, 50).cutoff, Some(-80));
        assert_eq!(tt.probe_usable(1001, 5, 0, -200, 50).cutoff, None);
    }
}
