//! Per-move time budgeting from raw UCI clock data.

use crate::driver::engine_trait::GoParams;
use crate::position::piece_types::Color;
use crate::position::position::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeManagementStrategy {
    /// Fixed rule: spend 1/20th of the remaining clock.
    Fraction20,
    /// Adaptive rule using clock, increment, moves-to-go, and game phase.
    Adaptive,
}

/// Derive a movetime budget in milliseconds, or `None` when nothing bounds
/// the search (no clocks given, or `go infinite`).
pub fn resolve_time_budget(
    position: &Position,
    params: &GoParams,
    strategy: TimeManagementStrategy,
) -> Option<u64> {
    if params.infinite {
        return None;
    }
    if params.movetime_ms.is_some() {
        return params.movetime_ms;
    }

    let (remaining, increment) = match position.side_to_move {
        Color::White => (params.wtime_ms?, params.winc_ms),
        Color::Black => (params.btime_ms?, params.binc_ms),
    };

    Some(match strategy {
        TimeManagementStrategy::Fraction20 => (remaining / 20).max(1),
        TimeManagementStrategy::Adaptive => {
            adaptive_budget_ms(position, remaining, increment, params.movestogo)
        }
    })
}

fn adaptive_budget_ms(
    position: &Position,
    remaining_ms: u64,
    inc_ms: Option<u64>,
    movestogo: Option<u16>,
) -> u64 {
    let ply = u64::from(position.ply);
    let expected_moves_left = if let Some(mtg) = movestogo {
        u64::from(mtg.max(1))
    } else if ply < 20 {
        40
    } else if ply < 60 {
        28
    } else {
        18
    };

    let reserve = (remaining_ms / 25).max(100).min(remaining_ms.saturating_sub(1));
    let usable = remaining_ms.saturating_sub(reserve);
    let base = usable / expected_moves_left.max(1);
    let inc_bonus = inc_ms.unwrap_or(0).saturating_mul(3) / 4;
    let panic = if remaining_ms < 2_000 {
        remaining_ms / 12
    } else {
        0
    };
    let target = base.saturating_add(inc_bonus).saturating_add(panic);

    let min_budget = if remaining_ms < 1_000 { 5 } else { 15 };
    let max_budget = (remaining_ms / 4).max(1);
    target.clamp(min_budget, max_budget).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::position::Position;

    #[test]
    fn movetime_passes_straight_through() {
        let position = Position::new_game();
        let params = GoParams {
            movetime_ms: Some(1234),
            wtime_ms: Some(60_000),
            ..GoParams::default()
        };
        assert_eq!(
            resolve_time_budget(&position, &params, TimeManagementStrategy::Adaptive),
            Some(1234)
        );
    }

    #[test]
    fn infinite_means_unbounded() {
        let position = Position::new_game();
        let params = GoParams {
            infinite: true,
            wtime_ms: Some(60_000),
            ..GoParams::default()
        };
        assert_eq!(
            resolve_time_budget(&position, &params, TimeManagementStrategy::Adaptive),
            None
        );
    }

    #[test]
    fn fraction_strategy_spends_a_twentieth() {
        let position = Position::new_game();
        let params = GoParams {
            wtime_ms: Some(60_000),
            ..GoParams::default()
        };
        assert_eq!(
            resolve_time_budget(&position, &params, TimeManagementStrategy::Fraction20),
            Some(3_000)
        );
    }

    #[test]
    fn adaptive_budget_never_exceeds_a_quarter_of_the_clock() {
        let position = Position::new_game();
        for remaining in [150u64, 900, 5_000, 60_000, 600_000] {
            let params = GoParams {
                wtime_ms: Some(remaining),
                winc_ms: Some(2_000),
                ..GoParams::default()
            };
            let budget =
                resolve_time_budget(&position, &params, TimeManagementStrategy::Adaptive)
                    .expect("budget should resolve");
            assert!(budget >= 1);
            assert!(budget <= (remaining / 4).max(1), "budget {budget} for {remaining}");
        }
    }

    #[test]
    fn black_uses_its_own_clock() {
        let mut position = Position::new_game();
        position.side_to_move = Color::Black;
        let params = GoParams {
            wtime_ms: Some(60_000),
            btime_ms: None,
            ..GoParams::default()
        };
        assert_eq!(
            resolve_time_budget(&position, &params, TimeManagementStrategy::Adaptive),
            None
        );
    }
}
