//! The XP curve: pure functions mapping cumulative experience to levels.
//!
//! The curve is quadratic: advancing *to* level `n` costs `5n² + 50n + 100`
//! XP. The constants are load-bearing -- levels already stored for existing
//! accounts were computed with them, so they must never change.
//!
//! All arithmetic is saturating. The curve is strictly increasing for
//! `n >= 1`, which guarantees a unique level for any cumulative XP value.

use serde::{Deserialize, Serialize};

/// XP needed to advance from level `n - 1` to level `n`.
///
/// Returns 0 for `n < 1`. For `n >= 1` the cost is `5n² + 50n + 100`,
/// strictly increasing in `n`.
pub const fn xp_required_for_level(level: u32) -> u64 {
    if level < 1 {
        return 0;
    }
    let n = level as u64;
    // 5n^2 + 50n + 100, saturating. n^2 fits u64 for all u32 inputs.
    5u64.saturating_mul(n.saturating_mul(n))
        .saturating_add(50u64.saturating_mul(n))
        .saturating_add(100)
}

/// Total XP consumed by reaching `level` from level 1.
///
/// This is the sum of [`xp_required_for_level`] over levels 2..=`level`.
/// Level 1 is free (accounts start there once they have any XP), so the
/// sum starts at 2.
pub fn xp_consumed_through(level: u32) -> u64 {
    (2..=level).fold(0u64, |total, n| {
        total.saturating_add(xp_required_for_level(n))
    })
}

/// Progress within the current level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelProgress {
    /// XP earned beyond the current level's floor. Clamped to 0 when the
    /// stored XP sits below the floor (possible after an import).
    pub xp_into_level: u64,
    /// XP required to advance to the next level.
    pub xp_for_next_level: u64,
    /// Integer percentage toward the next level, always 0..=100.
    pub percent: u8,
}

/// Compute progress-within-level for a (level, cumulative XP) pair.
///
/// Pure function of its inputs. The percentage is clamped to 0..=100 even
/// for inconsistent pairs (XP below the level's floor, or far beyond the
/// next threshold).
pub fn level_progress(level: u32, cumulative_xp: u64) -> LevelProgress {
    let consumed = xp_consumed_through(level);
    let next = xp_required_for_level(level.saturating_add(1));
    let into = cumulative_xp.saturating_sub(consumed);

    // next is always >= 155 for any reachable level, but guard anyway.
    let percent = if next == 0 {
        100
    } else {
        into.saturating_mul(100)
            .checked_div(next)
            .map_or(100, |p| p.min(100))
    };

    LevelProgress {
        xp_into_level: into,
        xp_for_next_level: next,
        // percent is <= 100 by construction.
        percent: u8::try_from(percent).unwrap_or(100),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_zero_and_below_cost_nothing() {
        assert_eq!(xp_required_for_level(0), 0);
    }

    #[test]
    fn curve_constants_match_stored_data() {
        // 5n^2 + 50n + 100 -- spot checks against known values.
        assert_eq!(xp_required_for_level(1), 155);
        assert_eq!(xp_required_for_level(2), 220);
        assert_eq!(xp_required_for_level(10), 1100);
        assert_eq!(xp_required_for_level(100), 55_100);
    }

    #[test]
    fn curve_is_strictly_increasing() {
        let mut previous = xp_required_for_level(1);
        for n in 2..=1000u32 {
            let current = xp_required_for_level(n);
            assert!(
                current > previous,
                "curve not strictly increasing at level {n}"
            );
            previous = current;
        }
    }

    #[test]
    fn consumed_through_level_one_is_zero() {
        assert_eq!(xp_consumed_through(0), 0);
        assert_eq!(xp_consumed_through(1), 0);
    }

    #[test]
    fn consumed_is_a_prefix_sum() {
        assert_eq!(xp_consumed_through(2), xp_required_for_level(2));
        assert_eq!(
            xp_consumed_through(5),
            (2..=5).map(xp_required_for_level).sum::<u64>()
        );
    }

    #[test]
    fn progress_percent_always_in_range() {
        for level in 0..50u32 {
            for xp in [0u64, 1, 150, 1_000, 50_000, 10_000_000] {
                let progress = level_progress(level, xp);
                assert!(progress.percent <= 100);
            }
        }
    }

    #[test]
    fn progress_clamps_below_level_floor() {
        // Level 10 floor is well above 10 XP; progress must clamp to 0.
        let progress = level_progress(10, 10);
        assert_eq!(progress.xp_into_level, 0);
        assert_eq!(progress.percent, 0);
    }

    #[test]
    fn progress_clamps_above_next_threshold() {
        let progress = level_progress(1, u64::MAX);
        assert_eq!(progress.percent, 100);
    }

    #[test]
    fn progress_at_exact_midpoint() {
        // Level 1 -> 2 needs 220 XP. Halfway in (110 past the floor of 0...
        // the floor of level 1 is 0, so cumulative 110 XP is 50%).
        let progress = level_progress(1, 110);
        assert_eq!(progress.xp_for_next_level, 220);
        assert_eq!(progress.percent, 50);
    }
}
