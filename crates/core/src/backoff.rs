// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Crash-loop backoff sequence (§4.2, §8): starts at 2s, doubles, caps at 300s.

use std::time::Duration;

pub const MAX_BACKOFF: Duration = Duration::from_secs(300);
const FLOOR: Duration = Duration::from_secs(2);

/// Given the current backoff, compute the next one in the sequence.
/// The first call should pass `Duration::from_secs(1)` (or anything
/// `<= 1s`) to get the floor of 2s.
pub fn next_backoff(current: Duration) -> Duration {
    if current.as_secs_f64() <= 1.0 {
        return FLOOR;
    }
    let doubled = Duration::from_secs_f64(current.as_secs_f64() * 2.0);
    doubled.min(MAX_BACKOFF)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use yare::parameterized;

    #[parameterized(
        first = { Duration::from_secs(1), Duration::from_secs(2) },
        second = { Duration::from_secs(2), Duration::from_secs(4) },
        third = { Duration::from_secs(4), Duration::from_secs(8) },
        caps_at_max = { Duration::from_secs(256), Duration::from_secs(300) },
        stays_at_max = { Duration::from_secs(300), Duration::from_secs(300) },
    )]
    fn sequence(current: Duration, expected: Duration) {
        assert_eq!(next_backoff(current), expected);
    }

    #[test]
    fn four_attempts_from_scenario_1_give_2_4_8() {
        let mut backoff = Duration::from_secs(1);
        let mut seen = Vec::new();
        for _ in 0..3 {
            backoff = next_backoff(backoff);
            seen.push(backoff);
        }
        assert_eq!(
            seen,
            vec![
                Duration::from_secs(2),
                Duration::from_secs(4),
                Duration::from_secs(8),
            ]
        );
    }
}
