use crate::constants::{ACCRUAL_CATCHUP_CAP_MS, ACCRUAL_UNIT_MS};

/// Result of one accrual application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accrual {
    /// Whole units earned by this call. Never negative; zero when less
    /// than one full period has elapsed.
    pub units: u64,
    /// Where the accrual clock stands afterwards. Callers own persisting it.
    pub last_accrual_ms: u64,
}

/// Converts elapsed wall-clock time into whole reward units, exactly once
/// per unit of time.
///
/// A missing `last_accrual_ms` seeds the clock at `now_ms` and earns
/// nothing, so session-start skew never mints a free unit. Elapsed time is
/// capped at `ACCRUAL_CATCHUP_CAP_MS` per call, bounding what an
/// arbitrarily old timestamp can grant. When no whole unit has elapsed the
/// timestamp is left alone and the fraction carries into the next call;
/// when units are granted the clock advances all the way to `now_ms`.
pub fn accrue(last_accrual_ms: Option<u64>, now_ms: u64) -> Accrual {
    let last = match last_accrual_ms {
        Some(last) => last,
        None => {
            return Accrual {
                units: 0,
                last_accrual_ms: now_ms,
            };
        }
    };

    // Nothing elapsed, or the clock moved backwards: grant nothing and
    // leave the timestamp where it was.
    if now_ms <= last {
        return Accrual {
            units: 0,
            last_accrual_ms: last,
        };
    }

    let elapsed = (now_ms - last).min(ACCRUAL_CATCHUP_CAP_MS);
    let units = elapsed / ACCRUAL_UNIT_MS;

    if units == 0 {
        return Accrual {
            units: 0,
            last_accrual_ms: last,
        };
    }

    Accrual {
        units,
        last_accrual_ms: now_ms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: u64 = 1_700_000_000_000;

    #[test]
    fn test_first_call_seeds_without_granting() {
        let outcome = accrue(None, T0);
        assert_eq!(outcome.units, 0);
        assert_eq!(outcome.last_accrual_ms, T0);
    }

    #[test]
    fn test_under_one_period_grants_nothing() {
        let outcome = accrue(Some(T0), T0 + 4_000);
        assert_eq!(outcome.units, 0);
        // Timestamp untouched so the partial period is not lost.
        assert_eq!(outcome.last_accrual_ms, T0);
    }

    #[test]
    fn test_exactly_one_period_grants_one_unit() {
        let outcome = accrue(Some(T0), T0 + 5_000);
        assert_eq!(outcome.units, 1);
        assert_eq!(outcome.last_accrual_ms, T0 + 5_000);
    }

    #[test]
    fn test_partial_periods_round_down() {
        let outcome = accrue(Some(T0), T0 + 17_000);
        assert_eq!(outcome.units, 3);
        // The clock advances to now, not to the last whole-unit boundary.
        assert_eq!(outcome.last_accrual_ms, T0 + 17_000);
    }

    #[test]
    fn test_catch_up_is_capped_at_one_hour() {
        // Two hours away caps to 3600s -> 720 units.
        let outcome = accrue(Some(T0), T0 + 7_200_000);
        assert_eq!(outcome.units, 720);
        assert_eq!(outcome.last_accrual_ms, T0 + 7_200_000);
    }

    #[test]
    fn test_zero_elapsed_is_a_no_op() {
        let outcome = accrue(Some(T0), T0);
        assert_eq!(outcome.units, 0);
        assert_eq!(outcome.last_accrual_ms, T0);
    }

    #[test]
    fn test_backwards_clock_is_a_no_op() {
        let outcome = accrue(Some(T0), T0 - 10_000);
        assert_eq!(outcome.units, 0);
        assert_eq!(outcome.last_accrual_ms, T0);
    }

    #[test]
    fn test_redundant_invocations_grant_once() {
        let first = accrue(Some(T0), T0 + 25_000);
        assert_eq!(first.units, 5);

        // Immediately re-invoked with the advanced timestamp: nothing more.
        let second = accrue(Some(first.last_accrual_ms), T0 + 25_000);
        assert_eq!(second.units, 0);
        assert_eq!(second.last_accrual_ms, T0 + 25_000);
    }
}
