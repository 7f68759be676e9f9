//! Best-effort post-condition checks.
//!
//! A failed check is logged and counted, never escalated: one bad effect
//! must not hide the results of the remaining checks, and the operator is
//! expected to read the log rather than trust the exit status.

use crate::output;
use alloy_primitives::U256;

/// Tallying checker for a single script run.
#[derive(Debug, Default)]
pub struct Checker {
    passed: u32,
    failed: u32,
}

impl Checker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exact boolean check.
    pub fn check(&mut self, condition: bool, message: &str) {
        if condition {
            self.passed += 1;
            output::check_ok(message);
        } else {
            self.failed += 1;
            output::check_fail(message);
        }
    }

    /// Approximate equality: |a - b| <= a * tolerance / 100.
    ///
    /// A tolerance of zero is an exact comparison; small percentages absorb
    /// integer rounding from on-chain rate and block-time arithmetic.
    pub fn check_almost_equal(&mut self, a: U256, b: U256, tolerance_pct: U256, message: &str) {
        let diff = a.abs_diff(b);
        let max_diff = a * tolerance_pct / U256::from(100);
        self.check(diff <= max_diff, message);
    }

    pub fn passed(&self) -> u32 {
        self.passed
    }

    pub fn failed(&self) -> u32 {
        self.failed
    }

    /// One-line run summary; failures stay soft even here.
    pub fn summary(&self) {
        if self.failed == 0 {
            output::info(&format!("All {} checks passed", self.passed));
        } else {
            output::info(&format!(
                "{} of {} checks FAILED",
                self.failed,
                self.passed + self.failed
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_counts_without_aborting() {
        let mut checker = Checker::new();
        checker.check(true, "ok");
        checker.check(false, "bad");
        checker.check(true, "still running after a failure");
        assert_eq!(checker.passed(), 2);
        assert_eq!(checker.failed(), 1);
    }

    #[test]
    fn test_almost_equal_zero_tolerance_is_exact() {
        let mut checker = Checker::new();
        let amount = U256::from(150_000u64) * U256::from(1_000_000u64);
        checker.check_almost_equal(amount, amount, U256::ZERO, "exact transfer");
        checker.check_almost_equal(amount, amount + U256::from(1), U256::ZERO, "off by one");
        assert_eq!(checker.passed(), 1);
        assert_eq!(checker.failed(), 1);
    }

    #[test]
    fn test_almost_equal_tolerance_bounds() {
        let mut checker = Checker::new();
        let before = U256::from(1_000_000u64);
        // halved with drift inside 5%
        checker.check_almost_equal(
            U256::from(480_000u64),
            before / U256::from(2),
            U256::from(5),
            "within 5%",
        );
        // drift beyond 1%
        checker.check_almost_equal(
            U256::from(480_000u64),
            before / U256::from(2),
            U256::from(1),
            "outside 1%",
        );
        assert_eq!(checker.passed(), 1);
        assert_eq!(checker.failed(), 1);
    }

    #[test]
    fn test_almost_equal_is_symmetric_on_direction() {
        let mut checker = Checker::new();
        let a = U256::from(100u64);
        checker.check_almost_equal(a, U256::from(104), U256::from(5), "b above a");
        checker.check_almost_equal(a, U256::from(96), U256::from(5), "b below a");
        assert_eq!(checker.failed(), 0);
    }
}
