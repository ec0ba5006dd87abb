//! Solver configuration.

use super::{DEFAULT_KCL_TOLERANCE, DEFAULT_PIVOT_TOLERANCE};

/// Configuration for a branch-current solve.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
    /// Smallest pivot magnitude accepted during LU factorization.
    pub pivot_tolerance: f64,
    /// Check Kirchhoff's current law at every vertex after solving.
    pub verify_kcl: bool,
    /// Allowed KCL residual, relative to the largest branch current.
    pub kcl_tolerance: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            pivot_tolerance: DEFAULT_PIVOT_TOLERANCE,
            verify_kcl: false,
            kcl_tolerance: DEFAULT_KCL_TOLERANCE,
        }
    }
}

impl SolverConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the pivot tolerance.
    ///
    /// Circuits with very small resistances next to very large ones may need
    /// this lowered below the default.
    pub fn with_pivot_tolerance(mut self, tolerance: f64) -> Self {
        self.pivot_tolerance = tolerance;
        self
    }

    /// Enable or disable the post-solve KCL check.
    pub fn with_kcl_check(mut self, enabled: bool) -> Self {
        self.verify_kcl = enabled;
        self
    }

    /// Set the relative KCL tolerance used by the post-solve check.
    pub fn with_kcl_tolerance(mut self, tolerance: f64) -> Self {
        self.kcl_tolerance = tolerance;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = SolverConfig::new()
            .with_pivot_tolerance(1e-20)
            .with_kcl_check(true)
            .with_kcl_tolerance(1e-6);
        assert_eq!(config.pivot_tolerance, 1e-20);
        assert!(config.verify_kcl);
        assert_eq!(config.kcl_tolerance, 1e-6);
        assert!(!SolverConfig::default().verify_kcl);
    }
}
