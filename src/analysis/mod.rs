//! Analysis options and post-solve checks

mod statics;

use serde::{Deserialize, Serialize};

use crate::error::{StiffnessError, StiffnessResult};

pub use statics::{equilibrium_residual, Residual};

/// Options for a linear static solve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOptions {
    /// Samples along each member for diagrams
    pub sample_points: usize,
    /// Relative singular-value cutoff for condensation pseudo-inverses
    pub pinv_rtol: f64,
    /// Relative pivot below which the free stiffness block is unstable
    pub singular_tolerance: f64,
    /// Check global equilibrium after the solve
    pub check_statics: bool,
    /// Residual allowed by the equilibrium check, relative to the loads
    pub statics_tolerance: f64,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            sample_points: 1000,
            pinv_rtol: 1e-12,
            singular_tolerance: 1e-12,
            check_statics: false,
            statics_tolerance: 1e-6,
        }
    }
}

impl AnalysisOptions {
    /// Default options with the equilibrium check switched on
    pub fn strict() -> Self {
        Self {
            check_statics: true,
            statics_tolerance: 1e-9,
            ..Self::default()
        }
    }

    /// Set diagram resolution
    pub fn with_sample_points(mut self, n: usize) -> Self {
        self.sample_points = n;
        self
    }

    pub fn with_pinv_rtol(mut self, rtol: f64) -> Self {
        self.pinv_rtol = rtol;
        self
    }

    pub fn with_singular_tolerance(mut self, tol: f64) -> Self {
        self.singular_tolerance = tol;
        self
    }

    /// Enable the equilibrium check with the given tolerance
    pub fn with_statics_check(mut self, tol: f64) -> Self {
        self.check_statics = true;
        self.statics_tolerance = tol;
        self
    }

    pub fn validate(&self) -> StiffnessResult<()> {
        if self.sample_points < 2 {
            return Err(StiffnessError::InvalidInput(format!(
                "sample_points must be at least 2, got {}",
                self.sample_points
            )));
        }
        for (name, value) in [
            ("pinv_rtol", self.pinv_rtol),
            ("singular_tolerance", self.singular_tolerance),
            ("statics_tolerance", self.statics_tolerance),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(StiffnessError::InvalidInput(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        Ok(())
    }
}
