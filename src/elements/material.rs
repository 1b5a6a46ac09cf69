//! Material properties

use serde::{Deserialize, Serialize};

/// Linear elastic material.
///
/// Units are whatever the model uses consistently; the presets are in
/// US customary units (lbf, in).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Modulus of elasticity
    pub e: f64,
    /// Shear modulus
    pub g: f64,
    /// Poisson's ratio
    pub nu: f64,
    /// Yield stress
    pub fy: Option<f64>,
    /// Ultimate stress
    pub fu: Option<f64>,
    /// Weight per unit volume
    pub unit_weight: f64,
}

impl Material {
    /// Isotropic material; G is derived as E / (2 (1 + nu))
    pub fn new(e: f64, nu: f64) -> Self {
        Self {
            e,
            g: e / 2.0 / (1.0 + nu),
            nu,
            fy: None,
            fu: None,
            unit_weight: 0.0,
        }
    }

    /// Material with an explicit shear modulus
    pub fn with_shear_modulus(mut self, g: f64) -> Self {
        self.g = g;
        self
    }

    pub fn with_strength(mut self, fy: f64, fu: f64) -> Self {
        self.fy = Some(fy);
        self.fu = Some(fu);
        self
    }

    pub fn with_unit_weight(mut self, w: f64) -> Self {
        self.unit_weight = w;
        self
    }

    /// ASTM A36 structural steel (psi, lbf/in³)
    pub fn a36() -> Self {
        Self::new(29e6, 0.3)
            .with_strength(36e3, 58e3)
            .with_unit_weight(0.2836)
    }

    /// ASTM A572 Grade 50 steel (psi, lbf/in³)
    pub fn a572_grade_50() -> Self {
        Self::new(29e6, 0.3)
            .with_strength(50e3, 65e3)
            .with_unit_weight(0.2836)
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::a36()
    }
}
