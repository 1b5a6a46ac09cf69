//! AISC steel capacity checks on solved members

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::elements::Member;
use crate::error::{StiffnessError, StiffnessResult};

/// Design philosophy for capacity factors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DesignMethod {
    /// Load and resistance factor design (phi = 0.9)
    #[default]
    Lrfd,
    /// Allowable strength design (omega = 1.67)
    Asd,
}

impl DesignMethod {
    /// Available strength from a nominal strength
    pub fn available(self, nominal: f64) -> f64 {
        self.factored(nominal, 0.9, 1.67)
    }

    fn factored(self, nominal: f64, phi: f64, omega: f64) -> f64 {
        match self {
            DesignMethod::Lrfd => phi * nominal,
            DesignMethod::Asd => nominal / omega,
        }
    }
}

/// Outcome of a capacity check
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DesignCheck {
    /// Largest force of the relevant sign, as a magnitude
    pub demand: f64,
    /// Available strength
    pub capacity: f64,
    /// demand / capacity
    pub ratio: f64,
    pub passes: bool,
}

impl DesignCheck {
    fn new(demand: f64, capacity: f64) -> Self {
        let ratio = if demand > 0.0 { demand / capacity } else { 0.0 };
        Self {
            demand,
            capacity,
            ratio,
            passes: ratio < 1.0,
        }
    }
}

fn yield_stress(member: &Member) -> StiffnessResult<f64> {
    member
        .section()
        .material
        .fy
        .ok_or_else(|| StiffnessError::InvalidInput("material has no yield stress".to_string()))
}

/// Tensile yielding of the gross section, AISC D2(a)
pub fn tension_yield(member: &Member, method: DesignMethod) -> StiffnessResult<DesignCheck> {
    let fy = yield_stress(member)?;
    let capacity = method.available(fy * member.section().a);
    let demand = member.axial_force()?.max().max(0.0);
    Ok(DesignCheck::new(demand, capacity))
}

/// Tensile rupture of the net section, AISC D2(b). `effective_area` is
/// the effective net area Ae.
pub fn tension_rupture(member: &Member, effective_area: f64, method: DesignMethod) -> StiffnessResult<DesignCheck> {
    if !(effective_area > 0.0 && effective_area <= member.section().a) {
        return Err(StiffnessError::InvalidInput(format!(
            "effective net area {effective_area} must lie in (0, {}]",
            member.section().a
        )));
    }
    let fu = member
        .section()
        .material
        .fu
        .ok_or_else(|| StiffnessError::InvalidInput("material has no ultimate stress".to_string()))?;
    let capacity = method.factored(fu * effective_area, 0.75, 2.0);
    let demand = member.axial_force()?.max().max(0.0);
    Ok(DesignCheck::new(demand, capacity))
}

/// Flexural buckling of a compression member, AISC E3, with effective
/// length factor `k` over the full member length
pub fn flexural_buckling(member: &Member, k: f64, method: DesignMethod) -> StiffnessResult<DesignCheck> {
    let fy = yield_stress(member)?;
    let section = member.section();
    let e = section.material.e;

    let r = section.rz().min(section.ry());
    let slenderness = k * member.length()? / r;
    let euler = PI * PI * e / slenderness.powi(2);
    let critical = if slenderness <= 4.71 * (e / fy).sqrt() {
        0.658_f64.powf(fy / euler) * fy
    } else {
        0.877 * euler
    };

    let capacity = method.available(critical * section.a);
    let demand = (-member.axial_force()?.min()).max(0.0);
    Ok(DesignCheck::new(demand, capacity))
}
