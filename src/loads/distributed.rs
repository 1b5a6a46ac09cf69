//! Distributed (line) loads on members

use serde::{Deserialize, Serialize};

use crate::error::{StiffnessError, StiffnessResult};
use crate::math::Vec12;

use super::{FixedEndActions, Force};

/// A trapezoidal line load over part of a member.
///
/// Intensity varies linearly from `start` to `end` over `span`, measured
/// from the load's position on the member.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistributedForce {
    start: Force,
    end: Force,
    span: f64,
}

impl DistributedForce {
    pub fn new(start: Force, end: Force, span: f64) -> StiffnessResult<Self> {
        if !span.is_finite() || span <= 0.0 {
            return Err(StiffnessError::InvalidInput(format!(
                "distributed load span {span} must be positive"
            )));
        }
        Ok(Self { start, end, span })
    }

    /// Constant intensity over `span`
    pub fn uniform(intensity: Force, span: f64) -> StiffnessResult<Self> {
        Self::new(intensity, intensity, span)
    }

    pub fn start(&self) -> Force {
        self.start
    }

    pub fn end(&self) -> Force {
        self.end
    }

    pub fn span(&self) -> f64 {
        self.span
    }

    /// Intensity at distance `s` into the span, clamped to the span
    pub fn intensity_at(&self, s: f64) -> Force {
        let t = (s / self.span).clamp(0.0, 1.0);
        self.start * (1.0 - t) + self.end * t
    }

    /// Total load
    pub fn resultant(&self) -> Force {
        (self.start + self.end) * (self.span / 2.0)
    }
}

/// Transverse fixed-end forces and moment magnitudes for a trapezoidal load
/// `w1 -> w2` starting at `a`, spanning `c` and leaving `b` to the j-end.
/// Returns (force_i, force_j, moment_i, moment_j); moment signs are applied
/// per bending plane by the caller.
fn transverse_fixed_end(w1: f64, w2: f64, a: f64, b: f64, c: f64, l: f64) -> (f64, f64, f64, f64) {
    let la = l - a;
    let harmonic = 1.0 + b / la + b * b / (la * la);
    let ra1 = w1 * la.powi(3) / 20.0 / l.powi(3);
    let ra2 = w2 * la.powi(3) / 20.0 / l.powi(3);

    let force_i = -(ra1
        * (7.0 * l + 8.0 * a - b * (3.0 * l + 2.0 * a) / la * harmonic + 2.0 * b.powi(4) / la.powi(3))
        + ra2
            * ((3.0 * l + 2.0 * a) * harmonic
                - b.powi(3) / (la * la) * (2.0 + (15.0 * l - 8.0 * b) / la)));
    let force_j = -((w1 + w2) / 2.0 * c + force_i);

    let denom = 60.0 * (a + b + c).powi(2);
    let moment_i = c
        * (30.0 * a * b * b * w1
            + 30.0 * a * b * b * w2
            + 40.0 * a * b * c * w1
            + 20.0 * a * b * c * w2
            + 15.0 * a * c * c * w1
            + 5.0 * a * c * c * w2
            + 10.0 * b * b * c * w1
            + 20.0 * b * b * c * w2
            + 10.0 * b * c * c * w1
            + 10.0 * b * c * c * w2
            + 3.0 * c.powi(3) * w1
            + 2.0 * c.powi(3) * w2)
        / denom;
    let moment_j = c
        * (30.0 * a * a * b * w1
            + 30.0 * a * a * b * w2
            + 20.0 * a * a * c * w1
            + 10.0 * a * a * c * w2
            + 20.0 * a * b * c * w1
            + 40.0 * a * b * c * w2
            + 10.0 * a * c * c * w1
            + 10.0 * a * c * c * w2
            + 5.0 * b * c * c * w1
            + 15.0 * b * c * c * w2
            + 2.0 * c.powi(3) * w1
            + 3.0 * c.powi(3) * w2)
        / denom;

    (force_i, force_j, moment_i, moment_j)
}

impl FixedEndActions for DistributedForce {
    fn fixed_end_reactions(&self, position: f64, length: f64) -> Vec12 {
        let l = length;
        let a = position;
        let c = self.span;
        // clamp guards rounding when the load ends at the member end
        let b = (l - a - c).max(0.0);
        let (w1, w2) = (self.start, self.end);

        let mut fer = Vec12::zeros();

        // axial: lever rule on the resultant and its first moment about `a`
        let (q1, q2) = (w1.x(), w2.x());
        let total = (q1 + q2) / 2.0 * c;
        let first_moment = c * c * (q1 + 2.0 * q2) / 6.0;
        fer[0] = -(total * (l - a) - first_moment) / l;
        fer[6] = -(total * a + first_moment) / l;

        let (fi, fj, mi, mj) = transverse_fixed_end(w1.y(), w2.y(), a, b, c, l);
        fer[1] = fi;
        fer[7] = fj;
        fer[5] = -mi;
        fer[11] = mj;

        let (fi, fj, mi, mj) = transverse_fixed_end(w1.z(), w2.z(), a, b, c, l);
        fer[2] = fi;
        fer[8] = fj;
        fer[4] = mi;
        fer[10] = -mj;

        fer
    }

    fn extent(&self) -> f64 {
        self.span
    }
}
