//! Fixed-end reactions of concentrated forces and moments

use crate::math::Vec12;

use super::{FixedEndActions, Force, Moment};

impl FixedEndActions for Force {
    fn fixed_end_reactions(&self, position: f64, length: f64) -> Vec12 {
        let [px, py, pz] = self.components();
        let l = length;
        let a = position;
        let b = l - a;
        let l2 = l * l;
        let l3 = l2 * l;

        let mut fer = Vec12::zeros();

        // axial
        fer[0] = -px * b / l;
        fer[6] = -px * a / l;

        // local y, bending about z
        fer[1] = -py * b * b * (3.0 * a + b) / l3;
        fer[5] = -py * a * b * b / l2;
        fer[7] = -py * a * a * (a + 3.0 * b) / l3;
        fer[11] = py * a * a * b / l2;

        // local z, bending about y
        fer[2] = -pz * b * b * (3.0 * a + b) / l3;
        fer[4] = pz * a * b * b / l2;
        fer[8] = -pz * a * a * (a + 3.0 * b) / l3;
        fer[10] = -pz * a * a * b / l2;

        fer
    }
}

impl FixedEndActions for Moment {
    fn fixed_end_reactions(&self, position: f64, length: f64) -> Vec12 {
        let [mx, my, mz] = self.components();
        let l = length;
        let a = position;
        let b = l - a;
        let l2 = l * l;
        let l3 = l2 * l;

        let mut fer = Vec12::zeros();

        // torsion splits by lever rule
        fer[3] = -mx * b / l;
        fer[9] = -mx * a / l;

        // about z
        fer[1] = 6.0 * mz * a * b / l3;
        fer[5] = -mz * b * (b - 2.0 * a) / l2;
        fer[7] = -6.0 * mz * a * b / l3;
        fer[11] = -mz * a * (a - 2.0 * b) / l2;

        // about y
        fer[2] = -6.0 * my * a * b / l3;
        fer[4] = -my * b * (b - 2.0 * a) / l2;
        fer[8] = 6.0 * my * a * b / l3;
        fer[10] = -my * a * (a - 2.0 * b) / l2;

        fer
    }
}
