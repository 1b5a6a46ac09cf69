//! Result records for a solved structure

use serde::{Deserialize, Serialize};

use crate::elements::{Member, MemberId, NodeId, Plane};
use crate::error::StiffnessResult;
use crate::loads::EndActions;

/// Displacement results at a node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeDisplacement {
    /// Displacement in X direction
    pub dx: f64,
    /// Displacement in Y direction
    pub dy: f64,
    /// Displacement in Z direction
    pub dz: f64,
    /// Rotation about X axis
    pub rx: f64,
    /// Rotation about Y axis
    pub ry: f64,
    /// Rotation about Z axis
    pub rz: f64,
}

impl NodeDisplacement {
    /// Create from array [DX, DY, DZ, RX, RY, RZ]
    pub fn from_array(arr: [f64; 6]) -> Self {
        let [dx, dy, dz, rx, ry, rz] = arr;
        Self { dx, dy, dz, rx, ry, rz }
    }

    pub fn to_array(&self) -> [f64; 6] {
        [self.dx, self.dy, self.dz, self.rx, self.ry, self.rz]
    }

    /// Get translation magnitude
    pub fn translation_magnitude(&self) -> f64 {
        (self.dx.powi(2) + self.dy.powi(2) + self.dz.powi(2)).sqrt()
    }

    /// Get rotation magnitude
    pub fn rotation_magnitude(&self) -> f64 {
        (self.rx.powi(2) + self.ry.powi(2) + self.rz.powi(2)).sqrt()
    }
}

/// Reaction forces at a supported node
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Reactions {
    /// Reaction force in X direction
    pub fx: f64,
    /// Reaction force in Y direction
    pub fy: f64,
    /// Reaction force in Z direction
    pub fz: f64,
    /// Reaction moment about X axis
    pub mx: f64,
    /// Reaction moment about Y axis
    pub my: f64,
    /// Reaction moment about Z axis
    pub mz: f64,
}

impl Reactions {
    /// Create from array [FX, FY, FZ, MX, MY, MZ]
    pub fn from_array(arr: [f64; 6]) -> Self {
        let [fx, fy, fz, mx, my, mz] = arr;
        Self { fx, fy, fz, mx, my, mz }
    }

    pub fn to_array(&self) -> [f64; 6] {
        [self.fx, self.fy, self.fz, self.mx, self.my, self.mz]
    }

    /// Get total force magnitude
    pub fn force_magnitude(&self) -> f64 {
        (self.fx.powi(2) + self.fy.powi(2) + self.fz.powi(2)).sqrt()
    }

    /// Get total moment magnitude
    pub fn moment_magnitude(&self) -> f64 {
        (self.mx.powi(2) + self.my.powi(2) + self.mz.powi(2)).sqrt()
    }

    /// Component-wise sum of a set of reactions
    pub fn sum_forces<'a>(reactions: impl IntoIterator<Item = &'a Reactions>) -> Reactions {
        reactions.into_iter().fold(Reactions::default(), |acc, r| {
            let (a, b) = (acc.to_array(), r.to_array());
            Reactions::from_array(std::array::from_fn(|i| a[i] + b[i]))
        })
    }
}

/// Internal forces at a section of a member, in the sign convention of
/// the member diagrams (tension and sagging positive)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MemberForces {
    /// Axial force (positive = tension)
    pub axial: f64,
    /// Shear force in local y direction
    pub shear_y: f64,
    /// Shear force in local z direction
    pub shear_z: f64,
    /// Torsion
    pub torsion: f64,
    /// Bending moment about local y axis
    pub moment_y: f64,
    /// Bending moment about local z axis
    pub moment_z: f64,
}

impl MemberForces {
    /// Internal forces just inside the i-node
    pub fn at_i(ends: &EndActions) -> Self {
        Self {
            axial: -ends.force_i.x(),
            shear_y: ends.force_i.y(),
            shear_z: ends.force_i.z(),
            torsion: -ends.moment_i.x(),
            moment_y: -ends.moment_i.y(),
            moment_z: -ends.moment_i.z(),
        }
    }

    /// Internal forces just inside the j-node
    pub fn at_j(ends: &EndActions) -> Self {
        Self {
            axial: ends.force_j.x(),
            shear_y: -ends.force_j.y(),
            shear_z: -ends.force_j.z(),
            torsion: ends.moment_j.x(),
            moment_y: ends.moment_j.y(),
            moment_z: ends.moment_j.z(),
        }
    }

    /// Signed extreme of each diagram along a solved member
    pub fn extremes(member: &Member) -> StiffnessResult<Self> {
        Ok(Self {
            axial: member.axial_force()?.extreme(),
            shear_y: member.shear(Plane::Xy)?.extreme(),
            shear_z: member.shear(Plane::Xz)?.extreme(),
            torsion: member.torsion()?.extreme(),
            moment_y: member.bending(Plane::Xz)?.extreme(),
            moment_z: member.bending(Plane::Xy)?.extreme(),
        })
    }

    /// Largest bending moment magnitude in either plane
    pub fn max_moment(&self) -> f64 {
        self.moment_y.abs().max(self.moment_z.abs())
    }

    /// Largest shear magnitude in either plane
    pub fn max_shear(&self) -> f64 {
        self.shear_y.abs().max(self.shear_z.abs())
    }
}

/// Summary of analysis results
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    /// Nodes taking part in the analysis
    pub num_nodes: usize,
    pub num_members: usize,
    /// DOFs left after node releases
    pub total_dofs: usize,
    /// Free DOFs (unknown)
    pub free_dofs: usize,
    pub restrained_dofs: usize,
    /// Largest translation and where it occurs
    pub max_displacement: f64,
    pub max_disp_node: Option<NodeId>,
    /// Largest reaction force and where it occurs
    pub max_reaction: f64,
    pub max_reaction_node: Option<NodeId>,
    /// Largest axial force magnitude and its member
    pub max_axial: f64,
    pub max_axial_member: Option<MemberId>,
    /// Largest bending moment magnitude and its member
    pub max_moment: f64,
    pub max_moment_member: Option<MemberId>,
    /// Sum of all support reactions
    pub total_reaction: Reactions,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loads::{Force, Moment};

    #[test]
    fn test_end_forces_use_diagram_signs() {
        let ends = EndActions {
            force_i: Force::new(-5.0, 3.0, 0.0),
            moment_i: Moment::about_z(2.0),
            force_j: Force::new(5.0, -3.0, 0.0),
            moment_j: Moment::about_z(4.0),
        };
        let i = MemberForces::at_i(&ends);
        let j = MemberForces::at_j(&ends);
        assert_eq!(i.axial, 5.0);
        assert_eq!(j.axial, 5.0);
        assert_eq!(i.shear_y, 3.0);
        assert_eq!(j.shear_y, 3.0);
        assert_eq!(i.moment_z, -2.0);
        assert_eq!(j.moment_z, 4.0);
        assert_eq!(j.max_moment(), 4.0);
    }

    #[test]
    fn test_reaction_sum() {
        let a = Reactions::from_array([1.0, 2.0, 0.0, 0.0, 0.0, 3.0]);
        let b = Reactions::from_array([-1.0, 4.0, 0.0, 0.0, 0.0, 0.0]);
        let total = Reactions::sum_forces([&a, &b]);
        assert_eq!(total.fy, 6.0);
        assert_eq!(total.fx, 0.0);
        assert_eq!(total.mz, 3.0);
    }
}
