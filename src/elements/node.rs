//! Node element - a connection point with six degrees of freedom

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{StiffnessError, StiffnessResult};
use crate::loads::{Force, Moment};
use crate::math::{self, Mat3, Vec3};

use super::{Dof, DofMask, Support};

/// Node identity inside a structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "N{}", self.0)
    }
}

/// Solved state written by the structure
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub(crate) struct NodeSolution {
    /// Solved displacement at free degrees
    pub displacements: [f64; 6],
    /// Support reaction at restrained degrees
    pub reactions: [f64; 6],
    /// Spring force at elastically supported degrees
    pub elastic_reactions: [f64; 6],
}

/// A node in 3D space.
///
/// Loads, restraints, spring constants and prescribed displacements are
/// expressed in the node's local frame, which is the global frame rotated
/// by `angle` (a rotation vector in radians).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    position: Vec3,
    angle: Vec3,

    /// Assigned when the node joins a structure
    #[serde(skip)]
    pub(crate) id: Option<NodeId>,

    force: Force,
    moment: Moment,
    restraints: DofMask,
    elastic_constants: [f64; 6],
    prescribed: [f64; 6],

    /// Node-wide releases, resolved from the attached members
    #[serde(skip)]
    pub(crate) releases: DofMask,

    #[serde(skip)]
    pub(crate) solution: Option<NodeSolution>,
}

impl Node {
    /// Create a new node at the given coordinates
    pub fn new(position: [f64; 3]) -> Self {
        Self {
            position: Vec3::from(position),
            angle: Vec3::zeros(),
            id: None,
            force: Force::zero(),
            moment: Moment::zero(),
            restraints: DofMask::none(),
            elastic_constants: [0.0; 6],
            prescribed: [0.0; 6],
            releases: DofMask::none(),
            solution: None,
        }
    }

    /// Node in the xy plane
    pub fn planar(x: f64, y: f64) -> Self {
        Self::new([x, y, 0.0])
    }

    /// Node on the x axis
    pub fn on_line(x: f64) -> Self {
        Self::new([x, 0.0, 0.0])
    }

    /// Orient the node's local frame by a rotation vector (radians)
    pub fn with_angle(mut self, angle: [f64; 3]) -> Self {
        self.angle = Vec3::from(angle);
        self
    }

    pub fn with_force(mut self, force: Force) -> Self {
        self.force = force;
        self
    }

    pub fn with_moment(mut self, moment: Moment) -> Self {
        self.moment = moment;
        self
    }

    pub fn with_restraints(mut self, restraints: DofMask) -> Self {
        self.restraints = restraints;
        self
    }

    pub fn with_support(mut self, support: Support) -> Self {
        self.set_support(support);
        self
    }

    pub fn with_elastic_constants(mut self, k: [f64; 6]) -> Self {
        self.elastic_constants = k;
        self
    }

    pub fn with_displacements(mut self, d: [f64; 6]) -> Self {
        self.prescribed = d;
        self
    }

    pub fn id(&self) -> Option<NodeId> {
        self.id
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn angle(&self) -> Vec3 {
        self.angle
    }

    /// Rotation taking vectors in the node frame to the global frame
    pub fn rotation(&self) -> Mat3 {
        math::node_rotation(&self.angle)
    }

    pub fn distance_to(&self, other: &Node) -> f64 {
        (other.position - self.position).norm()
    }

    pub fn force(&self) -> Force {
        self.force
    }

    pub fn moment(&self) -> Moment {
        self.moment
    }

    pub fn set_force(&mut self, force: Force) {
        self.force = force;
    }

    pub fn set_moment(&mut self, moment: Moment) {
        self.moment = moment;
    }

    /// Add to the applied force
    pub fn add_force(&mut self, force: Force) {
        self.force += force;
    }

    /// Add to the applied moment
    pub fn add_moment(&mut self, moment: Moment) {
        self.moment += moment;
    }

    pub fn restraints(&self) -> DofMask {
        self.restraints
    }

    pub fn set_restraints(&mut self, restraints: DofMask) {
        self.restraints = restraints;
    }

    /// Apply a support: its restraints replace the current ones, its
    /// enforced displacements override the prescribed values they name
    pub fn set_support(&mut self, support: Support) {
        self.restraints = support.restraints;
        for (prescribed, enforced) in self.prescribed.iter_mut().zip(support.enforced) {
            if let Some(value) = enforced {
                *prescribed = value;
            }
        }
    }

    /// Node-wide releases, valid once the owning structure has resolved them
    pub fn releases(&self) -> DofMask {
        self.releases
    }

    pub fn elastic_constants(&self) -> [f64; 6] {
        self.elastic_constants
    }

    pub fn set_elastic_constants(&mut self, k: [f64; 6]) -> StiffnessResult<()> {
        if let Some(bad) = k.iter().find(|k| !k.is_finite() || **k < 0.0) {
            return Err(StiffnessError::InvalidInput(format!(
                "elastic constant {bad} must be finite and non-negative"
            )));
        }
        self.elastic_constants = k;
        Ok(())
    }

    pub fn prescribed_displacements(&self) -> [f64; 6] {
        self.prescribed
    }

    /// Prescribe displacements; only restrained degrees hold them
    pub fn set_displacements(&mut self, d: [f64; 6]) {
        self.prescribed = d;
    }

    /// Applied force and moment as one 6-vector
    pub fn applied_action(&self) -> [f64; 6] {
        let [fx, fy, fz] = self.force.components();
        let [mx, my, mz] = self.moment.components();
        [fx, fy, fz, mx, my, mz]
    }

    pub fn is_solved(&self) -> bool {
        self.solution.is_some()
    }

    fn solution(&self) -> StiffnessResult<&NodeSolution> {
        self.solution.as_ref().ok_or(StiffnessError::NotSolved)
    }

    /// Final displacement, node frame: zero at released degrees, prescribed
    /// at restrained ones, solved elsewhere
    pub fn displacements(&self) -> StiffnessResult<[f64; 6]> {
        let s = self.solution()?;
        Ok(Dof::ALL.map(|d| {
            if self.releases.contains(d) {
                0.0
            } else if self.restraints.contains(d) {
                self.prescribed[d.index()]
            } else {
                s.displacements[d.index()]
            }
        }))
    }

    pub fn displacement(&self, dof: Dof) -> StiffnessResult<f64> {
        Ok(self.displacements()?[dof.index()])
    }

    /// Support reactions at restrained degrees
    pub fn reactions(&self) -> StiffnessResult<[f64; 6]> {
        Ok(self.solution()?.reactions)
    }

    /// Spring forces at elastically supported degrees
    pub fn elastic_reactions(&self) -> StiffnessResult<[f64; 6]> {
        Ok(self.solution()?.elastic_reactions)
    }

    /// Applied action accumulated with support and spring reactions
    pub fn action(&self) -> StiffnessResult<[f64; 6]> {
        let s = self.solution()?;
        let applied = self.applied_action();
        Ok(std::array::from_fn(|i| {
            applied[i] + s.reactions[i] + s.elastic_reactions[i]
        }))
    }

    /// Position after displacement, translations scaled by `scale`
    pub fn deformed_position(&self, scale: f64) -> StiffnessResult<Vec3> {
        let d = self.displacements()?;
        let translation = self.rotation() * Vec3::new(d[0], d[1], d[2]);
        Ok(self.position + translation * scale)
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new([0.0; 3])
    }
}
