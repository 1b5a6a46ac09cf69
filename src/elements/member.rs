//! Member element - prismatic 3D beam connecting two nodes

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{StiffnessError, StiffnessResult};
use crate::loads::{
    DistributedForce, EndActions, FixedEndActions, Force, LoadContext, MemberLoad, Moment,
};
use crate::math::{self, Mat, Mat12, Mat3, Vec12, Vec3, Vector};

use super::{DofMask, MemberReleases, Node, NodeId, Section};

/// Members shorter than this are rejected
const MIN_LENGTH: f64 = 1e-12;

/// Largest direction cosine allowed between a kept and a released
/// component of a partly released end
const ALIGNMENT_TOLERANCE: f64 = 1e-9;

fn rebind<A: FixedEndActions + Clone>(
    loads: &[MemberLoad<A>],
    context: LoadContext,
) -> StiffnessResult<Vec<MemberLoad<A>>> {
    loads.iter().map(|load| load.rebound(context)).collect()
}

/// Member identity inside a structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MemberId(pub usize);

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "M{}", self.0)
    }
}

/// Geometry fixed when the member joins a structure
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MemberGeometry {
    pub length: f64,
    /// Global-to-local rotation of the member axes
    pub rotation: Mat3,
    /// Member rotation composed with each end node's frame
    pub end_rotations: [Mat3; 2],
}

/// Solved state written by the structure
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MemberSolution {
    pub end_actions: EndActions,
    pub local_displacements: Vec12,
    pub sample_points: usize,
}

/// A prismatic member between two nodes
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    i_node: NodeId,
    j_node: NodeId,
    section: Section,
    releases: MemberReleases,

    pub(crate) geometry: Option<MemberGeometry>,

    forces: Vec<MemberLoad<Force>>,
    moments: Vec<MemberLoad<Moment>>,
    distributed: Vec<MemberLoad<DistributedForce>>,

    pub(crate) solution: Option<MemberSolution>,
}

impl Member {
    /// Create a new member from the i-node to the j-node
    pub fn new(i_node: NodeId, j_node: NodeId, section: Section) -> Self {
        Self {
            i_node,
            j_node,
            section,
            releases: MemberReleases::none(),
            geometry: None,
            forces: Vec::new(),
            moments: Vec::new(),
            distributed: Vec::new(),
            solution: None,
        }
    }

    /// Set member end releases
    pub fn with_releases(mut self, releases: MemberReleases) -> Self {
        self.releases = releases;
        self
    }

    pub fn i_node(&self) -> NodeId {
        self.i_node
    }

    pub fn j_node(&self) -> NodeId {
        self.j_node
    }

    pub fn section(&self) -> &Section {
        &self.section
    }

    pub fn releases(&self) -> MemberReleases {
        self.releases
    }

    /// Compute length and orientation from the end nodes
    pub(crate) fn attach(&mut self, i: &Node, j: &Node) -> StiffnessResult<()> {
        if self.i_node == self.j_node {
            return Err(StiffnessError::InvalidGeometry(format!(
                "member connects node {} to itself",
                self.i_node
            )));
        }
        let s = &self.section;
        if !(s.a > 0.0 && s.material.e > 0.0) {
            return Err(StiffnessError::InvalidInput(format!(
                "section area {} and modulus {} must be positive",
                s.a, s.material.e
            )));
        }

        let delta = j.position() - i.position();
        let length = delta.norm();
        if length < MIN_LENGTH {
            return Err(StiffnessError::InvalidGeometry(format!(
                "nodes {} and {} coincide",
                self.i_node, self.j_node
            )));
        }

        let rotation = math::member_rotation(&delta);
        let end_rotations = [rotation * i.rotation(), rotation * j.rotation()];
        self.check_release_alignment(&end_rotations)?;

        // loads follow the new geometry
        let context = LoadContext {
            length,
            section: self.section,
            releases: self.releases,
        };
        let forces = rebind(&self.forces, context)?;
        let moments = rebind(&self.moments, context)?;
        let distributed = rebind(&self.distributed, context)?;

        self.geometry = Some(MemberGeometry {
            length,
            rotation,
            end_rotations,
        });
        self.forces = forces;
        self.moments = moments;
        self.distributed = distributed;
        self.solution = None;
        Ok(())
    }

    /// Reject ends where a partly released group (translations or
    /// rotations) mixes kept and released components between the node
    /// frame and the member frame
    fn check_release_alignment(&self, end_rotations: &[Mat3; 2]) -> StiffnessResult<()> {
        let ends = [
            (self.i_node, end_rotations[0], self.releases.i_node),
            (self.j_node, end_rotations[1], self.releases.j_node),
        ];
        for (node, r, released) in ends {
            for (offset, group) in [(0, DofMask::translations()), (3, DofMask::rotations())] {
                let rel = released.intersection(group);
                let kept = group.intersection(released.complement());
                for k in kept.released() {
                    for q in rel.released() {
                        let (a, b) = (k.index() - offset, q.index() - offset);
                        if r[(a, b)].abs() > ALIGNMENT_TOLERANCE || r[(b, a)].abs() > ALIGNMENT_TOLERANCE {
                            return Err(StiffnessError::InvalidGeometry(format!(
                                "member {} -> {} releases {q} at node {node} but keeps {k}, \
                                 which is not aligned with the node frame",
                                self.i_node, self.j_node
                            )));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    pub(crate) fn geometry(&self) -> StiffnessResult<&MemberGeometry> {
        self.geometry.as_ref().ok_or_else(|| {
            StiffnessError::InvalidGeometry(format!(
                "member {} -> {} is not part of a structure",
                self.i_node, self.j_node
            ))
        })
    }

    pub fn length(&self) -> StiffnessResult<f64> {
        Ok(self.geometry()?.length)
    }

    /// Global-to-local rotation of the member axes
    pub fn axis_rotation(&self) -> StiffnessResult<Mat3> {
        Ok(self.geometry()?.rotation)
    }

    /// Unit vector from the i-node to the j-node
    pub fn direction(&self) -> StiffnessResult<Vec3> {
        Ok(self.geometry()?.rotation.row(0).transpose())
    }

    pub fn load_context(&self) -> StiffnessResult<LoadContext> {
        Ok(LoadContext {
            length: self.length()?,
            section: self.section,
            releases: self.releases,
        })
    }

    /// Apply a concentrated force (local axes) at `position` from the i-node
    pub fn add_force(&mut self, position: f64, force: Force) -> StiffnessResult<()> {
        let load = MemberLoad::new(force, position, self.load_context()?)?;
        self.forces.push(load);
        self.solution = None;
        Ok(())
    }

    /// Apply a concentrated moment (local axes) at `position` from the i-node
    pub fn add_moment(&mut self, position: f64, moment: Moment) -> StiffnessResult<()> {
        let load = MemberLoad::new(moment, position, self.load_context()?)?;
        self.moments.push(load);
        self.solution = None;
        Ok(())
    }

    /// Apply a line load (local axes) starting at `position` from the i-node
    pub fn add_distributed(&mut self, position: f64, load: DistributedForce) -> StiffnessResult<()> {
        let load = MemberLoad::new(load, position, self.load_context()?)?;
        self.distributed.push(load);
        self.solution = None;
        Ok(())
    }

    pub fn forces(&self) -> &[MemberLoad<Force>] {
        &self.forces
    }

    pub fn moments(&self) -> &[MemberLoad<Moment>] {
        &self.moments
    }

    pub fn distributed_loads(&self) -> &[MemberLoad<DistributedForce>] {
        &self.distributed
    }

    /// Local degrees kept by the member releases, as 0..12 indices
    pub fn kept_indices(&self) -> Vec<usize> {
        math::partition(&self.releases.merged()).0
    }

    /// Full 12x12 local stiffness, before releases
    pub fn local_stiffness(&self) -> StiffnessResult<Mat12> {
        Ok(self.load_context()?.local_stiffness())
    }

    /// Local stiffness with this member's released DOFs condensed out,
    /// sized to the kept DOFs
    pub fn member_oriented_stiffness(&self, rtol: f64) -> StiffnessResult<Mat> {
        math::condense_stiffness(&self.local_stiffness()?, &self.releases.merged(), rtol)
    }

    /// Block-diagonal rotation over the kept DOFs (i forces, i moments,
    /// j forces, j moments), taking node-frame components to local ones
    pub fn rotation_matrix(&self) -> StiffnessResult<Mat> {
        let geometry = self.geometry()?;
        let ends = [
            (geometry.end_rotations[0], self.releases.i_node),
            (geometry.end_rotations[1], self.releases.j_node),
        ];

        let mut blocks = Vec::with_capacity(4);
        for (r, released) in ends {
            for (offset, group) in [(0, DofMask::translations()), (3, DofMask::rotations())] {
                let kept: Vec<usize> = released
                    .union(group.complement())
                    .kept()
                    .map(|d| d.index() - offset)
                    .collect();
                blocks.push(Mat::from_fn(kept.len(), kept.len(), |a, b| r[(kept[a], kept[b])]));
            }
        }
        Ok(math::block_diagonal(&blocks))
    }

    /// `R^T K R` over the kept DOFs
    pub fn structure_oriented_stiffness(&self, rtol: f64) -> StiffnessResult<Mat> {
        let r = self.rotation_matrix()?;
        let k = self.member_oriented_stiffness(rtol)?;
        Ok(r.transpose() * k * r)
    }

    /// Sum of fixed-end reactions of every attached load, before releases
    pub fn fixed_end_reactions(&self) -> Vec12 {
        fn total<A: FixedEndActions>(loads: &[MemberLoad<A>]) -> Vec12 {
            loads.iter().map(|l| l.fixed_end_reactions()).sum()
        }
        total(&self.forces) + total(&self.moments) + total(&self.distributed)
    }

    /// Fixed-end reactions of every attached load, corrected for releases
    pub fn condensed_reactions(&self, rtol: f64) -> StiffnessResult<Vec12> {
        fn total<A: FixedEndActions>(loads: &[MemberLoad<A>], rtol: f64) -> StiffnessResult<Vec12> {
            let mut sum = Vec12::zeros();
            for load in loads {
                sum += load.condensed_reactions(rtol)?;
            }
            Ok(sum)
        }
        Ok(total(&self.forces, rtol)? + total(&self.moments, rtol)? + total(&self.distributed, rtol)?)
    }

    /// Equivalent joint loads of all member loads, local axes
    pub fn member_oriented_equivalent_joint_loads(&self, rtol: f64) -> StiffnessResult<EndActions> {
        Ok(-EndActions::from_vector(&self.condensed_reactions(rtol)?))
    }

    /// Equivalent joint loads over the kept DOFs, in the end nodes' frames
    pub fn structure_oriented_equivalent_joint_loads(&self, rtol: f64) -> StiffnessResult<Vector> {
        let loads = self.member_oriented_equivalent_joint_loads(rtol)?.to_vector();
        let kept = self.kept_indices();
        let local = Vector::from_iterator(kept.len(), kept.iter().map(|&i| loads[i]));
        Ok(self.rotation_matrix()?.transpose() * local)
    }

    /// Node displacements of both ends restricted to the kept DOFs
    fn kept_displacements(&self, d_i: &[f64; 6], d_j: &[f64; 6]) -> Vector {
        let values = self
            .releases
            .i_node
            .kept()
            .map(|d| d_i[d.index()])
            .chain(self.releases.j_node.kept().map(|d| d_j[d.index()]));
        Vector::from_iterator(self.releases.kept_count(), values)
    }

    /// Loads that hold the end nodes at the given displacements (node frames)
    pub fn displacements_equivalent_joint_loads(
        &self,
        d_i: &[f64; 6],
        d_j: &[f64; 6],
        rtol: f64,
    ) -> StiffnessResult<Vector> {
        let k = self.structure_oriented_stiffness(rtol)?;
        Ok(-(k * self.kept_displacements(d_i, d_j)))
    }

    /// Local end actions and end displacements from the final nodal
    /// displacements (node frames) of both ends
    pub(crate) fn recover_end_actions(
        &mut self,
        d_i: &[f64; 6],
        d_j: &[f64; 6],
        rtol: f64,
        sample_points: usize,
    ) -> StiffnessResult<()> {
        let released = self.releases.merged();
        let (kept, rel) = math::partition(&released);

        let d_local = self.rotation_matrix()? * self.kept_displacements(d_i, d_j);
        let k = self.local_stiffness()?;
        let k_cond = math::condense_stiffness(&k, &released, rtol)?;
        let forces = k_cond * &d_local;
        let condensed = self.condensed_reactions(rtol)?;

        let mut actions = Vec12::zeros();
        let mut displacements = Vec12::zeros();
        for (n, &i) in kept.iter().enumerate() {
            actions[i] = forces[n] + condensed[i];
            displacements[i] = d_local[n];
        }

        // released end displacements follow from zero action there
        if !rel.is_empty() {
            let raw = self.fixed_end_reactions();
            let k_rr_pinv = math::pseudo_inverse(&math::submatrix(&k, &rel, &rel), rtol)?;
            let rhs = math::submatrix(&k, &rel, &kept) * &d_local
                + Vector::from_iterator(rel.len(), rel.iter().map(|&i| raw[i]));
            let d_rel = -(k_rr_pinv * rhs);
            for (n, &i) in rel.iter().enumerate() {
                displacements[i] = d_rel[n];
            }
        }

        self.solution = Some(MemberSolution {
            end_actions: EndActions::from_vector(&actions),
            local_displacements: displacements,
            sample_points,
        });
        Ok(())
    }

    pub fn is_solved(&self) -> bool {
        self.solution.is_some()
    }

    pub(crate) fn solution(&self) -> StiffnessResult<&MemberSolution> {
        self.solution.as_ref().ok_or(StiffnessError::NotSolved)
    }

    /// Forces and moments the end nodes exert on the member, local axes
    pub fn end_actions(&self) -> StiffnessResult<EndActions> {
        Ok(self.solution()?.end_actions)
    }

    /// End displacements in local axes, including those at released DOFs
    pub fn local_displacements(&self) -> StiffnessResult<Vec12> {
        Ok(self.solution()?.local_displacements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::Dof;
    use approx::assert_abs_diff_eq;

    fn attached(i: Node, j: Node, releases: MemberReleases) -> Member {
        let mut m = Member::new(NodeId(1), NodeId(2), Section::planar(1.0, 1.0).with_material(
            crate::elements::Material::new(1.0, 0.25),
        ))
        .with_releases(releases);
        m.attach(&i, &j).unwrap();
        m
    }

    #[test]
    fn test_member_geometry() {
        let m = attached(Node::planar(0.0, 0.0), Node::planar(6.0, 8.0), MemberReleases::none());
        assert_abs_diff_eq!(m.length().unwrap(), 10.0, epsilon = 1e-12);
        assert_abs_diff_eq!(m.direction().unwrap(), Vec3::new(0.6, 0.8, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_loads_need_structure() {
        let mut m = Member::new(NodeId(1), NodeId(2), Section::planar(1.0, 1.0));
        assert!(matches!(m.add_force(1.0, Force::transverse(1.0)), Err(StiffnessError::InvalidGeometry(_))));
    }

    #[test]
    fn test_coincident_nodes_rejected() {
        let mut m = Member::new(NodeId(1), NodeId(2), Section::planar(1.0, 1.0));
        let n = Node::planar(1.0, 1.0);
        assert!(matches!(m.attach(&n, &n), Err(StiffnessError::InvalidGeometry(_))));
    }

    #[test]
    fn test_truss_rotation_and_global_stiffness() {
        let m = attached(Node::planar(0.0, 0.0), Node::planar(6.0, 8.0), MemberReleases::truss_2d());
        let r = m.rotation_matrix().unwrap();
        #[rustfmt::skip]
        let expected_r = Mat::from_row_slice(4, 4, &[
            0.6,  0.8, 0.0,  0.0,
            -0.8, 0.6, 0.0,  0.0,
            0.0,  0.0, 0.6,  0.8,
            0.0,  0.0, -0.8, 0.6,
        ]);
        assert_abs_diff_eq!(r, expected_r, epsilon = 1e-12);

        // EA/L * [c^2 cs; cs s^2] blocks
        let k = m.structure_oriented_stiffness(1e-12).unwrap();
        assert_abs_diff_eq!(k[(0, 0)], 0.036, epsilon = 1e-12);
        assert_abs_diff_eq!(k[(0, 1)], 0.048, epsilon = 1e-12);
        assert_abs_diff_eq!(k[(1, 1)], 0.064, epsilon = 1e-12);
        assert_abs_diff_eq!(k[(0, 3)], -0.048, epsilon = 1e-12);
    }

    #[test]
    fn test_node_angle_enters_rotation() {
        let j = Node::planar(4.0, 0.0).with_angle([0.0, 0.0, std::f64::consts::FRAC_PI_4]);
        let m = attached(Node::planar(0.0, 0.0), j, MemberReleases::truss_2d());
        let r = m.rotation_matrix().unwrap();
        let h = std::f64::consts::FRAC_1_SQRT_2;
        assert_abs_diff_eq!(r[(2, 2)], h, epsilon = 1e-12);
        assert_abs_diff_eq!(r[(2, 3)], -h, epsilon = 1e-12);
        assert_abs_diff_eq!(r[(3, 2)], h, epsilon = 1e-12);
        assert_abs_diff_eq!(r[(0, 0)], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_loads_combine_in_insertion_order() {
        let mut m = attached(Node::on_line(0.0), Node::on_line(10.0), MemberReleases::beam_2d());
        m.add_force(5.0, Force::transverse(-8.0)).unwrap();
        m.add_distributed(0.0, DistributedForce::uniform(Force::transverse(-1.2), 10.0).unwrap())
            .unwrap();
        assert!(m.add_force(-1.0, Force::transverse(1.0)).is_err());
        assert_eq!(m.forces().len(), 1);
        assert_eq!(m.distributed_loads().len(), 1);

        let ends = m.member_oriented_equivalent_joint_loads(1e-12).unwrap();
        assert_abs_diff_eq!(ends.force_i.y(), -10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(ends.moment_i.z(), -20.0, epsilon = 1e-9);
        assert_abs_diff_eq!(ends.moment_j.z(), 20.0, epsilon = 1e-9);
    }

    #[test]
    fn test_settlement_loads() {
        let m = attached(Node::on_line(0.0), Node::on_line(10.0), MemberReleases::beam_2d());
        let mut d_j = [0.0; 6];
        d_j[Dof::Dy.index()] = -0.1;
        let p = m.displacements_equivalent_joint_loads(&[0.0; 6], &d_j, 1e-12).unwrap();
        // 12EI/L^3 and 6EI/L^2 times the settlement
        assert_abs_diff_eq!(p[0], -0.0012, epsilon = 1e-12);
        assert_abs_diff_eq!(p[1], -0.006, epsilon = 1e-12);
        assert_abs_diff_eq!(p[2], 0.0012, epsilon = 1e-12);
        assert_abs_diff_eq!(p[3], -0.006, epsilon = 1e-12);
    }

    #[test]
    fn test_end_actions_need_solve() {
        let m = attached(Node::on_line(0.0), Node::on_line(1.0), MemberReleases::none());
        assert_eq!(m.end_actions(), Err(StiffnessError::NotSolved));
    }
}
