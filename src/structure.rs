//! Structure - the node/member container that assembles and solves

use std::collections::BTreeMap;

use log::{debug, info, trace, warn};

use crate::analysis::{self, AnalysisOptions};
use crate::elements::{Dof, DofMask, Member, MemberId, Node, NodeId, NodeSolution};
use crate::error::{StiffnessError, StiffnessResult};
use crate::loads::{DistributedForce, Force, Moment};
use crate::math::{self, Mat, Vec3, Vector};
use crate::results::{AnalysisSummary, MemberForces, NodeDisplacement, Reactions};

/// Global numbering of the degrees of freedom left after node releases.
///
/// Each active node owns a contiguous block, in `NodeId` order, holding
/// its non-released degrees in `Dof` order.
#[derive(Debug, Clone, Default)]
struct DofMap {
    blocks: BTreeMap<NodeId, (usize, DofMask)>,
    dofs: Vec<(NodeId, Dof)>,
}

impl DofMap {
    fn new(releases: &BTreeMap<NodeId, DofMask>) -> Self {
        let mut map = Self::default();
        for (&id, &mask) in releases {
            map.blocks.insert(id, (map.dofs.len(), mask));
            map.dofs.extend(mask.kept().map(|d| (id, d)));
        }
        map
    }

    fn len(&self) -> usize {
        self.dofs.len()
    }

    fn index(&self, node: NodeId, dof: Dof) -> Option<usize> {
        let &(start, released) = self.blocks.get(&node)?;
        (!released.contains(dof)).then(|| start + released.kept_offset(dof))
    }

    /// Global indices of a member's kept DOFs, i-end then j-end
    fn member_indices(&self, member: &Member) -> StiffnessResult<Vec<usize>> {
        let releases = member.releases();
        let ends = [
            (member.i_node(), releases.i_node),
            (member.j_node(), releases.j_node),
        ];
        let mut indices = Vec::with_capacity(releases.kept_count());
        for (node, released) in ends {
            for dof in released.kept() {
                indices.push(self.index(node, dof).ok_or(StiffnessError::NodeNotFound(node))?);
            }
        }
        Ok(indices)
    }
}

/// Assembled global system, before springs and partitioning
struct Assembly {
    dofs: DofMap,
    stiffness: Mat,
    loads: Vector,
}

#[derive(Debug, Clone)]
struct Solution {
    dofs: DofMap,
    free: Vec<usize>,
    restrained: Vec<usize>,
    loads: Vector,
    displacements: Vector,
    reactions: Vector,
}

/// A structure: nodes joined by members.
///
/// Nodes live in an arena keyed by [`NodeId`]; members refer to them by
/// id and are numbered from 1 in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Structure {
    nodes: BTreeMap<NodeId, Node>,
    members: Vec<Member>,
    solution: Option<Solution>,
}

impl Structure {
    /// Create a new empty structure
    pub fn new() -> Self {
        Self::default()
    }

    // ========================
    // Model Building Methods
    // ========================

    /// Add a node under the next free id
    pub fn add_node(&mut self, mut node: Node) -> NodeId {
        let id = NodeId(self.nodes.keys().next_back().map_or(1, |last| last.0 + 1));
        node.id = Some(id);
        self.nodes.insert(id, node);
        self.invalidate();
        id
    }

    /// Add a node under a chosen id
    pub fn add_node_with_id(&mut self, id: NodeId, mut node: Node) -> StiffnessResult<NodeId> {
        if self.nodes.contains_key(&id) {
            return Err(StiffnessError::DuplicateNode(id));
        }
        node.id = Some(id);
        self.nodes.insert(id, node);
        self.invalidate();
        Ok(id)
    }

    /// Add a member between two nodes already in the structure
    pub fn add_member(&mut self, mut member: Member) -> StiffnessResult<MemberId> {
        let i = self.node(member.i_node())?;
        let j = self.node(member.j_node())?;
        member.attach(i, j)?;
        self.members.push(member);
        self.invalidate();
        Ok(MemberId(self.members.len()))
    }

    /// Apply a concentrated force in member axes
    pub fn add_member_force(&mut self, id: MemberId, position: f64, force: Force) -> StiffnessResult<()> {
        self.member_mut(id)?.add_force(position, force)
    }

    /// Apply a concentrated moment in member axes
    pub fn add_member_moment(&mut self, id: MemberId, position: f64, moment: Moment) -> StiffnessResult<()> {
        self.member_mut(id)?.add_moment(position, moment)
    }

    /// Apply a line load in member axes
    pub fn add_member_distributed(
        &mut self,
        id: MemberId,
        position: f64,
        load: DistributedForce,
    ) -> StiffnessResult<()> {
        self.member_mut(id)?.add_distributed(position, load)
    }

    /// Load every member with its own weight, acting along the global
    /// `direction` (normalised). Members of weightless material are skipped.
    pub fn add_self_weight(&mut self, direction: [f64; 3]) -> StiffnessResult<()> {
        let direction = Vec3::from(direction);
        let norm = direction.norm();
        if !norm.is_finite() || norm == 0.0 {
            return Err(StiffnessError::InvalidInput(format!(
                "self weight direction {:?} must be a non-zero vector",
                direction.as_slice()
            )));
        }
        let direction = direction / norm;

        self.invalidate();
        for member in &mut self.members {
            let w = member.section().weight_per_length();
            if w == 0.0 {
                continue;
            }
            let local = member.axis_rotation()? * direction * w;
            let load = DistributedForce::uniform(Force::from_vector(local), member.length()?)?;
            member.add_distributed(0.0, load)?;
        }
        Ok(())
    }

    pub fn node(&self, id: NodeId) -> StiffnessResult<&Node> {
        self.nodes.get(&id).ok_or(StiffnessError::NodeNotFound(id))
    }

    /// Mutable access to a node; clears any previous solution
    pub fn node_mut(&mut self, id: NodeId) -> StiffnessResult<&mut Node> {
        if !self.nodes.contains_key(&id) {
            return Err(StiffnessError::NodeNotFound(id));
        }
        self.invalidate();
        self.nodes.get_mut(&id).ok_or(StiffnessError::NodeNotFound(id))
    }

    pub fn member(&self, id: MemberId) -> StiffnessResult<&Member> {
        id.0.checked_sub(1)
            .and_then(|i| self.members.get(i))
            .ok_or(StiffnessError::MemberNotFound(id))
    }

    /// Mutable access to a member; clears any previous solution
    pub fn member_mut(&mut self, id: MemberId) -> StiffnessResult<&mut Member> {
        self.member(id)?;
        self.invalidate();
        id.0.checked_sub(1)
            .and_then(|i| self.members.get_mut(i))
            .ok_or(StiffnessError::MemberNotFound(id))
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().map(|(&id, n)| (id, n))
    }

    pub fn members(&self) -> impl Iterator<Item = (MemberId, &Member)> {
        self.members.iter().enumerate().map(|(i, m)| (MemberId(i + 1), m))
    }

    fn invalidate(&mut self) {
        self.solution = None;
        for node in self.nodes.values_mut() {
            node.solution = None;
        }
        for member in &mut self.members {
            member.solution = None;
        }
    }

    // ========================
    // Assembly
    // ========================

    /// Node-wide releases: a degree is released at a node only when every
    /// member end attached there releases it
    fn node_releases(&self) -> BTreeMap<NodeId, DofMask> {
        let mut releases: BTreeMap<NodeId, DofMask> = BTreeMap::new();
        for member in &self.members {
            let r = member.releases();
            for (node, mask) in [(member.i_node(), r.i_node), (member.j_node(), r.j_node)] {
                releases
                    .entry(node)
                    .and_modify(|m| *m = m.intersection(mask))
                    .or_insert(mask);
            }
        }
        releases
    }

    /// Store node-wide releases on every node. Nodes no member touches are
    /// released entirely.
    pub fn resolve_node_releases(&mut self) {
        let resolved = self.node_releases();
        for (id, node) in &mut self.nodes {
            node.id = Some(*id);
            node.releases = match resolved.get(id) {
                Some(&mask) => mask,
                None => {
                    warn!("node {id} is not connected to any member; skipped");
                    DofMask::all()
                }
            };
        }
    }

    /// Prescribed displacements a node is held at: restrained degrees only
    fn held_displacements(&self, id: NodeId) -> StiffnessResult<[f64; 6]> {
        let node = self.node(id)?;
        let prescribed = node.prescribed_displacements();
        let restraints = node.restraints();
        Ok(Dof::ALL.map(|d| {
            if restraints.contains(d) {
                prescribed[d.index()]
            } else {
                0.0
            }
        }))
    }

    /// Recompute member geometry from the current nodes
    fn attach_members(nodes: &BTreeMap<NodeId, Node>, members: &mut [Member]) -> StiffnessResult<()> {
        for member in members {
            let i = nodes.get(&member.i_node()).ok_or(StiffnessError::NodeNotFound(member.i_node()))?;
            let j = nodes.get(&member.j_node()).ok_or(StiffnessError::NodeNotFound(member.j_node()))?;
            member.attach(i, j)?;
        }
        Ok(())
    }

    fn assemble(&self, members: &[Member], options: &AnalysisOptions) -> StiffnessResult<Assembly> {
        if members.is_empty() {
            return Err(StiffnessError::EmptyStructure);
        }

        let dofs = DofMap::new(&self.node_releases());
        let n = dofs.len();
        let rtol = options.pinv_rtol;
        let mut stiffness = Mat::zeros(n, n);
        let mut loads = Vector::zeros(n);

        for (&id, node) in &self.nodes {
            let applied = node.applied_action();
            for dof in Dof::ALL {
                if let Some(i) = dofs.index(id, dof) {
                    loads[i] += applied[dof.index()];
                }
            }
        }

        for (n, member) in members.iter().enumerate() {
            let id = MemberId(n + 1);
            let indices = dofs.member_indices(member)?;
            let k = member.structure_oriented_stiffness(rtol)?;
            let equivalent = member.structure_oriented_equivalent_joint_loads(rtol)?;
            let held = member.displacements_equivalent_joint_loads(
                &self.held_displacements(member.i_node())?,
                &self.held_displacements(member.j_node())?,
                rtol,
            )?;

            for (a, &ia) in indices.iter().enumerate() {
                loads[ia] += equivalent[a] + held[a];
                for (b, &ib) in indices.iter().enumerate() {
                    stiffness[(ia, ib)] += k[(a, b)];
                }
            }
            debug!(
                "member {id} ({} -> {}): {} DOFs scattered",
                member.i_node(),
                member.j_node(),
                indices.len()
            );
        }

        debug!("assembled {n}x{n} global system");
        trace!("global stiffness:{stiffness}");
        trace!("global loads:{loads}");
        Ok(Assembly {
            dofs,
            stiffness,
            loads,
        })
    }

    /// Global stiffness over the non-released DOFs, springs excluded.
    /// Rows follow node order, then `Dof` order within each node.
    pub fn stiffness_matrix(&self) -> StiffnessResult<Mat> {
        let mut members = self.members.clone();
        Self::attach_members(&self.nodes, &mut members)?;
        Ok(self.assemble(&members, &AnalysisOptions::default())?.stiffness)
    }

    // ========================
    // Analysis
    // ========================

    /// Solve with default options
    pub fn solve(&mut self) -> StiffnessResult<()> {
        self.solve_with(&AnalysisOptions::default())
    }

    /// Linear static solve. Node and member inputs are left untouched, so
    /// solving again gives the same results.
    pub fn solve_with(&mut self, options: &AnalysisOptions) -> StiffnessResult<()> {
        options.validate()?;
        if self.members.is_empty() {
            return Err(StiffnessError::EmptyStructure);
        }
        self.invalidate();
        self.resolve_node_releases();

        Self::attach_members(&self.nodes, &mut self.members)?;

        let Assembly {
            dofs,
            mut stiffness,
            loads,
        } = self.assemble(&self.members, options)?;

        let mut free = Vec::new();
        let mut restrained = Vec::new();
        for (i, &(id, dof)) in dofs.dofs.iter().enumerate() {
            let node = self.node(id)?;
            if node.restraints().contains(dof) {
                restrained.push(i);
                continue;
            }
            let k = node.elastic_constants()[dof.index()];
            if !k.is_finite() || k < 0.0 {
                return Err(StiffnessError::InvalidInput(format!(
                    "elastic constant {k} at {id} {dof} must be finite and non-negative"
                )));
            }
            stiffness[(i, i)] += k;
            free.push(i);
        }

        info!(
            "solving {} nodes, {} members: {} DOFs ({} free, {} restrained)",
            dofs.blocks.len(),
            self.members.len(),
            dofs.len(),
            free.len(),
            restrained.len()
        );

        let k_ff = math::select(&stiffness, &free, &free);
        let p_f = math::select_entries(&loads, &free);
        let displacements = math::solve_dense(&k_ff, &p_f, options.singular_tolerance)?;
        let k_rf = math::select(&stiffness, &restrained, &free);
        let reactions = k_rf * &displacements - math::select_entries(&loads, &restrained);

        // redistribute to nodes
        let mut solved: BTreeMap<NodeId, NodeSolution> = BTreeMap::new();
        for (n, &i) in free.iter().enumerate() {
            let (id, dof) = dofs.dofs[i];
            let k = self.node(id)?.elastic_constants()[dof.index()];
            let entry = solved.entry(id).or_default();
            entry.displacements[dof.index()] = displacements[n];
            entry.elastic_reactions[dof.index()] = -displacements[n] * k;
        }
        for (n, &i) in restrained.iter().enumerate() {
            let (id, dof) = dofs.dofs[i];
            solved.entry(id).or_default().reactions[dof.index()] = reactions[n];
        }
        for (id, node) in &mut self.nodes {
            node.solution = Some(solved.remove(id).unwrap_or_default());
        }

        // member end actions from the final node displacements
        let nodes = &self.nodes;
        for member in &mut self.members {
            let d_i = nodes.get(&member.i_node()).ok_or(StiffnessError::NodeNotFound(member.i_node()))?;
            let d_j = nodes.get(&member.j_node()).ok_or(StiffnessError::NodeNotFound(member.j_node()))?;
            member.recover_end_actions(
                &d_i.displacements()?,
                &d_j.displacements()?,
                options.pinv_rtol,
                options.sample_points,
            )?;
        }

        self.solution = Some(Solution {
            dofs,
            free,
            restrained,
            loads,
            displacements,
            reactions,
        });

        if options.check_statics {
            let residual = analysis::equilibrium_residual(self)?;
            if residual.within(options.statics_tolerance) {
                debug!("equilibrium residual {:.3e}", residual.relative());
            } else {
                warn!(
                    "equilibrium residual {:.3e} exceeds {:.3e} (force {:?}, moment {:?})",
                    residual.relative(),
                    options.statics_tolerance,
                    residual.force.as_slice(),
                    residual.moment.as_slice()
                );
            }
        }

        info!("solve complete");
        Ok(())
    }

    // ========================
    // Result Access Methods
    // ========================

    pub fn is_solved(&self) -> bool {
        self.solution.is_some()
    }

    fn solved(&self) -> StiffnessResult<&Solution> {
        self.solution.as_ref().ok_or(StiffnessError::NotSolved)
    }

    /// Final displacements of every node taking part in the analysis
    pub fn displacements(&self) -> StiffnessResult<BTreeMap<NodeId, NodeDisplacement>> {
        let solution = self.solved()?;
        solution
            .dofs
            .blocks
            .keys()
            .map(|&id| -> StiffnessResult<_> {
                Ok((id, NodeDisplacement::from_array(self.node(id)?.displacements()?)))
            })
            .collect()
    }

    /// Support reactions of every restrained node, node frames
    pub fn reactions(&self) -> StiffnessResult<BTreeMap<NodeId, Reactions>> {
        self.solved()?;
        self.nodes
            .iter()
            .filter(|(_, n)| !n.restraints().is_empty())
            .map(|(&id, n)| -> StiffnessResult<_> { Ok((id, Reactions::from_array(n.reactions()?))) })
            .collect()
    }

    /// Spring forces of every elastically supported node, node frames
    pub fn elastic_reactions(&self) -> StiffnessResult<BTreeMap<NodeId, Reactions>> {
        self.solved()?;
        self.nodes
            .iter()
            .filter(|(_, n)| n.elastic_constants().iter().any(|&k| k != 0.0))
            .map(|(&id, n)| -> StiffnessResult<_> {
                Ok((id, Reactions::from_array(n.elastic_reactions()?)))
            })
            .collect()
    }

    /// Solved displacements in `free_dofs()` order
    pub fn free_displacements(&self) -> StiffnessResult<&Vector> {
        Ok(&self.solved()?.displacements)
    }

    /// Reactions in `restrained_dofs()` order
    pub fn restrained_reactions(&self) -> StiffnessResult<&Vector> {
        Ok(&self.solved()?.reactions)
    }

    /// Assembled load vector (nodal loads, equivalent joint loads and
    /// prescribed displacement effects) in `stiffness_matrix()` order
    pub fn load_vector(&self) -> StiffnessResult<&Vector> {
        Ok(&self.solved()?.loads)
    }

    pub fn free_dofs(&self) -> StiffnessResult<Vec<(NodeId, Dof)>> {
        let solution = self.solved()?;
        Ok(solution.free.iter().map(|&i| solution.dofs.dofs[i]).collect())
    }

    pub fn restrained_dofs(&self) -> StiffnessResult<Vec<(NodeId, Dof)>> {
        let solution = self.solved()?;
        Ok(solution.restrained.iter().map(|&i| solution.dofs.dofs[i]).collect())
    }

    /// Get analysis summary
    pub fn summary(&self) -> StiffnessResult<AnalysisSummary> {
        let solution = self.solved()?;
        let mut summary = AnalysisSummary {
            num_nodes: solution.dofs.blocks.len(),
            num_members: self.members.len(),
            total_dofs: solution.dofs.len(),
            free_dofs: solution.free.len(),
            restrained_dofs: solution.restrained.len(),
            ..Default::default()
        };

        for (id, d) in self.displacements()? {
            let mag = d.translation_magnitude();
            if summary.max_disp_node.is_none() || mag > summary.max_displacement {
                summary.max_displacement = mag;
                summary.max_disp_node = Some(id);
            }
        }

        let reactions = self.reactions()?;
        for (&id, r) in &reactions {
            let mag = r.force_magnitude();
            if summary.max_reaction_node.is_none() || mag > summary.max_reaction {
                summary.max_reaction = mag;
                summary.max_reaction_node = Some(id);
            }
        }
        summary.total_reaction = Reactions::sum_forces(reactions.values());

        for (id, member) in self.members() {
            let ends = member.end_actions()?;
            let (i, j) = (MemberForces::at_i(&ends), MemberForces::at_j(&ends));
            let axial = i.axial.abs().max(j.axial.abs());
            if summary.max_axial_member.is_none() || axial > summary.max_axial {
                summary.max_axial = axial;
                summary.max_axial_member = Some(id);
            }
            let moment = i.max_moment().max(j.max_moment());
            if summary.max_moment_member.is_none() || moment > summary.max_moment {
                summary.max_moment = moment;
                summary.max_moment_member = Some(id);
            }
        }

        Ok(summary)
    }
}
