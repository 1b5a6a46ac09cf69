//! Loads bound to a member span
//!
//! A [`MemberLoad`] carries everything needed to resolve it into
//! equivalent joint loads: where it sits, how long the member is, the
//! member's section and its end releases. The member rebinds its loads
//! whenever its geometry is recomputed.

use serde::{Deserialize, Serialize};

use crate::elements::{MemberReleases, Section};
use crate::error::{StiffnessError, StiffnessResult};
use crate::math::{self, Mat12, Vec12};

use super::EndActions;

/// Relative slack allowed when a load ends exactly at the member end
const POSITION_TOLERANCE: f64 = 1e-9;

/// A load type that knows its fixed-end reactions.
///
/// Reactions are what a member clamped at both ends exerts on its nodes'
/// side of the connection, in local order `[Fx, Fy, Fz, Mx, My, Mz]` at the
/// i-end then the j-end.
pub trait FixedEndActions {
    fn fixed_end_reactions(&self, position: f64, length: f64) -> Vec12;

    /// How far the load extends past its position
    fn extent(&self) -> f64 {
        0.0
    }
}

/// Member data a load needs to resolve itself
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoadContext {
    pub length: f64,
    pub section: Section,
    pub releases: MemberReleases,
}

impl LoadContext {
    pub fn local_stiffness(&self) -> Mat12 {
        let s = &self.section;
        math::member_local_stiffness(s.material.e, s.material.g, s.a, s.iy, s.iz, s.j, self.length)
    }
}

fn check_position<A: FixedEndActions>(action: &A, position: f64, length: f64) -> StiffnessResult<()> {
    if !position.is_finite() || position < 0.0 {
        return Err(StiffnessError::InvalidInput(format!(
            "load position {position} must be a non-negative distance"
        )));
    }
    let end = position + action.extent();
    if end > length * (1.0 + POSITION_TOLERANCE) {
        return Err(StiffnessError::InvalidInput(format!(
            "load reaching {end} lies beyond member length {length}"
        )));
    }
    Ok(())
}

/// An action placed at `position` (distance from the i-node) on a member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberLoad<A> {
    action: A,
    position: f64,
    context: LoadContext,
}

impl<A: FixedEndActions> MemberLoad<A> {
    /// Bind `action` to a member, rejecting positions outside the member
    pub fn new(action: A, position: f64, context: LoadContext) -> StiffnessResult<Self> {
        check_position(&action, position, context.length)?;
        Ok(Self {
            action,
            position,
            context,
        })
    }

    pub fn action(&self) -> &A {
        &self.action
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn context(&self) -> &LoadContext {
        &self.context
    }

    /// Reactions of the fully fixed member, before any release is applied
    pub fn fixed_end_reactions(&self) -> Vec12 {
        self.action.fixed_end_reactions(self.position, self.context.length)
    }

    /// Fixed-end reactions corrected for the member's end releases.
    /// Released entries come back zero.
    pub fn condensed_reactions(&self, rtol: f64) -> StiffnessResult<Vec12> {
        let released = self.context.releases.merged();
        math::condense_reactions(
            &self.fixed_end_reactions(),
            &self.context.local_stiffness(),
            &released,
            rtol,
        )
    }

    /// Loads to apply at the member ends in place of this span load
    pub fn equivalent_joint_loads(&self, rtol: f64) -> StiffnessResult<EndActions> {
        Ok(-EndActions::from_vector(&self.condensed_reactions(rtol)?))
    }
}

impl<A: FixedEndActions + Clone> MemberLoad<A> {
    /// The same load on a member with new geometry; the position is
    /// checked again against the new length
    pub(crate) fn rebound(&self, context: LoadContext) -> StiffnessResult<Self> {
        Self::new(self.action.clone(), self.position, context)
    }
}
