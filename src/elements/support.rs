//! Support conditions

use serde::{Deserialize, Serialize};

use super::{Dof, DofMask};

/// Support conditions at a node: restrained degrees and the displacements
/// enforced at some of them
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Support {
    pub restraints: DofMask,
    pub enforced: [Option<f64>; 6],
}

impl Support {
    /// Create a new support with no restraints
    pub fn new() -> Self {
        Self::default()
    }

    /// All DOFs restrained
    pub fn fixed() -> Self {
        Self::with_restraints(DofMask::all())
    }

    /// Translations restrained, rotations free
    pub fn pinned() -> Self {
        Self::with_restraints(DofMask::translations())
    }

    /// X translation restrained only
    pub fn roller_x() -> Self {
        Self::with_restraints(DofMask::of(&[Dof::Dx]))
    }

    /// Y translation restrained only
    pub fn roller_y() -> Self {
        Self::with_restraints(DofMask::of(&[Dof::Dy]))
    }

    /// Z translation restrained only
    pub fn roller_z() -> Self {
        Self::with_restraints(DofMask::of(&[Dof::Dz]))
    }

    pub fn with_restraints(restraints: DofMask) -> Self {
        Self {
            restraints,
            enforced: [None; 6],
        }
    }

    /// Restrain `dof` and hold it at `value`
    pub fn with_enforced(mut self, dof: Dof, value: f64) -> Self {
        self.restraints.insert(dof);
        self.enforced[dof.index()] = Some(value);
        self
    }

    pub fn restrained_dofs(&self) -> Vec<Dof> {
        self.restraints.released().collect()
    }

    pub fn free_dofs(&self) -> Vec<Dof> {
        self.restraints.kept().collect()
    }
}
