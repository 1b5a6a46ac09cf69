//! Typed degrees of freedom and release/restraint masks

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the six generalized displacement components at a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Dof {
    Dx,
    Dy,
    Dz,
    Rx,
    Ry,
    Rz,
}

impl Dof {
    pub const ALL: [Dof; 6] = [Dof::Dx, Dof::Dy, Dof::Dz, Dof::Rx, Dof::Ry, Dof::Rz];

    /// Position of this degree in a 6-component node vector
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Dof> {
        Self::ALL.get(index).copied()
    }

    pub fn is_rotation(self) -> bool {
        self.index() >= 3
    }
}

impl fmt::Display for Dof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dof::Dx => "DX",
            Dof::Dy => "DY",
            Dof::Dz => "DZ",
            Dof::Rx => "RX",
            Dof::Ry => "RY",
            Dof::Rz => "RZ",
        };
        f.write_str(name)
    }
}

/// Set of degrees of freedom at one node, stored as a bitset.
///
/// Used for restraints (set = supported) and releases (set = disconnected).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct DofMask(u8);

impl DofMask {
    const FULL: u8 = 0b11_1111;

    /// Empty set
    pub const fn none() -> Self {
        Self(0)
    }

    /// All six degrees
    pub const fn all() -> Self {
        Self(Self::FULL)
    }

    pub fn of(dofs: &[Dof]) -> Self {
        dofs.iter().fold(Self::none(), |m, &d| m.with(d))
    }

    /// Build from `[DX, DY, DZ, RX, RY, RZ]` flags
    pub fn from_flags(flags: [bool; 6]) -> Self {
        Dof::ALL
            .iter()
            .zip(flags)
            .filter(|(_, set)| *set)
            .fold(Self::none(), |m, (&d, _)| m.with(d))
    }

    pub fn translations() -> Self {
        Self::of(&[Dof::Dx, Dof::Dy, Dof::Dz])
    }

    pub fn rotations() -> Self {
        Self::of(&[Dof::Rx, Dof::Ry, Dof::Rz])
    }

    pub fn flags(self) -> [bool; 6] {
        Dof::ALL.map(|d| self.contains(d))
    }

    pub fn contains(self, dof: Dof) -> bool {
        self.0 & (1 << dof.index()) != 0
    }

    pub fn with(mut self, dof: Dof) -> Self {
        self.insert(dof);
        self
    }

    pub fn insert(&mut self, dof: Dof) {
        self.0 |= 1 << dof.index();
    }

    pub fn remove(&mut self, dof: Dof) {
        self.0 &= !(1 << dof.index());
    }

    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    pub fn complement(self) -> Self {
        Self(!self.0 & Self::FULL)
    }

    pub fn count(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Degrees in the set, in `Dof::ALL` order
    pub fn released(self) -> impl Iterator<Item = Dof> {
        Dof::ALL.into_iter().filter(move |&d| self.contains(d))
    }

    /// Degrees not in the set, in `Dof::ALL` order
    pub fn kept(self) -> impl Iterator<Item = Dof> {
        self.complement().released()
    }

    /// Number of kept degrees before `dof`, i.e. its offset inside a
    /// compacted block of kept degrees
    pub fn kept_offset(self, dof: Dof) -> usize {
        self.kept().take_while(|&d| d < dof).count()
    }
}

impl From<[bool; 6]> for DofMask {
    fn from(flags: [bool; 6]) -> Self {
        Self::from_flags(flags)
    }
}

impl fmt::Display for DofMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.released().map(|d| d.to_string()).collect();
        write!(f, "[{}]", names.join(", "))
    }
}

/// Per-member end releases (true = released / hinged at that member end)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MemberReleases {
    pub i_node: DofMask,
    pub j_node: DofMask,
}

impl MemberReleases {
    /// No releases (fully fixed connection)
    pub fn none() -> Self {
        Self::default()
    }

    pub fn new(i_node: DofMask, j_node: DofMask) -> Self {
        Self { i_node, j_node }
    }

    /// Same release pattern at both ends
    pub fn both(mask: DofMask) -> Self {
        Self::new(mask, mask)
    }

    /// Pin at i-node (moment release about local y and z)
    pub fn pin_i() -> Self {
        Self::new(DofMask::of(&[Dof::Ry, Dof::Rz]), DofMask::none())
    }

    /// Pin at j-node (moment release about local y and z)
    pub fn pin_j() -> Self {
        Self::new(DofMask::none(), DofMask::of(&[Dof::Ry, Dof::Rz]))
    }

    /// Pins at both ends
    pub fn pin_both() -> Self {
        Self::both(DofMask::of(&[Dof::Ry, Dof::Rz]))
    }

    /// Planar beam: only DY and RZ connect
    pub fn beam_2d() -> Self {
        Self::both(DofMask::of(&[Dof::Dy, Dof::Rz]).complement())
    }

    /// Planar frame: DX, DY and RZ connect
    pub fn frame_2d() -> Self {
        Self::both(DofMask::of(&[Dof::Dz, Dof::Rx, Dof::Ry]))
    }

    /// Planar truss bar: DX and DY connect
    pub fn truss_2d() -> Self {
        Self::both(DofMask::of(&[Dof::Dx, Dof::Dy]).complement())
    }

    /// Space truss bar: translations connect, rotations released
    pub fn truss_3d() -> Self {
        Self::both(DofMask::rotations())
    }

    /// Axial spring: only DX connects
    pub fn spring() -> Self {
        Self::both(DofMask::of(&[Dof::Dx]).complement())
    }

    /// Merged 12-flag view, i-node flags followed by j-node flags
    pub fn merged(&self) -> [bool; 12] {
        let mut flags = [false; 12];
        flags[..6].copy_from_slice(&self.i_node.flags());
        flags[6..].copy_from_slice(&self.j_node.flags());
        flags
    }

    /// Number of DOFs that stay connected at both ends together
    pub fn kept_count(&self) -> usize {
        12 - self.i_node.count() - self.j_node.count()
    }
}
