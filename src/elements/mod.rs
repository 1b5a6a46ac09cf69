//! Structural elements: nodes, members and their properties

mod diagrams;
mod dof;
mod material;
mod member;
mod node;
mod section;
mod support;

pub use diagrams::{Diagram, Plane};
pub use dof::{Dof, DofMask, MemberReleases};
pub use material::Material;
pub use member::{Member, MemberId};
pub use node::{Node, NodeId};
pub(crate) use node::NodeSolution;
pub use section::Section;
pub use support::Support;
