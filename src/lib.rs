//! Stiffness Solver - direct stiffness method analysis of framed structures
//!
//! Nodes carry loads, supports and springs; prismatic members join them
//! through a section and may release any of their end degrees of freedom.
//! A [`Structure`](structure::Structure) assembles the global system,
//! solves it, and hands the results back to nodes (displacements,
//! reactions) and members (end actions, internal force diagrams,
//! deflected shape).
//!
//! Covered:
//! - Beams, planar and space frames, trusses and axial spring networks
//! - Concentrated forces and moments and trapezoidal line loads on members
//! - Member end releases, node-wide hinges and rotated node frames
//! - Prescribed support displacements and elastic supports
//!
//! ## Example
//! ```rust
//! use stiffness_solver::prelude::*;
//!
//! let mut structure = Structure::new();
//!
//! let support = Support::with_restraints(DofMask::of(&[Dof::Dy]));
//! let n1 = structure.add_node(Node::on_line(0.0).with_support(support));
//! let n2 = structure.add_node(Node::on_line(10.0).with_support(support));
//!
//! let beam = Member::new(n1, n2, Section::planar(10.0, 100.0))
//!     .with_releases(MemberReleases::beam_2d());
//! let m1 = structure.add_member(beam).unwrap();
//! structure
//!     .add_member_distributed(m1, 0.0, DistributedForce::uniform(Force::transverse(-2.0), 10.0).unwrap())
//!     .unwrap();
//!
//! structure.solve().unwrap();
//!
//! let reactions = structure.reactions().unwrap();
//! assert!((reactions[&n1].fy - 10.0).abs() < 1e-9);
//! let moment = structure.member(m1).unwrap().bending(Plane::Xy).unwrap();
//! assert!((moment.max() - 25.0).abs() < 1e-3);
//! ```

pub mod analysis;
pub mod design;
pub mod elements;
pub mod error;
pub mod loads;
pub mod math;
pub mod results;
pub mod structure;

// Re-export common types
pub mod prelude {
    pub use crate::analysis::AnalysisOptions;
    pub use crate::design::{DesignCheck, DesignMethod};
    pub use crate::elements::{
        Diagram, Dof, DofMask, Material, Member, MemberId, MemberReleases, Node, NodeId, Plane,
        Section, Support,
    };
    pub use crate::error::{StiffnessError, StiffnessResult};
    pub use crate::loads::{DistributedForce, EndActions, Force, Moment};
    pub use crate::results::{AnalysisSummary, MemberForces, NodeDisplacement, Reactions};
    pub use crate::structure::Structure;
}
