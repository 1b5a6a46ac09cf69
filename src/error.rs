//! Error types for the stiffness solver

use thiserror::Error;

use crate::elements::{MemberId, NodeId};

/// Main error type for stiffness analysis
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StiffnessError {
    #[error("Node {0} not found in structure")]
    NodeNotFound(NodeId),

    #[error("Member {0} not found in structure")]
    MemberNotFound(MemberId),

    #[error("Node {0} already exists")]
    DuplicateNode(NodeId),

    #[error("Structure has no members")]
    EmptyStructure,

    #[error("Structure is unstable: {0}")]
    Unstable(String),

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Structure not solved - run solve() first")]
    NotSolved,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Math error: {0}")]
    MathError(String),
}

/// Result type for stiffness analysis
pub type StiffnessResult<T> = Result<T, StiffnessError>;
