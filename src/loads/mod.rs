//! Loads: point and distributed actions and their equivalent joint loads

mod action;
mod distributed;
mod member_load;
mod point_load;

pub use action::{EndActions, Force, Moment};
pub use distributed::DistributedForce;
pub use member_load::{FixedEndActions, LoadContext, MemberLoad};
