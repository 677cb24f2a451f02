//! Constraint types for version matching

pub mod constraint;
mod constraint_interface;
mod match_all;
mod multi_constraint;
mod operator;

pub use constraint::Constraint;
pub use constraint_interface::ConstraintInterface;
pub use match_all::MatchAllConstraint;
pub use multi_constraint::MultiConstraint;
pub use operator::{InvalidOperatorError, Operator};
