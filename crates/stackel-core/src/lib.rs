//! Stackel core model with block-structured components.
//!
//! A bilevel model is an ordinary model plus one block in the
//! [`BlockRole::LowerLevel`] role. Transformation stages rewrite the model in
//! place; activation flags (never deletion) control which components any
//! later consumer sees.

pub mod model;
pub mod types;

pub use model::{
    Block, BlockRole, Complementarity, ComponentRef, Disjunction, IndexSet, Model, ModelError,
    ProblemStatistics,
};
pub use types::{Bounds, Constraint, Objective, Sense, Variable};
