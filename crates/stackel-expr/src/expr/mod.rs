//! Expression types for bilevel model building.
//!
//! - `core`: Expr, linear and quadratic terms + constant
//! - `constraint`: ConstraintExpr, an expression with comparison sense and RHS

pub mod constraint;
pub mod core;

pub use constraint::{ComparisonSense, ConstraintExpr};
pub use core::Expr;
