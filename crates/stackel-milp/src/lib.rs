//! Built-in mixed-integer linear solver backend.
//!
//! A self-contained backend for the reformulated models the transformation
//! pipeline produces: dense lowering of the effective model view, a
//! two-phase tableau simplex with Bland's rule for the relaxations, and
//! depth-first branch and bound on fractional integer variables.
//!
//! Register it under its name to use it as a sub-solver:
//!
//! ```
//! use stackel_milp::BranchAndBound;
//! use stackel_solver::{Subsolver, SolverRegistry};
//!
//! let mut registry = SolverRegistry::new();
//! registry.register(BranchAndBound::NAME, || {
//!     Box::new(BranchAndBound::new()) as Box<dyn Subsolver>
//! });
//! ```

mod branch;
mod lowering;
mod simplex;
mod solver;

pub use solver::BranchAndBound;
