//! Shared sub-solver abstractions for Stackel.
//!
//! This crate provides the types the bilevel session and solver backends
//! share:
//!
//! - [`SolveOptions`]: Caller-facing configuration for one bilevel solve
//! - [`SubsolveRequest`]: Per-invocation flags handed to a backend
//! - [`SolverStatus`]: Common termination statuses across backends
//! - [`SolverError`]: Error types for solver operations
//! - [`SubsolverResult`]: One backend invocation's raw outcome
//! - [`Subsolver`]: Trait for backend implementations
//! - [`SolverRegistry`]: Injectable name-based factory map with scoped leases

mod error;
mod options;
mod registry;
mod result;
mod status;
mod traits;

pub use error::SolverError;
pub use options::{
    SolveOptions, StatusAggregation, SubsolveRequest, DEFAULT_BIG_M, DEFAULT_BIG_M_BILINEAR,
    DEFAULT_SOLVER,
};
pub use registry::{SolverRegistry, SubsolverFactory, SubsolverLease};
pub use result::{SolutionValues, SubsolverResult};
pub use status::SolverStatus;
pub use traits::Subsolver;
