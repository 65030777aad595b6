//! The backend trait sub-solvers implement.

use stackel_core::model::Model;

use crate::error::SolverError;
use crate::options::SubsolveRequest;
use crate::result::SubsolverResult;

/// A single-level solver backend.
///
/// Implementations read the model's effective view (activation-aware) and
/// must not mutate it; solution write-back is the caller's job so that one
/// result can be applied to a reconciled model.
pub trait Subsolver {
    /// Registry name of this backend.
    fn name(&self) -> &str;

    /// Solve the effectively active part of `model`.
    ///
    /// Non-optimal terminations (infeasible, unbounded, limits) are returned
    /// as results, not errors.
    fn solve(
        &mut self,
        model: &Model,
        request: &SubsolveRequest,
    ) -> Result<SubsolverResult, SolverError>;

    /// Release any resources held by the backend.
    ///
    /// Called exactly once when the lease is dropped; the default is a no-op
    /// for backends with nothing to tear down.
    fn release(&mut self) {}
}
