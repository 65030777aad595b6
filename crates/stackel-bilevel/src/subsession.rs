//! Scoped sub-solver invocation.

use tracing::debug;

use stackel_core::Model;
use stackel_solver::{
    SolveOptions, SolverError, SolverRegistry, SubsolveRequest, SubsolverLease, SubsolverResult,
};

/// A leased sub-solver bound to one solve's options.
///
/// Opening acquires the backend from the registry; the lease guarantees the
/// backend is released whether the session closes normally or unwinds
/// through an error.
pub struct SubsolverSession {
    lease: SubsolverLease,
    request: SubsolveRequest,
    name: String,
}

impl SubsolverSession {
    /// Acquire the backend named in `options` from the registry.
    pub fn open(
        registry: &SolverRegistry,
        options: &SolveOptions,
    ) -> Result<Self, SolverError> {
        let lease = registry.acquire(&options.solver)?;
        // Reformulated-model names are solver-internal, so the sub-solve
        // always runs unlabeled; intermediate files are never kept.
        let request = SubsolveRequest {
            tee: options.tee,
            time_limit: options.time_limit,
            symbolic_labels: false,
            keep_files: false,
        };
        Ok(Self {
            lease,
            request,
            name: options.solver.clone(),
        })
    }

    /// Name the backend was registered under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invoke the backend on the model's effective view.
    ///
    /// Returns one result per invocation; the reconciler aggregates across
    /// them.
    pub fn solve(&mut self, model: &Model) -> Result<Vec<SubsolverResult>, SolverError> {
        debug!(
            component = "subsession",
            operation = "solve",
            solver = %self.name,
            tee = self.request.tee,
            "Invoking sub-solver"
        );
        let result = self.lease.solver().solve(model, &self.request)?;
        debug!(
            component = "subsession",
            operation = "solve",
            status = "success",
            solver = %self.name,
            termination = %result.status,
            "Sub-solver returned"
        );
        Ok(vec![result])
    }

    /// Release the backend now instead of at end of scope.
    pub fn close(self) {
        self.lease.release();
    }
}
