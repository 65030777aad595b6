//! The caller-facing outcome of one bilevel solve.

use stackel_core::ProblemStatistics;
use stackel_solver::SolverStatus;

/// Summary of one completed solve session.
#[derive(Debug, Clone)]
pub struct SolveResult {
    /// Registry name of the sub-solver that ran.
    pub solver_name: String,
    /// Wall-clock seconds across transformation, sub-solve, and
    /// reconciliation.
    pub wall_time: f64,
    /// Sum of backend-reported CPU seconds; `None` when no invocation
    /// reported one.
    pub cpu_time: Option<f64>,
    /// Aggregated termination condition, derived from the actual sub-solver
    /// statuses.
    pub termination: SolverStatus,
    /// Structural statistics of the restored model view.
    pub statistics: ProblemStatistics,
    /// Upper-level objective value at the reported point, when the
    /// sub-solver found one.
    pub objective_value: Option<f64>,
}
