//! Sub-solver termination statuses.

/// Common termination statuses that sub-solvers may return.
///
/// Infeasible, unbounded, and limit-reached are normal terminations, not
/// errors; only a backend malfunction is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolverStatus {
    /// Optimal solution found.
    Optimal,
    /// Problem is infeasible.
    Infeasible,
    /// Problem is unbounded.
    Unbounded,
    /// Solver reached time limit (may have feasible solution).
    TimeLimit,
    /// Solver reached iteration limit (may have feasible solution).
    IterationLimit,
    /// Status is unknown or solver did not complete.
    Unknown,
}

impl SolverStatus {
    /// Check if the status indicates an optimal solution.
    pub fn is_optimal(self) -> bool {
        matches!(self, SolverStatus::Optimal)
    }

    /// Check if the status indicates a feasible solution.
    pub fn is_feasible(self) -> bool {
        matches!(
            self,
            SolverStatus::Optimal | SolverStatus::TimeLimit | SolverStatus::IterationLimit
        )
    }

    /// Check if the status indicates infeasibility.
    pub fn is_infeasible(self) -> bool {
        matches!(self, SolverStatus::Infeasible)
    }

    /// Check if the status indicates unboundedness.
    pub fn is_unbounded(self) -> bool {
        matches!(self, SolverStatus::Unbounded)
    }

    /// Severity rank used for worst-status aggregation across several
    /// sub-solver invocations. Higher means worse.
    pub fn severity(self) -> u8 {
        match self {
            SolverStatus::Optimal => 0,
            SolverStatus::IterationLimit => 1,
            SolverStatus::TimeLimit => 2,
            SolverStatus::Unknown => 3,
            SolverStatus::Unbounded => 4,
            SolverStatus::Infeasible => 5,
        }
    }

    /// Get a human-readable string representation.
    pub fn as_str(self) -> &'static str {
        match self {
            SolverStatus::Optimal => "optimal",
            SolverStatus::Infeasible => "infeasible",
            SolverStatus::Unbounded => "unbounded",
            SolverStatus::TimeLimit => "time_limit",
            SolverStatus::IterationLimit => "iteration_limit",
            SolverStatus::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_is_optimal() {
        assert!(SolverStatus::Optimal.is_optimal());
        assert!(!SolverStatus::Infeasible.is_optimal());
        assert!(!SolverStatus::TimeLimit.is_optimal());
    }

    #[test]
    fn status_is_feasible() {
        assert!(SolverStatus::Optimal.is_feasible());
        assert!(SolverStatus::TimeLimit.is_feasible());
        assert!(SolverStatus::IterationLimit.is_feasible());
        assert!(!SolverStatus::Infeasible.is_feasible());
        assert!(!SolverStatus::Unbounded.is_feasible());
        assert!(!SolverStatus::Unknown.is_feasible());
    }

    #[test]
    fn severity_orders_statuses() {
        assert!(SolverStatus::Optimal.severity() < SolverStatus::TimeLimit.severity());
        assert!(SolverStatus::TimeLimit.severity() < SolverStatus::Unbounded.severity());
        assert!(SolverStatus::Unbounded.severity() < SolverStatus::Infeasible.severity());
    }

    #[test]
    fn status_display() {
        assert_eq!(format!("{}", SolverStatus::Optimal), "optimal");
        assert_eq!(format!("{}", SolverStatus::TimeLimit), "time_limit");
    }
}
