//! Raw outcome of one sub-solver invocation.

use stackel_expr::VariableId;

use crate::status::SolverStatus;

/// Primal point reported by a sub-solver.
#[derive(Debug, Clone, PartialEq)]
pub struct SolutionValues {
    /// Variable values keyed by the model's variable ids.
    pub values: Vec<(VariableId, f64)>,
    /// Objective value at the reported point.
    pub objective_value: f64,
}

impl SolutionValues {
    /// Look up the value of one variable, if the solver reported it.
    pub fn value(&self, id: VariableId) -> Option<f64> {
        self.values
            .iter()
            .find(|(vid, _)| *vid == id)
            .map(|(_, value)| *value)
    }
}

/// The raw outcome of one sub-solver invocation.
///
/// `cpu_time` is `None` when the backend did not report one; absent timings
/// stay absent through aggregation rather than being read as zero seconds.
#[derive(Debug, Clone)]
pub struct SubsolverResult {
    /// Termination status as reported by the backend.
    pub status: SolverStatus,
    /// Backend-reported CPU seconds, when available.
    pub cpu_time: Option<f64>,
    /// Captured solver log, when available.
    pub log: Option<String>,
    /// Backend process return code, when applicable.
    pub return_code: Option<i32>,
    /// Primal solution, present for feasible terminations.
    pub solution: Option<SolutionValues>,
}

impl SubsolverResult {
    /// Result carrying only a termination status.
    pub fn from_status(status: SolverStatus) -> Self {
        Self {
            status,
            cpu_time: None,
            log: None,
            return_code: None,
            solution: None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use stackel_expr::VariableId;

    #[test]
    fn solution_lookup_by_id() {
        let a = VariableId::new(0);
        let b = VariableId::new(1);
        let solution = SolutionValues {
            values: vec![(a, 1.5), (b, -2.0)],
            objective_value: -0.5,
        };
        assert_eq!(solution.value(a), Some(1.5));
        assert_eq!(solution.value(b), Some(-2.0));
        assert_eq!(solution.value(VariableId::new(7)), None);
    }

    #[test]
    fn status_only_result_has_no_timing() {
        let result = SubsolverResult::from_status(SolverStatus::Infeasible);
        assert_eq!(result.status, SolverStatus::Infeasible);
        assert!(result.cpu_time.is_none());
        assert!(result.solution.is_none());
    }
}
