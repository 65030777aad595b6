//! The backend type wiring lowering, search, and reporting together.

use std::fmt::Write as _;
use std::time::{Duration, Instant};

use tracing::info;

use stackel_core::Model;
use stackel_solver::{
    SolutionValues, SolverError, SolverStatus, SubsolveRequest, Subsolver, SubsolverResult,
};

use crate::branch::{self, MilpOutcome};
use crate::lowering;

/// Built-in branch-and-bound MILP backend.
#[derive(Debug, Default)]
pub struct BranchAndBound;

impl BranchAndBound {
    /// Registry name of this backend.
    pub const NAME: &'static str = "milp.bb";

    pub fn new() -> Self {
        Self
    }
}

impl Subsolver for BranchAndBound {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn solve(
        &mut self,
        model: &Model,
        request: &SubsolveRequest,
    ) -> Result<SubsolverResult, SolverError> {
        let start = Instant::now();
        let lowered = lowering::lower(model)?;
        let deadline = request
            .time_limit
            .map(|seconds| start + Duration::from_secs_f64(seconds));

        let (outcome, stats) = branch::solve(&lowered.lp, deadline);

        let negated = lowered.lp.negated;
        let reported = |objective: f64| if negated { -objective } else { objective };
        let to_solution = |objective: f64, values: Vec<f64>| SolutionValues {
            values: lowered.variables.iter().copied().zip(values).collect(),
            objective_value: reported(objective),
        };

        let (status, solution) = match outcome {
            MilpOutcome::Optimal { objective, values } => {
                (SolverStatus::Optimal, Some(to_solution(objective, values)))
            }
            MilpOutcome::Infeasible => (SolverStatus::Infeasible, None),
            MilpOutcome::Unbounded => (SolverStatus::Unbounded, None),
            MilpOutcome::TimeLimit { incumbent } => (
                SolverStatus::TimeLimit,
                incumbent.map(|(objective, values)| to_solution(objective, values)),
            ),
            MilpOutcome::Stalled => {
                return Err(SolverError::SolverSpecific(
                    "simplex pivot cap exceeded; model is numerically degenerate".to_string(),
                ));
            }
        };

        let cpu_time = start.elapsed().as_secs_f64();
        let mut log = String::new();
        let _ = writeln!(
            log,
            "{}: {} columns, {} rows, {} integer",
            Self::NAME,
            lowered.lp.bounds.len(),
            lowered.lp.rows.len(),
            lowered.lp.integers.len()
        );
        let _ = writeln!(log, "{}: {} nodes explored", Self::NAME, stats.nodes);
        let _ = writeln!(log, "{}: status {status}", Self::NAME);
        if request.tee {
            for line in log.lines() {
                info!(component = "milp", operation = "solve", "{line}");
            }
        }

        Ok(SubsolverResult {
            status,
            cpu_time: Some(cpu_time),
            log: Some(log),
            return_code: Some(0),
            solution,
        })
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use stackel_core::{Bounds, Variable};
    use stackel_expr::Expr;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-6,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn solves_a_small_milp_from_a_model() {
        // max 5a + 4b s.t. 2a + 3b <= 4, binaries: a = 1, b = 0.
        let mut model = Model::new();
        let a = model.add_variable(Variable::binary()).unwrap();
        let b = model.add_variable(Variable::binary()).unwrap();
        model
            .add_constraint_expr((Expr::term(a, 2.0) + Expr::term(b, 3.0)).le_scalar(4.0))
            .unwrap();
        model
            .maximize(Expr::term(a, 5.0) + Expr::term(b, 4.0))
            .unwrap();

        let mut backend = BranchAndBound::new();
        let result = backend
            .solve(&model, &SubsolveRequest::default())
            .unwrap();
        assert_eq!(result.status, SolverStatus::Optimal);
        assert!(result.cpu_time.is_some());
        assert_eq!(result.return_code, Some(0));

        let solution = result.solution.unwrap();
        assert_close(solution.objective_value, 5.0);
        assert_close(solution.value(a).unwrap(), 1.0);
        assert_close(solution.value(b).unwrap(), 0.0);
    }

    #[test]
    fn reports_infeasibility_as_a_status() {
        let mut model = Model::new();
        let x = model
            .add_variable(Variable::continuous(Bounds::new(0.0, 1.0)))
            .unwrap();
        model
            .add_constraint_expr(Expr::var(x).ge_scalar(2.0))
            .unwrap();
        model.minimize(Expr::var(x)).unwrap();

        let mut backend = BranchAndBound::new();
        let result = backend
            .solve(&model, &SubsolveRequest::default())
            .unwrap();
        assert_eq!(result.status, SolverStatus::Infeasible);
        assert!(result.solution.is_none());
    }

    #[test]
    fn log_names_the_backend() {
        let mut model = Model::new();
        let x = model
            .add_variable(Variable::continuous(Bounds::new(0.0, 2.0)))
            .unwrap();
        model.minimize(Expr::var(x)).unwrap();

        let mut backend = BranchAndBound::new();
        let result = backend
            .solve(&model, &SubsolveRequest::default())
            .unwrap();
        let log = result.log.unwrap();
        assert!(log.contains("milp.bb"));
        assert!(log.contains("nodes explored"));
    }

    #[test]
    fn zero_time_limit_reports_the_limit_status() {
        let mut model = Model::new();
        let x = model.add_variable(Variable::binary()).unwrap();
        model.minimize(Expr::var(x)).unwrap();

        let request = SubsolveRequest {
            time_limit: Some(0.0),
            ..Default::default()
        };
        let mut backend = BranchAndBound::new();
        let result = backend.solve(&model, &request).unwrap();
        assert_eq!(result.status, SolverStatus::TimeLimit);
    }
}
