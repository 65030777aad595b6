//! Restoring the caller's model view after a sub-solve.
//!
//! The transformed model is never thrown away; reconciliation writes the
//! solution back onto the original variables, reactivates the lower-level
//! block, and deactivates every block the pipeline minted, leaving the
//! reformulation artifacts inert but inspectable.

use tracing::debug;

use stackel_core::Model;
use stackel_solver::{SolverStatus, StatusAggregation, SubsolverResult};
use stackel_transform::TransformationProvenance;

use crate::error::BilevelError;

/// Aggregated outcome of reconciliation.
#[derive(Debug, Clone)]
pub struct Reconciled {
    pub termination: SolverStatus,
    /// Sum of reported CPU seconds; `None` when no invocation reported one.
    pub cpu_time: Option<f64>,
    /// Upper-level objective at the written-back point, when one exists.
    pub objective_value: Option<f64>,
}

/// Applies sub-solver results back onto the caller's model.
pub struct ResultReconciler<'a> {
    provenance: &'a TransformationProvenance,
    aggregation: StatusAggregation,
}

impl<'a> ResultReconciler<'a> {
    pub fn new(provenance: &'a TransformationProvenance, aggregation: StatusAggregation) -> Self {
        Self {
            provenance,
            aggregation,
        }
    }

    /// Write values back, restore the lower level, hide pipeline artifacts,
    /// and aggregate termination and timing.
    pub fn reconcile(
        &self,
        model: &mut Model,
        results: &[SubsolverResult],
    ) -> Result<Reconciled, BilevelError> {
        let mut objective_value = None;
        for result in results {
            let Some(solution) = &result.solution else {
                continue;
            };
            for (variable_id, value) in &solution.values {
                model.set_variable_value(*variable_id, *value)?;
            }
            objective_value = Some(solution.objective_value);
        }

        // Reactivate the lower level. The cascade skips variables and index
        // sets, which never carried activation through the pipeline.
        if let Some(submodel) = self.provenance.submodel() {
            model.activate_block(submodel)?;
        }
        for block in self.provenance.minted_blocks() {
            model.deactivate_block(block)?;
        }

        let termination = aggregate_status(results, self.aggregation);
        let cpu_time = aggregate_cpu(results);
        debug!(
            component = "reconcile",
            operation = "reconcile",
            status = "success",
            termination = %termination,
            invocations = results.len(),
            "Reconciled sub-solver results"
        );
        Ok(Reconciled {
            termination,
            cpu_time,
            objective_value,
        })
    }
}

/// Termination across invocations, derived from the actual statuses.
fn aggregate_status(results: &[SubsolverResult], rule: StatusAggregation) -> SolverStatus {
    let worst = results
        .iter()
        .map(|result| result.status)
        .max_by_key(|status| status.severity())
        .unwrap_or(SolverStatus::Unknown);
    match rule {
        StatusAggregation::Worst => worst,
        StatusAggregation::RequireAllOptimal => {
            if !results.is_empty() && results.iter().all(|result| result.status.is_optimal()) {
                SolverStatus::Optimal
            } else {
                worst
            }
        }
    }
}

/// Sum of reported CPU seconds; absent timings stay absent rather than
/// reading as zero.
fn aggregate_cpu(results: &[SubsolverResult]) -> Option<f64> {
    let reported: Vec<f64> = results.iter().filter_map(|result| result.cpu_time).collect();
    if reported.is_empty() {
        None
    } else {
        Some(reported.iter().sum())
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    fn with_cpu(status: SolverStatus, cpu: Option<f64>) -> SubsolverResult {
        SubsolverResult {
            cpu_time: cpu,
            ..SubsolverResult::from_status(status)
        }
    }

    #[test]
    fn worst_status_wins() {
        let results = vec![
            with_cpu(SolverStatus::Optimal, None),
            with_cpu(SolverStatus::TimeLimit, None),
        ];
        assert_eq!(
            aggregate_status(&results, StatusAggregation::Worst),
            SolverStatus::TimeLimit
        );
    }

    #[test]
    fn require_all_optimal_demands_unanimity() {
        let optimal = vec![
            with_cpu(SolverStatus::Optimal, None),
            with_cpu(SolverStatus::Optimal, None),
        ];
        assert_eq!(
            aggregate_status(&optimal, StatusAggregation::RequireAllOptimal),
            SolverStatus::Optimal
        );

        let mixed = vec![
            with_cpu(SolverStatus::Optimal, None),
            with_cpu(SolverStatus::Unknown, None),
        ];
        assert_eq!(
            aggregate_status(&mixed, StatusAggregation::RequireAllOptimal),
            SolverStatus::Unknown
        );
    }

    #[test]
    fn no_results_is_unknown() {
        assert_eq!(
            aggregate_status(&[], StatusAggregation::Worst),
            SolverStatus::Unknown
        );
        assert_eq!(
            aggregate_status(&[], StatusAggregation::RequireAllOptimal),
            SolverStatus::Unknown
        );
    }

    #[test]
    fn absent_cpu_times_stay_absent() {
        let results = vec![
            with_cpu(SolverStatus::Optimal, None),
            with_cpu(SolverStatus::Optimal, None),
        ];
        assert_eq!(aggregate_cpu(&results), None);
    }

    #[test]
    fn reported_cpu_times_sum() {
        let results = vec![
            with_cpu(SolverStatus::Optimal, Some(0.25)),
            with_cpu(SolverStatus::Optimal, None),
            with_cpu(SolverStatus::Optimal, Some(0.5)),
        ];
        assert_eq!(aggregate_cpu(&results), Some(0.75));
    }
}
