//! Structural statistics over the effective model view.

use crate::model::components::ComponentRef;
use crate::model::Model;

/// Counts of effectively active components, variables partitioned by
/// integrality class.
///
/// Callers reason about their own model, so these are computed against the
/// activation-aware view: components hidden by a deactivated block are not
/// counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProblemStatistics {
    pub constraints: usize,
    pub variables: usize,
    pub binary_variables: usize,
    pub integer_variables: usize,
    pub continuous_variables: usize,
    pub objectives: usize,
}

impl Model {
    /// Compute structural statistics for the effective view.
    pub fn statistics(&self) -> ProblemStatistics {
        let mut stats = ProblemStatistics::default();

        for id in self.active_variable_ids() {
            let variable = &self.variables[&id];
            stats.variables += 1;
            if variable.is_integer {
                let binary = variable.bounds.lower == 0.0 && variable.bounds.upper == 1.0;
                if binary {
                    stats.binary_variables += 1;
                } else {
                    stats.integer_variables += 1;
                }
            } else {
                stats.continuous_variables += 1;
            }
        }

        stats.constraints = self.active_constraint_ids().len();
        stats.objectives = self
            .objectives
            .keys()
            .filter(|id| {
                self.is_effectively_active(ComponentRef::Objective(**id))
                    .unwrap_or(false)
            })
            .count();

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Bounds, Sense, Variable};
    use stackel_expr::Expr;

    #[test]
    fn statistics_partition_variable_classes() {
        let mut model = Model::new();
        let x = model
            .add_variable(Variable::continuous(Bounds::non_negative()))
            .unwrap();
        model.add_variable(Variable::binary()).unwrap();
        model
            .add_variable(Variable::integer(Bounds::new(0.0, 7.0)))
            .unwrap();
        model
            .add_constraint_expr(Expr::term(x, 1.0).le_scalar(3.0))
            .unwrap();
        model.minimize(Expr::term(x, 1.0)).unwrap();

        let stats = model.statistics();
        assert_eq!(stats.variables, 3);
        assert_eq!(stats.binary_variables, 1);
        assert_eq!(stats.integer_variables, 1);
        assert_eq!(stats.continuous_variables, 1);
        assert_eq!(stats.constraints, 1);
        assert_eq!(stats.objectives, 1);
    }

    #[test]
    fn statistics_skip_deactivated_blocks() {
        let mut model = Model::new();
        let block = model.add_block("aux").unwrap();
        let y = model
            .add_block_variable(block, Variable::binary())
            .unwrap();
        model
            .add_block_constraint_expr(block, Expr::term(y, 1.0).le_scalar(1.0))
            .unwrap();
        model
            .add_block_objective(block, Sense::Minimize, Expr::term(y, 1.0))
            .unwrap();

        assert_eq!(model.statistics().variables, 1);
        model.deactivate_block(block).unwrap();
        let stats = model.statistics();
        assert_eq!(stats.variables, 0);
        assert_eq!(stats.constraints, 0);
        assert_eq!(stats.objectives, 0);
    }
}
