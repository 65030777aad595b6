//! Dense lowering of the effective model view.
//!
//! The backend sees only effectively active rows and objectives. Columns
//! come from the visible variables plus the support of those rows and of the
//! objective: a reformulated row may reference a variable whose owning block
//! was deactivated, and the variable still participates in the solve.
//! Reconciliation happens above this layer.

use std::collections::{BTreeMap, BTreeSet};

use stackel_core::{Model, Sense};
use stackel_expr::VariableId;
use stackel_solver::SolverError;

/// A dense minimization LP with explicit variable bounds.
///
/// Always a minimization: a maximizing objective is negated here and the
/// reported objective negated back by the caller.
#[derive(Debug, Clone)]
pub(crate) struct DenseLp {
    /// Cost per column.
    pub objective: Vec<f64>,
    /// Constant added to the objective value.
    pub offset: f64,
    /// Rows as dense coefficient vectors with row bounds.
    pub rows: Vec<LpRow>,
    /// Per-column (lower, upper) bounds.
    pub bounds: Vec<(f64, f64)>,
    /// Columns that must take integer values.
    pub integers: Vec<usize>,
    /// Whether the original objective was a maximization.
    pub negated: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct LpRow {
    pub coefficients: Vec<f64>,
    pub lower: f64,
    pub upper: f64,
}

/// The lowered problem plus the mapping back to model variable ids.
pub(crate) struct Lowered {
    pub lp: DenseLp,
    pub variables: Vec<VariableId>,
}

pub(crate) fn lower(model: &Model) -> Result<Lowered, SolverError> {
    let visible = model.active_variable_ids();
    if visible.is_empty() {
        return Err(SolverError::EmptyModel);
    }

    let (_, objective) = model.active_objective().map_err(|error| {
        use stackel_core::ModelError;
        match error {
            ModelError::NoActiveObjective => SolverError::NoObjective,
            other => SolverError::SolverSpecific(other.to_string()),
        }
    })?;
    if !objective.expr.quadratic_terms().is_empty() {
        return Err(SolverError::QuadraticObjective);
    }

    // Visible variables plus everything the active rows and the objective
    // reach, in id order.
    let active_rows = model.active_constraint_ids();
    let mut columns: BTreeSet<VariableId> = visible.into_iter().collect();
    for (id, _) in objective.expr.normalized_terms() {
        columns.insert(id);
    }
    for &constraint_id in &active_rows {
        for (variable_id, _) in model.row_coefficients(constraint_id) {
            columns.insert(variable_id);
        }
    }
    let variables: Vec<VariableId> = columns.into_iter().collect();
    let column_of: BTreeMap<VariableId, usize> = variables
        .iter()
        .enumerate()
        .map(|(column, id)| (*id, column))
        .collect();

    let mut costs = vec![0.0; variables.len()];
    for (id, coefficient) in objective.expr.normalized_terms() {
        if let Some(&column) = column_of.get(&id) {
            costs[column] += coefficient;
        }
    }
    let mut offset = objective.expr.constant();
    let negated = objective.sense == Sense::Maximize;
    if negated {
        for cost in &mut costs {
            *cost = -*cost;
        }
        offset = -offset;
    }

    let mut bounds = Vec::with_capacity(variables.len());
    let mut integers = Vec::new();
    for (column, id) in variables.iter().enumerate() {
        let variable = model
            .get_variable(*id)
            .map_err(|error| SolverError::SolverSpecific(error.to_string()))?;
        bounds.push((variable.bounds.lower, variable.bounds.upper));
        if variable.is_integer {
            integers.push(column);
        }
    }

    let mut rows = Vec::new();
    for constraint_id in active_rows {
        let constraint = model
            .get_constraint(constraint_id)
            .map_err(|error| SolverError::SolverSpecific(error.to_string()))?;
        if constraint.bounds.lower.is_infinite() && constraint.bounds.upper.is_infinite() {
            continue;
        }
        let mut coefficients = vec![0.0; variables.len()];
        for (variable_id, coefficient) in model.row_coefficients(constraint_id) {
            if let Some(&column) = column_of.get(&variable_id) {
                coefficients[column] += coefficient;
            }
        }
        rows.push(LpRow {
            coefficients,
            lower: constraint.bounds.lower,
            upper: constraint.bounds.upper,
        });
    }

    Ok(Lowered {
        lp: DenseLp {
            objective: costs,
            offset,
            rows,
            bounds,
            integers,
            negated,
        },
        variables,
    })
}
