//! Lower-level optimality conditions.
//!
//! Replaces the lower-level block with its Karush-Kuhn-Tucker system: a
//! feasibility copy of every lower constraint, one dual variable per
//! constraint, one stationarity row per lower variable, and complementarity
//! conditions tying duals to slacks. The lower block itself is deactivated,
//! never deleted, so the caller's model view stays recoverable.

use std::collections::BTreeMap;

use serde_json::json;
use tracing::debug;

use stackel_core::{BlockRole, Bounds, ComponentRef, Model, ModelError, Sense, Variable};
use stackel_expr::{BlockId, ConstraintId, Expr, ObjectiveId, VariableId};

use crate::error::{TransformationError, TransformationErrorKind};
use crate::provenance::TransformationProvenance;
use crate::stage::TransformationStage;

const STAGE: &str = "mpec";

/// Name of the block holding the derived optimality conditions.
const CONDITIONS_BLOCK: &str = "kkt";

/// Sign role a lower constraint's dual plays in stationarity rows.
#[derive(Clone, Copy)]
enum DualKind {
    /// `row <= upper`: slack is `upper - row`, dual is non-negative.
    UpperSlack,
    /// `row >= lower`: slack is `row - lower`, dual is non-negative.
    LowerSlack,
    /// `row == rhs`: free multiplier, no slack.
    Equality,
}

struct LowerRow {
    dual: VariableId,
    kind: DualKind,
    coefficients: BTreeMap<VariableId, f64>,
}

/// Stage replacing the lower-level block with its KKT conditions.
#[derive(Debug, Default)]
pub struct MpecStage;

impl MpecStage {
    pub fn new() -> Self {
        Self
    }
}

fn model_err(error: ModelError) -> TransformationError {
    TransformationError::new(STAGE, TransformationErrorKind::Model(error))
}

impl TransformationStage for MpecStage {
    fn name(&self) -> &'static str {
        STAGE
    }

    fn apply(
        &self,
        model: &mut Model,
        provenance: &mut TransformationProvenance,
    ) -> Result<(), TransformationError> {
        let submodel = find_submodel(model)?;
        let (lower_vars, lower_cons, objective_id) = partition_members(model, submodel)?;

        let objective = model.get_objective(objective_id).map_err(model_err)?;
        // Stationarity is derived for a minimizing lower level; a maximizing
        // objective is negated first.
        let lower_objective = match objective.sense {
            Sense::Minimize => objective.expr.clone(),
            Sense::Maximize => objective.expr.scale(-1.0),
        };

        let kkt = model.add_block(CONDITIONS_BLOCK).map_err(model_err)?;
        provenance.set_submodel(submodel);
        provenance.set_conditions_block(kkt);
        provenance.artifacts_mut(STAGE).blocks.push(kkt);

        let mut rows = Vec::with_capacity(lower_cons.len());
        for constraint_id in lower_cons {
            if let Some(row) = derive_constraint_conditions(model, kkt, constraint_id, provenance)?
            {
                rows.push(row);
            }
        }

        for variable_id in &lower_vars {
            derive_stationarity(model, kkt, *variable_id, &lower_objective, &rows, provenance)?;
        }

        model.deactivate_block(submodel).map_err(model_err)?;
        debug!(
            component = "transform",
            operation = STAGE,
            status = "success",
            lower_variables = lower_vars.len(),
            dual_variables = rows.len(),
            "Replaced lower level with optimality conditions"
        );
        Ok(())
    }
}

fn find_submodel(model: &Model) -> Result<BlockId, TransformationError> {
    let lower = model.blocks_with_role(BlockRole::LowerLevel);
    match lower.as_slice() {
        [] => Err(TransformationError::new(
            STAGE,
            TransformationErrorKind::MissingLowerLevel,
        )),
        [block] => Ok(*block),
        _ => Err(TransformationError::new(
            STAGE,
            TransformationErrorKind::MultipleLowerLevels,
        )),
    }
}

/// Split the lower block's members into decision variables, active
/// constraints, and its single active objective.
fn partition_members(
    model: &Model,
    submodel: BlockId,
) -> Result<(Vec<VariableId>, Vec<ConstraintId>, ObjectiveId), TransformationError> {
    let members = model.block(submodel).map_err(model_err)?.members().to_vec();
    let mut variables = Vec::new();
    let mut constraints = Vec::new();
    let mut objective = None;
    for member in members {
        match member {
            ComponentRef::Variable(id) => variables.push(id),
            ComponentRef::Constraint(id) => {
                if model.component_is_active(member).map_err(model_err)? {
                    constraints.push(id);
                }
            }
            ComponentRef::Objective(id) => {
                if model.component_is_active(member).map_err(model_err)? {
                    if objective.is_some() {
                        return Err(model_err(ModelError::MultipleActiveObjectives));
                    }
                    objective = Some(id);
                }
            }
            _ => {}
        }
    }
    let objective = objective.ok_or_else(|| model_err(ModelError::NoActiveObjective))?;
    Ok((variables, constraints, objective))
}

/// Feasibility copy, dual variable, and dual complementarity for one lower
/// constraint. Returns `None` for a vacuous (two-sided infinite) row.
fn derive_constraint_conditions(
    model: &mut Model,
    kkt: BlockId,
    constraint_id: ConstraintId,
    provenance: &mut TransformationProvenance,
) -> Result<Option<LowerRow>, TransformationError> {
    let bounds = model.get_constraint(constraint_id).map_err(model_err)?.bounds;
    let row = model.row_coefficients(constraint_id);
    let row_expr = Expr::from_linear(row.clone());

    let lower_finite = bounds.lower.is_finite();
    let upper_finite = bounds.upper.is_finite();
    let kind = match (lower_finite, upper_finite) {
        (false, false) => return Ok(None),
        (true, true) if bounds.lower < bounds.upper => {
            return Err(TransformationError::new(
                STAGE,
                TransformationErrorKind::RangeConstraint {
                    constraint: constraint_id,
                },
            ));
        }
        (true, true) => DualKind::Equality,
        (false, true) => DualKind::UpperSlack,
        (true, false) => DualKind::LowerSlack,
    };

    let copy = model
        .add_expr_constraint(row_expr.clone(), bounds)
        .map_err(model_err)?;
    model
        .attach(kkt, ComponentRef::Constraint(copy))
        .map_err(model_err)?;
    model
        .set_constraint_metadata(copy, json!({"transform": STAGE, "role": "feasibility"}))
        .map_err(model_err)?;
    provenance.artifacts_mut(STAGE).constraints.push(copy);

    let (dual_bounds, dual_base) = match kind {
        DualKind::Equality => (Bounds::free(), "mu"),
        DualKind::UpperSlack | DualKind::LowerSlack => (Bounds::non_negative(), "lambda"),
    };
    let dual = model
        .add_block_variable(kkt, Variable::continuous(dual_bounds))
        .map_err(model_err)?;
    model
        .set_variable_name(dual, format!("{dual_base}[{}]", constraint_id.inner()))
        .map_err(model_err)?;
    provenance.artifacts_mut(STAGE).variables.push(dual);

    let slack = match kind {
        DualKind::UpperSlack => Some(row_expr.scale(-1.0).add_constant(bounds.upper)),
        DualKind::LowerSlack => Some(row_expr.add_constant(-bounds.lower)),
        DualKind::Equality => None,
    };
    if let Some(slack) = slack {
        let comp = model
            .add_block_complementarity(kkt, Expr::var(dual), slack)
            .map_err(model_err)?;
        provenance.artifacts_mut(STAGE).complementarities.push(comp);
    }

    Ok(Some(LowerRow {
        dual,
        kind,
        coefficients: row.into_iter().collect(),
    }))
}

/// Stationarity condition for one lower variable, shaped by its bounds.
///
/// With `s` the gradient of the lower Lagrangian in this variable:
/// - lower bound only: `s >= 0` complementary to `y - lb`
/// - upper bound only: `s + nu == 0` with `nu >= 0` complementary to `ub - y`
/// - both bounds: `s + nu >= 0`, complementary pairs at each bound
/// - free: `s == 0`
fn derive_stationarity(
    model: &mut Model,
    kkt: BlockId,
    variable_id: VariableId,
    lower_objective: &Expr,
    rows: &[LowerRow],
    provenance: &mut TransformationProvenance,
) -> Result<(), TransformationError> {
    let bounds = model.get_variable(variable_id).map_err(model_err)?.bounds;

    let mut gradient = lower_objective.differentiate(variable_id);
    for row in rows {
        let Some(&coefficient) = row.coefficients.get(&variable_id) else {
            continue;
        };
        match row.kind {
            DualKind::UpperSlack => gradient.push_term(row.dual, coefficient),
            DualKind::LowerSlack => gradient.push_term(row.dual, -coefficient),
            DualKind::Equality => gradient.push_term(row.dual, -coefficient),
        }
    }

    let lower_finite = bounds.lower.is_finite();
    let upper_finite = bounds.upper.is_finite();

    // The upper-bound multiplier, minted only when the bound is finite.
    let nu = if upper_finite {
        let nu = model
            .add_block_variable(kkt, Variable::continuous(Bounds::non_negative()))
            .map_err(model_err)?;
        model
            .set_variable_name(nu, format!("nu[{}]", variable_id.inner()))
            .map_err(model_err)?;
        provenance.artifacts_mut(STAGE).variables.push(nu);
        Some(nu)
    } else {
        None
    };

    let stationary = match nu {
        Some(nu) => gradient.add(&Expr::var(nu)),
        None => gradient,
    };
    // A finite lower bound leaves the row one-sided; otherwise the
    // multiplier (or the absence of any bound) pins it to equality.
    let row_bounds = if lower_finite {
        Bounds::new(0.0, f64::INFINITY)
    } else {
        Bounds::new(0.0, 0.0)
    };
    let stationarity_row = model
        .add_expr_constraint(stationary.clone(), row_bounds)
        .map_err(model_err)?;
    model
        .attach(kkt, ComponentRef::Constraint(stationarity_row))
        .map_err(model_err)?;
    model
        .set_constraint_metadata(
            stationarity_row,
            json!({"transform": STAGE, "role": "stationarity"}),
        )
        .map_err(model_err)?;
    provenance
        .artifacts_mut(STAGE)
        .constraints
        .push(stationarity_row);

    if lower_finite {
        let distance = Expr::var(variable_id).add_constant(-bounds.lower);
        let comp = model
            .add_block_complementarity(kkt, stationary, distance)
            .map_err(model_err)?;
        provenance.artifacts_mut(STAGE).complementarities.push(comp);
    }
    if let Some(nu) = nu {
        let distance = Expr::term(variable_id, -1.0).add_constant(bounds.upper);
        let comp = model
            .add_block_complementarity(kkt, Expr::var(nu), distance)
            .map_err(model_err)?;
        provenance.artifacts_mut(STAGE).complementarities.push(comp);
    }
    Ok(())
}

/// Lookup helper for tests.
#[cfg(test)]
pub(crate) fn conditions_block(model: &Model) -> Option<&stackel_core::Block> {
    model
        .block_by_name(CONDITIONS_BLOCK)
        .and_then(|id| model.block(id).ok())
}
