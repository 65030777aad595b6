//! Big-M linearization of disjunctions.
//!
//! Each active disjunction gets one binary selector per arm and an
//! exactly-one row over the selectors. Every arm constraint is relaxed by M
//! unless its selector is chosen, so the chosen arm is enforced and the
//! others go slack. Created rows are tagged with the stage name, the M
//! magnitude, and the source disjunction for auditing.

use serde_json::json;
use tracing::debug;

use stackel_core::{Bounds, ComponentRef, Model, ModelError, Variable};
use stackel_expr::{ComparisonSense, Expr};

use crate::error::{TransformationError, TransformationErrorKind};
use crate::provenance::TransformationProvenance;
use crate::stage::TransformationStage;

/// Stage replacing disjunctions with big-M constraint rows.
///
/// The pipeline runs this twice with independent magnitudes: once after the
/// complementarity rewrite and once after the bilinear rewrite.
#[derive(Debug)]
pub struct BigMStage {
    name: &'static str,
    big_m: f64,
}

impl BigMStage {
    /// Pass linearizing the disjunctions derived from complementarities.
    pub fn complementarity(big_m: f64) -> Self {
        Self {
            name: "bigm.complementarity",
            big_m,
        }
    }

    /// Pass linearizing the disjunctions derived from objective products.
    pub fn bilinear(big_m: f64) -> Self {
        Self {
            name: "bigm.bilinear",
            big_m,
        }
    }

    fn model_err(&self, error: ModelError) -> TransformationError {
        TransformationError::new(self.name, TransformationErrorKind::Model(error))
    }
}

impl TransformationStage for BigMStage {
    fn name(&self) -> &'static str {
        self.name
    }

    fn apply(
        &self,
        model: &mut Model,
        provenance: &mut TransformationProvenance,
    ) -> Result<(), TransformationError> {
        let disjunctions = model.active_disjunction_ids();
        for disjunction_id in &disjunctions {
            let component = ComponentRef::Disjunction(*disjunction_id);
            let arms = model
                .get_disjunction(*disjunction_id)
                .map_err(|e| self.model_err(e))?
                .arms
                .clone();
            // Disjunctions are minted through blocks, so an owner always
            // exists.
            let owner = model
                .owner_of(component)
                .ok_or_else(|| self.model_err(ModelError::InvalidDisjunctionId(*disjunction_id)))?;

            let mut selector_row = Expr::new_empty();
            for (arm_index, arm) in arms.iter().enumerate() {
                let delta = model
                    .add_block_variable(owner, Variable::binary())
                    .map_err(|e| self.model_err(e))?;
                model
                    .set_variable_name(
                        delta,
                        format!("delta[{}.{arm_index}]", disjunction_id.inner()),
                    )
                    .map_err(|e| self.model_err(e))?;
                provenance.artifacts_mut(self.name).variables.push(delta);
                selector_row.push_term(delta, 1.0);

                for arm_constraint in arm {
                    let shifted_rhs = arm_constraint.rhs() - arm_constraint.expr().constant();
                    let linear = arm_constraint.expr().without_constant();
                    let sense = arm_constraint.sense();

                    if matches!(sense, ComparisonSense::LessEqual | ComparisonSense::Equal) {
                        // row + M*delta <= rhs + M: binding when delta is 1.
                        let row = linear.clone().add(&Expr::term(delta, self.big_m));
                        let id = model
                            .add_expr_constraint(
                                row,
                                Bounds::new(f64::NEG_INFINITY, shifted_rhs + self.big_m),
                            )
                            .map_err(|e| self.model_err(e))?;
                        self.tag(model, id, *disjunction_id, provenance, owner)?;
                    }
                    if matches!(sense, ComparisonSense::GreaterEqual | ComparisonSense::Equal) {
                        // row - M*delta >= rhs - M: binding when delta is 1.
                        let row = linear.clone().add(&Expr::term(delta, -self.big_m));
                        let id = model
                            .add_expr_constraint(
                                row,
                                Bounds::new(shifted_rhs - self.big_m, f64::INFINITY),
                            )
                            .map_err(|e| self.model_err(e))?;
                        self.tag(model, id, *disjunction_id, provenance, owner)?;
                    }
                }
            }

            // Exactly one arm is chosen.
            let selector = model
                .add_expr_constraint(selector_row, Bounds::new(1.0, 1.0))
                .map_err(|e| self.model_err(e))?;
            self.tag(model, selector, *disjunction_id, provenance, owner)?;

            model
                .deactivate_component(component)
                .map_err(|e| self.model_err(e))?;
        }
        debug!(
            component = "transform",
            operation = self.name,
            status = "success",
            big_m = self.big_m,
            linearized = disjunctions.len(),
            "Linearized disjunctions with big-M rows"
        );
        Ok(())
    }
}

impl BigMStage {
    fn tag(
        &self,
        model: &mut Model,
        constraint: stackel_expr::ConstraintId,
        disjunction: stackel_expr::DisjunctionId,
        provenance: &mut TransformationProvenance,
        owner: stackel_expr::BlockId,
    ) -> Result<(), TransformationError> {
        model
            .attach(owner, ComponentRef::Constraint(constraint))
            .map_err(|e| self.model_err(e))?;
        model
            .set_constraint_metadata(
                constraint,
                json!({
                    "transform": self.name,
                    "big_m": self.big_m,
                    "disjunction": disjunction.inner(),
                }),
            )
            .map_err(|e| self.model_err(e))?;
        provenance
            .artifacts_mut(self.name)
            .constraints
            .push(constraint);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use stackel_expr::VariableId;

    fn one_disjunction_model() -> (Model, VariableId, VariableId) {
        let mut model = Model::new();
        let block = model.add_block("kkt").unwrap();
        let lambda = model
            .add_block_variable(block, Variable::continuous(Bounds::non_negative()))
            .unwrap();
        let y = model
            .add_block_variable(block, Variable::continuous(Bounds::non_negative()))
            .unwrap();
        // lambda == 0 or y == 3
        model
            .add_block_disjunction(
                block,
                vec![
                    vec![Expr::var(lambda).eq_scalar(0.0)],
                    vec![Expr::var(y).eq_scalar(3.0)],
                ],
            )
            .unwrap();
        (model, lambda, y)
    }

    #[test]
    fn selectors_and_rows_are_created() {
        let (mut model, _, _) = one_disjunction_model();
        let mut provenance = TransformationProvenance::new();
        BigMStage::complementarity(999.0)
            .apply(&mut model, &mut provenance)
            .unwrap();

        assert!(model.active_disjunction_ids().is_empty());
        let artifacts = provenance.stage_artifacts("bigm.complementarity").unwrap();
        // One binary per arm.
        assert_eq!(artifacts.variables.len(), 2);
        for delta in &artifacts.variables {
            let variable = model.get_variable(*delta).unwrap();
            assert!(variable.is_integer);
            assert_eq!(variable.bounds, Bounds::new(0.0, 1.0));
        }
        // Two rows per equality arm plus the exactly-one row.
        assert_eq!(artifacts.constraints.len(), 5);
    }

    #[test]
    fn equality_arm_produces_relaxed_pair() {
        let (mut model, _, y) = one_disjunction_model();
        let mut provenance = TransformationProvenance::new();
        BigMStage::complementarity(50.0)
            .apply(&mut model, &mut provenance)
            .unwrap();

        let tagged = model.constraints_with_metadata("big_m", &json!(50.0));
        assert_eq!(tagged.len(), 5);

        // Find the pair for the y == 3 arm: le row bound 3 + 50, ge row 3 - 50.
        let mut upper_bounds = Vec::new();
        let mut lower_bounds = Vec::new();
        for id in &tagged {
            let row = model.row_coefficients(*id);
            if row.iter().any(|(vid, _)| *vid == y) {
                let bounds = model.get_constraint(*id).unwrap().bounds;
                if bounds.upper.is_finite() {
                    upper_bounds.push(bounds.upper);
                }
                if bounds.lower.is_finite() {
                    lower_bounds.push(bounds.lower);
                }
            }
        }
        assert_eq!(upper_bounds, vec![53.0]);
        assert_eq!(lower_bounds, vec![-47.0]);
    }

    #[test]
    fn exactly_one_selector_row() {
        let (mut model, lambda, y) = one_disjunction_model();
        let mut provenance = TransformationProvenance::new();
        BigMStage::complementarity(999.0)
            .apply(&mut model, &mut provenance)
            .unwrap();

        let artifacts = provenance.stage_artifacts("bigm.complementarity").unwrap();
        let selector = artifacts.constraints.last().unwrap();
        let bounds = model.get_constraint(*selector).unwrap().bounds;
        assert_eq!(bounds, Bounds::new(1.0, 1.0));
        let row = model.row_coefficients(*selector);
        assert_eq!(row.len(), 2);
        assert!(row.iter().all(|(_, coeff)| *coeff == 1.0));
        assert!(!row.iter().any(|(vid, _)| *vid == lambda || *vid == y));
    }

    #[test]
    fn bilinear_pass_uses_its_own_tag() {
        let (mut model, _, _) = one_disjunction_model();
        let mut provenance = TransformationProvenance::new();
        BigMStage::bilinear(8888.0)
            .apply(&mut model, &mut provenance)
            .unwrap();
        assert!(provenance.stage_artifacts("bigm.bilinear").is_some());
        assert!(provenance.stage_artifacts("bigm.complementarity").is_none());
        let tagged = model.constraints_with_metadata("transform", &json!("bigm.bilinear"));
        assert_eq!(tagged.len(), 5);
    }
}
