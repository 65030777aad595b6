//! Linearization of objective product terms.
//!
//! Each binary-continuous product `b * x` in the active objective is
//! replaced by an auxiliary variable `w` and a disjunction linking the two:
//! either `b == 1` and `w == x`, or `b == 0` and `w == 0`. Squares of binary
//! variables fold to the variable itself. Products of two continuous
//! variables have no linear encoding and are rejected.

use tracing::debug;

use stackel_core::{Bounds, Model, ModelError, Variable};
use stackel_expr::{Expr, VariableId};

use crate::error::{TransformationError, TransformationErrorKind};
use crate::provenance::TransformationProvenance;
use crate::stage::TransformationStage;

const STAGE: &str = "bilinear";

/// Name of the block holding product-linearization artifacts.
const PRODUCTS_BLOCK: &str = "bilinear";

enum TermPlan {
    /// `b * x` with `b` binary: aux variable plus linking disjunction.
    Linearize {
        binary: VariableId,
        other: VariableId,
        coefficient: f64,
    },
    /// `b * b` with `b` binary: identical to `b` itself.
    FoldSquare { binary: VariableId, coefficient: f64 },
}

/// Stage replacing quadratic objective terms with linear encodings.
#[derive(Debug, Default)]
pub struct BilinearStage;

impl BilinearStage {
    pub fn new() -> Self {
        Self
    }
}

fn model_err(error: ModelError) -> TransformationError {
    TransformationError::new(STAGE, TransformationErrorKind::Model(error))
}

fn is_binary(model: &Model, id: VariableId) -> Result<bool, TransformationError> {
    let variable = model.get_variable(id).map_err(model_err)?;
    Ok(variable.is_integer && variable.bounds.lower == 0.0 && variable.bounds.upper == 1.0)
}

impl TransformationStage for BilinearStage {
    fn name(&self) -> &'static str {
        STAGE
    }

    fn apply(
        &self,
        model: &mut Model,
        provenance: &mut TransformationProvenance,
    ) -> Result<(), TransformationError> {
        let (objective_id, objective) = model.active_objective().map_err(model_err)?;
        let expr = objective.expr.clone();
        if expr.quadratic_terms().is_empty() {
            return Ok(());
        }

        // Classify every product before touching the model, so an
        // unsupported term leaves it unchanged.
        let mut plans = Vec::with_capacity(expr.quadratic_terms().len());
        for (a, b, coefficient) in expr.quadratic_terms() {
            let plan = if a == b {
                if is_binary(model, *a)? {
                    TermPlan::FoldSquare {
                        binary: *a,
                        coefficient: *coefficient,
                    }
                } else {
                    return Err(TransformationError::new(
                        STAGE,
                        TransformationErrorKind::UnsupportedTermShape {
                            detail: format!("square of continuous variable {}", a.inner()),
                        },
                    ));
                }
            } else if is_binary(model, *a)? {
                TermPlan::Linearize {
                    binary: *a,
                    other: *b,
                    coefficient: *coefficient,
                }
            } else if is_binary(model, *b)? {
                TermPlan::Linearize {
                    binary: *b,
                    other: *a,
                    coefficient: *coefficient,
                }
            } else {
                return Err(TransformationError::new(
                    STAGE,
                    TransformationErrorKind::UnsupportedTermShape {
                        detail: format!(
                            "product of variables {} and {}, neither binary",
                            a.inner(),
                            b.inner()
                        ),
                    },
                ));
            };
            plans.push(plan);
        }

        let block = model.add_block(PRODUCTS_BLOCK).map_err(model_err)?;
        provenance.artifacts_mut(STAGE).blocks.push(block);

        let mut rewritten = Expr::new(expr.linear_terms().to_vec(), expr.constant());
        let mut linearized = 0usize;
        for plan in plans {
            match plan {
                TermPlan::FoldSquare {
                    binary,
                    coefficient,
                } => rewritten.push_term(binary, coefficient),
                TermPlan::Linearize {
                    binary,
                    other,
                    coefficient,
                } => {
                    let other_bounds = model.get_variable(other).map_err(model_err)?.bounds;
                    // w must admit zero for the unselected arm.
                    let aux_bounds = Bounds::new(
                        other_bounds.lower.min(0.0),
                        other_bounds.upper.max(0.0),
                    );
                    let aux = model
                        .add_block_variable(block, Variable::continuous(aux_bounds))
                        .map_err(model_err)?;
                    model
                        .set_variable_name(
                            aux,
                            format!("w[{}.{}]", binary.inner(), other.inner()),
                        )
                        .map_err(model_err)?;
                    provenance.artifacts_mut(STAGE).variables.push(aux);

                    let arms = vec![
                        vec![
                            (Expr::var(aux) - Expr::var(other)).eq_scalar(0.0),
                            Expr::var(binary).eq_scalar(1.0),
                        ],
                        vec![
                            Expr::var(aux).eq_scalar(0.0),
                            Expr::var(binary).eq_scalar(0.0),
                        ],
                    ];
                    let disjunction = model
                        .add_block_disjunction(block, arms)
                        .map_err(model_err)?;
                    provenance
                        .artifacts_mut(STAGE)
                        .disjunctions
                        .push(disjunction);

                    rewritten.push_term(aux, coefficient);
                    linearized += 1;
                }
            }
        }

        model
            .set_objective_expr(objective_id, rewritten)
            .map_err(model_err)?;
        debug!(
            component = "transform",
            operation = STAGE,
            status = "success",
            linearized,
            "Replaced objective products with auxiliary variables"
        );
        Ok(())
    }
}
