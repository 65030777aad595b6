//! Complementarity-to-disjunction rewriting.
//!
//! A complementarity condition `first ⊥ second` (both non-negative, at most
//! one strictly positive) becomes a two-arm either-or choice: `first == 0`
//! or `second == 0`. The non-negativity halves are already enforced by
//! ordinary constraints and variable bounds.

use tracing::debug;

use stackel_core::{ComponentRef, Model, ModelError};

use crate::error::{TransformationError, TransformationErrorKind};
use crate::provenance::TransformationProvenance;
use crate::stage::TransformationStage;

const STAGE: &str = "disjunction";

/// Stage rewriting every active complementarity as a disjunction.
#[derive(Debug, Default)]
pub struct DisjunctionStage;

impl DisjunctionStage {
    pub fn new() -> Self {
        Self
    }
}

fn model_err(error: ModelError) -> TransformationError {
    TransformationError::new(STAGE, TransformationErrorKind::Model(error))
}

impl TransformationStage for DisjunctionStage {
    fn name(&self) -> &'static str {
        STAGE
    }

    fn apply(
        &self,
        model: &mut Model,
        provenance: &mut TransformationProvenance,
    ) -> Result<(), TransformationError> {
        let complementarities = model.active_complementarity_ids();
        for comp_id in &complementarities {
            let component = ComponentRef::Complementarity(*comp_id);
            let comp = model.get_complementarity(*comp_id).map_err(model_err)?;
            let arms = vec![
                vec![comp.first.eq_scalar(0.0)],
                vec![comp.second.eq_scalar(0.0)],
            ];
            // Complementarities are minted through blocks, so an owner
            // always exists.
            let owner = model
                .owner_of(component)
                .ok_or_else(|| model_err(ModelError::InvalidComplementarityId(*comp_id)))?;
            let disjunction = model.add_block_disjunction(owner, arms).map_err(model_err)?;
            provenance
                .artifacts_mut(STAGE)
                .disjunctions
                .push(disjunction);
            model.deactivate_component(component).map_err(model_err)?;
        }
        debug!(
            component = "transform",
            operation = STAGE,
            status = "success",
            rewritten = complementarities.len(),
            "Rewrote complementarities as disjunctions"
        );
        Ok(())
    }
}
