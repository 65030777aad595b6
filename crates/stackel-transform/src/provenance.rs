//! Records of what each transformation stage created.

use std::collections::BTreeMap;

use stackel_expr::{BlockId, ComplementarityId, ConstraintId, DisjunctionId, VariableId};

/// Components one stage minted, by kind.
#[derive(Debug, Clone, Default)]
pub struct StageArtifacts {
    pub blocks: Vec<BlockId>,
    pub variables: Vec<VariableId>,
    pub constraints: Vec<ConstraintId>,
    pub complementarities: Vec<ComplementarityId>,
    pub disjunctions: Vec<DisjunctionId>,
}

/// What the pipeline did to a model, keyed by stage name.
///
/// Reconciliation reads this instead of re-deriving structure from the
/// transformed model: which block was the lower level, which block holds the
/// optimality conditions, and which components each stage minted.
#[derive(Debug, Clone, Default)]
pub struct TransformationProvenance {
    submodel: Option<BlockId>,
    conditions: Option<BlockId>,
    stages: BTreeMap<String, StageArtifacts>,
}

impl TransformationProvenance {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the lower-level block the pipeline deactivated.
    pub fn set_submodel(&mut self, block: BlockId) {
        self.submodel = Some(block);
    }

    /// The lower-level block, once the first stage has run.
    pub fn submodel(&self) -> Option<BlockId> {
        self.submodel
    }

    /// Record the block holding the derived optimality conditions.
    pub fn set_conditions_block(&mut self, block: BlockId) {
        self.conditions = Some(block);
    }

    /// The optimality-conditions block, once the first stage has run.
    pub fn conditions_block(&self) -> Option<BlockId> {
        self.conditions
    }

    /// Mutable artifact record for a stage, created on first use.
    pub fn artifacts_mut(&mut self, stage: &str) -> &mut StageArtifacts {
        self.stages.entry(stage.to_string()).or_default()
    }

    /// Artifact record for a stage, if it ran.
    pub fn stage_artifacts(&self, stage: &str) -> Option<&StageArtifacts> {
        self.stages.get(stage)
    }

    /// Names of stages that recorded artifacts, in lexical order.
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.keys().map(String::as_str).collect()
    }

    /// Every block any stage minted, in recording order per stage.
    pub fn minted_blocks(&self) -> Vec<BlockId> {
        self.stages
            .values()
            .flat_map(|artifacts| artifacts.blocks.iter().copied())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifacts_accumulate_per_stage() {
        let mut provenance = TransformationProvenance::new();
        provenance.artifacts_mut("mpec").blocks.push(BlockId::new(1));
        provenance
            .artifacts_mut("mpec")
            .variables
            .push(VariableId::new(4));
        provenance
            .artifacts_mut("bilinear")
            .blocks
            .push(BlockId::new(2));

        assert_eq!(provenance.stage_names(), vec!["bilinear", "mpec"]);
        assert_eq!(
            provenance.stage_artifacts("mpec").unwrap().variables,
            vec![VariableId::new(4)]
        );
        assert_eq!(
            provenance.minted_blocks(),
            vec![BlockId::new(2), BlockId::new(1)]
        );
        assert!(provenance.stage_artifacts("bigm.complementarity").is_none());
    }

    #[test]
    fn submodel_and_conditions_start_unset() {
        let provenance = TransformationProvenance::new();
        assert_eq!(provenance.submodel(), None);
        assert_eq!(provenance.conditions_block(), None);
    }
}
