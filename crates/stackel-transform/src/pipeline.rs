//! Ordered stage execution.

use tracing::debug;

use stackel_core::Model;
use stackel_solver::SolveOptions;

use crate::bigm::BigMStage;
use crate::bilinear::BilinearStage;
use crate::disjunction::DisjunctionStage;
use crate::error::TransformationError;
use crate::mpec::MpecStage;
use crate::provenance::TransformationProvenance;
use crate::stage::TransformationStage;

/// An ordered sequence of transformation stages.
pub struct TransformationPipeline {
    stages: Vec<Box<dyn TransformationStage>>,
}

impl TransformationPipeline {
    /// The standard bilevel-to-MILP pipeline.
    ///
    /// Ordering matters: products in the objective are only rewritten after
    /// the complementarity disjunctions are gone, and each big-M pass uses
    /// its own magnitude from the options.
    pub fn standard(options: &SolveOptions) -> Self {
        Self {
            stages: vec![
                Box::new(MpecStage::new()),
                Box::new(DisjunctionStage::new()),
                Box::new(BigMStage::complementarity(options.big_m)),
                Box::new(BilinearStage::new()),
                Box::new(BigMStage::bilinear(options.big_m_bilinear)),
            ],
        }
    }

    /// A pipeline from caller-supplied stages, in the given order.
    pub fn from_stages(stages: Vec<Box<dyn TransformationStage>>) -> Self {
        Self { stages }
    }

    /// Stage names in execution order.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Run every stage in order, collecting provenance.
    ///
    /// The first failing stage aborts the run; its name travels on the
    /// returned error. The model is left as the failing stage left it, with
    /// all rewriting recorded in activation flags rather than deletions.
    pub fn run(&self, model: &mut Model) -> Result<TransformationProvenance, TransformationError> {
        let mut provenance = TransformationProvenance::new();
        for stage in &self.stages {
            debug!(
                component = "transform",
                operation = "run_stage",
                stage = stage.name(),
                "Applying transformation stage"
            );
            stage.apply(model, &mut provenance)?;
        }
        debug!(
            component = "transform",
            operation = "run",
            status = "success",
            stages = self.stages.len(),
            "Transformation pipeline complete"
        );
        Ok(provenance)
    }
}
