//! The stage trait the pipeline runs.

use stackel_core::Model;

use crate::error::TransformationError;
use crate::provenance::TransformationProvenance;

/// One in-place model rewrite.
///
/// Stages mutate the model and append to the provenance; they never remove
/// components, only deactivate them, so a later reconciliation can restore
/// the caller's view.
pub trait TransformationStage {
    /// Stage name used for provenance keys, metadata tags, and logs.
    fn name(&self) -> &'static str;

    fn apply(
        &self,
        model: &mut Model,
        provenance: &mut TransformationProvenance,
    ) -> Result<(), TransformationError>;
}
