//! Transformation error types.

use stackel_core::ModelError;
use stackel_expr::ConstraintId;

/// Why a transformation stage could not proceed.
#[derive(Debug, Clone, PartialEq)]
pub enum TransformationErrorKind {
    /// The model has no lower-level block.
    MissingLowerLevel,

    /// The model has more than one lower-level block.
    MultipleLowerLevels,

    /// An objective product term has a shape the linearization does not
    /// cover (neither factor is binary).
    UnsupportedTermShape { detail: String },

    /// A lower-level constraint has finite, distinct lower and upper bounds.
    /// Range rows have no single dual sign; split them before solving.
    RangeConstraint { constraint: ConstraintId },

    /// A model operation failed while rewriting.
    Model(ModelError),
}

/// A failed transformation stage.
///
/// Carries the name of the stage that aborted so callers can report which
/// step of the pipeline rejected the model.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformationError {
    pub stage: &'static str,
    pub kind: TransformationErrorKind,
}

impl TransformationError {
    pub fn new(stage: &'static str, kind: TransformationErrorKind) -> Self {
        Self { stage, kind }
    }

    /// Stable error code for logging and diagnostics.
    pub fn code(&self) -> &'static str {
        match self.kind {
            TransformationErrorKind::MissingLowerLevel => "MISSING_LOWER_LEVEL",
            TransformationErrorKind::MultipleLowerLevels => "MULTIPLE_LOWER_LEVELS",
            TransformationErrorKind::UnsupportedTermShape { .. } => "UNSUPPORTED_TERM_SHAPE",
            TransformationErrorKind::RangeConstraint { .. } => "RANGE_CONSTRAINT",
            TransformationErrorKind::Model(_) => "MODEL_ERROR",
        }
    }
}

impl std::fmt::Display for TransformationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code = self.code();
        let stage = self.stage;
        match &self.kind {
            TransformationErrorKind::MissingLowerLevel => {
                write!(f, "[{code}] Stage '{stage}': model has no lower-level block")
            }
            TransformationErrorKind::MultipleLowerLevels => {
                write!(
                    f,
                    "[{code}] Stage '{stage}': model has more than one lower-level block"
                )
            }
            TransformationErrorKind::UnsupportedTermShape { detail } => {
                write!(
                    f,
                    "[{code}] Stage '{stage}': unsupported product term: {detail}"
                )
            }
            TransformationErrorKind::RangeConstraint { constraint } => {
                write!(
                    f,
                    "[{code}] Stage '{stage}': lower-level constraint {} has two finite \
                     bounds; split it into two single-sided rows",
                    constraint.inner()
                )
            }
            TransformationErrorKind::Model(error) => {
                write!(f, "[{code}] Stage '{stage}': {error}")
            }
        }
    }
}

impl std::error::Error for TransformationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            TransformationErrorKind::Model(error) => Some(error),
            _ => None,
        }
    }
}
