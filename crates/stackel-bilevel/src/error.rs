//! Session-level error type.

use stackel_core::ModelError;
use stackel_solver::SolverError;
use stackel_transform::TransformationError;

/// Any failure of a bilevel solve session.
#[derive(Debug, Clone, PartialEq)]
pub enum BilevelError {
    /// A transformation stage rejected the model.
    Transformation(TransformationError),

    /// Sub-solver acquisition or invocation failed.
    Solver(SolverError),

    /// A model operation failed during reconciliation.
    Model(ModelError),

    /// The session already ran; each session solves exactly once.
    SessionConsumed,
}

impl BilevelError {
    /// Stable error code for logging and diagnostics.
    pub fn code(&self) -> &'static str {
        match self {
            BilevelError::Transformation(error) => error.code(),
            BilevelError::Solver(error) => error.code(),
            BilevelError::Model(error) => error.code(),
            BilevelError::SessionConsumed => "SESSION_CONSUMED",
        }
    }
}

impl std::fmt::Display for BilevelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BilevelError::Transformation(error) => write!(f, "{error}"),
            BilevelError::Solver(error) => write!(f, "{error}"),
            BilevelError::Model(error) => write!(f, "{error}"),
            BilevelError::SessionConsumed => {
                write!(f, "[SESSION_CONSUMED] Solve session has already run")
            }
        }
    }
}

impl std::error::Error for BilevelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BilevelError::Transformation(error) => Some(error),
            BilevelError::Solver(error) => Some(error),
            BilevelError::Model(error) => Some(error),
            BilevelError::SessionConsumed => None,
        }
    }
}

impl From<TransformationError> for BilevelError {
    fn from(error: TransformationError) -> Self {
        BilevelError::Transformation(error)
    }
}

impl From<SolverError> for BilevelError {
    fn from(error: SolverError) -> Self {
        BilevelError::Solver(error)
    }
}

impl From<ModelError> for BilevelError {
    fn from(error: ModelError) -> Self {
        BilevelError::Model(error)
    }
}
