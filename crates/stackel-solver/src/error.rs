//! Error types for sub-solver acquisition and invocation.

use crate::status::SolverStatus;

/// Errors from acquiring or invoking a sub-solver.
///
/// A non-optimal termination status is not an error; these cover the cases
/// where the backend could not be obtained or malfunctioned outright.
#[derive(Debug, Clone, PartialEq)]
pub enum SolverError {
    /// No factory is registered under the requested name.
    NotAvailable(String),

    /// The backend ran but reported a malfunction rather than a termination
    /// status.
    SolveFailure { status: SolverStatus },

    /// Backend-specific failure detail.
    SolverSpecific(String),

    /// The model has no effectively active variables.
    EmptyModel,

    /// The model has no effectively active objective.
    NoObjective,

    /// The backend handles linear objectives only and the model's objective
    /// carries quadratic terms.
    QuadraticObjective,
}

impl SolverError {
    /// Stable error code for logging and diagnostics.
    pub fn code(&self) -> &'static str {
        match self {
            SolverError::NotAvailable(_) => "SOLVER_NOT_AVAILABLE",
            SolverError::SolveFailure { .. } => "SOLVE_FAILURE",
            SolverError::SolverSpecific(_) => "SOLVER_SPECIFIC",
            SolverError::EmptyModel => "EMPTY_MODEL",
            SolverError::NoObjective => "NO_OBJECTIVE",
            SolverError::QuadraticObjective => "QUADRATIC_OBJECTIVE",
        }
    }
}

impl std::fmt::Display for SolverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code = self.code();
        match self {
            SolverError::NotAvailable(name) => {
                write!(f, "[{code}] No solver registered under name '{name}'")
            }
            SolverError::SolveFailure { status } => {
                write!(f, "[{code}] Solver failed with status: {status}")
            }
            SolverError::SolverSpecific(message) => {
                write!(f, "[{code}] Solver error: {message}")
            }
            SolverError::EmptyModel => {
                write!(f, "[{code}] Model has no active variables")
            }
            SolverError::NoObjective => {
                write!(f, "[{code}] Model has no active objective")
            }
            SolverError::QuadraticObjective => {
                write!(
                    f,
                    "[{code}] Solver supports linear objectives only but the \
                     active objective has quadratic terms"
                )
            }
        }
    }
}

impl std::error::Error for SolverError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(
            SolverError::NotAvailable("glpk".to_string()).code(),
            "SOLVER_NOT_AVAILABLE"
        );
        assert_eq!(
            SolverError::SolveFailure {
                status: SolverStatus::Unknown
            }
            .code(),
            "SOLVE_FAILURE"
        );
        assert_eq!(SolverError::EmptyModel.code(), "EMPTY_MODEL");
    }

    #[test]
    fn display_includes_code_and_detail() {
        let error = SolverError::NotAvailable("cbc".to_string());
        let message = format!("{error}");
        assert!(message.contains("SOLVER_NOT_AVAILABLE"));
        assert!(message.contains("cbc"));
    }
}
