//! Model error types.

use crate::model::components::ComponentRef;
use stackel_expr::{BlockId, ComplementarityId, ConstraintId, DisjunctionId, IndexSetId, ObjectiveId, VariableId};

/// Errors that can occur during model operations
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    /// Invalid variable ID
    InvalidVariableId(VariableId),
    /// Invalid variable bounds
    InvalidVariableBounds { lower: f64, upper: f64 },
    /// Invalid constraint ID
    InvalidConstraintId(ConstraintId),
    /// Invalid constraint bounds
    InvalidConstraintBounds { lower: f64, upper: f64 },
    /// Invalid objective ID
    InvalidObjectiveId(ObjectiveId),
    /// Invalid block ID
    InvalidBlockId(BlockId),
    /// Invalid index set ID
    InvalidIndexSetId(IndexSetId),
    /// Invalid complementarity ID
    InvalidComplementarityId(ComplementarityId),
    /// Invalid disjunction ID
    InvalidDisjunctionId(DisjunctionId),
    /// Root objective already set
    MultipleObjectives,
    /// No effectively active objective to lower
    NoActiveObjective,
    /// More than one effectively active objective
    MultipleActiveObjectives,
    /// Block with this name already exists
    DuplicateBlock(String),
    /// Component is already a member of a block
    AlreadyAttached(ComponentRef),
    /// Component kind does not support activation toggling
    NotActivatable(ComponentRef),
    /// Constraint rows must be linear
    NonlinearConstraint,
    /// Invalid matrix or objective coefficient
    InvalidCoefficient { coefficient: f64 },
}

impl ModelError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            ModelError::InvalidVariableId(_) => "VARIABLE_INVALID_ID",
            ModelError::InvalidVariableBounds { .. } => "VARIABLE_INVALID_BOUNDS",
            ModelError::InvalidConstraintId(_) => "CONSTRAINT_INVALID_ID",
            ModelError::InvalidConstraintBounds { .. } => "CONSTRAINT_INVALID_BOUNDS",
            ModelError::InvalidObjectiveId(_) => "OBJECTIVE_INVALID_ID",
            ModelError::InvalidBlockId(_) => "BLOCK_INVALID_ID",
            ModelError::InvalidIndexSetId(_) => "INDEX_SET_INVALID_ID",
            ModelError::InvalidComplementarityId(_) => "COMPLEMENTARITY_INVALID_ID",
            ModelError::InvalidDisjunctionId(_) => "DISJUNCTION_INVALID_ID",
            ModelError::MultipleObjectives => "OBJECTIVE_ALREADY_SET",
            ModelError::NoActiveObjective => "OBJECTIVE_NONE_ACTIVE",
            ModelError::MultipleActiveObjectives => "OBJECTIVE_MULTIPLE_ACTIVE",
            ModelError::DuplicateBlock(_) => "BLOCK_DUPLICATE_NAME",
            ModelError::AlreadyAttached(_) => "COMPONENT_ALREADY_ATTACHED",
            ModelError::NotActivatable(_) => "COMPONENT_NOT_ACTIVATABLE",
            ModelError::NonlinearConstraint => "CONSTRAINT_NONLINEAR",
            ModelError::InvalidCoefficient { .. } => "COEFFICIENT_INVALID",
        }
    }
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelError::InvalidVariableId(id) => write!(
                f,
                "[{}] Variable ID {} does not exist",
                self.code(),
                id.inner()
            ),
            ModelError::InvalidVariableBounds { lower, upper } => write!(
                f,
                "[{}] Variable bounds invalid: lower ({}) > upper ({})",
                self.code(),
                lower,
                upper
            ),
            ModelError::InvalidConstraintId(id) => write!(
                f,
                "[{}] Constraint ID {} does not exist",
                self.code(),
                id.inner()
            ),
            ModelError::InvalidConstraintBounds { lower, upper } => write!(
                f,
                "[{}] Constraint bounds invalid: lower ({}) > upper ({})",
                self.code(),
                lower,
                upper
            ),
            ModelError::InvalidObjectiveId(id) => write!(
                f,
                "[{}] Objective ID {} does not exist",
                self.code(),
                id.inner()
            ),
            ModelError::InvalidBlockId(id) => {
                write!(f, "[{}] Block ID {} does not exist", self.code(), id.inner())
            }
            ModelError::InvalidIndexSetId(id) => write!(
                f,
                "[{}] Index set ID {} does not exist",
                self.code(),
                id.inner()
            ),
            ModelError::InvalidComplementarityId(id) => write!(
                f,
                "[{}] Complementarity ID {} does not exist",
                self.code(),
                id.inner()
            ),
            ModelError::InvalidDisjunctionId(id) => write!(
                f,
                "[{}] Disjunction ID {} does not exist",
                self.code(),
                id.inner()
            ),
            ModelError::MultipleObjectives => write!(
                f,
                "[{}] Model already has a root objective; add further objectives on blocks",
                self.code()
            ),
            ModelError::NoActiveObjective => write!(
                f,
                "[{}] Model has no effectively active objective",
                self.code()
            ),
            ModelError::MultipleActiveObjectives => write!(
                f,
                "[{}] Model has more than one effectively active objective",
                self.code()
            ),
            ModelError::DuplicateBlock(name) => {
                write!(f, "[{}] Block '{}' already exists", self.code(), name)
            }
            ModelError::AlreadyAttached(component) => write!(
                f,
                "[{}] {} is already a member of a block",
                self.code(),
                component
            ),
            ModelError::NotActivatable(component) => write!(
                f,
                "[{}] {} does not support activation toggling",
                self.code(),
                component
            ),
            ModelError::NonlinearConstraint => write!(
                f,
                "[{}] Constraint rows must be linear; quadratic terms belong in objectives",
                self.code()
            ),
            ModelError::InvalidCoefficient { coefficient } => write!(
                f,
                "[{}] Coefficient must be finite (got {})",
                self.code(),
                coefficient
            ),
        }
    }
}

impl std::error::Error for ModelError {}
