//! Storage access methods and effective (activation-aware) views.

use crate::model::components::{Complementarity, ComponentRef, Disjunction};
use crate::model::error::ModelError;
use crate::model::Model;
use crate::types::{Constraint, Objective, Variable};
use stackel_expr::{ComplementarityId, ConstraintId, DisjunctionId, ObjectiveId, VariableId};

impl Model {
    /// Get the number of variables
    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    /// Get the number of constraints
    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Get the number of objectives
    pub fn num_objectives(&self) -> usize {
        self.objectives.len()
    }

    /// Get the number of blocks
    pub fn num_blocks(&self) -> usize {
        self.blocks.len()
    }

    /// Get the number of coefficients in the model.
    pub fn num_coefficients(&self) -> usize {
        self.columns.values().map(|coeffs| coeffs.len()).sum()
    }

    /// Get a variable by ID.
    pub fn get_variable(&self, id: VariableId) -> Result<&Variable, ModelError> {
        self.variables
            .get(&id)
            .ok_or(ModelError::InvalidVariableId(id))
    }

    /// Get a constraint by ID.
    pub fn get_constraint(&self, id: ConstraintId) -> Result<&Constraint, ModelError> {
        self.constraints
            .get(&id)
            .ok_or(ModelError::InvalidConstraintId(id))
    }

    /// Get an objective by ID.
    pub fn get_objective(&self, id: ObjectiveId) -> Result<&Objective, ModelError> {
        self.objectives
            .get(&id)
            .ok_or(ModelError::InvalidObjectiveId(id))
    }

    /// Get a complementarity by ID.
    pub fn get_complementarity(&self, id: ComplementarityId) -> Result<&Complementarity, ModelError> {
        self.complementarities
            .get(&id)
            .ok_or(ModelError::InvalidComplementarityId(id))
    }

    /// Get a disjunction by ID.
    pub fn get_disjunction(&self, id: DisjunctionId) -> Result<&Disjunction, ModelError> {
        self.disjunctions
            .get(&id)
            .ok_or(ModelError::InvalidDisjunctionId(id))
    }

    /// Get the coefficient matrix in CSC (column-sparse-compressed) format
    ///
    /// Returns an iterator over columns, where each column contains
    /// (constraint_id, coefficient) pairs.
    pub fn columns(&self) -> impl Iterator<Item = (VariableId, &Vec<(ConstraintId, f64)>)> {
        self.columns.iter().map(|(&vid, coeffs)| (vid, coeffs))
    }

    /// Get the coefficients for a specific variable (column)
    pub fn get_column(&self, var_id: VariableId) -> Option<&Vec<(ConstraintId, f64)>> {
        self.columns.get(&var_id)
    }

    /// Row coefficients of one constraint, in variable-id order.
    pub fn row_coefficients(&self, constraint_id: ConstraintId) -> Vec<(VariableId, f64)> {
        let mut row = Vec::new();
        for (var_id, coeffs) in &self.columns {
            for (cid, coeff) in coeffs {
                if *cid == constraint_id {
                    row.push((*var_id, *coeff));
                }
            }
        }
        row
    }

    // ── Effective views ─────────────────────────────────────

    /// Variable ids that are effectively active, in id order.
    pub fn active_variable_ids(&self) -> Vec<VariableId> {
        self.variables
            .keys()
            .copied()
            .filter(|id| {
                self.is_effectively_active(ComponentRef::Variable(*id))
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Constraint ids that are effectively active, in id order.
    pub fn active_constraint_ids(&self) -> Vec<ConstraintId> {
        self.constraints
            .keys()
            .copied()
            .filter(|id| {
                self.is_effectively_active(ComponentRef::Constraint(*id))
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Complementarity ids that are effectively active, in id order.
    pub fn active_complementarity_ids(&self) -> Vec<ComplementarityId> {
        self.complementarities
            .keys()
            .copied()
            .filter(|id| {
                self.is_effectively_active(ComponentRef::Complementarity(*id))
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Disjunction ids that are effectively active, in id order.
    pub fn active_disjunction_ids(&self) -> Vec<DisjunctionId> {
        self.disjunctions
            .keys()
            .copied()
            .filter(|id| {
                self.is_effectively_active(ComponentRef::Disjunction(*id))
                    .unwrap_or(false)
            })
            .collect()
    }

    /// The single effectively active objective, required for lowering to a
    /// sub-solver.
    pub fn active_objective(&self) -> Result<(ObjectiveId, &Objective), ModelError> {
        let mut found = None;
        for (id, objective) in &self.objectives {
            if self.is_effectively_active(ComponentRef::Objective(*id))? {
                if found.is_some() {
                    return Err(ModelError::MultipleActiveObjectives);
                }
                found = Some((*id, objective));
            }
        }
        found.ok_or(ModelError::NoActiveObjective)
    }
}
