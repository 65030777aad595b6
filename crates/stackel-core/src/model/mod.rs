//! Model module for building bilevel optimization models.
//!
//! This module provides the core [`Model`] type and related structures.
//!
//! # Module Organization
//!
//! - [`error`]: Model error types
//! - [`builder`]: Methods for adding variables, constraints, and objectives
//! - [`blocks`]: Block containers, index sets, activation cascades
//! - [`storage`]: Column-first sparse storage access and effective views
//! - [`metadata`]: Variable and constraint naming and metadata
//! - [`stats`]: Structural statistics over the effective view

mod blocks;
mod builder;
mod components;
mod error;
mod metadata;
mod stats;
mod storage;

use crate::types::{Constraint, Objective, Variable};
use stackel_expr::{
    BlockId, ComplementarityId, ConstraintId, DisjunctionId, IndexSetId, ObjectiveId, VariableId,
};
use std::collections::BTreeMap;

pub use components::{Block, BlockRole, Complementarity, ComponentRef, Disjunction, IndexSet};
pub use error::ModelError;
pub use stats::ProblemStatistics;

/// A lazy model builder for bilevel programs.
///
/// Components are stored in id-ordered maps and addressed by stable typed
/// ids; constraint coefficients live in column-first sparse storage. Nothing
/// is ever deleted: transformation and reconciliation work exclusively
/// through activation flags, so the original structure stays recoverable.
#[derive(Debug, Clone)]
pub struct Model {
    pub(crate) variables: BTreeMap<VariableId, Variable>,
    pub(crate) constraints: BTreeMap<ConstraintId, Constraint>,
    pub(crate) objectives: BTreeMap<ObjectiveId, Objective>,
    pub(crate) index_sets: BTreeMap<IndexSetId, IndexSet>,
    pub(crate) complementarities: BTreeMap<ComplementarityId, Complementarity>,
    pub(crate) disjunctions: BTreeMap<DisjunctionId, Disjunction>,
    pub(crate) blocks: BTreeMap<BlockId, Block>,
    // Column-first sparse storage: variable_id -> vec of (constraint_id, coefficient)
    pub(crate) columns: BTreeMap<VariableId, Vec<(ConstraintId, f64)>>,
    // Component -> owning block; absent means the component lives at the root.
    pub(crate) owners: BTreeMap<ComponentRef, BlockId>,
    pub(crate) next_variable_id: u32,
    pub(crate) next_constraint_id: u32,
    pub(crate) next_objective_id: u32,
    pub(crate) next_index_set_id: u32,
    pub(crate) next_complementarity_id: u32,
    pub(crate) next_disjunction_id: u32,
    pub(crate) next_block_id: u32,
    // Lazy-allocated metadata storage
    pub(crate) variable_names: Option<BTreeMap<VariableId, String>>,
    pub(crate) constraint_names: Option<BTreeMap<ConstraintId, String>>,
    pub(crate) variable_metadata: Option<BTreeMap<VariableId, serde_json::Value>>,
    pub(crate) constraint_metadata: Option<BTreeMap<ConstraintId, serde_json::Value>>,
}

impl Model {
    /// Create a new empty model.
    pub fn new() -> Self {
        Self {
            variables: BTreeMap::new(),
            constraints: BTreeMap::new(),
            objectives: BTreeMap::new(),
            index_sets: BTreeMap::new(),
            complementarities: BTreeMap::new(),
            disjunctions: BTreeMap::new(),
            blocks: BTreeMap::new(),
            columns: BTreeMap::new(),
            owners: BTreeMap::new(),
            next_variable_id: 0,
            next_constraint_id: 0,
            next_objective_id: 0,
            next_index_set_id: 0,
            next_complementarity_id: 0,
            next_disjunction_id: 0,
            next_block_id: 0,
            variable_names: None,
            constraint_names: None,
            variable_metadata: None,
            constraint_metadata: None,
        }
    }

    pub(crate) fn ensure_variable_exists(&self, id: VariableId) -> Result<(), ModelError> {
        if self.variables.contains_key(&id) {
            Ok(())
        } else {
            Err(ModelError::InvalidVariableId(id))
        }
    }

    pub(crate) fn ensure_constraint_exists(&self, id: ConstraintId) -> Result<(), ModelError> {
        if self.constraints.contains_key(&id) {
            Ok(())
        } else {
            Err(ModelError::InvalidConstraintId(id))
        }
    }

    pub(crate) fn ensure_component_exists(&self, component: ComponentRef) -> Result<(), ModelError> {
        match component {
            ComponentRef::Variable(id) => self.ensure_variable_exists(id),
            ComponentRef::Constraint(id) => self.ensure_constraint_exists(id),
            ComponentRef::Objective(id) => self
                .objectives
                .contains_key(&id)
                .then_some(())
                .ok_or(ModelError::InvalidObjectiveId(id)),
            ComponentRef::IndexSet(id) => self
                .index_sets
                .contains_key(&id)
                .then_some(())
                .ok_or(ModelError::InvalidIndexSetId(id)),
            ComponentRef::Complementarity(id) => self
                .complementarities
                .contains_key(&id)
                .then_some(())
                .ok_or(ModelError::InvalidComplementarityId(id)),
            ComponentRef::Disjunction(id) => self
                .disjunctions
                .contains_key(&id)
                .then_some(())
                .ok_or(ModelError::InvalidDisjunctionId(id)),
            ComponentRef::Block(id) => self
                .blocks
                .contains_key(&id)
                .then_some(())
                .ok_or(ModelError::InvalidBlockId(id)),
        }
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::types::{Bounds, Sense};
    use stackel_expr::Expr;

    #[test]
    fn test_new_model_is_empty() {
        let model = Model::new();
        assert_eq!(model.num_variables(), 0);
        assert_eq!(model.num_constraints(), 0);
        assert_eq!(model.num_objectives(), 0);
        assert_eq!(model.num_blocks(), 0);
    }

    #[test]
    fn test_add_variable() {
        let mut model = Model::new();
        let var = Variable::continuous(Bounds::new(0.0, 10.0));

        let id = model.add_variable(var).unwrap();
        assert_eq!(model.num_variables(), 1);
        assert_eq!(model.get_variable(id).unwrap(), &var);
    }

    #[test]
    fn test_variable_activation_toggle() {
        let mut model = Model::new();
        let var = model
            .add_variable(Variable::continuous(Bounds::new(0.0, 10.0)))
            .unwrap();

        assert!(model.is_variable_active(var).unwrap());
        model.deactivate_variable(var).unwrap();
        assert!(!model.is_variable_active(var).unwrap());
        model.activate_variable(var).unwrap();
        assert!(model.is_variable_active(var).unwrap());
    }

    #[test]
    fn test_add_constraint() {
        let mut model = Model::new();
        let constraint = Constraint::new(Bounds::new(0.0, 100.0));

        let id = model.add_constraint(constraint).unwrap();
        assert_eq!(model.num_constraints(), 1);
        assert_eq!(model.get_constraint(id).unwrap(), &constraint);
    }

    #[test]
    fn test_minimize_sets_root_objective() {
        let mut model = Model::new();
        let x = model
            .add_variable(Variable::continuous(Bounds::new(0.0, 10.0)))
            .unwrap();

        let obj = model.minimize(Expr::term(x, 1.0)).unwrap();
        assert_eq!(model.get_objective(obj).unwrap().sense, Sense::Minimize);
        assert_eq!(model.num_objectives(), 1);
    }

    #[test]
    fn test_second_root_objective_rejected() {
        let mut model = Model::new();
        let x = model
            .add_variable(Variable::continuous(Bounds::new(0.0, 10.0)))
            .unwrap();

        model.minimize(Expr::term(x, 1.0)).unwrap();
        let result = model.maximize(Expr::term(x, 1.0));
        assert_eq!(result, Err(ModelError::MultipleObjectives));
    }

    #[test]
    fn test_set_coefficient_with_invalid_ids_fails() {
        let mut model = Model::new();
        let invalid_var = VariableId::new(999);
        let constraint = model
            .add_constraint(Constraint::new(Bounds::new(0.0, 100.0)))
            .unwrap();

        let result = model.set_coefficient(invalid_var, constraint, 2.5);
        assert_eq!(result, Err(ModelError::InvalidVariableId(invalid_var)));

        let var = model
            .add_variable(Variable::continuous(Bounds::new(0.0, 10.0)))
            .unwrap();
        let invalid_constraint = ConstraintId::new(999);
        let result = model.set_coefficient(var, invalid_constraint, 2.5);
        assert_eq!(
            result,
            Err(ModelError::InvalidConstraintId(invalid_constraint))
        );
    }

    #[test]
    fn test_coefficients_persist_in_columns() {
        let mut model = Model::new();
        let v1 = model
            .add_variable(Variable::continuous(Bounds::new(0.0, 10.0)))
            .unwrap();
        let v2 = model
            .add_variable(Variable::integer(Bounds::new(-5.0, 5.0)))
            .unwrap();

        let c1 = model
            .add_constraint(Constraint::new(Bounds::new(0.0, 15.0)))
            .unwrap();
        let c2 = model
            .add_constraint(Constraint::new(Bounds::new(-10.0, 10.0)))
            .unwrap();

        model.set_coefficient(v1, c1, 1.5).unwrap();
        model.set_coefficient(v1, c2, -2.0).unwrap();
        model.set_coefficient(v2, c2, 3.5).unwrap();

        let col_v1 = model.get_column(v1).expect("v1 column missing");
        assert_eq!(col_v1, &vec![(c1, 1.5), (c2, -2.0)]);

        let col_v2 = model.get_column(v2).expect("v2 column missing");
        assert_eq!(col_v2, &vec![(c2, 3.5)]);
    }

    #[test]
    fn test_binary_variable_constructor() {
        let var = Variable::binary();
        assert_eq!(var.bounds.lower, 0.0);
        assert_eq!(var.bounds.upper, 1.0);
        assert!(var.is_integer);
    }

    #[test]
    fn test_add_constraint_expr() {
        let mut model = Model::new();
        let var = model
            .add_variable(Variable::continuous(Bounds::new(0.0, 1.0)))
            .unwrap();
        let constraint = Expr::term(var, 1.0).ge_scalar(2.0);

        let con = model.add_constraint_expr(constraint).unwrap();
        let stored = model.get_constraint(con).unwrap();
        assert_eq!(stored.bounds.lower, 2.0);
        assert!(stored.bounds.upper.is_infinite());
    }

    #[test]
    fn test_quadratic_constraint_rejected() {
        let mut model = Model::new();
        let var = model
            .add_variable(Variable::continuous(Bounds::new(0.0, 1.0)))
            .unwrap();
        let result =
            model.add_expr_constraint(Expr::product(var, var, 1.0), Bounds::new(0.0, 1.0));
        assert_eq!(result, Err(ModelError::NonlinearConstraint));
    }

    #[test]
    fn test_variable_bounds_validation() {
        let mut model = Model::new();
        let result = model.add_variable(Variable::continuous(Bounds::new(5.0, 1.0)));
        assert!(matches!(
            result,
            Err(ModelError::InvalidVariableBounds { .. })
        ));
    }

    #[test]
    fn test_constraint_bounds_validation() {
        let mut model = Model::new();
        let result = model.add_constraint(Constraint::new(Bounds::new(10.0, 0.0)));
        assert!(matches!(
            result,
            Err(ModelError::InvalidConstraintBounds { .. })
        ));
    }

    #[test]
    fn test_variable_value_roundtrip() {
        let mut model = Model::new();
        let x = model
            .add_variable(Variable::continuous(Bounds::new(0.0, 10.0)))
            .unwrap();
        assert_eq!(model.variable_value(x).unwrap(), None);
        model.set_variable_value(x, 4.25).unwrap();
        assert_eq!(model.variable_value(x).unwrap(), Some(4.25));
    }
}
