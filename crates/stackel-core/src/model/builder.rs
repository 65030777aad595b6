//! Model builder methods for adding variables, constraints, and objectives.

use crate::types::{Bounds, Constraint, Objective, Sense, Variable};
use stackel_expr::{ComparisonSense, ConstraintExpr, ConstraintId, Expr, ObjectiveId, VariableId};

use crate::model::components::ComponentRef;
use crate::model::error::ModelError;
use crate::model::Model;

impl Model {
    /// Add a variable to the model.
    pub fn add_variable(&mut self, variable: Variable) -> Result<VariableId, ModelError> {
        if variable.bounds.lower.is_nan()
            || variable.bounds.upper.is_nan()
            || variable.bounds.lower > variable.bounds.upper
        {
            return Err(ModelError::InvalidVariableBounds {
                lower: variable.bounds.lower,
                upper: variable.bounds.upper,
            });
        }

        let id = VariableId::new(self.next_variable_id);
        self.next_variable_id += 1;
        self.variables.insert(id, variable);

        Ok(id)
    }

    /// Add a constraint to the model.
    pub fn add_constraint(&mut self, constraint: Constraint) -> Result<ConstraintId, ModelError> {
        if constraint.bounds.lower.is_nan()
            || constraint.bounds.upper.is_nan()
            || constraint.bounds.lower > constraint.bounds.upper
        {
            return Err(ModelError::InvalidConstraintBounds {
                lower: constraint.bounds.lower,
                upper: constraint.bounds.upper,
            });
        }

        let id = ConstraintId::new(self.next_constraint_id);
        self.next_constraint_id += 1;
        self.constraints.insert(id, constraint);

        Ok(id)
    }

    /// Add an objective component.
    ///
    /// Bilevel models hold several objectives at once; see [`Model::minimize`]
    /// and [`Model::maximize`] for the single root objective convention.
    pub fn add_objective(&mut self, objective: Objective) -> Result<ObjectiveId, ModelError> {
        for (_, coeff) in objective.expr.linear_terms() {
            if !coeff.is_finite() {
                return Err(ModelError::InvalidCoefficient { coefficient: *coeff });
            }
        }
        for (a, _) in objective.expr.linear_terms() {
            self.ensure_variable_exists(*a)?;
        }
        for (a, b, coeff) in objective.expr.quadratic_terms() {
            self.ensure_variable_exists(*a)?;
            self.ensure_variable_exists(*b)?;
            if !coeff.is_finite() {
                return Err(ModelError::InvalidCoefficient { coefficient: *coeff });
            }
        }

        let id = ObjectiveId::new(self.next_objective_id);
        self.next_objective_id += 1;
        tracing::debug!(
            component = "model",
            operation = "add_objective",
            status = "success",
            sense = objective.sense.as_str(),
            linear_terms = objective.expr.linear_terms().len(),
            quadratic_terms = objective.expr.quadratic_terms().len(),
            "Added objective"
        );
        self.objectives.insert(id, objective);

        Ok(id)
    }

    /// Replace the expression of an existing objective.
    pub fn set_objective_expr(&mut self, id: ObjectiveId, expr: Expr) -> Result<(), ModelError> {
        let objective = self
            .objectives
            .get_mut(&id)
            .ok_or(ModelError::InvalidObjectiveId(id))?;
        objective.expr = expr;
        Ok(())
    }

    /// Minimize an expression at the root (upper) level.
    ///
    /// Returns an error if a root objective already exists.
    pub fn minimize(&mut self, expr: Expr) -> Result<ObjectiveId, ModelError> {
        self.add_root_objective(Sense::Minimize, expr)
    }

    /// Maximize an expression at the root (upper) level.
    ///
    /// Returns an error if a root objective already exists.
    pub fn maximize(&mut self, expr: Expr) -> Result<ObjectiveId, ModelError> {
        self.add_root_objective(Sense::Maximize, expr)
    }

    fn add_root_objective(&mut self, sense: Sense, expr: Expr) -> Result<ObjectiveId, ModelError> {
        let root_taken = self
            .objectives
            .keys()
            .any(|id| !self.owners.contains_key(&ComponentRef::Objective(*id)));
        if root_taken {
            return Err(ModelError::MultipleObjectives);
        }
        self.add_objective(Objective::new(sense, expr))
    }

    /// Add a linear constraint from an expression and explicit bounds.
    ///
    /// The expression's constant shifts both bounds; quadratic terms are
    /// rejected, constraint rows are linear by construction.
    pub fn add_expr_constraint(
        &mut self,
        expr: Expr,
        bounds: Bounds,
    ) -> Result<ConstraintId, ModelError> {
        if !expr.quadratic_terms().is_empty() {
            return Err(ModelError::NonlinearConstraint);
        }
        let shift = expr.constant();
        let constraint_id = self.add_constraint(Constraint::new(Bounds::new(
            bounds.lower - shift,
            bounds.upper - shift,
        )))?;
        for (var_id, coeff) in expr.normalized_terms() {
            self.set_coefficient(var_id, constraint_id, coeff)?;
        }
        Ok(constraint_id)
    }

    /// Add a constraint from a comparison expression (e.g., `x + y <= 10`).
    pub fn add_constraint_expr(
        &mut self,
        constraint: ConstraintExpr,
    ) -> Result<ConstraintId, ModelError> {
        let (expr, sense, rhs) = constraint.into_parts();
        let bounds = match sense {
            ComparisonSense::LessEqual => Bounds::new(f64::NEG_INFINITY, rhs),
            ComparisonSense::GreaterEqual => Bounds::new(rhs, f64::INFINITY),
            ComparisonSense::Equal => Bounds::new(rhs, rhs),
        };
        self.add_expr_constraint(expr, bounds)
    }

    /// Add a coefficient to the constraint matrix.
    ///
    /// This adds a coefficient at the intersection of a variable column and
    /// constraint row. Returns an error if either ID is invalid.
    pub fn set_coefficient(
        &mut self,
        var_id: VariableId,
        constraint_id: ConstraintId,
        coefficient: f64,
    ) -> Result<(), ModelError> {
        if !coefficient.is_finite() {
            return Err(ModelError::InvalidCoefficient { coefficient });
        }
        self.ensure_variable_exists(var_id)?;
        self.ensure_constraint_exists(constraint_id)?;

        let column = self.columns.entry(var_id).or_default();
        match column.iter_mut().find(|(cid, _)| *cid == constraint_id) {
            Some((_, existing)) => *existing = coefficient,
            None => column.push((constraint_id, coefficient)),
        }

        Ok(())
    }

    /// Check if a variable is active.
    pub fn is_variable_active(&self, id: VariableId) -> Result<bool, ModelError> {
        self.get_variable(id).map(|v| v.is_active)
    }

    /// Deactivate a variable without removing its column.
    pub fn deactivate_variable(&mut self, id: VariableId) -> Result<(), ModelError> {
        self.set_variable_active(id, false)
    }

    /// Activate a previously deactivated variable.
    pub fn activate_variable(&mut self, id: VariableId) -> Result<(), ModelError> {
        self.set_variable_active(id, true)
    }

    fn set_variable_active(&mut self, id: VariableId, active: bool) -> Result<(), ModelError> {
        self.variables
            .get_mut(&id)
            .map(|v| v.is_active = active)
            .ok_or(ModelError::InvalidVariableId(id))
    }

    /// Store a solved value on a variable.
    pub fn set_variable_value(&mut self, id: VariableId, value: f64) -> Result<(), ModelError> {
        self.variables
            .get_mut(&id)
            .map(|v| v.value = Some(value))
            .ok_or(ModelError::InvalidVariableId(id))
    }

    /// Read a variable's solved value, if one has been written back.
    pub fn variable_value(&self, id: VariableId) -> Result<Option<f64>, ModelError> {
        self.get_variable(id).map(|v| v.value)
    }
}
