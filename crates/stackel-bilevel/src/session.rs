//! The one-shot bilevel solve session.

use std::time::Instant;

use tracing::debug;

use stackel_core::Model;
use stackel_solver::{SolveOptions, SolverRegistry};
use stackel_transform::TransformationPipeline;

use crate::error::BilevelError;
use crate::reconcile::ResultReconciler;
use crate::result::SolveResult;
use crate::subsession::SubsolverSession;

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Created,
    Presolved,
    Transformed,
    Solved,
    Postsolved,
}

/// A single solve of one bilevel model.
///
/// The session holds an exclusive borrow of the model and gives it up
/// unconditionally when [`BilevelSolverSession::solve`] returns, on success
/// and on every error path alike. A session solves exactly once; a second
/// call reports [`BilevelError::SessionConsumed`].
pub struct BilevelSolverSession<'m> {
    model: Option<&'m mut Model>,
    options: SolveOptions,
    state: SessionState,
}

impl<'m> BilevelSolverSession<'m> {
    pub fn new(model: &'m mut Model, options: SolveOptions) -> Self {
        Self {
            model: Some(model),
            options,
            state: SessionState::Created,
        }
    }

    /// Lifecycle state, advanced as far as the last solve attempt got.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Transform, sub-solve, and reconcile.
    ///
    /// On failure the model is left as far along as the failing step got:
    /// a sub-solver failure leaves it transformed, which keeps the
    /// reformulation inspectable. Activation flags record everything, so no
    /// information is lost either way.
    pub fn solve(&mut self, registry: &SolverRegistry) -> Result<SolveResult, BilevelError> {
        let model = self.model.take().ok_or(BilevelError::SessionConsumed)?;
        let started = Instant::now();
        let outcome = Self::run(model, &self.options, registry, &mut self.state);
        let wall_time = started.elapsed().as_secs_f64();
        outcome.map(|mut result| {
            result.wall_time = wall_time;
            result
        })
    }

    fn run(
        model: &mut Model,
        options: &SolveOptions,
        registry: &SolverRegistry,
        state: &mut SessionState,
    ) -> Result<SolveResult, BilevelError> {
        let input = model.statistics();
        debug!(
            component = "session",
            operation = "presolve",
            status = "success",
            variables = input.variables,
            constraints = input.constraints,
            objectives = input.objectives,
            solver = %options.solver,
            "Starting bilevel solve"
        );
        *state = SessionState::Presolved;

        let pipeline = TransformationPipeline::standard(options);
        let provenance = pipeline.run(model)?;
        *state = SessionState::Transformed;

        let mut subsession = SubsolverSession::open(registry, options)?;
        let results = subsession.solve(model);
        subsession.close();
        let results = results?;
        *state = SessionState::Solved;

        let reconciler = ResultReconciler::new(&provenance, options.status_aggregation);
        let reconciled = reconciler.reconcile(model, &results)?;
        *state = SessionState::Postsolved;

        Ok(SolveResult {
            solver_name: options.solver.clone(),
            // Filled in by the caller once the span closes.
            wall_time: 0.0,
            cpu_time: reconciled.cpu_time,
            termination: reconciled.termination,
            statistics: model.statistics(),
            objective_value: reconciled.objective_value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stackel_core::{Bounds, Sense, Variable};
    use stackel_expr::Expr;
    use stackel_transform::TransformationErrorKind;

    fn bilevel_model() -> Model {
        let mut model = Model::new();
        let x = model
            .add_variable(Variable::continuous(Bounds::new(0.0, 2.0)))
            .unwrap();
        let sub = model.add_submodel("lower").unwrap();
        let y = model
            .add_block_variable(sub, Variable::continuous(Bounds::non_negative()))
            .unwrap();
        model
            .add_block_constraint_expr(sub, (Expr::var(x) + Expr::var(y)).ge_scalar(3.0))
            .unwrap();
        model
            .add_block_objective(sub, Sense::Minimize, Expr::var(y))
            .unwrap();
        model.minimize(Expr::var(x) - Expr::var(y)).unwrap();
        model
    }

    #[test]
    fn unknown_solver_fails_after_transformation() {
        let mut model = bilevel_model();
        let registry = SolverRegistry::new();
        let options = SolveOptions::new().with_solver("nonexistent-solver");
        let mut session = BilevelSolverSession::new(&mut model, options);

        let error = session.solve(&registry).unwrap_err();
        assert_eq!(error.code(), "SOLVER_NOT_AVAILABLE");
        assert_eq!(session.state(), SessionState::Transformed);

        // The borrow was given back; the model is usable and still holds
        // the transformed view.
        assert!(!model.block(model.block_by_name("lower").unwrap()).unwrap().is_active());
        assert!(model.block_by_name("kkt").is_some());
    }

    #[test]
    fn session_solves_exactly_once() {
        let mut model = bilevel_model();
        let registry = SolverRegistry::new();
        let options = SolveOptions::new().with_solver("nonexistent-solver");
        let mut session = BilevelSolverSession::new(&mut model, options);

        let _ = session.solve(&registry);
        let second = session.solve(&registry).unwrap_err();
        assert_eq!(second, BilevelError::SessionConsumed);
    }

    #[test]
    fn transformation_failure_surfaces_the_stage() {
        let mut model = Model::new();
        let x = model
            .add_variable(Variable::continuous(Bounds::non_negative()))
            .unwrap();
        model.minimize(Expr::var(x)).unwrap();

        let registry = SolverRegistry::new();
        let mut session = BilevelSolverSession::new(&mut model, SolveOptions::new());
        let error = session.solve(&registry).unwrap_err();
        let BilevelError::Transformation(error) = error else {
            panic!("expected transformation error");
        };
        assert_eq!(error.stage, "mpec");
        assert_eq!(error.kind, TransformationErrorKind::MissingLowerLevel);
    }

    #[test]
    fn new_session_starts_created() {
        let mut model = bilevel_model();
        let session = BilevelSolverSession::new(&mut model, SolveOptions::new());
        assert_eq!(session.state(), SessionState::Created);
    }
}
