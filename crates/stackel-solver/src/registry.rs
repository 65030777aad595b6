//! Injectable sub-solver registry with scoped leases.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::SolverError;
use crate::traits::Subsolver;

/// A factory producing fresh sub-solver instances.
///
/// Blanket-implemented for closures, so registering a backend is
/// `registry.register("milp.bb", || Box::new(BranchAndBound::new()))`.
pub trait SubsolverFactory {
    fn create(&self) -> Box<dyn Subsolver>;
}

impl<F> SubsolverFactory for F
where
    F: Fn() -> Box<dyn Subsolver>,
{
    fn create(&self) -> Box<dyn Subsolver> {
        self()
    }
}

/// Name-keyed map of sub-solver factories.
///
/// The registry is plain data handed to whoever needs to acquire a solver;
/// there is no process-wide instance. Acquisition yields a
/// [`SubsolverLease`] whose drop releases the backend on every exit path.
#[derive(Default)]
pub struct SolverRegistry {
    factories: BTreeMap<String, Box<dyn SubsolverFactory>>,
}

impl SolverRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under `name`, replacing any previous entry.
    pub fn register(&mut self, name: impl Into<String>, factory: impl SubsolverFactory + 'static) {
        let name = name.into();
        debug!(
            component = "solver_registry",
            operation = "register",
            status = "success",
            solver = %name,
            "Registered solver factory"
        );
        self.factories.insert(name, Box::new(factory));
    }

    /// Whether a factory is registered under `name`.
    pub fn is_registered(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names in lexical order.
    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    /// Acquire a fresh instance of the backend registered under `name`.
    pub fn acquire(&self, name: &str) -> Result<SubsolverLease, SolverError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| SolverError::NotAvailable(name.to_string()))?;
        debug!(
            component = "solver_registry",
            operation = "acquire",
            status = "success",
            solver = name,
            "Acquired solver instance"
        );
        Ok(SubsolverLease {
            solver: factory.create(),
            released: false,
        })
    }
}

impl std::fmt::Debug for SolverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolverRegistry")
            .field("names", &self.names())
            .finish()
    }
}

/// A scoped hold on a sub-solver instance.
///
/// The backend's `release` runs exactly once, either through an explicit
/// [`SubsolverLease::release`] call or through `Drop` when the lease goes out
/// of scope (including on error paths and panics).
pub struct SubsolverLease {
    solver: Box<dyn Subsolver>,
    released: bool,
}

impl SubsolverLease {
    /// Access the leased backend.
    pub fn solver(&mut self) -> &mut dyn Subsolver {
        self.solver.as_mut()
    }

    /// Release the backend now instead of at end of scope.
    pub fn release(mut self) {
        self.release_inner();
    }

    fn release_inner(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        let name = self.solver.name().to_string();
        self.solver.release();
        debug!(
            component = "solver_registry",
            operation = "release",
            status = "success",
            solver = %name,
            "Released solver instance"
        );
    }
}

impl Drop for SubsolverLease {
    fn drop(&mut self) {
        self.release_inner();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use stackel_core::Model;

    use super::*;
    use crate::options::SubsolveRequest;
    use crate::result::SubsolverResult;
    use crate::status::SolverStatus;

    struct TrackedSolver {
        releases: Rc<Cell<usize>>,
    }

    impl Subsolver for TrackedSolver {
        fn name(&self) -> &str {
            "tracked"
        }

        fn solve(
            &mut self,
            _model: &Model,
            _request: &SubsolveRequest,
        ) -> Result<SubsolverResult, SolverError> {
            Ok(SubsolverResult::from_status(SolverStatus::Optimal))
        }

        fn release(&mut self) {
            self.releases.set(self.releases.get() + 1);
        }
    }

    fn tracked_registry() -> (SolverRegistry, Rc<Cell<usize>>) {
        let releases = Rc::new(Cell::new(0));
        let handle = Rc::clone(&releases);
        let mut registry = SolverRegistry::new();
        registry.register("tracked", move || {
            Box::new(TrackedSolver {
                releases: Rc::clone(&handle),
            }) as Box<dyn Subsolver>
        });
        (registry, releases)
    }

    #[test]
    fn acquire_unknown_name_fails() {
        let registry = SolverRegistry::new();
        let error = registry.acquire("glpk").err();
        assert_eq!(error, Some(SolverError::NotAvailable("glpk".to_string())));
    }

    #[test]
    fn explicit_release_runs_once() {
        let (registry, releases) = tracked_registry();
        let lease = registry.acquire("tracked").unwrap();
        lease.release();
        assert_eq!(releases.get(), 1);
    }

    #[test]
    fn drop_releases_exactly_once() {
        let (registry, releases) = tracked_registry();
        {
            let mut lease = registry.acquire("tracked").unwrap();
            let model = Model::new();
            let result = lease.solver().solve(&model, &SubsolveRequest::default());
            assert!(result.is_ok());
            assert_eq!(releases.get(), 0);
        }
        assert_eq!(releases.get(), 1);
    }

    #[test]
    fn each_acquire_creates_a_fresh_instance() {
        let (registry, releases) = tracked_registry();
        let first = registry.acquire("tracked").unwrap();
        let second = registry.acquire("tracked").unwrap();
        drop(first);
        drop(second);
        assert_eq!(releases.get(), 2);
    }

    #[test]
    fn names_are_sorted() {
        let (mut registry, _releases) = tracked_registry();
        registry.register("alpha", || {
            Box::new(TrackedSolver {
                releases: Rc::new(Cell::new(0)),
            }) as Box<dyn Subsolver>
        });
        assert_eq!(registry.names(), vec!["alpha", "tracked"]);
    }
}
