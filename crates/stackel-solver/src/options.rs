//! Solve configuration types.

/// Default big-M magnitude for the complementarity-disjunction pass.
///
/// Carried over from the historical solver default; large enough for the
/// dual magnitudes of well-scaled models, small enough to keep the MILP
/// relaxation from degenerating. Override per solve when the model's
/// coefficients warrant it.
pub const DEFAULT_BIG_M: f64 = 999.0;

/// Default big-M magnitude for the bilinear-disjunction pass.
///
/// Independent of [`DEFAULT_BIG_M`]: product reformulations bound auxiliary
/// variables whose range is the factor variable's, which historically used a
/// wider default. The value is configuration, not a derivation; set
/// [`SolveOptions::big_m_bilinear`] explicitly for tight encodings.
pub const DEFAULT_BIG_M_BILINEAR: f64 = 8888.0;

/// Default sub-solver name looked up in the registry.
pub const DEFAULT_SOLVER: &str = "glpk";

/// How termination conditions from several sub-solver invocations combine
/// into one reported condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusAggregation {
    /// Report the worst status present (severity-ranked).
    #[default]
    Worst,
    /// Report optimal only when every invocation was optimal; otherwise the
    /// worst status present.
    RequireAllOptimal,
}

/// Configuration options for one bilevel solve.
///
/// Immutable for the duration of a solve session.
#[derive(Debug, Clone)]
pub struct SolveOptions {
    /// Big-M for linearizing complementarity disjunctions.
    pub big_m: f64,
    /// Big-M for linearizing bilinear-product disjunctions. Never inherits
    /// `big_m`.
    pub big_m_bilinear: f64,
    /// Registry name of the sub-solver to acquire.
    pub solver: String,
    /// Time limit in seconds forwarded to the sub-solver. `None` means no
    /// limit.
    pub time_limit: Option<f64>,
    /// Stream sub-solver output while solving.
    pub tee: bool,
    /// Accepted for interface compatibility; the sub-solve always runs with
    /// labeling disabled since reformulated-model names are solver-internal.
    pub symbolic_labels: bool,
    /// Termination aggregation rule across sub-solver invocations.
    pub status_aggregation: StatusAggregation,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            big_m: DEFAULT_BIG_M,
            big_m_bilinear: DEFAULT_BIG_M_BILINEAR,
            solver: DEFAULT_SOLVER.to_string(),
            time_limit: None,
            tee: false,
            symbolic_labels: false,
            status_aggregation: StatusAggregation::default(),
        }
    }
}

impl SolveOptions {
    /// Create options with all defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the complementarity-pass big-M.
    pub fn with_big_m(mut self, big_m: f64) -> Self {
        self.big_m = big_m;
        self
    }

    /// Set the bilinear-pass big-M.
    pub fn with_big_m_bilinear(mut self, big_m: f64) -> Self {
        self.big_m_bilinear = big_m;
        self
    }

    /// Set the sub-solver name.
    pub fn with_solver(mut self, solver: impl Into<String>) -> Self {
        self.solver = solver.into();
        self
    }

    /// Set the time limit in seconds.
    pub fn with_time_limit(mut self, seconds: f64) -> Self {
        self.time_limit = Some(seconds);
        self
    }

    /// Enable or disable streaming of sub-solver output.
    pub fn with_tee(mut self, tee: bool) -> Self {
        self.tee = tee;
        self
    }

    /// Set the termination aggregation rule.
    pub fn with_status_aggregation(mut self, rule: StatusAggregation) -> Self {
        self.status_aggregation = rule;
        self
    }
}

/// Per-invocation flags handed to a sub-solver backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubsolveRequest {
    /// Stream solver output while solving.
    pub tee: bool,
    /// Time limit in seconds. `None` means no limit.
    pub time_limit: Option<f64>,
    /// Emit human-readable labels in solver artifacts.
    pub symbolic_labels: bool,
    /// Keep intermediate solver files.
    pub keep_files: bool,
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_constants() {
        let options = SolveOptions::new();
        assert_eq!(options.big_m, 999.0);
        assert_eq!(options.big_m_bilinear, 8888.0);
        assert_eq!(options.solver, "glpk");
        assert_eq!(options.time_limit, None);
        assert!(!options.tee);
        assert!(!options.symbolic_labels);
        assert_eq!(options.status_aggregation, StatusAggregation::Worst);
    }

    #[test]
    fn big_m_values_are_independent() {
        let options = SolveOptions::new().with_big_m(50.0);
        assert_eq!(options.big_m, 50.0);
        assert_eq!(options.big_m_bilinear, DEFAULT_BIG_M_BILINEAR);

        let options = SolveOptions::new().with_big_m_bilinear(123.0);
        assert_eq!(options.big_m, DEFAULT_BIG_M);
        assert_eq!(options.big_m_bilinear, 123.0);
    }

    #[test]
    fn builder_pattern_sets_fields() {
        let options = SolveOptions::new()
            .with_solver("milp.bb")
            .with_time_limit(30.0)
            .with_tee(true)
            .with_status_aggregation(StatusAggregation::RequireAllOptimal);
        assert_eq!(options.solver, "milp.bb");
        assert_eq!(options.time_limit, Some(30.0));
        assert!(options.tee);
        assert_eq!(
            options.status_aggregation,
            StatusAggregation::RequireAllOptimal
        );
    }
}
