//! Depth-first branch and bound over LP relaxations.

use std::time::Instant;

use crate::lowering::DenseLp;
use crate::simplex::{self, LpOutcome};

const INTEGRALITY_TOL: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum MilpOutcome {
    Optimal { objective: f64, values: Vec<f64> },
    Infeasible,
    Unbounded,
    /// Deadline hit; the incumbent, when present, is feasible but not
    /// proven optimal.
    TimeLimit {
        incumbent: Option<(f64, Vec<f64>)>,
    },
    /// A relaxation hit the simplex pivot cap.
    Stalled,
}

#[derive(Debug, Default)]
pub(crate) struct SearchStats {
    pub nodes: usize,
}

/// Solve the (minimization) MILP by depth-first search, branching on the
/// most fractional integer column.
pub(crate) fn solve(lp: &DenseLp, deadline: Option<Instant>) -> (MilpOutcome, SearchStats) {
    let mut stats = SearchStats::default();
    let mut stack = vec![lp.bounds.clone()];
    let mut best: Option<(f64, Vec<f64>)> = None;

    while let Some(bounds) = stack.pop() {
        if let Some(deadline) = deadline {
            if Instant::now() >= deadline {
                return (MilpOutcome::TimeLimit { incumbent: best }, stats);
            }
        }
        stats.nodes += 1;

        let node = DenseLp {
            bounds,
            ..lp.clone()
        };
        let (objective, values) = match simplex::solve(&node) {
            LpOutcome::Infeasible => continue,
            LpOutcome::Stalled => return (MilpOutcome::Stalled, stats),
            LpOutcome::Unbounded => return (MilpOutcome::Unbounded, stats),
            LpOutcome::Optimal { objective, values } => (objective, values),
        };

        // Bound: the relaxation cannot beat the incumbent.
        if let Some((incumbent, _)) = &best {
            if objective >= *incumbent - 1e-9 {
                continue;
            }
        }

        match most_fractional(&node, &values) {
            None => {
                let mut snapped = values;
                for &column in &lp.integers {
                    snapped[column] = snapped[column].round();
                }
                best = Some((objective, snapped));
            }
            Some((column, value)) => {
                // Ceil child pushed first so the floor side is explored
                // first in depth-first order.
                let mut ceil = node.bounds.clone();
                ceil[column].0 = value.ceil();
                if ceil[column].0 <= ceil[column].1 + INTEGRALITY_TOL {
                    stack.push(ceil);
                }
                let mut floor = node.bounds.clone();
                floor[column].1 = value.floor();
                if floor[column].0 <= floor[column].1 + INTEGRALITY_TOL {
                    stack.push(floor);
                }
            }
        }
    }

    match best {
        Some((objective, values)) => (MilpOutcome::Optimal { objective, values }, stats),
        None => (MilpOutcome::Infeasible, stats),
    }
}

/// The integer column whose value is farthest from integral, if any.
fn most_fractional(lp: &DenseLp, values: &[f64]) -> Option<(usize, f64)> {
    let mut worst: Option<(usize, f64, f64)> = None;
    for &column in &lp.integers {
        let value = values[column];
        let distance = (value - value.round()).abs();
        if distance > INTEGRALITY_TOL {
            let replace = match worst {
                None => true,
                Some((_, _, best_distance)) => distance > best_distance,
            };
            if replace {
                worst = Some((column, value, distance));
            }
        }
    }
    worst.map(|(column, value, _)| (column, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lowering::LpRow;
    use std::time::Duration;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-6,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn fractional_relaxation_is_branched_down() {
        // min -x - y s.t. x + y <= 3.5, both integer in [0, 3].
        let lp = DenseLp {
            objective: vec![-1.0, -1.0],
            offset: 0.0,
            rows: vec![LpRow {
                coefficients: vec![1.0, 1.0],
                lower: f64::NEG_INFINITY,
                upper: 3.5,
            }],
            bounds: vec![(0.0, 3.0), (0.0, 3.0)],
            integers: vec![0, 1],
            negated: false,
        };
        let (outcome, stats) = solve(&lp, None);
        let MilpOutcome::Optimal { objective, values } = outcome else {
            panic!("expected optimal");
        };
        assert_close(objective, -3.0);
        assert_close(values[0] + values[1], 3.0);
        assert!(stats.nodes >= 2);
    }

    #[test]
    fn binary_knapsack() {
        // max 5a + 4b + 3c s.t. 2a + 3b + c <= 4, binaries.
        // As minimization: min -5a - 4b - 3c. Optimum picks a and c.
        let lp = DenseLp {
            objective: vec![-5.0, -4.0, -3.0],
            offset: 0.0,
            rows: vec![LpRow {
                coefficients: vec![2.0, 3.0, 1.0],
                lower: f64::NEG_INFINITY,
                upper: 4.0,
            }],
            bounds: vec![(0.0, 1.0); 3],
            integers: vec![0, 1, 2],
            negated: false,
        };
        let (outcome, _) = solve(&lp, None);
        let MilpOutcome::Optimal { objective, values } = outcome else {
            panic!("expected optimal");
        };
        assert_close(objective, -8.0);
        assert_close(values[0], 1.0);
        assert_close(values[1], 0.0);
        assert_close(values[2], 1.0);
    }

    #[test]
    fn integer_infeasibility_detected() {
        // 0.4 <= x <= 0.6 with x integer has no solution.
        let lp = DenseLp {
            objective: vec![1.0],
            offset: 0.0,
            rows: vec![LpRow {
                coefficients: vec![1.0],
                lower: 0.4,
                upper: 0.6,
            }],
            bounds: vec![(0.0, 1.0)],
            integers: vec![0],
            negated: false,
        };
        let (outcome, _) = solve(&lp, None);
        assert_eq!(outcome, MilpOutcome::Infeasible);
    }

    #[test]
    fn already_integral_relaxation_skips_branching() {
        let lp = DenseLp {
            objective: vec![1.0],
            offset: 0.0,
            rows: vec![LpRow {
                coefficients: vec![1.0],
                lower: 2.0,
                upper: f64::INFINITY,
            }],
            bounds: vec![(0.0, 10.0)],
            integers: vec![0],
            negated: false,
        };
        let (outcome, stats) = solve(&lp, None);
        let MilpOutcome::Optimal { objective, .. } = outcome else {
            panic!("expected optimal");
        };
        assert_close(objective, 2.0);
        assert_eq!(stats.nodes, 1);
    }

    #[test]
    fn expired_deadline_reports_time_limit() {
        let lp = DenseLp {
            objective: vec![1.0],
            offset: 0.0,
            rows: vec![],
            bounds: vec![(0.0, 1.0)],
            integers: vec![0],
            negated: false,
        };
        let deadline = Instant::now() - Duration::from_millis(1);
        let (outcome, _) = solve(&lp, Some(deadline));
        assert_eq!(outcome, MilpOutcome::TimeLimit { incumbent: None });
    }
}
