//! Two-phase tableau simplex over the dense LP form.
//!
//! Bounded variables are shifted or mirrored onto the non-negative orthant,
//! free variables are split, and range rows become slack equalities. Entering
//! columns follow Bland's rule, which rules out cycling at the cost of some
//! extra pivots; the models this backend sees are small reformulations, not
//! production-scale LPs.

use crate::lowering::DenseLp;

const EPS: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum LpOutcome {
    /// Optimal basic solution, values in original column order, objective
    /// including the lowering offset.
    Optimal { objective: f64, values: Vec<f64> },
    Infeasible,
    Unbounded,
    /// The pivot cap was hit; numerically degenerate input.
    Stalled,
}

/// How one original column maps onto standard-form columns.
#[derive(Debug, Clone, Copy)]
enum ColumnMap {
    /// `x = shift + y`
    Shifted { column: usize, shift: f64 },
    /// `x = shift - y`
    Mirrored { column: usize, shift: f64 },
    /// `x = y_pos - y_neg`
    Split { positive: usize, negative: usize },
}

pub(crate) fn solve(lp: &DenseLp) -> LpOutcome {
    // ── Map original columns onto non-negative standard-form columns ──
    let mut maps = Vec::with_capacity(lp.bounds.len());
    let mut n_struct = 0usize;
    for &(lower, upper) in &lp.bounds {
        if lower > upper {
            return LpOutcome::Infeasible;
        }
        let map = if lower.is_finite() {
            let map = ColumnMap::Shifted {
                column: n_struct,
                shift: lower,
            };
            n_struct += 1;
            map
        } else if upper.is_finite() {
            let map = ColumnMap::Mirrored {
                column: n_struct,
                shift: upper,
            };
            n_struct += 1;
            map
        } else {
            let map = ColumnMap::Split {
                positive: n_struct,
                negative: n_struct + 1,
            };
            n_struct += 2;
            map
        };
        maps.push(map);
    }

    // ── Substitute the maps into every row ──
    // Each generic row: dense structural coefficients plus residual bounds.
    struct GenericRow {
        coefficients: Vec<f64>,
        lower: f64,
        upper: f64,
    }
    let mut generic = Vec::new();
    for row in &lp.rows {
        let mut coefficients = vec![0.0; n_struct];
        let mut constant = 0.0;
        for (j, &a) in row.coefficients.iter().enumerate() {
            if a == 0.0 {
                continue;
            }
            match maps[j] {
                ColumnMap::Shifted { column, shift } => {
                    coefficients[column] += a;
                    constant += a * shift;
                }
                ColumnMap::Mirrored { column, shift } => {
                    coefficients[column] -= a;
                    constant += a * shift;
                }
                ColumnMap::Split { positive, negative } => {
                    coefficients[positive] += a;
                    coefficients[negative] -= a;
                }
            }
        }
        generic.push(GenericRow {
            coefficients,
            lower: row.lower - constant,
            upper: row.upper - constant,
        });
    }
    // Residual upper bounds of shifted columns become rows of their own.
    for (j, &(_, upper)) in lp.bounds.iter().enumerate() {
        if let ColumnMap::Shifted { column, shift } = maps[j] {
            if upper.is_finite() {
                let mut coefficients = vec![0.0; n_struct];
                coefficients[column] = 1.0;
                generic.push(GenericRow {
                    coefficients,
                    lower: f64::NEG_INFINITY,
                    upper: upper - shift,
                });
            }
        }
    }

    // ── Expand to equalities with slack columns ──
    let mut n_slack = 0usize;
    for row in &generic {
        let lower_finite = row.lower.is_finite();
        let upper_finite = row.upper.is_finite();
        if lower_finite && upper_finite && (row.upper - row.lower).abs() <= EPS {
            continue;
        }
        n_slack += usize::from(lower_finite) + usize::from(upper_finite);
    }

    let n = n_struct + n_slack;
    let mut equations: Vec<(Vec<f64>, f64)> = Vec::new();
    let mut next_slack = n_struct;
    for row in &generic {
        let lower_finite = row.lower.is_finite();
        let upper_finite = row.upper.is_finite();
        if !lower_finite && !upper_finite {
            continue;
        }
        if lower_finite && upper_finite && (row.upper - row.lower).abs() <= EPS {
            let mut coefficients = vec![0.0; n];
            coefficients[..n_struct].copy_from_slice(&row.coefficients);
            equations.push((coefficients, row.lower));
            continue;
        }
        if upper_finite {
            let mut coefficients = vec![0.0; n];
            coefficients[..n_struct].copy_from_slice(&row.coefficients);
            coefficients[next_slack] = 1.0;
            next_slack += 1;
            equations.push((coefficients, row.upper));
        }
        if lower_finite {
            let mut coefficients = vec![0.0; n];
            coefficients[..n_struct].copy_from_slice(&row.coefficients);
            coefficients[next_slack] = -1.0;
            next_slack += 1;
            equations.push((coefficients, row.lower));
        }
    }

    // ── Structural costs and offset ──
    let mut costs = vec![0.0; n];
    let mut offset = lp.offset;
    for (j, &c) in lp.objective.iter().enumerate() {
        if c == 0.0 {
            continue;
        }
        match maps[j] {
            ColumnMap::Shifted { column, shift } => {
                costs[column] += c;
                offset += c * shift;
            }
            ColumnMap::Mirrored { column, shift } => {
                costs[column] -= c;
                offset += c * shift;
            }
            ColumnMap::Split { positive, negative } => {
                costs[positive] += c;
                costs[negative] -= c;
            }
        }
    }

    let m = equations.len();
    if m == 0 {
        // Unconstrained over the orthant: a column with negative cost grows
        // without a binding row; otherwise everything sits at zero.
        if costs.iter().any(|&cost| cost < -EPS) {
            return LpOutcome::Unbounded;
        }
        return LpOutcome::Optimal {
            objective: offset,
            values: recover(&maps, &vec![0.0; n]),
        };
    }

    // ── Tableau with artificial columns ──
    let width = n + m + 1;
    let mut tableau: Vec<Vec<f64>> = Vec::with_capacity(m);
    let mut basis = Vec::with_capacity(m);
    for (i, (coefficients, rhs)) in equations.into_iter().enumerate() {
        let mut row = vec![0.0; width];
        let flip = if rhs < 0.0 { -1.0 } else { 1.0 };
        for (j, value) in coefficients.into_iter().enumerate() {
            row[j] = flip * value;
        }
        row[n + i] = 1.0;
        row[width - 1] = flip * rhs;
        tableau.push(row);
        basis.push(n + i);
    }

    // Phase 1: minimize the artificial sum.
    let mut cost_row = vec![0.0; width];
    for row in &tableau {
        for (j, value) in row.iter().enumerate().take(n) {
            cost_row[j] -= value;
        }
        cost_row[width - 1] -= row[width - 1];
    }
    if !iterate(&mut tableau, &mut cost_row, &mut basis, n + m) {
        return LpOutcome::Stalled;
    }
    // Objective of phase 1 is -cost_row[last].
    if -cost_row[width - 1] > 1e-7 {
        return LpOutcome::Infeasible;
    }
    // Drive artificials out of the basis where a structural pivot exists.
    for i in 0..m {
        if basis[i] < n {
            continue;
        }
        if let Some(j) = (0..n).find(|&j| tableau[i][j].abs() > EPS) {
            pivot(&mut tableau, &mut cost_row, i, j);
            basis[i] = j;
        }
    }

    // Phase 2: real costs, artificial columns barred from entering.
    let mut cost_row = vec![0.0; width];
    cost_row[..n].copy_from_slice(&costs);
    for (i, &basic) in basis.iter().enumerate() {
        let factor = cost_row[basic];
        if factor.abs() > EPS {
            for j in 0..width {
                cost_row[j] -= factor * tableau[i][j];
            }
        }
    }
    match iterate_bounded(&mut tableau, &mut cost_row, &mut basis, n) {
        Iterate::Done => {}
        Iterate::Unbounded => return LpOutcome::Unbounded,
        Iterate::Stalled => return LpOutcome::Stalled,
    }

    let mut values = vec![0.0; n];
    for (i, &basic) in basis.iter().enumerate() {
        if basic < n {
            values[basic] = tableau[i][width - 1];
        }
    }
    let objective = offset
        + costs
            .iter()
            .zip(&values)
            .map(|(c, v)| c * v)
            .sum::<f64>();
    LpOutcome::Optimal {
        objective,
        values: recover(&maps, &values),
    }
}

enum Iterate {
    Done,
    Unbounded,
    Stalled,
}

/// Phase-1 iteration over all columns; returns false when the cap is hit.
fn iterate(
    tableau: &mut [Vec<f64>],
    cost_row: &mut [f64],
    basis: &mut [usize],
    entering_limit: usize,
) -> bool {
    matches!(
        iterate_bounded(tableau, cost_row, basis, entering_limit),
        // Phase 1 is bounded below by zero, so unboundedness cannot occur.
        Iterate::Done | Iterate::Unbounded
    )
}

fn iterate_bounded(
    tableau: &mut [Vec<f64>],
    cost_row: &mut [f64],
    basis: &mut [usize],
    entering_limit: usize,
) -> Iterate {
    let width = cost_row.len();
    let max_pivots = 200 + 50 * (tableau.len() + entering_limit);
    for _ in 0..max_pivots {
        // Bland's rule: smallest-index column with a negative reduced cost.
        let Some(entering) = (0..entering_limit).find(|&j| cost_row[j] < -EPS) else {
            return Iterate::Done;
        };
        // Ratio test, ties broken by smallest basic index.
        let mut leaving: Option<(usize, f64)> = None;
        for (i, row) in tableau.iter().enumerate() {
            if row[entering] > EPS {
                let ratio = row[width - 1] / row[entering];
                let better = match leaving {
                    None => true,
                    Some((best_i, best)) => {
                        ratio < best - EPS || (ratio < best + EPS && basis[i] < basis[best_i])
                    }
                };
                if better {
                    leaving = Some((i, ratio));
                }
            }
        }
        let Some((row, _)) = leaving else {
            return Iterate::Unbounded;
        };
        pivot(tableau, cost_row, row, entering);
        basis[row] = entering;
    }
    Iterate::Stalled
}

fn pivot(tableau: &mut [Vec<f64>], cost_row: &mut [f64], row: usize, column: usize) {
    let width = cost_row.len();
    let pivot_value = tableau[row][column];
    for j in 0..width {
        tableau[row][j] /= pivot_value;
    }
    for i in 0..tableau.len() {
        if i == row {
            continue;
        }
        let factor = tableau[i][column];
        if factor.abs() > EPS {
            for j in 0..width {
                tableau[i][j] -= factor * tableau[row][j];
            }
        }
    }
    let factor = cost_row[column];
    if factor.abs() > EPS {
        for j in 0..width {
            cost_row[j] -= factor * tableau[row][j];
        }
    }
}

/// Map standard-form values back onto original columns.
fn recover(maps: &[ColumnMap], values: &[f64]) -> Vec<f64> {
    maps.iter()
        .map(|map| match *map {
            ColumnMap::Shifted { column, shift } => shift + values[column],
            ColumnMap::Mirrored { column, shift } => shift - values[column],
            ColumnMap::Split { positive, negative } => values[positive] - values[negative],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lowering::LpRow;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-6,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn simple_bounded_minimum() {
        // min x + y s.t. x + y >= 3, x in [0, 2], y >= 0
        let lp = DenseLp {
            objective: vec![1.0, 1.0],
            offset: 0.0,
            rows: vec![LpRow {
                coefficients: vec![1.0, 1.0],
                lower: 3.0,
                upper: f64::INFINITY,
            }],
            bounds: vec![(0.0, 2.0), (0.0, f64::INFINITY)],
            integers: vec![],
            negated: false,
        };
        let LpOutcome::Optimal { objective, values } = solve(&lp) else {
            panic!("expected optimal");
        };
        assert_close(objective, 3.0);
        assert_close(values[0] + values[1], 3.0);
    }

    #[test]
    fn objective_prefers_cheap_corner() {
        // min -x - 2y s.t. x + y <= 4, x <= 3, y <= 2 (all non-negative)
        let lp = DenseLp {
            objective: vec![-1.0, -2.0],
            offset: 0.0,
            rows: vec![LpRow {
                coefficients: vec![1.0, 1.0],
                lower: f64::NEG_INFINITY,
                upper: 4.0,
            }],
            bounds: vec![(0.0, 3.0), (0.0, 2.0)],
            integers: vec![],
            negated: false,
        };
        let LpOutcome::Optimal { objective, values } = solve(&lp) else {
            panic!("expected optimal");
        };
        // x = 2, y = 2 is the optimal corner.
        assert_close(objective, -6.0);
        assert_close(values[0], 2.0);
        assert_close(values[1], 2.0);
    }

    #[test]
    fn infeasible_row_detected() {
        // x <= 1 and x >= 2
        let lp = DenseLp {
            objective: vec![1.0],
            offset: 0.0,
            rows: vec![
                LpRow {
                    coefficients: vec![1.0],
                    lower: f64::NEG_INFINITY,
                    upper: 1.0,
                },
                LpRow {
                    coefficients: vec![1.0],
                    lower: 2.0,
                    upper: f64::INFINITY,
                },
            ],
            bounds: vec![(0.0, f64::INFINITY)],
            integers: vec![],
            negated: false,
        };
        assert_eq!(solve(&lp), LpOutcome::Infeasible);
    }

    #[test]
    fn unbounded_direction_detected() {
        // min -x, x >= 0, no rows
        let lp = DenseLp {
            objective: vec![-1.0],
            offset: 0.0,
            rows: vec![],
            bounds: vec![(0.0, f64::INFINITY)],
            integers: vec![],
            negated: false,
        };
        assert_eq!(solve(&lp), LpOutcome::Unbounded);
    }

    #[test]
    fn unbounded_with_rows_detected() {
        // min -x s.t. x - y <= 1, both non-negative: grow x and y together.
        let lp = DenseLp {
            objective: vec![-1.0, 0.0],
            offset: 0.0,
            rows: vec![LpRow {
                coefficients: vec![1.0, -1.0],
                lower: f64::NEG_INFINITY,
                upper: 1.0,
            }],
            bounds: vec![(0.0, f64::INFINITY), (0.0, f64::INFINITY)],
            integers: vec![],
            negated: false,
        };
        assert_eq!(solve(&lp), LpOutcome::Unbounded);
    }

    #[test]
    fn free_variable_goes_negative() {
        // min x s.t. x >= -5 expressed as a row over a free column.
        let lp = DenseLp {
            objective: vec![1.0],
            offset: 0.0,
            rows: vec![LpRow {
                coefficients: vec![1.0],
                lower: -5.0,
                upper: f64::INFINITY,
            }],
            bounds: vec![(f64::NEG_INFINITY, f64::INFINITY)],
            integers: vec![],
            negated: false,
        };
        let LpOutcome::Optimal { objective, values } = solve(&lp) else {
            panic!("expected optimal");
        };
        assert_close(objective, -5.0);
        assert_close(values[0], -5.0);
    }

    #[test]
    fn mirrored_variable_respects_upper_bound() {
        // min -x, x <= 7 with no lower bound: optimum at 7.
        let lp = DenseLp {
            objective: vec![-1.0],
            offset: 0.0,
            rows: vec![LpRow {
                coefficients: vec![1.0],
                lower: 0.0,
                upper: f64::INFINITY,
            }],
            bounds: vec![(f64::NEG_INFINITY, 7.0)],
            integers: vec![],
            negated: false,
        };
        let LpOutcome::Optimal { objective, values } = solve(&lp) else {
            panic!("expected optimal");
        };
        assert_close(objective, -7.0);
        assert_close(values[0], 7.0);
    }

    #[test]
    fn equality_row_binds() {
        // min x + y s.t. x + 2y == 4
        let lp = DenseLp {
            objective: vec![1.0, 1.0],
            offset: 0.5,
            rows: vec![LpRow {
                coefficients: vec![1.0, 2.0],
                lower: 4.0,
                upper: 4.0,
            }],
            bounds: vec![(0.0, f64::INFINITY), (0.0, f64::INFINITY)],
            integers: vec![],
            negated: false,
        };
        let LpOutcome::Optimal { objective, values } = solve(&lp) else {
            panic!("expected optimal");
        };
        // Cheapest point: y = 2, x = 0, objective 2 plus offset.
        assert_close(objective, 2.5);
        assert_close(values[0], 0.0);
        assert_close(values[1], 2.0);
    }

    #[test]
    fn fixed_variable_stays_fixed() {
        let lp = DenseLp {
            objective: vec![1.0, 1.0],
            offset: 0.0,
            rows: vec![LpRow {
                coefficients: vec![1.0, 1.0],
                lower: 3.0,
                upper: f64::INFINITY,
            }],
            bounds: vec![(2.0, 2.0), (0.0, f64::INFINITY)],
            integers: vec![],
            negated: false,
        };
        let LpOutcome::Optimal { objective, values } = solve(&lp) else {
            panic!("expected optimal");
        };
        assert_close(values[0], 2.0);
        assert_close(values[1], 1.0);
        assert_close(objective, 3.0);
    }
}
