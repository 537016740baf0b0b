use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::backend::LpSolver;
use crate::error::SolverError;
use crate::problem::{ConstraintOp, LpProblem, VariableDef};
use crate::solution::{Analysis, ConstraintViolation, ShadowPrice, Solution, SolutionStatus};

/// Relative slack under which a row counts as binding
pub const BINDING_TOLERANCE: f64 = 1e-7;

/// Adds sensitivity analysis and infeasibility diagnostics to any backend.
///
/// On an optimal solve the wrapper lists the binding constraints and attaches
/// a shadow price for every constraint, obtained by solving the dual LP with
/// the wrapped backend. On an infeasible solve it drops every `>=` row, solves
/// again and reports which constraints the relaxed optimum violates, worst
/// first. If even the relaxed problem has no optimum it looks for rows over
/// the same expression whose bounds contradict each other. The backend's
/// status is never changed.
#[derive(Debug, Clone)]
pub struct Analyzed<S> {
    inner: S,
    tolerance: f64,
}

impl<S: LpSolver> Analyzed<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            tolerance: BINDING_TOLERANCE,
        }
    }

    /// Relative tolerance for binding and violation checks, in `[0, 1)`
    pub fn with_tolerance(mut self, tol: f64) -> Result<Self, SolverError> {
        if !(0.0..1.0).contains(&tol) {
            return Err(SolverError::InvalidTolerance(tol));
        }
        self.tolerance = tol;
        Ok(self)
    }

    fn attach_analysis(
        &self,
        problem: &LpProblem,
        solution: Solution,
    ) -> Result<Solution, SolverError> {
        let Some(values) = solution.values.as_deref() else {
            return Ok(solution);
        };

        let binding_constraints: Vec<String> = problem
            .constraints
            .iter()
            .filter(|c| (c.lhs(values) - c.rhs).abs() <= self.tolerance * (1.0 + c.rhs.abs()))
            .map(|c| c.name.clone())
            .collect();

        let shadow_prices = match self.duals(problem)? {
            Some(duals) => problem
                .constraints
                .iter()
                .zip(duals)
                .map(|(c, value)| ShadowPrice {
                    constraint: c.name.clone(),
                    value,
                })
                .collect(),
            None => Vec::new(),
        };

        debug!(
            component = "analysis",
            operation = "attach",
            binding = binding_constraints.len() as u64,
            shadow_prices = shadow_prices.len() as u64,
            "Sensitivity analysis complete"
        );

        Ok(solution.with_analysis(Analysis {
            shadow_prices,
            binding_constraints,
        }))
    }

    /// Dual value of every constraint, signed as the change in the original
    /// objective per unit increase of that constraint's right-hand side.
    ///
    /// The problem is rewritten as `max c'x` over `<=` rows and `x >= 0`, with
    /// positive lower bounds and finite upper bounds as extra rows. Returns
    /// `None` when a variable may go negative or the dual fails to solve.
    fn duals(&self, problem: &LpProblem) -> Result<Option<Vec<f64>>, SolverError> {
        if problem.variables.iter().any(|v| v.lower < 0.0) {
            debug!(
                component = "analysis",
                operation = "duals",
                "Negative lower bound, skipping shadow prices"
            );
            return Ok(None);
        }

        let n = problem.num_variables();
        let sense = if problem.objective.minimize { -1.0 } else { 1.0 };

        let mut columns = Vec::new();
        for (i, c) in problem.constraints.iter().enumerate() {
            match c.op {
                ConstraintOp::Le => columns.push(DualColumn::row(i, 1.0, &c.coefficients, c.rhs)),
                ConstraintOp::Ge => columns.push(DualColumn::row(i, -1.0, &c.coefficients, c.rhs)),
                ConstraintOp::Eq => {
                    columns.push(DualColumn::row(i, 1.0, &c.coefficients, c.rhs));
                    columns.push(DualColumn::row(i, -1.0, &c.coefficients, c.rhs));
                }
            }
        }
        for (j, var) in problem.variables.iter().enumerate() {
            if var.lower > 0.0 {
                columns.push(DualColumn::bound(j, n, -1.0, var.lower));
            }
            if var.upper.is_finite() {
                columns.push(DualColumn::bound(j, n, 1.0, var.upper));
            }
        }

        if columns.is_empty() {
            return Ok(Some(Vec::new()));
        }

        let mut dual = LpProblem::with_variables(
            (0..columns.len())
                .map(|k| VariableDef::non_negative(format!("dual_{}", k)))
                .collect(),
        );
        dual.set_objective(columns.iter().map(|col| col.rhs).collect(), true);
        for (j, var) in problem.variables.iter().enumerate() {
            dual.add_constraint(
                var.name.clone(),
                columns.iter().map(|col| col.coefficients[j]).collect(),
                ConstraintOp::Ge,
                sense * problem.objective.coefficients[j],
            );
        }

        let solved = self.inner.solve(&dual)?;
        let Some(y) = solved.values.filter(|_| solved.status.is_optimal()) else {
            warn!(
                component = "analysis",
                operation = "duals",
                status = solved.status.as_str(),
                "Dual problem did not solve to optimality"
            );
            return Ok(None);
        };

        let mut duals = vec![0.0; problem.num_constraints()];
        for (col, value) in columns.iter().zip(y) {
            if let Some(row) = col.row {
                duals[row] += sense * col.sign * value;
            }
        }
        Ok(Some(duals))
    }

    /// When the original problem is infeasible, solve it without its `>=`
    /// rows and report which constraints that point violates
    fn solve_with_relaxation(&self, problem: &LpProblem) -> Result<Solution, SolverError> {
        let mut relaxed = LpProblem::with_variables(problem.variables.clone());
        relaxed.objective = problem.objective.clone();
        relaxed.constraints = problem
            .constraints
            .iter()
            .filter(|c| c.op != ConstraintOp::Ge)
            .cloned()
            .collect();

        warn!(
            component = "analysis",
            operation = "relax",
            dropped = (problem.num_constraints() - relaxed.num_constraints()) as u64,
            "Problem infeasible, retrying without >= constraints"
        );

        let relaxed_solution = self.inner.solve(&relaxed)?;
        let Some(values) = relaxed_solution
            .values
            .as_deref()
            .filter(|_| relaxed_solution.status.is_optimal())
        else {
            return Ok(self.analyze_conflicts(problem));
        };

        let violations = problem.violations(values, self.tolerance);
        if violations.is_empty() {
            warn!(
                component = "analysis",
                operation = "relax",
                "Relaxed optimum violates no row within tolerance"
            );
        }
        Ok(Solution::infeasible_with_violations(violations))
    }

    /// Direct conflicts between rows over an identical expression, used when
    /// even the relaxed problem has no optimum
    fn analyze_conflicts(&self, problem: &LpProblem) -> Solution {
        type Bound<'a> = Option<(f64, &'a str)>;
        let mut groups: BTreeMap<Vec<u64>, (Bound<'_>, Bound<'_>)> = BTreeMap::new();

        for c in &problem.constraints {
            // -0.0 and 0.0 share a key
            let key = c.coefficients.iter().map(|x| (x + 0.0).to_bits()).collect();
            let (min, max) = groups.entry(key).or_default();
            if c.op != ConstraintOp::Le && min.is_none_or(|(v, _)| c.rhs > v) {
                *min = Some((c.rhs, c.name.as_str()));
            }
            if c.op != ConstraintOp::Ge && max.is_none_or(|(v, _)| c.rhs < v) {
                *max = Some((c.rhs, c.name.as_str()));
            }
        }

        let mut violations: Vec<ConstraintViolation> = groups
            .into_values()
            .filter_map(|(min, max)| {
                let ((min_val, min_name), (max_val, max_name)) = (min?, max?);
                let conflicting = min_val > max_val + self.tolerance * (1.0 + max_val.abs());
                conflicting.then(|| ConstraintViolation {
                    constraint: format!("{} vs {}", min_name, max_name),
                    required: min_val,
                    actual: max_val,
                    violation_amount: min_val - max_val,
                    description: format!(
                        "Conflict: {} requires >= {:.2} but {} requires <= {:.2}",
                        min_name, min_val, max_name, max_val
                    ),
                })
            })
            .collect();
        violations.sort_by(|a, b| b.violation_amount.total_cmp(&a.violation_amount));

        debug!(
            component = "analysis",
            operation = "conflicts",
            conflicts = violations.len() as u64,
            "Relaxed problem has no optimum"
        );
        Solution::infeasible_with_violations(violations)
    }
}

impl<S: LpSolver> LpSolver for Analyzed<S> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn solve(&self, problem: &LpProblem) -> Result<Solution, SolverError> {
        let solution = self.inner.solve(problem)?;
        match solution.status {
            SolutionStatus::Optimal => self.attach_analysis(problem, solution),
            SolutionStatus::Infeasible => self.solve_with_relaxation(problem),
            _ => Ok(solution),
        }
    }
}

/// One dual variable: a primal row in `<=` form
struct DualColumn {
    /// Constraint the column prices, `None` for variable bounds
    row: Option<usize>,
    sign: f64,
    coefficients: Vec<f64>,
    rhs: f64,
}

impl DualColumn {
    fn row(row: usize, sign: f64, coefficients: &[f64], rhs: f64) -> Self {
        Self {
            row: Some(row),
            sign,
            coefficients: coefficients.iter().map(|c| sign * c).collect(),
            rhs: sign * rhs,
        }
    }

    fn bound(column: usize, n: usize, sign: f64, value: f64) -> Self {
        let mut coefficients = vec![0.0; n];
        coefficients[column] = sign;
        Self {
            row: None,
            sign,
            coefficients,
            rhs: sign * value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MicrolpSolver;

    fn analyzed() -> Analyzed<MicrolpSolver> {
        Analyzed::new(MicrolpSolver)
    }

    fn prices(solution: &Solution) -> Vec<f64> {
        let analysis = solution.analysis.as_ref().unwrap();
        analysis.shadow_prices.iter().map(|sp| sp.value).collect()
    }

    fn assert_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len(), "{:?} vs {:?}", actual, expected);
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-6, "{:?} (expected {:?})", actual, expected);
        }
    }

    #[test]
    fn test_shadow_prices_maximization() {
        // Maximize 3x + 2y, x + y <= 4, x <= 3, y <= 3
        let mut problem = LpProblem::new(vec!["x".to_string(), "y".to_string()]);
        problem.set_objective(vec![3.0, 2.0], false);
        problem.add_constraint("sum", vec![1.0, 1.0], ConstraintOp::Le, 4.0);
        problem.add_constraint("x_max", vec![1.0, 0.0], ConstraintOp::Le, 3.0);
        problem.add_constraint("y_max", vec![0.0, 1.0], ConstraintOp::Le, 3.0);

        let solution = analyzed().solve(&problem).unwrap();
        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert!((solution.objective_value.unwrap() - 11.0).abs() < 1e-6);

        let analysis = solution.analysis.as_ref().unwrap();
        assert_eq!(analysis.binding_constraints, vec!["sum", "x_max"]);
        assert_eq!(analysis.shadow_prices[0].constraint, "sum");
        assert_close(&prices(&solution), &[2.0, 1.0, 0.0]);
    }

    #[test]
    fn test_shadow_prices_minimization() {
        // Minimize 2x + 3y, x + y >= 4, x <= 3
        let mut problem = LpProblem::new(vec!["x".to_string(), "y".to_string()]);
        problem.set_objective(vec![2.0, 3.0], true);
        problem.add_constraint("sum", vec![1.0, 1.0], ConstraintOp::Ge, 4.0);
        problem.add_constraint("x_max", vec![1.0, 0.0], ConstraintOp::Le, 3.0);

        let solution = analyzed().solve(&problem).unwrap();
        assert!((solution.objective_value.unwrap() - 9.0).abs() < 1e-6);
        assert_close(&prices(&solution), &[3.0, -1.0]);
    }

    #[test]
    fn test_shadow_price_of_equality() {
        // Maximize x + y, x + y = 5, y <= 2
        let mut problem = LpProblem::new(vec!["x".to_string(), "y".to_string()]);
        problem.set_objective(vec![1.0, 1.0], false);
        problem.add_constraint("total", vec![1.0, 1.0], ConstraintOp::Eq, 5.0);
        problem.add_constraint("y_cap", vec![0.0, 1.0], ConstraintOp::Le, 2.0);

        let solution = analyzed().solve(&problem).unwrap();
        assert_close(&prices(&solution), &[1.0, 0.0]);
        assert!(solution.analysis.unwrap().binding_constraints.contains(&"total".to_string()));
    }

    #[test]
    fn test_bound_duals_are_not_reported() {
        // Minimize 2x + 3y, 1 <= x, x + y >= 4, y <= 2
        let mut problem = LpProblem::with_variables(vec![
            VariableDef::non_negative("x").with_bounds(1.0, f64::INFINITY),
            VariableDef::non_negative("y"),
        ]);
        problem.set_objective(vec![2.0, 3.0], true);
        problem.add_constraint("sum", vec![1.0, 1.0], ConstraintOp::Ge, 4.0);
        problem.add_constraint("y_cap", vec![0.0, 1.0], ConstraintOp::Le, 2.0);

        let solution = analyzed().solve(&problem).unwrap();
        let objective = solution.objective_value.unwrap();
        assert!((objective - 8.0).abs() < 1e-6);
        assert_close(&prices(&solution), &[2.0, 0.0]);

        // Strong duality over the reported rows
        let dual_objective: f64 = problem
            .constraints
            .iter()
            .zip(prices(&solution))
            .map(|(c, price)| c.rhs * price)
            .sum();
        assert!((dual_objective - objective).abs() < 1e-6);
    }

    #[test]
    fn test_negative_lower_bound_skips_shadow_prices() {
        let mut problem =
            LpProblem::with_variables(vec![VariableDef::non_negative("x").with_bounds(-1.0, 3.0)]);
        problem.set_objective(vec![1.0], false);
        problem.add_constraint("cap", vec![1.0], ConstraintOp::Le, 2.0);

        let solution = analyzed().solve(&problem).unwrap();
        let analysis = solution.analysis.unwrap();
        assert_eq!(analysis.binding_constraints, vec!["cap"]);
        assert!(analysis.shadow_prices.is_empty());
    }

    #[test]
    fn test_infeasible_reports_relaxed_violations() {
        // x >= 5, x <= 3
        let mut problem = LpProblem::new(vec!["x".to_string()]);
        problem.set_objective(vec![1.0], true);
        problem.add_constraint("lower", vec![1.0], ConstraintOp::Ge, 5.0);
        problem.add_constraint("upper", vec![1.0], ConstraintOp::Le, 3.0);

        let solution = analyzed().solve(&problem).unwrap();
        assert_eq!(solution.status, SolutionStatus::Infeasible);
        assert!(solution.values.is_none());
        assert!(solution.analysis.is_none());
        assert_eq!(solution.violations.len(), 1);
        assert_eq!(solution.violations[0].constraint, "lower");
        assert!((solution.violations[0].violation_amount - 5.0).abs() < 1e-6);
        assert!(solution.violations[0].description.contains("below minimum"));
    }

    #[test]
    fn test_conflicting_rows_are_reported() {
        // The relaxed problem keeps x <= 2 and x = 5, which is still infeasible
        let mut problem = LpProblem::new(vec!["x".to_string()]);
        problem.set_objective(vec![1.0], false);
        problem.add_constraint("floor", vec![1.0], ConstraintOp::Ge, 10.0);
        problem.add_constraint("cap", vec![1.0], ConstraintOp::Le, 2.0);
        problem.add_constraint("exact", vec![1.0], ConstraintOp::Eq, 5.0);

        let solution = analyzed().solve(&problem).unwrap();
        assert_eq!(solution.status, SolutionStatus::Infeasible);
        assert_eq!(solution.violations.len(), 1);

        let conflict = &solution.violations[0];
        assert_eq!(conflict.constraint, "floor vs cap");
        assert!((conflict.violation_amount - 8.0).abs() < 1e-12);
        assert!(conflict.description.starts_with("Conflict: floor requires >= 10.00"));
    }

    #[test]
    fn test_unbounded_passes_through() {
        let mut problem = LpProblem::new(vec!["x".to_string()]);
        problem.set_objective(vec![1.0], false);
        problem.add_constraint("floor", vec![1.0], ConstraintOp::Ge, 1.0);

        let solver = analyzed();
        assert_eq!(solver.name(), MicrolpSolver::NAME);
        let solution = solver.solve(&problem).unwrap();
        assert_eq!(solution.status, SolutionStatus::Unbounded);
        assert!(solution.analysis.is_none());
        assert!(solution.violations.is_empty());
    }

    /// Reports infeasible whenever the original has `>=` rows
    struct FloorBlind;

    impl LpSolver for FloorBlind {
        fn name(&self) -> &'static str {
            "floor-blind"
        }

        fn solve(&self, problem: &LpProblem) -> Result<Solution, SolverError> {
            if problem.constraints.iter().any(|c| c.op == ConstraintOp::Ge) {
                Ok(Solution::infeasible())
            } else {
                MicrolpSolver.solve(problem)
            }
        }
    }

    #[test]
    fn test_infeasible_status_is_kept_when_relaxed_point_fits() {
        // max x, x >= 1, x <= 3: the relaxed optimum x = 3 satisfies every row
        let mut problem = LpProblem::new(vec!["x".to_string()]);
        problem.set_objective(vec![1.0], false);
        problem.add_constraint("floor", vec![1.0], ConstraintOp::Ge, 1.0);
        problem.add_constraint("cap", vec![1.0], ConstraintOp::Le, 3.0);

        let solution = Analyzed::new(FloorBlind).solve(&problem).unwrap();
        assert_eq!(solution.status, SolutionStatus::Infeasible);
        assert!(solution.values.is_none());
        assert!(solution.objective_value.is_none());
        assert!(solution.violations.is_empty());
    }

    #[test]
    fn test_loose_tolerance_keeps_infeasible() {
        // A relative slack of 0.9 * (1 + 5) hides the x >= 5 violation
        let mut problem = LpProblem::new(vec!["x".to_string()]);
        problem.set_objective(vec![1.0], true);
        problem.add_constraint("lower", vec![1.0], ConstraintOp::Ge, 5.0);
        problem.add_constraint("upper", vec![1.0], ConstraintOp::Le, 3.0);

        let solver = analyzed().with_tolerance(0.9).unwrap();
        let solution = solver.solve(&problem).unwrap();
        assert_eq!(solution.status, SolutionStatus::Infeasible);
        assert!(solution.values.is_none());
        assert!(solution.violations.is_empty());
    }

    #[test]
    fn test_invalid_tolerance_is_rejected() {
        for tol in [f64::NAN, -1e-9, 1.0, f64::INFINITY] {
            match analyzed().with_tolerance(tol) {
                Err(SolverError::InvalidTolerance(_)) => {}
                other => panic!("tolerance {} accepted: {:?}", tol, other.map(|_| ())),
            }
        }
        assert!(analyzed().with_tolerance(0.0).is_ok());
        assert!(analyzed().with_tolerance(1e-3).is_ok());
    }
}
