use microlp::{ComparisonOp, OptimizationDirection, Problem};
use tracing::debug;

use crate::backend::LpSolver;
use crate::error::SolverError;
use crate::problem::{ConstraintOp, LpProblem};
use crate::solution::Solution;

/// Adapter over the `microlp` sparse simplex.
///
/// `microlp` does not expose duals; wrap it in [`Analyzed`](crate::Analyzed)
/// for shadow prices and infeasibility diagnostics.
#[derive(Debug, Clone, Copy, Default)]
pub struct MicrolpSolver;

impl MicrolpSolver {
    pub const NAME: &'static str = "microlp";
}

impl LpSolver for MicrolpSolver {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn solve(&self, problem: &LpProblem) -> Result<Solution, SolverError> {
        problem.validate()?;

        let direction = if problem.objective.minimize {
            OptimizationDirection::Minimize
        } else {
            OptimizationDirection::Maximize
        };
        let mut lp = Problem::new(direction);

        let vars: Vec<_> = problem
            .variables
            .iter()
            .zip(&problem.objective.coefficients)
            .map(|(var, &coef)| lp.add_var(coef, (var.lower, var.upper)))
            .collect();

        for c in &problem.constraints {
            // microlp stores rows sparsely
            let terms: Vec<_> = vars
                .iter()
                .zip(&c.coefficients)
                .filter(|(_, coef)| **coef != 0.0)
                .map(|(&var, &coef)| (var, coef))
                .collect();
            let op = match c.op {
                ConstraintOp::Le => ComparisonOp::Le,
                ConstraintOp::Ge => ComparisonOp::Ge,
                ConstraintOp::Eq => ComparisonOp::Eq,
            };
            lp.add_constraint(terms, op, c.rhs);
        }

        debug!(
            component = "microlp",
            operation = "solve",
            variables = problem.num_variables() as u64,
            constraints = problem.num_constraints() as u64,
            "Solving LP"
        );

        let solution = match lp.solve() {
            Ok(solved) => {
                let values: Vec<f64> = vars.iter().map(|&var| solved[var]).collect();
                Solution::optimal(values, solved.objective())
            }
            Err(microlp::Error::Infeasible) => Solution::infeasible(),
            Err(microlp::Error::Unbounded) => Solution::unbounded(),
            Err(microlp::Error::InternalError(msg)) => return Err(SolverError::Backend(msg)),
        };

        debug!(
            component = "microlp",
            operation = "solve",
            status = solution.status.as_str(),
            "LP solved"
        );
        Ok(solution)
    }
}
