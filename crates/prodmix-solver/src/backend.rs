use crate::error::SolverError;
use crate::microlp_backend::MicrolpSolver;
use crate::problem::LpProblem;
use crate::solution::Solution;

/// A general-purpose LP solver.
///
/// Implementations validate the problem, run to completion and report the
/// outcome through [`Solution::status`]. An `Err` means the backend could not
/// be invoked at all.
pub trait LpSolver {
    /// Short backend identifier, as accepted by [`backend_by_name`]
    fn name(&self) -> &'static str;

    fn solve(&self, problem: &LpProblem) -> Result<Solution, SolverError>;
}

impl<S: LpSolver + ?Sized> LpSolver for Box<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn solve(&self, problem: &LpProblem) -> Result<Solution, SolverError> {
        (**self).solve(problem)
    }
}

/// Names accepted by [`backend_by_name`]
pub fn available_backends() -> Vec<&'static str> {
    vec![MicrolpSolver::NAME]
}

/// Looks up a backend with default settings.
pub fn backend_by_name(name: &str) -> Result<Box<dyn LpSolver>, SolverError> {
    match name {
        MicrolpSolver::NAME => Ok(Box::new(MicrolpSolver)),
        other => Err(SolverError::BackendUnavailable(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listed_backends_resolve() {
        for name in available_backends() {
            let solver = backend_by_name(name).unwrap();
            assert_eq!(solver.name(), name);
        }
    }

    #[test]
    fn test_unknown_backend_is_an_error() {
        match backend_by_name("cplex") {
            Err(SolverError::BackendUnavailable(name)) => assert_eq!(name, "cplex"),
            Err(other) => panic!("unexpected error {:?}", other),
            Ok(solver) => panic!("unexpected backend {}", solver.name()),
        }
    }
}
