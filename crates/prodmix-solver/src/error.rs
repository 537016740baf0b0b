use thiserror::Error;

/// Failures that prevent a solver from producing any [`Solution`](crate::Solution).
///
/// A problem that is infeasible or unbounded is not an error; it is reported
/// through [`SolutionStatus`](crate::SolutionStatus).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("Model has no variables")]
    EmptyModel,
    #[error("Row {row} has {found} coefficients, expected {expected}")]
    DimensionMismatch {
        row: String,
        expected: usize,
        found: usize,
    },
    #[error("Non-finite coefficient or right-hand side in {0}")]
    NonFinite(String),
    #[error("Invalid bounds for {variable}: [{lower}, {upper}]")]
    InvalidBounds { variable: String, lower: f64, upper: f64 },
    #[error("Tolerance must be in [0, 1), got {0}")]
    InvalidTolerance(f64),
    #[error("Solver backend unavailable: {0}")]
    BackendUnavailable(String),
    #[error("Solver backend failed: {0}")]
    Backend(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SolverError::DimensionMismatch {
            row: "Labor".to_string(),
            expected: 9,
            found: 3,
        };
        assert_eq!(err.to_string(), "Row Labor has 3 coefficients, expected 9");

        let err = SolverError::BackendUnavailable("glpk".to_string());
        assert_eq!(err.to_string(), "Solver backend unavailable: glpk");
    }
}
