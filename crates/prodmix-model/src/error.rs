use prodmix_solver::SolverError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),
    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),
}
