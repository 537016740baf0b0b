mod analysis;
mod backend;
mod error;
mod microlp_backend;
mod problem;
mod solution;

pub use analysis::{Analyzed, BINDING_TOLERANCE};
pub use backend::{LpSolver, available_backends, backend_by_name};
pub use error::SolverError;
pub use microlp_backend::MicrolpSolver;
pub use problem::{Constraint, ConstraintOp, LpProblem, Objective, VariableDef};
pub use solution::{Analysis, ConstraintViolation, ShadowPrice, Solution, SolutionStatus};
