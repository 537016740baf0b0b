//! Production planning for three products over two regular shifts and
//! overtime, formulated as an LP and handed to any [`LpSolver`].
//!
//! ```no_run
//! use prodmix_model::{PlanData, build, report, solve};
//! use prodmix_solver::MicrolpSolver;
//!
//! let model = build(&PlanData::standard());
//! let plan = solve(&model, &MicrolpSolver)?;
//! report(&model, &plan, &mut std::io::stdout())?;
//! # Ok::<(), prodmix_model::ModelError>(())
//! ```

mod error;
mod model;
mod plan;
mod report;

pub use error::ModelError;
pub use model::{PlanSolution, ProductionModel, build, solve};
pub use plan::{PlanData, Product, Shift, VarKey};
pub use prodmix_solver::LpSolver;
pub use report::{MISSING, PlanReport, ShadowPriceReport, VariableReport, report, report_analysis};
