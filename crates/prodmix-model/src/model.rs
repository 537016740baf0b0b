use prodmix_solver::{
    ConstraintOp, ConstraintViolation, LpProblem, LpSolver, Solution, SolutionStatus, VariableDef,
};
use tracing::debug;

use crate::error::ModelError;
use crate::plan::{PlanData, Product, Shift, VarKey};

/// The production-planning LP, ready to hand to any [`LpSolver`]
#[derive(Debug, Clone)]
pub struct ProductionModel {
    data: PlanData,
    problem: LpProblem,
}

/// Solver output paired with the tables it was solved against
#[derive(Debug, Clone)]
pub struct PlanSolution {
    data: PlanData,
    solution: Solution,
}

/// Builds the variables, objective and constraints for `data`.
///
/// Rows are labor caps per shift, the material cap, capacity caps per product
/// and demand floors per product, in that order.
pub fn build(data: &PlanData) -> ProductionModel {
    let variables = VarKey::all().map(|key| VariableDef::non_negative(key.name())).collect();
    let mut problem = LpProblem::with_variables(variables);

    problem.set_objective(VarKey::all().map(|key| data.profit(key)).collect(), false);

    for shift in Shift::ALL {
        let coefficients = row(|key| if key.shift == shift { data.labor_rate(key) } else { 0.0 });
        problem.add_constraint(
            format!("Labor_Hours_{}", shift),
            coefficients,
            ConstraintOp::Le,
            data.labor_cap(shift),
        );
    }

    let coefficients = row(|key| data.material_rate(key.product));
    problem.add_constraint(
        "Material_Constraint",
        coefficients,
        ConstraintOp::Le,
        data.material_cap,
    );

    for product in Product::ALL {
        problem.add_constraint(
            format!("Max_Capacity_{}", product),
            product_sum(product),
            ConstraintOp::Le,
            data.capacity(product),
        );
    }

    for product in Product::ALL {
        problem.add_constraint(
            format!("Min_Demand_{}", product),
            product_sum(product),
            ConstraintOp::Ge,
            data.demand(product),
        );
    }

    debug!(
        component = "model",
        operation = "build",
        variables = problem.num_variables() as u64,
        constraints = problem.num_constraints() as u64,
        "Built production model"
    );

    ProductionModel { data: *data, problem }
}

/// Solves `model` with `solver`.
///
/// Infeasible or unbounded outcomes are `Ok`; only a failure to run the
/// backend is an error.
pub fn solve(model: &ProductionModel, solver: &dyn LpSolver) -> Result<PlanSolution, ModelError> {
    let solution = solver.solve(&model.problem)?;

    debug!(
        component = "model",
        operation = "solve",
        backend = solver.name(),
        status = solution.status.as_str(),
        "Solved production model"
    );

    Ok(PlanSolution {
        data: model.data,
        solution,
    })
}

fn row(coefficient: impl Fn(VarKey) -> f64) -> Vec<f64> {
    VarKey::all().map(coefficient).collect()
}

fn product_sum(product: Product) -> Vec<f64> {
    row(|key| if key.product == product { 1.0 } else { 0.0 })
}

impl ProductionModel {
    pub fn data(&self) -> &PlanData {
        &self.data
    }

    pub fn problem(&self) -> &LpProblem {
        &self.problem
    }

    /// Rows and bounds that `values` violates, worst first
    pub fn check(&self, values: &[f64], tolerance: f64) -> Vec<ConstraintViolation> {
        self.problem.violations(values, tolerance)
    }
}

impl PlanSolution {
    pub fn status(&self) -> SolutionStatus {
        self.solution.status
    }

    pub fn solution(&self) -> &Solution {
        &self.solution
    }

    /// Units of `key` to produce; `None` unless optimal
    pub fn value(&self, key: VarKey) -> Option<f64> {
        self.solution.value(key.column())
    }

    /// Total profit; `None` unless optimal
    pub fn objective(&self) -> Option<f64> {
        self.solution.objective_value
    }

    /// Units of `product` across all shifts
    pub fn product_total(&self, product: Product) -> Option<f64> {
        self.sum(|key| if key.product == product { 1.0 } else { 0.0 })
    }

    /// Labor hours consumed in `shift`
    pub fn shift_labor(&self, shift: Shift) -> Option<f64> {
        self.sum(|key| if key.shift == shift { self.data.labor_rate(key) } else { 0.0 })
    }

    pub fn material_used(&self) -> Option<f64> {
        self.sum(|key| self.data.material_rate(key.product))
    }

    fn sum(&self, weight: impl Fn(VarKey) -> f64) -> Option<f64> {
        VarKey::all().map(|key| Some(weight(key) * self.value(key)?)).sum()
    }
}
