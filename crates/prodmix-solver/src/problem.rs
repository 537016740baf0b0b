use crate::error::SolverError;
use crate::solution::ConstraintViolation;

/// Represents a linear programming problem
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct LpProblem {
    /// Decision variables, in column order
    pub variables: Vec<VariableDef>,
    /// Objective function coefficients
    pub objective: Objective,
    /// Constraints
    pub constraints: Vec<Constraint>,
}

/// A continuous decision variable with simple bounds
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDef {
    pub name: String,
    pub lower: f64,
    /// `f64::INFINITY` when unbounded above
    pub upper: f64,
}

impl VariableDef {
    /// A variable bounded below by zero and unbounded above
    pub fn non_negative(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lower: 0.0,
            upper: f64::INFINITY,
        }
    }

    pub fn with_bounds(mut self, lower: f64, upper: f64) -> Self {
        self.lower = lower;
        self.upper = upper;
        self
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct Objective {
    /// Coefficients for each variable
    pub coefficients: Vec<f64>,
    /// Whether to minimize or maximize
    pub minimize: bool,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct Constraint {
    /// Name/label for the constraint (for diagnostics)
    pub name: String,
    /// Coefficients for each variable
    pub coefficients: Vec<f64>,
    /// Comparison operator
    pub op: ConstraintOp,
    /// Right-hand side value
    pub rhs: f64,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintOp {
    /// Less than or equal (<=)
    Le,
    /// Greater than or equal (>=)
    Ge,
    /// Equal (=)
    Eq,
}

impl Constraint {
    /// Left-hand side evaluated at `values`
    pub fn lhs(&self, values: &[f64]) -> f64 {
        self.coefficients
            .iter()
            .zip(values)
            .map(|(coef, value)| coef * value)
            .sum()
    }
}

impl LpProblem {
    /// Creates a problem whose variables are all non-negative and unbounded above
    pub fn new(names: Vec<String>) -> Self {
        Self::with_variables(names.into_iter().map(VariableDef::non_negative).collect())
    }

    pub fn with_variables(variables: Vec<VariableDef>) -> Self {
        let n = variables.len();
        Self {
            variables,
            objective: Objective {
                coefficients: vec![0.0; n],
                minimize: true,
            },
            constraints: Vec::new(),
        }
    }

    pub fn set_objective(&mut self, coefficients: Vec<f64>, minimize: bool) {
        self.objective = Objective { coefficients, minimize };
    }

    pub fn add_constraint(
        &mut self,
        name: impl Into<String>,
        coefficients: Vec<f64>,
        op: ConstraintOp,
        rhs: f64,
    ) {
        self.constraints.push(Constraint {
            name: name.into(),
            coefficients,
            op,
            rhs,
        });
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Objective evaluated at `values`
    pub fn objective_at(&self, values: &[f64]) -> f64 {
        self.objective
            .coefficients
            .iter()
            .zip(values)
            .map(|(coef, value)| coef * value)
            .sum()
    }

    /// Constraints and variable bounds violated by `values`, worst first.
    /// `tolerance` is relative to the magnitude of each bound.
    pub fn violations(&self, values: &[f64], tolerance: f64) -> Vec<ConstraintViolation> {
        let mut violations = Vec::new();

        for c in &self.constraints {
            let lhs = c.lhs(values);
            let slack = tolerance * (1.0 + c.rhs.abs());

            let violation = match c.op {
                ConstraintOp::Le if lhs > c.rhs + slack => {
                    let amt = lhs - c.rhs;
                    Some((amt, format!("{} exceeds maximum of {:.2} by {:.2}", c.name, c.rhs, amt)))
                }
                ConstraintOp::Ge if lhs < c.rhs - slack => {
                    let amt = c.rhs - lhs;
                    let description =
                        format!("{} is below minimum of {:.2} by {:.2}", c.name, c.rhs, amt);
                    Some((amt, description))
                }
                ConstraintOp::Eq if (lhs - c.rhs).abs() > slack => Some((
                    (lhs - c.rhs).abs(),
                    format!("{} requires exactly {:.2} but got {:.2}", c.name, c.rhs, lhs),
                )),
                _ => None,
            };

            if let Some((violation_amount, description)) = violation {
                violations.push(ConstraintViolation {
                    constraint: c.name.clone(),
                    required: c.rhs,
                    actual: lhs,
                    violation_amount,
                    description,
                });
            }
        }

        for (var, &value) in self.variables.iter().zip(values) {
            if value < var.lower - tolerance * (1.0 + var.lower.abs()) {
                violations.push(ConstraintViolation {
                    constraint: var.name.clone(),
                    required: var.lower,
                    actual: value,
                    violation_amount: var.lower - value,
                    description: format!(
                        "{} is below its lower bound of {:.2}",
                        var.name, var.lower
                    ),
                });
            } else if value > var.upper + tolerance * (1.0 + var.upper.abs()) {
                violations.push(ConstraintViolation {
                    constraint: var.name.clone(),
                    required: var.upper,
                    actual: value,
                    violation_amount: value - var.upper,
                    description: format!(
                        "{} is above its upper bound of {:.2}",
                        var.name, var.upper
                    ),
                });
            }
        }

        violations.sort_by(|a, b| b.violation_amount.total_cmp(&a.violation_amount));
        violations
    }

    /// Checks dimensions, finiteness and bound ordering.
    pub fn validate(&self) -> Result<(), SolverError> {
        let n = self.num_variables();
        if n == 0 {
            return Err(SolverError::EmptyModel);
        }

        if self.objective.coefficients.len() != n {
            return Err(SolverError::DimensionMismatch {
                row: "objective".to_string(),
                expected: n,
                found: self.objective.coefficients.len(),
            });
        }
        if self.objective.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(SolverError::NonFinite("objective".to_string()));
        }

        for var in &self.variables {
            if !var.lower.is_finite() || var.upper.is_nan() || var.lower > var.upper {
                return Err(SolverError::InvalidBounds {
                    variable: var.name.clone(),
                    lower: var.lower,
                    upper: var.upper,
                });
            }
        }

        for c in &self.constraints {
            if c.coefficients.len() != n {
                return Err(SolverError::DimensionMismatch {
                    row: c.name.clone(),
                    expected: n,
                    found: c.coefficients.len(),
                });
            }
            if !c.rhs.is_finite() || c.coefficients.iter().any(|x| !x.is_finite()) {
                return Err(SolverError::NonFinite(c.name.clone()));
            }
        }

        Ok(())
    }
}
