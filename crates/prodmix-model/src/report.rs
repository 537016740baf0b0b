use std::io::Write;

use crate::error::ModelError;
use crate::model::{PlanSolution, ProductionModel};
use crate::plan::VarKey;

/// Marker printed for values the solver did not produce
pub const MISSING: &str = "None";

/// Everything the report prints, in print order
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct PlanReport {
    pub status: String,
    pub variables: Vec<VariableReport>,
    pub objective: Option<f64>,
    pub binding_constraints: Vec<String>,
    pub shadow_prices: Vec<ShadowPriceReport>,
    pub violations: Vec<String>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct VariableReport {
    pub name: String,
    pub value: Option<f64>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ShadowPriceReport {
    pub constraint: String,
    pub value: f64,
}

impl PlanReport {
    pub fn new(model: &ProductionModel, plan: &PlanSolution) -> Self {
        let solution = plan.solution();

        // Columns are laid out in `VarKey::all` order
        let variables = model
            .problem()
            .variables
            .iter()
            .zip(VarKey::all())
            .map(|(var, key)| VariableReport {
                name: var.name.clone(),
                value: plan.value(key).map(normalize),
            })
            .collect();

        let (binding_constraints, shadow_prices) = match &solution.analysis {
            Some(analysis) => (
                analysis.binding_constraints.clone(),
                analysis
                    .shadow_prices
                    .iter()
                    .map(|sp| ShadowPriceReport {
                        constraint: sp.constraint.clone(),
                        value: normalize(sp.value),
                    })
                    .collect(),
            ),
            None => (Vec::new(), Vec::new()),
        };

        Self {
            status: plan.status().as_str().to_string(),
            variables,
            objective: plan.objective().map(normalize),
            binding_constraints,
            shadow_prices,
            violations: solution.violations.iter().map(|v| v.description.clone()).collect(),
        }
    }

    /// Status, one line per variable and the profit
    pub fn write_summary(&self, out: &mut impl Write) -> std::io::Result<()> {
        writeln!(out, "Status: {}", self.status)?;
        for var in &self.variables {
            writeln!(out, "Optimal value for {}: {}", var.name, format_value(var.value))?;
        }
        writeln!(out, "Maximum profit: {}", format_value(self.objective))
    }

    /// Binding rows and shadow prices, or the rows a relaxed point violates
    pub fn write_analysis(&self, out: &mut impl Write) -> std::io::Result<()> {
        writeln!(out)?;
        writeln!(out, "Analysis:")?;

        if !self.binding_constraints.is_empty() {
            writeln!(out, "Binding constraints:")?;
            for name in &self.binding_constraints {
                writeln!(out, "  - {}", name)?;
            }
        }

        let priced: Vec<_> = self
            .shadow_prices
            .iter()
            .filter(|sp| sp.value.abs() > 0.001)
            .collect();
        if !priced.is_empty() {
            writeln!(out, "Shadow prices (profit per unit of right-hand side):")?;
            for sp in priced {
                writeln!(out, "  {:30} {:10.4}", sp.constraint, sp.value)?;
            }
        }

        if !self.violations.is_empty() {
            writeln!(out, "Violated constraints at the best relaxed plan:")?;
            for description in &self.violations {
                writeln!(out, "  - {}", description)?;
            }
        }

        if self.binding_constraints.is_empty()
            && self.shadow_prices.is_empty()
            && self.violations.is_empty()
        {
            writeln!(out, "  No analysis available")?;
        }

        Ok(())
    }
}

/// Writes the status, every variable in creation order and the profit.
///
/// Values the solver did not produce are written as [`MISSING`].
pub fn report(
    model: &ProductionModel,
    plan: &PlanSolution,
    out: &mut impl Write,
) -> Result<(), ModelError> {
    PlanReport::new(model, plan).write_summary(out)?;
    Ok(())
}

/// [`report`] followed by the analysis section
pub fn report_analysis(
    model: &ProductionModel,
    plan: &PlanSolution,
    out: &mut impl Write,
) -> Result<(), ModelError> {
    let report = PlanReport::new(model, plan);
    report.write_summary(out)?;
    report.write_analysis(out)?;
    Ok(())
}

fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => MISSING.to_string(),
    }
}

/// Folds `-0.0` into `0.0` so it prints as `0`
fn normalize(value: f64) -> f64 {
    if value == 0.0 { 0.0 } else { value }
}
