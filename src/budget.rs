//! Budget planning
//!
//! Splits a total trip budget across the four spending categories according
//! to the slider weights the user picked.

use serde::{Deserialize, Serialize};

use crate::{Result, TripSyncError};

/// Chart labels, in the same order as [`BudgetBreakdown::as_series`]
pub const CATEGORY_LABELS: [&str; 4] = ["Transport", "Accommodation", "Food", "Activities"];

/// Largest budget accepted, in won. Keeps card arithmetic inside `i64`.
pub const MAX_BUDGET: u64 = 1_000_000_000_000_000;

/// Relative slider weights for each spending category
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct BudgetWeights {
    pub transport: u32,
    pub accommodation: u32,
    pub food: u32,
    pub activity: u32,
}

impl Default for BudgetWeights {
    fn default() -> Self {
        Self {
            transport: 30,
            accommodation: 40,
            food: 20,
            activity: 10,
        }
    }
}

impl BudgetWeights {
    #[must_use]
    pub fn total(&self) -> u64 {
        u64::from(self.transport)
            + u64::from(self.accommodation)
            + u64::from(self.food)
            + u64::from(self.activity)
    }
}

/// Budget shares per category, in won
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub struct BudgetBreakdown {
    pub transport: u64,
    pub accommodation: u64,
    pub food: u64,
    pub activity: u64,
}

impl BudgetBreakdown {
    /// Split `budget` proportionally to `weights`. Each share is rounded on
    /// its own, so the shares may drift from the budget by a few won.
    pub fn compute(budget: u64, weights: &BudgetWeights) -> Result<Self> {
        check_budget(budget)?;
        let total = weights.total();
        if total == 0 {
            return Err(TripSyncError::validation(
                "At least one budget category must have a non-zero weight.",
            ));
        }

        let share = |weight: u32| -> u64 {
            (budget as f64 * (f64::from(weight) / total as f64)).round() as u64
        };

        Ok(Self {
            transport: share(weights.transport),
            accommodation: share(weights.accommodation),
            food: share(weights.food),
            activity: share(weights.activity),
        })
    }

    /// Sum of all category shares
    #[must_use]
    pub fn estimated_spending(&self) -> u64 {
        self.transport + self.accommodation + self.food + self.activity
    }

    /// Shares as a chart series, ordered like [`CATEGORY_LABELS`]
    #[must_use]
    pub fn as_series(&self) -> [u64; 4] {
        [self.transport, self.accommodation, self.food, self.activity]
    }
}

fn check_budget(budget: u64) -> Result<()> {
    if budget > MAX_BUDGET {
        return Err(TripSyncError::validation(format!(
            "Budget cannot exceed {MAX_BUDGET} won."
        )));
    }
    Ok(())
}

/// Totals shown on the budget cards
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub struct BudgetSummary {
    pub total_budget: u64,
    pub estimated_spending: u64,
    /// Negative when rounding pushes spending over the budget
    pub remaining: i64,
}

impl BudgetSummary {
    #[must_use]
    pub fn new(total_budget: u64, breakdown: &BudgetBreakdown) -> Self {
        let estimated_spending = breakdown.estimated_spending();
        Self {
            total_budget,
            estimated_spending,
            remaining: total_budget as i64 - estimated_spending as i64,
        }
    }
}

/// Result of a budget update: shares, card totals and the doughnut series
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct BudgetPlan {
    pub breakdown: BudgetBreakdown,
    pub summary: BudgetSummary,
    pub labels: [String; 4],
    pub series: [u64; 4],
}

impl BudgetPlan {
    /// All-zero plan shown before any budget is entered
    #[must_use]
    pub fn empty() -> Self {
        let breakdown = BudgetBreakdown::default();
        Self {
            summary: BudgetSummary::new(0, &breakdown),
            labels: CATEGORY_LABELS.map(String::from),
            series: breakdown.as_series(),
            breakdown,
        }
    }

    /// Build a plan for `budget`. A zero budget yields an all-zero plan
    /// without looking at the weights.
    pub fn build(budget: u64, weights: &BudgetWeights) -> Result<Self> {
        check_budget(budget)?;
        let breakdown = if budget == 0 {
            BudgetBreakdown::default()
        } else {
            BudgetBreakdown::compute(budget, weights)?
        };

        Ok(Self {
            summary: BudgetSummary::new(budget, &breakdown),
            labels: CATEGORY_LABELS.map(String::from),
            series: breakdown.as_series(),
            breakdown,
        })
    }
}
