//! Computes the reimbursable amount for one expense-type line item.

mod fare;

pub use fare::{DistanceTable, FareSchedule, DEFAULT_RATE_PER_KM};

use serde::{Deserialize, Serialize};

use super::domain::{
    CalculationMethod, ComparisonOperator, ExpenseRule, RuleValue, TravelDetails,
};

/// Raw form inputs accompanying an expense-type selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entered_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub travel: Option<TravelDetails>,
}

/// Why a line item cannot be added. The defective input stays in edit state;
/// nothing is partially recorded.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvaluationError {
    #[error("an entered amount is required for actual-value rules")]
    AmountRequired,
    #[error("entered amount {entered} violates limit {operator} {limit}")]
    LimitExceeded {
        operator: ComparisonOperator,
        limit: f64,
        entered: f64,
    },
    #[error("a receipt attachment is required when a limit applies")]
    ReceiptRequired,
    #[error("travel details are required for calculated rules")]
    TravelDetailsRequired,
}

/// Validated amount for a line item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub amount: f64,
}

/// Stateless evaluator applying a rule's valuation strategy to form inputs.
#[derive(Debug, Clone, Default)]
pub struct RuleEvaluator {
    fares: FareSchedule,
}

impl RuleEvaluator {
    pub fn new(fares: FareSchedule) -> Self {
        Self { fares }
    }

    pub fn fares(&self) -> &FareSchedule {
        &self.fares
    }

    pub fn evaluate(
        &self,
        rule: &ExpenseRule,
        input: &EvaluationInput,
    ) -> Result<Evaluation, EvaluationError> {
        match &rule.value {
            RuleValue::Constant { amount } => Ok(Evaluation { amount: *amount }),
            RuleValue::Actual {
                operator,
                limit_amount,
            } => {
                let entered = input.entered_amount.ok_or(EvaluationError::AmountRequired)?;
                if let Some(limit) = limit_amount {
                    if !operator.holds(entered, *limit) {
                        return Err(EvaluationError::LimitExceeded {
                            operator: *operator,
                            limit: *limit,
                            entered,
                        });
                    }
                    if input.receipt_url.as_deref().map_or(true, str::is_empty) {
                        return Err(EvaluationError::ReceiptRequired);
                    }
                }
                Ok(Evaluation { amount: entered })
            }
            RuleValue::Calculated { method } => {
                let travel = input
                    .travel
                    .as_ref()
                    .ok_or(EvaluationError::TravelDetailsRequired)?;
                let amount = match method {
                    CalculationMethod::TravelFare => self.fares.fare(travel),
                };
                Ok(Evaluation { amount })
            }
        }
    }
}
