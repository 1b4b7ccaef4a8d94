//! Builds a submittable report from validated line items.

use chrono::{DateTime, NaiveDate, Utc};

use super::domain::{
    ExpensePolicy, ExpenseReport, ExpenseType, ExpenseTypeId, LineItem, PolicyId, ReportId,
    ReportStatus, UserId,
};
use super::evaluation::{EvaluationError, EvaluationInput, RuleEvaluator};

/// Why a draft cannot accept an item or be finished.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AssemblyError {
    #[error("expense type {0} already has a line item in this report")]
    DuplicateExpenseType(ExpenseTypeId),
    #[error("policy defines no rule for expense type {0}")]
    NoRuleForType(ExpenseTypeId),
    #[error("expense type {0} is not active")]
    InactiveExpenseType(ExpenseTypeId),
    #[error("a report needs at least one line item")]
    EmptyReport,
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
}

/// A report under construction. Line items enter only through
/// [`ReportDraft::add_line_item`], which keeps every draft invariant intact.
#[derive(Debug, Clone)]
pub struct ReportDraft {
    employee_id: UserId,
    date: NaiveDate,
    policy_id: PolicyId,
    items: Vec<LineItem>,
}

impl ReportDraft {
    pub fn new(employee_id: UserId, date: NaiveDate, policy_id: PolicyId) -> Self {
        Self {
            employee_id,
            date,
            policy_id,
            items: Vec::new(),
        }
    }

    pub fn policy_id(&self) -> &PolicyId {
        &self.policy_id
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Expense types still selectable for this draft: active, governed by a
    /// rule in the policy, and not yet used (at most one item per type).
    pub fn available_types<'a>(
        &self,
        policy: &ExpensePolicy,
        types: &'a [ExpenseType],
    ) -> Vec<&'a ExpenseType> {
        types
            .iter()
            .filter(|ty| ty.is_active)
            .filter(|ty| policy.rule_for(&ty.id).is_some())
            .filter(|ty| !self.uses_type(&ty.id))
            .collect()
    }

    fn uses_type(&self, expense_type_id: &ExpenseTypeId) -> bool {
        self.items
            .iter()
            .any(|item| &item.expense_type_id == expense_type_id)
    }

    /// Validate one line item against the policy's rule and append it.
    pub fn add_line_item(
        &mut self,
        policy: &ExpensePolicy,
        types: &[ExpenseType],
        evaluator: &RuleEvaluator,
        expense_type_id: ExpenseTypeId,
        input: EvaluationInput,
        description: String,
    ) -> Result<(), AssemblyError> {
        if self.uses_type(&expense_type_id) {
            return Err(AssemblyError::DuplicateExpenseType(expense_type_id));
        }

        if let Some(ty) = types.iter().find(|ty| ty.id == expense_type_id) {
            if !ty.is_active {
                return Err(AssemblyError::InactiveExpenseType(expense_type_id));
            }
        }

        let rule = policy
            .rule_for(&expense_type_id)
            .ok_or_else(|| AssemblyError::NoRuleForType(expense_type_id.clone()))?;

        let evaluation = evaluator.evaluate(rule, &input)?;

        self.items.push(LineItem {
            expense_type_id,
            amount: evaluation.amount,
            description,
            receipt_url: input.receipt_url,
            travel: input.travel,
        });

        Ok(())
    }

    /// Seal the draft into a PENDING report. The store assigns the final id
    /// on insertion.
    pub fn finish(self, submitted_at: DateTime<Utc>) -> Result<ExpenseReport, AssemblyError> {
        if self.items.is_empty() {
            return Err(AssemblyError::EmptyReport);
        }

        Ok(ExpenseReport {
            id: ReportId("pending".to_string()),
            employee_id: self.employee_id,
            date: self.date,
            policy_id: self.policy_id,
            items: self.items,
            status: ReportStatus::Pending,
            submitted_at,
            approved_by: None,
            approved_at: None,
            rejection_reason: None,
            reimbursed_at: None,
        })
    }
}
