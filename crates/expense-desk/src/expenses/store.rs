//! Process-wide state for users, policies, expense types, taxonomies, and
//! reports. The store owns every collection exclusively; callers mutate only
//! through the operations here and receive clones or borrows for reading.

use std::collections::BTreeSet;

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::approval::{self, TransitionError};
use super::assembler::{AssemblyError, ReportDraft};
use super::domain::{
    DropdownOption, DropdownOptionId, DropdownType, DropdownTypeId, ExpenseCategory,
    ExpensePolicy, ExpenseReport, ExpenseRule, ExpenseType, ExpenseTypeId, Grade, GroupId,
    PolicyCondition, PolicyFrequency, PolicyId, PropertyId, PropertyKind, ReportId, Role, RuleId,
    RuleValue, User, UserId, UserProperty,
};
use super::eligibility;

/// Error enumeration for store mutations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("policy not found: {0}")]
    PolicyNotFound(PolicyId),
    #[error("expense type not found: {0}")]
    ExpenseTypeNotFound(ExpenseTypeId),
    #[error("expense report not found: {0}")]
    ReportNotFound(ReportId),
    #[error("user property not found: {0}")]
    PropertyNotFound(PropertyId),
    #[error("dropdown type not found: {0}")]
    DropdownTypeNotFound(DropdownTypeId),
    #[error("policy {policy} already has a rule for expense type {expense_type}")]
    DuplicateRule {
        policy: PolicyId,
        expense_type: ExpenseTypeId,
    },
    #[error("a rule batch needs at least one positive amount")]
    EmptyRuleBatch,
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Assembly(#[from] AssemblyError),
}

impl StoreError {
    /// HTTP status the router maps this error onto.
    pub fn status_code(&self) -> StatusCode {
        match self {
            StoreError::PolicyNotFound(_)
            | StoreError::ExpenseTypeNotFound(_)
            | StoreError::ReportNotFound(_)
            | StoreError::PropertyNotFound(_)
            | StoreError::DropdownTypeNotFound(_) => StatusCode::NOT_FOUND,
            StoreError::DuplicateRule { .. }
            | StoreError::Transition(TransitionError::InvalidTransition { .. }) => {
                StatusCode::CONFLICT
            }
            StoreError::EmptyRuleBatch
            | StoreError::Transition(TransitionError::EmptyRejectionReason)
            | StoreError::Assembly(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

/// Fields for a new expense type; the store assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExpenseType {
    pub name: String,
    pub description: String,
    pub category: ExpenseCategory,
}

/// Rule fields as authored by an administrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleSpec {
    pub expense_type_id: ExpenseTypeId,
    #[serde(flatten)]
    pub value: RuleValue,
    #[serde(default)]
    pub user_conditions: Vec<PolicyCondition>,
}

/// Fields for a new policy; rules are assigned ids on insertion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPolicy {
    pub name: String,
    pub description: String,
    pub frequency: PolicyFrequency,
    #[serde(default)]
    pub conditions: Vec<PolicyCondition>,
    #[serde(default)]
    pub rules: Vec<RuleSpec>,
}

/// Top-level policy edits; rules are managed through the rule operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyUpdate {
    pub name: String,
    pub description: String,
    pub frequency: PolicyFrequency,
    pub conditions: Vec<PolicyCondition>,
}

/// One entry of a category-batch rule creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryAmount {
    pub expense_type_id: ExpenseTypeId,
    pub amount: f64,
}

/// Fields for a new user property record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUserProperty {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: PropertyKind,
    pub value: String,
}

/// Partial update for a user property record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPropertyPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<PropertyKind>,
    #[serde(default)]
    pub value: Option<String>,
}

/// Fields for a new dropdown taxonomy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDropdownType {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub options: Vec<String>,
}

/// In-memory application state. Single-writer: the HTTP layer wraps it in a
/// lock and every mutation completes before the next is admitted.
#[derive(Debug, Default)]
pub struct ExpenseStore {
    users: Vec<User>,
    expense_types: Vec<ExpenseType>,
    policies: Vec<ExpensePolicy>,
    dropdown_types: Vec<DropdownType>,
    reports: Vec<ExpenseReport>,
    properties: Vec<UserProperty>,
    sequences: Sequences,
}

#[derive(Debug, Default)]
struct Sequences {
    user: u64,
    expense_type: u64,
    policy: u64,
    rule: u64,
    group: u64,
    report: u64,
    property: u64,
    dropdown_type: u64,
    dropdown_option: u64,
}

fn next(counter: &mut u64) -> String {
    *counter += 1;
    counter.to_string()
}

impl ExpenseStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- read access -----------------------------------------------------

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn expense_types(&self) -> &[ExpenseType] {
        &self.expense_types
    }

    pub fn policies(&self) -> &[ExpensePolicy] {
        &self.policies
    }

    pub fn dropdown_types(&self) -> &[DropdownType] {
        &self.dropdown_types
    }

    pub fn reports(&self) -> &[ExpenseReport] {
        &self.reports
    }

    pub fn user_properties(&self) -> &[UserProperty] {
        &self.properties
    }

    pub fn user(&self, id: &UserId) -> Option<&User> {
        self.users.iter().find(|user| &user.id == id)
    }

    pub fn policy(&self, id: &PolicyId) -> Option<&ExpensePolicy> {
        self.policies.iter().find(|policy| &policy.id == id)
    }

    pub fn expense_type(&self, id: &ExpenseTypeId) -> Option<&ExpenseType> {
        self.expense_types.iter().find(|ty| &ty.id == id)
    }

    pub fn report(&self, id: &ReportId) -> Option<&ExpenseReport> {
        self.reports.iter().find(|report| &report.id == id)
    }

    /// Session lookup stub; a real deployment would authenticate upstream.
    pub fn login(&self, email: &str) -> Option<&User> {
        self.users
            .iter()
            .find(|user| user.email.eq_ignore_ascii_case(email.trim()))
    }

    pub fn pending_reports(&self) -> Vec<&ExpenseReport> {
        self.reports
            .iter()
            .filter(|report| report.status == super::domain::ReportStatus::Pending)
            .collect()
    }

    /// Policies whose conditions admit the user, for the submission form.
    pub fn eligible_policies(&self, user: &User) -> Vec<&ExpensePolicy> {
        eligibility::eligible_policies(&self.policies, user)
    }

    // ---- display lookups -------------------------------------------------

    pub fn employee_label(&self, id: &UserId) -> String {
        self.user(id)
            .map(|user| user.name.clone())
            .unwrap_or_else(|| "Unknown Employee".to_string())
    }

    pub fn policy_label(&self, id: &PolicyId) -> String {
        self.policy(id)
            .map(|policy| policy.name.clone())
            .unwrap_or_else(|| "Unknown Policy".to_string())
    }

    pub fn expense_type_label(&self, id: &ExpenseTypeId) -> String {
        self.expense_type(id)
            .map(|ty| ty.name.clone())
            .unwrap_or_else(|| "Unknown Type".to_string())
    }

    // ---- users -----------------------------------------------------------

    pub fn add_user(
        &mut self,
        name: &str,
        email: &str,
        role: Role,
        grade: Grade,
        position: Option<&str>,
    ) -> UserId {
        let id = UserId(next(&mut self.sequences.user));
        self.users.push(User {
            id: id.clone(),
            name: name.to_string(),
            email: email.to_string(),
            role,
            grade,
            position: position.map(str::to_string),
        });
        id
    }

    // ---- expense types ---------------------------------------------------

    pub fn add_expense_type(&mut self, fields: NewExpenseType) -> ExpenseTypeId {
        let id = ExpenseTypeId(next(&mut self.sequences.expense_type));
        debug!(%id, name = %fields.name, "expense type created");
        self.expense_types.push(ExpenseType {
            id: id.clone(),
            name: fields.name,
            description: fields.description,
            category: fields.category,
            is_active: true,
        });
        id
    }

    pub fn update_expense_type(
        &mut self,
        id: &ExpenseTypeId,
        fields: NewExpenseType,
    ) -> Result<(), StoreError> {
        let ty = self
            .expense_types
            .iter_mut()
            .find(|ty| &ty.id == id)
            .ok_or_else(|| StoreError::ExpenseTypeNotFound(id.clone()))?;
        ty.name = fields.name;
        ty.description = fields.description;
        ty.category = fields.category;
        Ok(())
    }

    /// Flip the active flag; returns the new state. Inactive types stay
    /// visible on historical reports.
    pub fn toggle_expense_type(&mut self, id: &ExpenseTypeId) -> Result<bool, StoreError> {
        let ty = self
            .expense_types
            .iter_mut()
            .find(|ty| &ty.id == id)
            .ok_or_else(|| StoreError::ExpenseTypeNotFound(id.clone()))?;
        ty.is_active = !ty.is_active;
        Ok(ty.is_active)
    }

    // ---- policies and rules ----------------------------------------------

    pub fn add_policy(&mut self, fields: NewPolicy) -> Result<PolicyId, StoreError> {
        for spec in &fields.rules {
            self.require_expense_type(&spec.expense_type_id)?;
        }

        let id = PolicyId(next(&mut self.sequences.policy));
        let mut policy = ExpensePolicy {
            id: id.clone(),
            name: fields.name,
            description: fields.description,
            frequency: fields.frequency,
            conditions: fields.conditions,
            rules: Vec::new(),
        };
        for spec in fields.rules {
            let rule = self.materialize_rule(spec, None);
            if policy.rule_for(&rule.expense_type_id).is_some() {
                return Err(StoreError::DuplicateRule {
                    policy: id,
                    expense_type: rule.expense_type_id,
                });
            }
            policy.rules.push(rule);
        }

        info!(%id, name = %policy.name, rules = policy.rules.len(), "policy created");
        self.policies.push(policy);
        Ok(id)
    }

    pub fn update_policy(&mut self, id: &PolicyId, fields: PolicyUpdate) -> Result<(), StoreError> {
        let policy = self
            .policies
            .iter_mut()
            .find(|policy| &policy.id == id)
            .ok_or_else(|| StoreError::PolicyNotFound(id.clone()))?;
        policy.name = fields.name;
        policy.description = fields.description;
        policy.frequency = fields.frequency;
        policy.conditions = fields.conditions;
        Ok(())
    }

    /// Append one rule. At most one rule per expense type is admitted.
    pub fn add_rule(&mut self, policy_id: &PolicyId, spec: RuleSpec) -> Result<RuleId, StoreError> {
        self.require_expense_type(&spec.expense_type_id)?;
        self.require_rule_slot(policy_id, &spec.expense_type_id)?;

        let rule = self.materialize_rule(spec, None);
        let rule_id = rule.id.clone();
        let policy = self
            .policies
            .iter_mut()
            .find(|policy| &policy.id == policy_id)
            .ok_or_else(|| StoreError::PolicyNotFound(policy_id.clone()))?;
        debug!(policy = %policy.id, rule = %rule_id, "rule added");
        policy.rules.push(rule);
        Ok(rule_id)
    }

    /// Category-batch rule creation: one constant-value rule per expense
    /// type, all sharing a freshly generated group id. Non-positive amounts
    /// are dropped before insertion.
    pub fn add_rule_batch(
        &mut self,
        policy_id: &PolicyId,
        amounts: Vec<CategoryAmount>,
        user_conditions: Vec<PolicyCondition>,
    ) -> Result<(GroupId, Vec<RuleId>), StoreError> {
        let amounts: Vec<CategoryAmount> = amounts
            .into_iter()
            .filter(|entry| entry.amount > 0.0)
            .collect();
        if amounts.is_empty() {
            return Err(StoreError::EmptyRuleBatch);
        }

        let mut seen = BTreeSet::new();
        for entry in &amounts {
            self.require_expense_type(&entry.expense_type_id)?;
            self.require_rule_slot(policy_id, &entry.expense_type_id)?;
            if !seen.insert(entry.expense_type_id.clone()) {
                return Err(StoreError::DuplicateRule {
                    policy: policy_id.clone(),
                    expense_type: entry.expense_type_id.clone(),
                });
            }
        }

        let group_id = GroupId(next(&mut self.sequences.group));
        let mut rule_ids = Vec::with_capacity(amounts.len());
        for entry in amounts {
            let rule = self.materialize_rule(
                RuleSpec {
                    expense_type_id: entry.expense_type_id,
                    value: RuleValue::Constant {
                        amount: entry.amount,
                    },
                    user_conditions: user_conditions.clone(),
                },
                Some(group_id.clone()),
            );
            rule_ids.push(rule.id.clone());
            let policy = self
                .policies
                .iter_mut()
                .find(|policy| &policy.id == policy_id)
                .ok_or_else(|| StoreError::PolicyNotFound(policy_id.clone()))?;
            policy.rules.push(rule);
        }

        info!(policy = %policy_id, group = %group_id, rules = rule_ids.len(), "rule batch created");
        Ok((group_id, rule_ids))
    }

    fn materialize_rule(&mut self, spec: RuleSpec, group_id: Option<GroupId>) -> ExpenseRule {
        ExpenseRule {
            id: RuleId(next(&mut self.sequences.rule)),
            group_id,
            expense_type_id: spec.expense_type_id,
            value: spec.value,
            user_conditions: spec.user_conditions,
        }
    }

    fn require_expense_type(&self, id: &ExpenseTypeId) -> Result<(), StoreError> {
        if self.expense_type(id).is_none() {
            return Err(StoreError::ExpenseTypeNotFound(id.clone()));
        }
        Ok(())
    }

    fn require_rule_slot(
        &self,
        policy_id: &PolicyId,
        expense_type_id: &ExpenseTypeId,
    ) -> Result<(), StoreError> {
        let policy = self
            .policy(policy_id)
            .ok_or_else(|| StoreError::PolicyNotFound(policy_id.clone()))?;
        if policy.rule_for(expense_type_id).is_some() {
            return Err(StoreError::DuplicateRule {
                policy: policy_id.clone(),
                expense_type: expense_type_id.clone(),
            });
        }
        Ok(())
    }

    // ---- reports ---------------------------------------------------------

    /// Seal and record a draft. Status is forced to PENDING and the store
    /// assigns the report id.
    pub fn submit_report(
        &mut self,
        draft: ReportDraft,
        submitted_at: DateTime<Utc>,
    ) -> Result<ReportId, StoreError> {
        if self.policy(draft.policy_id()).is_none() {
            return Err(StoreError::PolicyNotFound(draft.policy_id().clone()));
        }

        let mut report = draft.finish(submitted_at)?;
        report.id = ReportId(next(&mut self.sequences.report));
        let id = report.id.clone();
        info!(report = %id, employee = %report.employee_id, total = report.total_amount(), "expense report submitted");
        self.reports.push(report);
        Ok(id)
    }

    pub fn approve_report(
        &mut self,
        id: &ReportId,
        approver: &UserId,
        at: DateTime<Utc>,
    ) -> Result<ExpenseReport, StoreError> {
        let report = self.report_mut(id)?;
        approval::approve(report, approver, at)?;
        info!(report = %id, approver = %approver, "expense report approved");
        Ok(report.clone())
    }

    pub fn reject_report(&mut self, id: &ReportId, reason: &str) -> Result<ExpenseReport, StoreError> {
        let report = self.report_mut(id)?;
        approval::reject(report, reason)?;
        info!(report = %id, "expense report rejected");
        Ok(report.clone())
    }

    pub fn reimburse_report(
        &mut self,
        id: &ReportId,
        at: DateTime<Utc>,
    ) -> Result<ExpenseReport, StoreError> {
        let report = self.report_mut(id)?;
        approval::reimburse(report, at)?;
        info!(report = %id, "expense report reimbursed");
        Ok(report.clone())
    }

    fn report_mut(&mut self, id: &ReportId) -> Result<&mut ExpenseReport, StoreError> {
        self.reports
            .iter_mut()
            .find(|report| &report.id == id)
            .ok_or_else(|| StoreError::ReportNotFound(id.clone()))
    }

    // ---- user properties -------------------------------------------------

    pub fn add_user_property(&mut self, fields: NewUserProperty, now: DateTime<Utc>) -> UserProperty {
        let property = UserProperty {
            id: PropertyId(next(&mut self.sequences.property)),
            name: fields.name,
            kind: fields.kind,
            value: fields.value,
            created_at: now,
            updated_at: now,
        };
        self.properties.push(property.clone());
        property
    }

    pub fn update_user_property(
        &mut self,
        id: &PropertyId,
        patch: UserPropertyPatch,
        now: DateTime<Utc>,
    ) -> Result<UserProperty, StoreError> {
        let property = self
            .properties
            .iter_mut()
            .find(|property| &property.id == id)
            .ok_or_else(|| StoreError::PropertyNotFound(id.clone()))?;
        if let Some(name) = patch.name {
            property.name = name;
        }
        if let Some(kind) = patch.kind {
            property.kind = kind;
        }
        if let Some(value) = patch.value {
            property.value = value;
        }
        property.updated_at = now;
        Ok(property.clone())
    }

    /// The one resource that supports hard deletion.
    pub fn remove_user_property(&mut self, id: &PropertyId) -> Result<(), StoreError> {
        let index = self
            .properties
            .iter()
            .position(|property| &property.id == id)
            .ok_or_else(|| StoreError::PropertyNotFound(id.clone()))?;
        self.properties.remove(index);
        Ok(())
    }

    // ---- dropdown taxonomies ----------------------------------------------

    pub fn add_dropdown_type(&mut self, fields: NewDropdownType) -> DropdownTypeId {
        let id = DropdownTypeId(next(&mut self.sequences.dropdown_type));
        let options = fields
            .options
            .into_iter()
            .map(|value| DropdownOption {
                id: DropdownOptionId(next(&mut self.sequences.dropdown_option)),
                value,
                is_active: true,
            })
            .collect();
        self.dropdown_types.push(DropdownType {
            id: id.clone(),
            name: fields.name,
            description: fields.description,
            options,
            is_active: true,
        });
        id
    }

    pub fn update_dropdown_type(
        &mut self,
        id: &DropdownTypeId,
        name: String,
        description: String,
    ) -> Result<(), StoreError> {
        let taxonomy = self
            .dropdown_types
            .iter_mut()
            .find(|ty| &ty.id == id)
            .ok_or_else(|| StoreError::DropdownTypeNotFound(id.clone()))?;
        taxonomy.name = name;
        taxonomy.description = description;
        Ok(())
    }

    pub fn toggle_dropdown_type(&mut self, id: &DropdownTypeId) -> Result<bool, StoreError> {
        let taxonomy = self
            .dropdown_types
            .iter_mut()
            .find(|ty| &ty.id == id)
            .ok_or_else(|| StoreError::DropdownTypeNotFound(id.clone()))?;
        taxonomy.is_active = !taxonomy.is_active;
        Ok(taxonomy.is_active)
    }

    pub fn add_dropdown_option(
        &mut self,
        type_id: &DropdownTypeId,
        value: &str,
    ) -> Result<DropdownOptionId, StoreError> {
        let option_id = DropdownOptionId(next(&mut self.sequences.dropdown_option));
        let taxonomy = self
            .dropdown_types
            .iter_mut()
            .find(|ty| &ty.id == type_id)
            .ok_or_else(|| StoreError::DropdownTypeNotFound(type_id.clone()))?;
        taxonomy.options.push(DropdownOption {
            id: option_id.clone(),
            value: value.to_string(),
            is_active: true,
        });
        Ok(option_id)
    }
}
