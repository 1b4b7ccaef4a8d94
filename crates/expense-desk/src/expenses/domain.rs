use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier wrapper for users.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

/// Identifier wrapper for reimbursement policies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PolicyId(pub String);

/// Identifier wrapper for expense types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExpenseTypeId(pub String);

/// Identifier wrapper for expense rules.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RuleId(pub String);

/// Correlation id shared by rules created together as a category batch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupId(pub String);

/// Identifier wrapper for submitted expense reports.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReportId(pub String);

/// Identifier wrapper for user attribute properties.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropertyId(pub String);

/// Identifier wrapper for dropdown taxonomies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DropdownTypeId(pub String);

/// Identifier wrapper for dropdown options.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DropdownOptionId(pub String);

macro_rules! impl_id_display {
    ($($id:ident),+ $(,)?) => {
        $(impl fmt::Display for $id {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        })+
    };
}

impl_id_display!(
    UserId,
    PolicyId,
    ExpenseTypeId,
    RuleId,
    GroupId,
    ReportId,
    PropertyId,
    DropdownTypeId,
    DropdownOptionId,
);

/// Organizational roles recognized by eligibility conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Employee,
    Manager,
    Admin,
}

/// Pay grades MS1 through MS5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Grade {
    Ms1,
    Ms2,
    Ms3,
    Ms4,
    Ms5,
}

/// An employee, manager, or administrator known to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub grade: Grade,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
}

/// Closed set of expense categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpenseCategory {
    Fieldwork,
    Meals,
    Lodging,
    Other,
    Admin,
}

/// Administrator-configured expense type. Deactivated rather than deleted so
/// historical reports keep resolving.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseType {
    pub id: ExpenseTypeId,
    pub name: String,
    pub description: String,
    pub category: ExpenseCategory,
    pub is_active: bool,
}

/// One eligibility predicate over a user attribute. The set of recognized
/// attributes is closed; an unknown property type cannot be represented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "propertyType", content = "value")]
pub enum PolicyCondition {
    #[serde(rename = "ROLE")]
    Role(Role),
    #[serde(rename = "GRADE")]
    Grade(Grade),
    #[serde(rename = "POSITION")]
    Position(String),
}

/// Comparison operators available on actual-value limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComparisonOperator {
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">=")]
    Ge,
}

impl ComparisonOperator {
    /// Whether `entered <op> limit` holds with the limit as the right operand.
    pub fn holds(self, entered: f64, limit: f64) -> bool {
        match self {
            ComparisonOperator::Lt => entered < limit,
            ComparisonOperator::Gt => entered > limit,
            ComparisonOperator::Le => entered <= limit,
            ComparisonOperator::Ge => entered >= limit,
        }
    }

    pub const fn symbol(self) -> &'static str {
        match self {
            ComparisonOperator::Lt => "<",
            ComparisonOperator::Gt => ">",
            ComparisonOperator::Le => "<=",
            ComparisonOperator::Ge => ">=",
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Strategy used to derive a calculated amount. Only the travel-fare variant
/// is implemented; further methods slot in here per expense type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CalculationMethod {
    TravelFare,
}

/// How the reimbursable amount for an expense type is determined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "valueType",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum RuleValue {
    /// Fixed amount; any user-entered value is ignored.
    Constant { amount: f64 },
    /// User-entered amount, optionally bounded by `entered <op> limit`.
    Actual {
        operator: ComparisonOperator,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        limit_amount: Option<f64>,
    },
    /// Amount derived from auxiliary inputs rather than entered.
    Calculated { method: CalculationMethod },
}

/// Per-expense-type reimbursement rule within a policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseRule {
    pub id: RuleId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<GroupId>,
    pub expense_type_id: ExpenseTypeId,
    #[serde(flatten)]
    pub value: RuleValue,
    #[serde(default)]
    pub user_conditions: Vec<PolicyCondition>,
}

/// Declarative policy cadence; no scheduler enforces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PolicyFrequency {
    Daily,
    Weekly,
    Fortnightly,
    Monthly,
    Quarterly,
    HalfYearly,
    Annually,
}

/// Named bundle of eligibility conditions and reimbursement rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpensePolicy {
    pub id: PolicyId,
    pub name: String,
    pub description: String,
    pub frequency: PolicyFrequency,
    /// Conjunction: every condition must hold for a user to be eligible.
    pub conditions: Vec<PolicyCondition>,
    pub rules: Vec<ExpenseRule>,
}

impl ExpensePolicy {
    /// The rule governing an expense type, if the policy defines one.
    pub fn rule_for(&self, expense_type_id: &ExpenseTypeId) -> Option<&ExpenseRule> {
        self.rules
            .iter()
            .find(|rule| &rule.expense_type_id == expense_type_id)
    }
}

/// One-way or round trip for fare calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TripType {
    OneWay,
    TwoWay,
}

/// Trip inputs backing a calculated travel-fare line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelDetails {
    pub from_city: String,
    pub to_city: String,
    pub trip_type: TripType,
}

/// One expense entry within a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub expense_type_id: ExpenseTypeId,
    pub amount: f64,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub travel: Option<TravelDetails>,
}

/// Approval lifecycle status of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportStatus {
    Pending,
    Approved,
    Rejected,
    Reimbursed,
}

impl ReportStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ReportStatus::Pending => "PENDING",
            ReportStatus::Approved => "APPROVED",
            ReportStatus::Rejected => "REJECTED",
            ReportStatus::Reimbursed => "REIMBURSED",
        }
    }
}

/// A submission grouping line items under one policy, carrying approval state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseReport {
    pub id: ReportId,
    pub employee_id: UserId,
    pub date: NaiveDate,
    pub policy_id: PolicyId,
    pub items: Vec<LineItem>,
    pub status: ReportStatus,
    pub submitted_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reimbursed_at: Option<DateTime<Utc>>,
}

impl ExpenseReport {
    pub fn total_amount(&self) -> f64 {
        self.items.iter().map(|item| item.amount).sum()
    }
}

/// Attribute kind backing the user-property administration resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyKind {
    Role,
    Grade,
    Position,
}

/// Administrator-managed user attribute metadata record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProperty {
    pub id: PropertyId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: PropertyKind,
    pub value: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One selectable value inside a dropdown taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropdownOption {
    pub id: DropdownOptionId,
    pub value: String,
    pub is_active: bool,
}

/// Administrator-managed taxonomy used as a generic category source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropdownType {
    pub id: DropdownTypeId,
    pub name: String,
    pub description: String,
    pub options: Vec<DropdownOption>,
    pub is_active: bool,
}
