//! Expense management core: policy eligibility, rule evaluation, report
//! assembly and approval, the in-memory store, and the HTTP surface.

pub mod approval;
pub mod assembler;
pub mod domain;
pub mod eligibility;
pub mod evaluation;
pub mod router;
mod seed;
pub mod store;
pub mod summary;

#[cfg(test)]
mod tests;

pub use approval::TransitionError;
pub use assembler::{AssemblyError, ReportDraft};
pub use domain::{
    CalculationMethod, ComparisonOperator, ExpenseCategory, ExpensePolicy, ExpenseReport,
    ExpenseRule, ExpenseType, ExpenseTypeId, Grade, GroupId, LineItem, PolicyCondition,
    PolicyFrequency, PolicyId, PropertyKind, ReportId, ReportStatus, Role, RuleId, RuleValue,
    TravelDetails, TripType, User, UserId, UserProperty,
};
pub use eligibility::{eligible_policies, is_eligible, rule_applies_to};
pub use evaluation::{
    DistanceTable, Evaluation, EvaluationError, EvaluationInput, FareSchedule, RuleEvaluator,
    DEFAULT_RATE_PER_KM,
};
pub use router::{expense_router, ExpenseApi};
pub use store::{
    CategoryAmount, ExpenseStore, NewExpenseType, NewPolicy, NewUserProperty, PolicyUpdate,
    RuleSpec, StoreError, UserPropertyPatch,
};
pub use summary::{ReportFilter, ReportSummary};
