use axum::response::Response;
use axum::Router;
use serde_json::Value;

use crate::expenses::domain::{
    CalculationMethod, ComparisonOperator, ExpenseCategory, ExpensePolicy, ExpenseRule,
    ExpenseType, ExpenseTypeId, Grade, PolicyCondition, PolicyFrequency, PolicyId, Role, RuleId,
    RuleValue, User, UserId,
};
use crate::expenses::evaluation::RuleEvaluator;
use crate::expenses::router::{expense_router, ExpenseApi};
use crate::expenses::store::ExpenseStore;

pub(super) fn employee() -> User {
    User {
        id: UserId("3".to_string()),
        name: "Emily Employee".to_string(),
        email: "employee@example.com".to_string(),
        role: Role::Employee,
        grade: Grade::Ms2,
        position: None,
    }
}

pub(super) fn manager() -> User {
    User {
        id: UserId("2".to_string()),
        name: "Mike Manager".to_string(),
        email: "manager@example.com".to_string(),
        role: Role::Manager,
        grade: Grade::Ms4,
        position: Some("Sales Head".to_string()),
    }
}

pub(super) fn rule(id: &str, expense_type_id: &str, value: RuleValue) -> ExpenseRule {
    ExpenseRule {
        id: RuleId(id.to_string()),
        group_id: None,
        expense_type_id: ExpenseTypeId(expense_type_id.to_string()),
        value,
        user_conditions: Vec::new(),
    }
}

/// Policy matching the seed's travel policy: admits MS2 employees, covers an
/// actual-value type, a constant type, and a calculated travel-fare type.
pub(super) fn travel_policy() -> ExpensePolicy {
    ExpensePolicy {
        id: PolicyId("1".to_string()),
        name: "Standard Travel Policy".to_string(),
        description: "Standard policy for all travel related expenses".to_string(),
        frequency: PolicyFrequency::Monthly,
        conditions: vec![
            PolicyCondition::Role(Role::Employee),
            PolicyCondition::Grade(Grade::Ms2),
        ],
        rules: vec![
            rule(
                "r1",
                "1",
                RuleValue::Actual {
                    operator: ComparisonOperator::Le,
                    limit_amount: Some(1000.0),
                },
            ),
            rule("r2", "2", RuleValue::Constant { amount: 800.0 }),
            rule(
                "r3",
                "9",
                RuleValue::Calculated {
                    method: CalculationMethod::TravelFare,
                },
            ),
        ],
    }
}

pub(super) fn expense_type(id: &str, name: &str, is_active: bool) -> ExpenseType {
    ExpenseType {
        id: ExpenseTypeId(id.to_string()),
        name: name.to_string(),
        description: String::new(),
        category: ExpenseCategory::Other,
        is_active,
    }
}

pub(super) fn expense_types() -> Vec<ExpenseType> {
    vec![
        expense_type("1", "HQ", true),
        expense_type("2", "Ex-HQ", true),
        expense_type("4", "OS", false),
        expense_type("9", "Local Conveyance", true),
    ]
}

pub(super) fn evaluator() -> RuleEvaluator {
    RuleEvaluator::default()
}

pub(super) fn seeded_router() -> Router {
    expense_router(ExpenseApi::new(ExpenseStore::seeded(), RuleEvaluator::default()))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
