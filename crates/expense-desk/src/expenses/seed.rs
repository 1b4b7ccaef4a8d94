//! Deterministic development fixture. Everything the demo and the HTTP
//! surface need to be exercised end to end without external services.

use chrono::{NaiveDate, TimeZone, Utc};

use super::assembler::ReportDraft;
use super::domain::{
    CalculationMethod, ComparisonOperator, ExpenseCategory, ExpenseTypeId, Grade, PolicyCondition,
    PolicyFrequency, Role, RuleValue, TravelDetails, TripType, UserId,
};
use super::evaluation::{EvaluationInput, RuleEvaluator};
use super::store::{ExpenseStore, NewDropdownType, NewExpenseType, NewPolicy, RuleSpec};

impl ExpenseStore {
    /// A store pre-populated with users, expense types, policies, taxonomies,
    /// and two sample reports (one pending, one approved).
    pub fn seeded() -> Self {
        let mut store = ExpenseStore::new();

        store.add_user("John Admin", "admin@example.com", Role::Admin, Grade::Ms5, None);
        let manager = store.add_user(
            "Mike Manager",
            "manager@example.com",
            Role::Manager,
            Grade::Ms4,
            None,
        );
        let employee = store.add_user(
            "Emily Employee",
            "employee@example.com",
            Role::Employee,
            Grade::Ms2,
            None,
        );
        let expense_types = [
            ("HQ", "Expenses within headquarters territory", ExpenseCategory::Fieldwork),
            ("Ex-HQ", "Expenses outside headquarters territory", ExpenseCategory::Fieldwork),
            ("Hill-station", "Expenses during hill station visits", ExpenseCategory::Other),
            ("OS", "Outstation field expenses", ExpenseCategory::Fieldwork),
            (
                "Meeting with Accommodation",
                "Overnight meetings including lodging",
                ExpenseCategory::Admin,
            ),
            (
                "Meeting without Accommodation",
                "Same-day meetings without lodging",
                ExpenseCategory::Admin,
            ),
            ("Petrol Allowance", "Fuel reimbursement for personal vehicles", ExpenseCategory::Other),
            ("Miscellaneous", "Uncategorized incidental expenses", ExpenseCategory::Other),
            ("Local Conveyance", "Intercity travel by rail or bus", ExpenseCategory::Other),
        ];
        let mut type_ids = Vec::new();
        for (name, description, category) in expense_types {
            type_ids.push(store.add_expense_type(NewExpenseType {
                name: name.to_string(),
                description: description.to_string(),
                category,
            }));
        }

        let travel_policy = store
            .add_policy(NewPolicy {
                name: "Standard Travel Policy".to_string(),
                description: "Standard policy for all travel related expenses".to_string(),
                frequency: PolicyFrequency::Monthly,
                conditions: vec![
                    PolicyCondition::Role(Role::Employee),
                    PolicyCondition::Grade(Grade::Ms2),
                ],
                rules: vec![
                    RuleSpec {
                        expense_type_id: type_ids[0].clone(),
                        value: RuleValue::Actual {
                            operator: ComparisonOperator::Le,
                            limit_amount: Some(1000.0),
                        },
                        user_conditions: Vec::new(),
                    },
                    RuleSpec {
                        expense_type_id: type_ids[1].clone(),
                        value: RuleValue::Constant { amount: 800.0 },
                        user_conditions: Vec::new(),
                    },
                    RuleSpec {
                        expense_type_id: type_ids[8].clone(),
                        value: RuleValue::Calculated {
                            method: CalculationMethod::TravelFare,
                        },
                        user_conditions: Vec::new(),
                    },
                ],
            })
            .expect("seed travel policy is consistent");

        store
            .add_policy(NewPolicy {
                name: "Food & Dining Policy".to_string(),
                description: "Policy covering all food and dining expenses".to_string(),
                frequency: PolicyFrequency::Monthly,
                conditions: vec![
                    PolicyCondition::Role(Role::Manager),
                    PolicyCondition::Grade(Grade::Ms4),
                ],
                rules: vec![
                    RuleSpec {
                        expense_type_id: type_ids[4].clone(),
                        value: RuleValue::Constant { amount: 2000.0 },
                        user_conditions: Vec::new(),
                    },
                    RuleSpec {
                        expense_type_id: type_ids[5].clone(),
                        value: RuleValue::Actual {
                            operator: ComparisonOperator::Le,
                            limit_amount: Some(750.0),
                        },
                        user_conditions: Vec::new(),
                    },
                ],
            })
            .expect("seed dining policy is consistent");

        store.add_dropdown_type(NewDropdownType {
            name: "Cities".to_string(),
            description: "Indian Cities".to_string(),
            options: ["Mumbai", "Delhi", "Bangalore", "Chennai"]
                .map(str::to_string)
                .to_vec(),
        });
        store.add_dropdown_type(NewDropdownType {
            name: "Products".to_string(),
            description: "Available Products".to_string(),
            options: ["Product A", "Product B", "Product C"]
                .map(str::to_string)
                .to_vec(),
        });

        seed_reports(&mut store, &employee, &manager, &travel_policy, &type_ids);

        store
    }
}

fn seed_reports(
    store: &mut ExpenseStore,
    employee: &UserId,
    manager: &UserId,
    travel_policy: &super::domain::PolicyId,
    type_ids: &[ExpenseTypeId],
) {
    let evaluator = RuleEvaluator::default();
    let policy = store
        .policy(travel_policy)
        .expect("seed policy exists")
        .clone();
    let types = store.expense_types().to_vec();

    // Pending: an actual-value claim under the HQ limit.
    let mut draft = ReportDraft::new(
        employee.clone(),
        NaiveDate::from_ymd_opt(2024, 3, 15).expect("valid seed date"),
        travel_policy.clone(),
    );
    draft
        .add_line_item(
            &policy,
            &types,
            &evaluator,
            type_ids[0].clone(),
            EvaluationInput {
                entered_amount: Some(850.0),
                receipt_url: Some("/mock-receipt-1.pdf".to_string()),
                travel: None,
            },
            "Client visit travel".to_string(),
        )
        .expect("seed line item is valid");
    store
        .submit_report(
            draft,
            Utc.with_ymd_and_hms(2024, 3, 16, 10, 0, 0)
                .single()
                .expect("valid seed timestamp"),
        )
        .expect("seed report submits");

    // Approved: constant allowance plus a calculated round-trip fare.
    let mut draft = ReportDraft::new(
        employee.clone(),
        NaiveDate::from_ymd_opt(2024, 3, 16).expect("valid seed date"),
        travel_policy.clone(),
    );
    draft
        .add_line_item(
            &policy,
            &types,
            &evaluator,
            type_ids[1].clone(),
            EvaluationInput::default(),
            "Field day outside headquarters".to_string(),
        )
        .expect("seed line item is valid");
    draft
        .add_line_item(
            &policy,
            &types,
            &evaluator,
            type_ids[8].clone(),
            EvaluationInput {
                entered_amount: None,
                receipt_url: None,
                travel: Some(TravelDetails {
                    from_city: "BLR".to_string(),
                    to_city: "CHN".to_string(),
                    trip_type: TripType::TwoWay,
                }),
            },
            "Round trip to Chennai".to_string(),
        )
        .expect("seed line item is valid");
    let report_id = store
        .submit_report(
            draft,
            Utc.with_ymd_and_hms(2024, 3, 17, 9, 0, 0)
                .single()
                .expect("valid seed timestamp"),
        )
        .expect("seed report submits");
    store
        .approve_report(
            &report_id,
            manager,
            Utc.with_ymd_and_hms(2024, 3, 17, 14, 0, 0)
                .single()
                .expect("valid seed timestamp"),
        )
        .expect("seed report approves");
}
