use chrono::{NaiveDate, TimeZone, Utc};

use super::common::{employee, evaluator, expense_types, travel_policy};
use crate::expenses::assembler::{AssemblyError, ReportDraft};
use crate::expenses::domain::{ExpenseTypeId, PolicyId, ReportStatus, TravelDetails, TripType};
use crate::expenses::evaluation::{EvaluationError, EvaluationInput};

fn draft() -> ReportDraft {
    ReportDraft::new(
        employee().id,
        NaiveDate::from_ymd_opt(2024, 3, 15).expect("valid date"),
        PolicyId("1".to_string()),
    )
}

fn receipted(amount: f64) -> EvaluationInput {
    EvaluationInput {
        entered_amount: Some(amount),
        receipt_url: Some("/receipt.pdf".to_string()),
        travel: None,
    }
}

#[test]
fn each_expense_type_appears_at_most_once() {
    let policy = travel_policy();
    let types = expense_types();
    let mut draft = draft();

    draft
        .add_line_item(
            &policy,
            &types,
            &evaluator(),
            ExpenseTypeId("1".to_string()),
            receipted(120.0),
            "Taxi".to_string(),
        )
        .expect("first item for the type");

    let err = draft
        .add_line_item(
            &policy,
            &types,
            &evaluator(),
            ExpenseTypeId("1".to_string()),
            receipted(80.0),
            "Second taxi".to_string(),
        )
        .expect_err("type already used");
    assert_eq!(
        err,
        AssemblyError::DuplicateExpenseType(ExpenseTypeId("1".to_string()))
    );
    assert_eq!(draft.items().len(), 1);
}

#[test]
fn inactive_types_are_rejected() {
    let mut policy = travel_policy();
    policy.rules.push(super::common::rule(
        "r4",
        "4",
        crate::expenses::domain::RuleValue::Constant { amount: 100.0 },
    ));
    let err = draft()
        .add_line_item(
            &policy,
            &expense_types(),
            &evaluator(),
            ExpenseTypeId("4".to_string()),
            EvaluationInput::default(),
            "Outstation".to_string(),
        )
        .expect_err("type is inactive");
    assert_eq!(
        err,
        AssemblyError::InactiveExpenseType(ExpenseTypeId("4".to_string()))
    );
}

#[test]
fn types_without_a_rule_are_rejected() {
    let err = draft()
        .add_line_item(
            &travel_policy(),
            &expense_types(),
            &evaluator(),
            ExpenseTypeId("99".to_string()),
            receipted(50.0),
            "Unknown".to_string(),
        )
        .expect_err("policy has no rule for the type");
    assert_eq!(
        err,
        AssemblyError::NoRuleForType(ExpenseTypeId("99".to_string()))
    );
}

#[test]
fn evaluation_failures_leave_the_draft_unchanged() {
    let mut draft = draft();
    let err = draft
        .add_line_item(
            &travel_policy(),
            &expense_types(),
            &evaluator(),
            ExpenseTypeId("1".to_string()),
            receipted(1000.01),
            "Over the limit".to_string(),
        )
        .expect_err("limit exceeded");
    assert!(matches!(
        err,
        AssemblyError::Evaluation(EvaluationError::LimitExceeded { .. })
    ));
    assert!(draft.items().is_empty());
}

#[test]
fn available_types_shrink_as_items_are_added() {
    let policy = travel_policy();
    let types = expense_types();
    let mut draft = draft();

    // Active, ruled, unused: HQ (1), Ex-HQ (2), Local Conveyance (9).
    // OS (4) is inactive and has no rule anyway.
    let available: Vec<_> = draft
        .available_types(&policy, &types)
        .into_iter()
        .map(|ty| ty.id.0.clone())
        .collect();
    assert_eq!(available, ["1", "2", "9"]);

    draft
        .add_line_item(
            &policy,
            &types,
            &evaluator(),
            ExpenseTypeId("2".to_string()),
            EvaluationInput::default(),
            "Field day".to_string(),
        )
        .expect("constant item");

    let available: Vec<_> = draft
        .available_types(&policy, &types)
        .into_iter()
        .map(|ty| ty.id.0.clone())
        .collect();
    assert_eq!(available, ["1", "9"]);
}

#[test]
fn finishing_an_empty_draft_fails() {
    let err = draft()
        .finish(Utc::now())
        .expect_err("no line items");
    assert_eq!(err, AssemblyError::EmptyReport);
}

#[test]
fn finished_reports_start_pending_with_computed_amounts() {
    let policy = travel_policy();
    let types = expense_types();
    let mut draft = draft();

    draft
        .add_line_item(
            &policy,
            &types,
            &evaluator(),
            ExpenseTypeId("2".to_string()),
            // Entered amount is ignored for constant rules.
            receipted(5.0),
            "Field day".to_string(),
        )
        .expect("constant item");
    draft
        .add_line_item(
            &policy,
            &types,
            &evaluator(),
            ExpenseTypeId("9".to_string()),
            EvaluationInput {
                entered_amount: None,
                receipt_url: None,
                travel: Some(TravelDetails {
                    from_city: "BLR".to_string(),
                    to_city: "CHN".to_string(),
                    trip_type: TripType::TwoWay,
                }),
            },
            "Round trip".to_string(),
        )
        .expect("calculated item");

    let submitted_at = Utc
        .with_ymd_and_hms(2024, 3, 16, 10, 0, 0)
        .single()
        .expect("valid timestamp");
    let report = draft.finish(submitted_at).expect("draft finishes");

    assert_eq!(report.status, ReportStatus::Pending);
    assert_eq!(report.submitted_at, submitted_at);
    assert_eq!(report.items[0].amount, 800.0);
    assert_eq!(report.items[1].amount, 1960.0);
    assert_eq!(report.total_amount(), 2760.0);
    assert!(report.approved_by.is_none());
    assert!(report.rejection_reason.is_none());
}
