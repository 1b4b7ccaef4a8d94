//! End-to-end walk through the expense workflow against the seeded store:
//! eligibility, draft assembly, submission, approval, reimbursement, and the
//! resulting summary.

use chrono::{NaiveDate, TimeZone, Utc};

use expense_desk::expenses::assembler::ReportDraft;
use expense_desk::expenses::domain::{ReportStatus, TravelDetails, TripType, UserId};
use expense_desk::expenses::evaluation::{EvaluationInput, RuleEvaluator};
use expense_desk::expenses::store::ExpenseStore;
use expense_desk::expenses::summary::ReportFilter;

#[test]
fn expense_report_travels_the_full_lifecycle() {
    let mut store = ExpenseStore::seeded();
    let evaluator = RuleEvaluator::default();

    // The employee sees only the policies whose conditions they satisfy.
    let employee = store
        .login("employee@example.com")
        .expect("seeded employee")
        .clone();
    let policies = store.eligible_policies(&employee);
    assert_eq!(policies.len(), 1);
    let policy = policies[0].clone();

    // Assemble a draft: a capped actual claim, a fixed allowance, and a
    // calculated round-trip fare.
    let types = store.expense_types().to_vec();
    let mut draft = ReportDraft::new(
        employee.id.clone(),
        NaiveDate::from_ymd_opt(2024, 4, 10).expect("valid date"),
        policy.id.clone(),
    );
    let available = draft.available_types(&policy, &types);
    assert_eq!(available.len(), 3);

    draft
        .add_line_item(
            &policy,
            &types,
            &evaluator,
            available[0].id.clone(),
            EvaluationInput {
                entered_amount: Some(640.0),
                receipt_url: Some("/receipts/hotel.pdf".to_string()),
                travel: None,
            },
            "Hotel near client office".to_string(),
        )
        .expect("actual claim under the limit");
    draft
        .add_line_item(
            &policy,
            &types,
            &evaluator,
            available[1].id.clone(),
            EvaluationInput::default(),
            "Daily field allowance".to_string(),
        )
        .expect("constant allowance");
    draft
        .add_line_item(
            &policy,
            &types,
            &evaluator,
            available[2].id.clone(),
            EvaluationInput {
                entered_amount: None,
                receipt_url: None,
                travel: Some(TravelDetails {
                    from_city: "CHN".to_string(),
                    to_city: "BLR".to_string(),
                    trip_type: TripType::OneWay,
                }),
            },
            "Train back to Bangalore".to_string(),
        )
        .expect("calculated fare");

    let submitted_at = Utc
        .with_ymd_and_hms(2024, 4, 10, 18, 0, 0)
        .single()
        .expect("valid timestamp");
    let report_id = store
        .submit_report(draft, submitted_at)
        .expect("draft submits");

    let report = store.report(&report_id).expect("stored report");
    assert_eq!(report.status, ReportStatus::Pending);
    // 640 entered + 800 constant + 980 one-way fare.
    assert_eq!(report.total_amount(), 2420.0);

    // Manager approves, then finance reimburses; earlier decisions stick.
    let manager = UserId("2".to_string());
    let decided_at = Utc
        .with_ymd_and_hms(2024, 4, 11, 9, 30, 0)
        .single()
        .expect("valid timestamp");
    store
        .approve_report(&report_id, &manager, decided_at)
        .expect("pending approves");
    assert!(store.reject_report(&report_id, "too late").is_err());

    let reimbursed = store
        .reimburse_report(&report_id, decided_at)
        .expect("approved reimburses");
    assert_eq!(reimbursed.status, ReportStatus::Reimbursed);

    // The summary reflects the new report alongside the seeded ones.
    let summary = store.summarize(&ReportFilter::default());
    assert_eq!(summary.report_count, 3);
    assert_eq!(summary.by_status.get("REIMBURSED"), Some(&2420.0));
    assert_eq!(summary.by_employee.get("Emily Employee"), Some(&6030.0));

    let csv = store
        .export_csv(&ReportFilter {
            status: Some(ReportStatus::Reimbursed),
            ..ReportFilter::default()
        })
        .expect("export succeeds");
    assert_eq!(csv.lines().count(), 4);
    assert!(csv.contains("Train back to Bangalore"));
}
