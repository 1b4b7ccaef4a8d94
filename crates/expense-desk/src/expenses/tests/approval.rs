use chrono::{NaiveDate, TimeZone, Utc};

use crate::expenses::approval::{approve, reimburse, reject, TransitionError};
use crate::expenses::domain::{
    ExpenseReport, ExpenseTypeId, LineItem, PolicyId, ReportId, ReportStatus, UserId,
};

fn pending_report() -> ExpenseReport {
    ExpenseReport {
        id: ReportId("1".to_string()),
        employee_id: UserId("3".to_string()),
        date: NaiveDate::from_ymd_opt(2024, 3, 15).expect("valid date"),
        policy_id: PolicyId("1".to_string()),
        items: vec![LineItem {
            expense_type_id: ExpenseTypeId("1".to_string()),
            amount: 850.0,
            description: "Client visit travel".to_string(),
            receipt_url: Some("/receipt.pdf".to_string()),
            travel: None,
        }],
        status: ReportStatus::Pending,
        submitted_at: Utc
            .with_ymd_and_hms(2024, 3, 16, 10, 0, 0)
            .single()
            .expect("valid timestamp"),
        approved_by: None,
        approved_at: None,
        rejection_reason: None,
        reimbursed_at: None,
    }
}

fn now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 17, 14, 0, 0)
        .single()
        .expect("valid timestamp")
}

#[test]
fn approval_stamps_the_actor_and_time() {
    let mut report = pending_report();
    let manager = UserId("2".to_string());
    approve(&mut report, &manager, now()).expect("pending approves");

    assert_eq!(report.status, ReportStatus::Approved);
    assert_eq!(report.approved_by, Some(manager));
    assert_eq!(report.approved_at, Some(now()));
}

#[test]
fn rejection_requires_a_reason() {
    let mut report = pending_report();
    assert_eq!(
        reject(&mut report, "   "),
        Err(TransitionError::EmptyRejectionReason)
    );
    assert_eq!(report.status, ReportStatus::Pending);

    reject(&mut report, "  missing receipt ").expect("pending rejects");
    assert_eq!(report.status, ReportStatus::Rejected);
    assert_eq!(report.rejection_reason.as_deref(), Some("missing receipt"));
}

#[test]
fn decided_reports_cannot_be_decided_again() {
    let mut report = pending_report();
    let manager = UserId("2".to_string());
    approve(&mut report, &manager, now()).expect("pending approves");

    assert_eq!(
        approve(&mut report, &manager, now()),
        Err(TransitionError::InvalidTransition {
            from: ReportStatus::Approved,
            to: ReportStatus::Approved,
        })
    );
    assert_eq!(
        reject(&mut report, "too late"),
        Err(TransitionError::InvalidTransition {
            from: ReportStatus::Approved,
            to: ReportStatus::Rejected,
        })
    );

    // The original decision is untouched.
    assert_eq!(report.status, ReportStatus::Approved);
    assert_eq!(report.approved_by, Some(manager));
}

#[test]
fn reimbursement_requires_prior_approval() {
    let mut report = pending_report();
    assert_eq!(
        reimburse(&mut report, now()),
        Err(TransitionError::InvalidTransition {
            from: ReportStatus::Pending,
            to: ReportStatus::Reimbursed,
        })
    );

    approve(&mut report, &UserId("2".to_string()), now()).expect("pending approves");
    reimburse(&mut report, now()).expect("approved reimburses");
    assert_eq!(report.status, ReportStatus::Reimbursed);
    assert_eq!(report.reimbursed_at, Some(now()));

    // Terminal; a second payout attempt is refused.
    assert_eq!(
        reimburse(&mut report, now()),
        Err(TransitionError::InvalidTransition {
            from: ReportStatus::Reimbursed,
            to: ReportStatus::Reimbursed,
        })
    );
}

#[test]
fn rejected_reports_stay_rejected() {
    let mut report = pending_report();
    reject(&mut report, "duplicate claim").expect("pending rejects");

    assert!(approve(&mut report, &UserId("2".to_string()), now()).is_err());
    assert!(reimburse(&mut report, now()).is_err());
    assert_eq!(report.status, ReportStatus::Rejected);
}
