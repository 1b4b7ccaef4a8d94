//! Approval lifecycle for submitted reports.
//!
//! Transitions are guarded: once a report reaches a terminal status, further
//! approve/reject/reimburse calls return `InvalidTransition` instead of
//! overwriting the earlier decision.

use chrono::{DateTime, Utc};

use super::domain::{ExpenseReport, ReportStatus, UserId};

/// Typed rejection of an illegal lifecycle operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("invalid transition from {} to {}", from.label(), to.label())]
    InvalidTransition {
        from: ReportStatus,
        to: ReportStatus,
    },
    #[error("a rejection reason is required")]
    EmptyRejectionReason,
}

fn guard(report: &ExpenseReport, from: ReportStatus, to: ReportStatus) -> Result<(), TransitionError> {
    if report.status == from {
        Ok(())
    } else {
        Err(TransitionError::InvalidTransition {
            from: report.status,
            to,
        })
    }
}

/// PENDING -> APPROVED; stamps the acting manager and the approval time.
pub fn approve(
    report: &mut ExpenseReport,
    approver: &UserId,
    at: DateTime<Utc>,
) -> Result<(), TransitionError> {
    guard(report, ReportStatus::Pending, ReportStatus::Approved)?;
    report.status = ReportStatus::Approved;
    report.approved_by = Some(approver.clone());
    report.approved_at = Some(at);
    Ok(())
}

/// PENDING -> REJECTED; requires a non-empty reason.
pub fn reject(report: &mut ExpenseReport, reason: &str) -> Result<(), TransitionError> {
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(TransitionError::EmptyRejectionReason);
    }
    guard(report, ReportStatus::Pending, ReportStatus::Rejected)?;
    report.status = ReportStatus::Rejected;
    report.rejection_reason = Some(reason.to_string());
    Ok(())
}

/// APPROVED -> REIMBURSED; the downstream payout step.
pub fn reimburse(report: &mut ExpenseReport, at: DateTime<Utc>) -> Result<(), TransitionError> {
    guard(report, ReportStatus::Approved, ReportStatus::Reimbursed)?;
    report.status = ReportStatus::Reimbursed;
    report.reimbursed_at = Some(at);
    Ok(())
}
