//! Reporting views over submitted expense reports: filtering, aggregate
//! totals, and a per-line-item CSV export.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{ExpenseReport, ReportStatus};
use super::store::ExpenseStore;

/// Optional constraints narrowing the report list. Absent fields match all.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportFilter {
    #[serde(default)]
    pub status: Option<ReportStatus>,
    #[serde(default)]
    pub from: Option<NaiveDate>,
    #[serde(default)]
    pub to: Option<NaiveDate>,
}

impl ReportFilter {
    pub fn matches(&self, report: &ExpenseReport) -> bool {
        if let Some(status) = self.status {
            if report.status != status {
                return false;
            }
        }
        if let Some(from) = self.from {
            if report.date < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if report.date > to {
                return false;
            }
        }
        true
    }
}

/// Aggregate totals over a filtered set of reports. Keys are display labels
/// resolved at build time; sort order comes from the maps.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub report_count: usize,
    pub total_amount: f64,
    pub by_status: BTreeMap<String, f64>,
    pub by_policy: BTreeMap<String, f64>,
    pub by_employee: BTreeMap<String, f64>,
    pub by_expense_type: BTreeMap<String, f64>,
}

/// One CSV row per line item, denormalized for spreadsheet use.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportRow<'a> {
    report_id: &'a str,
    date: NaiveDate,
    employee: String,
    policy: String,
    expense_type: String,
    description: &'a str,
    amount: f64,
    status: &'static str,
}

impl ExpenseStore {
    pub fn filtered_reports(&self, filter: &ReportFilter) -> Vec<&ExpenseReport> {
        self.reports()
            .iter()
            .filter(|report| filter.matches(report))
            .collect()
    }

    pub fn summarize(&self, filter: &ReportFilter) -> ReportSummary {
        let mut summary = ReportSummary::default();
        for report in self.filtered_reports(filter) {
            let total = report.total_amount();
            summary.report_count += 1;
            summary.total_amount += total;
            *summary
                .by_status
                .entry(report.status.label().to_string())
                .or_default() += total;
            *summary
                .by_policy
                .entry(self.policy_label(&report.policy_id))
                .or_default() += total;
            *summary
                .by_employee
                .entry(self.employee_label(&report.employee_id))
                .or_default() += total;
            for item in &report.items {
                *summary
                    .by_expense_type
                    .entry(self.expense_type_label(&item.expense_type_id))
                    .or_default() += item.amount;
            }
        }
        summary
    }

    /// Serialize the filtered reports as CSV, one row per line item.
    pub fn export_csv(&self, filter: &ReportFilter) -> Result<String, csv::Error> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for report in self.filtered_reports(filter) {
            for item in &report.items {
                writer.serialize(ExportRow {
                    report_id: &report.id.0,
                    date: report.date,
                    employee: self.employee_label(&report.employee_id),
                    policy: self.policy_label(&report.policy_id),
                    expense_type: self.expense_type_label(&item.expense_type_id),
                    description: &item.description,
                    amount: item.amount,
                    status: report.status.label(),
                })?;
            }
        }
        let bytes = writer
            .into_inner()
            .map_err(|err| csv::Error::from(err.into_error()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
