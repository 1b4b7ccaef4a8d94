use chrono::{Local, NaiveDate, Utc};
use clap::Args;
use expense_desk::error::AppError;
use expense_desk::expenses::assembler::ReportDraft;
use expense_desk::expenses::domain::{TravelDetails, TripType};
use expense_desk::expenses::evaluation::{EvaluationInput, RuleEvaluator};
use expense_desk::expenses::store::ExpenseStore;
use expense_desk::expenses::summary::ReportFilter;
use std::path::PathBuf;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Report date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) date: Option<NaiveDate>,
    /// Stop after submission, leaving the report pending.
    #[arg(long)]
    pub(crate) skip_approval: bool,
    /// Write the final CSV export to this path.
    #[arg(long)]
    pub(crate) export_csv: Option<PathBuf>,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        date,
        skip_approval,
        export_csv,
    } = args;
    let date = date.unwrap_or_else(|| Local::now().date_naive());

    println!("Expense desk demo");
    let mut store = ExpenseStore::seeded();
    let evaluator = RuleEvaluator::default();

    let employee = store
        .login("employee@example.com")
        .expect("seeded employee exists")
        .clone();
    let manager = store
        .login("manager@example.com")
        .expect("seeded manager exists")
        .clone();
    println!("- Logged in as {} ({:?}, {:?})", employee.name, employee.role, employee.grade);

    let policies = store.eligible_policies(&employee);
    println!("  Eligible policies:");
    for policy in &policies {
        println!("    - {} ({} rules)", policy.name, policy.rules.len());
    }
    let policy = (*policies
        .first()
        .expect("seeded employee has an eligible policy"))
    .clone();

    let types = store.expense_types().to_vec();
    let mut draft = ReportDraft::new(employee.id.clone(), date, policy.id.clone());
    println!("  Expense types open for this report:");
    for ty in draft.available_types(&policy, &types) {
        println!("    - {} ({})", ty.name, ty.id);
    }

    let items: [(&str, &str, EvaluationInput); 3] = [
        (
            "1",
            "Hotel near client office",
            EvaluationInput {
                entered_amount: Some(640.0),
                receipt_url: Some("/receipts/hotel.pdf".to_string()),
                travel: None,
            },
        ),
        ("2", "Daily field allowance", EvaluationInput::default()),
        (
            "9",
            "Round trip to Chennai",
            EvaluationInput {
                entered_amount: None,
                receipt_url: None,
                travel: Some(TravelDetails {
                    from_city: "BLR".to_string(),
                    to_city: "CHN".to_string(),
                    trip_type: TripType::TwoWay,
                }),
            },
        ),
    ];
    for (type_id, description, input) in items {
        let type_id = expense_desk::expenses::domain::ExpenseTypeId(type_id.to_string());
        match draft.add_line_item(
            &policy,
            &types,
            &evaluator,
            type_id.clone(),
            input,
            description.to_string(),
        ) {
            Ok(()) => {
                let amount = draft
                    .items()
                    .last()
                    .map(|item| item.amount)
                    .unwrap_or_default();
                println!("  Added {} -> {:.2}", description, amount);
            }
            Err(err) => println!("  Skipped {} ({})", description, err),
        }
    }

    let report_id = store.submit_report(draft, Utc::now())?;
    let report = store
        .report(&report_id)
        .expect("submitted report is stored")
        .clone();
    println!(
        "- Submitted report {} with {} items, total {:.2}, status {}",
        report.id,
        report.items.len(),
        report.total_amount(),
        report.status.label()
    );

    if !skip_approval {
        let approved = store.approve_report(&report_id, &manager.id, Utc::now())?;
        println!(
            "- {} approved the report at {}",
            manager.name,
            approved
                .approved_at
                .map(|at| at.to_rfc3339())
                .unwrap_or_default()
        );
        let reimbursed = store.reimburse_report(&report_id, Utc::now())?;
        println!("- Reimbursed -> status {}", reimbursed.status.label());
    }

    let summary = store.summarize(&ReportFilter::default());
    println!(
        "\nSummary: {} reports totaling {:.2}",
        summary.report_count, summary.total_amount
    );
    println!("By status:");
    for (status, total) in &summary.by_status {
        println!("  - {}: {:.2}", status, total);
    }
    println!("By expense type:");
    for (expense_type, total) in &summary.by_expense_type {
        println!("  - {}: {:.2}", expense_type, total);
    }

    if let Some(path) = export_csv {
        let csv = store
            .export_csv(&ReportFilter::default())
            .map_err(|err| AppError::Io(std::io::Error::other(err)))?;
        std::fs::write(&path, csv)?;
        println!("\nWrote CSV export to {}", path.display());
    }

    Ok(())
}
