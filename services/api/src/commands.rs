use chrono::{Local, NaiveDate};
use clap::Args;
use intern_placement::config::AppConfig;
use intern_placement::error::AppError;
use intern_placement::telemetry;
use intern_placement::workflows::allocation::report::views::PlacementReportSummary;
use intern_placement::workflows::allocation::{
    AllocationEngine, OverflowAction, OverflowPlan, PlacementReport, Qualification,
};
use intern_placement::workflows::roster::{RosterImporter, ScheduleExporter};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct AllocateArgs {
    /// Intern roster CSV
    #[arg(long)]
    pub(crate) interns: PathBuf,
    /// Facility capacity CSV (one column per qualification)
    #[arg(long)]
    pub(crate) facilities: PathBuf,
    /// Random seed; defaults to APP_ALLOCATION_SEED
    #[arg(long)]
    pub(crate) seed: Option<u64>,
    /// Previously exported schedule whose locked rows are kept
    #[arg(long)]
    pub(crate) locked: Option<PathBuf>,
    /// Overflow action for every qualification (spread | leave_unassigned)
    #[arg(long)]
    pub(crate) overflow: Option<OverflowAction>,
    /// Per-qualification overflow action, e.g. BDS=spread
    #[arg(long = "overflow-for", value_parser = crate::infra::parse_overflow_override)]
    pub(crate) overflow_for: Vec<(Qualification, OverflowAction)>,
    /// Write the resulting schedule CSV here
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
    /// Print placement analytics after allocating
    #[arg(long)]
    pub(crate) summary: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// Exported schedule CSV
    #[arg(long)]
    pub(crate) schedule: PathBuf,
    /// Facility capacity CSV used for fill rates
    #[arg(long)]
    pub(crate) facilities: PathBuf,
    /// Report date (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

pub(crate) fn run_allocate(args: AllocateArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let AllocateArgs {
        interns,
        facilities,
        seed,
        locked,
        overflow,
        overflow_for,
        output,
        summary,
    } = args;

    let importer = RosterImporter::from_config(&config.import);
    let roster = importer.interns_from_path(&interns)?;
    let sheet = importer.facilities_from_path(&facilities)?;
    let locks = match locked {
        Some(path) => Some(importer.schedule_from_path(path)?.locked_assignments()),
        None => None,
    };

    let mut plan = OverflowPlan::new(overflow.unwrap_or(config.allocation.overflow_action));
    for (qualification, action) in overflow_for {
        plan.actions.insert(qualification, action);
    }

    let engine = AllocationEngine::new(seed.unwrap_or(config.allocation.seed));
    let outcome =
        engine.allocate_and_resolve(roster, &sheet.capacities, locks.as_deref(), &plan);

    let report = PlacementReport::build(&outcome.roster, &sheet.capacities);
    println!(
        "Allocated {} of {} interns across {} facilities (seed {})",
        report.assigned,
        report.total,
        sheet.facility_count(),
        engine.seed()
    );
    if !outcome.locked.is_empty() {
        println!("- {} locked assignment(s) kept", outcome.locked.len());
    }
    for warning in &outcome.warnings {
        println!("- {warning}");
    }

    if let Some(path) = output {
        ScheduleExporter::new()
            .with_locked(&outcome.locked)
            .to_path(&path, &outcome.roster)?;
        println!("Schedule written to {}", path.display());
    }

    if summary {
        render_summary(&report.summary(Local::now().date_naive()));
    }

    Ok(())
}

pub(crate) fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let importer = RosterImporter::from_config(&config.import);

    let schedule = importer.schedule_from_path(&args.schedule)?;
    let sheet = importer.facilities_from_path(&args.facilities)?;
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());

    let report = PlacementReport::build(&schedule.roster(), &sheet.capacities);
    render_summary(&report.summary(today));
    Ok(())
}

fn render_summary(summary: &PlacementReportSummary) {
    println!("\nPlacement summary ({})", summary.generated_on);
    println!(
        "- {} interns | {} assigned | {} unassigned",
        summary.totals.total, summary.totals.assigned, summary.totals.unassigned
    );

    println!("\nFacility x qualification");
    println!("  {} | Total", summary.qualifications.join(" | "));
    for row in &summary.crosstab {
        let counts: Vec<String> = row.counts.iter().map(|count| count.to_string()).collect();
        println!("  {}: {} | {}", row.facility, counts.join(" | "), row.total);
    }
    let totals: Vec<String> = summary
        .column_totals
        .iter()
        .map(|count| count.to_string())
        .collect();
    println!("  Total: {} | {}", totals.join(" | "), summary.grand_total);

    for (title, entries) in [
        ("By qualification", &summary.by_qualification),
        ("By sex", &summary.by_sex),
        ("By university", &summary.by_university),
    ] {
        println!("\n{title}");
        for entry in entries {
            println!("  - {}: {}", entry.label, entry.count);
        }
    }

    println!("\nFill rate");
    for entry in &summary.fill_rates {
        let rate = entry
            .fill_rate_pct
            .map_or_else(|| "n/a".to_string(), |pct| format!("{pct:.1}%"));
        let flag = if entry.over_capacity { " (over capacity)" } else { "" };
        println!(
            "  - {}: {}/{} = {}{}",
            entry.facility, entry.assigned, entry.capacity, rate, flag
        );
    }
}
