use crate::config::DashboardConfig;
use crate::core::summary::{terminal_series, SummaryMetrics};
use crate::core::{AggregationReport, Aggregator, ComplianceReport, SkipReason};
use crate::discovery::WorkbookLocator;
use crate::error::FuelPlanResult;
use crate::excel::{ExcelWorkbook, ReportExporter};
use crate::service::{run_load_cycle, SnapshotStatus};
use crate::snapshot::read_snapshot;
use crate::types::{AggregateSet, Product};
use colored::Colorize;
use std::path::{Path, PathBuf};

/// Format a volume for display: rounded to whole units with thousands separators
fn format_volume(n: f64) -> String {
    let rounded = n.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0.0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

fn describe_skip(reason: &SkipReason) -> String {
    match reason {
        SkipReason::MissingSheet => "no sheet".to_string(),
        SkipReason::Unreadable(e) => format!("unreadable: {}", e),
        SkipReason::TableNotFound => "no DESTINO table".to_string(),
        SkipReason::EmptyTable => "table has no rows".to_string(),
    }
}

/// Execute the load command: discover, aggregate, snapshot, print KPIs
pub fn load(config: &DashboardConfig, verbose: bool) -> FuelPlanResult<()> {
    println!("{}", "⛽ Fuelplan - Loading distribution plan".bold().green());
    println!("   Pattern: {}", config.file_pattern);
    println!();

    let outcome = match run_load_cycle(config) {
        Ok(outcome) => outcome,
        Err(e) => {
            println!("{}", format!("❌ Load failed: {}", e).bold().red());
            return Err(e);
        }
    };

    println!("   Workbook: {}", outcome.workbook.display());
    print_report(&outcome.report, verbose);
    print_summary(&outcome.set, &outcome.metrics, verbose);

    match &outcome.snapshot {
        SnapshotStatus::Written { path } => {
            println!("{}", format!("💾 Snapshot: {}", path.display()).cyan())
        }
        SnapshotStatus::Failed { error } => {
            println!("{}", format!("⚠️  Snapshot not written: {}", error).yellow())
        }
        SnapshotStatus::Disabled => {}
    }

    if let Some(compliance) = &outcome.compliance {
        print_compliance(compliance);
    }

    println!("\n{}", "✅ Data loaded".bold().green());
    Ok(())
}

/// Execute the export command: aggregate a workbook and write the report .xlsx
pub fn export(
    config: &DashboardConfig,
    input: Option<PathBuf>,
    output: PathBuf,
    verbose: bool,
) -> FuelPlanResult<()> {
    println!("{}", "⛽ Fuelplan - Excel Report Export".bold().green());

    let input = match input {
        Some(path) => path,
        None => WorkbookLocator::new(config.search_dirs.clone(), config.extensions.clone())
            .find(&config.file_pattern)?,
    };
    println!("   Input:  {}", input.display());
    println!("   Output: {}\n", output.display());

    if verbose {
        println!("{}", "📖 Reading terminal sheets...".cyan());
    }
    let mut workbook = ExcelWorkbook::open(&input)?;
    let aggregation =
        Aggregator::new(config.terminals.iter().copied()).aggregate(&mut workbook)?;
    if verbose {
        print_report(&aggregation.report, true);
    }

    if verbose {
        println!("{}", "📊 Writing report...".cyan());
    }
    ReportExporter::new(&aggregation.set).export(&output)?;

    println!("{}", "✅ Export Complete!".bold().green());
    println!("   Excel file: {}\n", output.display());
    Ok(())
}

/// Execute the snapshot command: summarize a historical snapshot file
pub fn snapshot(file: &Path, verbose: bool) -> FuelPlanResult<()> {
    println!("{}", "⛽ Fuelplan - Historical Snapshot".bold().green());
    println!("   File: {}\n", file.display());

    let set = read_snapshot(file)?;
    let metrics = SummaryMetrics::compute(&set);
    println!(
        "   {} terminals, {} rows",
        set.len(),
        set.row_count()
    );
    print_summary(&set, &metrics, verbose);
    Ok(())
}

fn print_report(report: &AggregationReport, verbose: bool) {
    println!(
        "   Terminals loaded: {}",
        report
            .loaded
            .iter()
            .map(|t| t.sheet_name())
            .collect::<Vec<_>>()
            .join(", ")
            .bright_blue()
    );
    for skipped in &report.skipped {
        if skipped.reason == SkipReason::MissingSheet && !verbose {
            continue;
        }
        println!(
            "   {}",
            format!(
                "⚠️  Skipped {}: {}",
                skipped.terminal,
                describe_skip(&skipped.reason)
            )
            .yellow()
        );
    }
    println!();
}

fn print_summary(set: &AggregateSet, metrics: &SummaryMetrics, verbose: bool) {
    let kpis = metrics.kpis();
    println!("{}", "📊 Programmed volume".bold());
    println!("   {:<10} {:>14}", "Total", format_volume(kpis.total).bold());
    println!("   {:<10} {:>14}", "Regular", format_volume(kpis.regular));
    println!("   {:<10} {:>14}", "Premium", format_volume(kpis.premium));
    println!("   {:<10} {:>14}", "Diesel", format_volume(kpis.diesel));
    println!();

    println!(
        "   {:<14} {:>12} {:>12} {:>12} {:>14}",
        "Terminal", "REGULAR", "PREMIUM", "DIESEL", "TOTAL"
    );
    for entry in terminal_series(set) {
        println!(
            "   {:<14} {:>12} {:>12} {:>12} {:>14}",
            entry.terminal.sheet_name(),
            format_volume(entry.volumes.get(Product::Regular)),
            format_volume(entry.volumes.get(Product::Premium)),
            format_volume(entry.volumes.get(Product::Diesel)),
            format_volume(entry.total)
        );
    }
    println!();

    if verbose {
        println!("{}", "   Destinations".bold());
        for (destination, volume) in &metrics.per_destination {
            println!("   {:<28} {:>14}", destination, format_volume(*volume));
        }
        println!();
    }
}

fn print_compliance(report: &ComplianceReport) {
    let show = |v: Option<f64>| v.map(|n| format!("{:.2}", n)).unwrap_or_else(|| "-".to_string());
    println!("{}", "📈 Compliance report".bold());
    println!(
        "   {:<16} {:>12} {:>12} {:>12}",
        "Terminal", "Fulfillment", "Utilization", "Gap"
    );
    for row in &report.rows {
        println!(
            "   {:<16} {:>12} {:>12} {:>12}",
            row.terminal,
            show(row.fulfillment),
            show(row.utilization),
            show(row.gap)
        );
    }
    println!();
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
