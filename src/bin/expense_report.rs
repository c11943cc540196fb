use std::{fs::OpenOptions, path::PathBuf, process::ExitCode, sync::Arc};

use clap::Parser;
use tracing_subscriber::{EnvFilter, Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use expense_tracker::{
    AppContext, CategoryFilter, ChartKind, DateRangeToken, Error, ExpenseReport, FilterCriteria,
    InMemoryExpenseStore, load_expenses, now_in, spending_chart,
};

/// Filter and summarise an export of expenses.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to a JSON or CSV export of expenses.
    #[arg(long)]
    expenses: PathBuf,

    /// Only show one category, e.g. "food". Defaults to all categories.
    #[arg(long, default_value = "all")]
    category: String,

    /// One of all, today, last7days, last30days or last90days.
    #[arg(long, default_value = "all")]
    range: String,

    /// Only show expenses whose title or notes contain this text.
    #[arg(long, default_value = "")]
    search: String,

    /// The currency code to display amounts in.
    #[arg(long)]
    currency: Option<String>,

    /// Canonical timezone name used to work out "today", e.g. "Pacific/Auckland".
    #[arg(long, env = "EXPENSE_TRACKER_TIMEZONE", default_value = "Etc/UTC")]
    timezone: String,

    /// How many categories to list in the breakdown.
    #[arg(long, default_value_t = 5)]
    top: usize,

    /// Write the spending chart as ECharts JSON to this file.
    #[arg(long)]
    chart_out: Option<PathBuf>,

    /// Draw the chart as bars instead of a doughnut.
    #[arg(long)]
    bar_chart: bool,

    /// Also write debug logs to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    setup_logging(args.log_file.as_ref());

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!("{error}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Error> {
    let now = now_in(&args.timezone)?;
    let expenses = load_expenses(&args.expenses)?;

    let store = Arc::new(InMemoryExpenseStore::with_expenses(expenses, now.offset()));
    let mut context = AppContext::start(store, None)?;

    if let Some(code) = &args.currency {
        context.set_currency(code)?;
    }

    let criteria = FilterCriteria {
        category: CategoryFilter::parse_lenient(&args.category),
        date_range: DateRangeToken::parse_lenient(&args.range),
        search: args.search.clone(),
    };

    let report = context.report(&criteria, now, args.top)?;
    print_report(&context, &criteria, &report);

    if let Some(path) = &args.chart_out {
        let kind = if args.bar_chart {
            ChartKind::Bar
        } else {
            ChartKind::Doughnut
        };

        match spending_chart(&report.visible, kind) {
            Some(chart) => {
                std::fs::write(path, chart.to_string())?;
                tracing::info!("Wrote chart to {}", path.display());
            }
            None => tracing::info!("No expenses to chart, skipping {}", path.display()),
        }
    }

    context.shutdown();

    Ok(())
}

fn print_report(context: &AppContext, criteria: &FilterCriteria, report: &ExpenseReport) {
    let summary = &report.summary;
    println!("Total expenses:  {}", context.format_amount(summary.total));
    println!("This month:      {}", context.format_amount(summary.this_month));
    println!("Last month:      {}", context.format_amount(summary.last_month));
    println!("Change:          {}%", summary.percent_change);
    println!();

    if report.visible.is_empty() {
        if criteria.is_filtering() {
            println!("No expenses match the current filters.");
        } else {
            println!("No expenses yet.");
        }
        return;
    }

    println!(
        "{} expenses ({}, {}):",
        report.visible.len(),
        criteria.category,
        criteria.date_range.label()
    );

    for expense in &report.visible {
        println!(
            "  {:<10}  {:<24}  {:<18}  {:>14}",
            expense.date.to_string(),
            expense.title,
            expense.category.label(),
            context.format_amount(expense.amount)
        );
    }

    println!();
    println!("Filtered total:  {}", context.format_amount(report.total));
    println!("Top categories:");

    for (category, total) in &report.top_categories {
        println!(
            "  {:<18}  {:>14}",
            category.label(),
            context.format_amount(*total)
        );
    }
}

fn setup_logging(log_file: Option<&PathBuf>) {
    let stdout_log = tracing_subscriber::fmt::layer().pretty().with_filter(
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    );

    let debug_log = log_file.map(|path| {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .expect("Could not create log file");

        tracing_subscriber::fmt::layer()
            .pretty()
            .with_writer(Arc::new(file))
            .with_filter(filter::LevelFilter::DEBUG)
    });

    tracing_subscriber::registry()
        .with(stdout_log)
        .with(debug_log)
        .init();
}
