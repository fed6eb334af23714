use std::io::{self, Write};

use streamcheck_core::CategorySummary;
use streamcheck_engine::{Progress, RunReport};

/// Overwrite the current terminal line with a progress snapshot.
pub fn print_progress(progress: &Progress) {
    let current = progress.current.as_deref().unwrap_or("");
    print!(
        "\rtested {}/{}  working {}  last: {:<40}",
        progress.tested, progress.total, progress.working, truncate(current, 40)
    );
    let _ = io::stdout().flush();
}

/// Print the per-category summary table.
pub fn print_categories(categories: &[CategorySummary]) {
    println!();
    println!("{:<32} {:>6} {:>8} {:>7}", "category", "total", "working", "failed");
    for summary in categories {
        println!(
            "{:<32} {:>6} {:>8} {:>7}",
            truncate(&summary.name, 32),
            summary.total,
            summary.working,
            summary.failed
        );
    }
}

/// Print the terminal summary for a finished or cancelled run.
pub fn print_summary(report: &RunReport) {
    println!();
    if report.cancelled() {
        println!(
            "cancelled: {} of {} channels tested, {} working",
            report.stats.tested, report.stats.total, report.stats.working
        );
        return;
    }
    println!(
        "done: {} channels tested, {} working, {} failed",
        report.stats.tested,
        report.stats.working,
        report.stats.tested - report.stats.working
    );
    for path in &report.written_paths {
        println!("wrote {}", path.display());
    }
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
