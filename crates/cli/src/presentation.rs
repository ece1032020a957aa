//! Terminal output: results tables, dispatch summaries and progress bars.

use indicatif::{ProgressBar, ProgressStyle};

use debrify_core::{DispatchOutcome, KeywordOutcome, SearchResult};

const NAME_WIDTH: usize = 70;

/// Truncates a string to at most `max_chars` characters, adding "..." if needed.
pub fn truncate_string(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Human-readable byte count (binary units).
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

/// Results table for one keyword. Rows are numbered from `0001`.
pub fn format_results_table(keyword: &str, result: &SearchResult) -> String {
    let mut out = format!("Results for '{}' ({} found)\n", keyword, result.len());
    if result.is_empty() {
        return out;
    }

    out.push_str(&format!(
        "{:>5}  {:<width$}  {:>10}  {:>7}  {:<10}\n",
        "No.",
        "Name",
        "Size",
        "Seeders",
        "Created",
        width = NAME_WIDTH
    ));
    out.push_str(&"-".repeat(5 + 2 + NAME_WIDTH + 2 + 10 + 2 + 7 + 2 + 10));
    out.push('\n');

    for (index, record) in result.iter().enumerate() {
        let created = record
            .created_at()
            .map(|at| at.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "{:>5}  {:<width$}  {:>10}  {:>7}  {:<10}\n",
            format!("{:04}", index + 1),
            truncate_string(&record.name, NAME_WIDTH),
            format_size(record.size_bytes),
            record.seeders,
            created,
            width = NAME_WIDTH
        ));
    }
    out
}

/// One-line summary of what happened to a keyword.
pub fn format_dispatch_summary(outcome: &KeywordOutcome) -> String {
    let report = &outcome.dispatch;
    if report.nothing_to_dispatch() {
        return format!(
            "'{}': {} found, nothing to dispatch from index {}",
            outcome.keyword,
            outcome.result.len(),
            report.range.start
        );
    }

    let span = format!("{}..{}", report.range.start, report.range.end - 1);
    if report.submit {
        format!(
            "'{}': {} found, results {} submitted: {} ok, {} failed",
            outcome.keyword,
            outcome.result.len(),
            span,
            report.submitted(),
            report.failed()
        )
    } else {
        format!(
            "'{}': {} found, results {} previewed (use --download-to-debrid to submit)",
            outcome.keyword,
            outcome.result.len(),
            span
        )
    }
}

/// Failed submissions of a keyword, one line each.
pub fn format_failures(outcome: &KeywordOutcome) -> Vec<String> {
    outcome
        .dispatch
        .items
        .iter()
        .filter_map(|item| match &item.outcome {
            DispatchOutcome::Failed { reason } => {
                Some(format!("  #{} {}: {}", item.index, item.infohash, reason))
            }
            _ => None,
        })
        .collect()
}

/// Spinner for work of unknown length.
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) =
        ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")
    {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(120));
    pb
}

/// Bar tracking dispatched records. Its length is set per keyword.
pub fn dispatch_bar() -> ProgressBar {
    let pb = ProgressBar::new(0);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("█▓░"));
    }
    pb
}
