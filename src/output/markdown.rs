//! Markdown report generation
//!
//! This module renders a crawl report as a human-readable markdown file,
//! including per-state counts and the list of records that failed.

use crate::crawler::CrawlReport;
use crate::output::{OutputError, OutputResult};
use crate::state::TaskState;
use std::path::Path;

/// Writes the markdown rendering of `report` to `output_path`
///
/// # Arguments
///
/// * `report` - The crawl report
/// * `output_path` - Path where the markdown file should be written
pub fn generate_markdown_report(report: &CrawlReport, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_report(report);

    std::fs::write(output_path, markdown).map_err(|source| OutputError::Write {
        path: output_path.display().to_string(),
        source,
    })
}

/// Formats a crawl report as markdown
pub fn format_markdown_report(report: &CrawlReport) -> String {
    let mut md = String::new();

    md.push_str("# Knowledge Base Crawl Report\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Started**: {}\n", report.started_at.to_rfc3339()));
    md.push_str(&format!(
        "- **Duration**: {:.2} seconds\n",
        report.elapsed.as_secs_f64()
    ));
    match report.cap {
        Some(cap) => md.push_str(&format!("- **Download Limit**: {}\n", cap)),
        None => md.push_str("- **Download Limit**: unlimited\n"),
    }
    md.push_str(&format!(
        "- **Batches**: {} ({} fetch tasks)\n\n",
        report.batches, report.fetch_tasks
    ));

    // Overall statistics
    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **Records Listed**: {}\n", report.records_total));
    md.push_str(&format!(
        "- **Records Considered**: {}\n",
        report.outcomes.len()
    ));
    md.push_str(&format!(
        "- **Records Not Considered**: {}\n",
        report.not_considered
    ));
    md.push_str(&format!(
        "- **Fetch Success Rate**: {:.2}%\n\n",
        report.fetch_success_rate()
    ));

    // State breakdown
    md.push_str("## Record State Breakdown\n\n");
    md.push_str("| State | Count |\n");
    md.push_str("|-------|-------|\n");
    for state in TaskState::ALL {
        md.push_str(&format!("| {} | {} |\n", state, report.count(state)));
    }
    md.push('\n');

    // Failures
    let failures: Vec<_> = report.failures().collect();
    if !failures.is_empty() {
        md.push_str("## Failed Records\n\n");
        md.push_str("| Title | URL | Reason |\n");
        md.push_str("|-------|-----|--------|\n");
        for item in failures {
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                escape_cell(&item.record.title),
                escape_cell(&item.record.url),
                escape_cell(&item.describe())
            ));
        }
        md.push('\n');
    }

    if report.cap_reached() {
        md.push_str(&format!(
            "> Download limit reached; {} records were left for a later run.\n",
            report.not_considered
        ));
    }

    md
}

/// Keeps a value from breaking the surrounding table row
fn escape_cell(value: &str) -> String {
    value.replace('|', "\\|").replace('\n', " ")
}
