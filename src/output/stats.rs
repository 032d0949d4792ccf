//! Console summaries of pipeline runs

use crate::crawler::CrawlReport;
use crate::extract::ExtractReport;

/// Prints a crawl report to stdout in a formatted manner
pub fn print_report(report: &CrawlReport) {
    println!("=== Crawl Report ===\n");

    println!("Overview:");
    println!("  Records listed: {}", report.records_total);
    println!("  Records considered: {}", report.outcomes.len());
    match report.cap {
        Some(cap) => println!("  Download limit: {}", cap),
        None => println!("  Download limit: unlimited"),
    }
    println!(
        "  Fetch tasks: {} in {} batches",
        report.fetch_tasks, report.batches
    );
    println!("  Elapsed: {:.2}s", report.elapsed.as_secs_f64());
    println!();

    println!("Records by State:");
    for (state, count) in report.counts_by_state() {
        println!("  {}: {}", state, count);
    }
    println!();

    let failures: Vec<_> = report.failures().collect();
    if !failures.is_empty() {
        println!("Failures ({}):", failures.len());
        for item in failures {
            println!("  - {}: {}", item.record.url, item.describe());
        }
        println!();
    }

    if report.cap_reached() {
        println!(
            "Download limit reached: {} records left for a later run",
            report.not_considered
        );
    }

    println!(
        "Fetch Success Rate: {:.1}% ({} / {} fetches archived)",
        report.fetch_success_rate(),
        report.archived_count(),
        report.fetch_tasks
    );
}

/// Prints an extraction report to stdout
pub fn print_extract_report(report: &ExtractReport) {
    println!("=== Extraction Report ===\n");
    println!("  Converted: {}", report.converted);
    println!("  Skipped (already extracted): {}", report.skipped);
    println!("  Pages without article body: {}", report.empty);
    println!("  Failed: {}", report.failed.len());

    for (key, error) in &report.failed {
        println!("    - {}: {}", key, error);
    }
}
