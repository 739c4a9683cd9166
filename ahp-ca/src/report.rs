//! Report document rendering
//!
//! Renders the already-computed, already-rounded analysis records as a
//! Markdown document and saves it under the reports directory, where
//! `GET /reports/{name}` serves it for download.

use std::path::Path;

use ahp_common::api::{AggregateView, FileAnalysisView, RespondentView};
use chrono::Local;
use tracing::info;
use uuid::Uuid;

/// URL prefix the reports directory is served under
pub const REPORTS_ROUTE: &str = "reports";

/// Render the full report for one request
pub fn render_report(files: &[FileAnalysisView]) -> String {
    let mut doc = String::from("# Criteria Analysis\n\n");

    for file in files {
        doc.push_str(&format!("## {}\n\n", file.file_name));

        if file.results.is_empty() {
            doc.push_str("No numeric rows found.\n\n");
        }
        for result in &file.results {
            render_respondent(&mut doc, result);
        }

        match &file.aggregate_result {
            Some(aggregate) => render_aggregate(&mut doc, aggregate),
            None if !file.results.is_empty() => {
                doc.push_str("### Aggregate Results\n\n");
                doc.push_str("No consistent respondents (CR <= 0.1); aggregate not computed.\n\n");
            }
            None => {}
        }
    }

    doc
}

fn render_respondent(doc: &mut String, result: &RespondentView) {
    doc.push_str(&format!("### {}\n\n", result.engineer));
    doc.push_str("Pairwise Comparison Matrix:\n\n");
    render_matrix(doc, &result.matrix);
    render_metrics(
        doc,
        "",
        &result.weights,
        [result.max_eigenvalue, result.ci, result.cr, result.ri],
    );
}

fn render_aggregate(doc: &mut String, aggregate: &AggregateView) {
    doc.push_str("### Aggregate Results\n\n");
    doc.push_str(&format!(
        "Geometric mean of {} consistent respondent(s).\n\n",
        aggregate.respondents
    ));
    doc.push_str("Aggregate Pairwise Comparison Matrix:\n\n");
    render_matrix(doc, &aggregate.aggregate_matrix);
    render_metrics(
        doc,
        "Aggregate ",
        &aggregate.weights,
        [aggregate.max_eigenvalue, aggregate.ci, aggregate.cr, aggregate.ri],
    );
}

fn render_matrix(doc: &mut String, matrix: &[Vec<f64>]) {
    let n = matrix.len();

    let header: Vec<String> = (1..=n).map(|c| format!("C{}", c)).collect();
    doc.push_str(&format!("| | {} |\n", header.join(" | ")));
    doc.push_str(&format!("|---|{}\n", "---|".repeat(n)));

    for (i, row) in matrix.iter().enumerate() {
        let cells: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        doc.push_str(&format!("| C{} | {} |\n", i + 1, cells.join(" | ")));
    }
    doc.push('\n');
}

fn render_metrics(doc: &mut String, prefix: &str, weights: &[f64], metrics: [f64; 4]) {
    let weights: Vec<String> = weights.iter().map(|w| w.to_string()).collect();
    let [max_eigenvalue, ci, cr, ri] = metrics;

    doc.push_str(&format!("- {}Weights: [{}]\n", prefix, weights.join(", ")));
    doc.push_str(&format!("- {}Max Eigenvalue: {}\n", prefix, max_eigenvalue));
    doc.push_str(&format!("- {}Consistency Index (CI): {}\n", prefix, ci));
    doc.push_str(&format!("- {}Consistency Ratio (CR): {}\n", prefix, cr));
    doc.push_str(&format!("- {}Random Index (RI): {}\n\n", prefix, ri));
}

/// Timestamped file name, unique across concurrent requests
pub fn report_file_name() -> String {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let suffix = Uuid::new_v4().simple().to_string();
    format!("criteria_analysis_{}_{}.md", timestamp, &suffix[..8])
}

/// Render and save the report, returning its download path
///
/// The reports directory is created when missing.
pub async fn write_report(reports_dir: &Path, files: &[FileAnalysisView]) -> std::io::Result<String> {
    tokio::fs::create_dir_all(reports_dir).await?;

    let file_name = report_file_name();
    let path = reports_dir.join(&file_name);
    tokio::fs::write(&path, render_report(files)).await?;
    info!("Report saved to {}", path.display());

    Ok(format!("{}/{}", REPORTS_ROUTE, file_name))
}
