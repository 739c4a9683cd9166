//! Shared API request/response types
//!
//! Presentation records for the criteria analysis service. Every numeric
//! field is rounded to 3 decimal places here; the engine itself keeps full
//! precision.

use crate::ahp::{AggregateResult, ComparisonMatrix, CriteriaAnalysis, RespondentResult};
use serde::{Deserialize, Serialize};

/// Round to 3 decimal places for presentation
///
/// Negative zero is normalized so JSON never shows `-0.0`.
///
/// # Examples
///
/// ```
/// use ahp_common::api::round3;
///
/// assert_eq!(round3(0.54545), 0.545);
/// assert_eq!(round3(-1e-16), 0.0);
/// ```
pub fn round3(value: f64) -> f64 {
    let rounded = (value * 1000.0).round() / 1000.0;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

fn round_vec(values: &[f64]) -> Vec<f64> {
    values.iter().copied().map(round3).collect()
}

fn round_matrix(matrix: &ComparisonMatrix) -> Vec<Vec<f64>> {
    matrix.to_rows().iter().map(|row| round_vec(row)).collect()
}

// ========================================
// Analysis Records
// ========================================

/// One respondent's results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RespondentView {
    /// Respondent label, e.g. "Engineer 1"
    pub engineer: String,
    pub matrix: Vec<Vec<f64>>,
    pub weights: Vec<f64>,
    pub max_eigenvalue: f64,
    pub ci: f64,
    pub cr: f64,
    pub ri: f64,
}

impl From<&RespondentResult> for RespondentView {
    fn from(result: &RespondentResult) -> Self {
        Self {
            engineer: result.label(),
            matrix: round_matrix(&result.matrix),
            weights: round_vec(&result.weights),
            max_eigenvalue: round3(result.consistency.max_eigenvalue),
            ci: round3(result.consistency.ci),
            cr: round3(result.consistency.cr),
            ri: round3(result.consistency.ri),
        }
    }
}

/// Consensus results over the consistent respondents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateView {
    pub aggregate_matrix: Vec<Vec<f64>>,
    pub weights: Vec<f64>,
    pub max_eigenvalue: f64,
    pub ci: f64,
    pub cr: f64,
    pub ri: f64,
    /// Number of respondents combined
    pub respondents: usize,
}

impl From<&AggregateResult> for AggregateView {
    fn from(result: &AggregateResult) -> Self {
        Self {
            aggregate_matrix: round_matrix(&result.matrix),
            weights: round_vec(&result.weights),
            max_eigenvalue: round3(result.consistency.max_eigenvalue),
            ci: round3(result.consistency.ci),
            cr: round3(result.consistency.cr),
            ri: round3(result.consistency.ri),
            respondents: result.respondents,
        }
    }
}

/// Results of one uploaded file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileAnalysisView {
    pub file_name: String,
    pub results: Vec<RespondentView>,
    /// `null` when no respondent in this file passed the CR threshold
    pub aggregate_result: Option<AggregateView>,
    pub discarded_rows: usize,
}

impl FileAnalysisView {
    pub fn new(file_name: impl Into<String>, analysis: &CriteriaAnalysis) -> Self {
        Self {
            file_name: file_name.into(),
            results: analysis.results.iter().map(RespondentView::from).collect(),
            aggregate_result: analysis.aggregate.as_ref().map(AggregateView::from),
            discarded_rows: analysis.discarded_rows,
        }
    }
}

// ========================================
// Response Types
// ========================================

/// Successful upload response
///
/// `results` and `aggregate_result` keep the flat shape the web front end
/// reads; `files` carries the per-file breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    /// Relative download path of the generated report
    pub document: String,
    /// All respondents, in file order then row order
    pub results: Vec<RespondentView>,
    /// First file aggregate that is present, `null` if none
    pub aggregate_result: Option<AggregateView>,
    pub files: Vec<FileAnalysisView>,
}

impl UploadResponse {
    pub fn new(document: impl Into<String>, files: Vec<FileAnalysisView>) -> Self {
        let results = files.iter().flat_map(|f| f.results.iter().cloned()).collect();
        let aggregate_result = files.iter().find_map(|f| f.aggregate_result.clone());
        Self {
            message: "Files processed successfully".to_string(),
            document: document.into(),
            results,
            aggregate_result,
            files,
        }
    }
}

/// Failure response: no partial results, only the message
///
/// # Examples
///
/// ```
/// use ahp_common::api::ErrorResponse;
///
/// let body = serde_json::to_value(ErrorResponse::new("bad row")).unwrap();
/// assert_eq!(body["message"], "bad row");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
