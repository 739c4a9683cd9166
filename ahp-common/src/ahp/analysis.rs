//! Criteria analysis pipeline
//!
//! Matrix Builder → (Eigen Solver + Consistency Scorer) per respondent →
//! CR filter → Aggregator → (Eigen Solver + Consistency Scorer) on the
//! consensus matrix.
//!
//! The pipeline is synchronous and owns all of its data; one call analyzes one
//! uploaded table.

use super::aggregate::geometric_mean;
use super::consistency::{score_consistency, ConsistencyRecord, CR_THRESHOLD};
use super::eigen::dominant_eigen;
use super::matrix::{build_matrices, respondent_label, ComparisonMatrix, RespondentMatrix};
use crate::Result;
use tracing::{debug, info, warn};

/// Analysis of one respondent's matrix
#[derive(Debug, Clone, PartialEq)]
pub struct RespondentResult {
    /// 1-based ordinal among numeric rows
    pub respondent: usize,
    /// 1-based line number in the source text
    pub line: usize,
    pub matrix: ComparisonMatrix,
    pub weights: Vec<f64>,
    pub consistency: ConsistencyRecord,
}

impl RespondentResult {
    /// Display label, e.g. `"Engineer 1"`
    pub fn label(&self) -> String {
        respondent_label(self.respondent)
    }

    /// Admitted to aggregation
    pub fn is_consistent(&self) -> bool {
        self.consistency.is_consistent()
    }
}

/// Analysis of the geometric-mean consensus matrix
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateResult {
    pub matrix: ComparisonMatrix,
    pub weights: Vec<f64>,
    pub consistency: ConsistencyRecord,
    /// Number of consistent respondents that were combined
    pub respondents: usize,
}

impl AggregateResult {
    /// The consensus itself may still exceed the CR threshold
    pub fn is_consistent(&self) -> bool {
        self.consistency.is_consistent()
    }
}

/// Full result of analyzing one table
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CriteriaAnalysis {
    /// One entry per numeric row, in row order
    pub results: Vec<RespondentResult>,
    /// `None` when no respondent passed the CR threshold
    pub aggregate: Option<AggregateResult>,
    /// Lines dropped before matrix construction
    pub discarded_rows: usize,
}

impl CriteriaAnalysis {
    /// Number of respondents admitted to aggregation
    pub fn consistent_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_consistent()).count()
    }
}

/// Run the full pipeline on raw table text
///
/// # Errors
/// - [`crate::Error::MalformedInput`] for a row that is not a valid upper triangle
/// - [`crate::Error::NumericDegeneracy`] for a degenerate matrix
/// - [`crate::Error::MatrixShapeMismatch`] when consistent respondents compared
///   different numbers of criteria
pub fn analyze_table(text: &str) -> Result<CriteriaAnalysis> {
    info!("Processing criteria");
    let table = build_matrices(text)?;
    let mut analysis = analyze_matrices(table.respondents)?;
    analysis.discarded_rows = table.discarded_rows;
    Ok(analysis)
}

/// Analyze already-built respondent matrices and aggregate the consistent ones
pub fn analyze_matrices(respondents: Vec<RespondentMatrix>) -> Result<CriteriaAnalysis> {
    let mut results = Vec::with_capacity(respondents.len());

    for RespondentMatrix {
        respondent,
        line,
        matrix,
    } in respondents
    {
        let eigen = dominant_eigen(matrix.as_matrix())?;
        let consistency = score_consistency(matrix.order(), eigen.max_eigenvalue);
        debug!(
            "Engineer {}: λmax = {:.6}, CI = {:.6}, CR = {:.6}, RI = {}",
            respondent, consistency.max_eigenvalue, consistency.ci, consistency.cr, consistency.ri
        );

        if consistency.is_consistent() {
            info!(
                "Engineer {} is consistent (CR = {:.3} <= {})",
                respondent, consistency.cr, CR_THRESHOLD
            );
        } else {
            warn!(
                "Engineer {} excluded from aggregation (CR = {:.3} > {})",
                respondent, consistency.cr, CR_THRESHOLD
            );
        }

        results.push(RespondentResult {
            respondent,
            line,
            matrix,
            weights: eigen.weights,
            consistency,
        });
    }

    let aggregate = aggregate_consistent(&results)?;

    Ok(CriteriaAnalysis {
        results,
        aggregate,
        discarded_rows: 0,
    })
}

/// Geometric-mean aggregate of the respondents with `CR <= 0.10`
pub fn aggregate_consistent(results: &[RespondentResult]) -> Result<Option<AggregateResult>> {
    let consistent: Vec<&ComparisonMatrix> = results
        .iter()
        .filter(|r| r.is_consistent())
        .map(|r| &r.matrix)
        .collect();

    let Some(matrix) = geometric_mean(consistent.iter().copied())? else {
        warn!("No consistent respondents; aggregate result is absent");
        return Ok(None);
    };

    let eigen = dominant_eigen(matrix.as_matrix())?;
    let consistency = score_consistency(matrix.order(), eigen.max_eigenvalue);
    info!(
        "Aggregated {} consistent respondents (aggregate CR = {:.3})",
        consistent.len(),
        consistency.cr
    );

    Ok(Some(AggregateResult {
        matrix,
        weights: eigen.weights,
        consistency,
        respondents: consistent.len(),
    }))
}
