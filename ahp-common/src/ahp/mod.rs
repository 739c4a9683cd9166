//! AHP math engine
//!
//! Pairwise-comparison analysis for a single criteria level: matrix
//! reconstruction, dominant-eigenvector weights, consistency scoring and
//! geometric-mean aggregation across respondents.
//!
//! The engine is stateless. Every function works on data owned by the caller,
//! so independent requests never share matrices.

pub mod aggregate;
pub mod analysis;
pub mod consistency;
pub mod eigen;
pub mod matrix;

pub use aggregate::geometric_mean;
pub use analysis::{
    aggregate_consistent, analyze_matrices, analyze_table, AggregateResult, CriteriaAnalysis,
    RespondentResult,
};
pub use consistency::{
    is_acceptable, random_index, score_consistency, ConsistencyRecord, CR_THRESHOLD,
};
pub use eigen::{dominant_eigen, normalize_weights, DominantEigen};
pub use matrix::{
    build_matrices, parse_table, ComparisonMatrix, DiscardReason, MatrixTable, ParsedRow,
    RespondentMatrix,
};
