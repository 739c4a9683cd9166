//! Matrix Builder
//!
//! Turns uploaded table text into reciprocal pairwise-comparison matrices.
//!
//! Each numeric row of the table is one respondent (engineer) and carries the
//! strict upper triangle of that respondent's comparison matrix, row-major:
//! `(0,1), (0,2), ..., (0,n-1), (1,2), ...`. A row of `k` values therefore
//! describes an `n x n` matrix where `k = n(n-1)/2`.
//!
//! Parsing is a two-stage process:
//! 1. [`parse_table`] classifies every line as [`ParsedRow::Numeric`] or
//!    [`ParsedRow::Discarded`]. Header and garbage rows are expected and are
//!    never an error.
//! 2. [`build_matrices`] validates the length of each numeric row and builds
//!    one [`ComparisonMatrix`] per respondent. A row whose length is not a
//!    triangular number aborts the whole table with
//!    [`Error::MalformedInput`].

use crate::{Error, Result};
use nalgebra::DMatrix;
use tracing::{debug, info};

/// Square reciprocal pairwise-comparison matrix
///
/// Diagonal is 1 and `m[(j, i)] == 1 / m[(i, j)]`. The matrix is immutable once
/// built; callers only get shared access to the underlying values.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonMatrix {
    values: DMatrix<f64>,
}

impl ComparisonMatrix {
    /// Build a matrix from its flattened strict upper triangle
    ///
    /// Returns `None` when `values.len()` is not `n(n-1)/2` for any `n >= 1`.
    /// An empty slice yields the 1x1 identity matrix.
    ///
    /// # Examples
    /// ```
    /// use ahp_common::ahp::ComparisonMatrix;
    ///
    /// let m = ComparisonMatrix::from_upper_triangle(&[2.0, 3.0, 1.5]).unwrap();
    /// assert_eq!(m.order(), 3);
    /// assert_eq!(m.get(0, 2), 3.0);
    /// assert_eq!(m.get(2, 0), 1.0 / 3.0);
    ///
    /// assert!(ComparisonMatrix::from_upper_triangle(&[1.0, 2.0, 3.0, 4.0]).is_none());
    /// ```
    pub fn from_upper_triangle(values: &[f64]) -> Option<Self> {
        let n = order_for_pair_count(values.len())?;
        let mut matrix = DMatrix::<f64>::identity(n, n);

        let mut next = values.iter().copied();
        for row in 0..n {
            for col in (row + 1)..n {
                // Length was validated above, so the iterator cannot run dry
                let v = next.next()?;
                matrix[(row, col)] = v;
                matrix[(col, row)] = 1.0 / v;
            }
        }

        Some(Self { values: matrix })
    }

    /// Wrap an already-reciprocal matrix (geometric mean output)
    pub(crate) fn from_reciprocal(values: DMatrix<f64>) -> Self {
        debug_assert!(values.is_square());
        Self { values }
    }

    /// Matrix order `n` (number of criteria)
    pub fn order(&self) -> usize {
        self.values.nrows()
    }

    /// Entry at `(row, col)`
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[(row, col)]
    }

    /// Underlying nalgebra matrix
    pub fn as_matrix(&self) -> &DMatrix<f64> {
        &self.values
    }

    /// Flatten back into the upper-triangular row-major input order
    pub fn upper_triangle(&self) -> Vec<f64> {
        let n = self.order();
        let mut out = Vec::with_capacity(n * n.saturating_sub(1) / 2);
        for row in 0..n {
            for col in (row + 1)..n {
                out.push(self.values[(row, col)]);
            }
        }
        out
    }

    /// Row-major nested vectors for presentation
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        (0..self.order())
            .map(|row| self.values.row(row).iter().copied().collect())
            .collect()
    }
}

/// Solve `n(n-1)/2 = pair_count` for an integer `n >= 1`
///
/// # Examples
/// ```
/// use ahp_common::ahp::matrix::order_for_pair_count;
///
/// assert_eq!(order_for_pair_count(0), Some(1));
/// assert_eq!(order_for_pair_count(3), Some(3));
/// assert_eq!(order_for_pair_count(45), Some(10));
/// assert_eq!(order_for_pair_count(4), None);
/// ```
pub fn order_for_pair_count(pair_count: usize) -> Option<usize> {
    let discriminant = (1 + 8 * pair_count) as f64;
    let n = ((1.0 + discriminant.sqrt()) / 2.0).round() as usize;
    (n >= 1 && n * (n - 1) / 2 == pair_count).then_some(n)
}

/// Why a line of the uploaded table was dropped before matrix construction
#[derive(Debug, Clone, PartialEq)]
pub enum DiscardReason {
    /// Cell could not be read as a number (e.g. a header label)
    NonNumeric { column: usize, cell: String },
    /// Cell is empty or the line is shorter than the table
    MissingCell { column: usize },
    /// Cell parsed to NaN or infinity
    NonFinite { column: usize },
}

/// One classified line of the uploaded table
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedRow {
    /// Every cell coerced to a finite number
    Numeric {
        /// 1-based line number in the source text
        line: usize,
        values: Vec<f64>,
    },
    /// Line dropped from the analysis
    Discarded {
        /// 1-based line number in the source text
        line: usize,
        reason: DiscardReason,
    },
}

/// Classify every non-blank line of a headerless comma-delimited table
///
/// The table is as wide as its widest line; shorter lines have missing cells
/// and are discarded along with any line holding a non-numeric cell.
pub fn parse_table(text: &str) -> Vec<ParsedRow> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let lines: Vec<(usize, Vec<String>)> = text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| (idx + 1, split_cells(line)))
        .collect();

    let width = lines.iter().map(|(_, cells)| cells.len()).max().unwrap_or(0);

    lines
        .into_iter()
        .map(|(line, cells)| classify_row(line, &cells, width))
        .collect()
}

fn classify_row(line: usize, cells: &[String], width: usize) -> ParsedRow {
    let mut values = Vec::with_capacity(width);

    for column in 0..width {
        let Some(cell) = cells.get(column) else {
            return ParsedRow::Discarded {
                line,
                reason: DiscardReason::MissingCell { column },
            };
        };
        if cell.is_empty() {
            return ParsedRow::Discarded {
                line,
                reason: DiscardReason::MissingCell { column },
            };
        }
        match cell.parse::<f64>() {
            Ok(v) if v.is_finite() => values.push(v),
            Ok(_) => {
                return ParsedRow::Discarded {
                    line,
                    reason: DiscardReason::NonFinite { column },
                }
            }
            Err(_) => {
                return ParsedRow::Discarded {
                    line,
                    reason: DiscardReason::NonNumeric {
                        column,
                        cell: cell.clone(),
                    },
                }
            }
        }
    }

    ParsedRow::Numeric { line, values }
}

/// Split one line on commas, honouring double-quoted cells
fn split_cells(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                cells.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    cells.push(current.trim().to_string());

    cells
}

/// One respondent's comparison matrix with its traceability labels
#[derive(Debug, Clone, PartialEq)]
pub struct RespondentMatrix {
    /// 1-based ordinal among numeric rows
    pub respondent: usize,
    /// 1-based line number in the source text
    pub line: usize,
    pub matrix: ComparisonMatrix,
}

impl RespondentMatrix {
    /// Display label, e.g. `"Engineer 2"`
    pub fn label(&self) -> String {
        respondent_label(self.respondent)
    }
}

/// Display label for a respondent ordinal
pub fn respondent_label(respondent: usize) -> String {
    format!("Engineer {}", respondent)
}

/// Output of [`build_matrices`]
#[derive(Debug, Clone, Default)]
pub struct MatrixTable {
    pub respondents: Vec<RespondentMatrix>,
    /// Lines dropped as non-numeric, ragged or non-finite
    pub discarded_rows: usize,
}

/// Build one comparison matrix per numeric row of `text`
///
/// # Errors
/// [`Error::MalformedInput`] for the first numeric row whose length is not
/// `n(n-1)/2`. No matrices are returned in that case.
pub fn build_matrices(text: &str) -> Result<MatrixTable> {
    info!("Creating matrices from file content");

    let mut table = MatrixTable::default();

    for row in parse_table(text) {
        match row {
            ParsedRow::Discarded { line, reason } => {
                debug!("Discarding line {}: {:?}", line, reason);
                table.discarded_rows += 1;
            }
            ParsedRow::Numeric { line, values } => {
                let respondent = table.respondents.len() + 1;
                let matrix = ComparisonMatrix::from_upper_triangle(&values).ok_or(
                    Error::MalformedInput {
                        respondent,
                        line,
                        cells: values.len(),
                    },
                )?;
                debug!(
                    "Engineer {} (line {}): {}x{} matrix",
                    respondent,
                    line,
                    matrix.order(),
                    matrix.order()
                );
                table.respondents.push(RespondentMatrix {
                    respondent,
                    line,
                    matrix,
                });
            }
        }
    }

    info!(
        "Built {} matrices ({} rows discarded)",
        table.respondents.len(),
        table.discarded_rows
    );
    Ok(table)
}
