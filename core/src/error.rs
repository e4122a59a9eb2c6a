use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// One category of problem found while validating a source file.
#[derive(Debug, Clone, PartialEq)]
pub enum Violation {
    /// The source could not be opened or its framing could not be read.
    SourceUnavailable { path: String, reason: String },
    /// Required columns absent from the header, in canonical order.
    MissingColumns { columns: Vec<String> },
    /// `type` values outside the accepted set, with the rows that carry them.
    InvalidTypes { values: Vec<String>, rows: Vec<usize> },
    /// Flag cells that are not exactly 0 or 1.
    InvalidFraudFlags { column: String, rows: Vec<usize> },
    /// Empty cells per required column.
    NullValues { counts: BTreeMap<String, usize> },
    /// Numeric cells that do not parse or break the non-negative rule.
    MalformedValues { column: String, rows: Vec<usize> },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SourceUnavailable { path, reason } => {
                write!(f, "cannot read source '{path}': {reason}")
            }
            Self::MissingColumns { columns } => {
                write!(f, "missing required columns: {}", columns.join(", "))
            }
            Self::InvalidTypes { values, rows } => write!(
                f,
                "invalid transaction types {:?} in {} row(s): {}",
                values,
                rows.len(),
                preview(rows)
            ),
            Self::InvalidFraudFlags { column, rows } => write!(
                f,
                "column '{column}' must be 0 or 1, {} offending row(s): {}",
                rows.len(),
                preview(rows)
            ),
            Self::NullValues { counts } => {
                let parts: Vec<String> =
                    counts.iter().map(|(col, n)| format!("{col}={n}")).collect();
                write!(f, "null values found: {}", parts.join(", "))
            }
            Self::MalformedValues { column, rows } => write!(
                f,
                "column '{column}' has non-numeric or negative values in {} row(s): {}",
                rows.len(),
                preview(rows)
            ),
        }
    }
}

/// Show at most ten row indices.
fn preview(rows: &[usize]) -> String {
    const MAX_SHOWN: usize = 10;
    let shown: Vec<String> = rows.iter().take(MAX_SHOWN).map(|r| r.to_string()).collect();
    if rows.len() > MAX_SHOWN {
        format!("{}, ...", shown.join(", "))
    } else {
        shown.join(", ")
    }
}

/// Fatal load failure carrying every violation found in one pass.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("dataset validation failed: {}", summary(.violations))]
pub struct LoadError {
    pub violations: Vec<Violation>,
}

fn summary(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Transaction '{id}' not found")]
    TransactionNotFound { id: String },

    #[error("Customer '{id}' not found")]
    CustomerNotFound { id: String },

    #[error("Invalid search criteria: {details}")]
    InvalidCriteria { details: String },

    #[error("DELETE operations are only allowed in test mode. Set TEST_MODE=1 to enable.")]
    DeleteForbidden,

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl EngineError {
    pub fn invalid(details: impl Into<String>) -> Self {
        Self::InvalidCriteria { details: details.into() }
    }

    /// Response code the routing layer reports for this failure.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::TransactionNotFound { .. } | Self::CustomerNotFound { .. } => 404,
            Self::InvalidCriteria { .. } => 400,
            Self::DeleteForbidden => 403,
            Self::Load(_) | Self::Other(_) => 500,
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
