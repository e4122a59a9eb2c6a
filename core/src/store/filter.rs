use crate::{
    error::{EngineError, EngineResult},
    record::TransactionRecord,
    types::TransactionType,
};
use serde::Deserialize;
use std::ops::Range;

/// 1-indexed page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: 1, limit: 10 }
    }
}

impl Pagination {
    pub const MAX_LIMIT: usize = 100;

    pub fn new(page: usize, limit: usize) -> EngineResult<Self> {
        let p = Self { page, limit };
        p.validate()?;
        Ok(p)
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.page < 1 {
            return Err(EngineError::invalid(format!(
                "page must be >= 1, got {}",
                self.page
            )));
        }
        if !(1..=Self::MAX_LIMIT).contains(&self.limit) {
            return Err(EngineError::invalid(format!(
                "limit must be between 1 and {}, got {}",
                Self::MAX_LIMIT,
                self.limit
            )));
        }
        Ok(())
    }

    /// Positions `[(page-1)*limit, page*limit)` clipped to `total`.
    pub(crate) fn window(&self, total: usize) -> Range<usize> {
        let start = (self.page - 1).saturating_mul(self.limit).min(total);
        let end = start.saturating_add(self.limit).min(total);
        start..end
    }
}

/// AND-combined row predicate. `None` fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    pub txn_type: Option<TransactionType>,
    pub is_fraud: Option<bool>,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
}

impl TransactionFilter {
    pub fn matches(&self, r: &TransactionRecord) -> bool {
        self.txn_type.map_or(true, |t| r.txn_type == t)
            && self.is_fraud.map_or(true, |f| r.is_fraud == f)
            && self.min_amount.map_or(true, |min| r.amount >= min)
            && self.max_amount.map_or(true, |max| r.amount <= max)
    }
}

/// Search payload as it arrives from the boundary.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchCriteria {
    #[serde(rename = "type", default)]
    pub txn_type: Option<String>,
    #[serde(rename = "isFraud", default)]
    pub is_fraud: Option<i64>,
    #[serde(default)]
    pub amount_range: Option<Vec<f64>>,
}

impl SearchCriteria {
    /// Parse a JSON payload. Shape errors become `InvalidCriteria`.
    pub fn from_json(payload: &str) -> EngineResult<Self> {
        serde_json::from_str(payload).map_err(|e| EngineError::invalid(e.to_string()))
    }

    /// Check every field and turn the payload into a row predicate.
    pub fn to_filter(&self) -> EngineResult<TransactionFilter> {
        let txn_type = self
            .txn_type
            .as_deref()
            .map(|t| {
                t.parse::<TransactionType>()
                    .map_err(|bad| EngineError::invalid(format!("unknown transaction type '{bad}'")))
            })
            .transpose()?;

        let is_fraud = match self.is_fraud {
            None => None,
            Some(0) => Some(false),
            Some(1) => Some(true),
            Some(other) => {
                return Err(EngineError::invalid(format!(
                    "isFraud must be 0 or 1, got {other}"
                )))
            }
        };

        let (min_amount, max_amount) = match self.amount_range.as_deref() {
            None => (None, None),
            Some(&[min, max]) => {
                if !(min.is_finite() && max.is_finite()) || min < 0.0 || max < 0.0 {
                    return Err(EngineError::invalid(
                        "amount_range bounds must be finite and non-negative",
                    ));
                }
                if min > max {
                    return Err(EngineError::invalid(format!(
                        "amount_range min {min} exceeds max {max}"
                    )));
                }
                (Some(min), Some(max))
            }
            Some(other) => {
                return Err(EngineError::invalid(format!(
                    "amount_range must have exactly 2 values, got {}",
                    other.len()
                )))
            }
        };

        Ok(TransactionFilter {
            txn_type,
            is_fraud,
            min_amount,
            max_amount,
        })
    }
}
