//! Shared primitive types used across the entire engine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A simulation step. One step = one hour of simulated time.
pub type Step = u64;

/// A synthetic transaction identifier (`tx_0000000` form).
pub type TxnId = String;

/// A customer identifier as it appears in the source (`C1231006815`, `M1979787155`).
pub type CustomerId = String;

/// Position of a row in the loaded table. Stable for the life of the process.
pub type RowRef = usize;

/// Steps per simulated day.
pub const STEPS_PER_DAY: Step = 24;

/// The closed set of transfer kinds accepted from upstream.
///
/// Variant order matches the alphabetical wire spelling, so `Ord` gives the
/// same ordering a sorted group-by over the raw strings would.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    #[serde(rename = "CASH_IN")]
    CashIn,
    #[serde(rename = "CASH_OUT")]
    CashOut,
    #[serde(rename = "DEBIT")]
    Debit,
    #[serde(rename = "PAYMENT")]
    Payment,
    #[serde(rename = "TRANSFER")]
    Transfer,
}

impl TransactionType {
    pub const ALL: [TransactionType; 5] = [
        Self::CashIn,
        Self::CashOut,
        Self::Debit,
        Self::Payment,
        Self::Transfer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CashIn => "CASH_IN",
            Self::CashOut => "CASH_OUT",
            Self::Debit => "DEBIT",
            Self::Payment => "PAYMENT",
            Self::Transfer => "TRANSFER",
        }
    }

    /// Types that move money out of the platform.
    pub fn is_cash_exit(&self) -> bool {
        matches!(self, Self::CashOut | Self::Transfer)
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// Round to `places` decimal digits, half away from zero.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
