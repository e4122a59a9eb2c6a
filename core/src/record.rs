//! The fixed-field transaction row.
//!
//! Field names on the wire are the upstream column names and must not be
//! renamed; the Rust field names are the readable ones.

use crate::types::{CustomerId, Step, TransactionType, TxnId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: TxnId,
    pub step: Step,
    #[serde(rename = "type")]
    pub txn_type: TransactionType,
    pub amount: f64,
    #[serde(rename = "nameOrig")]
    pub origin_customer: CustomerId,
    #[serde(rename = "oldbalanceOrg")]
    pub origin_balance_before: f64,
    #[serde(rename = "newbalanceOrig")]
    pub origin_balance_after: f64,
    #[serde(rename = "nameDest")]
    pub dest_customer: CustomerId,
    #[serde(rename = "oldbalanceDest")]
    pub dest_balance_before: f64,
    #[serde(rename = "newbalanceDest")]
    pub dest_balance_after: f64,
    #[serde(rename = "isFraud", with = "flag")]
    pub is_fraud: bool,
    #[serde(rename = "isFlaggedFraud", with = "flag")]
    pub is_flagged_fraud: bool,
}

/// Format the synthetic id for a zero-based row position.
pub fn transaction_id(row: usize) -> TxnId {
    format!("tx_{row:07}")
}

/// Booleans travel as 0/1 integers.
pub(crate) mod flag {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        match u8::deserialize(d)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(D::Error::custom(format!("flag must be 0 or 1, got {other}"))),
        }
    }
}
