//! Fraud heuristics.
//!
//! This module:
//!   1. Aggregates the labelled fraud data once at startup (summary and
//!      per-type rates, precision and recall of the upstream flag)
//!   2. Scores hypothetical transactions with four fixed, additive rules
//!
//! Scoring is a pure function of the request and the customer timeline.

use crate::{
    error::{EngineError, EngineResult},
    grouping::GroupedTotals,
    record::TransactionRecord,
    timeline::CustomerTimeline,
    types::{round_to, CustomerId, Step, TransactionType},
};
use serde::{Deserialize, Serialize};

// ── Constants ────────────────────────────────────────────────────────────────

pub const BALANCE_TOLERANCE: f64 = 0.01;
pub const HIGH_AMOUNT_THRESHOLD: f64 = 100_000.0;
/// Largest step distance that still counts as rapid activity.
pub const RAPID_STEP_GAP: Step = 1;
/// Probability strictly above this is reported as fraud.
pub const FRAUD_THRESHOLD: f64 = 0.5;

// ── Startup aggregates ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FraudSummary {
    pub total_frauds: u64,
    pub flagged: u64,
    pub flagged_and_fraud: u64,
    pub precision: f64,
    pub recall: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FraudByType {
    #[serde(rename = "type")]
    pub txn_type: TransactionType,
    pub total: u64,
    pub fraud_count: u64,
    pub fraud_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FraudStats {
    pub fraud_summary: FraudSummary,
    pub fraud_by_type: Vec<FraudByType>,
}

impl FraudStats {
    pub fn compute(rows: &[TransactionRecord]) -> Self {
        let mut total_frauds = 0u64;
        let mut flagged = 0u64;
        let mut flagged_and_fraud = 0u64;
        // sum of the 0/1 label per type == fraud count
        let mut by_type: GroupedTotals<TransactionType> = GroupedTotals::new();

        for r in rows {
            total_frauds += u64::from(r.is_fraud);
            flagged += u64::from(r.is_flagged_fraud);
            flagged_and_fraud += u64::from(r.is_fraud && r.is_flagged_fraud);
            by_type.add(r.txn_type, if r.is_fraud { 1.0 } else { 0.0 });
        }

        let fraud_summary = FraudSummary {
            total_frauds,
            flagged,
            flagged_and_fraud,
            precision: round_to(ratio(flagged_and_fraud, flagged), 2),
            recall: round_to(ratio(flagged_and_fraud, total_frauds), 2),
        };

        let fraud_by_type = by_type
            .iter()
            .map(|(t, totals)| {
                let fraud_count = totals.sum.round() as u64;
                FraudByType {
                    txn_type: *t,
                    total: totals.count,
                    fraud_count,
                    fraud_rate: round_to(ratio(fraud_count, totals.count), 4),
                }
            })
            .collect();

        log::debug!(
            "Computed fraud statistics: {total_frauds} frauds, {flagged} flagged, {flagged_and_fraud} both"
        );

        Self {
            fraud_summary,
            fraud_by_type,
        }
    }
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

// ── On-demand scoring ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FraudRule {
    BalanceMismatch,
    CashExitType,
    HighAmount,
    RapidActivity,
}

impl FraudRule {
    pub fn weight(&self) -> f64 {
        match self {
            Self::BalanceMismatch => 0.3,
            Self::CashExitType => 0.3,
            Self::HighAmount => 0.4,
            Self::RapidActivity => 0.3,
        }
    }
}

/// A hypothetical transaction to score.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PredictionRequest {
    #[serde(rename = "type")]
    pub txn_type: TransactionType,
    pub amount: f64,
    #[serde(rename = "oldbalanceOrg")]
    pub old_balance_origin: f64,
    #[serde(rename = "newbalanceOrig")]
    pub new_balance_origin: f64,
    #[serde(rename = "nameOrig", default)]
    pub origin_customer: Option<CustomerId>,
    #[serde(default)]
    pub step: Option<Step>,
}

impl PredictionRequest {
    pub fn new(
        txn_type: TransactionType,
        amount: f64,
        old_balance_origin: f64,
        new_balance_origin: f64,
    ) -> Self {
        Self {
            txn_type,
            amount,
            old_balance_origin,
            new_balance_origin,
            origin_customer: None,
            step: None,
        }
    }

    /// Enable the rapid-activity rule for this request.
    pub fn with_history(mut self, origin_customer: impl Into<CustomerId>, step: Step) -> Self {
        self.origin_customer = Some(origin_customer.into());
        self.step = Some(step);
        self
    }

    /// Parse a JSON payload. Unknown types and shape errors are rejected.
    pub fn from_json(payload: &str) -> EngineResult<Self> {
        let req: Self =
            serde_json::from_str(payload).map_err(|e| EngineError::invalid(e.to_string()))?;
        req.validate()?;
        Ok(req)
    }

    pub fn validate(&self) -> EngineResult<()> {
        let fields = [
            ("amount", self.amount),
            ("oldbalanceOrg", self.old_balance_origin),
            ("newbalanceOrig", self.new_balance_origin),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(EngineError::invalid(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FraudPrediction {
    #[serde(rename = "isFraud")]
    pub is_fraud: bool,
    pub probability: f64,
    #[serde(skip)]
    pub triggered_rules: Vec<FraudRule>,
}

/// Score `req` against the four rules. Each rule adds its weight once;
/// the total is clamped to [0, 1].
pub fn predict(req: &PredictionRequest, timeline: &CustomerTimeline) -> FraudPrediction {
    let mut triggered = Vec::new();

    let expected_balance = req.old_balance_origin - req.amount;
    if (expected_balance - req.new_balance_origin).abs() > BALANCE_TOLERANCE {
        triggered.push(FraudRule::BalanceMismatch);
    }

    if req.txn_type.is_cash_exit() {
        triggered.push(FraudRule::CashExitType);
    }

    if req.amount > HIGH_AMOUNT_THRESHOLD {
        triggered.push(FraudRule::HighAmount);
    }

    if let (Some(customer), Some(step)) = (req.origin_customer.as_deref(), req.step) {
        if has_rapid_activity(timeline, customer, step) {
            triggered.push(FraudRule::RapidActivity);
        }
    }

    let score: f64 = triggered.iter().map(FraudRule::weight).sum();
    let probability = round_to(score.clamp(0.0, 1.0), 2);
    let prediction = FraudPrediction {
        is_fraud: probability > FRAUD_THRESHOLD,
        probability,
        triggered_rules: triggered,
    };
    log::debug!(
        "fraud score type={} amount={:.2}: {:?} -> {}",
        req.txn_type,
        req.amount,
        prediction.triggered_rules,
        prediction.probability
    );
    prediction
}

/// True if the customer has an existing entry at a different step no more
/// than `RAPID_STEP_GAP` away. Stops at the first match.
fn has_rapid_activity(timeline: &CustomerTimeline, customer: &str, step: Step) -> bool {
    timeline
        .timeline_for(customer)
        .iter()
        .any(|e| e.step != step && e.step.abs_diff(step) <= RAPID_STEP_GAP)
}
