//! Validating loader for the delimited transfer-record source.
//!
//! Validation is exhaustive: every rule appends to a `ValidationReport` and
//! the pass/fail decision is taken once, after the whole file has been read.
//! Ids are assigned only when the report comes back clean.

use crate::{
    error::{LoadError, Violation},
    record::{transaction_id, TransactionRecord},
    types::{Step, TransactionType},
};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Upstream column names, in canonical order.
pub const REQUIRED_COLUMNS: [&str; 11] = [
    "step",
    "type",
    "amount",
    "nameOrig",
    "oldbalanceOrg",
    "newbalanceOrig",
    "nameDest",
    "oldbalanceDest",
    "newbalanceDest",
    "isFraud",
    "isFlaggedFraud",
];

const FLAG_COLUMNS: [&str; 2] = ["isFraud", "isFlaggedFraud"];

const AMOUNT_COLUMNS: [&str; 5] = [
    "amount",
    "oldbalanceOrg",
    "newbalanceOrig",
    "oldbalanceDest",
    "newbalanceDest",
];

const NULL_MARKERS: [&str; 7] = ["", "NA", "NaN", "nan", "null", "NULL", "None"];

/// Load and validate the file at `path`.
pub fn load(path: impl AsRef<Path>) -> Result<Vec<TransactionRecord>, LoadError> {
    let path = path.as_ref();
    log::info!("Loading transactions from {}", path.display());
    let file = File::open(path).map_err(|e| {
        let err = LoadError {
            violations: vec![Violation::SourceUnavailable {
                path: path.display().to_string(),
                reason: e.to_string(),
            }],
        };
        log::error!("{err}");
        err
    })?;
    load_from_reader(file, &path.display().to_string())
}

/// Validate any comma-delimited source with a header row.
/// `origin` names the source in error messages.
pub fn load_from_reader<R: Read>(
    reader: R,
    origin: &str,
) -> Result<Vec<TransactionRecord>, LoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut report = ValidationReport::default();

    let headers = match csv_reader.headers() {
        Ok(h) => h.clone(),
        Err(e) => {
            report.push(Violation::SourceUnavailable {
                path: origin.to_string(),
                reason: e.to_string(),
            });
            return Err(report.into_error());
        }
    };

    let columns = ColumnMap::new(&headers);
    let missing = columns.missing();
    if !missing.is_empty() {
        report.push(Violation::MissingColumns { columns: missing });
    }

    let mut parsed = Vec::new();
    for (row, result) in csv_reader.records().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                report.push(Violation::SourceUnavailable {
                    path: origin.to_string(),
                    reason: format!("row {row}: {e}"),
                });
                break;
            }
        };
        if let Some(row_values) = report.check_row(row, &record, &columns) {
            parsed.push(row_values);
        }
    }

    if !report.is_clean() {
        let err = report.into_error();
        log::error!("{err}");
        return Err(err);
    }

    let records: Vec<TransactionRecord> = parsed
        .into_iter()
        .enumerate()
        .map(|(row, values)| values.into_record(transaction_id(row)))
        .collect();
    log::info!("Loaded {} transactions from {origin}", records.len());
    Ok(records)
}

/// Header-name to position lookup.
struct ColumnMap {
    positions: BTreeMap<&'static str, usize>,
}

impl ColumnMap {
    fn new(headers: &csv::StringRecord) -> Self {
        let positions = REQUIRED_COLUMNS
            .iter()
            .filter_map(|name| headers.iter().position(|h| h == *name).map(|i| (*name, i)))
            .collect();
        Self { positions }
    }

    fn missing(&self) -> Vec<String> {
        REQUIRED_COLUMNS
            .iter()
            .filter(|name| !self.positions.contains_key(*name))
            .map(|name| name.to_string())
            .collect()
    }

    /// The cell for `column`, `None` when the column is absent entirely.
    fn cell<'r>(&self, record: &'r csv::StringRecord, column: &str) -> Option<&'r str> {
        self.positions
            .get(column)
            .map(|&i| record.get(i).unwrap_or(""))
    }
}

/// Accumulates violations across all rows and rules.
#[derive(Default)]
struct ValidationReport {
    fatal: Vec<Violation>,
    invalid_type_values: BTreeSet<String>,
    invalid_type_rows: Vec<usize>,
    invalid_flags: BTreeMap<&'static str, Vec<usize>>,
    nulls: BTreeMap<String, usize>,
    malformed: BTreeMap<&'static str, Vec<usize>>,
}

impl ValidationReport {
    fn push(&mut self, violation: Violation) {
        self.fatal.push(violation);
    }

    fn is_clean(&self) -> bool {
        self.fatal.is_empty()
            && self.invalid_type_rows.is_empty()
            && self.invalid_flags.is_empty()
            && self.nulls.is_empty()
            && self.malformed.is_empty()
    }

    /// Run every per-row rule. Returns the typed values only when the row
    /// passed all of them.
    fn check_row(
        &mut self,
        row: usize,
        record: &csv::StringRecord,
        columns: &ColumnMap,
    ) -> Option<RowValues> {
        let mut row_ok = true;

        for name in REQUIRED_COLUMNS {
            if let Some(cell) = columns.cell(record, name) {
                if is_null(cell) {
                    *self.nulls.entry(name.to_string()).or_default() += 1;
                    row_ok = false;
                }
            } else {
                row_ok = false;
            }
        }

        let txn_type = match columns.cell(record, "type").filter(|c| !is_null(c)) {
            Some(cell) => match cell.parse::<TransactionType>() {
                Ok(t) => Some(t),
                Err(bad) => {
                    self.invalid_type_values.insert(bad);
                    self.invalid_type_rows.push(row);
                    None
                }
            },
            None => None,
        };

        let mut flags = [false; 2];
        for (slot, name) in FLAG_COLUMNS.into_iter().enumerate() {
            if let Some(cell) = columns.cell(record, name).filter(|c| !is_null(c)) {
                match parse_flag(cell) {
                    Some(v) => flags[slot] = v,
                    None => {
                        self.invalid_flags.entry(name).or_default().push(row);
                        row_ok = false;
                    }
                }
            }
        }

        let step = match columns.cell(record, "step").filter(|c| !is_null(c)) {
            Some(cell) => {
                let parsed = parse_step(cell);
                if parsed.is_none() {
                    self.malformed.entry("step").or_default().push(row);
                }
                parsed
            }
            None => None,
        };

        let mut amounts = [0.0f64; 5];
        for (slot, name) in AMOUNT_COLUMNS.into_iter().enumerate() {
            if let Some(cell) = columns.cell(record, name).filter(|c| !is_null(c)) {
                match parse_amount(cell) {
                    Some(v) => amounts[slot] = v,
                    None => {
                        self.malformed.entry(name).or_default().push(row);
                        row_ok = false;
                    }
                }
            }
        }

        let (txn_type, step) = match (txn_type, step) {
            (Some(t), Some(s)) if row_ok => (t, s),
            _ => return None,
        };

        Some(RowValues {
            step,
            txn_type,
            amounts,
            origin: columns.cell(record, "nameOrig")?.to_string(),
            dest: columns.cell(record, "nameDest")?.to_string(),
            is_fraud: flags[0],
            is_flagged_fraud: flags[1],
        })
    }

    fn into_error(self) -> LoadError {
        let mut violations = Vec::new();
        // Framing problems first, then column, type, flag, null, value checks.
        let (sources, others): (Vec<_>, Vec<_>) = self
            .fatal
            .into_iter()
            .partition(|v| matches!(v, Violation::SourceUnavailable { .. }));
        violations.extend(sources);
        violations.extend(others);

        if !self.invalid_type_rows.is_empty() {
            violations.push(Violation::InvalidTypes {
                values: self.invalid_type_values.into_iter().collect(),
                rows: self.invalid_type_rows,
            });
        }
        for (column, rows) in self.invalid_flags {
            violations.push(Violation::InvalidFraudFlags { column: column.to_string(), rows });
        }
        if !self.nulls.is_empty() {
            violations.push(Violation::NullValues { counts: self.nulls });
        }
        for (column, rows) in self.malformed {
            violations.push(Violation::MalformedValues { column: column.to_string(), rows });
        }
        LoadError { violations }
    }
}

/// Typed cells of a row that passed validation; the id comes later.
struct RowValues {
    step: Step,
    txn_type: TransactionType,
    amounts: [f64; 5],
    origin: String,
    dest: String,
    is_fraud: bool,
    is_flagged_fraud: bool,
}

impl RowValues {
    fn into_record(self, id: String) -> TransactionRecord {
        let [amount, origin_before, origin_after, dest_before, dest_after] = self.amounts;
        TransactionRecord {
            id,
            step: self.step,
            txn_type: self.txn_type,
            amount,
            origin_customer: self.origin,
            origin_balance_before: origin_before,
            origin_balance_after: origin_after,
            dest_customer: self.dest,
            dest_balance_before: dest_before,
            dest_balance_after: dest_after,
            is_fraud: self.is_fraud,
            is_flagged_fraud: self.is_flagged_fraud,
        }
    }
}

fn is_null(cell: &str) -> bool {
    NULL_MARKERS.contains(&cell)
}

/// `0`/`1`, also written `0.0`/`1.0` by some exporters.
fn parse_flag(cell: &str) -> Option<bool> {
    match cell.parse::<f64>().ok()? {
        v if v == 0.0 => Some(false),
        v if v == 1.0 => Some(true),
        _ => None,
    }
}

fn parse_step(cell: &str) -> Option<Step> {
    if let Ok(v) = cell.parse::<Step>() {
        return Some(v);
    }
    let v = cell.parse::<f64>().ok()?;
    (v.is_finite() && v >= 0.0 && v.fract() == 0.0).then_some(v as Step)
}

fn parse_amount(cell: &str) -> Option<f64> {
    let v = cell.parse::<f64>().ok()?;
    (v.is_finite() && v >= 0.0).then_some(v)
}
