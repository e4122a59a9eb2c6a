//! ledgerscope-runner: headless runner for the transfer-record engine.
//!
//! Usage:
//!   ledgerscope-runner                              load from env config, print summary
//!   ledgerscope-runner --config engine.json         load from a JSON config file
//!   ledgerscope-runner --ipc-mode                   answer JSON queries on stdin
//!   ledgerscope-runner --generate out.csv --rows 5000 --seed 7

use anyhow::Result;
use ledgerscope_core::{
    config::EngineConfig,
    engine::DataEngine,
    error::{EngineError, EngineResult},
    fraud::PredictionRequest,
    store::{Pagination, SearchCriteria, TransactionFilter},
    synthetic::{self, SyntheticConfig},
};
use serde_json::{json, Value};
use std::env;
use std::fs::File;
use std::io::{self, BufRead, BufWriter, Write};

/// Rows returned by one search over IPC.
const SEARCH_RESULT_CAP: usize = 100;

#[derive(serde::Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
enum IpcCommand {
    ListTransactions {
        #[serde(default)]
        page: Option<usize>,
        #[serde(default)]
        limit: Option<usize>,
        #[serde(default)]
        filter: FilterArgs,
    },
    GetTransaction {
        id: String,
    },
    Search {
        criteria: Value,
    },
    Types,
    Recent {
        #[serde(default)]
        n: Option<usize>,
    },
    Delete {
        id: String,
    },
    CustomerTransactions {
        customer_id: String,
        #[serde(default)]
        as_origin: Option<bool>,
    },
    ListCustomers {
        #[serde(default)]
        page: Option<usize>,
        #[serde(default)]
        limit: Option<usize>,
    },
    Customer {
        id: String,
    },
    TopCustomers {
        #[serde(default)]
        n: Option<usize>,
    },
    StatsOverview,
    AmountDistribution,
    StatsByType,
    StatsDaily,
    FraudSummary,
    FraudByType,
    Predict {
        request: Value,
    },
    Health,
    Metadata,
    Quit,
}

#[derive(serde::Deserialize, Default)]
struct FilterArgs {
    #[serde(rename = "type", default)]
    txn_type: Option<String>,
    #[serde(rename = "isFraud", default)]
    is_fraud: Option<i64>,
    #[serde(default)]
    min_amount: Option<f64>,
    #[serde(default)]
    max_amount: Option<f64>,
}

impl FilterArgs {
    fn to_filter(&self) -> EngineResult<TransactionFilter> {
        for bound in [self.min_amount, self.max_amount].into_iter().flatten() {
            if bound < 0.0 {
                return Err(EngineError::invalid("amount bounds must be non-negative"));
            }
        }
        let criteria = SearchCriteria {
            txn_type: self.txn_type.clone(),
            is_fraud: self.is_fraud,
            amount_range: None,
        };
        Ok(TransactionFilter {
            min_amount: self.min_amount,
            max_amount: self.max_amount,
            ..criteria.to_filter()?
        })
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args: Vec<String> = env::args().collect();
    let config = match flag_value(&args, "--config") {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::from_env(),
    };
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_level.as_str()),
    )
    .init();

    if let Some(out) = flag_value(&args, "--generate") {
        let defaults = SyntheticConfig::default();
        let synth = SyntheticConfig {
            seed: parse_arg(&args, "--seed", defaults.seed),
            rows: parse_arg(&args, "--rows", defaults.rows),
            customers: parse_arg(&args, "--customers", defaults.customers),
            steps: parse_arg(&args, "--steps", defaults.steps),
            fraud_rate: parse_arg(&args, "--fraud-rate", defaults.fraud_rate),
        };
        let records = synthetic::generate(&synth);
        synthetic::write_csv(&records, BufWriter::new(File::create(out)?))?;
        println!("Wrote {} synthetic transactions to {out}", records.len());
        return Ok(());
    }

    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");

    let engine = match DataEngine::load(&config) {
        Ok(engine) => engine,
        Err(e) => {
            log::error!("Failed to load transaction data. Exiting.");
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    if ipc_mode {
        run_ipc_loop(&engine)?;
    } else {
        print_summary(&engine, &config);
    }

    Ok(())
}

fn run_ipc_loop(engine: &DataEngine) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                writeln!(stdout, "{}", json!({ "status": 400, "error": e.to_string() }))?;
                stdout.flush()?;
                continue;
            }
        };

        if matches!(cmd, IpcCommand::Quit) {
            break;
        }

        let response = match handle_command(engine, cmd) {
            Ok(data) => json!({ "status": 200, "data": data }),
            Err(e) => {
                let status = e.status_code();
                if status == 500 {
                    log::error!("request failed: {e}");
                }
                json!({ "status": status, "error": e.to_string() })
            }
        };
        writeln!(stdout, "{response}")?;
        stdout.flush()?;
    }
    Ok(())
}

fn handle_command(engine: &DataEngine, cmd: IpcCommand) -> EngineResult<Value> {
    let data = match cmd {
        IpcCommand::ListTransactions { page, limit, filter } => {
            let page = pagination(page, limit)?;
            let (rows, total) = engine.list_transactions(page, &filter.to_filter()?)?;
            json!({ "page": page.page, "limit": page.limit, "total": total, "transactions": rows })
        }
        IpcCommand::GetTransaction { id } => to_value(engine.get_transaction(&id)?)?,
        IpcCommand::Search { criteria } => {
            let criteria: SearchCriteria = serde_json::from_value(criteria)
                .map_err(|e| EngineError::invalid(e.to_string()))?;
            let mut rows = engine.search(&criteria)?;
            rows.truncate(SEARCH_RESULT_CAP);
            to_value(rows)?
        }
        IpcCommand::Types => to_value(engine.unique_types())?,
        IpcCommand::Recent { n } => to_value(engine.recent(bounded_count(n)?))?,
        IpcCommand::Delete { id } => {
            engine.delete(&id)?;
            json!({ "success": true, "message": format!("Transaction {id} deleted successfully") })
        }
        IpcCommand::CustomerTransactions { customer_id, as_origin } => {
            to_value(engine.transactions_by_customer(&customer_id, as_origin.unwrap_or(true)))?
        }
        IpcCommand::ListCustomers { page, limit } => {
            let page = pagination(page, limit)?;
            let (ids, total) = engine.list_customers(page)?;
            json!({ "page": page.page, "limit": page.limit, "total": total, "data": ids })
        }
        IpcCommand::Customer { id } => to_value(engine.customer_stats(&id)?)?,
        IpcCommand::TopCustomers { n } => to_value(engine.top_customers(bounded_count(n)?))?,
        IpcCommand::StatsOverview => to_value(engine.overview())?,
        IpcCommand::AmountDistribution => to_value(engine.amount_distribution())?,
        IpcCommand::StatsByType => to_value(engine.stats_by_type())?,
        IpcCommand::StatsDaily => to_value(engine.daily_stats())?,
        IpcCommand::FraudSummary => to_value(engine.fraud_summary())?,
        IpcCommand::FraudByType => to_value(engine.fraud_by_type())?,
        IpcCommand::Predict { request } => {
            let request: PredictionRequest = serde_json::from_value(request)
                .map_err(|e| EngineError::invalid(e.to_string()))?;
            to_value(engine.predict(&request)?)?
        }
        IpcCommand::Health => to_value(engine.health())?,
        IpcCommand::Metadata => to_value(engine.metadata())?,
        IpcCommand::Quit => Value::Null,
    };
    Ok(data)
}

fn pagination(page: Option<usize>, limit: Option<usize>) -> EngineResult<Pagination> {
    let defaults = Pagination::default();
    Pagination::new(page.unwrap_or(defaults.page), limit.unwrap_or(defaults.limit))
}

/// `n` for the top-N style queries: default 10, at most one page.
fn bounded_count(n: Option<usize>) -> EngineResult<usize> {
    let n = n.unwrap_or(10);
    if !(1..=Pagination::MAX_LIMIT).contains(&n) {
        return Err(EngineError::invalid(format!(
            "n must be between 1 and {}, got {n}",
            Pagination::MAX_LIMIT
        )));
    }
    Ok(n)
}

fn to_value<T: serde::Serialize>(value: T) -> EngineResult<Value> {
    serde_json::to_value(value).map_err(|e| EngineError::Other(e.into()))
}

fn print_summary(engine: &DataEngine, config: &EngineConfig) {
    let meta = engine.metadata();
    let overview = engine.overview();
    let fraud = engine.fraud_summary();

    println!("=== DATASET SUMMARY ===");
    println!("  source:         {}", config.dataset_path());
    println!("  version:        {}", meta.version);
    println!("  test mode:      {}", meta.test_mode);
    println!("  transactions:   {}", overview.total_transactions);
    println!("  customers:      {}", engine.timeline().customer_count());
    println!("  fraud rate:     {:.4}", overview.fraud_rate);
    println!("  avg amount:     {:.2}", overview.avg_amount);
    println!("  top type:       {}", overview.most_common_type);

    println!();
    println!("=== FRAUD SUMMARY ===");
    println!("  total frauds:   {}", fraud.total_frauds);
    println!("  flagged:        {}", fraud.flagged);
    println!("  precision:      {:.2}", fraud.precision);
    println!("  recall:         {:.2}", fraud.recall);
    for t in engine.fraud_by_type() {
        println!(
            "  {:<9} | total: {:>8} | frauds: {:>6} | rate: {:.4}",
            t.txn_type.as_str(),
            t.total,
            t.fraud_count,
            t.fraud_rate
        );
    }

    println!();
    println!("=== AMOUNT DISTRIBUTION ===");
    let dist = engine.amount_distribution();
    for (label, count) in dist.bins.iter().zip(&dist.counts) {
        println!("  {label:<9} {count}");
    }
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    flag_value(args, flag)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_default_to_ten_and_stay_within_one_page() {
        assert_eq!(bounded_count(None).unwrap(), 10);
        assert_eq!(bounded_count(Some(1)).unwrap(), 1);
        assert_eq!(bounded_count(Some(100)).unwrap(), 100);
        for bad in [0, 101, usize::MAX] {
            let err = bounded_count(Some(bad)).unwrap_err();
            assert_eq!(err.status_code(), 400, "n = {bad}");
        }
    }

    #[test]
    fn recent_over_ipc_rejects_out_of_range_n() {
        let engine = DataEngine::from_records(Vec::new(), false);
        let cmd: IpcCommand = serde_json::from_str(r#"{"cmd": "recent", "n": 5000}"#).unwrap();
        let err = handle_command(&engine, cmd).unwrap_err();
        assert!(matches!(err, EngineError::InvalidCriteria { .. }));

        let cmd: IpcCommand = serde_json::from_str(r#"{"cmd": "recent"}"#).unwrap();
        assert_eq!(handle_command(&engine, cmd).unwrap(), json!([]));
    }
}
