use serde::{Deserialize, Serialize};

pub const DEFAULT_DATA_PATH: &str = "data/transactions_data.csv";
pub const DEFAULT_TEST_DATA_PATH: &str = "data/test_transactions_data.csv";
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Dataset used in normal operation.
    pub data_path: String,
    /// Dataset used when `test_mode` is on.
    pub test_data_path: String,
    /// Enables deletes and switches to the test dataset.
    pub test_mode: bool,
    /// Default log filter when RUST_LOG is unset.
    pub log_level: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_path: DEFAULT_DATA_PATH.into(),
            test_data_path: DEFAULT_TEST_DATA_PATH.into(),
            test_mode: false,
            log_level: DEFAULT_LOG_LEVEL.into(),
        }
    }
}

impl EngineConfig {
    /// Read TEST_MODE, DATA_PATH, TEST_DATA_PATH and LOG_LEVEL from the
    /// process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, with the variable source injected.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            data_path: lookup("DATA_PATH").unwrap_or(defaults.data_path),
            test_data_path: lookup("TEST_DATA_PATH").unwrap_or(defaults.test_data_path),
            test_mode: lookup("TEST_MODE").map_or(false, |v| parse_toggle(&v)),
            log_level: lookup("LOG_LEVEL")
                .map(|v| v.to_lowercase())
                .unwrap_or(defaults.log_level),
        }
    }

    /// Load from a JSON file. Absent fields take their defaults.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        Ok(config)
    }

    /// Config with test mode on, for use in tests.
    pub fn default_test() -> Self {
        Self {
            test_mode: true,
            log_level: "debug".into(),
            ..Self::default()
        }
    }

    /// The dataset to load for the current mode.
    pub fn dataset_path(&self) -> &str {
        if self.test_mode {
            &self.test_data_path
        } else {
            &self.data_path
        }
    }
}

/// `1`, `true` and `yes` (any case) switch a toggle on.
pub fn parse_toggle(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes")
}
