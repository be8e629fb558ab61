//! Engine configuration via `docfield.toml`
//!
//! On first open of a directory a commented default `docfield.toml` is
//! written. To change settings, edit the file and reopen.

use docfield_core::{Error, LogEntry, Order, Product, Record, Result, User};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Config file name placed in the configuration directory.
pub const CONFIG_FILE_NAME: &str = "docfield.toml";

/// Upper bound for `log_retention_days` (about a century)
pub const MAX_LOG_RETENTION_DAYS: u32 = 36_500;

fn default_page_size() -> usize {
    50
}

fn default_max_page_size() -> usize {
    1000
}

fn default_log_retention_days() -> u32 {
    30
}

fn default_scan_warn_threshold() -> usize {
    10_000
}

fn default_recent_errors_limit() -> usize {
    10
}

fn columns(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn default_user_indexes() -> Vec<String> {
    columns(&["profile"])
}

fn default_product_indexes() -> Vec<String> {
    columns(&["specifications", "tags"])
}

fn default_order_indexes() -> Vec<String> {
    columns(&["items"])
}

fn default_log_indexes() -> Vec<String> {
    columns(&["data"])
}

/// Containment-indexed document columns per table
///
/// Columns not listed are still searchable by containment; lookups on them
/// scan the table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndexConfig {
    /// Indexed `users` columns
    #[serde(default = "default_user_indexes")]
    pub users: Vec<String>,
    /// Indexed `products` columns
    #[serde(default = "default_product_indexes")]
    pub products: Vec<String>,
    /// Indexed `orders` columns
    #[serde(default = "default_order_indexes")]
    pub orders: Vec<String>,
    /// Indexed `logs` columns
    #[serde(default = "default_log_indexes")]
    pub logs: Vec<String>,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            users: default_user_indexes(),
            products: default_product_indexes(),
            orders: default_order_indexes(),
            logs: default_log_indexes(),
        }
    }
}

impl IndexConfig {
    /// No containment indices at all
    pub fn none() -> Self {
        Self {
            users: Vec::new(),
            products: Vec::new(),
            orders: Vec::new(),
            logs: Vec::new(),
        }
    }

    fn validate(&self) -> Result<()> {
        check_columns::<User>(&self.users)?;
        check_columns::<Product>(&self.products)?;
        check_columns::<Order>(&self.orders)?;
        check_columns::<LogEntry>(&self.logs)
    }
}

fn check_columns<R: Record>(names: &[String]) -> Result<()> {
    for name in names {
        if R::document_field(name).is_none() {
            return Err(Error::validation(format!(
                "[indexes] {}: '{name}' is not a document column",
                R::KIND.table_name()
            )));
        }
    }
    Ok(())
}

/// Engine configuration loaded from `docfield.toml`.
///
/// # Example
///
/// ```toml
/// default_page_size = 50
/// max_page_size = 1000
/// log_retention_days = 30
///
/// [indexes]
/// products = ["specifications", "tags"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    /// Log page size used when the caller passes 0.
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,
    /// Largest page size a caller may request.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,
    /// Default age cutoff, in days, for log cleanup.
    #[serde(default = "default_log_retention_days")]
    pub log_retention_days: u32,
    /// Row count above which a full-scan range query logs a warning.
    #[serde(default = "default_scan_warn_threshold")]
    pub scan_warn_threshold: usize,
    /// Number of recent errors returned by error analytics.
    #[serde(default = "default_recent_errors_limit")]
    pub recent_errors_limit: usize,
    /// Containment indices.
    #[serde(default)]
    pub indexes: IndexConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            log_retention_days: default_log_retention_days(),
            scan_warn_threshold: default_scan_warn_threshold(),
            recent_errors_limit: default_recent_errors_limit(),
            indexes: IndexConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# docfield engine configuration

# Log paging: page size used when none is given, and the largest allowed.
default_page_size = 50
max_page_size = 1000

# Log cleanup removes entries older than this many days by default.
log_retention_days = 30

# Range queries on document paths scan every row. Scans over this many
# rows are logged at warn level.
scan_warn_threshold = 10000

# Number of most recent errors returned by error analytics.
recent_errors_limit = 10

# Document columns with a containment index. Containment searches on other
# columns still work but scan the table.
[indexes]
users = ["profile"]
products = ["specifications", "tags"]
orders = ["items"]
logs = ["data"]
"#
    }

    /// Parse and validate config text.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the text is not valid TOML for this config or
    /// fails [`validate`](Self::validate).
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(content)
            .map_err(|e| Error::validation(format!("failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate config from a file path.
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable` if the file cannot be read, `Validation`
    /// if it cannot be parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::unavailable(format!(
                "failed to read config file '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            Error::Validation(msg) => Error::validation(format!("{}: {msg}", path.display())),
            other => other,
        })
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                Error::unavailable(format!(
                    "failed to write default config file '{}': {e}",
                    path.display()
                ))
            })?;
        }
        Ok(())
    }

    /// Load `docfield.toml` from `dir`, creating the default file first if
    /// it is missing.
    pub fn load_or_create(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        Self::write_default_if_missing(&path)?;
        Self::from_file(&path)
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::validation(format!("failed to serialize config: {e}")))?;
        std::fs::write(path, content).map_err(|e| {
            Error::unavailable(format!(
                "failed to write config file '{}': {e}",
                path.display()
            ))
        })
    }

    /// Check value ranges and index column names.
    pub fn validate(&self) -> Result<()> {
        if self.default_page_size == 0 || self.max_page_size == 0 {
            return Err(Error::validation("page sizes must be greater than zero"));
        }
        if self.default_page_size > self.max_page_size {
            return Err(Error::validation(format!(
                "default_page_size {} exceeds max_page_size {}",
                self.default_page_size, self.max_page_size
            )));
        }
        if self.log_retention_days == 0 || self.log_retention_days > MAX_LOG_RETENTION_DAYS {
            return Err(Error::validation(format!(
                "log_retention_days must be between 1 and {MAX_LOG_RETENTION_DAYS}"
            )));
        }
        self.indexes.validate()
    }
}
