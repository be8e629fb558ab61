//! Application log table
//!
//! Log entries are append-mostly rows with a fixed `timestamp`. Reads come
//! back newest-first. Retention is enforced by explicit [`LogService::cleanup`]
//! calls; nothing runs in the background.

use crate::database::Database;
use crate::mutation::MutationService;
use crate::query::{sort_records, RecordOrder};
use chrono::{DateTime, Duration, NaiveDate, Timelike, Utc};
use docfield_core::{
    DocumentValue, Error, LogEntry, NewLogEntry, RelationalFilter, Result,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Level marking an entry as an error for analytics
pub const ERROR_LEVEL: &str = "error";

/// One page of log entries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogPage {
    /// Entries on this page, newest first
    pub entries: Vec<LogEntry>,
    /// 1-based page number
    pub page: usize,
    /// Page size actually applied
    pub page_size: usize,
    /// Entries in the table
    pub total: usize,
    /// Pages needed for `total` at `page_size`
    pub total_pages: usize,
}

/// Error count in one hour
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourlyErrorCount {
    /// UTC date
    pub date: NaiveDate,
    /// UTC hour, 0-23
    pub hour: u32,
    /// Errors logged in that hour
    pub count: usize,
}

/// Summary of a recent error
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentError {
    /// Log entry id
    pub id: u64,
    /// Log message
    pub message: String,
    /// When it was logged
    pub timestamp: DateTime<Utc>,
}

/// Result of [`LogService::error_analytics`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorAnalytics {
    /// Entries at level `error`
    pub total_errors: usize,
    /// Counts per (date, hour), ascending
    pub by_hour: Vec<HourlyErrorCount>,
    /// Most recent errors, newest first
    pub recent: Vec<RecentError>,
}

/// Log table operations
#[derive(Debug, Clone)]
pub struct LogService {
    db: Arc<Database>,
    mutations: MutationService,
}

impl LogService {
    /// Service over `db`
    pub fn new(db: Arc<Database>) -> Self {
        let mutations = MutationService::new(db.clone());
        LogService { db, mutations }
    }

    /// Record a new entry stamped with the current time
    pub fn append(&self, entry: NewLogEntry) -> Result<LogEntry> {
        self.mutations.create(entry)
    }

    /// Page `page` (1-based) of all entries, newest first
    ///
    /// `page_size` 0 selects the configured default; sizes above the
    /// configured maximum are clamped.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if `page` is 0.
    pub fn page(&self, page: usize, page_size: usize) -> Result<LogPage> {
        if page == 0 {
            return Err(Error::validation("page numbers start at 1"));
        }
        let config = self.db.config();
        let page_size = match page_size {
            0 => config.default_page_size,
            n => n.min(config.max_page_size),
        };

        let mut rows = self.db.store::<LogEntry>()?.scan_all()?;
        let total = rows.len();
        sort_records(&mut rows, RecordOrder::NewestFirst);

        let entries: Vec<LogEntry> = rows
            .into_iter()
            .skip((page - 1).saturating_mul(page_size))
            .take(page_size)
            .collect();
        debug!(page, page_size, total, returned = entries.len(), "log page");

        Ok(LogPage {
            entries,
            page,
            page_size,
            total,
            total_pages: total.div_ceil(page_size),
        })
    }

    /// Entries at exactly `level`
    pub fn by_level(&self, level: &str) -> Result<Vec<LogEntry>> {
        self.filtered("level", RelationalFilter::equals(level))
    }

    /// Entries whose message contains `needle` (case-sensitive)
    pub fn search_message(&self, needle: &str) -> Result<Vec<LogEntry>> {
        self.filtered("message", RelationalFilter::text_contains(needle))
    }

    /// Entries whose `data` has `key` equal to `value`
    pub fn by_data(&self, key: &str, value: impl Into<DocumentValue>) -> Result<Vec<LogEntry>> {
        self.contained("data", DocumentValue::single_entry(key, value))
    }

    /// Entries whose `context` has `key` equal to `value`
    pub fn by_context(&self, key: &str, value: impl Into<DocumentValue>) -> Result<Vec<LogEntry>> {
        self.contained("context", DocumentValue::single_entry(key, value))
    }

    /// Entries logged in `[from, to]`
    ///
    /// # Errors
    ///
    /// Returns `Validation` if `from` is after `to`.
    pub fn between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Vec<LogEntry>> {
        if from > to {
            return Err(Error::validation(format!(
                "time range start {} is after end {}",
                from.to_rfc3339(),
                to.to_rfc3339()
            )));
        }
        self.filtered("timestamp", RelationalFilter::between(from, to))
    }

    /// Error totals, hourly counts and the most recent errors
    pub fn error_analytics(&self) -> Result<ErrorAnalytics> {
        let mut errors = self.by_level(ERROR_LEVEL)?;

        let mut hourly: BTreeMap<(NaiveDate, u32), usize> = BTreeMap::new();
        for entry in &errors {
            *hourly
                .entry((entry.timestamp.date_naive(), entry.timestamp.hour()))
                .or_default() += 1;
        }
        let by_hour = hourly
            .into_iter()
            .map(|((date, hour), count)| HourlyErrorCount { date, hour, count })
            .collect();

        let total_errors = errors.len();
        errors.truncate(self.db.config().recent_errors_limit);
        let recent = errors
            .into_iter()
            .map(|e| RecentError {
                id: e.id,
                message: e.message,
                timestamp: e.timestamp,
            })
            .collect();

        Ok(ErrorAnalytics {
            total_errors,
            by_hour,
            recent,
        })
    }

    /// Delete entries older than `days_old` days
    ///
    /// `None` uses the configured retention. Entries exactly at the cutoff
    /// are kept. Returns the number deleted.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the cutoff falls outside the representable
    /// time range.
    pub fn cleanup(&self, days_old: Option<u32>) -> Result<usize> {
        let days = days_old.unwrap_or(self.db.config().log_retention_days);
        let cutoff = Duration::try_days(i64::from(days))
            .and_then(|age| Utc::now().checked_sub_signed(age))
            .ok_or_else(|| Error::validation(format!("cleanup age of {days} days is out of range")))?;
        let store = self.db.store::<LogEntry>()?;

        let stale = store.find_by_relational_filter("timestamp", &RelationalFilter::before(cutoff))?;
        let mut deleted = 0;
        for entry in stale {
            if store.delete(entry.id)? {
                deleted += 1;
            }
        }
        info!(target: "docfield::db", days, cutoff = %cutoff.to_rfc3339(), deleted, "Log cleanup");
        Ok(deleted)
    }

    fn filtered(&self, column: &str, filter: RelationalFilter) -> Result<Vec<LogEntry>> {
        let mut rows = self
            .db
            .store::<LogEntry>()?
            .find_by_relational_filter(column, &filter)?;
        sort_records(&mut rows, RecordOrder::NewestFirst);
        Ok(rows)
    }

    fn contained(&self, column: &str, probe: DocumentValue) -> Result<Vec<LogEntry>> {
        let mut rows = self
            .db
            .store::<LogEntry>()?
            .find_by_containment(column, &probe)?;
        sort_records(&mut rows, RecordOrder::NewestFirst);
        Ok(rows)
    }
}
