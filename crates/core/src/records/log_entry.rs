use crate::column::ColumnValue;
use crate::error::Result;
use crate::record::{
    column_not_writable, or_empty, require_max_len, require_non_empty, Draft, DocumentField,
    EntityKind, Record, RecordId, RelationalField,
};
use crate::value::DocumentValue;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const LEVEL_MAX: usize = 20;
const MESSAGE_MAX: usize = 1000;

/// Level given to entries created without one
pub const DEFAULT_LOG_LEVEL: &str = "info";

const DATA: DocumentField = DocumentField::object("data");
const CONTEXT: DocumentField = DocumentField::object("context");

/// Row of the `logs` table
///
/// Log entries have no modification time; `timestamp` is the insert time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// Row id
    pub id: RecordId,
    /// Severity (`info`, `warning`, `error`, ...)
    pub level: String,
    /// Human-readable message
    pub message: String,
    /// Structured payload
    pub data: DocumentValue,
    /// Request context (ip, user agent, session, ...)
    pub context: DocumentValue,
    /// Insert time
    pub timestamp: DateTime<Utc>,
    /// Optimistic concurrency token
    pub version: u64,
}

impl Record for LogEntry {
    const KIND: EntityKind = EntityKind::LogEntry;
    const DOCUMENT_FIELDS: &'static [DocumentField] = &[DATA, CONTEXT];
    const RELATIONAL_FIELDS: &'static [RelationalField] = &[
        RelationalField::fixed("id"),
        RelationalField::mutable("level"),
        RelationalField::mutable("message"),
        RelationalField::fixed("timestamp"),
    ];

    fn id(&self) -> RecordId {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn set_version(&mut self, version: u64) {
        self.version = version;
    }

    fn document(&self, column: &str) -> Option<&DocumentValue> {
        match column {
            "data" => Some(&self.data),
            "context" => Some(&self.context),
            _ => None,
        }
    }

    fn document_mut(&mut self, column: &str) -> Option<&mut DocumentValue> {
        match column {
            "data" => Some(&mut self.data),
            "context" => Some(&mut self.context),
            _ => None,
        }
    }

    fn column(&self, name: &str) -> Option<ColumnValue> {
        match name {
            "id" => Some(self.id.into()),
            "level" => Some(self.level.as_str().into()),
            "message" => Some(self.message.as_str().into()),
            "timestamp" => Some(self.timestamp.into()),
            _ => None,
        }
    }

    fn set_column(&mut self, name: &str, value: ColumnValue) -> Result<()> {
        match name {
            "level" => self.level = value.into_text(name)?,
            "message" => self.message = value.into_text(name)?,
            _ => return Err(column_not_writable::<Self>(name)),
        }
        Ok(())
    }

    fn validate_fields(&self) -> Result<()> {
        require_non_empty("level", &self.level)?;
        require_max_len("level", &self.level, LEVEL_MAX)?;
        require_max_len("message", &self.message, MESSAGE_MAX)
    }

    fn touch(&mut self, _now: DateTime<Utc>) {}

    fn sort_timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Creation payload for [`LogEntry`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewLogEntry {
    /// Severity (defaults to `info`)
    pub level: Option<String>,
    /// Message
    pub message: String,
    /// Payload (defaults to `{}`)
    pub data: DocumentValue,
    /// Context (defaults to `{}`)
    pub context: DocumentValue,
}

impl NewLogEntry {
    /// Entry at the given level
    pub fn new(level: impl Into<String>, message: impl Into<String>) -> Self {
        NewLogEntry {
            level: Some(level.into()),
            message: message.into(),
            ..Default::default()
        }
    }

    /// Set the data document
    pub fn with_data(mut self, data: impl Into<DocumentValue>) -> Self {
        self.data = data.into();
        self
    }

    /// Set the context document
    pub fn with_context(mut self, context: impl Into<DocumentValue>) -> Self {
        self.context = context.into();
        self
    }
}

impl Draft for NewLogEntry {
    type Record = LogEntry;

    fn into_record(self, now: DateTime<Utc>) -> LogEntry {
        LogEntry {
            id: 0,
            level: self.level.unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            message: self.message,
            data: or_empty(self.data, &DATA),
            context: or_empty(self.context, &CONTEXT),
            timestamp: now,
            version: 0,
        }
    }
}
