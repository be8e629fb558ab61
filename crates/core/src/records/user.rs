use crate::column::ColumnValue;
use crate::error::{Error, Result};
use crate::record::{
    column_not_writable, or_empty, require_max_len, require_non_empty, Draft, DocumentField,
    EntityKind, Record, RecordId, RelationalField,
};
use crate::value::DocumentValue;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const NAME_MAX: usize = 200;
const EMAIL_MAX: usize = 255;

const PROFILE: DocumentField = DocumentField::object("profile");
const PREFERENCES: DocumentField = DocumentField::object("preferences");
const ADDRESS: DocumentField = DocumentField::object("address");

/// Row of the `users` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Row id
    pub id: RecordId,
    /// Unique login email
    pub email: String,
    /// Display name
    pub name: String,
    /// Free-form profile (age, occupation, bio, ...)
    pub profile: DocumentValue,
    /// UI and notification preferences
    pub preferences: DocumentValue,
    /// Postal address
    pub address: DocumentValue,
    /// Insert time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
    /// Optimistic concurrency token
    pub version: u64,
}

impl Record for User {
    const KIND: EntityKind = EntityKind::User;
    const DOCUMENT_FIELDS: &'static [DocumentField] = &[PROFILE, PREFERENCES, ADDRESS];
    const RELATIONAL_FIELDS: &'static [RelationalField] = &[
        RelationalField::fixed("id"),
        RelationalField::mutable("email"),
        RelationalField::mutable("name"),
        RelationalField::fixed("createdAt"),
        RelationalField::fixed("updatedAt"),
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
            "profile" => Some(&self.profile),
            "preferences" => Some(&self.preferences),
            "address" => Some(&self.address),
            _ => None,
        }
    }

    fn document_mut(&mut self, column: &str) -> Option<&mut DocumentValue> {
        match column {
            "profile" => Some(&mut self.profile),
            "preferences" => Some(&mut self.preferences),
            "address" => Some(&mut self.address),
            _ => None,
        }
    }

    fn column(&self, name: &str) -> Option<ColumnValue> {
        match name {
            "id" => Some(self.id.into()),
            "email" => Some(self.email.as_str().into()),
            "name" => Some(self.name.as_str().into()),
            "createdAt" => Some(self.created_at.into()),
            "updatedAt" => Some(self.updated_at.into()),
            _ => None,
        }
    }

    fn set_column(&mut self, name: &str, value: ColumnValue) -> Result<()> {
        match name {
            "email" => self.email = value.into_text(name)?,
            "name" => self.name = value.into_text(name)?,
            _ => return Err(column_not_writable::<Self>(name)),
        }
        Ok(())
    }

    fn validate_fields(&self) -> Result<()> {
        require_non_empty("email", &self.email)?;
        require_max_len("email", &self.email, EMAIL_MAX)?;
        if !self.email.contains('@') {
            return Err(Error::validation(format!(
                "email '{}' is not an address",
                self.email
            )));
        }
        require_non_empty("name", &self.name)?;
        require_max_len("name", &self.name, NAME_MAX)
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.email.clone())
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    fn sort_timestamp(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Creation payload for [`User`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewUser {
    /// Unique login email
    pub email: String,
    /// Display name
    pub name: String,
    /// Profile document (defaults to `{}`)
    pub profile: DocumentValue,
    /// Preferences document (defaults to `{}`)
    pub preferences: DocumentValue,
    /// Address document (defaults to `{}`)
    pub address: DocumentValue,
}

impl NewUser {
    /// Draft with empty documents
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        NewUser {
            email: email.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the profile document
    pub fn with_profile(mut self, profile: impl Into<DocumentValue>) -> Self {
        self.profile = profile.into();
        self
    }

    /// Set the preferences document
    pub fn with_preferences(mut self, preferences: impl Into<DocumentValue>) -> Self {
        self.preferences = preferences.into();
        self
    }

    /// Set the address document
    pub fn with_address(mut self, address: impl Into<DocumentValue>) -> Self {
        self.address = address.into();
        self
    }
}

impl Draft for NewUser {
    type Record = User;

    fn into_record(self, now: DateTime<Utc>) -> User {
        User {
            id: 0,
            email: self.email,
            name: self.name,
            profile: or_empty(self.profile, &PROFILE),
            preferences: or_empty(self.preferences, &PREFERENCES),
            address: or_empty(self.address, &ADDRESS),
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }
}
