use crate::column::ColumnValue;
use crate::error::Result;
use crate::record::{
    column_not_writable, or_empty, require_max_len, require_non_empty, require_non_negative,
    require_string_set, Draft, DocumentField, EntityKind, Record, RecordId, RelationalField,
};
use crate::value::DocumentValue;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const NAME_MAX: usize = 200;

const SPECIFICATIONS: DocumentField = DocumentField::object("specifications");
const METADATA: DocumentField = DocumentField::object("metadata");
const TAGS: DocumentField = DocumentField::array("tags");

/// Row of the `products` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Row id
    pub id: RecordId,
    /// Product name
    pub name: String,
    /// List price
    pub price: f64,
    /// Technical specifications
    pub specifications: DocumentValue,
    /// Catalog metadata (category, brand, rating, ...)
    pub metadata: DocumentValue,
    /// Tag set, array of strings without duplicates
    pub tags: DocumentValue,
    /// Insert time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
    /// Optimistic concurrency token
    pub version: u64,
}

impl Product {
    /// Tags as strings, skipping any non-string element
    pub fn tag_names(&self) -> Vec<&str> {
        self.tags
            .as_array()
            .map(|items| items.iter().filter_map(|t| t.as_str()).collect())
            .unwrap_or_default()
    }
}

impl Record for Product {
    const KIND: EntityKind = EntityKind::Product;
    const DOCUMENT_FIELDS: &'static [DocumentField] = &[SPECIFICATIONS, METADATA, TAGS];
    const RELATIONAL_FIELDS: &'static [RelationalField] = &[
        RelationalField::fixed("id"),
        RelationalField::mutable("name"),
        RelationalField::mutable("price"),
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
            "specifications" => Some(&self.specifications),
            "metadata" => Some(&self.metadata),
            "tags" => Some(&self.tags),
            _ => None,
        }
    }

    fn document_mut(&mut self, column: &str) -> Option<&mut DocumentValue> {
        match column {
            "specifications" => Some(&mut self.specifications),
            "metadata" => Some(&mut self.metadata),
            "tags" => Some(&mut self.tags),
            _ => None,
        }
    }

    fn column(&self, name: &str) -> Option<ColumnValue> {
        match name {
            "id" => Some(self.id.into()),
            "name" => Some(self.name.as_str().into()),
            "price" => Some(ColumnValue::Decimal(self.price)),
            "createdAt" => Some(self.created_at.into()),
            "updatedAt" => Some(self.updated_at.into()),
            _ => None,
        }
    }

    fn set_column(&mut self, name: &str, value: ColumnValue) -> Result<()> {
        match name {
            "name" => self.name = value.into_text(name)?,
            "price" => self.price = value.into_decimal(name)?,
            _ => return Err(column_not_writable::<Self>(name)),
        }
        Ok(())
    }

    fn validate_fields(&self) -> Result<()> {
        require_non_empty("name", &self.name)?;
        require_max_len("name", &self.name, NAME_MAX)?;
        require_non_negative("price", self.price)?;
        require_string_set("tags", &self.tags)
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    fn sort_timestamp(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Creation payload for [`Product`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewProduct {
    /// Product name
    pub name: String,
    /// List price
    pub price: f64,
    /// Specifications document (defaults to `{}`)
    pub specifications: DocumentValue,
    /// Metadata document (defaults to `{}`)
    pub metadata: DocumentValue,
    /// Tags (defaults to `[]`)
    pub tags: DocumentValue,
}

impl NewProduct {
    /// Draft with empty documents
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        NewProduct {
            name: name.into(),
            price,
            ..Default::default()
        }
    }

    /// Set the specifications document
    pub fn with_specifications(mut self, specifications: impl Into<DocumentValue>) -> Self {
        self.specifications = specifications.into();
        self
    }

    /// Set the metadata document
    pub fn with_metadata(mut self, metadata: impl Into<DocumentValue>) -> Self {
        self.metadata = metadata.into();
        self
    }

    /// Set the tags; duplicates are dropped keeping first occurrence
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for tag in tags {
            let tag = tag.into();
            if !unique.contains(&tag) {
                unique.push(tag);
            }
        }
        self.tags = DocumentValue::from(unique);
        self
    }
}

impl Draft for NewProduct {
    type Record = Product;

    fn into_record(self, now: DateTime<Utc>) -> Product {
        Product {
            id: 0,
            name: self.name,
            price: self.price,
            specifications: or_empty(self.specifications, &SPECIFICATIONS),
            metadata: or_empty(self.metadata, &METADATA),
            tags: or_empty(self.tags, &TAGS),
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }
}
