use crate::column::ColumnValue;
use crate::error::Result;
use crate::record::{
    column_not_writable, or_empty, require_max_len, require_non_empty, require_non_negative,
    Draft, DocumentField, EntityKind, Record, RecordId, RelationalField,
};
use crate::value::DocumentValue;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const STATUS_MAX: usize = 50;

/// Status given to orders created without one
pub const DEFAULT_ORDER_STATUS: &str = "pending";

const ITEMS: DocumentField = DocumentField::array("items");
const SHIPPING_ADDRESS: DocumentField = DocumentField::object("shippingAddress");
const PAYMENT_INFO: DocumentField = DocumentField::object("paymentInfo");
const ORDER_HISTORY: DocumentField = DocumentField::append_only_array("orderHistory");

/// Row of the `orders` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Row id
    pub id: RecordId,
    /// Ordering user
    pub user_id: RecordId,
    /// Order total
    pub total_amount: f64,
    /// Current status
    pub status: String,
    /// Line items, array of objects
    pub items: DocumentValue,
    /// Delivery address
    pub shipping_address: DocumentValue,
    /// Payment details
    pub payment_info: DocumentValue,
    /// Status transitions, append-only
    pub order_history: DocumentValue,
    /// Insert time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
    /// Optimistic concurrency token
    pub version: u64,
}

impl Record for Order {
    const KIND: EntityKind = EntityKind::Order;
    const DOCUMENT_FIELDS: &'static [DocumentField] =
        &[ITEMS, SHIPPING_ADDRESS, PAYMENT_INFO, ORDER_HISTORY];
    const RELATIONAL_FIELDS: &'static [RelationalField] = &[
        RelationalField::fixed("id"),
        RelationalField::fixed("userId"),
        RelationalField::mutable("totalAmount"),
        RelationalField::managed("status", "set_order_status"),
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
            "items" => Some(&self.items),
            "shippingAddress" => Some(&self.shipping_address),
            "paymentInfo" => Some(&self.payment_info),
            "orderHistory" => Some(&self.order_history),
            _ => None,
        }
    }

    fn document_mut(&mut self, column: &str) -> Option<&mut DocumentValue> {
        match column {
            "items" => Some(&mut self.items),
            "shippingAddress" => Some(&mut self.shipping_address),
            "paymentInfo" => Some(&mut self.payment_info),
            "orderHistory" => Some(&mut self.order_history),
            _ => None,
        }
    }

    fn column(&self, name: &str) -> Option<ColumnValue> {
        match name {
            "id" => Some(self.id.into()),
            "userId" => Some(self.user_id.into()),
            "totalAmount" => Some(ColumnValue::Decimal(self.total_amount)),
            "status" => Some(self.status.as_str().into()),
            "createdAt" => Some(self.created_at.into()),
            "updatedAt" => Some(self.updated_at.into()),
            _ => None,
        }
    }

    fn set_column(&mut self, name: &str, value: ColumnValue) -> Result<()> {
        match name {
            "status" => self.status = value.into_text(name)?,
            "totalAmount" => self.total_amount = value.into_decimal(name)?,
            _ => return Err(column_not_writable::<Self>(name)),
        }
        Ok(())
    }

    fn validate_fields(&self) -> Result<()> {
        require_non_negative("totalAmount", self.total_amount)?;
        require_non_empty("status", &self.status)?;
        require_max_len("status", &self.status, STATUS_MAX)
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    fn sort_timestamp(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Creation payload for [`Order`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewOrder {
    /// Ordering user; must exist
    pub user_id: RecordId,
    /// Order total
    pub total_amount: f64,
    /// Initial status (defaults to `pending`)
    pub status: Option<String>,
    /// Line items (defaults to `[]`)
    pub items: DocumentValue,
    /// Shipping address (defaults to `{}`)
    pub shipping_address: DocumentValue,
    /// Payment info (defaults to `{}`)
    pub payment_info: DocumentValue,
    /// Initial history (defaults to `[]`)
    pub order_history: DocumentValue,
}

impl NewOrder {
    /// Draft with empty documents and the default status
    pub fn new(user_id: RecordId, total_amount: f64) -> Self {
        NewOrder {
            user_id,
            total_amount,
            ..Default::default()
        }
    }

    /// Set the initial status
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Set the line items
    pub fn with_items(mut self, items: impl Into<DocumentValue>) -> Self {
        self.items = items.into();
        self
    }

    /// Set the shipping address
    pub fn with_shipping_address(mut self, address: impl Into<DocumentValue>) -> Self {
        self.shipping_address = address.into();
        self
    }

    /// Set the payment info
    pub fn with_payment_info(mut self, payment: impl Into<DocumentValue>) -> Self {
        self.payment_info = payment.into();
        self
    }

    /// Set the initial history
    pub fn with_order_history(mut self, history: impl Into<DocumentValue>) -> Self {
        self.order_history = history.into();
        self
    }
}

impl Draft for NewOrder {
    type Record = Order;

    fn into_record(self, now: DateTime<Utc>) -> Order {
        Order {
            id: 0,
            user_id: self.user_id,
            total_amount: self.total_amount,
            status: self
                .status
                .unwrap_or_else(|| DEFAULT_ORDER_STATUS.to_string()),
            items: or_empty(self.items, &ITEMS),
            shipping_address: or_empty(self.shipping_address, &SHIPPING_ADDRESS),
            payment_info: or_empty(self.payment_info, &PAYMENT_INFO),
            order_history: or_empty(self.order_history, &ORDER_HISTORY),
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }
}
