//! Demo data
//!
//! [`seed_demo`] fills an empty database with a small, fixed catalogue: two
//! users, three products, one shipped order and three log entries. The
//! order and log documents reference the generated ids.

use crate::database::{Database, Table};
use crate::mutation::MutationService;
use docfield_core::{
    Error, LogEntry, NewLogEntry, NewOrder, NewProduct, NewUser, Order, Product, Result, User,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

/// Row counts per table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedSummary {
    /// `users` rows
    pub users: usize,
    /// `products` rows
    pub products: usize,
    /// `orders` rows
    pub orders: usize,
    /// `logs` rows
    pub logs: usize,
}

impl SeedSummary {
    /// Rows across all four tables
    pub fn total(&self) -> usize {
        self.users + self.products + self.orders + self.logs
    }
}

/// Insert the demo rows
///
/// # Errors
///
/// Returns `Validation` if the users or products table already has rows.
pub fn seed_demo(db: &Arc<Database>) -> Result<SeedSummary> {
    if !db.store::<User>()?.is_empty()? || !db.store::<Product>()?.is_empty()? {
        return Err(Error::validation(
            "database already contains data; clear it first",
        ));
    }
    let rows = MutationService::new(db.clone());

    let john = rows.create(
        NewUser::new("john.doe@example.com", "John Doe")
            .with_profile(json!({
                "age": 30,
                "gender": "male",
                "occupation": "Software Engineer",
                "interests": ["technology", "gaming", "reading"]
            }))
            .with_preferences(json!({
                "theme": "dark",
                "language": "en",
                "notifications": {"email": true, "push": false, "sms": true}
            }))
            .with_address(json!({
                "street": "123 Main St",
                "city": "San Francisco",
                "state": "CA",
                "zipCode": "94101",
                "country": "USA"
            })),
    )?;
    rows.create(
        NewUser::new("jane.smith@example.com", "Jane Smith")
            .with_profile(json!({
                "age": 28,
                "gender": "female",
                "occupation": "Product Manager",
                "interests": ["design", "travel", "photography"]
            }))
            .with_preferences(json!({
                "theme": "light",
                "language": "en",
                "notifications": {"email": true, "push": true, "sms": false}
            }))
            .with_address(json!({
                "street": "456 Oak Ave",
                "city": "New York",
                "state": "NY",
                "zipCode": "10001",
                "country": "USA"
            })),
    )?;

    let macbook = rows.create(
        NewProduct::new("MacBook Pro 16\"", 2499.99)
            .with_specifications(json!({
                "cpu": "Apple M2 Max",
                "ram": "32GB",
                "storage": "1TB SSD",
                "display": "16.2-inch Liquid Retina XDR",
                "weight": "2.15 kg",
                "color": "Space Gray",
                "ports": ["3x Thunderbolt 4", "HDMI", "SD card", "MagSafe 3"]
            }))
            .with_metadata(json!({
                "manufacturer": "Apple",
                "category": "laptop",
                "releaseDate": "2023-01-17",
                "warranty": "1 year",
                "inStock": true,
                "sku": "MBP16-M2MAX-32-1TB"
            }))
            .with_tags(["laptop", "apple", "premium", "professional"]),
    )?;
    rows.create(
        NewProduct::new("Samsung Galaxy S23 Ultra", 1199.99)
            .with_specifications(json!({
                "cpu": "Snapdragon 8 Gen 2",
                "ram": "12GB",
                "storage": "256GB",
                "display": "6.8-inch Dynamic AMOLED 2X",
                "camera": {
                    "main": "200MP",
                    "ultrawide": "12MP",
                    "telephoto": ["10MP", "10MP"],
                    "front": "12MP"
                },
                "battery": "5000mAh",
                "color": "Phantom Black"
            }))
            .with_metadata(json!({
                "manufacturer": "Samsung",
                "category": "smartphone",
                "releaseDate": "2023-02-17",
                "warranty": "1 year",
                "inStock": true,
                "sku": "SGS23U-12-256-PB"
            }))
            .with_tags(["smartphone", "samsung", "android", "flagship"]),
    )?;
    let headphones = rows.create(
        NewProduct::new("Sony WH-1000XM5", 399.99)
            .with_specifications(json!({
                "type": "Over-ear wireless headphones",
                "driver": "30mm",
                "frequency": "4Hz-40kHz",
                "batteryLife": "30 hours",
                "noiseCancellation": true,
                "bluetooth": "5.2",
                "weight": "250g",
                "color": "Black"
            }))
            .with_metadata(json!({
                "manufacturer": "Sony",
                "category": "audio",
                "releaseDate": "2022-05-12",
                "warranty": "1 year",
                "inStock": true,
                "sku": "WH1000XM5-B"
            }))
            .with_tags(["headphones", "sony", "wireless", "noise-cancelling"]),
    )?;

    let order = rows.create(
        NewOrder::new(john.id, 2899.98)
            .with_status("shipped")
            .with_items(json!([
                {
                    "productId": macbook.id,
                    "name": macbook.name,
                    "price": 2499.99,
                    "quantity": 1
                },
                {
                    "productId": headphones.id,
                    "name": headphones.name,
                    "price": 399.99,
                    "quantity": 1
                }
            ]))
            .with_shipping_address(json!({
                "street": "123 Main St",
                "city": "San Francisco",
                "state": "CA",
                "zipCode": "94101",
                "country": "USA"
            }))
            .with_payment_info(json!({
                "method": "credit_card",
                "last4": "1234",
                "type": "visa"
            }))
            .with_order_history(json!([
                {
                    "timestamp": "2024-01-15T10:00:00Z",
                    "status": "created",
                    "note": "Order placed"
                },
                {
                    "timestamp": "2024-01-15T14:30:00Z",
                    "status": "confirmed",
                    "note": "Payment processed"
                },
                {
                    "timestamp": "2024-01-16T09:00:00Z",
                    "status": "shipped",
                    "note": "Order shipped via UPS",
                    "tracking": "1Z999AA1234567890"
                }
            ])),
    )?;

    rows.create(
        NewLogEntry::new("info", "User logged in successfully")
            .with_data(json!({
                "userId": john.id,
                "userAgent": "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7)",
                "ipAddress": "192.168.1.100"
            }))
            .with_context(json!({
                "sessionId": "sess_abc123",
                "requestId": "req_xyz789",
                "source": "authentication-service"
            })),
    )?;
    rows.create(
        NewLogEntry::new("error", "Payment processing failed")
            .with_data(json!({
                "orderId": order.id,
                "amount": 2899.98,
                "errorCode": "CARD_DECLINED",
                "retryCount": 2
            }))
            .with_context(json!({
                "sessionId": "sess_def456",
                "requestId": "req_abc123",
                "source": "payment-service"
            })),
    )?;
    rows.create(
        NewLogEntry::new("warning", "High memory usage detected")
            .with_data(json!({
                "memoryUsage": 85.5,
                "threshold": 80.0,
                "service": "user-service"
            }))
            .with_context(json!({
                "server": "prod-server-01",
                "region": "us-west-2",
                "source": "monitoring-service"
            })),
    )?;

    let summary = SeedSummary {
        users: 2,
        products: 3,
        orders: 1,
        logs: 3,
    };
    info!(target: "docfield::db", ?summary, "Demo data seeded");
    Ok(summary)
}

/// Delete every row in all four tables
///
/// Returns how many rows each table lost.
pub fn clear_all(db: &Database) -> Result<SeedSummary> {
    let summary = SeedSummary {
        logs: clear::<LogEntry>(db)?,
        orders: clear::<Order>(db)?,
        products: clear::<Product>(db)?,
        users: clear::<User>(db)?,
    };
    info!(target: "docfield::db", ?summary, "All data cleared");
    Ok(summary)
}

fn clear<R: Table>(db: &Database) -> Result<usize> {
    let store = db.store::<R>()?;
    let mut deleted = 0;
    for row in store.scan_all()? {
        if store.delete(row.id())? {
            deleted += 1;
        }
    }
    Ok(deleted)
}
