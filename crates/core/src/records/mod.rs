//! The four record kinds and their creation drafts

mod log_entry;
mod order;
mod product;
mod user;

pub use log_entry::{LogEntry, NewLogEntry, DEFAULT_LOG_LEVEL};
pub use order::{NewOrder, Order, DEFAULT_ORDER_STATUS};
pub use product::{NewProduct, Product};
pub use user::{NewUser, User};
