//! Data models shared across extraction, storage and the CLI.

pub mod config;
pub mod invoice;

pub use config::FacturasConfig;
pub use invoice::{ChargeLine, InvoiceRecord};
