//! Storefront back office: contact messages and orders stored as GitHub
//! issues, plus the product catalog.
//!
//! Nothing here is global. Build a [`store::RecordStore`] with a tracker and
//! a credential provider, and a [`catalog::CatalogManager`] with a snapshot
//! store, then pass them to whoever needs them.

pub mod catalog;
pub mod config;
pub mod errors;
pub mod logging;
pub mod records;
pub mod store;
pub mod tracker;

pub use catalog::{CatalogManager, Product, ProductUpdate};
pub use config::StoreConfig;
pub use errors::{CatalogError, StoreError};
pub use records::{
    ContactRecord, ContactSubmission, Customer, FulfillmentStatus, LineItem, OrderRecord,
    OrderSubmission, SubmitReceipt,
};
pub use store::RecordStore;
pub use tracker::{IssueState, StateFilter};
