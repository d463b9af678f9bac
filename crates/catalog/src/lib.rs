//! Catalog domain module (per-product reconciliation ledger).
//!
//! This crate contains the ledger's business rules, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod bucket;
pub mod catalog;
pub mod classification;

pub use bucket::BucketSet;
pub use catalog::{Catalog, OrderLine, RetractOutcome, Row, ScanOutcome};
pub use classification::Classification;
