//! Persistence-boundary serialization gateway.
//!
//! Converts a [`ordertally_catalog::Catalog`] to and from the wire value the
//! persistence boundary accepts. The boundary stores structured rows but has
//! no native set or array column type, so bucket sets travel double-encoded:
//! string fields holding JSON array text.

pub mod wire;

pub use wire::{decode, encode, WireDiagnostic};
