//! Reconciliation controller.
//!
//! The reducer that owns the catalog exclusively: discrete UI/IO events come
//! in, catalog mutations happen here, and requests to external collaborators
//! go out as effects.

pub mod controller;

pub use controller::{Controller, ControllerEvent, Effect, Phase};
