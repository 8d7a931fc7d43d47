//! Core types and engine components for the Kidsafe tracking service.
//!
//! No runtime or database dependencies. This crate holds the geofencing
//! math, the zone registry, membership edge detection, the alert log and the
//! account/pairing model. Orchestration lives in
//! `kidsafe-tracking`; persistence backends implement [`store::Repository`].

pub mod account;
pub mod alert;
pub mod error;
pub mod geo;
pub mod membership;
pub mod memory;
pub mod position;
pub mod snapshot;
pub mod store;
pub mod subject;
pub mod vitals;
pub mod zone;

pub use error::{Error, Result};
