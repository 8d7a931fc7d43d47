//! Orchestration for the Kidsafe engine.
//!
//! [`TrackingService`] ties the core components together: position samples
//! flow through membership evaluation into the alert log, band readings flow
//! through low-battery detection, and periodic feeds are driven by tokio
//! timers fed from injectable [`PositionSource`]s and [`VitalsSource`]s.

pub mod band;
pub mod config;
pub mod error;
pub mod service;
pub mod source;

pub use band::{SimulatedBand, VitalsSource};
pub use config::TrackingConfig;
pub use error::{Error, Result};
pub use service::TrackingService;
pub use source::{FixtureReplay, PositionSource, SimulatedWalk};
