//! # Domain Models
//!
//! Pure data for the FleetDesk wizard core: wizard state and its patch type, the
//! persisted draft envelope, and application configuration. Dependencies stay at
//! `serde` and `chrono`; no I/O, networking or scheduling belongs here.

pub mod config;
pub mod constants;
pub mod patch;
pub mod wizard;
