//! Risk assessment engine for supplier compliance monitoring.
//!
//! The [`risk`] module holds the engine proper: feature derivation from
//! certificate and audit records, interchangeable scoring strategies, driver
//! ranking for explainability, an append-only assessment history, and trend
//! and benchmark analytics over that history. Persistence and transport stay
//! behind traits so service binaries can wire their own stores.

pub mod config;
pub mod error;
pub mod risk;
pub mod telemetry;
