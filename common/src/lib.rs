//! # mcwatch common types
//!
//! Models, configuration, errors and the outbound ports shared by the
//! polling engine (`mcwatch-core`) and the command line front end.
//!
//! * **[`route`]**: the multicast route record and its identity rules.
//! * **[`device`]**: device identifiers and the deduplicated inventory.
//! * **[`config`]**: the explicit run configuration.
//! * **[`proxy`]**: the command proxy port implemented by the HTTP client.
//! * **[`error`]**: error taxonomy for transport, parsing and reporting.

pub mod config;
pub mod device;
pub mod error;
pub mod proxy;
pub mod route;
