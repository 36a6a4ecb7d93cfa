//! # mcwatch core
//!
//! The poll → parse → filter → dedup → report pipeline.
//!
//! * **[`proxy`]**: HTTP client for the router command proxy.
//! * **[`parser`]**: splits a raw response into field blocks.
//! * **[`builder`]**: turns a field block into a [`MulticastRoute`].
//! * **[`collector`]**: threshold filter and dedup set.
//! * **[`report`]**: sorted, timestamped, tab separated report.
//! * **[`pacing`]**: request pacing against the shared proxy.
//! * **[`poller`]**: drives all of the above for a device inventory.
//!
//! [`MulticastRoute`]: mcwatch_common::route::MulticastRoute

pub mod builder;
pub mod collector;
pub mod pacing;
pub mod parser;
pub mod poller;
pub mod proxy;
pub mod report;

pub use collector::RouteSet;
pub use poller::{PollObserver, PollSummary, Poller};
pub use report::{Report, ReportWriter};
