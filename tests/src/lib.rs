//! Integration tests for the mcwatch workspace.
//!
//! * `fixtures`: a fake command proxy over local HTTP and an in-memory one.
//! * `poll::http`: the HTTP client and a full cycle against the fake proxy.
//! * `poll::scenarios`: multi-router scenarios against the in-memory proxy.

mod fixtures;
mod poll;
