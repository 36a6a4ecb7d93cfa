//! # Record Builder
//!
//! Converts a parsed [`FieldBlock`] into a typed [`MulticastRoute`].
//!
//! The `Statistics` field looks like `412 kBps, 330 pps, 98124311 packets`.
//! Its first three comma separated components are reduced to their digits
//! and read as speed, packets per second and packet count. Units and
//! decimal points are not interpreted.
//!
//! Counters are `u64`. A component whose digits exceed `u64::MAX` is an
//! [`MalformedRecordError::InvalidNumber`] and the block is skipped; router
//! counters never reach that range.

use mcwatch_common::device::DeviceId;
use mcwatch_common::error::MalformedRecordError;
use mcwatch_common::route::MulticastRoute;

use crate::parser::{FieldBlock, GROUP, SOURCE, STATISTICS};

pub fn build_route(
    block: &FieldBlock,
    router: &DeviceId,
) -> Result<MulticastRoute, MalformedRecordError> {
    let source = required(block, SOURCE)?;
    let group = required(block, GROUP)?;
    let statistics = required(block, STATISTICS)?;

    let components: Vec<&str> = statistics.split(',').collect();
    let [speed, pps, packets, ..] = components.as_slice() else {
        return Err(MalformedRecordError::TooFewStatistics {
            found: components.len(),
        });
    };

    Ok(MulticastRoute {
        source: source.to_string(),
        group: group.to_string(),
        speed: digits("speed", speed)?,
        packets_per_second: digits("packets per second", pps)?,
        packet_count: digits("packet count", packets)?,
        router: router.clone(),
    })
}

fn required<'a>(block: &'a FieldBlock, key: &'static str) -> Result<&'a str, MalformedRecordError> {
    block
        .get(key)
        .filter(|value| !value.is_empty())
        .ok_or(MalformedRecordError::MissingField(key))
}

/// Strips every non-digit character and parses what is left.
fn digits(field: &'static str, component: &str) -> Result<u64, MalformedRecordError> {
    let digits: String = component.chars().filter(char::is_ascii_digit).collect();
    digits
        .parse()
        .map_err(|_| MalformedRecordError::InvalidNumber {
            field,
            component: component.trim().to_string(),
        })
}
