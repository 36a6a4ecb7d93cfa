use crate::device::DeviceId;
use crate::error::TransportError;

/// Unparsed text body returned by one device for one poll.
pub type RawResponse = String;

/// Defines the contract for running the multicast route query on a device.
///
/// Implementations issue exactly one outbound request per call and never
/// cache or retry.
#[async_trait::async_trait]
pub trait CommandProxy: Send + Sync {
    /// Runs `show multicast route detail` on `device` and returns the raw output.
    async fn submit(&self, device: &DeviceId) -> Result<RawResponse, TransportError>;
}
