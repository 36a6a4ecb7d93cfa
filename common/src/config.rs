//! # Run Configuration
//!
//! Every knob the poller needs, passed explicitly into the orchestrator.
//! The CLI builds one of these from its flags; tests build them by hand.

use std::path::PathBuf;
use std::time::Duration;

use chrono::format::{Item, StrftimeItems};

use crate::error::ConfigError;
use crate::route::IdentityRule;

pub const DEFAULT_BASE_URL: &str = "https://routerproxy.grnoc.iu.edu/internet2/";
pub const DEFAULT_DEVICE_FILE: &str = "./ips.txt";
pub const DEFAULT_REPORT_PATTERN: &str = "./mcast-i2-%Y-%m-%d-%H:%M:%S.log";
pub const DEFAULT_THRESHOLD: u64 = 100;
pub const DEFAULT_PACING_SECS: u64 = 2;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// What to do when a device cannot be reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Stop the whole run on the first transport failure.
    #[default]
    Abort,
    /// Log the failure, skip the device and keep polling.
    Continue,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Command proxy endpoint, query parameters are appended to it.
    pub base_url: String,
    /// Newline-delimited list of device identifiers.
    pub device_file: PathBuf,
    /// strftime pattern for the report path, expanded with the cycle start time.
    pub report_pattern: String,
    /// Routes must exceed this many packets per second to be reported.
    pub threshold: u64,
    /// Delay inserted after every device.
    pub pacing: Duration,
    /// Upper bound for a single proxy request.
    pub timeout: Duration,
    pub on_error: ErrorPolicy,
    pub identity: IdentityRule,
    /// Number of devices polled in parallel. `1` keeps the sequential loop.
    pub workers: usize,
    /// Echo accepted routes and the final report to the console.
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            device_file: PathBuf::from(DEFAULT_DEVICE_FILE),
            report_pattern: DEFAULT_REPORT_PATTERN.to_string(),
            threshold: DEFAULT_THRESHOLD,
            pacing: Duration::from_secs(DEFAULT_PACING_SECS),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            on_error: ErrorPolicy::default(),
            identity: IdentityRule::default(),
            workers: 1,
            verbose: false,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }
        if self.workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        validate_pattern(&self.report_pattern)
    }
}

/// Rejects patterns chrono would fail to render at write time.
pub fn validate_pattern(pattern: &str) -> Result<(), ConfigError> {
    if pattern.trim().is_empty() {
        return Err(ConfigError::InvalidPattern(pattern.to_string()));
    }
    if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
        return Err(ConfigError::InvalidPattern(pattern.to_string()));
    }
    Ok(())
}
