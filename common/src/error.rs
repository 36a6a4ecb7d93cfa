use std::path::PathBuf;

use thiserror::Error;

use crate::device::DeviceId;

/// Why a single proxy request failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// Connection refused, DNS failure, TLS failure, broken body, ...
    Unreachable(String),
    /// The proxy answered with a non-success HTTP status.
    Status(u16),
    Timeout,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("device {device}: {kind}")]
pub struct TransportError {
    pub device: DeviceId,
    pub kind: TransportErrorKind,
}

impl TransportError {
    pub fn new(device: DeviceId, kind: TransportErrorKind) -> Self {
        Self { device, kind }
    }
}

impl std::fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unreachable(reason) => write!(f, "proxy unreachable ({reason})"),
            Self::Status(code) => write!(f, "proxy returned HTTP {code}"),
            Self::Timeout => write!(f, "request timed out"),
        }
    }
}

/// A route block that could not be turned into a record.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MalformedRecordError {
    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("statistics has {found} components, expected at least 3")]
    TooFewStatistics { found: usize },

    #[error("statistics component '{component}' for {field} holds no usable number")]
    InvalidNumber {
        field: &'static str,
        component: String,
    },
}

#[derive(Debug, Error)]
#[error("failed to read device list {path}: {source}")]
pub struct DeviceListError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write report {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode report {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("report path pattern '{0}' cannot be rendered")]
    Pattern(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("proxy base URL is empty")]
    EmptyBaseUrl,

    #[error("worker count must be at least 1")]
    NoWorkers,

    #[error("invalid report path pattern '{0}'")]
    InvalidPattern(String),
}

/// Errors that end a poll cycle.
#[derive(Debug, Error)]
pub enum PollError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error("poll worker stopped unexpectedly: {0}")]
    Worker(String),
}
