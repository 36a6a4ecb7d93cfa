//! # Device Inventory
//!
//! Routers are identified by whatever string the command proxy accepts
//! (hostname or management address). The inventory is a plain text file,
//! one identifier per line.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use tracing::debug;

use crate::error::DeviceListError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl AsRef<str> for DeviceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Deduplicated device identifiers, kept in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceSet {
    devices: Vec<DeviceId>,
}

impl DeviceSet {
    /// Reads one identifier per line. Blank lines are ignored and
    /// surrounding whitespace is trimmed.
    pub fn load(path: &Path) -> Result<Self, DeviceListError> {
        let text = std::fs::read_to_string(path).map_err(|source| DeviceListError {
            path: path.to_path_buf(),
            source,
        })?;
        let set = Self::parse(&text);
        debug!(path = %path.display(), devices = set.len(), "loaded device list");
        Ok(set)
    }

    pub fn parse(text: &str) -> Self {
        text.lines().collect()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DeviceId> {
        self.devices.iter()
    }
}

impl<'a> FromIterator<&'a str> for DeviceSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut seen: HashSet<&str> = HashSet::new();
        let devices = iter
            .into_iter()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .filter(|line| seen.insert(*line))
            .map(DeviceId::from)
            .collect();
        Self { devices }
    }
}

impl<'a> IntoIterator for &'a DeviceSet {
    type Item = &'a DeviceId;
    type IntoIter = std::slice::Iter<'a, DeviceId>;

    fn into_iter(self) -> Self::IntoIter {
        self.devices.iter()
    }
}
