//! # Multicast Route Model
//!
//! A `(source, group)` forwarding entry reported by one router, annotated
//! with its traffic statistics.
//!
//! ## Identity
//! Two routes are the same route when their source and group match. The
//! reporting router does not take part in equality or hashing, so the same
//! flow seen on two routers is reported once. [`IdentityRule`] lets the
//! route set opt into router-aware identity instead.

use std::hash::{Hash, Hasher};

use crate::device::DeviceId;

#[derive(Debug, Clone)]
pub struct MulticastRoute {
    pub source: String,
    pub group: String,
    /// Traffic rate, in whatever unit the router printed.
    pub speed: u64,
    pub packets_per_second: u64,
    /// Cumulative packets forwarded.
    pub packet_count: u64,
    pub router: DeviceId,
}

impl MulticastRoute {
    pub fn key(&self, rule: IdentityRule) -> RouteKey {
        let router = match rule {
            IdentityRule::SourceGroup => None,
            IdentityRule::SourceGroupRouter => Some(self.router.clone()),
        };
        RouteKey {
            source: self.source.clone(),
            group: self.group.clone(),
            router,
        }
    }
}

impl PartialEq for MulticastRoute {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.group == other.group
    }
}

impl Eq for MulticastRoute {}

impl Hash for MulticastRoute {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.source.hash(state);
        self.group.hash(state);
    }
}

/// Which fields make two routes "the same" for deduplication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdentityRule {
    #[default]
    SourceGroup,
    SourceGroupRouter,
}

/// Canonical dedup key. `router` is only populated under
/// [`IdentityRule::SourceGroupRouter`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteKey {
    pub source: String,
    pub group: String,
    pub router: Option<DeviceId>,
}
