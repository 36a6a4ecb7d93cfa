//! # Threshold Filter and Dedup Set
//!
//! Accumulates the routes of a poll cycle. Only routes whose packet rate is
//! strictly above the threshold are kept, and of several routes with the
//! same identity the first one offered wins. Nothing is ever removed.

use std::collections::HashSet;

use mcwatch_common::config::Config;
use mcwatch_common::route::{IdentityRule, MulticastRoute, RouteKey};

#[derive(Debug, PartialEq, Eq)]
pub enum Admission<'a> {
    Accepted(&'a MulticastRoute),
    BelowThreshold,
    /// A route with the same identity was accepted earlier.
    Duplicate,
}

#[derive(Debug, Clone)]
pub struct RouteSet {
    threshold: u64,
    identity: IdentityRule,
    seen: HashSet<RouteKey>,
    routes: Vec<MulticastRoute>,
}

impl RouteSet {
    pub fn new(threshold: u64, identity: IdentityRule) -> Self {
        Self {
            threshold,
            identity,
            seen: HashSet::new(),
            routes: Vec::new(),
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(cfg.threshold, cfg.identity)
    }

    pub fn offer(&mut self, route: MulticastRoute) -> Admission<'_> {
        if route.packets_per_second <= self.threshold {
            return Admission::BelowThreshold;
        }
        if !self.seen.insert(route.key(self.identity)) {
            return Admission::Duplicate;
        }
        self.routes.push(route);
        Admission::Accepted(&self.routes[self.routes.len() - 1])
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Accepted routes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &MulticastRoute> {
        self.routes.iter()
    }

    pub fn into_routes(self) -> Vec<MulticastRoute> {
        self.routes
    }
}
