//! # Poll Orchestrator
//!
//! Runs one poll cycle: every device is queried once through the
//! [`CommandProxy`], its response is parsed into routes, the routes pass the
//! threshold filter and dedup set, and finally the sorted report is written.
//!
//! ## Execution models
//! * **Sequential** (`workers == 1`): devices are polled one after another in
//!   inventory order with a fixed pause after each one, success or not.
//! * **Concurrent** (`workers > 1`): a bounded pool of tasks shares one
//!   [`RateGate`], so request starts stay one pacing interval apart in
//!   aggregate. Responses are merged strictly in inventory order, which keeps
//!   dedup winners and report ties identical to the sequential mode.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Local;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{Instrument, debug, info, info_span, warn};

use mcwatch_common::config::{Config, ErrorPolicy};
use mcwatch_common::device::{DeviceId, DeviceSet};
use mcwatch_common::error::{PollError, TransportError};
use mcwatch_common::proxy::{CommandProxy, RawResponse};
use mcwatch_common::route::MulticastRoute;

use crate::builder::build_route;
use crate::collector::{Admission, RouteSet};
use crate::pacing::{Pacer, RateGate};
use crate::parser;
use crate::report::{Report, ReportWriter};

/// Hooks for front ends that want to follow a cycle as it progresses.
pub trait PollObserver: Send {
    /// Processing of `device` begins. Always paired with the following
    /// [`device_finished`](Self::device_finished) call, in inventory order.
    /// Sequential polls call it right before the request; concurrent polls
    /// call it when the response is merged.
    fn device_started(&mut self, _device: &DeviceId) {}

    /// A route passed the threshold and was not a duplicate.
    fn route_accepted(&mut self, _route: &MulticastRoute) {}

    /// All blocks of `device` have been processed, or the device was skipped.
    fn device_finished(&mut self, _device: &DeviceId, _outcome: &DeviceOutcome) {}
}

/// Observer that ignores everything.
pub struct Silent;

impl PollObserver for Silent {}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceOutcome {
    /// Blocks with a `Group` field found in the response.
    pub blocks: usize,
    pub accepted: usize,
    pub malformed: usize,
    /// Set when the device was skipped under [`ErrorPolicy::Continue`].
    pub failure: Option<TransportError>,
}

/// Routes built from one response, before filtering.
#[derive(Debug, Default)]
pub struct Harvest {
    pub routes: Vec<MulticastRoute>,
    pub blocks: usize,
    pub malformed: usize,
}

/// Parses `raw` and builds a route from every block. Malformed blocks are
/// logged and skipped.
pub fn harvest(device: &DeviceId, raw: &str) -> Harvest {
    let mut harvest = Harvest::default();
    for block in parser::parse_response(raw) {
        harvest.blocks += 1;
        match build_route(&block, device) {
            Ok(route) => {
                debug!(
                    device = %device,
                    group = %route.group,
                    source = %route.source,
                    pps = route.packets_per_second,
                    "parsed route block"
                );
                harvest.routes.push(route);
            }
            Err(err) => {
                harvest.malformed += 1;
                warn!(device = %device, error = %err, "skipping malformed route block");
            }
        }
    }
    harvest
}

/// Offers every harvested route to `routes`.
pub fn admit(
    harvest: Harvest,
    routes: &mut RouteSet,
    observer: &mut dyn PollObserver,
) -> DeviceOutcome {
    let mut outcome = DeviceOutcome {
        blocks: harvest.blocks,
        malformed: harvest.malformed,
        ..DeviceOutcome::default()
    };
    for route in harvest.routes {
        if let Admission::Accepted(route) = routes.offer(route) {
            outcome.accepted += 1;
            observer.route_accepted(route);
        }
    }
    outcome
}

#[derive(Debug)]
pub struct PollSummary {
    pub report: Report,
    pub path: PathBuf,
    /// Devices attempted, including skipped ones.
    pub polled: usize,
    pub failures: Vec<TransportError>,
    pub malformed: usize,
}

#[derive(Debug, Default)]
struct Tally {
    polled: usize,
    malformed: usize,
    failures: Vec<TransportError>,
}

impl Tally {
    fn record(&mut self, outcome: &DeviceOutcome) {
        self.polled += 1;
        self.malformed += outcome.malformed;
        if let Some(failure) = &outcome.failure {
            self.failures.push(failure.clone());
        }
    }
}

pub struct Poller {
    config: Config,
    proxy: Arc<dyn CommandProxy>,
    pacer: Arc<dyn Pacer>,
    writer: ReportWriter,
}

impl Poller {
    pub fn new(config: Config, proxy: Arc<dyn CommandProxy>, pacer: Arc<dyn Pacer>) -> Self {
        let writer = ReportWriter::new(config.report_pattern.clone());
        Self {
            config,
            proxy,
            pacer,
            writer,
        }
    }

    /// Polls every device once and writes the report.
    pub async fn poll_cycle(
        &self,
        devices: &DeviceSet,
        observer: &mut dyn PollObserver,
    ) -> Result<PollSummary, PollError> {
        let started = Local::now();
        let mut routes = RouteSet::from_config(&self.config);
        let mut tally = Tally::default();

        info!(
            devices = devices.len(),
            workers = self.config.workers,
            "starting poll cycle"
        );
        if self.config.workers > 1 {
            self.poll_concurrent(devices, &mut routes, &mut tally, observer)
                .await?;
        } else {
            self.poll_sequential(devices, &mut routes, &mut tally, observer)
                .await?;
        }

        let report = Report::new(started, routes);
        let path = self.writer.write(&report)?;
        info!(
            path = %path.display(),
            routes = report.len(),
            polled = tally.polled,
            failed = tally.failures.len(),
            "poll cycle complete"
        );

        Ok(PollSummary {
            report,
            path,
            polled: tally.polled,
            failures: tally.failures,
            malformed: tally.malformed,
        })
    }

    async fn poll_sequential(
        &self,
        devices: &DeviceSet,
        routes: &mut RouteSet,
        tally: &mut Tally,
        observer: &mut dyn PollObserver,
    ) -> Result<(), PollError> {
        for device in devices {
            observer.device_started(device);
            let response = self
                .proxy
                .submit(device)
                .instrument(info_span!("device", device = %device))
                .await;
            self.settle(device, response, routes, tally, observer)?;
            self.pacer.pause(self.config.pacing).await;
        }
        Ok(())
    }

    async fn poll_concurrent(
        &self,
        devices: &DeviceSet,
        routes: &mut RouteSet,
        tally: &mut Tally,
        observer: &mut dyn PollObserver,
    ) -> Result<(), PollError> {
        let gate = Arc::new(RateGate::new(self.config.pacing));
        let permits = Arc::new(Semaphore::new(self.config.workers));
        let mut tasks = JoinSet::new();

        for (index, device) in devices.iter().cloned().enumerate() {
            let proxy = Arc::clone(&self.proxy);
            let pacer = Arc::clone(&self.pacer);
            let gate = Arc::clone(&gate);
            let permits = Arc::clone(&permits);
            let span = info_span!("device", device = %device);
            tasks.spawn(
                async move {
                    let _permit = permits.acquire_owned().await;
                    gate.admit(pacer.as_ref()).await;
                    let response = proxy.submit(&device).await;
                    (index, device, response)
                }
                .instrument(span),
            );
        }

        // Responses arrive in any order; settle them in inventory order.
        let mut pending: Vec<Option<(DeviceId, Result<RawResponse, TransportError>)>> =
            (0..devices.len()).map(|_| None).collect();
        let mut next = 0;
        while let Some(joined) = tasks.join_next().await {
            let (index, device, response) =
                joined.map_err(|err| PollError::Worker(err.to_string()))?;
            pending[index] = Some((device, response));
            while let Some((device, response)) = pending.get_mut(next).and_then(Option::take) {
                observer.device_started(&device);
                self.settle(&device, response, routes, tally, observer)?;
                next += 1;
            }
        }
        Ok(())
    }

    fn settle(
        &self,
        device: &DeviceId,
        response: Result<RawResponse, TransportError>,
        routes: &mut RouteSet,
        tally: &mut Tally,
        observer: &mut dyn PollObserver,
    ) -> Result<(), PollError> {
        let outcome = match response {
            Ok(raw) => admit(harvest(device, &raw), routes, observer),
            Err(err) => self.skip_or_abort(err)?,
        };
        info!(
            device = %device,
            blocks = outcome.blocks,
            accepted = outcome.accepted,
            malformed = outcome.malformed,
            "device polled"
        );
        observer.device_finished(device, &outcome);
        tally.record(&outcome);
        Ok(())
    }

    fn skip_or_abort(&self, err: TransportError) -> Result<DeviceOutcome, PollError> {
        match self.config.on_error {
            ErrorPolicy::Abort => Err(err.into()),
            ErrorPolicy::Continue => {
                warn!(device = %err.device, error = %err.kind, "skipping unreachable device");
                Ok(DeviceOutcome {
                    failure: Some(err),
                    ..DeviceOutcome::default()
                })
            }
        }
    }
}
