#![cfg(test)]
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use warp::Filter;
use warp::http::StatusCode;

use mcwatch_common::config::Config;
use mcwatch_common::device::DeviceId;
use mcwatch_common::error::{TransportError, TransportErrorKind};
use mcwatch_common::proxy::{CommandProxy, RawResponse};

/// Proxy output for one multicast route, framed the way the real proxy
/// returns it (markup wrapper, entities, CRLF line endings).
pub fn route_block(group: &str, source: &str, pps: u64) -> String {
    format!(
        "Group: {group}\r\n    Source: {source}/32\r\n    Upstream interface: et-0/0/1.0\r\n    \
         Statistics: 840 kBps, {pps} pps, 112233 packets\r\n\r\n"
    )
}

pub fn proxy_page(blocks: &[String]) -> String {
    format!(
        "&lt;pre&gt;\r\nInstance: master Family: INET\r\n\r\n{}&lt;/pre&gt;",
        blocks.concat()
    )
}

pub fn config_in(dir: &tempfile::TempDir) -> Config {
    Config {
        report_pattern: dir
            .path()
            .join("mcast-%Y-%m-%d-%H:%M:%S.log")
            .to_string_lossy()
            .into_owned(),
        pacing: Duration::ZERO,
        ..Config::default()
    }
}

/// In-memory proxy. Devices without a canned page are unreachable.
#[derive(Default)]
pub struct MemoryProxy {
    pages: HashMap<String, String>,
    pub calls: Mutex<Vec<String>>,
}

impl MemoryProxy {
    pub fn with(mut self, device: &str, page: String) -> Self {
        self.pages.insert(device.to_string(), page);
        self
    }
}

#[async_trait::async_trait]
impl CommandProxy for MemoryProxy {
    async fn submit(&self, device: &DeviceId) -> Result<RawResponse, TransportError> {
        self.calls.lock().unwrap().push(device.to_string());
        self.pages.get(device.as_str()).cloned().ok_or_else(|| {
            TransportError::new(
                device.clone(),
                TransportErrorKind::Unreachable("connection refused".into()),
            )
        })
    }
}

#[derive(Clone)]
pub struct Canned {
    pub status: u16,
    pub body: String,
    pub delay: Duration,
}

impl Canned {
    pub fn ok(body: String) -> Self {
        Self { status: 200, body, delay: Duration::ZERO }
    }
}

impl Canned {
    fn not_found() -> Self {
        Self {
            status: 404,
            body: "unknown device".into(),
            delay: Duration::ZERO,
        }
    }
}

/// Query parameters of one request to the fake proxy.
pub type Query = HashMap<String, String>;

/// Local stand-in for the command proxy. Responses are chosen by the
/// `device` query parameter; unknown devices get a 404.
pub struct FakeProxy {
    pub url: String,
    requests: Arc<Mutex<Vec<Query>>>,
    handle: JoinHandle<()>,
}

impl FakeProxy {
    pub async fn start(pages: HashMap<String, Canned>) -> Self {
        let pages = Arc::new(pages);
        let requests = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&requests);

        let route = warp::path("internet2")
            .and(warp::get())
            .and(warp::query::<Query>())
            .and_then(move |query: Query| {
                let pages = Arc::clone(&pages);
                let log = Arc::clone(&log);
                async move {
                    let device = query.get("device").cloned().unwrap_or_default();
                    log.lock().unwrap().push(query);
                    let canned = pages.get(&device).cloned().unwrap_or_else(Canned::not_found);
                    if !canned.delay.is_zero() {
                        tokio::time::sleep(canned.delay).await;
                    }
                    let status = StatusCode::from_u16(canned.status).unwrap();
                    Ok::<_, warp::Rejection>(warp::reply::with_status(canned.body, status))
                }
            });

        let (addr, server) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
        let handle = tokio::spawn(server);

        Self {
            url: format!("http://{addr}/internet2/"),
            requests,
            handle,
        }
    }

    /// Decoded query parameters of every request, in arrival order.
    pub fn requests(&self) -> Vec<Query> {
        self.requests.lock().unwrap().clone()
    }
}

impl Drop for FakeProxy {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
