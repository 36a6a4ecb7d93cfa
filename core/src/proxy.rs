//! HTTP adapter for the router command proxy.
//!
//! The proxy runs a CLI command on a router and returns its output as text:
//!
//! `GET <base>?method=submit&device=<id>&command=show multicast&menu=0&arguments=route detail`

use std::time::Duration;

use anyhow::Context;
use reqwest::{Client, Url};
use tracing::{debug, instrument};

use mcwatch_common::config::Config;
use mcwatch_common::device::DeviceId;
use mcwatch_common::error::{TransportError, TransportErrorKind};
use mcwatch_common::proxy::{CommandProxy, RawResponse};

pub const COMMAND: &str = "show multicast";
pub const ARGUMENTS: &str = "route detail";

pub struct HttpCommandProxy {
    client: Client,
    base_url: Url,
}

impl HttpCommandProxy {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("invalid command proxy URL '{base_url}'"))?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { client, base_url })
    }

    pub fn from_config(cfg: &Config) -> anyhow::Result<Self> {
        Self::new(&cfg.base_url, cfg.timeout)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

#[async_trait::async_trait]
impl CommandProxy for HttpCommandProxy {
    #[instrument(skip_all, fields(device = %device))]
    async fn submit(&self, device: &DeviceId) -> Result<RawResponse, TransportError> {
        let response = self
            .client
            .get(self.base_url.clone())
            .query(&[
                ("method", "submit"),
                ("device", device.as_str()),
                ("command", COMMAND),
                ("menu", "0"),
                ("arguments", ARGUMENTS),
            ])
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|err| classify(device, err))?;

        let body = response.text().await.map_err(|err| classify(device, err))?;
        debug!(bytes = body.len(), "received proxy response");
        Ok(body)
    }
}

fn classify(device: &DeviceId, err: reqwest::Error) -> TransportError {
    let kind = if err.is_timeout() {
        TransportErrorKind::Timeout
    } else if let Some(status) = err.status() {
        TransportErrorKind::Status(status.as_u16())
    } else {
        TransportErrorKind::Unreachable(err.to_string())
    };
    TransportError::new(device.clone(), kind)
}
