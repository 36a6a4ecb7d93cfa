use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use colored::*;
use tracing::{Instrument, Span, info_span, warn};
use tracing_indicatif::span_ext::IndicatifSpanExt;

use mcwatch_common::config::{Config, ErrorPolicy};
use mcwatch_common::device::{DeviceId, DeviceSet};
use mcwatch_common::route::MulticastRoute;
use mcwatch_core::pacing::TokioPacer;
use mcwatch_core::poller::{DeviceOutcome, PollObserver, PollSummary, Poller};
use mcwatch_core::proxy::HttpCommandProxy;

use crate::commands::PollArgs;
use crate::terminal::{colors, format, print, spinner};

/// Advances the progress bar and, in verbose mode, echoes accepted routes.
struct ConsoleObserver {
    span: Span,
    verbose: bool,
}

impl PollObserver for ConsoleObserver {
    fn device_started(&mut self, device: &DeviceId) {
        self.span.pb_set_message(device.as_str());
    }

    fn route_accepted(&mut self, route: &MulticastRoute) {
        if self.verbose {
            print::print(&format::route_line(route));
        }
    }

    fn device_finished(&mut self, _device: &DeviceId, _outcome: &DeviceOutcome) {
        self.span.pb_inc(1);
    }
}

pub async fn poll(args: PollArgs, quiet: bool) -> anyhow::Result<()> {
    let cfg: Config = args.into_config();
    cfg.validate()?;

    let devices: DeviceSet = DeviceSet::load(&cfg.device_file)?;
    if devices.is_empty() {
        warn!("{} lists no routers", cfg.device_file.display());
    }
    let proxy = HttpCommandProxy::from_config(&cfg)?;
    print_settings(&cfg, &proxy, devices.len(), quiet);

    let verbose = cfg.verbose;
    let poller = Poller::new(cfg, Arc::new(proxy), Arc::new(TokioPacer));

    let span = info_span!("polling", indicatif.pb_show = true);
    span.pb_set_style(&spinner::progress_style());
    span.pb_set_length(devices.len() as u64);
    span.pb_set_message("polling routers");

    let mut observer = ConsoleObserver {
        span: span.clone(),
        verbose,
    };
    let start_time = Instant::now();
    let summary = poller
        .poll_cycle(&devices, &mut observer)
        .instrument(span)
        .await
        .context("poll cycle failed")?;

    if verbose {
        print::separator();
        print::print(&format::column_header());
        for route in summary.report.routes() {
            print::print(&format::route_line(route));
        }
    }
    print_summary(&summary, start_time.elapsed().as_secs_f64(), quiet);
    Ok(())
}

fn print_settings(cfg: &Config, proxy: &HttpCommandProxy, device_count: usize, quiet: bool) {
    if quiet {
        return;
    }
    print::aligned_line("Routers", device_count);
    print::aligned_line("Proxy", proxy.base_url());
    print::aligned_line("Threshold", format!("> {} pps", cfg.threshold));
    print::aligned_line("Pacing", format!("{}s", cfg.pacing.as_secs_f64()));
    if cfg.workers > 1 {
        print::aligned_line("Workers", cfg.workers);
    }
    let policy = match cfg.on_error {
        ErrorPolicy::Abort => "abort",
        ErrorPolicy::Continue => "skip and continue",
    };
    print::aligned_line("On error", policy);
}

fn print_summary(summary: &PollSummary, seconds: f64, quiet: bool) {
    if quiet {
        return;
    }
    let routes: ColoredString = format!("{} active routes", summary.report.len()).bold().green();
    let routers: ColoredString = format!("{} routers", summary.polled).bold();
    let total_time: ColoredString = format!("{seconds:.2}s").bold().yellow();

    print::fat_separator();
    print::centerln(
        &format!("{routes} from {routers} in {total_time}").color(colors::TEXT_DEFAULT).to_string(),
    );
    print::aligned_line("Report", summary.path.display());
    if summary.malformed > 0 {
        print::aligned_line("Malformed", summary.malformed);
    }
    if !summary.failures.is_empty() {
        let failed: Vec<String> = summary.failures.iter().map(|f| f.device.to_string()).collect();
        print::aligned_line("Skipped", failed.join(", ").red());
    }
}
