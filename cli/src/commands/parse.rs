use anyhow::Context;
use chrono::Local;

use mcwatch_common::device::DeviceId;
use mcwatch_common::route::IdentityRule;
use mcwatch_core::poller::{self, Silent};
use mcwatch_core::{Report, RouteSet};

use crate::commands::ParseArgs;
use crate::terminal::{format, print};

/// Runs one saved response through the same parse, build and filter steps
/// as a live poll. Nothing is written to disk.
pub fn parse(args: ParseArgs) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let router = DeviceId::new(args.router);

    let harvest = poller::harvest(&router, &raw);
    let built = harvest.routes.len();
    let mut routes = RouteSet::new(args.threshold, IdentityRule::SourceGroup);
    let outcome = poller::admit(harvest, &mut routes, &mut Silent);
    let report = Report::new(Local::now(), routes);

    print::aligned_line("Blocks", outcome.blocks);
    print::aligned_line("Routes", built);
    print::aligned_line("Malformed", outcome.malformed);
    print::aligned_line("Active", report.len());
    if !report.is_empty() {
        print::separator();
        print::print(&format::column_header());
        for route in report.routes() {
            print::print(&format::route_line(route));
        }
    }
    Ok(())
}
