#![cfg(test)]
use std::sync::Arc;

use mcwatch_common::config::{Config, ErrorPolicy};
use mcwatch_common::device::DeviceSet;
use mcwatch_common::error::PollError;
use mcwatch_common::route::IdentityRule;
use mcwatch_core::pacing::NoopPacer;
use mcwatch_core::poller::{PollSummary, Poller, Silent};

use crate::fixtures::{MemoryProxy, config_in, proxy_page, route_block};

async fn run(cfg: Config, proxy: MemoryProxy, devices: &str) -> Result<PollSummary, PollError> {
    let poller = Poller::new(cfg, Arc::new(proxy), Arc::new(NoopPacer));
    poller.poll_cycle(&DeviceSet::parse(devices), &mut Silent).await
}

fn rows(summary: &PollSummary) -> Vec<(String, String, String, u64)> {
    summary
        .report
        .routes()
        .iter()
        .map(|r| {
            (
                r.group.clone(),
                r.source.clone(),
                r.router.to_string(),
                r.packets_per_second,
            )
        })
        .collect()
}

#[tokio::test]
async fn same_group_below_threshold_on_second_router() {
    let dir = tempfile::tempdir().unwrap();
    let proxy = MemoryProxy::default()
        .with("r1", proxy_page(&[route_block("239.2.2.2", "10.9.9.9", 150)]))
        .with("r2", proxy_page(&[route_block("239.2.2.2", "10.9.9.9", 90)]));

    let summary = run(config_in(&dir), proxy, "r1\nr2\n").await.unwrap();

    let expected = (
        "239.2.2.2".to_string(),
        "10.9.9.9/32".to_string(),
        "r1".to_string(),
        150,
    );
    assert_eq!(rows(&summary), [expected]);
    let written = std::fs::read_to_string(&summary.path).unwrap();
    assert_eq!(
        written,
        "Group\tSource\tRouter\tPackets/Second\n239.2.2.2\t10.9.9.9/32\tr1\t150\n"
    );
}

#[tokio::test]
async fn unreachable_router_is_skipped_under_continue() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = Config {
        on_error: ErrorPolicy::Continue,
        ..config_in(&dir)
    };
    let proxy = MemoryProxy::default()
        .with("r1", proxy_page(&[route_block("239.1.1.1", "10.0.0.1", 400)]))
        .with("r3", proxy_page(&[route_block("239.3.3.3", "10.0.0.3", 500)]));

    let summary = run(cfg, proxy, "r1\nr2\nr3").await.unwrap();

    let groups: Vec<String> = rows(&summary).into_iter().map(|r| r.0).collect();
    assert_eq!(groups, ["239.1.1.1", "239.3.3.3"]);
    assert_eq!(summary.polled, 3);
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].device.as_str(), "r2");
}

#[tokio::test]
async fn unreachable_router_aborts_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let proxy = MemoryProxy::default()
        .with("r1", proxy_page(&[route_block("239.1.1.1", "10.0.0.1", 400)]));

    let err = run(config_in(&dir), proxy, "r1\nr2\nr3").await.unwrap_err();

    assert!(err.to_string().contains("r2"));
    assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
}

#[tokio::test]
async fn duplicate_inventory_lines_poll_once() {
    let dir = tempfile::tempdir().unwrap();
    let proxy = Arc::new(
        MemoryProxy::default()
            .with("r1", proxy_page(&[route_block("239.1.1.1", "10.0.0.1", 400)])),
    );
    let poller = Poller::new(config_in(&dir), proxy.clone(), Arc::new(NoopPacer));

    poller
        .poll_cycle(&DeviceSet::parse("r1\nr1\n\nr1\n"), &mut Silent)
        .await
        .unwrap();

    assert_eq!(*proxy.calls.lock().unwrap(), ["r1"]);
}

#[tokio::test]
async fn flow_seen_on_two_routers_reported_once_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let page = proxy_page(&[route_block("233.44.15.9", "128.223.1.5", 330)]);
    let proxy = MemoryProxy::default()
        .with("core1", page.clone())
        .with("core2", page);

    let summary = run(config_in(&dir), proxy, "core1\ncore2").await.unwrap();
    assert_eq!(summary.report.len(), 1);
    assert_eq!(summary.report.routes()[0].router.as_str(), "core1");
}

#[tokio::test]
async fn per_router_identity_keeps_every_router() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = Config {
        identity: IdentityRule::SourceGroupRouter,
        ..config_in(&dir)
    };
    let page = proxy_page(&[route_block("233.44.15.9", "128.223.1.5", 330)]);
    let proxy = MemoryProxy::default()
        .with("core1", page.clone())
        .with("core2", page);

    let summary = run(cfg, proxy, "core1\ncore2").await.unwrap();
    let routers: Vec<String> = rows(&summary).into_iter().map(|r| r.2).collect();
    assert_eq!(routers, ["core1", "core2"]);
}

#[tokio::test]
async fn report_is_sorted_by_group_across_routers() {
    let dir = tempfile::tempdir().unwrap();
    let proxy = MemoryProxy::default()
        .with(
            "r1",
            proxy_page(&[
                route_block("239.9.0.1", "10.0.0.1", 101),
                route_block("224.2.2.2", "10.0.0.2", 102),
            ]),
        )
        .with(
            "r2",
            proxy_page(&[
                route_block("233.0.0.7", "10.0.0.3", 103),
                route_block("239.0.0.5", "10.0.0.4", 100),
            ]),
        );

    let summary = run(config_in(&dir), proxy, "r1\nr2").await.unwrap();
    let groups: Vec<String> = rows(&summary).into_iter().map(|r| r.0).collect();
    assert_eq!(groups, ["224.2.2.2", "233.0.0.7", "239.9.0.1"]);
}

#[tokio::test]
async fn concurrent_and_sequential_reports_match() {
    let pages = [
        ("r1", vec![route_block("239.1.1.1", "10.0.0.1", 200)]),
        (
            "r2",
            vec![
                route_block("239.1.1.1", "10.0.0.1", 300),
                route_block("224.0.0.9", "10.0.0.9", 999),
            ],
        ),
        ("r3", vec![route_block("233.3.3.3", "10.0.0.3", 150)]),
        ("r4", vec![route_block("239.1.1.1", "10.0.0.2", 120)]),
    ];
    let proxy = || {
        pages
            .iter()
            .fold(MemoryProxy::default(), |proxy, (device, blocks)| {
                proxy.with(device, proxy_page(blocks))
            })
    };

    let seq_dir = tempfile::tempdir().unwrap();
    let sequential = run(config_in(&seq_dir), proxy(), "r1\nr2\nr3\nr4")
        .await
        .unwrap();

    let par_dir = tempfile::tempdir().unwrap();
    let cfg = Config {
        workers: 4,
        ..config_in(&par_dir)
    };
    let concurrent = run(cfg, proxy(), "r1\nr2\nr3\nr4").await.unwrap();

    assert_eq!(rows(&sequential), rows(&concurrent));
    assert_eq!(
        std::fs::read_to_string(&sequential.path).unwrap(),
        std::fs::read_to_string(&concurrent.path).unwrap()
    );
}

#[tokio::test]
async fn malformed_blocks_do_not_stop_the_device() {
    let dir = tempfile::tempdir().unwrap();
    let broken = "Group: 239.7.7.7\r\n    Source: 10.0.0.7/32\r\n    Statistics: n/a\r\n\r\n".to_string();
    let proxy = MemoryProxy::default().with(
        "r1",
        proxy_page(&[broken, route_block("239.8.8.8", "10.0.0.8", 800)]),
    );

    let summary = run(config_in(&dir), proxy, "r1").await.unwrap();
    assert_eq!(summary.malformed, 1);
    assert_eq!(summary.report.len(), 1);
    assert_eq!(summary.report.routes()[0].group, "239.8.8.8");
}
