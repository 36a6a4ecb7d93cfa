use colored::*;
use mcwatch_common::route::MulticastRoute;

use crate::terminal::colors;

/// Console rendition of a route: group, source, router and packet rate in
/// fixed width columns.
pub fn route_line(route: &MulticastRoute) -> String {
    format!(
        "{}\t{}\t{}\t{}",
        format!("{:25}", route.group).color(colors::GROUP),
        format!("{:25}", route.source).color(colors::SOURCE),
        format!("{:18}", route.router).color(colors::ROUTER),
        format!("{:6}", route.packets_per_second).color(colors::RATE).bold(),
    )
}

pub fn column_header() -> String {
    format!(
        "{:25}\t{:25}\t{:18}\t{}",
        "Group", "Source", "Router", "Packets/Second"
    )
    .color(colors::ACCENT)
    .to_string()
}
