//! # Report Writer
//!
//! Sorts the routes of a poll cycle by group and writes them as a
//! tab separated file whose name carries the cycle start time.
//!
//! The file is opened in append mode. Two cycles started within the same
//! second share a file name and both land in it, each with its own header.

use std::fmt::Write as _;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use csv::{Terminator, WriterBuilder};
use tracing::debug;

use mcwatch_common::config::validate_pattern;
use mcwatch_common::error::ReportError;
use mcwatch_common::route::MulticastRoute;

use crate::collector::RouteSet;

pub const HEADER: [&str; 4] = ["Group", "Source", "Router", "Packets/Second"];

#[derive(Debug, Clone)]
pub struct Report {
    started: DateTime<Local>,
    routes: Vec<MulticastRoute>,
}

impl Report {
    /// Stable sort on group, so equal groups keep their insertion order.
    pub fn new(started: DateTime<Local>, routes: RouteSet) -> Self {
        let mut routes = routes.into_routes();
        routes.sort_by(|a, b| a.group.cmp(&b.group));
        Self { started, routes }
    }

    pub fn routes(&self) -> &[MulticastRoute] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Header row then one row per route: group, source, router, pps.
    pub fn write_tsv<W: Write>(&self, out: W) -> csv::Result<()> {
        let mut writer = WriterBuilder::new()
            .delimiter(b'\t')
            .terminator(Terminator::Any(b'\n'))
            .from_writer(out);
        writer.write_record(HEADER)?;
        for route in &self.routes {
            let pps = route.packets_per_second.to_string();
            writer.write_record([
                route.group.as_str(),
                route.source.as_str(),
                route.router.as_str(),
                pps.as_str(),
            ])?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn to_tsv(&self) -> csv::Result<String> {
        let mut buf = Vec::new();
        self.write_tsv(&mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

/// Expands the strftime `pattern` with the cycle start time.
pub fn report_path(pattern: &str, started: &DateTime<Local>) -> Result<PathBuf, ReportError> {
    validate_pattern(pattern).map_err(|_| ReportError::Pattern(pattern.to_string()))?;
    let mut rendered = String::new();
    write!(rendered, "{}", started.format(pattern))
        .map_err(|_| ReportError::Pattern(pattern.to_string()))?;
    Ok(PathBuf::from(rendered))
}

#[derive(Debug, Clone)]
pub struct ReportWriter {
    pattern: String,
}

impl ReportWriter {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }

    /// Appends `report` to its timestamped file and returns the path.
    pub fn write(&self, report: &Report) -> Result<PathBuf, ReportError> {
        let path = report_path(&self.pattern, &report.started)?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| ReportError::Io {
                path: path.clone(),
                source,
            })?;
        report
            .write_tsv(file)
            .map_err(|err| encode_error(&path, err))?;
        debug!(path = %path.display(), rows = report.len(), "report written");
        Ok(path)
    }
}

fn encode_error(path: &Path, err: csv::Error) -> ReportError {
    let path = path.to_path_buf();
    match err.into_kind() {
        csv::ErrorKind::Io(source) => ReportError::Io { path, source },
        kind => ReportError::Encode {
            path,
            source: format!("{kind:?}").into(),
        },
    }
}
