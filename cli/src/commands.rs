pub mod parse;
pub mod poll;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use mcwatch_common::config::{
    Config, DEFAULT_BASE_URL, DEFAULT_DEVICE_FILE, DEFAULT_PACING_SECS, DEFAULT_REPORT_PATTERN,
    DEFAULT_THRESHOLD, DEFAULT_TIMEOUT_SECS, ErrorPolicy,
};
use mcwatch_common::route::IdentityRule;

#[derive(Parser)]
#[command(name = "mcwatch")]
#[command(about = "Reports active multicast sources across a fleet of routers.")]
pub struct CommandLine {
    /// Only print warnings, errors and requested output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Poll every router once and write the report
    #[command(alias = "p")]
    Poll(PollArgs),
    /// Run a saved proxy response through the parser and print its routes
    #[command(alias = "x")]
    Parse(ParseArgs),
}

#[derive(Args, Debug)]
pub struct PollArgs {
    /// File with one router identifier per line
    #[arg(short, long, default_value = DEFAULT_DEVICE_FILE)]
    pub devices: PathBuf,

    /// Command proxy endpoint
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// strftime pattern for the report file, expanded with the start time
    #[arg(short, long, default_value = DEFAULT_REPORT_PATTERN)]
    pub output: String,

    /// Report routes above this many packets per second
    #[arg(short, long, default_value_t = DEFAULT_THRESHOLD)]
    pub threshold: u64,

    /// Seconds to wait after each router
    #[arg(long, default_value_t = DEFAULT_PACING_SECS)]
    pub pacing: u64,

    /// Seconds before a proxy request is abandoned
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Skip unreachable routers instead of aborting the run
    #[arg(long)]
    pub continue_on_error: bool,

    /// Report the same flow once per router instead of once overall
    #[arg(long)]
    pub per_router: bool,

    /// Routers polled in parallel, sharing one pacing budget
    #[arg(short, long, default_value_t = 1)]
    pub workers: usize,

    /// Echo accepted routes and the sorted report
    #[arg(short, long)]
    pub verbose: bool,
}

impl PollArgs {
    pub fn into_config(self) -> Config {
        Config {
            base_url: self.base_url,
            device_file: self.devices,
            report_pattern: self.output,
            threshold: self.threshold,
            pacing: Duration::from_secs(self.pacing),
            timeout: Duration::from_secs(self.timeout),
            on_error: if self.continue_on_error {
                ErrorPolicy::Continue
            } else {
                ErrorPolicy::Abort
            },
            identity: if self.per_router {
                IdentityRule::SourceGroupRouter
            } else {
                IdentityRule::SourceGroup
            },
            workers: self.workers,
            verbose: self.verbose,
        }
    }
}

#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Raw response body saved from the command proxy
    pub file: PathBuf,

    /// Router name attached to the parsed routes
    #[arg(short, long, default_value = "offline")]
    pub router: String,

    /// Report routes above this many packets per second
    #[arg(short, long, default_value_t = DEFAULT_THRESHOLD)]
    pub threshold: u64,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
