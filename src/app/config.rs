use std::time::Duration;

use clap::{error::ErrorKind, Parser};

pub const DEFAULT_MAX_JOBS: usize = 32;
pub const DEFAULT_CPU_LIMIT_SECS: u64 = 600;
pub const DEFAULT_INTERVAL_SECS: u64 = 3;
/// Arguments accepted after the program name of `run`.
pub const MAX_RUN_ARGS: usize = 4;

pub const MONITOR_USAGE: &str = "usage: warden-mon <target-pid> [interval]";

/// Interactive job session.
#[derive(Debug, Parser)]
#[command(name = "warden-jobs", version)]
pub struct JobsArgs {
    /// Jobs admitted over the whole session, terminated ones included.
    #[arg(long, default_value_t = DEFAULT_MAX_JOBS)]
    pub max_jobs: usize,

    /// Soft CPU-time limit for the session, in seconds.
    #[arg(long, default_value_t = DEFAULT_CPU_LIMIT_SECS)]
    pub cpu_limit: u64,
}

/// Watch the descendants of a process and kill them once it exits.
#[derive(Debug, Parser)]
#[command(name = "warden-mon", version)]
pub struct MonitorArgs {
    /// Process whose descendant tree is watched. Must be alive at startup.
    #[arg(value_parser = clap::value_parser!(i32).range(1..))]
    pub target_pid: i32,

    /// Seconds between polls.
    #[arg(default_value_t = DEFAULT_INTERVAL_SECS)]
    pub interval: u64,

    /// Abandon a process listing that takes longer than this many seconds.
    #[arg(long, value_name = "SECS")]
    pub listing_timeout: Option<u64>,

    /// Soft CPU-time limit for the monitor, in seconds.
    #[arg(long, default_value_t = DEFAULT_CPU_LIMIT_SECS)]
    pub cpu_limit: u64,
}

impl MonitorArgs {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }

    pub fn listing_timeout(&self) -> Option<Duration> {
        self.listing_timeout.map(Duration::from_secs)
    }

    /// Like `parse`, but bad arguments print the short usage line and exit with status 1.
    pub fn parse_or_exit() -> Self {
        match Self::try_parse() {
            Ok(args) => args,
            Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
            Err(e) => {
                log::debug!("Argument error: {}", e);
                eprintln!("{}", MONITOR_USAGE);
                std::process::exit(1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monitor_interval_defaults_to_three_seconds() {
        let args = MonitorArgs::try_parse_from(["warden-mon", "1234"]).unwrap();
        assert_eq!(args.target_pid, 1234);
        assert_eq!(args.interval(), Duration::from_secs(3));
        assert_eq!(args.listing_timeout(), None);
    }

    #[test]
    fn monitor_accepts_interval_and_timeout() {
        let args =
            MonitorArgs::try_parse_from(["warden-mon", "77", "10", "--listing-timeout", "5"]).unwrap();
        assert_eq!(args.interval(), Duration::from_secs(10));
        assert_eq!(args.listing_timeout(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn monitor_rejects_missing_or_bad_target() {
        assert!(MonitorArgs::try_parse_from(["warden-mon"]).is_err());
        assert!(MonitorArgs::try_parse_from(["warden-mon", "abc"]).is_err());
        assert!(MonitorArgs::try_parse_from(["warden-mon", "0"]).is_err());
    }

    #[test]
    fn jobs_defaults() {
        let args = JobsArgs::try_parse_from(["warden-jobs"]).unwrap();
        assert_eq!(args.max_jobs, 32);
        assert_eq!(args.cpu_limit, 600);
    }
}
