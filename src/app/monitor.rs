use std::io::Write;

use log::{error, warn};

use crate::app::config::MonitorArgs;
use crate::error::SourceError;
use crate::monitor::{Event, ListingSource, Reaped, RowLayout, TreeReconciler};
use crate::worker::ProcessControl;

const RULE: &str = "--------------------";

/// Prints each reconciler event in the watchdog's text format.
pub struct MonitorReport<W: Write> {
    out: W,
    pid: u32,
    target: i32,
    interval: u64,
}

impl<W: Write> MonitorReport<W> {
    pub fn new(out: W, target: i32, interval: u64) -> Self {
        MonitorReport {
            out,
            pid: std::process::id(),
            target,
            interval,
        }
    }

    pub fn event(&mut self, event: Event<'_>) {
        if let Err(e) = self.write_event(event) {
            warn!("Failed to write monitor report: {}", e);
        }
    }

    fn write_event(&mut self, event: Event<'_>) -> std::io::Result<()> {
        match event {
            Event::Cycle { counter, generation } => {
                self.header(counter)?;
                writeln!(self.out, "{RULE}")?;
                writeln!(self.out, "List of monitored processes:")?;
                for process in generation.descendants(self.target) {
                    writeln!(self.out, "    {:>5}: {}", process.pid, process.command)?;
                }
                writeln!(self.out, "{RULE}")?;
            }
            Event::Skipped { counter, error } => {
                self.header(counter)?;
                writeln!(self.out, "    cycle skipped: {error}")?;
            }
            Event::TargetExited => {
                writeln!(self.out, "warden-mon: target appears to have terminated; cleaning up")?;
            }
            Event::Reaped(Reaped { pid, command, .. }) => {
                writeln!(self.out, "terminating [ {pid}, {command} ]")?;
            }
        }
        self.out.flush()
    }

    fn header(&mut self, counter: u64) -> std::io::Result<()> {
        writeln!(
            self.out,
            "warden-mon [counter={:>2}, pid={:>5}, target_pid={:>5}, interval={:>2} sec]:",
            counter, self.pid, self.target, self.interval
        )
    }
}

/// Watches `args.target_pid` until it exits and its descendants are cleaned up.
pub fn watch<S, C, W>(
    args: &MonitorArgs,
    source: &mut S,
    control: &mut C,
    out: W,
) -> Result<Vec<Reaped>, SourceError>
where
    S: ListingSource,
    C: ProcessControl,
    W: Write,
{
    let mut report = MonitorReport::new(out, args.target_pid, args.interval);
    let mut reconciler = TreeReconciler::new(args.target_pid, RowLayout::default());

    let result = reconciler.run(source, control, args.interval(), |event| report.event(event));
    if let Err(e) = &result {
        error!("Monitoring of {} stopped: {}", args.target_pid, e);
    }
    result
}
