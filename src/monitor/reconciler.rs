use std::{thread, time::Duration};

use log::{debug, info, warn};
use nix::{
    errno::Errno,
    sys::{signal::Signal, wait::WaitStatus},
    unistd::Pid,
};

use crate::error::SourceError;
use crate::models::process::Generation;
use crate::worker::ProcessControl;

use super::listing::{ListingSource, RowLayout};
use super::snapshot::snapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Tracking,
    TargetExited,
}

/// A descendant killed during cleanup. `status` is `None` when it could not be
/// reaped here, which is the usual case for processes that are not our children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reaped {
    pub pid: Pid,
    pub command: String,
    pub status: Option<WaitStatus>,
}

/// Progress reported to the caller of [`TreeReconciler::run`].
#[derive(Debug)]
pub enum Event<'a> {
    Cycle {
        counter: u64,
        generation: &'a Generation,
    },
    Skipped {
        counter: u64,
        error: &'a SourceError,
    },
    TargetExited,
    Reaped(&'a Reaped),
}

/// Watches a target's descendant tree by diffing successive listings.
///
/// Only the previous generation is kept. The target has exited when it was
/// present in the previous generation and is absent from the current one;
/// a target that was never seen never triggers cleanup.
#[derive(Debug)]
pub struct TreeReconciler {
    target: i32,
    layout: RowLayout,
    previous: Generation,
    counter: u64,
}

impl TreeReconciler {
    pub fn new(target: i32, layout: RowLayout) -> Self {
        TreeReconciler {
            target,
            layout,
            previous: Generation::new(),
            counter: 0,
        }
    }

    /// Compares `current` with the previous generation and keeps it unless the target is gone.
    pub fn observe(&mut self, current: Generation) -> Transition {
        if self.previous.contains(self.target) && !current.contains(self.target) {
            info!("Target {} is gone; {} descendant(s) left.", self.target, self.previous.len() - 1);
            return Transition::TargetExited;
        }
        self.previous = current;
        Transition::Tracking
    }

    /// Reads one listing and builds its generation.
    pub fn poll<S: ListingSource>(&self, source: &mut S) -> Result<Generation, SourceError> {
        let target = self.target;
        let layout = self.layout;
        source.scan(|rows| snapshot(rows, target, &layout))
    }

    /// SIGKILLs and reaps every non-target member of the previous generation, in pid order.
    pub fn cleanup<C, O>(&self, control: &mut C, observer: &mut O) -> Vec<Reaped>
    where
        C: ProcessControl,
        O: FnMut(Event<'_>),
    {
        let mut reaped = Vec::new();
        for process in self.previous.descendants(self.target) {
            let pid = Pid::from_raw(process.pid);
            if let Err(e) = control.signal(pid, Signal::SIGKILL) {
                warn!("Failed to kill {}: {}", pid, e);
            }
            let status = match control.reap(pid) {
                Ok(status) => Some(status),
                Err(Errno::ECHILD) => {
                    debug!("{} is not a child of this process; not reaped.", pid);
                    None
                }
                Err(e) => {
                    warn!("Failed to reap {}: {}", pid, e);
                    None
                }
            };
            let entry = Reaped {
                pid,
                command: process.command.clone(),
                status,
            };
            observer(Event::Reaped(&entry));
            reaped.push(entry);
        }
        reaped
    }

    /// Polls every `interval` until the target exits, then cleans up.
    ///
    /// A listing that times out or exits unsuccessfully skips its cycle. Any
    /// other source error ends the run.
    pub fn run<S, C, O>(
        &mut self,
        source: &mut S,
        control: &mut C,
        interval: Duration,
        mut observer: O,
    ) -> Result<Vec<Reaped>, SourceError>
    where
        S: ListingSource,
        C: ProcessControl,
        O: FnMut(Event<'_>),
    {
        loop {
            let counter = self.counter;
            self.counter += 1;

            match self.poll(source) {
                Ok(current) => {
                    observer(Event::Cycle {
                        counter,
                        generation: &current,
                    });
                    if self.observe(current) == Transition::TargetExited {
                        observer(Event::TargetExited);
                        break;
                    }
                }
                Err(error @ (SourceError::TimedOut(_) | SourceError::Failed { .. })) => {
                    warn!("Skipping cycle {}: {}", counter, error);
                    observer(Event::Skipped {
                        counter,
                        error: &error,
                    });
                }
                Err(error) => return Err(error),
            }

            thread::sleep(interval);
        }

        Ok(self.cleanup(control, &mut observer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::process::Process;
    use crate::worker::testing::RecordingControl;

    fn ignore(_: Event<'_>) {}

    fn generation(pids: &[i32]) -> Generation {
        pids.iter()
            .map(|&pid| Process::new(pid, if pid == 1 { 0 } else { 1 }, format!("p{pid}")))
            .collect()
    }

    #[test]
    fn exit_is_detected_on_the_transition_where_the_target_disappears() {
        let mut reconciler = TreeReconciler::new(1, RowLayout::default());
        assert_eq!(reconciler.observe(generation(&[1, 2])), Transition::Tracking);
        assert_eq!(reconciler.observe(generation(&[1, 2])), Transition::Tracking);
        assert_eq!(reconciler.observe(generation(&[2])), Transition::TargetExited);

        let mut control = RecordingControl::new();
        let reaped = reconciler.cleanup(&mut control, &mut ignore);

        let pids: Vec<Pid> = reaped.iter().map(|r| r.pid).collect();
        assert_eq!(pids, vec![Pid::from_raw(2)]);
        assert_eq!(control.signals, vec![(Pid::from_raw(2), Signal::SIGKILL)]);
        assert_eq!(control.reaps, vec![Pid::from_raw(2)]);
    }

    #[test]
    fn target_absent_from_the_start_is_not_an_exit() {
        let mut reconciler = TreeReconciler::new(1, RowLayout::default());
        assert_eq!(reconciler.observe(generation(&[])), Transition::Tracking);
        assert_eq!(reconciler.observe(generation(&[2])), Transition::Tracking);
    }

    #[test]
    fn cleanup_keeps_going_past_unreapable_descendants() {
        let mut reconciler = TreeReconciler::new(1, RowLayout::default());
        reconciler.observe(generation(&[1, 2, 3, 4]));
        reconciler.observe(generation(&[]));

        let mut control = RecordingControl::new();
        control.foreign.push(Pid::from_raw(3));
        let reaped = reconciler.cleanup(&mut control, &mut ignore);

        assert_eq!(reaped.len(), 3);
        assert_eq!(reaped[1].pid, Pid::from_raw(3));
        assert_eq!(reaped[1].status, None);
        assert!(reaped[2].status.is_some());
        assert_eq!(control.signals.len(), 3);
    }
}
