//! Test utilities for the process-control seam.

use std::io;

use nix::{
    sys::{signal::Signal, wait::WaitStatus},
    unistd::Pid,
};

use super::process_control::ProcessControl;

/// Fake control that hands out sequential pids and records every call.
///
/// Programs listed in `unstartable` fail to spawn with `NotFound`.
#[derive(Debug, Clone)]
pub struct RecordingControl {
    next_pid: i32,
    pub unstartable: Vec<String>,
    pub spawned: Vec<(Pid, Vec<String>)>,
    pub signals: Vec<(Pid, Signal)>,
    pub reaps: Vec<Pid>,
    /// Pids whose reap fails with ECHILD, as for processes that are not our children.
    pub foreign: Vec<Pid>,
}

impl RecordingControl {
    pub fn new() -> Self {
        Self::starting_at(4000)
    }

    pub fn starting_at(first_pid: i32) -> Self {
        Self {
            next_pid: first_pid,
            unstartable: Vec::new(),
            spawned: Vec::new(),
            signals: Vec::new(),
            reaps: Vec::new(),
            foreign: Vec::new(),
        }
    }

    pub fn signals_to(&self, pid: Pid) -> Vec<Signal> {
        self.signals
            .iter()
            .filter(|(p, _)| *p == pid)
            .map(|(_, s)| *s)
            .collect()
    }

    pub fn reap_count(&self, pid: Pid) -> usize {
        self.reaps.iter().filter(|p| **p == pid).count()
    }
}

impl Default for RecordingControl {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessControl for RecordingControl {
    fn spawn(&mut self, command: &[String]) -> io::Result<Pid> {
        let program = command
            .first()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "empty command"))?;
        if self.unstartable.contains(program) {
            return Err(io::Error::new(io::ErrorKind::NotFound, "no such program"));
        }
        let pid = Pid::from_raw(self.next_pid);
        self.next_pid += 1;
        self.spawned.push((pid, command.to_vec()));
        Ok(pid)
    }

    fn signal(&mut self, pid: Pid, signal: Signal) -> nix::Result<()> {
        self.signals.push((pid, signal));
        Ok(())
    }

    fn reap(&mut self, pid: Pid) -> nix::Result<WaitStatus> {
        self.reaps.push(pid);
        if self.foreign.contains(&pid) {
            return Err(nix::errno::Errno::ECHILD);
        }
        Ok(WaitStatus::Signaled(pid, Signal::SIGKILL, false))
    }
}
