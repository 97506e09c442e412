use std::{
    io::{BufRead, BufReader},
    process::{Command, Stdio},
    thread::{self, JoinHandle},
    time::Duration,
};

use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use log::{debug, warn};
use nix::{
    sys::signal::{self, Signal},
    unistd::{getuid, Pid},
};

use crate::error::SourceError;
use crate::models::process::Process;

/// Where the fields of a listing row live, as 0-based indexes after splitting on whitespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowLayout {
    pub pid_field: usize,
    pub ppid_field: usize,
    /// First field of the command text.
    pub command_field: usize,
    /// Fields after the command text that are not part of it.
    pub trailing_fields: usize,
}

impl Default for RowLayout {
    fn default() -> Self {
        RowLayout {
            pid_field: 1,
            ppid_field: 2,
            command_field: 5,
            trailing_fields: 2,
        }
    }
}

impl RowLayout {
    /// Returns `None` for headers, short rows and non-numeric ids.
    pub fn parse(&self, line: &str) -> Option<Process> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let min_len = (self.command_field + self.trailing_fields)
            .max(self.pid_field + 1)
            .max(self.ppid_field + 1);
        if fields.len() < min_len {
            return None;
        }

        let pid = fields[self.pid_field].parse().ok()?;
        let ppid = fields[self.ppid_field].parse().ok()?;
        let command = fields[self.command_field..fields.len() - self.trailing_fields].join(" ");
        Some(Process { pid, ppid, command })
    }
}

/// A source of process-listing rows, oldest process first.
pub trait ListingSource {
    /// Opens one listing, hands its rows to `consume`, then releases it.
    ///
    /// The row iterator is lazy and can only be walked once. The listing is
    /// closed before this returns, whatever `consume` did with it.
    fn scan<T, F>(&mut self, consume: F) -> Result<T, SourceError>
    where
        F: FnOnce(&mut dyn Iterator<Item = String>) -> T;
}

/// Runs `ps` for the current user, sorted by start time.
#[derive(Debug, Clone)]
pub struct PsListing {
    program: String,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl PsListing {
    pub fn new(timeout: Option<Duration>) -> Self {
        let args = [
            "-u",
            &getuid().to_string(),
            "-o",
            "user,pid,ppid,state,start_time,args:512,tty,etime",
            "--sort",
            "start_time",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        Self::with_command("ps", args, timeout)
    }

    pub fn with_command(program: impl Into<String>, args: Vec<String>, timeout: Option<Duration>) -> Self {
        PsListing {
            program: program.into(),
            args,
            timeout,
        }
    }
}

impl ListingSource for PsListing {
    fn scan<T, F>(&mut self, consume: F) -> Result<T, SourceError>
    where
        F: FnOnce(&mut dyn Iterator<Item = String>) -> T,
    {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| SourceError::Unavailable {
                program: self.program.clone(),
                source,
            })?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| SourceError::NoOutput(self.program.clone()))?;

        let deadline = self
            .timeout
            .map(|t| ReadDeadline::arm(Pid::from_raw(child.id() as i32), t));

        // Command text may hold any bytes; one bad row must not hide the rest.
        let mut rows = BufReader::new(stdout)
            .split(b'\n')
            .map_while(Result::ok)
            .map(|line| String::from_utf8_lossy(&line).into_owned());
        let result = consume(&mut rows);
        drop(rows);

        let expired = deadline.map(ReadDeadline::disarm).unwrap_or(false);
        let status = match child.wait() {
            Ok(status) => {
                debug!("'{}' exited: {}", self.program, status);
                Some(status)
            }
            Err(e) => {
                warn!("Failed to wait for '{}': {}", self.program, e);
                None
            }
        };

        match (expired, self.timeout, status) {
            (true, Some(t), _) => Err(SourceError::TimedOut(t)),
            (_, _, Some(status)) if !status.success() => Err(SourceError::Failed {
                program: self.program.clone(),
                status,
            }),
            _ => Ok(result),
        }
    }
}

/// Kills the listing process if the read is still running when the timeout passes.
struct ReadDeadline {
    done: Sender<()>,
    watcher: JoinHandle<bool>,
}

impl ReadDeadline {
    fn arm(pid: Pid, timeout: Duration) -> Self {
        let (done, finished) = bounded::<()>(1);
        let watcher = thread::spawn(move || match finished.recv_timeout(timeout) {
            Err(RecvTimeoutError::Timeout) => {
                warn!("Process listing {} exceeded {:?}; killing it.", pid, timeout);
                // The child is not reaped until after `disarm`, so the pid is still ours.
                let _ = signal::kill(pid, Signal::SIGKILL);
                true
            }
            _ => false,
        });
        ReadDeadline { done, watcher }
    }

    /// Returns whether the deadline fired.
    fn disarm(self) -> bool {
        let _ = self.done.send(());
        self.watcher.join().unwrap_or(false)
    }
}
