use nix::unistd::Pid;

use crate::error::InvalidHandle;
use crate::models::job::Job;

/// Append-only registry of jobs. A job's handle is its index and is never reused.
///
/// Entries are never removed, so `len()` counts every admission including
/// terminated jobs.
#[derive(Debug, Default)]
pub struct JobTable {
    jobs: Vec<Job>,
}

impl JobTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Appends a running job and returns its handle.
    pub fn admit(&mut self, head: Pid, command: Vec<String>) -> usize {
        let handle = self.jobs.len();
        self.jobs.push(Job::new(handle, head, command));
        handle
    }

    pub fn get(&self, handle: usize) -> Result<&Job, InvalidHandle> {
        self.jobs
            .get(handle)
            .ok_or(InvalidHandle::OutOfRange(handle as i64))
    }

    pub fn get_mut(&mut self, handle: usize) -> Result<&mut Job, InvalidHandle> {
        self.jobs
            .get_mut(handle)
            .ok_or(InvalidHandle::OutOfRange(handle as i64))
    }

    /// Turns user input into a handle that exists in the table.
    pub fn resolve(&self, raw: &str) -> Result<usize, InvalidHandle> {
        let n: i64 = raw
            .trim()
            .parse()
            .map_err(|_| InvalidHandle::NotANumber(raw.to_owned()))?;
        if n < 0 || n as u64 >= self.jobs.len() as u64 {
            return Err(InvalidHandle::OutOfRange(n));
        }
        Ok(n as usize)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Job> + '_ {
        self.jobs.iter()
    }

    /// Jobs that have not been terminated, in handle order.
    pub fn live(&self) -> impl Iterator<Item = &Job> + '_ {
        self.jobs.iter().filter(|job| !job.is_terminated())
    }
}
