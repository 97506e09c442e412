use log::{error, info, warn};
use nix::{
    sys::{signal::Signal, wait::WaitStatus},
    unistd::Pid,
};

use crate::error::JobError;
use crate::manager::job_table::JobTable;
use crate::models::job::{Job, JobState};
use crate::worker::ProcessControl;

/// What a successful `terminate` observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Termination {
    pub handle: usize,
    pub pid: Pid,
    pub status: WaitStatus,
}

/// Drives the job table for one interactive session.
pub struct JobController<C: ProcessControl> {
    table: JobTable,
    control: C,
    max_jobs: usize,
}

impl<C: ProcessControl> JobController<C> {
    pub fn new(control: C, max_jobs: usize) -> Self {
        JobController {
            table: JobTable::new(),
            control,
            max_jobs,
        }
    }

    pub fn table(&self) -> &JobTable {
        &self.table
    }

    pub fn control(&self) -> &C {
        &self.control
    }

    /// Starts `command` and registers it. Capacity counts terminated jobs too.
    pub fn spawn(&mut self, command: Vec<String>) -> Result<&Job, JobError> {
        if self.table.len() >= self.max_jobs {
            return Err(JobError::Admission { max: self.max_jobs });
        }

        let head = self.control.spawn(&command).map_err(|source| JobError::Start {
            program: command.first().cloned().unwrap_or_default(),
            source,
        })?;

        let handle = self.table.admit(head, command);
        info!("Job '{}' admitted with head process {}.", handle, head);
        Ok(self.table.get(handle)?)
    }

    pub fn suspend(&mut self, handle: usize) -> Result<Pid, JobError> {
        self.deliver(handle, Signal::SIGSTOP, JobState::Suspended)
    }

    pub fn resume(&mut self, handle: usize) -> Result<Pid, JobError> {
        self.deliver(handle, Signal::SIGCONT, JobState::Running)
    }

    fn deliver(&mut self, handle: usize, signal: Signal, next: JobState) -> Result<Pid, JobError> {
        let job = self.table.get_mut(handle)?;
        if job.is_terminated() {
            return Err(JobError::JobTerminated(handle));
        }

        let pid = job.head;
        self.control
            .signal(pid, signal)
            .map_err(|source| JobError::Signal { pid, source })?;
        job.state = next;
        info!("Job '{}' is now {}.", handle, next);
        Ok(pid)
    }

    /// Kills and reaps the job. Returns `Ok(None)` if it was already terminated,
    /// in which case nothing is signalled or reaped.
    pub fn terminate(&mut self, handle: usize) -> Result<Option<Termination>, JobError> {
        let job = self.table.get_mut(handle)?;
        if job.is_terminated() {
            return Ok(None);
        }

        let pid = job.head;
        if let Err(e) = self.control.signal(pid, Signal::SIGKILL) {
            warn!("Failed to kill job '{}' ({}): {}", handle, pid, e);
        }
        // Marked before the wait so a failed reap is never retried.
        job.state = JobState::Terminated;

        let status = self
            .control
            .reap(pid)
            .map_err(|source| JobError::Reap { pid, source })?;
        info!("Job '{}' terminated: {:?}", handle, status);

        Ok(Some(Termination {
            handle,
            pid,
            status,
        }))
    }

    /// Terminates every job in handle order. Already-terminated jobs are skipped.
    pub fn terminate_all(&mut self) -> Vec<Termination> {
        let mut terminated = Vec::new();
        for handle in 0..self.table.len() {
            match self.terminate(handle) {
                Ok(Some(t)) => terminated.push(t),
                Ok(None) => {}
                Err(e) => error!("Failed to terminate job '{}': {}", handle, e),
            }
        }
        terminated
    }

    /// Jobs that have not been terminated, in handle order.
    pub fn list(&self) -> impl Iterator<Item = &Job> + '_ {
        self.table.live()
    }
}
