use std::fmt;

use nix::unistd::Pid;

#[derive(Debug, Clone)]
pub struct Job {
    pub handle: usize,
    pub head: Pid,
    pub command: Vec<String>,
    pub state: JobState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Running,
    Suspended,
    Terminated,
}

impl Job {
    pub fn new(handle: usize, head: Pid, command: Vec<String>) -> Self {
        Self {
            handle,
            head,
            command,
            state: JobState::Running,
        }
    }

    pub fn is_terminated(&self) -> bool {
        self.state == JobState::Terminated
    }

    pub fn command_line(&self) -> String {
        self.command.join(" ")
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobState::Running => write!(f, "running"),
            JobState::Suspended => write!(f, "suspended"),
            JobState::Terminated => write!(f, "terminated"),
        }
    }
}
