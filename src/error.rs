use std::time::Duration;

use nix::unistd::Pid;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JobError {
    #[error("could not admit job -- the maximum {max} jobs are already registered")]
    Admission { max: usize },

    #[error(transparent)]
    InvalidHandle(#[from] InvalidHandle),

    #[error("job {0} has already been terminated")]
    JobTerminated(usize),

    #[error("failed to start '{program}': {source}")]
    Start {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to signal {pid}: {source}")]
    Signal {
        pid: Pid,
        #[source]
        source: nix::Error,
    },

    #[error("failed to reap {pid}: {source}")]
    Reap {
        pid: Pid,
        #[source]
        source: nix::Error,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidHandle {
    #[error("invalid job number {0}")]
    NotANumber(String),

    #[error("job {0} does not exist")]
    OutOfRange(i64),
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("usage: {0} <jobno>")]
    Usage(&'static str),

    #[error("no command entered")]
    MissingProgram,

    #[error("too many arguments -- only {max} arguments allowed")]
    TooManyArguments { max: usize },
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("could not open process listing '{program}': {source}")]
    Unavailable {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("process listing '{0}' produced no output stream")]
    NoOutput(String),

    #[error("process listing did not finish within {0:?}")]
    TimedOut(Duration),

    #[error("process listing '{program}' failed: {status}")]
    Failed {
        program: String,
        status: std::process::ExitStatus,
    },
}

#[derive(Debug, Error)]
pub enum LimitError {
    #[error("getrlimit error: {0}")]
    Query(#[source] nix::Error),
}
