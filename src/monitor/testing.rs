//! Test utilities for the tree watchdog.

use std::{
    collections::VecDeque,
    io,
    os::unix::process::ExitStatusExt,
    process::ExitStatus,
    time::Duration,
};

use crate::error::SourceError;

use super::listing::ListingSource;

/// Replays a fixed sequence of listings, one per `scan`.
///
/// Besides listings, the script can hold a deadline hit or a failed exit.
/// Once the script runs out the source reports itself unavailable.
#[derive(Debug, Default)]
pub struct ScriptedListing {
    listings: VecDeque<Result<Vec<String>, SourceError>>,
    pub scans: usize,
}

impl ScriptedListing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn listing<I, S>(mut self, rows: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.listings
            .push_back(Ok(rows.into_iter().map(Into::into).collect()));
        self
    }

    pub fn timeout(mut self) -> Self {
        self.listings
            .push_back(Err(SourceError::TimedOut(Duration::from_secs(1))));
        self
    }

    /// A listing whose command exited with status 1.
    pub fn failure(mut self) -> Self {
        self.listings.push_back(Err(SourceError::Failed {
            program: "scripted".to_string(),
            status: ExitStatus::from_raw(1 << 8),
        }));
        self
    }
}

impl ListingSource for ScriptedListing {
    fn scan<T, F>(&mut self, consume: F) -> Result<T, SourceError>
    where
        F: FnOnce(&mut dyn Iterator<Item = String>) -> T,
    {
        self.scans += 1;
        match self.listings.pop_front() {
            Some(Ok(rows)) => Ok(consume(&mut rows.into_iter())),
            Some(Err(error)) => Err(error),
            None => Err(SourceError::Unavailable {
                program: "scripted".to_string(),
                source: io::Error::new(io::ErrorKind::NotFound, "script exhausted"),
            }),
        }
    }
}
