use std::io::{self, BufRead, Write};

use crossterm::{style::Stylize, tty::IsTty};
use log::info;

use crate::app::config::MAX_RUN_ARGS;
use crate::error::JobError;
use crate::manager::JobController;
use crate::models::{command::SessionCommand, job::JobState};
use crate::worker::ProcessControl;

const TAB: &str = "   ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// `exit` or end of input: every job was terminated.
    Exit,
    /// `quit`: jobs were left running.
    Quit,
}

/// `warden[<pid>]: `, in yellow when writing to a terminal.
#[derive(Debug, Clone, Copy)]
pub struct Prompt {
    pid: u32,
    styled: bool,
}

impl Prompt {
    pub fn for_stdout() -> Self {
        Prompt {
            pid: std::process::id(),
            styled: io::stdout().is_tty(),
        }
    }

    fn render<W: Write>(&self, out: &mut W) -> io::Result<()> {
        if self.styled {
            write!(out, "{}{}{}", "warden[".yellow(), self.pid, "]: ".yellow())?;
        } else {
            write!(out, "warden[{}]: ", self.pid)?;
        }
        out.flush()
    }
}

/// Reads commands from `input` one line at a time until `exit`, `quit` or end of input.
pub fn run_session<C, R, W>(
    jobs: &mut JobController<C>,
    input: R,
    out: &mut W,
    prompt: Option<Prompt>,
) -> io::Result<SessionEnd>
where
    C: ProcessControl,
    R: BufRead,
    W: Write,
{
    let mut lines = input.lines();

    loop {
        if let Some(prompt) = &prompt {
            prompt.render(out)?;
        }

        let Some(line) = lines.next() else {
            writeln!(out)?;
            info!("End of input; terminating all jobs.");
            shutdown(jobs, out)?;
            return Ok(SessionEnd::Exit);
        };
        let line = line?;

        let command = match SessionCommand::parse(&line, MAX_RUN_ARGS) {
            Ok(command) => command,
            Err(e) => {
                writeln!(out, "{TAB}error: {e}")?;
                continue;
            }
        };

        match command {
            SessionCommand::Empty => continue,
            SessionCommand::List => {
                for job in jobs.list() {
                    let marker = if job.state == JobState::Suspended { " [suspended]" } else { "" };
                    writeln!(
                        out,
                        "{:>2}: (pid = {:>5}, cmd = {}){}",
                        job.handle,
                        job.head.as_raw(),
                        job.command_line(),
                        marker
                    )?;
                }
            }
            SessionCommand::Run(command) => match jobs.spawn(command) {
                Ok(job) => writeln!(out, "{TAB}job {} started (pid = {})", job.handle, job.head)?,
                Err(e) => writeln!(out, "{TAB}error: {e}")?,
            },
            SessionCommand::Suspend(raw) => match with_handle(jobs, &raw, |jobs, h| jobs.suspend(h)) {
                Ok(pid) => writeln!(out, "{TAB}suspended {pid}")?,
                Err(e) => writeln!(out, "{TAB}error: {e}")?,
            },
            SessionCommand::Resume(raw) => match with_handle(jobs, &raw, |jobs, h| jobs.resume(h)) {
                Ok(pid) => writeln!(out, "{TAB}resumed {pid}")?,
                Err(e) => writeln!(out, "{TAB}error: {e}")?,
            },
            SessionCommand::Terminate(raw) => match with_handle(jobs, &raw, |jobs, h| jobs.terminate(h)) {
                Ok(Some(t)) => writeln!(out, "{TAB}terminated {}", t.pid)?,
                Ok(None) => writeln!(out, "{TAB}job {raw} was already terminated")?,
                Err(e) => writeln!(out, "{TAB}error: {e}")?,
            },
            SessionCommand::Exit => {
                shutdown(jobs, out)?;
                return Ok(SessionEnd::Exit);
            }
            SessionCommand::Quit => return Ok(SessionEnd::Quit),
            SessionCommand::Invalid(word) => writeln!(out, "{TAB}Invalid command '{word}'")?,
        }
    }
}

fn with_handle<C, T, F>(jobs: &mut JobController<C>, raw: &str, op: F) -> Result<T, JobError>
where
    C: ProcessControl,
    F: FnOnce(&mut JobController<C>, usize) -> Result<T, JobError>,
{
    let handle = jobs.table().resolve(raw)?;
    op(jobs, handle)
}

fn shutdown<C: ProcessControl, W: Write>(jobs: &mut JobController<C>, out: &mut W) -> io::Result<()> {
    for t in jobs.terminate_all() {
        writeln!(out, "{TAB}terminated {}", t.pid)?;
    }
    Ok(())
}
