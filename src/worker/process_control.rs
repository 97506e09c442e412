use std::{
    io,
    process::Command,
};

use log::{debug, info};
use nix::{
    sys::{
        signal::{self, Signal},
        wait::{waitpid, WaitStatus},
    },
    unistd::Pid,
};

/// Every OS action the job session and the tree watchdog perform.
pub trait ProcessControl {
    /// Starts `command[0]` with the rest as its arguments, without a shell.
    fn spawn(&mut self, command: &[String]) -> io::Result<Pid>;

    fn signal(&mut self, pid: Pid, signal: Signal) -> nix::Result<()>;

    /// Blocks until `pid` terminates and collects its status.
    fn reap(&mut self, pid: Pid) -> nix::Result<WaitStatus>;
}

/// Talks to the real kernel.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemControl;

impl ProcessControl for SystemControl {
    fn spawn(&mut self, command: &[String]) -> io::Result<Pid> {
        let (program, args) = command.split_first().ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "empty command")
        })?;

        // The Child handle is dropped without waiting; the pid is reaped
        // explicitly through `reap`.
        let child = Command::new(program).args(args).spawn()?;
        let pid = Pid::from_raw(child.id() as i32);
        info!("Spawned '{}' as {}.", program, pid);
        Ok(pid)
    }

    fn signal(&mut self, pid: Pid, sig: Signal) -> nix::Result<()> {
        debug!("Sending {} to {}.", sig, pid);
        signal::kill(pid, sig)
    }

    fn reap(&mut self, pid: Pid) -> nix::Result<WaitStatus> {
        let status = waitpid(pid, None)?;
        debug!("Reaped {}: {:?}", pid, status);
        Ok(status)
    }
}

/// Null-signal probe: true when `pid` exists, even if owned by someone else.
pub fn is_alive(pid: Pid) -> bool {
    match signal::kill(pid, None) {
        Ok(()) => true,
        Err(nix::errno::Errno::EPERM) => true,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn spawn_kill_and_reap_a_real_process() {
        let mut control = SystemControl;
        let pid = control.spawn(&words(&["sleep", "30"])).unwrap();
        assert!(is_alive(pid));

        control.signal(pid, Signal::SIGKILL).unwrap();
        let status = control.reap(pid).unwrap();
        assert_eq!(status, WaitStatus::Signaled(pid, Signal::SIGKILL, false));
    }

    #[test]
    fn spawn_reports_missing_program() {
        let mut control = SystemControl;
        let err = control
            .spawn(&words(&["/definitely/not/a/real/program"]))
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn spawn_rejects_empty_command() {
        let mut control = SystemControl;
        let err = control.spawn(&[]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn own_process_is_alive() {
        assert!(is_alive(Pid::this()));
    }
}
