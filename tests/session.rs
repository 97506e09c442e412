use std::io::Cursor;

use nix::{
    sys::{signal::Signal, wait::WaitStatus},
    unistd::Pid,
};

use warden::app::cli::{run_session, SessionEnd};
use warden::manager::JobController;
use warden::worker::{testing::RecordingControl, SystemControl};

fn drive(script: &str, control: RecordingControl) -> (SessionEnd, String, JobController<RecordingControl>) {
    let mut jobs = JobController::new(control, 32);
    let mut out = Vec::new();
    let end = run_session(&mut jobs, Cursor::new(script.to_string()), &mut out, None).unwrap();
    (end, String::from_utf8(out).unwrap(), jobs)
}

#[test]
fn run_list_and_exit() {
    let (end, out, jobs) = drive(
        "run sleep 100\nrun yes\nsuspend 0\nlist\nexit\n",
        RecordingControl::starting_at(500),
    );

    assert_eq!(end, SessionEnd::Exit);
    assert!(out.contains("job 0 started (pid = 500)"));
    assert!(out.contains("job 1 started (pid = 501)"));
    assert!(out.contains("suspended 500"));
    assert!(out.contains(" 0: (pid =   500, cmd = sleep 100) [suspended]"));
    assert!(out.contains(" 1: (pid =   501, cmd = yes)"));
    assert!(out.contains("terminated 500"));
    assert!(out.contains("terminated 501"));
    assert!(jobs.table().iter().all(|job| job.is_terminated()));
}

#[test]
fn quit_leaves_jobs_running() {
    let (end, out, jobs) = drive("run sleep 100\nquit\nrun never\n", RecordingControl::new());

    assert_eq!(end, SessionEnd::Quit);
    assert!(!out.contains("terminated"));
    assert_eq!(jobs.list().count(), 1);
    assert!(jobs.control().reaps.is_empty());
}

#[test]
fn end_of_input_terminates_everything() {
    let (end, _, jobs) = drive("run sleep 1\nrun sleep 2", RecordingControl::new());

    assert_eq!(end, SessionEnd::Exit);
    assert_eq!(jobs.control().reaps.len(), 2);
}

#[test]
fn bad_input_is_reported_and_the_session_continues() {
    let script = "\
dance
run a b c d e f
run
suspend
suspend x
resume 9
terminate 0
list
exit
";
    let (_, out, jobs) = drive(script, RecordingControl::new());

    assert!(out.contains("Invalid command 'dance'"));
    assert!(out.contains("too many arguments -- only 4 arguments allowed"));
    assert!(out.contains("no command entered"));
    assert!(out.contains("usage: suspend <jobno>"));
    assert!(out.contains("invalid job number x"));
    assert!(out.contains("job 9 does not exist"));
    assert!(out.contains("job 0 does not exist"));
    assert!(jobs.table().is_empty());
    assert!(jobs.control().signals.is_empty());
}

#[test]
fn terminate_twice_reports_the_second_as_a_no_op() {
    let (_, out, jobs) = drive(
        "run sleep 5\nterminate 0\nterminate 0\nexit\n",
        RecordingControl::starting_at(42),
    );

    assert!(out.contains("terminated 42"));
    assert!(out.contains("job 0 was already terminated"));
    let pid = Pid::from_raw(42);
    assert_eq!(jobs.control().signals_to(pid), vec![Signal::SIGKILL]);
    assert_eq!(jobs.control().reap_count(pid), 1);
}

#[test]
fn start_failure_leaves_no_entry() {
    let mut control = RecordingControl::new();
    control.unstartable.push("ghost".into());
    let (_, out, jobs) = drive("run ghost\nrun sleep 1\nlist\nquit\n", control);

    assert!(out.contains("failed to start 'ghost'"));
    assert!(out.contains("job 0 started"));
    assert_eq!(jobs.table().len(), 1);
}

#[test]
fn admission_stops_at_capacity() {
    let mut script = String::new();
    for _ in 0..3 {
        script.push_str("run sleep 1\n");
    }
    script.push_str("terminate 0\nrun sleep 1\nquit\n");

    let mut jobs = JobController::new(RecordingControl::new(), 3);
    let mut out = Vec::new();
    run_session(&mut jobs, Cursor::new(script), &mut out, None).unwrap();
    let out = String::from_utf8(out).unwrap();

    assert!(out.contains("could not admit job -- the maximum 3 jobs are already registered"));
    assert_eq!(jobs.table().len(), 3);
}

#[test]
fn real_job_lifecycle() {
    let mut jobs = JobController::new(SystemControl, 32);
    let handle = jobs
        .spawn(vec!["sleep".to_string(), "30".to_string()])
        .unwrap()
        .handle;
    let pid = jobs.table().get(handle).unwrap().head;

    assert_eq!(jobs.suspend(handle).unwrap(), pid);
    assert_eq!(jobs.resume(handle).unwrap(), pid);

    let t = jobs.terminate(handle).unwrap().unwrap();
    assert_eq!(t.status, WaitStatus::Signaled(pid, Signal::SIGKILL, false));
    assert_eq!(jobs.terminate(handle).unwrap(), None);
}

#[test]
fn real_missing_program_is_a_start_error() {
    let mut jobs = JobController::new(SystemControl, 32);
    assert!(jobs
        .spawn(vec!["/nonexistent/warden-test-binary".to_string()])
        .is_err());
    assert!(jobs.table().is_empty());
}
