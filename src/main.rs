use std::io;

use clap::Parser;
use log::error;

use warden::app::{
    cli::{self, Prompt},
    config::JobsArgs,
    logging,
};
use warden::manager::JobController;
use warden::worker::{clock::SessionClock, limits, SystemControl};

fn main() {
    logging::init();
    let args = JobsArgs::parse();

    if let Err(e) = limits::set_cpu_limit(args.cpu_limit) {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    let clock = SessionClock::start();
    let mut jobs = JobController::new(SystemControl, args.max_jobs);

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    if let Err(e) = cli::run_session(&mut jobs, stdin.lock(), &mut stdout, Some(Prompt::for_stdout())) {
        error!("Session aborted: {}", e);
        jobs.terminate_all();
    }

    println!();
    println!("{}", clock.finish());
}
