use std::io;

use nix::unistd::Pid;

use warden::app::{config::MonitorArgs, logging, monitor};
use warden::monitor::PsListing;
use warden::worker::{limits, process_control::is_alive, SystemControl};

fn main() {
    logging::init();
    let args = MonitorArgs::parse_or_exit();

    if let Err(e) = limits::set_cpu_limit(args.cpu_limit) {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    // A target that is never seen alive would be watched forever.
    if !is_alive(Pid::from_raw(args.target_pid)) {
        eprintln!("error: target process {} does not exist", args.target_pid);
        std::process::exit(1);
    }

    let mut source = PsListing::new(args.listing_timeout());
    let mut control = SystemControl;

    match monitor::watch(&args, &mut source, &mut control, io::stdout()) {
        Ok(_) => println!("exiting warden-mon"),
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}
