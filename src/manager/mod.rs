pub mod job_controller;
pub mod job_table;

pub use job_controller::{JobController, Termination};
pub use job_table::JobTable;
