pub mod command;
pub mod job;
pub mod process;
