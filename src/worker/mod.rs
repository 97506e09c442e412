pub mod clock;
pub mod limits;
pub mod process_control;
pub mod testing;

pub use process_control::{ProcessControl, SystemControl};
