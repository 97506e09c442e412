use log::{info, warn};
use nix::sys::resource::{getrlimit, setrlimit, Resource};

use crate::error::LimitError;

/// Lowers the soft RLIMIT_CPU of this process to `seconds`, capped at the hard limit.
///
/// The kernel enforces the limit with SIGXCPU; nothing here handles it. A
/// failure to apply the new limit is logged and ignored, a failure to read the
/// current one is returned.
pub fn set_cpu_limit(seconds: u64) -> Result<(), LimitError> {
    let (_soft, hard) = getrlimit(Resource::RLIMIT_CPU).map_err(LimitError::Query)?;
    let soft = seconds.min(hard as u64) as libc::rlim_t;

    match setrlimit(Resource::RLIMIT_CPU, soft, hard) {
        Ok(()) => info!("CPU limit set to {} seconds.", soft),
        Err(e) => warn!("Failed to set CPU limit to {} seconds: {}", soft, e),
    }
    Ok(())
}
