use std::fmt;

/// Real and CPU time accounting for a session, read through `times(2)`.
#[derive(Clone, Copy)]
pub struct SessionClock {
    real: libc::clock_t,
    usage: libc::tms,
}

/// Seconds elapsed between [`SessionClock::start`] and [`SessionClock::finish`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionTimes {
    pub real: f64,
    pub user: f64,
    pub sys: f64,
    pub child_user: f64,
    pub child_sys: f64,
}

impl SessionClock {
    pub fn start() -> Self {
        let (real, usage) = read_times();
        Self { real, usage }
    }

    /// Child times only cover children that have been reaped by now.
    pub fn finish(&self) -> SessionTimes {
        let (real, usage) = read_times();
        let tick = clock_ticks_per_second();
        let secs = |end: libc::clock_t, start: libc::clock_t| (end - start) as f64 / tick;

        SessionTimes {
            real: secs(real, self.real),
            user: secs(usage.tms_utime, self.usage.tms_utime),
            sys: secs(usage.tms_stime, self.usage.tms_stime),
            child_user: secs(usage.tms_cutime, self.usage.tms_cutime),
            child_sys: secs(usage.tms_cstime, self.usage.tms_cstime),
        }
    }
}

fn read_times() -> (libc::clock_t, libc::tms) {
    let mut usage = libc::tms {
        tms_utime: 0,
        tms_stime: 0,
        tms_cutime: 0,
        tms_cstime: 0,
    };
    // SAFETY: `usage` is a valid, writable tms for the duration of the call.
    let real = unsafe { libc::times(&mut usage) };
    (real, usage)
}

fn clock_ticks_per_second() -> f64 {
    // SAFETY: sysconf has no memory-safety preconditions.
    let tick = unsafe { libc::sysconf(libc::_SC_CLK_TCK) };
    if tick > 0 {
        tick as f64
    } else {
        100.0
    }
}

impl fmt::Display for SessionTimes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "real: {:.2}", self.real)?;
        writeln!(f, "user: {:.2}", self.user)?;
        writeln!(f, "sys: {:.2}", self.sys)?;
        writeln!(f, "child user: {:.2}", self.child_user)?;
        write!(f, "child sys: {:.2}", self.child_sys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_times_are_never_negative() {
        let clock = SessionClock::start();
        let times = clock.finish();
        assert!(times.real >= 0.0);
        assert!(times.user >= 0.0);
        assert!(times.sys >= 0.0);
        assert!(times.child_user >= 0.0);
        assert!(times.child_sys >= 0.0);
    }

    #[test]
    fn report_lists_every_counter() {
        let times = SessionTimes {
            real: 1.5,
            user: 0.25,
            sys: 0.0,
            child_user: 2.0,
            child_sys: 0.13,
        };
        let text = times.to_string();
        assert_eq!(
            text,
            "real: 1.50\nuser: 0.25\nsys: 0.00\nchild user: 2.00\nchild sys: 0.13"
        );
    }
}
