use std::collections::BTreeMap;

/// One row of a process listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Process {
    pub pid: i32,
    pub ppid: i32,
    pub command: String,
}

impl Process {
    pub fn new(pid: i32, ppid: i32, command: impl Into<String>) -> Self {
        Self {
            pid,
            ppid,
            command: command.into(),
        }
    }
}

/// The descendant set of a target observed in a single listing, target included.
///
/// Keyed by pid; a pid seen in two generations is only "the same" process
/// because the numbers match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Generation {
    processes: BTreeMap<i32, Process>,
}

impl Generation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, process: Process) {
        self.processes.insert(process.pid, process);
    }

    pub fn contains(&self, pid: i32) -> bool {
        self.processes.contains_key(&pid)
    }

    pub fn get(&self, pid: i32) -> Option<&Process> {
        self.processes.get(&pid)
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    pub fn pids(&self) -> impl Iterator<Item = i32> + '_ {
        self.processes.keys().copied()
    }

    /// Every tracked process except `target`, in ascending pid order.
    pub fn descendants(&self, target: i32) -> impl Iterator<Item = &Process> + '_ {
        self.processes.values().filter(move |p| p.pid != target)
    }
}

impl FromIterator<Process> for Generation {
    fn from_iter<I: IntoIterator<Item = Process>>(iter: I) -> Self {
        let mut generation = Generation::new();
        for process in iter {
            generation.insert(process);
        }
        generation
    }
}
