//! Descendant-closure reconstruction from a flat process listing.
//!
//! Rows must arrive oldest process first. A child always starts after its
//! parent, so by the time a descendant's row is visited its parent has
//! already been accepted, and one forward pass suffices. A row that appears
//! before its parent's row is not recognised as a descendant.

use crate::models::process::{Generation, Process};

use super::listing::RowLayout;

/// Returns `target` and every process transitively descended from it.
pub fn descendant_closure<I>(rows: I, target: i32) -> Generation
where
    I: IntoIterator<Item = Process>,
{
    let mut generation = Generation::new();
    for process in rows {
        if process.pid == target || generation.contains(process.ppid) {
            generation.insert(process);
        }
    }
    generation
}

/// Parses raw listing lines with `layout`, silently skipping rows that do not parse.
pub fn snapshot<I, S>(lines: I, target: i32, layout: &RowLayout) -> Generation
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    descendant_closure(
        lines.into_iter().filter_map(|line| layout.parse(line.as_ref())),
        target,
    )
}
