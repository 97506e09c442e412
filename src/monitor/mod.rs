pub mod listing;
pub mod reconciler;
pub mod snapshot;
pub mod testing;

pub use listing::{ListingSource, PsListing, RowLayout};
pub use reconciler::{Event, Reaped, Transition, TreeReconciler};
