//! Back-button-safe navigation over the content taxonomy.
//!
//! The [`Navigator`] owns the tab's view state. It pushes one history entry per applied
//! transition, replays entries on pop, and treats the first entry as a reflecting boundary.

pub mod history;
pub mod labels;
pub mod listing;
pub mod machine;
pub mod state;

pub use crate::catalog::{Depth, Selections, Step};
pub use history::{HistoryEntry, HistoryPort, MemoryHistory};
pub use labels::LabelBook;
pub use listing::{ListingRequest, ListingResponse, Screen};
pub use machine::{Navigator, Transition};
pub use state::NavigationState;
