//! Listing fetches detached from the navigator.
//!
//! A request snapshots the navigator's generation; the response is only applied while that
//! generation is still current, so a fetch that resolves after the user moved on is dropped.

use crate::catalog::{ChildEntry, Depth, Selections, TaxonomyResolver};
use crate::error::{AppError, AppResult};
use crate::identity::Session;

pub struct ListingRequest {
    pub(crate) generation: u64,
    pub(crate) selections: Selections,
    pub(crate) session: Session,
    pub(crate) resolver: TaxonomyResolver,
}

impl ListingRequest {
    pub fn generation(&self) -> u64 { self.generation }

    pub fn level(&self) -> Depth { self.selections.depth() }

    pub async fn fetch(self) -> ListingResponse {
        let level = self.level();
        let result = self.resolver.list_children(&self.session, level, &self.selections).await;
        ListingResponse { generation: self.generation, level, result }
    }
}

#[derive(Debug)]
pub struct ListingResponse {
    pub generation: u64,
    pub level: Depth,
    pub result: AppResult<Vec<ChildEntry>>,
}

/// What the current view shows once its listing has resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Entries(Vec<ChildEntry>),
    /// The node exists but has no children.
    Empty,
    /// The node itself is gone.
    Missing(AppError),
    /// Retryable; the navigation state is untouched.
    Unavailable(AppError),
}
