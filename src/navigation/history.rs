//! Session history port.
//!
//! The navigator pushes an opaque JSON payload per view and receives payloads back on pop,
//! exactly as a browser's history API hands back `pushState` data.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalog::{Depth, Selections};

pub trait HistoryPort {
    /// Add an entry after the current one, dropping any forward entries.
    fn push(&mut self, payload: Value);
}

/// Payload stored with each history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub view: Depth,
    pub selections: Selections,
    #[serde(default)]
    pub is_root: bool,
    /// Session that wrote the entry. Entries from an earlier login are never replayed.
    #[serde(default)]
    pub session_id: String,
}

impl HistoryEntry {
    pub fn new(selections: Selections, is_root: bool, session_id: &str) -> Self {
        Self { view: selections.depth(), selections, is_root, session_id: session_id.to_string() }
    }

    /// Whether a pop may replay this entry under `session_id` with `marker` as the root marker.
    pub fn belongs_to(&self, session_id: &str, marker: &Selections) -> bool {
        !self.is_root
            && !self.session_id.is_empty()
            && self.session_id == session_id
            && self.selections.depth() != Depth::Root
            && self.selections.coaching() == marker.coaching()
    }

    pub fn to_value(&self) -> Value {
        // plain data: String/bool/enum fields cannot fail to serialize
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// `None` when the payload is absent, was not written by the navigator, or names a view
    /// its selections do not reach.
    pub fn from_value(payload: Option<&Value>) -> Option<Self> {
        payload
            .and_then(|v| serde_json::from_value::<Self>(v.clone()).ok())
            .filter(|e| e.view == e.selections.depth())
    }
}

/// In-process history with browser semantics. The first entry is the page the app was opened
/// from and carries no payload.
#[derive(Debug, Clone)]
pub struct MemoryHistory {
    entries: Vec<Option<Value>>,
    cursor: usize,
}

impl Default for MemoryHistory {
    fn default() -> Self { Self { entries: vec![None], cursor: 0 } }
}

impl MemoryHistory {
    pub fn new() -> Self { Self::default() }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn cursor(&self) -> usize { self.cursor }

    pub fn current(&self) -> Option<&Value> { self.entries[self.cursor].as_ref() }

    /// Step back. `None` when there is nothing behind; otherwise the landed entry's payload.
    pub fn back(&mut self) -> Option<Option<Value>> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(self.entries[self.cursor].clone())
    }

    pub fn forward(&mut self) -> Option<Option<Value>> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        Some(self.entries[self.cursor].clone())
    }
}

impl HistoryPort for MemoryHistory {
    fn push(&mut self, payload: Value) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(Some(payload));
        self.cursor += 1;
    }
}
