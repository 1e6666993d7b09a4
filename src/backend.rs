//! Ports to the hosted backend the portal rides on.
//!
//! The portal does not implement a document database, an identity provider or tab storage;
//! it talks to them through these traits. In-memory implementations live in [`memory`]
//! and are used by the shell binary and the tests.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::identity::UserRecord;

pub mod memory;
pub mod seed;

pub use memory::{MemoryContentStore, MemorySessionStorage, MemoryUserDirectory};

/// Content listing collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Collection {
    Coachings,
    Classes,
    Subjects,
    TestTypes,
    Chapters,
    Pdfs,
}

impl Collection {
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Coachings => "coachings",
            Collection::Classes => "classes",
            Collection::Subjects => "subjects",
            Collection::TestTypes => "test-types",
            Collection::Chapters => "chapters",
            Collection::Pdfs => "pdfs",
        }
    }
}

/// A keyed JSON document from a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub key: String,
    pub data: serde_json::Value,
}

impl Record {
    /// Decode the document, skipping (with a warning) anything that does not fit `T`.
    pub fn decode<T: DeserializeOwned>(&self, collection: Collection) -> Option<T> {
        match serde_json::from_value::<T>(self.data.clone()) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(target: "studydesk::catalog", "skipping malformed {} record {}: {}", collection.name(), self.key, e);
                None
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("backend unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Document collections backing the content taxonomy.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// All records of a collection, in insertion order.
    async fn list(&self, collection: Collection) -> StoreResult<Vec<Record>>;
    /// Add a record under a fresh key; returns the key.
    async fn add(&self, collection: Collection, data: serde_json::Value) -> StoreResult<String>;
    async fn update(&self, collection: Collection, key: &str, data: serde_json::Value) -> StoreResult<()>;
    async fn delete(&self, collection: Collection, key: &str) -> StoreResult<()>;
}

/// Account directory.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn get_user(&self, user_id: &str) -> StoreResult<UserRecord>;
    async fn put_user(&self, user: UserRecord) -> StoreResult<()>;
    async fn delete_user(&self, user_id: &str) -> StoreResult<()>;
    async fn list_users(&self) -> StoreResult<Vec<UserRecord>>;
}

/// Tab-scoped key/value storage holding the serialized session.
pub trait SessionStorage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String);
    fn remove(&self, key: &str);
    fn clear(&self);
}
