//! In-memory implementations of the backend ports.
//!
//! Not durable: state lives for the process only. Listings keep insertion order, which is the
//! order the taxonomy resolver presents unsorted levels in. Each store can be switched offline to
//! exercise the `BackendUnavailable` paths.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use super::{Collection, ContentStore, Record, SessionStorage, StoreError, StoreResult, UserDirectory};
use crate::identity::UserRecord;

#[derive(Debug, Default)]
pub struct MemoryContentStore {
    collections: RwLock<HashMap<Collection, Vec<Record>>>,
    offline: AtomicBool,
}

impl MemoryContentStore {
    pub fn new() -> Self { Self::default() }

    /// Insert (or replace) a record under a caller-chosen key.
    pub fn insert<K: Into<String>>(&self, collection: Collection, key: K, data: serde_json::Value) {
        let key = key.into();
        let mut map = self.collections.write();
        let list = map.entry(collection).or_default();
        if let Some(existing) = list.iter_mut().find(|r| r.key == key) {
            existing.data = data;
        } else {
            list.push(Record { key, data });
        }
    }

    pub fn len(&self, collection: Collection) -> usize {
        self.collections.read().get(&collection).map(Vec::len).unwrap_or(0)
    }

    pub fn set_offline(&self, offline: bool) { self.offline.store(offline, Ordering::SeqCst); }

    fn check_online(&self) -> StoreResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("content store offline".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn list(&self, collection: Collection) -> StoreResult<Vec<Record>> {
        self.check_online()?;
        Ok(self.collections.read().get(&collection).cloned().unwrap_or_default())
    }

    async fn add(&self, collection: Collection, data: serde_json::Value) -> StoreResult<String> {
        self.check_online()?;
        let key = uuid::Uuid::new_v4().simple().to_string();
        self.collections.write().entry(collection).or_default().push(Record { key: key.clone(), data });
        Ok(key)
    }

    async fn update(&self, collection: Collection, key: &str, data: serde_json::Value) -> StoreResult<()> {
        self.check_online()?;
        let mut map = self.collections.write();
        let rec = map
            .get_mut(&collection)
            .and_then(|list| list.iter_mut().find(|r| r.key == key))
            .ok_or_else(|| StoreError::NotFound(format!("{}/{}", collection.name(), key)))?;
        rec.data = data;
        Ok(())
    }

    async fn delete(&self, collection: Collection, key: &str) -> StoreResult<()> {
        self.check_online()?;
        let mut map = self.collections.write();
        let list = map.entry(collection).or_default();
        let before = list.len();
        list.retain(|r| r.key != key);
        if list.len() == before {
            return Err(StoreError::NotFound(format!("{}/{}", collection.name(), key)));
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryUserDirectory {
    users: RwLock<Vec<UserRecord>>,
    offline: AtomicBool,
}

impl MemoryUserDirectory {
    pub fn new() -> Self { Self::default() }

    pub fn with_users(users: Vec<UserRecord>) -> Self {
        Self { users: RwLock::new(users), offline: AtomicBool::new(false) }
    }

    pub fn set_offline(&self, offline: bool) { self.offline.store(offline, Ordering::SeqCst); }

    fn check_online(&self) -> StoreResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("identity directory offline".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn get_user(&self, user_id: &str) -> StoreResult<UserRecord> {
        self.check_online()?;
        self.users
            .read()
            .iter()
            .find(|u| u.user_id == user_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("users/{}", user_id)))
    }

    async fn put_user(&self, user: UserRecord) -> StoreResult<()> {
        self.check_online()?;
        let mut users = self.users.write();
        match users.iter_mut().find(|u| u.user_id == user.user_id) {
            Some(existing) => *existing = user,
            None => users.push(user),
        }
        Ok(())
    }

    async fn delete_user(&self, user_id: &str) -> StoreResult<()> {
        self.check_online()?;
        let mut users = self.users.write();
        let before = users.len();
        users.retain(|u| u.user_id != user_id);
        if users.len() == before {
            return Err(StoreError::NotFound(format!("users/{}", user_id)));
        }
        Ok(())
    }

    async fn list_users(&self) -> StoreResult<Vec<UserRecord>> {
        self.check_online()?;
        Ok(self.users.read().clone())
    }
}

#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self { Self::default() }
}

impl SessionStorage for MemorySessionStorage {
    fn get(&self, key: &str) -> Option<String> { self.entries.read().get(key).cloned() }
    fn set(&self, key: &str, value: String) { self.entries.write().insert(key.to_string(), value); }
    fn remove(&self, key: &str) { self.entries.write().remove(key); }
    fn clear(&self) { self.entries.write().clear(); }
}
