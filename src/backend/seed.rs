//! Startup seeding of the in-memory backend.
//!
//! A configured file is the only source for its store; without one the stores get a demo
//! catalog and the default admin account.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::info;

use super::{Collection, MemoryContentStore, MemoryUserDirectory};
use crate::config::{PasswordCheck, PortalConfig};
use crate::identity::{hash_password, AllowedSubjects, Role, UserRecord};

pub const DEFAULT_ADMIN_ID: &str = "ADMIN001";
const DEFAULT_ADMIN_PASSWORD: &str = "admin123";
const DEMO_COACHING: &str = "demo";

/// Catalog file layout: one array of documents per collection. A document's `key` field becomes
/// its store key; documents without one get a generated key.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CatalogFile {
    pub coachings: Vec<SeedDocument>,
    pub classes: Vec<SeedDocument>,
    pub subjects: Vec<SeedDocument>,
    pub test_types: Vec<SeedDocument>,
    pub chapters: Vec<SeedDocument>,
    pub pdfs: Vec<SeedDocument>,
}

#[derive(Debug, Deserialize)]
pub struct SeedDocument {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

impl CatalogFile {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).with_context(|| format!("reading catalog file {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing catalog file {}", path.display()))
    }

    fn into_collections(self) -> [(Collection, Vec<SeedDocument>); 6] {
        [
            (Collection::Coachings, self.coachings),
            (Collection::Classes, self.classes),
            (Collection::Subjects, self.subjects),
            (Collection::TestTypes, self.test_types),
            (Collection::Chapters, self.chapters),
            (Collection::Pdfs, self.pdfs),
        ]
    }
}

/// Subjects each default class offers in the demo catalog.
fn demo_subjects(class_id: &str) -> &'static [&'static str] {
    match class_id {
        "neet" => &["biology", "chemistry", "physics"],
        "jee" => &["physics", "chemistry", "mathematics"],
        _ => &["mathematics", "physics", "chemistry", "biology", "english", "bengali", "geography", "history", "others"],
    }
}

pub fn seed_catalog(store: &MemoryContentStore, config: &PortalConfig) -> Result<()> {
    match &config.catalog_file {
        Some(path) => {
            let file = CatalogFile::load(path)?;
            for (collection, docs) in file.into_collections() {
                for doc in docs {
                    let key = doc.key.unwrap_or_else(|| uuid::Uuid::new_v4().simple().to_string());
                    store.insert(collection, key, Value::Object(doc.data));
                }
            }
            info!(target: "studydesk::catalog", "catalog seeded from {}", path.display());
        }
        None => {
            seed_demo_catalog(store, config);
            info!(target: "studydesk::catalog", "demo catalog seeded ({} classes)", config.classes.len());
        }
    }
    Ok(())
}

fn seed_demo_catalog(store: &MemoryContentStore, config: &PortalConfig) {
    store.insert(
        Collection::Coachings,
        DEMO_COACHING,
        json!({"coachingId": DEMO_COACHING, "name": "Demo Coaching", "icon": "🏫", "color": "#3F51B5"}),
    );
    for class in &config.classes {
        store.insert(
            Collection::Classes,
            class.class_id.clone(),
            json!({"coachingId": DEMO_COACHING, "classId": class.class_id, "name": class.name,
                   "icon": class.icon, "color": class.color}),
        );
        for subject in demo_subjects(&class.class_id) {
            store.insert(
                Collection::Subjects,
                format!("{}.{}", class.class_id, subject),
                json!({"coachingId": DEMO_COACHING, "classId": class.class_id, "name": subject}),
            );
            for tt in &config.test_types {
                store.insert(
                    Collection::TestTypes,
                    format!("{}.{}.{}", class.class_id, subject, tt.type_id),
                    json!({"coachingId": DEMO_COACHING, "classId": class.class_id, "subjectName": subject,
                           "name": tt.type_id, "displayName": tt.name, "icon": tt.icon, "color": tt.color}),
                );
            }
        }
    }

    let Some(first_type) = config.test_types.first() else { return };
    let chapters = [(1, "number-systems", "Number Systems"), (2, "polynomials", "Polynomials"), (3, "linear-equations", "Linear Equations")];
    for (serial, key, name) in chapters {
        store.insert(
            Collection::Chapters,
            key,
            json!({"coachingId": DEMO_COACHING, "classId": "class-9", "subjectName": "mathematics",
                   "testtypeName": first_type.type_id, "serialNo": serial, "name": name}),
        );
    }
    let pdfs = [
        (1, "ns-notes", "Number Systems Notes.pdf", "https://drive.google.com/file/d/1aBcDeFgHiJkLmNoP/view?usp=sharing"),
        (2, "ns-test", "Number Systems Test 1.pdf", "https://example.org/materials/ns-test-1.pdf"),
    ];
    for (serial, key, file_name, url) in pdfs {
        store.insert(
            Collection::Pdfs,
            key,
            json!({"coachingId": DEMO_COACHING, "classId": "class-9", "subjectName": "mathematics",
                   "testtypeName": first_type.type_id, "chapterKey": "number-systems", "serialNo": serial,
                   "fileName": file_name, "url": url, "uploadedAt": Utc::now()}),
        );
    }
}

pub fn seed_users(config: &PortalConfig) -> Result<MemoryUserDirectory> {
    if let Some(path) = &config.users_file {
        let text = std::fs::read_to_string(path).with_context(|| format!("reading users file {}", path.display()))?;
        let users: Vec<UserRecord> =
            serde_json::from_str(&text).with_context(|| format!("parsing users file {}", path.display()))?;
        info!(target: "studydesk::session", "{} users loaded from {}", users.len(), path.display());
        return Ok(MemoryUserDirectory::with_users(users));
    }
    let password = match config.password_check {
        PasswordCheck::Plaintext => DEFAULT_ADMIN_PASSWORD.to_string(),
        PasswordCheck::Argon2 => hash_password(DEFAULT_ADMIN_PASSWORD)?,
    };
    let admin = UserRecord {
        user_id: DEFAULT_ADMIN_ID.to_string(),
        password,
        name: "System Administrator".to_string(),
        role: Role::Admin,
        allowed_classes: config.classes.iter().map(|c| c.class_id.clone()).collect(),
        allowed_subjects: AllowedSubjects::All,
        created_at: Some(Utc::now()),
        updated_at: None,
    };
    info!(target: "studydesk::session", "no users file configured; default admin {} created", DEFAULT_ADMIN_ID);
    Ok(MemoryUserDirectory::with_users(vec![admin]))
}
