//! Startup path: config file + env layer, file-seeded directory and catalog, login and a first
//! listing.

use std::sync::Arc;

use anyhow::Result;
use tempfile::tempdir;

use studydesk::backend::seed::{seed_catalog, seed_users};
use studydesk::backend::{MemoryContentStore, MemorySessionStorage};
use studydesk::catalog::TaxonomyResolver;
use studydesk::config::{EnvConfig, FileConfig, PasswordCheck, PortalConfig};
use studydesk::identity::{hash_password, DirectoryAuthProvider, LoginRequest, SessionStore};
use studydesk::navigation::{LabelBook, MemoryHistory, Navigator, Screen};

#[tokio::test]
async fn file_seeded_portal_with_argon2_logins() -> Result<()> {
    let dir = tempdir()?;
    let phc = hash_password("secure456")?;
    std::fs::write(
        dir.path().join("users.json"),
        serde_json::to_string(&serde_json::json!([{
            "userId": "STU002", "password": phc, "name": "Jane Smith", "userType": "student",
            "allowedClasses": ["neet"], "allowedSubjects": "all"
        }]))?,
    )?;
    std::fs::write(
        dir.path().join("catalog.json"),
        r#"{
            "coachings": [{"key": "acme", "coachingId": "acme", "name": "Acme Academy"}],
            "classes": [
                {"coachingId": "acme", "classId": "neet", "name": "NEET"},
                {"coachingId": "acme", "classId": "jee", "name": "JEE"}
            ],
            "subjects": [{"coachingId": "acme", "classId": "neet", "name": "biology"}]
        }"#,
    )?;
    let config_path = dir.path().join("portal.json");
    std::fs::write(
        &config_path,
        r#"{"users_file": "users.json", "catalog_file": "catalog.json", "password_check": "argon2"}"#,
    )?;

    let file = FileConfig::load(&config_path)?;
    let env = EnvConfig::from_lookup(|k| (k == "STUDYDESK_HOME_LABEL").then(|| "Dashboard".to_string()))?;
    let config = PortalConfig::from_layers(PortalConfig::default(), Some(&file), &env);
    assert_eq!(config.password_check, PasswordCheck::Argon2);
    assert_eq!(config.home_label, "Dashboard");

    let store = Arc::new(MemoryContentStore::new());
    seed_catalog(&store, &config)?;
    let provider = DirectoryAuthProvider::new(Arc::new(seed_users(&config)?), config.password_check);
    let sessions = SessionStore::new(Arc::new(MemorySessionStorage::new()), config.session_ttl());

    let err = sessions.login(&provider, &LoginRequest::new("ADMIN001", "admin123")).await.unwrap_err();
    assert!(err.is_unauthenticated());
    let session = sessions.login(&provider, &LoginRequest::new("STU002", "secure456")).await?;
    assert!(session.allowed_subjects.is_all());

    let mut nav = Navigator::new(sessions, TaxonomyResolver::new(store), MemoryHistory::new(), LabelBook::from_config(&config));
    nav.select_coaching("acme")?;
    match nav.refresh().await? {
        Screen::Entries(classes) => {
            let ids: Vec<&str> = classes.iter().map(|c| c.id.as_str()).collect();
            assert_eq!(ids, vec!["neet"]);
        }
        other => panic!("unexpected screen {:?}", other),
    }
    nav.select_class("neet")?;
    nav.select_subject("biology")?;
    assert_eq!(nav.breadcrumb(), vec!["Dashboard", "NEET", "Biology"]);
    // no test types seeded for biology
    assert_eq!(nav.refresh().await?, Screen::Empty);
    Ok(())
}

#[tokio::test]
async fn expired_session_redirects_to_login() -> Result<()> {
    let config = PortalConfig { session_ttl_secs: 0, ..PortalConfig::default() };
    let provider = DirectoryAuthProvider::new(Arc::new(seed_users(&config)?), config.password_check);
    let sessions = SessionStore::new(Arc::new(MemorySessionStorage::new()), config.session_ttl());
    sessions.login(&provider, &LoginRequest::new("ADMIN001", "admin123")).await?;

    let err = sessions.current().unwrap_err();
    assert_eq!(err.code_str(), "session_expired");
    // the expired entry is dropped
    assert_eq!(sessions.current().unwrap_err().code_str(), "no_session");
    Ok(())
}
