//! Portal configuration.
//!
//! Resolved once at startup from three layers, lowest precedence first:
//! built-in defaults, an optional JSON file named by `STUDYDESK_CONFIG`, then
//! `STUDYDESK_*` environment overrides. Components receive the resolved value;
//! nothing re-reads configuration per call.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const CONFIG_ENV: &str = "STUDYDESK_CONFIG";

/// How stored passwords are compared against the supplied one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PasswordCheck {
    /// Stored value is the password itself (legacy directory format).
    Plaintext,
    /// Stored value is an Argon2 PHC string.
    Argon2,
}

impl FromStr for PasswordCheck {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plaintext" | "plain" => Ok(PasswordCheck::Plaintext),
            "argon2" => Ok(PasswordCheck::Argon2),
            other => Err(anyhow!("unknown password check mode '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClassPreset {
    pub class_id: String,
    pub name: String,
    pub icon: String,
    pub color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TestTypePreset {
    pub type_id: String,
    pub name: String,
    pub icon: String,
    pub color: String,
}

/// Fully resolved configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PortalConfig {
    pub session_ttl_secs: u64,
    pub password_check: PasswordCheck,
    pub home_label: String,
    pub log_filter: String,
    /// When set, the identity directory is loaded from this JSON file only.
    pub users_file: Option<PathBuf>,
    /// When set, the content catalog is seeded from this JSON file only.
    pub catalog_file: Option<PathBuf>,
    pub classes: Vec<ClassPreset>,
    pub test_types: Vec<TestTypePreset>,
}

fn class(id: &str, name: &str, icon: &str, color: &str) -> ClassPreset {
    ClassPreset { class_id: id.into(), name: name.into(), icon: icon.into(), color: color.into() }
}

fn test_type(id: &str, name: &str, icon: &str, color: &str) -> TestTypePreset {
    TestTypePreset { type_id: id.into(), name: name.into(), icon: icon.into(), color: color.into() }
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            session_ttl_secs: 12 * 60 * 60,
            password_check: PasswordCheck::Plaintext,
            home_label: "Home".to_string(),
            log_filter: "info".to_string(),
            users_file: None,
            catalog_file: None,
            classes: vec![
                class("class-9", "Class IX", "📘", "#4CAF50"),
                class("class-10", "Class X", "📗", "#2196F3"),
                class("sem-1", "SEM I", "🎓", "#FF9800"),
                class("sem-2", "SEM II", "🎓", "#FF5722"),
                class("sem-3", "SEM III", "🎓", "#9C27B0"),
                class("sem-4", "SEM IV", "🎓", "#E91E63"),
                class("neet", "NEET", "🏥", "#00BCD4"),
                class("jee", "JEE", "⚡", "#FFC107"),
            ],
            test_types: vec![
                test_type("mock-test", "Mock Test", "📝", "#4CAF50"),
                test_type("assignments", "Assignments", "📋", "#2196F3"),
            ],
        }
    }
}

/// JSON file layer. Unspecified values inherit from the defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FileConfig {
    pub session_ttl_secs: Option<u64>,
    pub password_check: Option<PasswordCheck>,
    pub home_label: Option<String>,
    pub log_filter: Option<String>,
    pub users_file: Option<PathBuf>,
    pub catalog_file: Option<PathBuf>,
    pub classes: Option<Vec<ClassPreset>>,
    pub test_types: Option<Vec<TestTypePreset>>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let cfg: FileConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        // Relative data paths are taken relative to the config file
        let base = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(FileConfig {
            users_file: cfg.users_file.map(|p| if p.is_relative() { base.join(p) } else { p }),
            catalog_file: cfg.catalog_file.map(|p| if p.is_relative() { base.join(p) } else { p }),
            ..cfg
        })
    }
}

/// Environment layer, highest precedence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvConfig {
    pub session_ttl_secs: Option<u64>,
    pub password_check: Option<PasswordCheck>,
    pub home_label: Option<String>,
    pub log_filter: Option<String>,
    pub users_file: Option<PathBuf>,
    pub catalog_file: Option<PathBuf>,
}

impl EnvConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |k: &str| lookup(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let session_ttl_secs = match get("STUDYDESK_SESSION_TTL_SECS") {
            Some(v) => Some(v.parse::<u64>().with_context(|| format!("STUDYDESK_SESSION_TTL_SECS='{}'", v))?),
            None => None,
        };
        let password_check = match get("STUDYDESK_PASSWORD_CHECK") {
            Some(v) => Some(v.parse::<PasswordCheck>()?),
            None => None,
        };
        Ok(Self {
            session_ttl_secs,
            password_check,
            home_label: get("STUDYDESK_HOME_LABEL"),
            log_filter: get("STUDYDESK_LOG"),
            users_file: get("STUDYDESK_USERS_FILE").map(PathBuf::from),
            catalog_file: get("STUDYDESK_CATALOG_FILE").map(PathBuf::from),
        })
    }
}

impl PortalConfig {
    /// Merge layers: defaults, then file, then env.
    pub fn from_layers(defaults: PortalConfig, file: Option<&FileConfig>, env: &EnvConfig) -> Self {
        let mut cfg = defaults;
        if let Some(f) = file {
            if let Some(v) = f.session_ttl_secs { cfg.session_ttl_secs = v; }
            if let Some(v) = f.password_check { cfg.password_check = v; }
            if let Some(v) = &f.home_label { cfg.home_label = v.clone(); }
            if let Some(v) = &f.log_filter { cfg.log_filter = v.clone(); }
            if f.users_file.is_some() { cfg.users_file = f.users_file.clone(); }
            if f.catalog_file.is_some() { cfg.catalog_file = f.catalog_file.clone(); }
            if let Some(v) = &f.classes { cfg.classes = v.clone(); }
            if let Some(v) = &f.test_types { cfg.test_types = v.clone(); }
        }
        if let Some(v) = env.session_ttl_secs { cfg.session_ttl_secs = v; }
        if let Some(v) = env.password_check { cfg.password_check = v; }
        if let Some(v) = &env.home_label { cfg.home_label = v.clone(); }
        if let Some(v) = &env.log_filter { cfg.log_filter = v.clone(); }
        if env.users_file.is_some() { cfg.users_file = env.users_file.clone(); }
        if env.catalog_file.is_some() { cfg.catalog_file = env.catalog_file.clone(); }
        cfg
    }

    /// Resolve from the process environment. A named config file that cannot be
    /// read is an error.
    pub fn resolve() -> Result<Self> {
        let env = EnvConfig::from_env()?;
        let file = match std::env::var(CONFIG_ENV).ok().filter(|v| !v.trim().is_empty()) {
            Some(p) => Some(FileConfig::load(Path::new(p.trim()))?),
            None => None,
        };
        let cfg = Self::from_layers(PortalConfig::default(), file.as_ref(), &env);
        debug!(target: "studydesk::config", "resolved config: ttl={}s check={:?} users_file={:?} catalog_file={:?}",
            cfg.session_ttl_secs, cfg.password_check, cfg.users_file, cfg.catalog_file);
        Ok(cfg)
    }

    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(i64::try_from(self.session_ttl_secs).unwrap_or(i64::MAX / 1000))
    }
}
