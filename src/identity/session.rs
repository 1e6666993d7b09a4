use std::collections::BTreeSet;
use std::sync::Arc;

use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::principal::{AllowedSubjects, Role, UserRecord};
use super::provider::{AuthProvider, LoginRequest};
use crate::backend::SessionStorage;
use crate::error::{AppError, AppResult};
use crate::tprintln;

/// Tab storage key the serialized session lives under.
pub const SESSION_KEY: &str = "studentAuth";

/// Authenticated identity and its allow-lists. Built once at login and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default)]
    pub session_id: String,
    pub user_id: String,
    pub name: String,
    #[serde(default, rename = "userType")]
    pub role: Role,
    #[serde(default)]
    pub allowed_classes: BTreeSet<String>,
    #[serde(default)]
    pub allowed_subjects: AllowedSubjects,
    pub login_time: DateTime<Utc>,
}

impl Session {
    pub fn from_user(user: &UserRecord, now: DateTime<Utc>) -> AppResult<Self> {
        Ok(Self {
            session_id: gen_id()?,
            user_id: user.user_id.clone(),
            name: user.name.clone(),
            role: user.role,
            allowed_classes: user.allowed_classes.iter().cloned().collect(),
            allowed_subjects: user.allowed_subjects.clone(),
            login_time: now,
        })
    }

    pub fn is_admin(&self) -> bool { self.role == Role::Admin }

    pub fn expires_at(&self, ttl: chrono::Duration) -> DateTime<Utc> {
        self.login_time.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    pub fn is_expired(&self, now: DateTime<Utc>, ttl: chrono::Duration) -> bool {
        now >= self.expires_at(ttl)
    }
}

fn gen_id() -> AppResult<String> {
    // 128-bit random id base64url without padding
    let mut buf = [0u8; 16];
    getrandom::getrandom(&mut buf).map_err(|e| AppError::internal("session_id".to_string(), e.to_string()))?;
    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buf))
}

/// Holds the tab's session in tab-scoped storage.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn SessionStorage>,
    ttl: chrono::Duration,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn SessionStorage>, ttl: chrono::Duration) -> Self {
        Self { storage, ttl }
    }

    pub fn ttl(&self) -> chrono::Duration { self.ttl }

    /// Authenticate through `provider` and persist the resulting session.
    pub async fn login(&self, provider: &dyn AuthProvider, req: &LoginRequest) -> AppResult<Session> {
        let user = provider.authenticate(req).await?;
        let session = Session::from_user(&user, Utc::now())?;
        self.begin(&session)?;
        info!(target: "studydesk::session", "login user={} role={:?} sid={}", session.user_id, session.role, session.session_id);
        Ok(session)
    }

    /// Persist an already-built session.
    pub fn begin(&self, session: &Session) -> AppResult<()> {
        let text = serde_json::to_string(session)
            .map_err(|e| AppError::internal("session_encode".to_string(), e.to_string()))?;
        self.storage.set(SESSION_KEY, text);
        tprintln!("session.begin user={} sid={}", session.user_id, session.session_id);
        Ok(())
    }

    pub fn current(&self) -> AppResult<Session> {
        self.current_at(Utc::now())
    }

    /// The live session, or `Unauthenticated` when absent, unreadable or expired.
    pub fn current_at(&self, now: DateTime<Utc>) -> AppResult<Session> {
        let Some(text) = self.storage.get(SESSION_KEY) else {
            return Err(AppError::unauthenticated("no_session", "not logged in"));
        };
        let session: Session = match serde_json::from_str(&text) {
            Ok(s) => s,
            Err(e) => {
                warn!(target: "studydesk::session", "discarding unreadable session: {}", e);
                self.storage.remove(SESSION_KEY);
                return Err(AppError::unauthenticated("session_corrupt", "session could not be read; please login again"));
            }
        };
        if session.is_expired(now, self.ttl) {
            debug!(target: "studydesk::session", "session expired user={} sid={}", session.user_id, session.session_id);
            self.storage.remove(SESSION_KEY);
            return Err(AppError::unauthenticated("session_expired", "session expired; please login again"));
        }
        Ok(session)
    }

    pub fn is_authenticated(&self) -> bool { self.current().is_ok() }

    pub fn logout(&self) {
        if let Some(text) = self.storage.get(SESSION_KEY) {
            if let Ok(s) = serde_json::from_str::<Session>(&text) {
                info!(target: "studydesk::session", "logout user={} sid={}", s.user_id, s.session_id);
            }
        }
        self.storage.clear();
    }
}
