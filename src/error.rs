//! Unified application error model for the portal core.
//! Every component (access model, taxonomy resolver, navigator, actions) surfaces one of these
//! kinds; the navigator and any frontend map them to a user-visible consequence.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

use crate::backend::StoreError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppError {
    Unauthenticated { code: String, message: String },
    AccessDenied { code: String, message: String },
    NotFound { code: String, message: String },
    BackendUnavailable { code: String, message: String },
    UserInput { code: String, message: String },
    Conflict { code: String, message: String },
    Internal { code: String, message: String },
}

/// What the UI layer is expected to do with an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UiConsequence {
    RedirectToLogin,
    BlockingModal,
    EmptyState,
    RetryableError,
    InlineMessage,
}

impl AppError {
    pub fn code_str(&self) -> &str {
        match self {
            AppError::Unauthenticated { code, .. }
            | AppError::AccessDenied { code, .. }
            | AppError::NotFound { code, .. }
            | AppError::BackendUnavailable { code, .. }
            | AppError::UserInput { code, .. }
            | AppError::Conflict { code, .. }
            | AppError::Internal { code, .. } => code.as_str(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::Unauthenticated { message, .. }
            | AppError::AccessDenied { message, .. }
            | AppError::NotFound { message, .. }
            | AppError::BackendUnavailable { message, .. }
            | AppError::UserInput { message, .. }
            | AppError::Conflict { message, .. }
            | AppError::Internal { message, .. } => message.as_str(),
        }
    }

    pub fn unauthenticated<S: Into<String>>(code: S, msg: S) -> Self { AppError::Unauthenticated { code: code.into(), message: msg.into() } }
    pub fn denied<S: Into<String>>(code: S, msg: S) -> Self { AppError::AccessDenied { code: code.into(), message: msg.into() } }
    pub fn not_found<S: Into<String>>(code: S, msg: S) -> Self { AppError::NotFound { code: code.into(), message: msg.into() } }
    pub fn unavailable<S: Into<String>>(code: S, msg: S) -> Self { AppError::BackendUnavailable { code: code.into(), message: msg.into() } }
    pub fn user<S: Into<String>>(code: S, msg: S) -> Self { AppError::UserInput { code: code.into(), message: msg.into() } }
    pub fn conflict<S: Into<String>>(code: S, msg: S) -> Self { AppError::Conflict { code: code.into(), message: msg.into() } }
    pub fn internal<S: Into<String>>(code: S, msg: S) -> Self { AppError::Internal { code: code.into(), message: msg.into() } }

    pub fn is_denied(&self) -> bool { matches!(self, AppError::AccessDenied { .. }) }
    pub fn is_unauthenticated(&self) -> bool { matches!(self, AppError::Unauthenticated { .. }) }
    pub fn is_not_found(&self) -> bool { matches!(self, AppError::NotFound { .. }) }
    pub fn is_unavailable(&self) -> bool { matches!(self, AppError::BackendUnavailable { .. }) }

    /// Map to HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            AppError::Unauthenticated { .. } => 401,
            AppError::AccessDenied { .. } => 403,
            AppError::NotFound { .. } => 404,
            AppError::BackendUnavailable { .. } => 503,
            AppError::UserInput { .. } => 400,
            AppError::Conflict { .. } => 409,
            AppError::Internal { .. } => 500,
        }
    }

    /// Permission failures are loud (modal), missing taxonomy nodes are an empty state.
    pub fn ui_consequence(&self) -> UiConsequence {
        match self {
            AppError::Unauthenticated { .. } => UiConsequence::RedirectToLogin,
            AppError::AccessDenied { .. } => UiConsequence::BlockingModal,
            AppError::NotFound { .. } => UiConsequence::EmptyState,
            AppError::BackendUnavailable { .. } => UiConsequence::RetryableError,
            AppError::UserInput { .. } | AppError::Conflict { .. } | AppError::Internal { .. } => UiConsequence::InlineMessage,
        }
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code_str(), self.message())
    }
}

impl std::error::Error for AppError {}

pub type AppResult<T> = Result<T, AppError>;

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        // Untyped failures only originate in backend plumbing
        AppError::BackendUnavailable { code: "backend_unavailable".into(), message: err.to_string() }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => AppError::NotFound { code: "not_found".into(), message: what },
            StoreError::Conflict(what) => AppError::Conflict { code: "conflict".into(), message: what },
            other => AppError::BackendUnavailable { code: "backend_unavailable".into(), message: other.to_string() },
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
