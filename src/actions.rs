//! View/download of a single PDF: the final access gate before content leaves the portal.
//!
//! Access is re-checked against the PDF record's own class, subject and test type rather than the
//! navigator's selections, so a stale or forged view cannot widen what a session may fetch.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::catalog::PdfRecord;
use crate::error::{AppError, AppResult};
use crate::identity::{check_access, Session};

static DRIVE_FILE_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"/file/d/([^/?#]+)").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PdfAction {
    View,
    Download,
}

impl std::str::FromStr for PdfAction {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "view" => Ok(PdfAction::View),
            "download" => Ok(PdfAction::Download),
            other => Err(AppError::user("unknown_action".to_string(), format!("unknown PDF action '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdfLink {
    pub action: PdfAction,
    pub url: String,
    /// Suggested save-as name; always ends in `.pdf`.
    pub file_name: String,
}

pub fn resolve_pdf_action(session: Option<&Session>, pdf: &PdfRecord, action: PdfAction) -> AppResult<PdfLink> {
    check_access(session, &pdf.class_id, Some(pdf.subject_id.as_str()), Some(pdf.type_id.as_str()))?;
    let locator = pdf.url.trim();
    if locator.is_empty() {
        return Err(AppError::not_found("pdf_link_missing".to_string(), format!("no link stored for '{}'", pdf.label())));
    }
    let url = match action {
        PdfAction::View => locator.to_string(),
        PdfAction::Download => drive_download_url(locator),
    };
    if let Some(s) = session {
        info!(target: "studydesk::access", "{:?} {} by {}", action, pdf.file_name, s.user_id);
    }
    Ok(PdfLink { action, url, file_name: save_as_name(pdf.label()) })
}

/// Google Drive viewer links become direct-download links; anything else is returned as is.
pub fn drive_download_url(link: &str) -> String {
    match DRIVE_FILE_ID.captures(link).and_then(|c| c.get(1)) {
        Some(id) => format!("https://drive.google.com/uc?export=download&id={}", id.as_str()),
        None => link.to_string(),
    }
}

fn save_as_name(label: &str) -> String {
    if label.to_ascii_lowercase().ends_with(".pdf") {
        label.to_string()
    } else {
        format!("{}.pdf", label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{AllowedSubjects, Role};
    use chrono::Utc;

    fn pdf(subject: &str, url: &str) -> PdfRecord {
        PdfRecord {
            coaching_id: "demo".into(),
            class_id: "class-9".into(),
            subject_id: subject.into(),
            type_id: "mock-test".into(),
            chapter_key: "c1".into(),
            serial_no: 1,
            file_name: "Algebra Test".into(),
            display_name: None,
            url: url.into(),
            size: None,
            uploaded_at: None,
        }
    }

    fn session() -> Session {
        Session {
            session_id: "sid".into(),
            user_id: "STU001".into(),
            name: "John Doe".into(),
            role: Role::Student,
            allowed_classes: ["class-9".to_string()].into_iter().collect(),
            allowed_subjects: AllowedSubjects::listed([("class-9", vec!["mathematics"])]),
            login_time: Utc::now(),
        }
    }

    #[test]
    fn drive_links_convert_for_download_only() {
        let s = session();
        let p = pdf("mathematics", "https://drive.google.com/file/d/1AbC_d-9/view?usp=sharing");
        let view = resolve_pdf_action(Some(&s), &p, PdfAction::View).unwrap();
        assert_eq!(view.url, p.url);
        let dl = resolve_pdf_action(Some(&s), &p, PdfAction::Download).unwrap();
        assert_eq!(dl.url, "https://drive.google.com/uc?export=download&id=1AbC_d-9");
        assert_eq!(dl.file_name, "Algebra Test.pdf");
        assert_eq!(drive_download_url("https://example.org/a.pdf"), "https://example.org/a.pdf");
    }

    #[test]
    fn gate_uses_the_record_not_the_view() {
        let s = session();
        let err = resolve_pdf_action(Some(&s), &pdf("physics", "https://example.org/p.pdf"), PdfAction::View).unwrap_err();
        assert!(err.is_denied());
        let err = resolve_pdf_action(None, &pdf("mathematics", "https://example.org/p.pdf"), PdfAction::Download).unwrap_err();
        assert!(err.is_unauthenticated());
        let err = resolve_pdf_action(Some(&s), &pdf("mathematics", "  "), PdfAction::View).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn parse_action() {
        assert_eq!("Download".parse::<PdfAction>().unwrap(), PdfAction::Download);
        assert!("print".parse::<PdfAction>().is_err());
    }
}
