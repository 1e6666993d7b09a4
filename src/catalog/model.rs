//! Typed views of the content listing documents.
//!
//! Field names follow the hosted backend's document shape (`coachingId`, `subjectName`,
//! `testtypeName`, `serialNo`, ...).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoachingRecord {
    pub coaching_id: String,
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassRecord {
    pub coaching_id: String,
    pub class_id: String,
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

/// Subjects are identified by their name within a class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectRecord {
    pub coaching_id: String,
    pub class_id: String,
    #[serde(alias = "subjectId")]
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestTypeRecord {
    pub coaching_id: String,
    pub class_id: String,
    #[serde(rename = "subjectName", alias = "subjectId")]
    pub subject_id: String,
    #[serde(alias = "typeId")]
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterRecord {
    pub coaching_id: String,
    pub class_id: String,
    #[serde(rename = "subjectName", alias = "subjectId")]
    pub subject_id: String,
    #[serde(rename = "testtypeName", alias = "typeId")]
    pub type_id: String,
    pub serial_no: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfRecord {
    pub coaching_id: String,
    pub class_id: String,
    #[serde(rename = "subjectName", alias = "subjectId")]
    pub subject_id: String,
    #[serde(rename = "testtypeName", alias = "typeId")]
    pub type_id: String,
    pub chapter_key: String,
    pub serial_no: i64,
    pub file_name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    /// Storage locator: a URL or an object path.
    #[serde(default, alias = "downloadURL")]
    pub url: String,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub uploaded_at: Option<DateTime<Utc>>,
}

impl PdfRecord {
    pub fn label(&self) -> &str {
        self.display_name.as_deref().filter(|n| !n.trim().is_empty()).unwrap_or(&self.file_name)
    }
}

/// A record together with its store key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyed<T> {
    pub key: String,
    pub value: T,
}

/// One selectable card in a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildEntry {
    pub id: String,
    pub label: String,
    pub icon: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_no: Option<i64>,
}

/// Upper-case the first letter: `mathematics` → `Mathematics`.
pub fn display_label(id: &str) -> String {
    let mut chars = id.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn subject_icon(subject: &str) -> &'static str {
    match subject.to_lowercase().as_str() {
        "mathematics" => "🔢",
        "physics" => "⚛️",
        "chemistry" => "🧪",
        "biology" => "🧬",
        "english" => "📚",
        "hindi" => "📖",
        "social" => "🌍",
        "computer" => "💻",
        _ => "📘",
    }
}

pub fn pdf_icon(file_name: &str) -> &'static str {
    let name = file_name.to_lowercase();
    if name.contains("note") { return "📘"; }
    if name.contains("test") || name.contains("exam") { return "📝"; }
    if name.contains("solution") || name.contains("answer") { return "✅"; }
    if name.contains("practice") || name.contains("exercise") { return "📋"; }
    if name.contains("guide") { return "📚"; }
    "📄"
}
