use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Student,
    Admin,
}

/// Per-class subject allow-list, or the `"all"` wildcard.
///
/// On the wire this is either the string `"all"` or an object mapping class id to
/// a list of subject ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "AllowedSubjectsRepr", into = "AllowedSubjectsRepr")]
pub enum AllowedSubjects {
    All,
    Listed(BTreeMap<String, BTreeSet<String>>),
}

impl Default for AllowedSubjects {
    fn default() -> Self { AllowedSubjects::Listed(BTreeMap::new()) }
}

impl AllowedSubjects {
    pub fn listed<I, C, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (C, Vec<S>)>,
        C: Into<String>,
        S: Into<String>,
    {
        AllowedSubjects::Listed(
            entries
                .into_iter()
                .map(|(c, subs)| {
                    let subjects: BTreeSet<String> = subs.into_iter().map(|s| -> String { s.into() }).collect();
                    let class_id: String = c.into();
                    (class_id, subjects)
                })
                .collect(),
        )
    }

    pub fn is_all(&self) -> bool { matches!(self, AllowedSubjects::All) }

    /// Subjects allowed for a class; `None` for the wildcard or an absent class.
    pub fn for_class(&self, class_id: &str) -> Option<&BTreeSet<String>> {
        match self {
            AllowedSubjects::All => None,
            AllowedSubjects::Listed(m) => m.get(class_id),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum AllowedSubjectsRepr {
    Word(String),
    Map(BTreeMap<String, BTreeSet<String>>),
}

impl TryFrom<AllowedSubjectsRepr> for AllowedSubjects {
    type Error = String;

    fn try_from(r: AllowedSubjectsRepr) -> Result<Self, Self::Error> {
        match r {
            AllowedSubjectsRepr::Word(w) if w == "all" => Ok(AllowedSubjects::All),
            AllowedSubjectsRepr::Word(w) => Err(format!("allowedSubjects must be \"all\" or a map, got \"{}\"", w)),
            AllowedSubjectsRepr::Map(m) => Ok(AllowedSubjects::Listed(m)),
        }
    }
}

impl From<AllowedSubjects> for AllowedSubjectsRepr {
    fn from(a: AllowedSubjects) -> Self {
        match a {
            AllowedSubjects::All => AllowedSubjectsRepr::Word("all".into()),
            AllowedSubjects::Listed(m) => AllowedSubjectsRepr::Map(m),
        }
    }
}

/// Account record as held by the identity directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub user_id: String,
    /// Opaque stored credential; plaintext or a PHC string depending on `PasswordCheck`.
    pub password: String,
    pub name: String,
    #[serde(default, rename = "userType")]
    pub role: Role,
    #[serde(default)]
    pub allowed_classes: Vec<String>,
    #[serde(default)]
    pub allowed_subjects: AllowedSubjects,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allowed_subjects_wire_forms() {
        let all: AllowedSubjects = serde_json::from_str("\"all\"").unwrap();
        assert!(all.is_all());
        assert_eq!(serde_json::to_string(&all).unwrap(), "\"all\"");

        let listed: AllowedSubjects = serde_json::from_str(r#"{"class-9":["mathematics","physics"]}"#).unwrap();
        assert!(listed.for_class("class-9").unwrap().contains("physics"));
        assert!(listed.for_class("class-10").is_none());

        assert!(serde_json::from_str::<AllowedSubjects>("\"some\"").is_err());
    }

    #[test]
    fn user_record_matches_directory_shape() {
        let raw = r#"{
            "userId": "STU001", "password": "password123", "name": "John Doe",
            "userType": "student", "allowedClasses": ["class-9", "class-10"],
            "allowedSubjects": {"class-9": ["mathematics"]}
        }"#;
        let u: UserRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(u.role, Role::Student);
        assert_eq!(u.allowed_classes, vec!["class-9", "class-10"]);
        assert!(u.created_at.is_none());

        let admin: UserRecord = serde_json::from_str(
            r#"{"userId":"ADMIN001","password":"x","name":"Admin","userType":"admin","allowedSubjects":"all"}"#,
        ).unwrap();
        assert_eq!(admin.role, Role::Admin);
        assert!(admin.allowed_subjects.is_all());
        assert!(admin.allowed_classes.is_empty());
    }
}
