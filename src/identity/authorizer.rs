//! Access model: decides whether a session may see or act on a (class, subject, test type) node.
//!
//! Pure and side-effect free. Callers filter listings with [`can_access`] and re-check with
//! [`check_access`] immediately before every transition or content action; the UI filter is a
//! convenience and the point-of-action check is the one that counts.

use tracing::warn;

use super::session::Session;
use crate::error::{AppError, AppResult};

/// Allow/deny for one node.
///
/// With the `"all"` wildcard only class membership matters. Otherwise the subject, when given,
/// must be listed for that class; a class missing from the subject map denies every subject.
/// `test_type_id` is accepted for per-type gating but the allow-lists carry no per-type data,
/// so it never narrows the subject-level decision.
pub fn can_access(session: &Session, class_id: &str, subject_id: Option<&str>, test_type_id: Option<&str>) -> bool {
    let _ = test_type_id;
    if !session.allowed_classes.contains(class_id) {
        return false;
    }
    if session.allowed_subjects.is_all() {
        return true;
    }
    match subject_id {
        None => true,
        Some(subject) => session
            .allowed_subjects
            .for_class(class_id)
            .map(|subjects| subjects.contains(subject))
            .unwrap_or(false),
    }
}

/// Gate used at the point of action. No session is an unconditional deny.
pub fn check_access(
    session: Option<&Session>,
    class_id: &str,
    subject_id: Option<&str>,
    test_type_id: Option<&str>,
) -> AppResult<()> {
    let Some(session) = session else {
        return Err(AppError::unauthenticated("no_session", "not logged in"));
    };
    if !session.allowed_classes.contains(class_id) {
        warn!(target: "studydesk::access", "deny user={} class={}", session.user_id, class_id);
        return Err(AppError::denied("class_denied".to_string(), format!("you are not permitted to access class '{}'", class_id)));
    }
    if !can_access(session, class_id, subject_id, test_type_id) {
        let subject = subject_id.unwrap_or_default();
        warn!(target: "studydesk::access", "deny user={} class={} subject={}", session.user_id, class_id, subject);
        return Err(AppError::denied("subject_denied".to_string(), format!("you are not permitted to access subject '{}' in class '{}'", subject, class_id)));
    }
    Ok(())
}

/// Admin-only surfaces.
pub fn require_admin(session: Option<&Session>) -> AppResult<()> {
    match session {
        None => Err(AppError::unauthenticated("no_session", "not logged in")),
        Some(s) if s.is_admin() => Ok(()),
        Some(s) => {
            warn!(target: "studydesk::access", "deny admin surface user={}", s.user_id);
            Err(AppError::denied("admin_required", "admin privileges required"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{AllowedSubjects, Role};
    use chrono::Utc;
    use proptest::prelude::*;
    use std::collections::{BTreeMap, BTreeSet};

    fn session(classes: &[&str], subjects: AllowedSubjects) -> Session {
        Session {
            session_id: "sid".into(),
            user_id: "STU001".into(),
            name: "John Doe".into(),
            role: Role::Student,
            allowed_classes: classes.iter().map(|c| c.to_string()).collect(),
            allowed_subjects: subjects,
            login_time: Utc::now(),
        }
    }

    #[test]
    fn listed_subjects_gate_each_subject() {
        let s = session(&["class-9"], AllowedSubjects::listed([("class-9", vec!["mathematics"])]));
        assert!(can_access(&s, "class-9", None, None));
        assert!(can_access(&s, "class-9", Some("mathematics"), None));
        assert!(can_access(&s, "class-9", Some("mathematics"), Some("mock-test")));
        assert!(!can_access(&s, "class-9", Some("physics"), None));
        assert!(!can_access(&s, "class-10", Some("mathematics"), None));

        let err = check_access(Some(&s), "class-9", Some("physics"), None).unwrap_err();
        assert!(err.is_denied());
        assert_eq!(err.code_str(), "subject_denied");
        let err = check_access(Some(&s), "class-10", None, None).unwrap_err();
        assert_eq!(err.code_str(), "class_denied");
    }

    #[test]
    fn class_missing_from_subject_map_denies_subjects() {
        let s = session(&["class-9", "class-10"], AllowedSubjects::listed([("class-9", vec!["mathematics"])]));
        assert!(can_access(&s, "class-10", None, None));
        assert!(!can_access(&s, "class-10", Some("mathematics"), None));
    }

    #[test]
    fn wildcard_only_checks_class() {
        let s = session(&["neet"], AllowedSubjects::All);
        assert!(can_access(&s, "neet", Some("anything"), Some("assignments")));
        assert!(!can_access(&s, "jee", Some("physics"), None));
    }

    #[test]
    fn missing_session_is_unauthenticated() {
        let err = check_access(None, "class-9", Some("mathematics"), None).unwrap_err();
        assert!(err.is_unauthenticated());
        assert!(require_admin(None).unwrap_err().is_unauthenticated());
    }

    #[test]
    fn admin_gate() {
        let mut s = session(&["class-9"], AllowedSubjects::All);
        assert!(require_admin(Some(&s)).unwrap_err().is_denied());
        s.role = Role::Admin;
        assert!(require_admin(Some(&s)).is_ok());
    }

    const CLASSES: [&str; 4] = ["class-9", "class-10", "neet", "jee"];
    const SUBJECTS: [&str; 4] = ["mathematics", "physics", "chemistry", "biology"];

    fn class_set() -> impl Strategy<Value = BTreeSet<String>> {
        prop::collection::btree_set(prop::sample::select(CLASSES.to_vec()).prop_map(String::from), 0..=4)
    }

    fn allow_map() -> impl Strategy<Value = BTreeMap<String, BTreeSet<String>>> {
        prop::collection::btree_map(
            prop::sample::select(CLASSES.to_vec()).prop_map(String::from),
            prop::collection::btree_set(prop::sample::select(SUBJECTS.to_vec()).prop_map(String::from), 0..=4),
            0..=4,
        )
    }

    fn with_lists(classes: BTreeSet<String>, subjects: AllowedSubjects) -> Session {
        let mut s = session(&[], subjects);
        s.allowed_classes = classes;
        s
    }

    proptest! {
        /// Property: listed allow-maps grant exactly (class allowed) AND (subject listed for class).
        #[test]
        fn prop_listed_matches_membership(
            classes in class_set(),
            map in allow_map(),
            class in prop::sample::select(CLASSES.to_vec()),
            subject in prop::sample::select(SUBJECTS.to_vec()),
            test_type in prop::option::of(prop::sample::select(vec!["mock-test", "assignments"])),
        ) {
            let expected = classes.contains(class)
                && map.get(class).map(|subs| subs.contains(subject)).unwrap_or(false);
            let s = with_lists(classes, AllowedSubjects::Listed(map));
            prop_assert_eq!(can_access(&s, class, Some(subject), test_type), expected);
            prop_assert_eq!(check_access(Some(&s), class, Some(subject), test_type).is_ok(), expected);
        }

        /// Property: with the wildcard, only class membership matters.
        #[test]
        fn prop_wildcard_depends_on_classes_only(
            classes in class_set(),
            class in prop::sample::select(CLASSES.to_vec()),
            subject in prop::option::of(prop::sample::select(SUBJECTS.to_vec())),
        ) {
            let expected = classes.contains(class);
            let s = with_lists(classes, AllowedSubjects::All);
            prop_assert_eq!(can_access(&s, class, subject, None), expected);
            prop_assert_eq!(can_access(&s, class, subject, Some("mock-test")), expected);
        }
    }
}
