use super::*;

#[test]
fn http_status_mapping() {
    assert_eq!(AppError::unauthenticated("no_session", "login").http_status(), 401);
    assert_eq!(AppError::denied("subject_denied", "no").http_status(), 403);
    assert_eq!(AppError::not_found("class_not_found", "missing").http_status(), 404);
    assert_eq!(AppError::unavailable("backend_unavailable", "down").http_status(), 503);
    assert_eq!(AppError::user("bad_input", "oops").http_status(), 400);
    assert_eq!(AppError::conflict("conflict", "dup").http_status(), 409);
    assert_eq!(AppError::internal("internal", "panic").http_status(), 500);
}

#[test]
fn ui_consequence_mapping() {
    assert_eq!(AppError::unauthenticated("a", "b").ui_consequence(), UiConsequence::RedirectToLogin);
    assert_eq!(AppError::denied("a", "b").ui_consequence(), UiConsequence::BlockingModal);
    assert_eq!(AppError::not_found("a", "b").ui_consequence(), UiConsequence::EmptyState);
    assert_eq!(AppError::unavailable("a", "b").ui_consequence(), UiConsequence::RetryableError);
    assert_eq!(AppError::user("a", "b").ui_consequence(), UiConsequence::InlineMessage);
}

#[test]
fn backend_failures_never_escape_untyped() {
    let err: AppError = anyhow::anyhow!("socket closed").into();
    assert!(err.is_unavailable());
    assert_eq!(err.message(), "socket closed");

    let err: AppError = StoreError::Unavailable("listing timed out".into()).into();
    assert!(err.is_unavailable());

    let err: AppError = StoreError::NotFound("users/STU009".into()).into();
    assert!(err.is_not_found());
}

#[test]
fn serializes_with_kind_tag() {
    let v = serde_json::to_value(AppError::denied("subject_denied", "physics")).unwrap();
    assert_eq!(v["type"], "access_denied");
    assert_eq!(v["code"], "subject_denied");
    assert_eq!(format!("{}", AppError::denied("subject_denied", "physics")), "subject_denied: physics");
}
