use statusdeck_auth::AuthContext;

#[test]
fn test_auth_context_without_email() {
    let context = AuthContext::new("test_user_123");

    assert_eq!(context.user_id(), "test_user_123");
    assert!(context.email.is_none());
    assert_eq!(context.email_or_empty(), "");
}

#[test]
fn test_auth_context_with_email() {
    let context = AuthContext::new("test_user_123").with_email("test@example.com");

    assert_eq!(context.email.as_deref(), Some("test@example.com"));
    assert_eq!(context.email_or_empty(), "test@example.com");
}

#[test]
fn test_auth_context_serializes_camel_case() {
    let context = AuthContext::new("u1").with_email("a@b.test");
    let json = serde_json::to_value(&context).unwrap();

    assert_eq!(json["userId"], "u1");
    assert_eq!(json["email"], "a@b.test");
}
