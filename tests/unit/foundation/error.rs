use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        StoryError::configuration("x")
            .to_string()
            .contains("configuration error:")
    );
    assert!(
        StoryError::scheduling("x")
            .to_string()
            .contains("scheduling error:")
    );
    assert!(
        StoryError::evaluation("x")
            .to_string()
            .contains("evaluation error:")
    );
    assert!(
        StoryError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn dependency_error_carries_status_and_body() {
    let err = StoryError::dependency("speech", Some(503), "upstream overloaded");
    let s = err.to_string();
    assert!(s.contains("speech"));
    assert!(s.contains("[503]"));
    assert!(s.contains("upstream overloaded"));

    let transport = StoryError::dependency("script", None, "connection refused");
    assert!(!transport.to_string().contains('['));
}

#[test]
fn diagnostics_carry_kind_and_scene() {
    let d = Diagnostic::scheduling(Some(2), "cue collides");
    assert_eq!((d.kind, d.scene), (DiagnosticKind::Scheduling, Some(2)));
    let d = Diagnostic::configuration(None, "unknown speaker");
    assert_eq!((d.kind, d.scene), (DiagnosticKind::Configuration, None));
    assert_eq!(d.message, "unknown speaker");
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = StoryError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
