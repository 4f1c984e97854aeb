use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        TrellisError::configuration("x")
            .to_string()
            .contains("configuration error:")
    );
    assert!(
        TrellisError::evaluation("x")
            .to_string()
            .contains("evaluation error:")
    );
    assert!(
        TrellisError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
    assert!(
        TrellisError::missing_binding("TextField", "value")
            .to_string()
            .contains("missing required binding 'value' on TextField")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = TrellisError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn located_keeps_innermost_position() {
    let err = TrellisError::evaluation("no key 'nme'")
        .located("Main/Child", "1.2", Some(TemplateLocation::new("Child.awl", 7)))
        .located("Main", "1", None);
    let s = err.to_string();
    assert!(s.contains("component Main/Child"), "{s}");
    assert!(s.contains("element 1.2"), "{s}");
    assert!(s.contains("Child.awl:7"), "{s}");
    assert!(!s.contains("component Main,"), "{s}");
}

#[test]
fn fatality_sees_through_annotations() {
    let overflow = TrellisError::ElementIdOverflow {
        path: "1".to_string(),
        max: u16::MAX,
    };
    assert!(overflow.is_fatal());
    let wrapped = overflow.in_binding("list").located("Main", "1", None);
    assert!(wrapped.is_fatal());
    assert!(matches!(
        wrapped.root_cause(),
        TrellisError::ElementIdOverflow { .. }
    ));

    let runtime = TrellisError::evaluation("boom").located("Main", "1", None);
    assert!(!runtime.is_fatal());
}
