use super::*;

#[test]
fn listener_source_serializes_as_snake_case() {
    let json = serde_json::to_string(&ListenerSource::RenderTransform).expect("serialize");
    assert_eq!(json, "\"render_transform\"");
    assert_eq!(ListenerSource::GraphChange.to_string(), "graph_change");
}

#[test]
fn translation_transform_keeps_identity_rotation() {
    let transform = ViewerTransform::translation(1.5, -2.0, 3.0);
    assert_eq!(transform.get(0, 0), 1.0);
    assert_eq!(transform.get(1, 1), 1.0);
    assert_eq!(transform.get(2, 2), 1.0);
    assert_eq!(transform.get(0, 3), 1.5);
    assert_eq!(transform.get(1, 3), -2.0);
    assert_eq!(transform.get(2, 3), 3.0);
    assert_eq!(ViewerTransform::default(), ViewerTransform::IDENTITY);
}

#[test]
fn registration_error_reports_its_registry() {
    let err = crate::error::RegistrationError::UnknownListener {
        registry: ListenerSource::Focus,
        id: ListenerId(7),
    };
    assert_eq!(err.registry(), ListenerSource::Focus);
    assert_eq!(
        err.to_string(),
        "listener 7 is not registered with the focus registry"
    );
}
