use super::*;

#[test]
fn rebuild_replaces_content_and_forgets_partial_moves() {
    let mut scene = SceneMirror::default();
    assert!(scene.reposition(Some(SpotId(4))));
    assert!(scene.reposition(Some(SpotId(4))));
    assert_eq!(scene.repositioned, vec![SpotId(4)]);

    scene.rebuild(TimepointIndex(7), 3, Some(SpotId(2)));
    assert_eq!(scene.timepoint, Some(TimepointIndex(7)));
    assert_eq!(scene.spot_count, 3);
    assert_eq!(scene.focused, Some(SpotId(2)));
    assert_eq!(scene.rebuilds, 1);
    assert!(scene.repositioned.is_empty());
}

#[test]
fn camera_moves_do_not_touch_content() {
    let mut scene = SceneMirror::default();
    scene.move_camera(ViewerTransform::translation(1.0, 2.0, 3.0));

    assert_eq!(scene.camera.get(0, 3), 1.0);
    assert_eq!(scene.camera_moves, 1);
    assert_eq!(scene.rebuilds, 0);
    assert_eq!(scene.timepoint, None);
}

#[test]
fn anonymous_vertex_move_is_not_applied() {
    let mut scene = SceneMirror::default();
    assert!(!scene.reposition(None));
    assert!(scene.repositioned.is_empty());
}
