use flow_marks::{
    Context,
    cgmath::{Quaternion, Vector3},
    data_structures::{color::Color, template::TemplateKind},
    marks::{MarkOptions, RenderMode},
};

use crate::common::test_utils::{Overlay, object};

mod common;

fn flat_overlay() -> Overlay {
    let ctx = Context {
        render_mode: RenderMode::FlatMarker,
        scene_scale: 100.0,
        scene_y_max: 600.0,
        ..Default::default()
    };
    Overlay::new(MarkOptions::from(&ctx))
}

#[test]
fn should_convert_meters_to_pixels() {
    let mut overlay = flat_overlay();

    overlay.apply(&[object("1", "person", &[1.5, 2.0])]);

    assert_eq!(overlay.position("1"), Vector3::new(150.0, 400.0, 0.0));
}

#[test]
fn should_size_discs_per_category() {
    let mut overlay = flat_overlay();

    overlay.apply(&[
        object("p", "person", &[0.0, 0.0]),
        object("v", "vehicle", &[0.0, 0.0]),
        object("t", "apriltag", &[0.0, 0.0]),
        object("x", "forklift", &[0.0, 0.0]),
    ]);

    let radius = |id: &str| match overlay.node(id).template.kind {
        TemplateKind::Disc { radius, .. } => radius,
        ref other => panic!("expected a disc, got {other:?}"),
    };
    assert_eq!(radius("p"), 30.0);
    assert_eq!(radius("v"), 150.0);
    assert_eq!(radius("t"), 15.0);
    assert_eq!(radius("x"), 50.0);
}

#[test]
fn should_color_discs_by_id() {
    let mut overlay = flat_overlay();

    overlay.apply(&[object("ff0000-42", "person", &[0.0, 0.0])]);

    assert_eq!(overlay.node("ff0000-42").template.color(), Some(Color::rgb(0xff, 0, 0)));
}

#[test]
fn should_keep_flat_markers_unscaled_and_unlifted() {
    let mut overlay = flat_overlay();

    overlay.apply(&[
        object("1", "vehicle", &[1.0, 1.0, 0.0]).with_size([4.5, 2.0, 1.5]),
        object("2", "person", &[2.0, 1.0, 0.0]).with_asset_scale(2.0),
    ]);

    assert_eq!(overlay.position("1"), Vector3::new(100.0, 500.0, 0.0));
    assert_eq!(overlay.scale("1"), Vector3::new(1.0, 1.0, 1.0));
    assert_eq!(overlay.scale("2"), Vector3::new(1.0, 1.0, 1.0));
    // the disc keeps its pixel radius, not the object's extent
    assert!(matches!(
        overlay.node("1").template.kind,
        TemplateKind::Disc { radius, .. } if radius == 150.0
    ));
}

#[test]
fn should_ignore_rotation_of_flat_markers() {
    let mut overlay = flat_overlay();
    let half = std::f32::consts::FRAC_1_SQRT_2;

    overlay.apply(&[object("1", "vehicle", &[1.0, 1.0, 0.0]).with_rotation([0.0, 0.0, half, half])]);

    assert_eq!(overlay.node("1").local.rotation, Quaternion::new(1.0, 0.0, 0.0, 0.0));
}
