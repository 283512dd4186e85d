//! Property-based tests for panel raycasting
//!
//! - a ray aimed straight at a point on the panel reports that point's UV
//! - a panel behind the ray origin never reports a hit
//! - edges and corners of the panel count as hits

use glam::{EulerRot, Quat, Vec3};
use proptest::prelude::*;
use wristpanel_math::RigidTransform;
use wristpanel_ui3d::{raycast_panel, Ray};

fn panel_pose() -> impl Strategy<Value = RigidTransform> {
    (
        -3.1f32..3.1,
        -1.4f32..1.4,
        -3.1f32..3.1,
        -2.0f32..2.0,
        0.0f32..2.0,
        -2.0f32..2.0,
    )
        .prop_map(|(yaw, pitch, roll, x, y, z)| {
            RigidTransform::from_rotation_translation(
                Quat::from_euler(EulerRot::YXZ, yaw, pitch, roll),
                Vec3::new(x, y, z),
            )
        })
}

/// Ray starting `distance` in front of the local point `(dx, dy)` and aimed
/// back at it along the panel normal.
fn ray_at(panel: &RigidTransform, dx: f32, dy: f32, distance: f32) -> Ray {
    let target = panel.transform_point(Vec3::new(dx, dy, 0.0));
    let normal = panel.transform_vector(Vec3::Z);
    Ray {
        origin: target + normal * distance,
        direction: -normal,
    }
}

proptest! {
    #[test]
    fn aimed_ray_reports_target_uv(
        panel in panel_pose(),
        width in 0.1f32..2.0,
        fx in -0.49f32..0.49,
        fy in -0.49f32..0.49,
        distance in 0.05f32..3.0,
    ) {
        let (dx, dy) = (fx * width, fy * width);
        let hit = raycast_panel(&ray_at(&panel, dx, dy, distance), &panel, width);
        prop_assert!(hit.is_some());
        let hit = hit.unwrap();
        prop_assert!((hit.uv.u - (fx + 0.5)).abs() < 1e-3, "u {} vs {}", hit.uv.u, fx + 0.5);
        prop_assert!((hit.uv.v - (0.5 - fy)).abs() < 1e-3, "v {} vs {}", hit.uv.v, 0.5 - fy);
        prop_assert!((hit.distance - distance).abs() < 1e-3);
    }

    #[test]
    fn panel_behind_origin_never_hits(
        panel in panel_pose(),
        width in 0.1f32..2.0,
        fx in -0.5f32..0.5,
        fy in -0.5f32..0.5,
        distance in 0.05f32..3.0,
    ) {
        let toward = ray_at(&panel, fx * width, fy * width, distance);
        let away = Ray { origin: toward.origin, direction: -toward.direction };
        prop_assert!(raycast_panel(&away, &panel, width).is_none());
    }

    #[test]
    fn corners_are_inside(
        panel in panel_pose(),
        width in 0.1f32..2.0,
        sx in prop::bool::ANY,
        sy in prop::bool::ANY,
    ) {
        let half = width * 0.5;
        let dx = if sx { half } else { -half };
        let dy = if sy { half } else { -half };
        let hit = raycast_panel(&ray_at(&panel, dx, dy, 0.5), &panel, width);
        prop_assert!(hit.is_some(), "corner ({dx}, {dy}) missed");
        let uv = hit.unwrap().uv;
        prop_assert!(uv.u.abs() < 1e-4 || (uv.u - 1.0).abs() < 1e-4);
        prop_assert!(uv.v.abs() < 1e-4 || (uv.v - 1.0).abs() < 1e-4);
    }
}
