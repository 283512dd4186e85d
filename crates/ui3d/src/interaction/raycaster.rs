//! Pointer raycasting against a flat, square panel.

use glam::Vec3;
use wristpanel_core::Uv;
use wristpanel_math::RigidTransform;

/// Device-local point the pointing ray passes through: 45° below forward.
pub const DEFAULT_AIM_OFFSET: Vec3 = Vec3::new(0.0, -0.707, -0.707);

/// Rays closer than this to the panel plane count as parallel.
pub const PARALLEL_EPSILON: f32 = 0.0001;

/// Slack on the bounds test so hits exactly on an edge survive rounding.
const BOUNDS_EPSILON: f32 = 1e-5;

/// World-space ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Start point.
    pub origin: Vec3,
    /// Unit direction.
    pub direction: Vec3,
}

/// Result of a panel raycast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelHit {
    /// Normalized panel coordinate, `v` measured from the top edge.
    pub uv: Uv,
    /// Distance from the ray origin along the ray.
    pub distance: f32,
    /// World-space hit point.
    pub position: Vec3,
}

/// Ray cast from a hand pose through `aim_offset` (expressed in the hand's
/// local frame). Returns `None` when the offset maps onto the hand origin.
pub fn pointer_ray(hand_world: &RigidTransform, aim_offset: Vec3) -> Option<Ray> {
    let origin = hand_world.translation();
    let aim = hand_world.transform_point(aim_offset);
    let direction = (aim - origin).try_normalize()?;
    Some(Ray { origin, direction })
}

/// World transform of a panel placed at `local` relative to its anchor.
pub fn panel_world_transform(anchor_world: &RigidTransform, local: &RigidTransform) -> RigidTransform {
    anchor_world.multiply(local)
}

/// Intersect `ray` with a square panel of side `width` lying in the local
/// XY plane of `panel_world`, centered on its origin and facing local +Z.
///
/// Edges and corners count as hits. Panels behind the ray origin and rays
/// parallel to the panel never hit.
pub fn raycast_panel(ray: &Ray, panel_world: &RigidTransform, width: f32) -> Option<PanelHit> {
    if width.is_nan() || width <= 0.0 {
        return None;
    }

    let center = panel_world.transform_point(Vec3::ZERO);
    let normal = (panel_world.transform_point(Vec3::Z) - center).try_normalize()?;

    let denom = normal.dot(ray.direction);
    if denom.abs() < PARALLEL_EPSILON {
        return None;
    }

    let t = (center - ray.origin).dot(normal) / denom;
    if t < 0.0 {
        return None;
    }

    let position = ray.origin + ray.direction * t;
    let local = panel_world.inverse().transform_point(position);
    let half = width * 0.5;
    let limit = half + BOUNDS_EPSILON;
    if local.x.abs() > limit || local.y.abs() > limit {
        return None;
    }

    let u = ((local.x + half) / width).clamp(0.0, 1.0);
    let v = (1.0 - (local.y + half) / width).clamp(0.0, 1.0);
    Some(PanelHit {
        uv: Uv::new(u, v),
        distance: t,
        position,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ray(origin: Vec3, direction: Vec3) -> Ray {
        Ray {
            origin,
            direction: direction.normalize(),
        }
    }

    #[test]
    fn centered_aim_hits_panel_center() {
        let anchor = RigidTransform::from_translation(Vec3::new(0.0, 0.85, -0.15));
        let local = RigidTransform::from_translation(Vec3::new(0.0, 0.25, -0.35));
        let panel = panel_world_transform(&anchor, &local);
        let hand = RigidTransform::from_translation(Vec3::new(0.0, 1.6, 0.0));

        let ray = pointer_ray(&hand, DEFAULT_AIM_OFFSET).unwrap();
        let hit = raycast_panel(&ray, &panel, 0.4).unwrap();

        assert!(hit.distance > 0.0);
        assert!((hit.uv.u - 0.5).abs() < 1e-3, "u = {}", hit.uv.u);
        assert!((hit.uv.v - 0.5).abs() < 1e-3, "v = {}", hit.uv.v);
        assert!(hit.position.abs_diff_eq(Vec3::new(0.0, 1.1, -0.5), 1e-3));
    }

    #[test]
    fn corner_counts_as_hit() {
        let hit = raycast_panel(
            &ray(Vec3::new(0.25, 0.25, 1.0), Vec3::NEG_Z),
            &RigidTransform::IDENTITY,
            0.5,
        )
        .unwrap();
        assert!((hit.uv.u - 1.0).abs() < 1e-5);
        assert!(hit.uv.v.abs() < 1e-5);

        let hit = raycast_panel(
            &ray(Vec3::new(-0.25, -0.25, 1.0), Vec3::NEG_Z),
            &RigidTransform::IDENTITY,
            0.5,
        )
        .unwrap();
        assert!(hit.uv.u.abs() < 1e-5);
        assert!((hit.uv.v - 1.0).abs() < 1e-5);
    }

    #[test]
    fn just_outside_misses() {
        assert!(raycast_panel(
            &ray(Vec3::new(0.26, 0.0, 1.0), Vec3::NEG_Z),
            &RigidTransform::IDENTITY,
            0.5,
        )
        .is_none());
    }

    #[test]
    fn panel_behind_origin_misses() {
        // In-bounds (dx, dy) but the plane is behind the ray.
        assert!(raycast_panel(
            &ray(Vec3::new(0.0, 0.0, 1.0), Vec3::Z),
            &RigidTransform::IDENTITY,
            0.5,
        )
        .is_none());
    }

    #[test]
    fn parallel_ray_misses() {
        assert!(raycast_panel(
            &ray(Vec3::new(-1.0, 0.0, 0.0), Vec3::X),
            &RigidTransform::IDENTITY,
            0.5,
        )
        .is_none());
    }

    #[test]
    fn hits_from_behind_the_panel() {
        let hit = raycast_panel(
            &ray(Vec3::new(0.0, 0.0, -1.0), Vec3::Z),
            &RigidTransform::IDENTITY,
            0.5,
        )
        .unwrap();
        assert!((hit.distance - 1.0).abs() < 1e-5);
    }

    #[test]
    fn v_grows_downward() {
        let top = raycast_panel(
            &ray(Vec3::new(0.0, 0.2, 1.0), Vec3::NEG_Z),
            &RigidTransform::IDENTITY,
            0.5,
        )
        .unwrap();
        assert!(top.uv.v < 0.15);
    }

    #[test]
    fn degenerate_aim_offset_has_no_ray() {
        assert!(pointer_ray(&RigidTransform::IDENTITY, Vec3::ZERO).is_none());
    }

    #[test]
    fn non_positive_width_never_hits() {
        let r = ray(Vec3::new(0.0, 0.0, 1.0), Vec3::NEG_Z);
        assert!(raycast_panel(&r, &RigidTransform::IDENTITY, 0.0).is_none());
        assert!(raycast_panel(&r, &RigidTransform::IDENTITY, f32::NAN).is_none());
    }
}
