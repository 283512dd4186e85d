//! Property-based tests for rigid transforms
//!
//! Validates the algebraic laws the interaction engine relies on:
//! - inverse(A) · A is the identity
//! - composition is associative
//! - applying a transform and then its inverse returns the original point
//!
//! Inputs are generated from Euler angles + translations, so every sample is
//! a genuine rigid transform.

use glam::{EulerRot, Quat, Vec3};
use proptest::prelude::*;
use wristpanel_math::RigidTransform;

const EPS: f32 = 1e-4;

fn rigid() -> impl Strategy<Value = RigidTransform> {
    (
        -3.2f32..3.2,
        -1.5f32..1.5,
        -3.2f32..3.2,
        -5.0f32..5.0,
        -5.0f32..5.0,
        -5.0f32..5.0,
    )
        .prop_map(|(yaw, pitch, roll, x, y, z)| {
            RigidTransform::from_rotation_translation(
                Quat::from_euler(EulerRot::YXZ, yaw, pitch, roll),
                Vec3::new(x, y, z),
            )
        })
}

fn point() -> impl Strategy<Value = Vec3> {
    (-5.0f32..5.0, -5.0f32..5.0, -5.0f32..5.0).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

proptest! {
    /// Property: inverse(A) · A ≈ identity
    #[test]
    fn inverse_round_trip(a in rigid()) {
        let product = a.inverse().multiply(&a);
        prop_assert!(
            product.approx_eq(&RigidTransform::identity(), EPS),
            "inverse(A)·A = {:?}",
            product
        );
    }

    /// Property: (A · B) · C ≈ A · (B · C)
    #[test]
    fn composition_is_associative(a in rigid(), b in rigid(), c in rigid()) {
        let left = a.multiply(&b).multiply(&c);
        let right = a.multiply(&b.multiply(&c));
        prop_assert!(left.approx_eq(&right, 1e-3), "{:?} != {:?}", left, right);
    }

    /// Property: composition of rigid transforms stays rigid
    #[test]
    fn composition_stays_rigid(a in rigid(), b in rigid()) {
        prop_assert!(a.multiply(&b).is_rigid(1e-3));
        prop_assert!(a.inverse().is_rigid(1e-3));
    }

    /// Property: inverse(A) maps A(p) back onto p
    #[test]
    fn point_round_trip(a in rigid(), p in point()) {
        let back = a.inverse().transform_point(a.transform_point(p));
        prop_assert!(back.abs_diff_eq(p, 1e-3), "{:?} -> {:?}", p, back);
    }
}
