/*

    Declare numeric types used throughout this repo.

    Everything is f64, scene matrices coming from a host
    are usually double precision and reparenting multiplies
    by inverses, so f32 drift becomes visible quickly.

    @date: 2 Oct, 2025
    @author: Bartu
*/

use bevy_math::{DMat4, DQuat, DVec3, DVec4};
pub type Float = f64;
pub type Vector3 = DVec3;
pub type Vector4 = DVec4;
pub type Matrix4 = DMat4;
pub type Quaternion = DQuat;

/// Tolerance used when comparing transforms in tests and debug asserts.
pub const EPSILON: Float = 1e-9;

pub fn approx_zero(x: Float) -> bool {
    x.abs() < 1e-8
}

pub fn transform_point(mat: &Matrix4, v: &Vector3) -> Vector3 {
    let v4 = Vector4::new(v.x, v.y, v.z, 1.0);
    let r = *mat * v4;
    Vector3::new(r.x, r.y, r.z)
}

/// Translation part of an affine matrix.
pub fn translation_of(mat: &Matrix4) -> Vector3 {
    mat.w_axis.truncate()
}

/// Compose T * R * S from location, XYZ euler angles in degrees, and scale.
/// Rotations are applied about the fixed X, then Y, then Z axis.
pub fn compose_trs(location: Vector3, rotation_deg: Vector3, scale: Vector3) -> Matrix4 {
    let rotation = Quaternion::from_rotation_z(rotation_deg.z.to_radians())
        * Quaternion::from_rotation_y(rotation_deg.y.to_radians())
        * Quaternion::from_rotation_x(rotation_deg.x.to_radians());
    Matrix4::from_scale_rotation_translation(scale, rotation, location)
}

/// Inverse that refuses (near) singular matrices instead of returning NaNs.
pub fn try_inverse(mat: &Matrix4) -> Option<Matrix4> {
    if approx_zero(mat.determinant()) {
        return None;
    }
    Some(mat.inverse())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trs_maps_origin_to_location() {
        let m = compose_trs(
            Vector3::new(1., 2., 3.),
            Vector3::new(0., 0., 90.),
            Vector3::splat(2.),
        );
        assert!(translation_of(&m).abs_diff_eq(Vector3::new(1., 2., 3.), EPSILON));

        // +X scaled by 2 then rotated 90 degrees about Z lands on +Y
        let p = transform_point(&m, &Vector3::X);
        assert!(p.abs_diff_eq(Vector3::new(1., 4., 3.), EPSILON));
    }

    #[test]
    fn zero_scale_has_no_inverse() {
        let m = compose_trs(Vector3::ZERO, Vector3::ZERO, Vector3::new(1., 0., 1.));
        assert!(try_inverse(&m).is_none());
        assert!(try_inverse(&Matrix4::IDENTITY).is_some());
    }
}
