use crate::{Mat3, Mat4, Quat, Vec3};

/// Scale, then rotate, then translate. Used to bake model preparation steps
/// into vertex data.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    #[inline]
    pub const fn identity() -> Self {
        Self::IDENTITY
    }

    #[inline]
    pub fn from_trs(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    pub fn from_rotation_y(angle: f32) -> Self {
        Self {
            rotation: Quat::from_rotation_y(angle),
            ..Self::IDENTITY
        }
    }

    pub fn from_uniform_scale(s: f32) -> Self {
        Self {
            scale: Vec3::splat(s),
            ..Self::IDENTITY
        }
    }

    /// T * R * S.
    #[inline]
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// Inverse-transpose of the linear part, for carrying normals along.
    pub fn normal_matrix(&self) -> Mat3 {
        Mat3::from_mat4(self.matrix()).inverse().transpose()
    }

    #[inline]
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        self.translation + self.rotation * (self.scale * p)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotate_y_quarter_turn_maps_x_to_minus_z() {
        let t = Transform::from_rotation_y(std::f32::consts::FRAC_PI_2);
        let p = t.transform_point(Vec3::X);
        assert!((p - Vec3::NEG_Z).length() < 1e-6, "got {p:?}");
    }

    #[test]
    fn scale_applies_before_translation() {
        let t = Transform::from_trs(Vec3::X, Quat::IDENTITY, Vec3::splat(2.0));
        let p = t.transform_point(Vec3::new(1.0, 1.0, 0.0));
        assert!((p - Vec3::new(3.0, 2.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn point_helper_agrees_with_matrix() {
        let t = Transform::from_trs(
            Vec3::new(0.5, -1.0, 2.0),
            Quat::from_rotation_y(0.7),
            Vec3::new(1.0, 2.0, 3.0),
        );
        let p = Vec3::new(0.3, 0.2, -0.9);
        let via_matrix = t.matrix().transform_point3(p);
        assert!((t.transform_point(p) - via_matrix).length() < 1e-5);
    }

    #[test]
    fn uniform_scale_keeps_normals_unit_direction() {
        let n = Transform::from_uniform_scale(4.0).normal_matrix() * Vec3::Y;
        assert!((n.normalize() - Vec3::Y).length() < 1e-6);
    }
}
