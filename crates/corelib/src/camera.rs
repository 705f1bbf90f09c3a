use crate::{Mat4, Vec3};

/// Vertical field of view used by the landing scene.
pub const DEFAULT_FOV_Y_DEG: f32 = 60.0;
pub const DEFAULT_Z_NEAR: f32 = 0.1;
pub const DEFAULT_Z_FAR: f32 = 2000.0;
pub const DEFAULT_EYE: Vec3 = Vec3::new(0.0, 0.0, 5.0);

/// Perspective frustum parameters, kept apart from placement so a resize
/// only touches the lens.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lens {
    pub fov_y_rad: f32,
    pub aspect: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Lens {
    pub fn from_degrees(fov_y_deg: f32, aspect: f32) -> Self {
        Self {
            fov_y_rad: fov_y_deg.to_radians(),
            aspect,
            z_near: DEFAULT_Z_NEAR,
            z_far: DEFAULT_Z_FAR,
        }
    }

    /// Projection with depth in [0, 1], matching wgpu clip space.
    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y_rad, self.aspect.max(1e-6), self.z_near, self.z_far)
    }
}

/// Right-handed look-at camera with a fixed +Y up axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub lens: Lens,
}

impl Camera {
    pub fn new_perspective(eye: Vec3, target: Vec3, lens: Lens) -> Self {
        Self { eye, target, lens }
    }

    /// Camera five units in front of the origin, looking at it.
    pub fn landing_default(aspect: f32) -> Self {
        Self::new_perspective(
            DEFAULT_EYE,
            Vec3::ZERO,
            Lens::from_degrees(DEFAULT_FOV_Y_DEG, aspect),
        )
    }

    #[inline]
    pub fn aspect(&self) -> f32 {
        self.lens.aspect
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.lens.aspect = aspect;
    }

    #[inline]
    pub fn with_aspect(mut self, aspect: f32) -> Self {
        self.set_aspect(aspect);
        self
    }

    /// Distance from eye to target.
    pub fn distance(&self) -> f32 {
        self.eye.distance(self.target)
    }

    #[inline]
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, Vec3::Y)
    }

    #[inline]
    pub fn proj(&self) -> Mat4 {
        self.lens.matrix()
    }

    pub fn proj_view(&self) -> Mat4 {
        self.proj() * self.view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_projects_to_screen_center() {
        let cam = Camera::landing_default(1.5);
        let clip = cam.proj_view() * cam.target.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn with_aspect_only_touches_the_lens() {
        let cam = Camera::landing_default(1.0);
        let wide = cam.with_aspect(2.0);
        assert_eq!(wide.aspect(), 2.0);
        assert_eq!(wide.eye, cam.eye);
        assert_eq!(wide.lens.fov_y_rad, cam.lens.fov_y_rad);
    }

    #[test]
    fn landing_default_sits_five_units_out() {
        let cam = Camera::landing_default(1.0);
        assert!((cam.distance() - 5.0).abs() < 1e-6);
        assert!((cam.lens.fov_y_rad - 60f32.to_radians()).abs() < 1e-6);
    }
}
