//! Damped orbit controller: drag to rotate around a target, dolly to zoom.
//! Input accumulates into pending deltas; every `update` consumes a fraction
//! of them so motion eases out over several frames.

use std::f32::consts::PI;

use crate::Vec3;
use crate::camera::Camera;

const EPS: f32 = 1e-6;

/// Spherical coordinates around the orbit target (Y up).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spherical {
    pub radius: f32,
    /// Polar angle from +Y.
    pub phi: f32,
    /// Azimuth around +Y, measured from +Z.
    pub theta: f32,
}

impl Spherical {
    pub fn from_offset(v: Vec3) -> Self {
        let radius = v.length();
        if radius < EPS {
            return Self {
                radius: 0.0,
                phi: 0.0,
                theta: 0.0,
            };
        }
        Self {
            radius,
            phi: (v.y / radius).clamp(-1.0, 1.0).acos(),
            theta: v.x.atan2(v.z),
        }
    }

    pub fn to_offset(self) -> Vec3 {
        let sin_phi = self.phi.sin();
        Vec3::new(
            self.radius * sin_phi * self.theta.sin(),
            self.radius * self.phi.cos(),
            self.radius * sin_phi * self.theta.cos(),
        )
    }
}

#[derive(Clone, Debug)]
pub struct OrbitController {
    pub target: Vec3,
    pub damping_factor: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    spherical: Spherical,
    delta_theta: f32,
    delta_phi: f32,
    pending_scale: f32,
}

impl OrbitController {
    pub fn new(camera: &Camera) -> Self {
        Self {
            target: camera.target,
            damping_factor: 0.05,
            min_distance: 0.5,
            max_distance: 50.0,
            spherical: Spherical::from_offset(camera.eye - camera.target),
            delta_theta: 0.0,
            delta_phi: 0.0,
            pending_scale: 1.0,
        }
    }

    pub fn spherical(&self) -> Spherical {
        self.spherical
    }

    /// Queue a rotation from a pointer drag in physical pixels. Dragging
    /// across the full viewport height turns the camera once around.
    pub fn rotate(&mut self, dx_px: f32, dy_px: f32, viewport_height: f32) {
        let h = viewport_height.max(1.0);
        self.delta_theta -= 2.0 * PI * dx_px / h;
        self.delta_phi -= 2.0 * PI * dy_px / h;
    }

    /// Queue a zoom. `factor < 1` moves the camera closer.
    pub fn dolly(&mut self, factor: f32) {
        if factor.is_finite() && factor > 0.0 {
            self.pending_scale *= factor;
        }
    }

    /// Apply damped motion to `camera`. Returns `true` if the eye moved.
    pub fn update(&mut self, camera: &mut Camera) -> bool {
        let before = camera.eye;
        let k = self.damping_factor.clamp(0.0, 1.0);

        self.spherical.theta += self.delta_theta * k;
        self.spherical.phi += self.delta_phi * k;
        self.spherical.phi = self.spherical.phi.clamp(EPS, PI - EPS);
        self.spherical.radius = (self.spherical.radius * self.pending_scale)
            .clamp(self.min_distance, self.max_distance);

        self.delta_theta *= 1.0 - k;
        self.delta_phi *= 1.0 - k;
        self.pending_scale = 1.0;

        camera.target = self.target;
        camera.eye = self.target + self.spherical.to_offset();

        (camera.eye - before).length() > EPS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spherical_round_trips_default_eye() {
        let v = Vec3::new(0.0, 0.0, 5.0);
        let s = Spherical::from_offset(v);
        assert!((s.radius - 5.0).abs() < 1e-6);
        assert!((s.phi - PI / 2.0).abs() < 1e-6);
        assert!((s.to_offset() - v).length() < 1e-5);
    }

    #[test]
    fn idle_update_does_not_move() {
        let mut cam = Camera::landing_default(1.0);
        let mut orbit = OrbitController::new(&cam);
        assert!(!orbit.update(&mut cam));
        assert!((cam.eye - Vec3::new(0.0, 0.0, 5.0)).length() < 1e-5);
    }

    #[test]
    fn rotation_is_spread_over_frames() {
        let mut cam = Camera::landing_default(1.0);
        let mut orbit = OrbitController::new(&cam);
        orbit.rotate(100.0, 0.0, 1000.0);

        assert!(orbit.update(&mut cam));
        let after_one = orbit.spherical().theta;
        for _ in 0..400 {
            orbit.update(&mut cam);
        }
        let settled = orbit.spherical().theta;

        let total = -2.0 * PI * 0.1;
        assert!(after_one.abs() < total.abs() * 0.1);
        assert!((settled - total).abs() < 1e-3, "settled at {settled}");
        assert!(!orbit.update(&mut cam));
    }

    #[test]
    fn sub_millimetre_motion_still_counts_as_moved() {
        let mut cam = Camera::landing_default(1.0);
        let mut orbit = OrbitController::new(&cam);
        // About 1e-4 units of eye travel on the first damped step.
        orbit.rotate(0.064, 0.0, 1000.0);
        let before = cam.eye;
        assert!(orbit.update(&mut cam));
        let moved = (cam.eye - before).length();
        assert!(moved > 1e-5 && moved < 1e-3, "moved {moved}");
    }

    #[test]
    fn dolly_respects_distance_limits() {
        let mut cam = Camera::landing_default(1.0);
        let mut orbit = OrbitController::new(&cam);
        orbit.dolly(0.001);
        orbit.update(&mut cam);
        assert!((orbit.spherical().radius - orbit.min_distance).abs() < 1e-6);
        assert!(((cam.eye - cam.target).length() - orbit.min_distance).abs() < 1e-4);
    }

    #[test]
    fn polar_angle_never_flips() {
        let mut cam = Camera::landing_default(1.0);
        let mut orbit = OrbitController::new(&cam);
        orbit.damping_factor = 1.0;
        orbit.rotate(0.0, 10_000.0, 100.0);
        orbit.update(&mut cam);
        let phi = orbit.spherical().phi;
        assert!(phi > 0.0 && phi < PI);
    }
}
