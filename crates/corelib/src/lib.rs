//! Core types: math re-exports, Transform, Camera, orbit + scroll animation state.

pub use glam::{Mat3, Mat4, Quat, Vec3, vec3};

pub mod camera;
pub mod color;
pub mod easing;
pub mod error;
pub mod orbit;
pub mod scroll;
pub mod transform;

pub use error::{CoreError, CoreResult};
