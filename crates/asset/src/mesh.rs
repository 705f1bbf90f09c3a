//! CPU-side mesh representation used by loaders and the surface sampler.

use corelib::transform::Transform;
use glam::Vec3;

/// Vertex with position/normal/uv. Values are in object space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl MeshVertex {
    pub fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }

    pub fn at(position: Vec3) -> Self {
        Self {
            position: position.to_array(),
            normal: [0.0, 0.0, 1.0],
            uv: [0.0, 0.0],
        }
    }
}

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

/// Indexed triangle mesh with tightly-packed vertices.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn new(vertices: Vec<MeshVertex>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// Returns `true` if both vertex and index buffers are non-empty.
    pub fn is_valid(&self) -> bool {
        !self.vertices.is_empty() && !self.indices.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Corner positions of triangle `i`, or `None` if an index is out of range.
    pub fn triangle(&self, i: usize) -> Option<[Vec3; 3]> {
        let tri = self.indices.get(i * 3..i * 3 + 3)?;
        let p = |idx: u32| {
            self.vertices
                .get(idx as usize)
                .map(|v| Vec3::from_array(v.position))
        };
        Some([p(tri[0])?, p(tri[1])?, p(tri[2])?])
    }

    pub fn bounds(&self) -> Option<Aabb> {
        let mut it = self.vertices.iter().map(|v| Vec3::from_array(v.position));
        let first = it.next()?;
        let (min, max) = it.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));
        Some(Aabb { min, max })
    }

    pub fn scale(&mut self, s: f32) {
        self.transform(&Transform::from_uniform_scale(s));
    }

    pub fn rotate_y(&mut self, angle: f32) {
        self.transform(&Transform::from_rotation_y(angle));
    }

    /// Move the bounding-box center to the origin.
    pub fn center(&mut self) {
        if let Some(bb) = self.bounds() {
            let c = bb.center();
            self.transform(&Transform::from_translation(-c));
        }
    }

    /// Bake `t` into positions; normals follow the inverse-transpose.
    pub fn transform(&mut self, t: &Transform) {
        let normal_m = t.normal_matrix();
        for v in &mut self.vertices {
            v.position = t.transform_point(Vec3::from_array(v.position)).to_array();
            let n = (normal_m * Vec3::from_array(v.normal)).normalize_or_zero();
            v.normal = n.to_array();
        }
    }
}
