//! Built-in meshes used when no model files are configured.

use std::f32::consts::TAU;
use std::str::FromStr;

use anyhow::{Result, bail};
use glam::Vec3;

use crate::mesh::{MeshData, MeshVertex};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shape {
    Sphere,
    Torus,
    Cube,
}

impl FromStr for Shape {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sphere" => Ok(Shape::Sphere),
            "torus" => Ok(Shape::Torus),
            "cube" => Ok(Shape::Cube),
            other => bail!("Unknown built-in shape '{other}' (expected sphere, torus or cube)"),
        }
    }
}

impl Shape {
    pub fn build(self) -> MeshData {
        match self {
            Shape::Sphere => uv_sphere(0.6, 32, 48),
            Shape::Torus => torus(0.55, 0.2, 48, 24),
            Shape::Cube => cube(0.5),
        }
    }
}

/// Grid of `rows + 1` x `cols + 1` vertices from a parametric surface, with
/// two triangles per cell.
fn parametric(rows: u32, cols: u32, f: impl Fn(f32, f32) -> (Vec3, Vec3)) -> MeshData {
    let mut vertices = Vec::with_capacity(((rows + 1) * (cols + 1)) as usize);
    for r in 0..=rows {
        for c in 0..=cols {
            let (u, v) = (c as f32 / cols as f32, r as f32 / rows as f32);
            let (p, n) = f(u, v);
            vertices.push(MeshVertex::new(p.to_array(), n.to_array(), [u, v]));
        }
    }

    let stride = cols + 1;
    let mut indices = Vec::with_capacity((rows * cols * 6) as usize);
    for r in 0..rows {
        for c in 0..cols {
            let a = r * stride + c;
            let b = a + stride;
            indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
        }
    }
    MeshData::new(vertices, indices)
}

fn uv_sphere(radius: f32, rings: u32, segments: u32) -> MeshData {
    parametric(rings, segments, |u, v| {
        let theta = u * TAU;
        let phi = v * std::f32::consts::PI;
        let n = Vec3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin());
        (n * radius, n)
    })
}

fn torus(major: f32, minor: f32, segments: u32, sides: u32) -> MeshData {
    parametric(sides, segments, |u, v| {
        let (theta, phi) = (u * TAU, v * TAU);
        let ring = Vec3::new(theta.cos(), 0.0, theta.sin());
        let n = ring * phi.cos() + Vec3::Y * phi.sin();
        (ring * major + n * minor, n)
    })
}

fn cube(half: f32) -> MeshData {
    let mut mesh = MeshData::default();
    let faces = [Vec3::X, Vec3::NEG_X, Vec3::Y, Vec3::NEG_Y, Vec3::Z, Vec3::NEG_Z];
    for n in faces {
        let (t, b) = n.any_orthonormal_pair();
        let base = mesh.vertices.len() as u32;
        for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            let p = (n + t * su + b * sv) * half;
            mesh.vertices.push(MeshVertex::new(
                p.to_array(),
                n.to_array(),
                [(su + 1.0) * 0.5, (sv + 1.0) * 0.5],
            ));
        }
        mesh.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_shape_is_a_valid_closed_size_mesh() {
        for shape in [Shape::Sphere, Shape::Torus, Shape::Cube] {
            let mesh = shape.build();
            assert!(mesh.is_valid(), "{shape:?}");
            assert!((0..mesh.triangle_count()).all(|i| mesh.triangle(i).is_some()));
            let bb = mesh.bounds().unwrap();
            assert!(bb.size().max_element() <= 1.6, "{shape:?} too large");
        }
    }

    #[test]
    fn sphere_vertices_lie_on_radius() {
        let mesh = Shape::Sphere.build();
        for v in &mesh.vertices {
            let r = Vec3::from_array(v.position).length();
            assert!((r - 0.6).abs() < 1e-4);
        }
    }

    #[test]
    fn parses_shape_names() {
        assert_eq!("Torus".parse::<Shape>().unwrap(), Shape::Torus);
        assert!("teapot".parse::<Shape>().is_err());
    }
}
