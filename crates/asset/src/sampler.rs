//! Area-weighted random sampling of points on a triangle mesh surface.

use anyhow::{Result, bail};
use glam::Vec3;
use rand::Rng;

use crate::mesh::MeshData;

pub struct SurfaceSampler {
    triangles: Vec<[Vec3; 3]>,
    /// Running sum of triangle areas; `cumulative[i]` covers triangles `0..=i`.
    cumulative: Vec<f32>,
}

impl SurfaceSampler {
    pub fn new(mesh: &MeshData) -> Result<Self> {
        let mut triangles = Vec::with_capacity(mesh.triangle_count());
        let mut cumulative = Vec::with_capacity(mesh.triangle_count());
        let mut total = 0.0f32;

        for i in 0..mesh.triangle_count() {
            let Some(tri) = mesh.triangle(i) else {
                bail!("Triangle {i} references a vertex out of range");
            };
            total += triangle_area(&tri);
            triangles.push(tri);
            cumulative.push(total);
        }

        if total <= 0.0 || !total.is_finite() {
            bail!("Mesh surface area is zero or not finite; nothing to sample");
        }
        Ok(Self {
            triangles,
            cumulative,
        })
    }

    pub fn total_area(&self) -> f32 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    /// Random point on the surface, uniformly distributed by area.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec3 {
        let target = rng.random::<f32>() * self.total_area();
        let [a, b, c] = self.triangles[self.pick(target)];

        let mut u = rng.random::<f32>();
        let mut v = rng.random::<f32>();
        if u + v > 1.0 {
            u = 1.0 - u;
            v = 1.0 - v;
        }
        a + (b - a) * u + (c - a) * v
    }

    /// Index of the first triangle whose running area exceeds `target`.
    fn pick(&self, target: f32) -> usize {
        let idx = self.cumulative.partition_point(|&acc| acc <= target);
        idx.min(self.triangles.len() - 1)
    }
}

fn triangle_area([a, b, c]: &[Vec3; 3]) -> f32 {
    (*b - *a).cross(*c - *a).length() * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::MeshVertex;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    /// Small triangle at x in [0, 1] and one with 3x the area at x in [10, 13].
    fn two_triangles() -> MeshData {
        let p = |x: f32, y: f32| MeshVertex::at(Vec3::new(x, y, 0.0));
        MeshData::new(
            vec![
                p(0.0, 0.0),
                p(1.0, 0.0),
                p(0.0, 1.0),
                p(10.0, 0.0),
                p(13.0, 0.0),
                p(10.0, 1.0),
            ],
            vec![0, 1, 2, 3, 4, 5],
        )
    }

    #[test]
    fn total_area_sums_triangles() {
        let sampler = SurfaceSampler::new(&two_triangles()).unwrap();
        assert!((sampler.total_area() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn samples_are_weighted_by_area() {
        let sampler = SurfaceSampler::new(&two_triangles()).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let n = 20_000;
        let big = (0..n).filter(|_| sampler.sample(&mut rng).x >= 10.0).count();
        let share = big as f32 / n as f32;
        assert!((share - 0.75).abs() < 0.02, "share of big triangle = {share}");
    }

    #[test]
    fn samples_stay_inside_triangle() {
        let mesh = MeshData::new(
            vec![
                MeshVertex::at(Vec3::ZERO),
                MeshVertex::at(Vec3::X),
                MeshVertex::at(Vec3::Y),
            ],
            vec![0, 1, 2],
        );
        let sampler = SurfaceSampler::new(&mesh).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..1000 {
            let p = sampler.sample(&mut rng);
            assert!(p.x >= 0.0 && p.y >= 0.0 && p.x + p.y <= 1.0 + 1e-6);
            assert_eq!(p.z, 0.0);
        }
    }

    #[test]
    fn degenerate_triangles_are_never_picked() {
        let mut mesh = two_triangles();
        // Collapse the small triangle to a line.
        mesh.vertices[2] = MeshVertex::at(Vec3::new(0.5, 0.0, 0.0));
        let sampler = SurfaceSampler::new(&mesh).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        assert!((0..500).all(|_| sampler.sample(&mut rng).x >= 10.0));
    }

    #[test]
    fn zero_area_mesh_is_rejected() {
        let mesh = MeshData::new(vec![MeshVertex::default(); 3], vec![0, 1, 2]);
        assert!(SurfaceSampler::new(&mesh).is_err());
        assert!(SurfaceSampler::new(&MeshData::default()).is_err());
    }

    #[test]
    fn bad_indices_are_rejected() {
        let mut mesh = two_triangles();
        mesh.indices[4] = 99;
        assert!(SurfaceSampler::new(&mesh).is_err());
    }
}
