//! Particle instance records for the morphing cloud and the background
//! starfield.

use anyhow::Result;
use bytemuck::{Pod, Zeroable};
use corelib::color::Palette;
use rand::Rng;

use crate::mesh::MeshData;
use crate::sampler::SurfaceSampler;

/// One particle as uploaded to the GPU (one instance per particle).
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Particle {
    /// Position at progress 0.
    pub position: [f32; 3],
    /// Position at progress 1.
    pub position2: [f32; 3],
    pub color: [f32; 3],
    /// Per-particle random phase in [0, 1).
    pub offset: f32,
}

#[derive(Clone, Debug)]
pub struct MorphCloudParams {
    pub count: usize,
    pub palette: Palette,
}

impl Default for MorphCloudParams {
    fn default() -> Self {
        Self {
            count: 10_000,
            palette: Palette::purples(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct StarfieldParams {
    pub count: usize,
    pub palette: Palette,
}

impl Default for StarfieldParams {
    fn default() -> Self {
        Self {
            count: 500,
            palette: Palette::purples(),
        }
    }
}

/// Sample `params.count` particles pairing a point on `from` with a point on
/// `to`.
pub fn build_morph_cloud<R: Rng + ?Sized>(
    from: &MeshData,
    to: &MeshData,
    params: &MorphCloudParams,
    rng: &mut R,
) -> Result<Vec<Particle>> {
    let from = SurfaceSampler::new(from)?;
    let to = SurfaceSampler::new(to)?;

    let particles = (0..params.count)
        .map(|_| {
            let position = from.sample(rng).to_array();
            let position2 = to.sample(rng).to_array();
            let color = params.palette.pick(rng).to_array();
            Particle {
                position,
                position2,
                color,
                offset: rng.random::<f32>(),
            }
        })
        .collect();
    Ok(particles)
}

/// Static particles scattered in a box around and in front of the cloud.
pub fn build_starfield<R: Rng + ?Sized>(params: &StarfieldParams, rng: &mut R) -> Vec<Particle> {
    (0..params.count)
        .map(|_| {
            let position = [
                (rng.random::<f32>() - 0.2) * 8.0 - 2.0,
                (rng.random::<f32>() - 0.2) * 5.0 - 1.5,
                (rng.random::<f32>() - 0.2) * 2.0 + 1.0,
            ];
            Particle {
                position,
                position2: position,
                color: params.palette.pick(rng).to_array(),
                offset: rng.random::<f32>(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::Shape;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn particle_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<Particle>(), 40);
    }

    #[test]
    fn morph_cloud_pairs_points_from_both_meshes() {
        let sphere = Shape::Sphere.build();
        let cube = Shape::Cube.build();
        let params = MorphCloudParams {
            count: 2_000,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(9);
        let cloud = build_morph_cloud(&sphere, &cube, &params, &mut rng).unwrap();

        assert_eq!(cloud.len(), 2_000);
        for p in &cloud {
            let r = glam::Vec3::from_array(p.position).length();
            assert!(r <= 0.6 + 1e-4, "start point off the sphere: {r}");
            let q = glam::Vec3::from_array(p.position2);
            assert!((q.abs().max_element() - 0.5).abs() < 1e-4, "end point off the cube");
            assert!((0.0..1.0).contains(&p.offset));
            assert!(params.palette.colors().iter().any(|c| c.to_array() == p.color));
        }
    }

    #[test]
    fn morph_cloud_is_deterministic_for_a_seed() {
        let sphere = Shape::Sphere.build();
        let torus = Shape::Torus.build();
        let params = MorphCloudParams {
            count: 64,
            ..Default::default()
        };
        let a = build_morph_cloud(&sphere, &torus, &params, &mut StdRng::seed_from_u64(5)).unwrap();
        let b = build_morph_cloud(&sphere, &torus, &params, &mut StdRng::seed_from_u64(5)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn empty_mesh_fails_cloud_build() {
        let params = MorphCloudParams::default();
        let err = build_morph_cloud(
            &MeshData::default(),
            &Shape::Cube.build(),
            &params,
            &mut StdRng::seed_from_u64(0),
        );
        assert!(err.is_err());
    }

    #[test]
    fn starfield_stays_in_its_box_and_never_morphs() {
        let params = StarfieldParams::default();
        let stars = build_starfield(&params, &mut StdRng::seed_from_u64(11));
        assert_eq!(stars.len(), 500);
        for s in &stars {
            assert_eq!(s.position, s.position2);
            let [x, y, z] = s.position;
            assert!((-3.6..=4.4).contains(&x), "x={x}");
            assert!((-2.5..=2.5).contains(&y), "y={y}");
            assert!((0.6..=2.6).contains(&z), "z={z}");
        }
    }
}
