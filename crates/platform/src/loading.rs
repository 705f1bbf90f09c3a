//! Background scene construction. Model loading and surface sampling run on a
//! worker thread; the result is delivered to the event loop as a user event.

use std::thread::JoinHandle;
use std::time::Instant;

use anyhow::{Context, Result};
use asset::{
    MeshPrep, ModelSource, ModelSpec, MorphCloudParams, Particle, Shape, StarfieldParams,
    build_morph_cloud, build_starfield, load_model_pair,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use winit::event_loop::EventLoopProxy;

/// Everything needed to build the particle layers.
#[derive(Clone, Debug)]
pub struct SceneRequest {
    pub first: ModelSpec,
    pub second: ModelSpec,
    pub cloud: MorphCloudParams,
    pub stars: StarfieldParams,
    /// Fixed RNG seed; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for SceneRequest {
    fn default() -> Self {
        Self {
            first: ModelSpec {
                source: ModelSource::Builtin(Shape::Sphere),
                prepare: MeshPrep::first_model(),
            },
            second: ModelSpec {
                source: ModelSource::Builtin(Shape::Torus),
                prepare: MeshPrep::second_model(),
            },
            cloud: MorphCloudParams::default(),
            stars: StarfieldParams::default(),
            seed: None,
        }
    }
}

pub struct LoadedScene {
    pub starfield: Vec<Particle>,
    /// Missing when either model failed to load or sample.
    pub morph_cloud: Result<Vec<Particle>>,
}

pub enum AppEvent {
    SceneLoaded(Box<LoadedScene>),
}

pub fn build_scene(request: &SceneRequest) -> LoadedScene {
    let started = Instant::now();
    let mut rng = match request.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let morph_cloud = load_model_pair(&request.first, &request.second).and_then(|(a, b)| {
        build_morph_cloud(&a, &b, &request.cloud, &mut rng).context("Failed to sample model surfaces")
    });
    let starfield = build_starfield(&request.stars, &mut rng);

    log::info!(
        "Scene built in {:.1?}: {} cloud particles, {} stars",
        started.elapsed(),
        morph_cloud.as_ref().map_or(0, Vec::len),
        starfield.len()
    );
    LoadedScene {
        starfield,
        morph_cloud,
    }
}

/// Build the scene on a worker thread and post it to the event loop.
pub fn spawn_loader(request: SceneRequest, proxy: EventLoopProxy<AppEvent>) -> Result<JoinHandle<()>> {
    std::thread::Builder::new()
        .name("scene-loader".into())
        .spawn(move || {
            let scene = build_scene(&request);
            if proxy
                .send_event(AppEvent::SceneLoaded(Box::new(scene)))
                .is_err()
            {
                log::debug!("Event loop closed before the scene finished loading");
            }
        })
        .context("Failed to spawn scene loader thread")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn small_request() -> SceneRequest {
        let mut req = SceneRequest {
            seed: Some(21),
            ..Default::default()
        };
        req.cloud.count = 128;
        req.stars.count = 32;
        req
    }

    #[test]
    fn builtin_scene_builds_both_layers() {
        let scene = build_scene(&small_request());
        assert_eq!(scene.starfield.len(), 32);
        assert_eq!(scene.morph_cloud.unwrap().len(), 128);
    }

    #[test]
    fn seeded_scenes_are_reproducible() {
        let a = build_scene(&small_request());
        let b = build_scene(&small_request());
        assert_eq!(a.starfield, b.starfield);
        assert_eq!(a.morph_cloud.unwrap(), b.morph_cloud.unwrap());
    }

    #[test]
    fn failed_model_keeps_starfield() {
        let mut req = small_request();
        req.second.source = ModelSource::File(PathBuf::from("missing/rabbit.glb"));
        let scene = build_scene(&req);
        assert_eq!(scene.starfield.len(), 32);
        let err = scene.morph_cloud.unwrap_err();
        assert!(format!("{err:#}").contains("missing/rabbit.glb"));
    }
}
