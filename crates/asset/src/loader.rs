//! Model sources, per-model preparation, and paired loading.

use std::f32::consts::FRAC_PI_2;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};

use crate::gltf_read::load_gltf_from_path;
use crate::mesh::MeshData;
use crate::obj::load_obj_from_path;
use crate::shapes::Shape;

/// Load a mesh file, picking the parser from the extension.
pub fn load_mesh(path: impl AsRef<Path>) -> Result<MeshData> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("obj") => load_obj_from_path(path),
        Some("gltf") | Some("glb") => load_gltf_from_path(path),
        _ => bail!(
            "Unsupported model format: {} (expected .obj, .gltf or .glb)",
            path.display()
        ),
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ModelSource {
    File(PathBuf),
    Builtin(Shape),
}

impl fmt::Display for ModelSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelSource::File(p) => write!(f, "{}", p.display()),
            ModelSource::Builtin(s) => write!(f, "builtin:{s:?}"),
        }
    }
}

/// Geometry adjustments baked into a model after loading: scale, then
/// rotation about Y, then optional recentering.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeshPrep {
    pub scale: f32,
    pub rotate_y: f32,
    pub center: bool,
}

impl Default for MeshPrep {
    fn default() -> Self {
        Self {
            scale: 1.0,
            rotate_y: 0.0,
            center: false,
        }
    }
}

impl MeshPrep {
    /// Preparation for the first (start) model.
    pub fn first_model() -> Self {
        Self {
            scale: 2.0,
            ..Self::default()
        }
    }

    /// Preparation for the second (end) model.
    pub fn second_model() -> Self {
        Self {
            scale: 1.75,
            rotate_y: FRAC_PI_2,
            center: true,
        }
    }

    pub fn apply(&self, mesh: &mut MeshData) {
        if self.scale != 1.0 {
            mesh.scale(self.scale);
        }
        if self.rotate_y != 0.0 {
            mesh.rotate_y(self.rotate_y);
        }
        if self.center {
            mesh.center();
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ModelSpec {
    pub source: ModelSource,
    pub prepare: MeshPrep,
}

impl ModelSpec {
    pub fn load(&self) -> Result<MeshData> {
        let started = Instant::now();
        let mut mesh = match &self.source {
            ModelSource::File(path) => load_mesh(path)?,
            ModelSource::Builtin(shape) => shape.build(),
        };
        self.prepare.apply(&mut mesh);
        log::info!(
            "Loaded model {} ({} triangles) in {:.1?}",
            self.source,
            mesh.triangle_count(),
            started.elapsed()
        );
        Ok(mesh)
    }
}

/// Load both models; the pair only succeeds if each one does.
pub fn load_model_pair(first: &ModelSpec, second: &ModelSpec) -> Result<(MeshData, MeshData)> {
    let a = first
        .load()
        .with_context(|| format!("Failed to load first model {}", first.source))?;
    let b = second
        .load()
        .with_context(|| format!("Failed to load second model {}", second.source))?;
    Ok((a, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_extension_is_rejected() {
        let err = load_mesh("model.fbx").unwrap_err();
        assert!(err.to_string().contains("Unsupported model format"));
    }

    #[test]
    fn obj_files_are_dispatched_by_extension() {
        let path = std::env::temp_dir().join(format!("morphfield-tri-{}.OBJ", std::process::id()));
        std::fs::write(&path, "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        let mesh = load_mesh(&path);
        std::fs::remove_file(&path).ok();
        assert_eq!(mesh.unwrap().triangle_count(), 1);
    }

    #[test]
    fn second_model_prep_centers_after_rotation() {
        let mut mesh = Shape::Cube.build();
        mesh.scale(0.5);
        mesh.transform(&corelib::transform::Transform::from_translation(
            glam::Vec3::new(3.0, 1.0, 0.0),
        ));
        MeshPrep::second_model().apply(&mut mesh);
        let bb = mesh.bounds().unwrap();
        assert!(bb.center().length() < 1e-5);
        assert!((bb.size().x - 0.875).abs() < 1e-4);
    }

    #[test]
    fn pair_fails_when_either_model_fails() {
        let good = ModelSpec {
            source: ModelSource::Builtin(Shape::Sphere),
            prepare: MeshPrep::first_model(),
        };
        let bad = ModelSpec {
            source: ModelSource::File(PathBuf::from("missing/rabbit.gltf")),
            prepare: MeshPrep::second_model(),
        };
        assert!(load_model_pair(&good, &bad).is_err());
        assert!(load_model_pair(&bad, &good).is_err());
        let (a, b) = load_model_pair(&good, &good).unwrap();
        assert_eq!(a, b);
    }
}
