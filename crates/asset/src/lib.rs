//! Asset loading and CPU-side particle generation.
//! Meshes come from OBJ or glTF files (or built-in shapes); their surfaces are
//! sampled into the particle instance records the renderer uploads.

pub mod gltf_read;
pub mod loader;
pub mod mesh;
pub mod obj;
pub mod particles;
pub mod sampler;
pub mod shapes;

pub use loader::{MeshPrep, ModelSource, ModelSpec, load_mesh, load_model_pair};
pub use mesh::{Aabb, MeshData, MeshVertex};
pub use particles::{MorphCloudParams, Particle, StarfieldParams, build_morph_cloud, build_starfield};
pub use sampler::SurfaceSampler;
pub use shapes::Shape;
