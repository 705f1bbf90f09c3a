//! glTF 2.0 mesh import (`.gltf` with external/embedded buffers, or `.glb`).

use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use gltf::mesh::Mode;

use crate::mesh::{MeshData, MeshVertex};

/// Load the mesh of the last mesh-bearing node found by a depth-first walk of
/// the default scene. Node transforms are ignored: vertices stay in the
/// mesh's own space.
pub fn load_gltf_from_path(path: impl AsRef<Path>) -> Result<MeshData> {
    let path = path.as_ref();
    let (document, buffers, _images) = gltf::import(path)
        .with_context(|| format!("Failed to import glTF: {}", path.display()))?;

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(|| anyhow!("glTF has no scenes: {}", path.display()))?;

    let mut picked = None;
    let mut stack: Vec<gltf::Node> = scene.nodes().collect();
    stack.reverse();
    while let Some(node) = stack.pop() {
        if let Some(mesh) = node.mesh() {
            picked = Some(mesh);
        }
        let mut children: Vec<_> = node.children().collect();
        children.reverse();
        stack.extend(children);
    }
    let mesh = picked.ok_or_else(|| anyhow!("glTF scene contains no mesh: {}", path.display()))?;

    let mut data = MeshData::default();
    for primitive in mesh.primitives() {
        if primitive.mode() != Mode::Triangles {
            log::warn!(
                "Skipping glTF primitive {} of mesh {:?}: mode {:?} is not triangles",
                primitive.index(),
                mesh.name(),
                primitive.mode()
            );
            continue;
        }
        let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|d| d.0.as_slice()));
        let Some(positions) = reader.read_positions() else {
            continue;
        };

        let base = u32::try_from(data.vertices.len())
            .map_err(|_| anyhow!("Too many vertices in glTF mesh"))?;
        let positions: Vec<[f32; 3]> = positions.collect();
        let mut normals = reader.read_normals();
        let mut uvs = reader.read_tex_coords(0).map(|t| t.into_f32());
        for position in &positions {
            let normal = normals
                .as_mut()
                .and_then(Iterator::next)
                .unwrap_or([0.0, 0.0, 1.0]);
            let uv = uvs.as_mut().and_then(Iterator::next).unwrap_or([0.0, 0.0]);
            data.vertices.push(MeshVertex::new(*position, normal, uv));
        }

        match reader.read_indices() {
            Some(indices) => data.indices.extend(indices.into_u32().map(|i| base + i)),
            None => {
                let count = positions.len() as u32 / 3 * 3;
                data.indices.extend((0..count).map(|i| base + i));
            }
        }
    }

    if !data.is_valid() {
        bail!("glTF mesh {:?} has no triangles: {}", mesh.name(), path.display());
    }
    log::debug!(
        "glTF mesh {:?}: {} vertices, {} triangles",
        mesh.name(),
        data.vertices.len(),
        data.triangle_count()
    );
    Ok(data)
}
