//! Wavefront OBJ reader: positions, normals, texture coordinates and
//! polygonal faces (fan-triangulated). Materials, groups and smoothing
//! directives are skipped.

use std::{
    collections::HashMap,
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

use anyhow::{Context, Result, anyhow, bail};

use crate::mesh::{MeshData, MeshVertex};

/// Load an OBJ mesh from a file path.
pub fn load_obj_from_path(path: impl AsRef<Path>) -> Result<MeshData> {
    let path = path.as_ref();
    let file =
        File::open(path).with_context(|| format!("Failed to open OBJ file: {}", path.display()))?;
    load_obj_from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse OBJ file: {}", path.display()))
}

pub fn load_obj_from_reader<R: BufRead>(reader: R) -> Result<MeshData> {
    let mut parser = ObjParser::default();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read line {}", line_no + 1))?;
        parser
            .line(&line)
            .with_context(|| format!("OBJ line {}: '{}'", line_no + 1, line.trim()))?;
    }
    parser.finish()
}

/// Convenience helper to parse an OBJ string literal.
pub fn load_obj_from_str(contents: &str) -> Result<MeshData> {
    load_obj_from_reader(io::Cursor::new(contents))
}

/// A face corner: position index plus optional texcoord / normal indices.
type Corner = (usize, Option<usize>, Option<usize>);

#[derive(Default)]
struct ObjParser {
    positions: Vec<[f32; 3]>,
    normals: Vec<[f32; 3]>,
    texcoords: Vec<[f32; 2]>,
    corners: HashMap<Corner, u32>,
    mesh: MeshData,
}

impl ObjParser {
    fn line(&mut self, line: &str) -> Result<()> {
        let line = line.split('#').next().unwrap_or("").trim();
        let mut parts = line.split_whitespace();
        let Some(tag) = parts.next() else {
            return Ok(());
        };

        match tag {
            "v" => self.positions.push(floats::<3>(&mut parts)?),
            "vn" => self.normals.push(floats::<3>(&mut parts)?),
            "vt" => self.texcoords.push(floats::<2>(&mut parts)?),
            "f" => {
                let face = parts
                    .map(|token| self.corner(token))
                    .collect::<Result<Vec<u32>>>()?;
                for i in 1..face.len().saturating_sub(1) {
                    self.mesh
                        .indices
                        .extend_from_slice(&[face[0], face[i], face[i + 1]]);
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Resolve a `v`, `v/vt`, `v//vn` or `v/vt/vn` token to a vertex index,
    /// reusing vertices for repeated corners.
    fn corner(&mut self, token: &str) -> Result<u32> {
        let mut fields = token.split('/');
        let pos = resolve_index(fields.next().unwrap_or(""), self.positions.len())?;
        let tex = match fields.next() {
            Some(t) if !t.is_empty() => Some(resolve_index(t, self.texcoords.len())?),
            _ => None,
        };
        let norm = match fields.next() {
            Some(n) if !n.is_empty() => Some(resolve_index(n, self.normals.len())?),
            _ => None,
        };

        let key = (pos, tex, norm);
        if let Some(&idx) = self.corners.get(&key) {
            return Ok(idx);
        }

        let idx = u32::try_from(self.mesh.vertices.len())
            .map_err(|_| anyhow!("Too many vertices in OBJ (>{})", u32::MAX))?;
        self.mesh.vertices.push(MeshVertex::new(
            self.positions[pos],
            norm.map_or([0.0, 0.0, 1.0], |i| self.normals[i]),
            tex.map_or([0.0, 0.0], |i| self.texcoords[i]),
        ));
        self.corners.insert(key, idx);
        Ok(idx)
    }

    fn finish(self) -> Result<MeshData> {
        if !self.mesh.is_valid() {
            bail!("OBJ contained no triangles");
        }
        log::debug!(
            "OBJ parsed: {} vertices, {} triangles",
            self.mesh.vertices.len(),
            self.mesh.triangle_count()
        );
        Ok(self.mesh)
    }
}

fn floats<const N: usize>(parts: &mut dyn Iterator<Item = &str>) -> Result<[f32; N]> {
    let mut out = [0.0f32; N];
    for (i, slot) in out.iter_mut().enumerate() {
        let token = parts
            .next()
            .ok_or_else(|| anyhow!("expected {N} components, found {i}"))?;
        *slot = token
            .parse::<f32>()
            .with_context(|| format!("invalid number '{token}'"))?;
    }
    Ok(out)
}

/// OBJ indices are 1-based; negative values count back from the end.
fn resolve_index(token: &str, len: usize) -> Result<usize> {
    let raw: i64 = token
        .parse()
        .with_context(|| format!("invalid index '{token}'"))?;
    let idx = match raw {
        0 => bail!("index 0 is not valid in OBJ (indices are 1-based)"),
        r if r > 0 => r - 1,
        r => len as i64 + r,
    };
    if idx < 0 || idx as usize >= len {
        bail!("index {raw} out of bounds (len={len})");
    }
    Ok(idx as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_triangle() {
        let src = r#"
            v 0.0 0.0 0.0
            v 1.0 0.0 0.0
            v 0.0 1.0 0.0
            vn 0.0 0.0 1.0
            vt 0.0 0.0
            vt 1.0 0.0
            vt 0.0 1.0
            f 1/1/1 2/2/1 3/3/1
        "#;
        let mesh = load_obj_from_str(src).expect("parse triangle");
        assert_eq!(mesh.vertices.len(), 3);
        assert_eq!(mesh.indices.len(), 3);
        assert!(mesh.is_valid());
    }

    #[test]
    fn quad_with_negative_indices_is_fanned() {
        let src = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0 # corner\nf -4 -3 -2 -1\n";
        let mesh = load_obj_from_str(src).unwrap();
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn shared_corners_are_reused() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nv 1 1 0\nf 1 2 3\nf 2 4 3\n";
        let mesh = load_obj_from_str(src).unwrap();
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.triangle_count(), 2);
    }

    #[test]
    fn rejects_zero_and_out_of_range_indices() {
        assert!(load_obj_from_str("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 0 1 2\n").is_err());
        assert!(load_obj_from_str("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 4\n").is_err());
    }

    #[test]
    fn points_only_file_is_an_error() {
        let err = load_obj_from_str("v 0 0 0\nv 1 0 0\n").unwrap_err();
        assert!(err.to_string().contains("no triangles"));
    }
}
