//! OBJ-style mesh parser producing flat, unwelded render buffers.
//!
//! Recognized tags: `v`, `vt`, `vn`, `f`. Everything else is ignored.

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use anyhow::{Context, Result};
use glam::Vec3;

use crate::{
    error::{AssetError, AssetResult, IndexKind},
    mesh::{Corner, Face, MeshBuffers},
    normals,
};

/// Load an OBJ mesh from a file path.
pub fn load_obj_from_path(path: impl AsRef<Path>) -> Result<MeshBuffers> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open OBJ file: {}", path.display()))?;
    let mesh = load_obj_from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse OBJ file: {}", path.display()))?;

    log::info!(
        "Loaded OBJ {:?}: {} vertices, texcoords={}",
        path,
        mesh.vertex_count(),
        mesh.has_texcoords()
    );
    Ok(mesh)
}

/// Load an OBJ mesh from a [`BufRead`] implementation.
pub fn load_obj_from_reader<R: BufRead>(reader: R) -> Result<MeshBuffers> {
    let mut source = ObjSource::default();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read line {}", line_no + 1))?;
        source.push_line(line_no + 1, &line)?;
    }
    Ok(source.into_buffers()?)
}

/// Parse OBJ text held in memory.
pub fn load_obj_from_str(contents: &str) -> AssetResult<MeshBuffers> {
    parse_obj_source(contents)?.into_buffers()
}

/// Parse OBJ text into its source lists without flattening.
pub fn parse_obj_source(contents: &str) -> AssetResult<ObjSource> {
    let mut source = ObjSource::default();
    for (line_no, line) in contents.lines().enumerate() {
        source.push_line(line_no + 1, line)?;
    }
    Ok(source)
}

/// The mesh as written: homogeneous lists plus faces referencing them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObjSource {
    pub positions: Vec<[f32; 3]>,
    /// Stored as `(u, 1 - v)` to match image row order.
    pub texcoords: Vec<[f32; 2]>,
    pub normals: Vec<[f32; 3]>,
    pub faces: Vec<Face>,
}

impl ObjSource {
    /// Consume one source line. `line_no` is 1-based and only used in errors.
    pub fn push_line(&mut self, line_no: usize, line: &str) -> AssetResult<()> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(());
        }

        let mut parts = trimmed.split_whitespace();
        let Some(tag) = parts.next() else {
            return Ok(());
        };

        match tag {
            "v" => {
                let x = parse_f32(parts.next(), line_no, "x coordinate")?;
                let y = parse_f32(parts.next(), line_no, "y coordinate")?;
                let z = parse_f32(parts.next(), line_no, "z coordinate")?;
                self.positions.push([x, y, z]);
            }
            "vt" => {
                let u = parse_f32(parts.next(), line_no, "u coordinate")?;
                let v = parse_f32(parts.next(), line_no, "v coordinate")?;
                self.texcoords.push([u, 1.0 - v]);
            }
            "vn" => {
                let nx = parse_f32(parts.next(), line_no, "nx coordinate")?;
                let ny = parse_f32(parts.next(), line_no, "ny coordinate")?;
                let nz = parse_f32(parts.next(), line_no, "nz coordinate")?;
                self.normals.push([nx, ny, nz]);
            }
            "f" => {
                let corners = parts
                    .map(|token| self.parse_corner(token, line_no))
                    .collect::<AssetResult<Vec<_>>>()?;

                if corners.len() < 3 {
                    log::warn!(
                        "Skipping face with {} corners on line {}",
                        corners.len(),
                        line_no
                    );
                    return Ok(());
                }

                let mut face = Face::at_line(corners, line_no);
                if needs_flip(&face, &self.positions, &self.normals) {
                    face.reverse();
                }
                self.faces.push(face);
            }
            _ => {
                // Ignore other directives (o/g/s/usemtl/etc.)
            }
        }
        Ok(())
    }

    /// Flatten into unwelded buffers, synthesizing normals when the source
    /// carried none.
    pub fn into_buffers(self) -> AssetResult<MeshBuffers> {
        let synthesized = self.normals.is_empty();
        let normals = if synthesized {
            normals::synthesize(&self.positions, &self.faces)
        } else {
            self.normals
        };

        let with_texcoords = !self.texcoords.is_empty()
            && self
                .faces
                .iter()
                .flat_map(|f| &f.corners)
                .any(|c| c.texcoord.is_some());

        let corner_count: usize = self.faces.iter().map(Face::len).sum();
        let mut mesh = MeshBuffers {
            positions: Vec::with_capacity(corner_count * 3),
            normals: Vec::with_capacity(corner_count * 3),
            texcoords: Vec::with_capacity(if with_texcoords {
                corner_count * 2
            } else {
                0
            }),
            indices: Vec::with_capacity(corner_count),
        };

        for face in &self.faces {
            for corner in &face.corners {
                let index = u32::try_from(mesh.indices.len()).map_err(|_| {
                    AssetError::parse(face.line, format!("Too many vertices (>{})", u32::MAX))
                })?;
                mesh.indices.push(index);

                let position =
                    fetch(&self.positions, corner.position, IndexKind::Position, face.line)?;
                mesh.positions.extend_from_slice(&position);

                if with_texcoords {
                    let uv = match corner.texcoord {
                        Some(t) => fetch(&self.texcoords, t, IndexKind::Texcoord, face.line)?,
                        None => [0.0, 0.0],
                    };
                    mesh.texcoords.extend_from_slice(&uv);
                }

                // Without an explicit reference the position index doubles as
                // the normal index.
                let n = corner.normal.unwrap_or(corner.position);
                let normal = fetch(&normals, n, IndexKind::Normal, face.line)?;
                mesh.normals.extend_from_slice(&normal);
            }
        }

        log::debug!(
            "Flattened {} faces into {} vertices (normals synthesized={}, texcoords={})",
            self.faces.len(),
            mesh.vertex_count(),
            synthesized,
            with_texcoords
        );

        Ok(mesh)
    }

    fn parse_corner(&self, token: &str, line_no: usize) -> AssetResult<Corner> {
        let mut split = token.split('/');
        let position = match split.next() {
            Some(value) if !value.is_empty() => {
                resolve_index(value, self.positions.len(), IndexKind::Position, line_no)?
            }
            _ => {
                return Err(AssetError::parse(
                    line_no,
                    format!("Malformed face element '{}'", token),
                ));
            }
        };

        let texcoord = match split.next() {
            Some(value) if !value.is_empty() => Some(resolve_index(
                value,
                self.texcoords.len(),
                IndexKind::Texcoord,
                line_no,
            )?),
            _ => None,
        };

        let normal = match split.next() {
            Some(value) if !value.is_empty() => Some(resolve_index(
                value,
                self.normals.len(),
                IndexKind::Normal,
                line_no,
            )?),
            _ => None,
        };

        Ok(Corner::new(position, texcoord, normal))
    }
}

/// Whether the face's geometric normal opposes the normal authored on its
/// first corner.
///
/// Only applies when normals exist and corner 0 references one; otherwise the
/// face is left as written.
pub fn needs_flip(face: &Face, positions: &[[f32; 3]], normals: &[[f32; 3]]) -> bool {
    if normals.is_empty() {
        return false;
    }
    let Some([i0, i1, i2]) = face.leading_triangle() else {
        return false;
    };
    let Some(authored) = face.corners[0].normal.and_then(|n| normals.get(n)) else {
        return false;
    };
    let (Some(p0), Some(p1), Some(p2)) =
        (positions.get(i0), positions.get(i1), positions.get(i2))
    else {
        return false;
    };

    let geometric = normals::face_normal(Vec3::from(*p0), Vec3::from(*p1), Vec3::from(*p2));
    geometric.dot(Vec3::from(*authored)) < 0.0
}

fn fetch<const N: usize>(
    list: &[[f32; N]],
    index: usize,
    kind: IndexKind,
    line: usize,
) -> AssetResult<[f32; N]> {
    list.get(index)
        .copied()
        .ok_or_else(|| AssetError::IndexOutOfRange {
            kind,
            index: index as i64 + 1,
            len: list.len(),
            line,
        })
}

fn parse_f32(value: Option<&str>, line_no: usize, what: &str) -> AssetResult<f32> {
    let token = value.ok_or_else(|| AssetError::parse(line_no, format!("Missing {}", what)))?;
    Ok(lenient_f32(token))
}

/// Malformed numbers become NaN instead of failing the whole mesh.
fn lenient_f32(token: &str) -> f32 {
    token.parse::<f32>().unwrap_or(f32::NAN)
}

fn resolve_index(token: &str, len: usize, kind: IndexKind, line_no: usize) -> AssetResult<usize> {
    let raw = token
        .parse::<i64>()
        .map_err(|_| AssetError::parse(line_no, format!("Invalid {} index '{}'", kind, token)))?;

    let out_of_range = AssetError::IndexOutOfRange {
        kind,
        index: raw,
        len,
        line: line_no,
    };

    // 1-based; negative values count back from the end of the list so far.
    let idx = match raw {
        0 => return Err(out_of_range),
        r if r > 0 => r - 1,
        r => len as i64 + r,
    };

    if idx < 0 || idx as usize >= len {
        return Err(out_of_range);
    }
    Ok(idx as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: &[f32], expected: &[f32]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-6, "{:?} != {:?}", actual, expected);
        }
    }

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
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        assert_eq!(mesh.texcoords.len(), 6);
        assert_close(&mesh.texcoords, &[0.0, 1.0, 1.0, 1.0, 0.0, 0.0]);
        assert_close(&mesh.normals, &[0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0]);
        assert!(mesh.is_valid());
    }

    #[test]
    fn triangle_without_normals_gets_face_normal() {
        let mesh = load_obj_from_str("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3").expect("parse");
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        assert_close(&mesh.positions, &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
        assert_close(&mesh.normals, &[0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0]);
        assert!(mesh.texcoords.is_empty());
    }

    #[test]
    fn texcoord_v_is_flipped() {
        let source = parse_obj_source("vt 0.2 0.3").expect("parse");
        assert_close(&source.texcoords[0], &[0.2, 0.7]);
    }

    #[test]
    fn texcoord_needs_both_components() {
        assert!(matches!(
            parse_obj_source("vt 0.5").unwrap_err(),
            AssetError::Parse { line: 1, .. }
        ));
        assert!(matches!(
            parse_obj_source("v 0 0 0\nvt").unwrap_err(),
            AssetError::Parse { line: 2, .. }
        ));
    }

    #[test]
    fn indices_are_sequential_over_all_corners() {
        let src = "\
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
v 0 0 1
f 1 2 3 4
f 1 2 5
f 2 3 5
";
        let mesh = load_obj_from_str(src).expect("parse");
        assert_eq!(mesh.indices.len(), 4 + 3 + 3);
        assert!(mesh.indices.iter().enumerate().all(|(i, &idx)| idx as usize == i));
        assert_eq!(mesh.normals.len(), mesh.positions.len());
    }

    #[test]
    fn clockwise_face_is_reversed_against_authored_normal() {
        let src = "\
v 0 0 0
v 1 0 0
v 0 1 0
vn 0 0 1
f 1//1 3//1 2//1
";
        let source = parse_obj_source(src).expect("parse");
        let order: Vec<usize> = source.faces[0].corners.iter().map(|c| c.position).collect();
        assert_eq!(order, vec![1, 2, 0]);

        let mesh = source.into_buffers().expect("flatten");
        assert_close(&mesh.positions, &[1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn winding_correction_is_idempotent() {
        let src = "\
v 0 0 0
v 1 0 0
v 0 1 0
vn 0 0 1
f 1//1 3//1 2//1
";
        let source = parse_obj_source(src).expect("parse");
        let face = &source.faces[0];
        assert!(!needs_flip(face, &source.positions, &source.normals));
    }

    #[test]
    fn no_authored_normal_on_first_corner_keeps_order() {
        let src = "\
v 0 0 0
v 1 0 0
v 0 1 0
vn 0 0 1
f 1 3//1 2//1
";
        let source = parse_obj_source(src).expect("parse");
        let order: Vec<usize> = source.faces[0].corners.iter().map(|c| c.position).collect();
        assert_eq!(order, vec![0, 2, 1]);
    }

    #[test]
    fn negative_indices_count_from_the_end() {
        let mesh = load_obj_from_str("v 0 0 0\nv 1 0 0\nv 0 1 0\nf -3 -2 -1").expect("parse");
        assert_close(&mesh.positions, &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn out_of_range_index_is_reported() {
        let err = load_obj_from_str("v 0 0 0\nv 1 0 0\nf 1 2 3").unwrap_err();
        assert_eq!(
            err,
            AssetError::IndexOutOfRange {
                kind: IndexKind::Position,
                index: 3,
                len: 2,
                line: 3,
            }
        );

        let err = load_obj_from_str("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 0 1 2").unwrap_err();
        assert!(matches!(err, AssetError::IndexOutOfRange { index: 0, .. }));
    }

    #[test]
    fn out_of_range_texcoord_is_reported() {
        let err = load_obj_from_str("v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nf 1/9 2/9 3/9")
            .unwrap_err();
        assert_eq!(
            err,
            AssetError::IndexOutOfRange {
                kind: IndexKind::Texcoord,
                index: 9,
                len: 1,
                line: 5,
            }
        );
    }

    #[test]
    fn malformed_index_is_parse_error() {
        let err = load_obj_from_str("v 0 0 0\nf a 1 1").unwrap_err();
        assert!(matches!(err, AssetError::Parse { line: 2, .. }));
    }

    #[test]
    fn malformed_coordinate_becomes_nan() {
        let source = parse_obj_source("v 1.0 oops 2.0").expect("parse");
        assert_eq!(source.positions[0][0], 1.0);
        assert!(source.positions[0][1].is_nan());

        let err = parse_obj_source("v 1.0 2.0").unwrap_err();
        assert!(matches!(err, AssetError::Parse { line: 1, .. }));
    }

    #[test]
    fn short_faces_comments_and_unknown_tags_are_skipped() {
        let src = "\
# a comment
o thing
v 0 0 0
v 1 0 0
v 0 1 0
usemtl none
f 1 2
f 1 2 3
";
        let source = parse_obj_source(src).expect("parse");
        assert_eq!(source.faces.len(), 1);
        assert_eq!(source.faces[0].line, 8);
    }

    #[test]
    fn missing_texcoord_references_are_zero_filled() {
        let src = "\
v 0 0 0
v 1 0 0
v 0 1 0
vt 0.5 0.5
f 1/1 2 3
";
        let mesh = load_obj_from_str(src).expect("parse");
        assert_close(&mesh.texcoords, &[0.5, 0.5, 0.0, 0.0, 0.0, 0.0]);
        assert!(mesh.is_valid());
    }

    #[test]
    fn authored_normals_fall_back_to_position_index() {
        let src = "\
v 0 0 0
v 1 0 0
v 0 1 0
vn 1 0 0
vn 0 1 0
vn 0 0 1
f 1 2 3//3
";
        let mesh = load_obj_from_str(src).expect("parse");
        assert_close(&mesh.normals, &[1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]);

        let err = load_obj_from_str("v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nf 1//1 2 3").unwrap_err();
        assert!(matches!(
            err,
            AssetError::IndexOutOfRange {
                kind: IndexKind::Normal,
                line: 5,
                ..
            }
        ));
    }

    #[test]
    fn reader_and_str_agree() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
        let from_reader = load_obj_from_reader(std::io::Cursor::new(src)).expect("reader");
        let from_str = load_obj_from_str(src).expect("str");
        assert_eq!(from_reader, from_str);
    }
}
