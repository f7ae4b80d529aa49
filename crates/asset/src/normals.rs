//! Area-weighted vertex normals for meshes that ship without `vn` lines.

use glam::Vec3;

use crate::mesh::Face;

/// Unnormalized normal of the triangle `(p0, p1, p2)`. Its length is twice the
/// triangle's area.
#[inline]
pub fn face_normal(p0: Vec3, p1: Vec3, p2: Vec3) -> Vec3 {
    (p1 - p0).cross(p2 - p0)
}

/// Compute one normal per position.
///
/// Each face contributes the unnormalized normal of its first three corners to
/// every position it references, so larger faces weigh more. Positions that no
/// face references (or that only touch degenerate faces) get the zero vector.
///
/// Faces are expected to reference valid positions; corners outside
/// `positions` are ignored.
pub fn synthesize(positions: &[[f32; 3]], faces: &[Face]) -> Vec<[f32; 3]> {
    let mut accum = vec![Vec3::ZERO; positions.len()];

    for face in faces {
        let Some([i0, i1, i2]) = face.leading_triangle() else {
            continue;
        };
        let (Some(p0), Some(p1), Some(p2)) =
            (positions.get(i0), positions.get(i1), positions.get(i2))
        else {
            continue;
        };

        let n = face_normal(Vec3::from(*p0), Vec3::from(*p1), Vec3::from(*p2));
        for corner in &face.corners {
            if let Some(slot) = accum.get_mut(corner.position) {
                *slot += n;
            }
        }
    }

    log::debug!(
        "Synthesized {} vertex normals from {} faces",
        accum.len(),
        faces.len()
    );

    accum
        .into_iter()
        .map(|n| n.normalize_or_zero().to_array())
        .collect()
}
