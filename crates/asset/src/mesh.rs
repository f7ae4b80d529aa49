//! CPU-side mesh representation used by loaders.

/// One corner of a face. Indices are 0-based into the source lists.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Corner {
    pub position: usize,
    pub texcoord: Option<usize>,
    pub normal: Option<usize>,
}

impl Corner {
    pub fn new(position: usize, texcoord: Option<usize>, normal: Option<usize>) -> Self {
        Self {
            position,
            texcoord,
            normal,
        }
    }
}

/// Polygon with at least three corners, in emission order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Face {
    pub corners: Vec<Corner>,
    /// 1-based source line, 0 when built by hand.
    pub line: usize,
}

impl Face {
    pub fn new(corners: Vec<Corner>) -> Self {
        Self { corners, line: 0 }
    }

    pub fn at_line(corners: Vec<Corner>, line: usize) -> Self {
        Self { corners, line }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.corners.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.corners.is_empty()
    }

    /// Position indices of the first three corners, if the face has them.
    pub fn leading_triangle(&self) -> Option<[usize; 3]> {
        match self.corners.as_slice() {
            [a, b, c, ..] => Some([a.position, b.position, c.position]),
            _ => None,
        }
    }

    /// Flip the winding order in place.
    pub fn reverse(&mut self) {
        self.corners.reverse();
    }
}

/// Flat, unwelded render buffers. Every emitted corner is a fresh vertex,
/// so `indices[i] == i`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshBuffers {
    /// xyz per vertex.
    pub positions: Vec<f32>,
    /// xyz per vertex, parallel to `positions`, or empty.
    pub normals: Vec<f32>,
    /// uv per vertex, or empty when the source had no texture references.
    pub texcoords: Vec<f32>,
    pub indices: Vec<u32>,
}

impl MeshBuffers {
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    #[inline]
    pub fn has_texcoords(&self) -> bool {
        !self.texcoords.is_empty()
    }

    /// Returns `true` if the buffers are non-empty and their lengths agree.
    pub fn is_valid(&self) -> bool {
        let n = self.vertex_count();
        n > 0
            && self.positions.len() == 3 * n
            && self.indices.len() == n
            && (self.normals.is_empty() || self.normals.len() == 3 * n)
            && (self.texcoords.is_empty() || self.texcoords.len() == 2 * n)
    }

    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    pub fn normal_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.normals)
    }

    pub fn texcoord_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.texcoords)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}
