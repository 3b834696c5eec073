use crate::types::{Point, Vector};

/// Consumer of polygonized geometry.
///
/// The extractor calls [`vertex`](MeshSink::vertex) three times per emitted
/// triangle, in front-face winding order. There is no index buffer: the
/// output is expanded triangle soup, and vertices shared between cells are
/// emitted once per triangle that uses them.
pub trait MeshSink {
    fn vertex(&mut self, position: Point, normal: Vector);
}

/// The crate-provided [`MeshSink`]: flat position/normal buffers in the
/// layout renderers want.
///
/// Buffers are kept across frames; [`clear`](TriangleSoup::clear) drops the
/// contents but keeps the capacity so a steady-state animation stops
/// allocating after the first few frames.
#[derive(Default, Clone)]
pub struct TriangleSoup {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
}

impl TriangleSoup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.positions.clear();
        self.normals.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Number of complete triangles in the buffer.
    pub fn triangle_count(&self) -> usize {
        self.positions.len() / 3
    }
}

impl MeshSink for TriangleSoup {
    #[inline]
    fn vertex(&mut self, position: Point, normal: Vector) {
        self.positions.push([position.x, position.y, position.z]);
        self.normals.push([normal.x, normal.y, normal.z]);
    }
}
