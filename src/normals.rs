use crate::{
    field::ScalarField,
    grid::GridIndex,
    types::Vector,
};

/// Lazily-filled cache of per-corner density gradients.
///
/// A corner's normal is the central difference of the field around it. Any
/// one corner is shared by up to four crossed edges in up to eight cells, so
/// caching the gradient per frame saves most of the redundant differencing
/// during a sweep.
///
/// Entries are invalidated by comparing a per-voxel epoch stamp against the
/// current frame counter, so [`clear`](NormalCache::clear) is O(1) and a
/// legitimately zero gradient (flat or symmetric regions) is cached like any
/// other value instead of being mistaken for an empty slot.
pub struct NormalCache {
    grid: GridIndex,
    normals: Vec<Vector>,
    stamps: Vec<u64>,
    frame: u64,
}

impl NormalCache {
    pub fn new(grid: GridIndex) -> Self {
        Self {
            grid,
            normals: vec![Vector::zeros(); grid.len()],
            // Stamps start one frame behind so nothing reads as filled.
            stamps: vec![0; grid.len()],
            frame: 1,
        }
    }

    /// Invalidates every cached gradient. Call once per frame, before the
    /// sweep and after the field has been refilled.
    pub fn clear(&mut self) {
        self.frame += 1;
    }

    /// Returns the gradient at flat corner index `q`, computing and caching
    /// it on first use this frame. Idempotent within a frame.
    ///
    /// # Panics
    /// Panics (in debug) if `q` sits on the outer shell, where a central
    /// difference would read outside the grid.
    #[inline]
    pub fn ensure(&mut self, field: &ScalarField, q: usize) -> Vector {
        if self.stamps[q] != self.frame {
            let g = self.grid;
            self.normals[q] = Vector::new(
                field.at(g.neighbor(q, -1, 0, 0)) - field.at(g.neighbor(q, 1, 0, 0)),
                field.at(g.neighbor(q, 0, -1, 0)) - field.at(g.neighbor(q, 0, 1, 0)),
                field.at(g.neighbor(q, 0, 0, -1)) - field.at(g.neighbor(q, 0, 0, 1)),
            );
            self.stamps[q] = self.frame;
        }
        self.normals[q]
    }
}
