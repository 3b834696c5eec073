use crate::types::{Point, Value};

/// Index math for a cubic grid of `size³` voxels stored flat as
/// `x + size*y + size²*z`.
///
/// Every piece of stride arithmetic in the crate goes through this type so
/// the neighbor offsets live in exactly one place. Out-of-range coordinates
/// are caller bugs and panic rather than clamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridIndex {
    size: usize,
}

impl GridIndex {
    pub fn new(size: usize) -> Self {
        Self { size }
    }

    /// Voxels per axis.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Total voxel count, `size³`.
    #[inline]
    pub fn len(&self) -> usize {
        self.size * self.size * self.size
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Flat-index stride of a `+1` step along Y.
    #[inline]
    pub fn y_stride(&self) -> usize {
        self.size
    }

    /// Flat-index stride of a `+1` step along Z.
    #[inline]
    pub fn z_stride(&self) -> usize {
        self.size * self.size
    }

    /// Flat index of grid coordinate `(x, y, z)`.
    ///
    /// # Panics
    /// Panics if any coordinate is outside `[0, size)`.
    #[inline]
    pub fn flatten(&self, x: usize, y: usize, z: usize) -> usize {
        assert!(
            x < self.size && y < self.size && z < self.size,
            "grid coordinate ({x}, {y}, {z}) outside {0}³ grid",
            self.size
        );
        x + self.size * y + self.size * self.size * z
    }

    /// Grid coordinate `(x, y, z)` of flat index `q`.
    #[inline]
    pub fn unflatten(&self, q: usize) -> (usize, usize, usize) {
        debug_assert!(q < self.len());
        let z = q / self.z_stride();
        let rem = q % self.z_stride();
        (rem % self.size, rem / self.size, z)
    }

    /// Flat index of the voxel `(dx, dy, dz)` steps away from `q`.
    ///
    /// # Panics
    /// Panics (in debug) if the step leaves the grid on any axis.
    #[inline]
    pub fn neighbor(&self, q: usize, dx: isize, dy: isize, dz: isize) -> usize {
        #[cfg(debug_assertions)]
        {
            let (x, y, z) = self.unflatten(q);
            let in_axis = |c: usize, d: isize| {
                let c = c as isize + d;
                c >= 0 && c < self.size as isize
            };
            assert!(
                in_axis(x, dx) && in_axis(y, dy) && in_axis(z, dz),
                "neighbor ({dx}, {dy}, {dz}) of flat index {q} leaves the grid"
            );
        }
        (q as isize + dx + dy * self.y_stride() as isize + dz * self.z_stride() as isize) as usize
    }

    /// World-space position of grid coordinate `(x, y, z)`.
    ///
    /// The grid maps linearly onto `[-1, 1]³` via `(coord - size/2) / (size/2)`.
    #[inline]
    pub fn world_position(&self, x: usize, y: usize, z: usize) -> Point {
        let half = self.size as Value / 2.0;
        Point::new(
            (x as Value - half) / half,
            (y as Value - half) / half,
            (z as Value - half) / half,
        )
    }

    /// World-space edge length of one cell, `2 / size`.
    #[inline]
    pub fn cell_size(&self) -> Value {
        2.0 / self.size as Value
    }
}
