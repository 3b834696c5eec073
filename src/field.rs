use crate::{
    error::{MetaballsError, Result},
    grid::GridIndex,
    types::{Point, Value},
};

/// Minimum grid side: one interior cell whose corners all have in-grid
/// neighbors for the gradient estimate.
pub const MIN_GRID_SIZE: usize = 4;

/// A cubic grid of density samples, rebuilt in bulk once per frame.
///
/// Samples are stored flat in `x + size*y + size²*z` order (see
/// [`GridIndex`]). The buffer is allocated once and reused for the lifetime
/// of the field; changing resolution means building a new field.
pub struct ScalarField {
    grid: GridIndex,
    values: Vec<Value>,
}

impl ScalarField {
    /// Creates a zeroed field of `size³` voxels.
    ///
    /// Returns [`MetaballsError::GridTooSmall`] below [`MIN_GRID_SIZE`].
    pub fn new(size: usize) -> Result<Self> {
        if size < MIN_GRID_SIZE {
            return Err(MetaballsError::GridTooSmall);
        }
        let grid = GridIndex::new(size);
        Ok(Self {
            values: vec![0.0; grid.len()],
            grid,
        })
    }

    #[inline]
    pub fn grid(&self) -> GridIndex {
        self.grid
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.grid.size()
    }

    /// Overwrites the whole field by evaluating `density` at each voxel's
    /// normalized sample position (`coord / size`, so the grid spans
    /// `[0, 1]³`).
    ///
    /// Only the interior is evaluated; the outermost 1-voxel shell is left
    /// at zero density because corner gradients are undefined there and the
    /// sweep never visits it.
    pub fn refill(&mut self, density: impl Fn(Point) -> Value) {
        let size = self.grid.size();
        let inv = 1.0 / size as Value;
        self.values.fill(0.0);
        for z in 1..size - 1 {
            let fz = z as Value * inv;
            for y in 1..size - 1 {
                let fy = y as Value * inv;
                let row = self.grid.flatten(0, y, z);
                for x in 1..size - 1 {
                    self.values[row + x] = density(Point::new(x as Value * inv, fy, fz));
                }
            }
        }
    }

    /// Density at grid coordinate `(x, y, z)`.
    ///
    /// # Panics
    /// Panics if any coordinate is outside `[0, size)`.
    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> Value {
        self.values[self.grid.flatten(x, y, z)]
    }

    /// Density at flat voxel index `q`.
    #[inline]
    pub fn at(&self, q: usize) -> Value {
        self.values[q]
    }
}

/// The animated density source the extractor was built around: a handful of
/// metaballs on sin/cos orbits, blended by inverse-square falloff.
///
/// Each ball contributes `strength / (1e-6 + d²) − subtract` wherever that
/// is positive, so a ball's influence ends at radius
/// `sqrt(strength / subtract)` in normalized field units.
#[derive(Debug, Clone, PartialEq)]
pub struct Metaballs {
    /// Number of balls.
    pub count: usize,
    /// Falloff numerator.
    pub strength: Value,
    /// Constant subtracted from each ball's contribution.
    pub subtract: Value,
}

impl Default for Metaballs {
    fn default() -> Self {
        Self {
            count: 5,
            strength: 1.2,
            subtract: 12.0,
        }
    }
}

impl Metaballs {
    /// Center of ball `i` at time `t`, in normalized `[0, 1]³` field space.
    ///
    /// Each ball orbits the field center at its own set of angular rates so
    /// the blend keeps merging and splitting instead of settling into a loop.
    pub fn center(&self, i: usize, t: Value) -> Point {
        let fi = i as Value;
        Point::new(
            (fi + t * (1.0 + 0.1 * fi)).sin() * 0.25 + 0.5,
            (fi + t * (1.2 + 0.14 * fi)).cos() * 0.25 + 0.5,
            (fi + t * (0.9 + 0.23 * fi)).cos() * 0.25 + 0.5,
        )
    }

    /// Influence radius of a single ball, in normalized field units.
    pub fn radius(&self) -> Value {
        (self.strength / self.subtract).sqrt()
    }

    /// Summed density of all balls at normalized position `p`, time `t`.
    pub fn density(&self, p: Point, t: Value) -> Value {
        let mut total = 0.0;
        for i in 0..self.count {
            let c = self.center(i, t);
            let d2 = (p - c).norm_squared();
            let val = self.strength / (0.000001 + d2) - self.subtract;
            if val > 0.0 {
                total += val;
            }
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_degenerate_grid() {
        assert!(ScalarField::new(3).is_err());
        assert!(ScalarField::new(4).is_ok());
    }

    #[test]
    fn refill_evaluates_interior_at_normalized_coords() {
        let mut field = ScalarField::new(8).unwrap();
        field.refill(|p| p.x + 10.0 * p.y + 100.0 * p.z);
        let expect = |x: usize, y: usize, z: usize| {
            (x as Value + 10.0 * y as Value + 100.0 * z as Value) / 8.0
        };
        assert_eq!(field.get(1, 1, 1), expect(1, 1, 1));
        assert_eq!(field.get(6, 3, 2), expect(6, 3, 2));
    }

    #[test]
    fn refill_leaves_outer_shell_at_zero() {
        let mut field = ScalarField::new(8).unwrap();
        field.refill(|_| 42.0);
        for a in 0..8 {
            for b in 0..8 {
                assert_eq!(field.get(a, b, 0), 0.0);
                assert_eq!(field.get(a, b, 7), 0.0);
                assert_eq!(field.get(a, 0, b), 0.0);
                assert_eq!(field.get(a, 7, b), 0.0);
                assert_eq!(field.get(0, a, b), 0.0);
                assert_eq!(field.get(7, a, b), 0.0);
            }
        }
        assert_eq!(field.get(3, 3, 3), 42.0);
    }

    #[test]
    fn refill_overwrites_previous_frame() {
        let mut field = ScalarField::new(8).unwrap();
        field.refill(|_| 5.0);
        field.refill(|_| 7.0);
        assert_eq!(field.get(4, 4, 4), 7.0);
    }

    #[test]
    #[should_panic]
    fn get_panics_out_of_range() {
        let field = ScalarField::new(8).unwrap();
        field.get(8, 0, 0);
    }

    #[test]
    fn metaball_density_peaks_at_center() {
        let balls = Metaballs {
            count: 1,
            ..Default::default()
        };
        let t = 0.3;
        let c = balls.center(0, t);
        let at_center = balls.density(c, t);
        let past_radius = balls.density(
            Point::new(c.x + balls.radius() * 1.5, c.y, c.z),
            t,
        );
        assert!(at_center > 0.0);
        assert_eq!(past_radius, 0.0);
    }

    #[test]
    fn metaball_contributions_never_go_negative() {
        // Far from every ball the blend must clamp to zero, not dip below.
        let balls = Metaballs::default();
        assert_eq!(balls.density(Point::new(50.0, 50.0, 50.0), 1.0), 0.0);
    }
}
