use crate::{
    error::{MetaballsError, Result},
    field::ScalarField,
    mesh::MeshSink,
    normals::NormalCache,
    polygonize::CellPolygonizer,
    types::Value,
};

/// Drives a full-grid marching cubes pass: normal-cache invalidation, the
/// interior cell sweep, and per-cell polygonization.
///
/// Owns the [`NormalCache`] and [`CellPolygonizer`] working state, sized once
/// for a fixed grid resolution and reused every frame. One extractor serves
/// one thread; a parallel sweep would hold one per worker.
pub struct SurfaceExtractor {
    normals: NormalCache,
    polygonizer: CellPolygonizer,
    size: usize,
}

impl SurfaceExtractor {
    /// Creates an extractor for fields of `size³` voxels.
    pub fn new(field: &ScalarField) -> Self {
        Self {
            normals: NormalCache::new(field.grid()),
            polygonizer: CellPolygonizer::new(),
            size: field.size(),
        }
    }

    /// Extracts the isosurface of `field` at `iso_level` into `sink`,
    /// returning the number of triangles emitted.
    ///
    /// Sweeps every interior cell in z-major, y-mid, x-minor order. Cells
    /// touching the outer voxel shell are skipped: the shell is never filled
    /// and its corners have no defined gradient. Emission order is
    /// deterministic, so two extractions over the same field produce
    /// bit-identical output.
    ///
    /// # Panics
    /// Panics if `field` was not built at the resolution this extractor was
    /// created for.
    pub fn extract(
        &mut self,
        field: &ScalarField,
        iso_level: Value,
        sink: &mut impl MeshSink,
    ) -> Result<usize> {
        if !iso_level.is_finite() {
            return Err(MetaballsError::NonFiniteIsoLevel);
        }
        assert_eq!(
            field.size(),
            self.size,
            "field resolution does not match extractor"
        );

        self.normals.clear();

        // Interior cells only: corner indices stay within [1, size-2] so
        // every gradient read has in-grid neighbors.
        let cells = 1..self.size - 2;
        let mut triangles = 0;
        for z in cells.clone() {
            for y in cells.clone() {
                for x in cells.clone() {
                    triangles += self.polygonizer.polygonize(
                        field,
                        &mut self.normals,
                        (x, y, z),
                        iso_level,
                        sink,
                    );
                }
            }
        }

        tracing::trace!(triangles, iso_level, "isosurface extracted");
        Ok(triangles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::TriangleSoup;
    use crate::types::Point;

    const SIZE: usize = 12;

    /// A single off-center sphere, dense in the middle and fading with the
    /// square of the distance.
    fn sphere_field() -> ScalarField {
        let mut field = ScalarField::new(SIZE).unwrap();
        let center = Point::new(0.53, 0.49, 0.51);
        field.refill(|p| 1.0 / (0.000001 + (p - center).norm_squared()));
        field
    }

    #[test]
    fn rejects_non_finite_iso_level() {
        let field = sphere_field();
        let mut extractor = SurfaceExtractor::new(&field);
        let mut soup = TriangleSoup::new();
        assert!(extractor.extract(&field, Value::NAN, &mut soup).is_err());
        assert!(
            extractor
                .extract(&field, Value::INFINITY, &mut soup)
                .is_err()
        );
        assert!(soup.is_empty());
    }

    #[test]
    fn sphere_produces_triangles() {
        let field = sphere_field();
        let mut extractor = SurfaceExtractor::new(&field);
        let mut soup = TriangleSoup::new();
        let count = extractor.extract(&field, 40.0, &mut soup).unwrap();
        assert!(count > 0);
        assert_eq!(soup.triangle_count(), count);
    }

    #[test]
    fn extraction_is_deterministic() {
        let field = sphere_field();
        let mut extractor = SurfaceExtractor::new(&field);

        let mut first = TriangleSoup::new();
        let n1 = extractor.extract(&field, 40.0, &mut first).unwrap();
        let mut second = TriangleSoup::new();
        let n2 = extractor.extract(&field, 40.0, &mut second).unwrap();

        assert_eq!(n1, n2);
        assert_eq!(first.positions, second.positions);
        assert_eq!(first.normals, second.normals);
    }

    #[test]
    fn boundary_cells_are_never_visited() {
        // A uniformly dense interior only crosses the iso-level against the
        // zero outer shell, and those crossings lie in cells the sweep must
        // skip: nothing may be emitted.
        let mut field = ScalarField::new(SIZE).unwrap();
        field.refill(|_| 100.0);
        let mut extractor = SurfaceExtractor::new(&field);
        let mut soup = TriangleSoup::new();
        let count = extractor.extract(&field, 50.0, &mut soup).unwrap();
        assert_eq!(count, 0);
        assert!(soup.is_empty());
    }

    #[test]
    fn all_vertices_stay_inside_the_interior_region() {
        // A dense block spanning voxels 3..=8 crosses the surface well inside
        // the sweep range; every vertex must sit within the interior corner
        // range [1, size-2] in world space.
        let mut field = ScalarField::new(SIZE).unwrap();
        field.refill(|p| {
            let v = |c: Value| {
                let i = (c * SIZE as Value).round() as usize;
                (3..=8).contains(&i)
            };
            if v(p.x) && v(p.y) && v(p.z) { 100.0 } else { 0.0 }
        });
        let mut extractor = SurfaceExtractor::new(&field);
        let mut soup = TriangleSoup::new();
        let count = extractor.extract(&field, 50.0, &mut soup).unwrap();
        assert!(count > 0);

        let grid = field.grid();
        let lo = grid.world_position(1, 1, 1);
        let hi = grid.world_position(SIZE - 2, SIZE - 2, SIZE - 2);
        for p in &soup.positions {
            for axis in 0..3 {
                assert!(
                    p[axis] >= lo[axis] && p[axis] <= hi[axis],
                    "vertex {p:?} escapes the interior sweep region"
                );
            }
        }
    }
}
