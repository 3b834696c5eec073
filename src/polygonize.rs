use crate::{
    field::ScalarField,
    grid::GridIndex,
    interp::{crossing_parameter, lerp_point, lerp_vector},
    mesh::MeshSink,
    normals::NormalCache,
    tables::{CORNER_OFFSETS, EDGE_CONNECTIONS, EDGE_TABLE, TRI_TABLE},
    types::{Point, Value, Vector},
};

/// Classifies one grid cell against the iso-level and emits its 0–5
/// triangles.
///
/// Owns the 12-slot edge-vertex scratch buffers so a sweep reuses them
/// across every cell without per-cell allocation, and a future parallel
/// sweep can simply hold one polygonizer per worker.
pub struct CellPolygonizer {
    vlist: [Point; 12],
    nlist: [Vector; 12],
}

impl Default for CellPolygonizer {
    fn default() -> Self {
        Self::new()
    }
}

impl CellPolygonizer {
    pub fn new() -> Self {
        Self {
            vlist: [Point::origin(); 12],
            nlist: [Vector::zeros(); 12],
        }
    }

    /// Polygonizes the cell whose minimum corner sits at grid coordinate
    /// `cell`. Emits each triangle's three vertices to `sink` and returns
    /// the triangle count.
    ///
    /// ```text
    /// 1. read the 8 corner densities
    /// 2. corner-sign code: bit i set when corner i is below iso
    /// 3. EDGE_TABLE[code] == 0  →  done, cell is uniform
    /// 4. interpolate position+normal on every crossed edge
    /// 5. TRI_TABLE[code] triples  →  sink, until the -1 sentinel
    /// ```
    pub fn polygonize(
        &mut self,
        field: &ScalarField,
        normals: &mut NormalCache,
        cell: (usize, usize, usize),
        iso_level: Value,
        sink: &mut impl MeshSink,
    ) -> usize {
        let grid = field.grid();
        let (cx, cy, cz) = cell;

        let mut corners = [0usize; 8];
        let mut density = [0.0 as Value; 8];
        let mut code = 0usize;
        for (i, [ox, oy, oz]) in CORNER_OFFSETS.iter().enumerate() {
            let q = grid.flatten(cx + ox, cy + oy, cz + oz);
            corners[i] = q;
            density[i] = field.at(q);
            if density[i] < iso_level {
                code |= 1 << i;
            }
        }

        // Entirely inside or outside the surface: nothing to draw.
        let crossed = EDGE_TABLE[code];
        if crossed == 0 {
            return 0;
        }

        for edge in 0..12 {
            if crossed & (1 << edge) == 0 {
                continue;
            }
            // Adjacent cells see a shared edge from opposite directions;
            // interpolating in a fixed geometric direction, from corner
            // positions mapped straight off the grid coordinate, makes both
            // cells emit bit-identical vertices: no hairline cracks.
            let [mut a, mut b] = EDGE_CONNECTIONS[edge];
            if CORNER_OFFSETS[b] < CORNER_OFFSETS[a] {
                std::mem::swap(&mut a, &mut b);
            }
            let na = normals.ensure(field, corners[a]);
            let nb = normals.ensure(field, corners[b]);
            let pa = corner_position(&grid, cell, a);
            let pb = corner_position(&grid, cell, b);

            let mu = crossing_parameter(density[a], density[b], iso_level);
            self.vlist[edge] = lerp_point(&pa, &pb, mu);
            // Corner gradients are unnormalized central differences; unit
            // length only matters once a vertex is actually emitted.
            let n = lerp_vector(&na, &nb, mu);
            self.nlist[edge] = n.try_normalize(0.0).unwrap_or(n);
        }

        let mut emitted = 0;
        let row = &TRI_TABLE[code];
        for tri in row.chunks_exact(3) {
            if tri[0] == -1 {
                break;
            }
            for &edge in tri {
                let edge = edge as usize;
                sink.vertex(self.vlist[edge], self.nlist[edge]);
            }
            emitted += 1;
        }
        emitted
    }
}

/// World-space position of case-table corner `i` of the cell at `cell`.
#[inline]
fn corner_position(grid: &GridIndex, cell: (usize, usize, usize), i: usize) -> Point {
    let [ox, oy, oz] = CORNER_OFFSETS[i];
    grid.world_position(cell.0 + ox, cell.1 + oy, cell.2 + oz)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::TriangleSoup;

    const SIZE: usize = 8;

    /// Builds a field from densities given by integer grid coordinate.
    fn field_from(f: impl Fn(usize, usize, usize) -> Value) -> ScalarField {
        let mut field = ScalarField::new(SIZE).unwrap();
        field.refill(|p| {
            let x = (p.x * SIZE as Value).round() as usize;
            let y = (p.y * SIZE as Value).round() as usize;
            let z = (p.z * SIZE as Value).round() as usize;
            f(x, y, z)
        });
        field
    }

    fn polygonize_cell(field: &ScalarField, iso: Value) -> (usize, TriangleSoup) {
        let mut normals = NormalCache::new(field.grid());
        let mut poly = CellPolygonizer::new();
        let mut soup = TriangleSoup::new();
        let count = poly.polygonize(field, &mut normals, (3, 3, 3), iso, &mut soup);
        (count, soup)
    }

    #[test]
    fn uniform_cells_emit_nothing() {
        let above = field_from(|_, _, _| 1.0);
        let (count, soup) = polygonize_cell(&above, 0.5);
        assert_eq!(count, 0);
        assert!(soup.is_empty());

        let below = field_from(|_, _, _| 0.0);
        let (count, soup) = polygonize_cell(&below, 0.5);
        assert_eq!(count, 0);
        assert!(soup.is_empty());
    }

    #[test]
    fn single_inside_corner_emits_one_triangle() {
        let field = field_from(|x, y, z| {
            if (x, y, z) == (3, 3, 3) { 0.0 } else { 1.0 }
        });
        let (count, soup) = polygonize_cell(&field, 0.5);
        assert_eq!(count, 1);
        assert_eq!(soup.positions.len(), 3);
        assert_eq!(soup.normals.len(), 3);
    }

    #[test]
    fn interpolation_is_exact_at_edge_midpoints() {
        // Endpoint densities 0 and 1 at iso 0.5 must land exactly halfway.
        let field = field_from(|x, y, z| {
            if (x, y, z) == (3, 3, 3) { 0.0 } else { 1.0 }
        });
        let (_, soup) = polygonize_cell(&field, 0.5);

        let origin = field.grid().world_position(3, 3, 3);
        let half = field.grid().cell_size() * 0.5;
        let expected = [
            [origin.x + half, origin.y, origin.z],
            [origin.x, origin.y + half, origin.z],
            [origin.x, origin.y, origin.z + half],
        ];
        for p in &soup.positions {
            assert!(
                expected.iter().any(|e| e == p),
                "vertex {p:?} is not an edge midpoint"
            );
        }
    }

    #[test]
    fn triangle_count_matches_case_table_row() {
        // Two diagonal inside corners on the bottom face: code 0b0000_0101.
        let field = field_from(|x, y, z| {
            if (x, y, z) == (3, 3, 3) || (x, y, z) == (4, 4, 3) {
                0.0
            } else {
                1.0
            }
        });
        let (count, soup) = polygonize_cell(&field, 0.5);
        let row_len = TRI_TABLE[0b101]
            .iter()
            .take_while(|&&e| e != -1)
            .count();
        assert_eq!(count, row_len / 3);
        assert_eq!(soup.positions.len(), row_len);
    }

    #[test]
    fn iso_touching_outside_corners_stays_finite() {
        // Outside endpoints sit exactly on the iso-level, pushing mu to its
        // clamped extreme of 1: vertices land on the corners, never NaN.
        let field = field_from(|x, y, z| {
            if (x, y, z) == (3, 3, 3) { 0.0 } else { 0.5 }
        });
        let (count, soup) = polygonize_cell(&field, 0.5);
        assert_eq!(count, 1);
        for p in &soup.positions {
            assert!(p.iter().all(|c| c.is_finite()));
        }
        for n in &soup.normals {
            assert!(n.iter().all(|c| c.is_finite()));
        }
    }
}
