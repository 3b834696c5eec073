use crate::types::{Point, Value, Vector};

/// Linear interpolation.
pub fn lerp(a: Value, b: Value, t: Value) -> Value {
    a + (b - a) * t
}

/// Returns the interpolation parameter at which an edge with endpoint
/// densities `v0` and `v1` crosses `iso_level`.
///
/// The case tables occasionally flag an edge whose endpoints carry equal
/// densities (flat regions straddling the threshold); that would divide by
/// zero, so equal endpoints resolve to the edge midpoint. The result is
/// always clamped to `[0, 1]` so no NaN or out-of-edge vertex can escape
/// into the mesh.
pub fn crossing_parameter(v0: Value, v1: Value, iso_level: Value) -> Value {
    let denom = v1 - v0;
    if denom == 0.0 {
        0.5
    } else {
        ((iso_level - v0) / denom).clamp(0.0, 1.0)
    }
}

/// Linearly interpolate between two points by factor t.
pub fn lerp_point(p0: &Point, p1: &Point, t: Value) -> Point {
    Point::new(
        lerp(p0.x, p1.x, t),
        lerp(p0.y, p1.y, t),
        lerp(p0.z, p1.z, t),
    )
}

/// Linearly interpolate between two vectors by factor t.
pub fn lerp_vector(v0: &Vector, v1: &Vector, t: Value) -> Vector {
    Vector::new(
        lerp(v0.x, v1.x, t),
        lerp(v0.y, v1.y, t),
        lerp(v0.z, v1.z, t),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crossing_parameter_is_exact_at_midpoint() {
        assert_eq!(crossing_parameter(0.0, 1.0, 0.5), 0.5);
    }

    #[test]
    fn crossing_parameter_handles_equal_endpoints() {
        let t = crossing_parameter(80.0, 80.0, 80.0);
        assert_eq!(t, 0.5);
        assert!(t.is_finite());
    }

    #[test]
    fn crossing_parameter_clamps_out_of_range_iso() {
        assert_eq!(crossing_parameter(0.0, 1.0, 2.0), 1.0);
        assert_eq!(crossing_parameter(0.0, 1.0, -1.0), 0.0);
    }

    #[test]
    fn lerp_point_midpoint() {
        let p = lerp_point(&Point::new(0.0, 0.0, 0.0), &Point::new(2.0, 4.0, 6.0), 0.5);
        assert_eq!(p, Point::new(1.0, 2.0, 3.0));
    }
}
