//! Test data: meshes, polygons and service payloads.
//!
//! Used by unit tests, integration tests and the headless binary's demos.

use shared::{Point2D, TransformationMatrix};

// ── Meshes ──────────────────────────────────────────────────────

/// Unit cube: 8 vertices, 6 quad faces (24 edges)
pub const CUBE_OBJ: &str = "\
# unit cube
o cube
v -0.5 -0.5 -0.5
v 0.5 -0.5 -0.5
v 0.5 0.5 -0.5
v -0.5 0.5 -0.5
v -0.5 -0.5 0.5
v 0.5 -0.5 0.5
v 0.5 0.5 0.5
v -0.5 0.5 0.5
vn 0 0 -1
f 1//1 2//1 3//1 4//1
f 5 6 7 8
f 1 2 6 5
f 2 3 7 6
f 3 4 8 7
f 4 1 5 8
";

/// Single triangle with texture/normal references
pub const TRIANGLE_OBJ: &str = "\
v 0 0 0
v 1 0 0
v 0 1 0
vt 0 0
vt 1 0
vt 0 1
f 1/1 2/2 3/3
";

/// Square pyramid: 5 vertices, 4 triangles + 1 quad
pub const PYRAMID_OBJ: &str = "\
v 0 0 0
v 1 0 0
v 1 0 1
v 0 0 1
v 0.5 1 0.5
f 1 2 3 4
f 1 2 5
f 2 3 5
f 3 4 5
f 4 1 5
";

// ── Polygons ────────────────────────────────────────────────────

pub const TRIANGLE: [(f64, f64); 3] = [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)];

pub const SQUARE: [(f64, f64); 4] = [(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0)];

/// Square with one point inside (not convex as a polygon)
pub const DENTED: [(f64, f64); 5] = [
    (0.0, 0.0),
    (100.0, 0.0),
    (50.0, 50.0),
    (100.0, 100.0),
    (0.0, 100.0),
];

pub fn points(coords: &[(f64, f64)]) -> Vec<Point2D> {
    coords.iter().map(|&(x, y)| Point2D::new(x, y)).collect()
}

// ── Service payloads ────────────────────────────────────────────

/// `/topic/drawings` pixel list
pub const PIXELS_JSON: &str =
    r#"[{"x": 10, "y": 10, "color": null}, {"x": 11, "y": 11, "color": "red"}, {"x": 12, "y": 12}]"#;

/// `/topic/drawings` wireframe (triangle)
pub const WIREFRAME_JSON: &str = r#"{
    "vertices": [{"x": 0, "y": 0}, {"x": 40, "y": 0}, {"x": 0, "y": 30}],
    "edges": [{"start": 0, "end": 1}, {"start": 1, "end": 2}, {"start": 2, "end": 0}]
}"#;

/// Translation matrix with `dx` in the last column
pub fn translated(dx: f64) -> TransformationMatrix {
    let mut m = TransformationMatrix::identity();
    m.0[0][3] = dx;
    m
}

/// `/topic/drawings3d` payload with a small pixel list and the given matrix
pub fn transform_result_json(matrix: &TransformationMatrix) -> String {
    serde_json::json!({
        "pixels": [{"x": 400, "y": 300, "color": null}, {"x": 401, "y": 300, "color": null}],
        "matrix": matrix,
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::parse_object;
    use shared::TransformResult;

    #[test]
    fn test_cube_fixture() {
        let obj = parse_object(CUBE_OBJ).unwrap();
        assert_eq!(obj.vertex_count(), 8);
        assert_eq!(obj.edge_count(), 24);
    }

    #[test]
    fn test_pyramid_fixture() {
        let obj = parse_object(PYRAMID_OBJ).unwrap();
        assert_eq!(obj.vertex_count(), 5);
        assert_eq!(obj.edge_count(), 16);
    }

    #[test]
    fn test_transform_result_fixture() {
        let json = transform_result_json(&translated(0.5));
        let result: TransformResult = serde_json::from_str(&json).unwrap();
        assert_eq!(result.matrix, translated(0.5));
    }

    #[test]
    fn test_points() {
        assert_eq!(points(&TRIANGLE)[2], Point2D::new(10.0, 10.0));
    }
}
