use shared::{
    HullAlgorithm, LineSegment, Point2D, PointInsideRequest, PolygonFillRequest, PolygonQuery,
    SegmentIntersectsRequest,
};

use super::{BuildError, UiParams};

/// Closed shape needs at least a triangle
pub const MIN_POLYGON_POINTS: usize = 3;

fn require_closed(polygon: &[Point2D]) -> Result<(), BuildError> {
    if polygon.len() < MIN_POLYGON_POINTS {
        return Err(BuildError::InsufficientPoints {
            required: MIN_POLYGON_POINTS,
            actual: polygon.len(),
        });
    }
    Ok(())
}

pub fn check_convex(polygon: &[Point2D]) -> Result<PolygonQuery, BuildError> {
    require_closed(polygon)?;
    Ok(PolygonQuery::CheckConvex(polygon.to_vec()))
}

pub fn convex_hull(
    algorithm: HullAlgorithm,
    polygon: &[Point2D],
) -> Result<PolygonQuery, BuildError> {
    require_closed(polygon)?;
    Ok(PolygonQuery::ConvexHull {
        algorithm,
        points: polygon.to_vec(),
    })
}

/// Fill request; the seed is always the first polygon point
pub fn fill_polygon(
    polygon: &[Point2D],
    params: &UiParams,
) -> Result<PolygonFillRequest, BuildError> {
    require_closed(polygon)?;
    Ok(PolygonFillRequest {
        polygon: polygon.to_vec(),
        algorithm: params.fill_algorithm,
        seed: polygon[0],
        fill_color: params.fill_color.clone(),
        boundary_color: params.boundary_color.clone(),
    })
}

/// Point-inside query. `candidate` is the point already removed from the
/// polygon; the remainder may be of any length.
pub fn point_inside(
    candidate: Option<Point2D>,
    remaining: &[Point2D],
) -> Result<PolygonQuery, BuildError> {
    let point = candidate.ok_or(BuildError::NoCandidatePoint)?;
    Ok(PolygonQuery::PointInside(PointInsideRequest {
        point,
        polygon: remaining.to_vec(),
    }))
}

/// Segment-intersects query against the last completed segment.
/// With both preconditions unmet the polygon is reported.
pub fn segment_intersects(
    polygon: &[Point2D],
    segment: Option<&LineSegment>,
) -> Result<PolygonQuery, BuildError> {
    require_closed(polygon)?;
    let segment = segment.ok_or(BuildError::NoSegment)?;
    Ok(PolygonQuery::SegmentIntersects(SegmentIntersectsRequest {
        a: segment.start(),
        b: segment.end(),
        polygon: polygon.to_vec(),
    }))
}

/// Voronoi payload is the bare site list
pub fn voronoi_sites(sites: &[Point2D]) -> Result<Vec<Point2D>, BuildError> {
    if sites.is_empty() {
        return Err(BuildError::InsufficientPoints {
            required: 1,
            actual: 0,
        });
    }
    Ok(sites.to_vec())
}
