//! Convex boundary polygons of merged planes
//!
//! Points are projected onto the refined plane, expressed in an in-plane
//! 2D basis, and wrapped with a monotone-chain convex hull.

use planemerge_core::{PlaneModel, Point3f, PointCloud, PointIndices, Polygon, Result, Vector3f};

/// Orthonormal in-plane axes `(u, v)` with `u × v` equal to the plane normal
fn plane_basis(normal: &Vector3f) -> (Vector3f, Vector3f) {
    // Seed with the world axis least aligned with the normal
    let seed = if normal.x.abs() <= normal.y.abs() && normal.x.abs() <= normal.z.abs() {
        Vector3f::x()
    } else if normal.y.abs() <= normal.z.abs() {
        Vector3f::y()
    } else {
        Vector3f::z()
    };
    let u = seed.cross(normal).normalize();
    let v = normal.cross(&u);
    (u, v)
}

/// Z component of `(a - o) × (b - o)` in 2D
fn turn(o: &(f32, f32), a: &(f32, f32), b: &(f32, f32)) -> f32 {
    (a.0 - o.0) * (b.1 - o.1) - (a.1 - o.1) * (b.0 - o.0)
}

/// Counter-clockwise convex hull of 2D points, returned as positions into `points`.
///
/// Collinear boundary points are dropped.
fn convex_hull_2d(points: &[(f32, f32)]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by(|&a, &b| {
        points[a].0.total_cmp(&points[b].0).then(points[a].1.total_cmp(&points[b].1))
    });
    order.dedup_by(|a, b| points[*a] == points[*b]);

    if order.len() < 3 {
        return order;
    }

    let mut hull: Vec<usize> = Vec::with_capacity(order.len() * 2);

    // Lower chain
    for &i in &order {
        while hull.len() >= 2
            && turn(&points[hull[hull.len() - 2]], &points[hull[hull.len() - 1]], &points[i]) <= 0.0
        {
            hull.pop();
        }
        hull.push(i);
    }

    // Upper chain
    let lower_len = hull.len() + 1;
    for &i in order.iter().rev().skip(1) {
        while hull.len() >= lower_len
            && turn(&points[hull[hull.len() - 2]], &points[hull[hull.len() - 1]], &points[i]) <= 0.0
        {
            hull.pop();
        }
        hull.push(i);
    }

    // Last point repeats the first
    hull.pop();
    hull
}

/// Convex polygon enclosing the points of `cloud` selected by `indices`,
/// lying on `plane`.
///
/// Vertices wind counter-clockwise when viewed from the side the plane
/// normal points to. Fewer than three distinct projected points give a
/// degenerate polygon holding just those points.
pub fn convex_polygon(
    cloud: &PointCloud<Point3f>,
    indices: &PointIndices,
    plane: &PlaneModel,
) -> Result<Polygon> {
    let points = cloud.extract(indices)?;
    let normal = plane.normal();
    let (u, v) = plane_basis(&normal);

    let projected: Vec<Point3f> = points.iter().map(|p| plane.project_point(p)).collect();
    let planar: Vec<(f32, f32)> = projected
        .iter()
        .map(|p| (p.coords.dot(&u), p.coords.dot(&v)))
        .collect();

    let hull = convex_hull_2d(&planar);
    Ok(Polygon::new(hull.into_iter().map(|i| projected[i]).collect()))
}
