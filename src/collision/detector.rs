use crate::bodies::RigidBody;
use crate::collision::ContactPoint;
use crate::math::{Matrix3, Vector3, EPSILON};

/// One of the fifteen candidate separating axes of a box-box pair:
/// a face axis of either box, or the cross product of one local axis
/// from each box (an edge-edge axis).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AxisKind {
    /// Local axis of the first box
    FaceA(usize),
    /// Local axis of the second box
    FaceB(usize),
    /// Cross product of local axis i of the first box and local axis j
    /// of the second box
    Edge(usize, usize),
}

/// Every candidate axis, in evaluation order. The order doubles as the
/// tie-break rule for equal penetrations: the first axis reaching the
/// minimum wins, so face contacts are preferred over edge contacts.
const CANDIDATE_AXES: [AxisKind; 15] = [
    AxisKind::FaceA(0),
    AxisKind::FaceA(1),
    AxisKind::FaceA(2),
    AxisKind::FaceB(0),
    AxisKind::FaceB(1),
    AxisKind::FaceB(2),
    AxisKind::Edge(0, 0),
    AxisKind::Edge(0, 1),
    AxisKind::Edge(0, 2),
    AxisKind::Edge(1, 0),
    AxisKind::Edge(1, 1),
    AxisKind::Edge(1, 2),
    AxisKind::Edge(2, 0),
    AxisKind::Edge(2, 1),
    AxisKind::Edge(2, 2),
];

/// Projected radius of a box with half extents `h` onto a world-space
/// axis, with `rt` the transpose of the box's orientation
#[inline]
fn half_extent_on_axis(axis: &Vector3, h: &Vector3, rt: &Matrix3) -> f32 {
    let axis_local = rt.multiply_vector(*axis);
    axis_local.x.abs() * h.x + axis_local.y.abs() * h.y + axis_local.z.abs() * h.z
}

/// Overlap of the two boxes' projections onto `axis`: the sum of both
/// projected radii minus the projected center distance. Non-positive
/// means the axis separates the boxes.
#[inline]
pub(crate) fn overlap_on_axis(
    axis: &Vector3,
    h: &[Vector3; 2],
    rt: &[Matrix3; 2],
    distance: &Vector3,
) -> f32 {
    let r0 = half_extent_on_axis(axis, &h[0], &rt[0]);
    let r1 = half_extent_on_axis(axis, &h[1], &rt[1]);
    let d = axis.dot(distance).abs();

    r0 + r1 - d
}

#[inline]
fn sign(v: f32) -> f32 {
    if v < -EPSILON {
        -1.0
    } else {
        1.0
    }
}

/// Support point of a box: the vertex furthest along `axis`, in world
/// space. The vertex is picked by the signs of the axis expressed in the
/// box's local frame.
#[inline]
fn furthest_vertex_along_axis(
    axis: &Vector3,
    h: &Vector3,
    r: &Matrix3,
    rt: &Matrix3,
    p: &Vector3,
) -> Vector3 {
    let axis_local = rt.multiply_vector(*axis).normalize();

    let furthest_local = Vector3::new(
        sign(axis_local.x) * h.x,
        sign(axis_local.y) * h.y,
        sign(axis_local.z) * h.z,
    );

    r.multiply_vector(furthest_local) + *p
}

/// Closest points of two 3D line segments, each given by its endpoints,
/// with the parametric coordinates clamped to [0, 1].
///
/// Ref.: Christer Ericson, Real-Time Collision Detection (2005),
/// 5.1.9 Closest Points of Two Line Segments.
fn closest_point_of_segments(edges: &[[Vector3; 2]; 2]) -> [Vector3; 2] {
    let d = [edges[0][1] - edges[0][0], edges[1][1] - edges[1][0]];
    let r = edges[0][0] - edges[1][0];

    let a = d[0].dot(&d[0]);
    let e = d[1].dot(&d[1]);
    let c = d[0].dot(&r);
    let f = d[1].dot(&r);
    let b = d[0].dot(&d[1]);

    // The segments here are always box edges with positive half extents,
    // so neither can degenerate to a point and a, e stay well above zero.

    let denom = a * e - b * b;
    let mut t0 = if denom > EPSILON {
        ((b * f - c * e) / denom).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let mut t1 = (b * t0 + f) / e;

    if t1 < 0.0 {
        t1 = 0.0;
        t0 = (-c / a).clamp(0.0, 1.0);
    } else if t1 > 1.0 {
        t1 = 1.0;
        t0 = ((b - c) / a).clamp(0.0, 1.0);
    }

    [edges[0][0] + d[0] * t0, edges[1][0] + d[1] * t1]
}

/// Box-box collision detection by the separating-axis test.
///
/// Evaluates the fifteen candidate axes in [`CANDIDATE_AXES`] order and
/// returns `None` as soon as any axis separates the boxes. Otherwise the
/// axis with the smallest overlap classifies the contact: a face axis
/// means a vertex of the other box touches that face, an edge-edge axis
/// means two edges cross, and a single representative contact point is
/// synthesized accordingly. The returned normal always points from the
/// second box toward the first.
///
/// Stateless and deterministic; detection order and tie-breaking are
/// fixed by the axis table.
///
/// Ref.:
/// - Open Dynamics Engine [box.cpp]
/// - Game Physics Engine Development [collide_fine.cpp]
pub fn detect(box0: &RigidBody, box1: &RigidBody) -> Option<ContactPoint> {
    let h = [box0.get_half_extent(), box1.get_half_extent()];
    let r = [box0.get_orientation(), box1.get_orientation()];
    let rt = [r[0].transpose(), r[1].transpose()];
    let p = [box0.get_position(), box1.get_position()];
    let distance = p[1] - p[0];

    let mut best_penetration = f32::MAX;
    let mut best_axis = Vector3::zero();
    let mut best_kind = AxisKind::FaceA(0);

    for kind in CANDIDATE_AXES {
        let axis = match kind {
            AxisKind::FaceA(i) => r[0].column(i),
            AxisKind::FaceB(i) => r[1].column(i),
            AxisKind::Edge(i, j) => {
                let cross = r[0].column(i).cross(&r[1].column(j));
                // Near-parallel edges produce a degenerate cross product;
                // such an axis can never be the separating one, skip it.
                if cross.length_squared() < EPSILON {
                    continue;
                }
                cross.normalize()
            }
        };

        let overlap = overlap_on_axis(&axis, &h, &rt, &distance);
        if overlap <= EPSILON {
            return None;
        }
        if overlap < best_penetration {
            best_penetration = overlap;
            best_axis = axis;
            best_kind = kind;
        }
    }

    // No axis separates the boxes: they intersect. Orient the normal from
    // box1 toward box0 and synthesize the contact point.
    let center_direction = distance.normalize();
    let mut normal = best_axis;
    let position;

    match best_kind {
        // A vertex of box1 touches a face of box0
        AxisKind::FaceA(_) => {
            if center_direction.dot(&best_axis) >= 0.0 {
                normal = -normal;
            }

            position = furthest_vertex_along_axis(&normal, &h[1], &r[1], &rt[1], &p[1]);
        }

        // A vertex of box0 touches a face of box1
        AxisKind::FaceB(_) => {
            if center_direction.dot(&best_axis) >= 0.0 {
                normal = -normal;
            }

            position = furthest_vertex_along_axis(&(-normal), &h[0], &r[0], &rt[0], &p[0]);
        }

        // An edge of box0 crosses an edge of box1. Locate the colliding
        // edge on each box, take the closest points between the two
        // segments, and place the contact at their midpoint.
        AxisKind::Edge(col0, col1) => {
            let mut axis = best_axis;
            if center_direction.dot(&best_axis) >= 0.0 {
                normal = -normal;
                axis = -axis;
            }

            let axis_local = [rt[0].multiply_vector(axis), rt[1].multiply_vector(axis)];

            // The two local coordinates that do not run along the edge
            // pick which of the box's four parallel edges is colliding.
            let mut midpoint = [Vector3::zero(), Vector3::zero()];
            for i in 0..3 {
                if i != col0 {
                    midpoint[0][i] = if axis_local[0][i] < 0.0 { h[0][i] } else { -h[0][i] };
                }
                if i != col1 {
                    midpoint[1][i] = if axis_local[1][i] > 0.0 { h[1][i] } else { -h[1][i] };
                }
            }

            let midpoint = [
                r[0].multiply_vector(midpoint[0]) + p[0],
                r[1].multiply_vector(midpoint[1]) + p[1],
            ];

            let edges = [
                [
                    midpoint[0] + h[0][col0] * r[0].column(col0),
                    midpoint[0] - h[0][col0] * r[0].column(col0),
                ],
                [
                    midpoint[1] + h[1][col1] * r[1].column(col1),
                    midpoint[1] - h[1][col1] * r[1].column(col1),
                ],
            ];

            let closest = closest_point_of_segments(&edges);
            position = 0.5 * (closest[0] + closest[1]);

            // The contact sits between the two edges rather than on
            // either box, so only half the overlap is real penetration.
            best_penetration *= 0.5;
        }
    }

    Some(ContactPoint {
        position,
        relative_position: [position - p[0], position - p[1]],
        normal,
        penetration: best_penetration,
    })
}
