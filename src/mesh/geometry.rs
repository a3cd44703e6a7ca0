//! Geometry of moving quadrilaterals.
//!
//! All helpers take the node coordinates explicitly; the mesh topology is
//! fixed for a run while coordinates change every Lagrangian step.

use super::topology::MeshTopology;
use crate::types::{Axis, CellIndex, FaceIndex, Vec2};

/// Coordinates of the four nodes of a cell, counterclockwise.
#[inline]
pub fn cell_coordinates<M: MeshTopology + ?Sized>(
    mesh: &M,
    cell: CellIndex,
    coords: &[Vec2],
) -> [Vec2; 4] {
    mesh.nodes_of(cell).map(|n| coords[n])
}

/// Cell centre as the average of its nodes.
#[inline]
pub fn cell_center(nodes: &[Vec2; 4]) -> Vec2 {
    (nodes[0] + nodes[1] + nodes[2] + nodes[3]) * 0.25
}

/// Signed area of a polygon given counterclockwise.
pub fn polygon_area(points: &[Vec2]) -> f64 {
    let n = points.len();
    let mut twice = 0.0;
    for k in 0..n {
        twice += points[k].cross(points[(k + 1) % n]);
    }
    0.5 * twice
}

/// Length of a face.
#[inline]
pub fn face_length<M: MeshTopology + ?Sized>(mesh: &M, face: FaceIndex, coords: &[Vec2]) -> f64 {
    let [a, b] = mesh.face_nodes(face);
    (coords[b] - coords[a]).norm()
}

/// Midpoint of a face.
#[inline]
pub fn face_center<M: MeshTopology + ?Sized>(mesh: &M, face: FaceIndex, coords: &[Vec2]) -> Vec2 {
    let [a, b] = mesh.face_nodes(face);
    Vec2::midpoint(coords[a], coords[b])
}

/// Unit outward normal of local face `k` of a cell.
pub fn outward_normal(nodes: &[Vec2; 4], local_face: usize) -> Vec2 {
    let edge = nodes[(local_face + 1) % 4] - nodes[local_face];
    let len = edge.norm();
    if len > 0.0 {
        Vec2::new(edge.y / len, -edge.x / len)
    } else {
        Vec2::ZERO
    }
}

/// Corner vector of node `k` of a cell.
///
/// The gradient of the cell area with respect to the node position:
/// `dV/dt = Σ_k C_k · u_k`. Points out of the cell.
#[inline]
pub fn corner_normal(nodes: &[Vec2; 4], k: usize) -> Vec2 {
    let next = nodes[(k + 1) % 4];
    let prev = nodes[(k + 3) % 4];
    Vec2::new(0.5 * (next.y - prev.y), 0.5 * (prev.x - next.x))
}

/// Sub-volume of node `k`: quadrilateral (centre, mid-edge, node, mid-edge).
pub fn node_subvolume(nodes: &[Vec2; 4], k: usize) -> f64 {
    let center = cell_center(nodes);
    let prev = Vec2::midpoint(nodes[(k + 3) % 4], nodes[k]);
    let next = Vec2::midpoint(nodes[k], nodes[(k + 1) % 4]);
    polygon_area(&[center, prev, nodes[k], next])
}

/// Extent of a cell along an axis: mean length of the two faces
/// transverse to `axis`.
pub fn cell_width(nodes: &[Vec2; 4], axis: Axis) -> f64 {
    match axis {
        // bottom and top faces measure the x extent
        Axis::X => 0.5 * ((nodes[1] - nodes[0]).norm() + (nodes[2] - nodes[3]).norm()),
        Axis::Y => 0.5 * ((nodes[2] - nodes[1]).norm() + (nodes[3] - nodes[0]).norm()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> [Vec2; 4] {
        [
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ]
    }

    #[test]
    fn test_area_and_subvolumes() {
        let q = unit_square();
        assert!((polygon_area(&q) - 1.0).abs() < 1e-14);
        let total: f64 = (0..4).map(|k| node_subvolume(&q, k)).sum();
        assert!((total - 1.0).abs() < 1e-14);
        assert!((node_subvolume(&q, 2) - 0.25).abs() < 1e-14);
    }

    #[test]
    fn test_corner_normals_sum_to_zero_and_point_out() {
        let q = unit_square();
        let sum = (0..4).fold(Vec2::ZERO, |acc, k| acc + corner_normal(&q, k));
        assert!(sum.norm() < 1e-14);
        // bottom-left corner points down-left
        let c0 = corner_normal(&q, 0);
        assert!(c0.x < 0.0 && c0.y < 0.0);
    }

    #[test]
    fn test_corner_normals_give_volume_rate() {
        // stretching the right side at unit speed grows the area at rate 1
        let q = unit_square();
        let velocity = [Vec2::ZERO, Vec2::new(1.0, 0.0), Vec2::new(1.0, 0.0), Vec2::ZERO];
        let rate: f64 = (0..4).map(|k| corner_normal(&q, k).dot(velocity[k])).sum();
        assert!((rate - 1.0).abs() < 1e-14);
    }

    #[test]
    fn test_outward_normals() {
        let q = unit_square();
        assert_eq!(outward_normal(&q, 0), Vec2::new(0.0, -1.0));
        assert_eq!(outward_normal(&q, 1), Vec2::new(1.0, 0.0));
        assert_eq!(outward_normal(&q, 3), Vec2::new(-1.0, 0.0));
    }

    #[test]
    fn test_cell_width() {
        let q = [
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(2.0, 0.5),
            Vec2::new(0.0, 0.5),
        ];
        assert!((cell_width(&q, Axis::X) - 2.0).abs() < 1e-14);
        assert!((cell_width(&q, Axis::Y) - 0.5).abs() < 1e-14);
    }
}
