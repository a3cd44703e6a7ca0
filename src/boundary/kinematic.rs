//! Velocity constraints on boundary nodes.
//!
//! Applied after the nodal momentum update, before the nodes move. A node
//! on a corner receives the constraint of both sides, x sides first.

use serde::{Deserialize, Serialize};

use crate::mesh::MeshTopology;
use crate::types::{Axis, NodeIndex, Side, Sides, Vec2};

/// Kinematic boundary condition of one domain side.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KinematicBc {
    /// Reflection plane: the normal velocity vanishes
    Symmetry,
    /// Node velocity forced to a fixed vector
    ImposedVelocity { vx: f64, vy: f64 },
    /// No constraint
    FreeSurface,
}

impl KinematicBc {
    /// Legacy integer code.
    pub fn code(&self) -> u32 {
        match self {
            KinematicBc::Symmetry => 200,
            KinematicBc::ImposedVelocity { .. } => 201,
            KinematicBc::FreeSurface => 202,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            KinematicBc::Symmetry => "symmetry",
            KinematicBc::ImposedVelocity { .. } => "imposed_velocity",
            KinematicBc::FreeSurface => "free_surface",
        }
    }

    /// Constrained velocity of a node on `side`.
    #[inline]
    pub fn constrain(&self, side: Side, velocity: Vec2) -> Vec2 {
        match self {
            KinematicBc::Symmetry => match side.normal_axis() {
                Axis::X => Vec2::new(0.0, velocity.y),
                Axis::Y => Vec2::new(velocity.x, 0.0),
            },
            KinematicBc::ImposedVelocity { vx, vy } => Vec2::new(*vx, *vy),
            KinematicBc::FreeSurface => velocity,
        }
    }
}

/// Constrain every boundary node velocity in place.
pub fn apply_node_boundary_conditions<M: MeshTopology + ?Sized>(
    mesh: &M,
    conditions: &Sides<KinematicBc>,
    velocity: &mut [Vec2],
) {
    for node in NodeIndex::iter(mesh.n_nodes()) {
        let on = mesh.node_sides(node);
        for side in [Side::Left, Side::Right, Side::Bottom, Side::Top] {
            if *on.get(side) {
                velocity[node] = conditions.get(side).constrain(side, velocity[node]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::CartesianMesh2D;

    #[test]
    fn test_symmetry_removes_normal_component() {
        let v = Vec2::new(1.0, 2.0);
        assert_eq!(KinematicBc::Symmetry.constrain(Side::Left, v), Vec2::new(0.0, 2.0));
        assert_eq!(KinematicBc::Symmetry.constrain(Side::Top, v), Vec2::new(1.0, 0.0));
        assert_eq!(KinematicBc::FreeSurface.constrain(Side::Top, v), v);
        let imposed = KinematicBc::ImposedVelocity { vx: 3.0, vy: 0.0 };
        assert_eq!(imposed.constrain(Side::Right, v), Vec2::new(3.0, 0.0));
        assert_eq!(imposed.code(), 201);
    }

    #[test]
    fn test_corner_nodes_get_both_constraints() {
        let mesh = CartesianMesh2D::uniform_rectangle(0.0, 1.0, 0.0, 1.0, 2, 2).unwrap();
        let mut velocity = vec![Vec2::new(1.0, 1.0); mesh.n_nodes()];
        apply_node_boundary_conditions(&mesh, &Sides::uniform(KinematicBc::Symmetry), &mut velocity);
        assert_eq!(velocity[mesh.node_at(0, 0).get()], Vec2::ZERO);
        assert_eq!(velocity[mesh.node_at(1, 0).get()], Vec2::new(1.0, 0.0));
        assert_eq!(velocity[mesh.node_at(2, 1).get()], Vec2::new(0.0, 1.0));
        assert_eq!(velocity[mesh.node_at(1, 1).get()], Vec2::new(1.0, 1.0));
    }
}
