//! Nodal forces, velocity and position updates.

use crate::boundary::{apply_node_boundary_conditions, KinematicBc};
use crate::mesh::MeshTopology;
use crate::parallel;
use crate::state::CellFields;
use crate::types::{NodeIndex, Sides, Vec2};

/// `Σ_c (p_c + q_c) C_pc` on every node.
pub fn nodal_forces<M: MeshTopology + ?Sized>(mesh: &M, cells: &CellFields) -> Vec<Vec2> {
    parallel::map_collect(mesh.n_nodes(), |p| {
        let node = NodeIndex::new(p);
        mesh.cells_of(node).iter().fold(Vec2::ZERO, |acc, cell| {
            let local = mesh.nodes_of(*cell).iter().position(|n| *n == node);
            match local {
                Some(k) => acc + cells.corner_normals[*cell][k] * (cells.pressure[*cell] + cells.pseudo[*cell]),
                None => acc,
            }
        })
    })
}

/// `v + step·F/m` on every node, then the kinematic constraints.
pub fn accelerate<M: MeshTopology + ?Sized>(
    mesh: &M,
    velocity: &[Vec2],
    force: &[Vec2],
    node_mass: &[f64],
    step: f64,
    conditions: &Sides<KinematicBc>,
) -> Vec<Vec2> {
    let mut updated = parallel::map_collect(velocity.len(), |p| {
        if node_mass[p] > 0.0 {
            velocity[p] + force[p] * (step / node_mass[p])
        } else {
            velocity[p]
        }
    });
    apply_node_boundary_conditions(mesh, conditions, &mut updated);
    updated
}

/// `x + dt·v`.
pub fn move_nodes(position: &[Vec2], velocity: &[Vec2], dt: f64) -> Vec<Vec2> {
    position.iter().zip(velocity).map(|(x, v)| *x + *v * dt).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lagrange::geometry::update_cell_geometry;
    use crate::mesh::CartesianMesh2D;

    fn uniform_cells(mesh: &CartesianMesh2D, pressure: f64) -> CellFields {
        let mut cells = CellFields::new(mesh.n_cells());
        update_cell_geometry(mesh, &mesh.node_coordinates(), &mut cells);
        cells.pressure = vec![pressure; mesh.n_cells()];
        cells
    }

    #[test]
    fn test_uniform_pressure_has_no_interior_force() {
        let mesh = CartesianMesh2D::uniform_rectangle(0.0, 1.0, 0.0, 1.0, 3, 3).unwrap();
        let force = nodal_forces(&mesh, &uniform_cells(&mesh, 2.0));
        assert!(force[mesh.node_at(1, 1).get()].norm() < 1e-14);
        assert!(force[mesh.node_at(2, 2).get()].norm() < 1e-14);
        // boundary nodes are pushed outward
        assert!(force[mesh.node_at(0, 1).get()].x < 0.0);
        assert!(force[mesh.node_at(3, 1).get()].x > 0.0);
    }

    #[test]
    fn test_symmetry_walls_keep_boundary_nodes_in_place() {
        let mesh = CartesianMesh2D::uniform_rectangle(0.0, 1.0, 0.0, 1.0, 2, 2).unwrap();
        let force = nodal_forces(&mesh, &uniform_cells(&mesh, 1.0));
        let v0 = vec![Vec2::ZERO; mesh.n_nodes()];
        let v = accelerate(&mesh, &v0, &force, &vec![1.0; mesh.n_nodes()], 0.1, &Sides::uniform(KinematicBc::Symmetry));
        assert!(v.iter().all(|v| v.norm() < 1e-14));
        let moved = move_nodes(&mesh.node_coordinates(), &v, 0.1);
        assert_eq!(moved, mesh.node_coordinates());
    }
}
