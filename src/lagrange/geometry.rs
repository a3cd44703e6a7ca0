//! Cell geometry and masses of the moving mesh.

use crate::mesh::{geometry, MeshTopology};
use crate::parallel;
use crate::state::{CellFields, LagrangianMasses};
use crate::types::{CellIndex, NodeIndex, Vec2, MAX_MATERIALS};

/// Centre, volume and corner vectors of one cell.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CellShape {
    pub center: Vec2,
    pub volume: f64,
    pub corner_normals: [Vec2; 4],
}

/// Shape of `cell` from node positions.
pub fn cell_shape<M: MeshTopology + ?Sized>(mesh: &M, cell: CellIndex, coords: &[Vec2]) -> CellShape {
    let nodes = geometry::cell_coordinates(mesh, cell, coords);
    CellShape {
        center: geometry::cell_center(&nodes),
        volume: (0..4).map(|k| geometry::node_subvolume(&nodes, k)).sum(),
        corner_normals: std::array::from_fn(|k| geometry::corner_normal(&nodes, k)),
    }
}

/// Recompute centres, volumes and corner vectors of every cell.
pub fn update_cell_geometry<M: MeshTopology + ?Sized>(mesh: &M, coords: &[Vec2], cells: &mut CellFields) {
    let shapes = parallel::map_collect(mesh.n_cells(), |c| cell_shape(mesh, CellIndex::new(c), coords));
    for (c, shape) in shapes.into_iter().enumerate() {
        cells.center[c] = shape.center;
        cells.volume[c] = shape.volume;
        cells.corner_normals[c] = shape.corner_normals;
    }
}

/// Cell masses `ρV` and material masses `x_k·m` from the initial state.
pub fn compute_cell_masses(cells: &CellFields, nbmat: usize, masses: &mut LagrangianMasses) {
    for c in 0..cells.n_cells() {
        let m = cells.density[c] * cells.volume[c];
        masses.cell[c] = m;
        let mut env = [0.0; MAX_MATERIALS];
        for (imat, slot) in env.iter_mut().enumerate().take(nbmat) {
            *slot = cells.env.mass_fraction[c][imat] * m;
        }
        masses.env[c] = env;
    }
}

/// Node masses: mean mass of the cells around each node.
pub fn compute_node_masses<M: MeshTopology + ?Sized>(mesh: &M, masses: &mut LagrangianMasses) {
    let cell_mass = &masses.cell;
    masses.node = parallel::map_collect(mesh.n_nodes(), |p| {
        let cells = mesh.cells_of(NodeIndex::new(p));
        if cells.is_empty() {
            return 0.0;
        }
        cells.iter().map(|c| cell_mass[*c]).sum::<f64>() / cells.len() as f64
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::CartesianMesh2D;

    #[test]
    fn test_geometry_of_uniform_mesh() {
        let mesh = CartesianMesh2D::uniform_rectangle(0.0, 2.0, 0.0, 1.0, 2, 2).unwrap();
        let coords = mesh.node_coordinates();
        let mut cells = CellFields::new(mesh.n_cells());
        update_cell_geometry(&mesh, &coords, &mut cells);
        for c in 0..4 {
            assert!((cells.volume[c] - 0.5).abs() < 1e-14);
            let sum = cells.corner_normals[c].iter().fold(Vec2::ZERO, |a, n| a + *n);
            assert!(sum.norm() < 1e-14);
        }
        assert!((cells.center[0].x - 0.5).abs() < 1e-14);
        assert!((cells.center[0].y - 0.25).abs() < 1e-14);
    }

    #[test]
    fn test_masses() {
        let mesh = CartesianMesh2D::uniform_rectangle(0.0, 2.0, 0.0, 1.0, 2, 1).unwrap();
        let mut cells = CellFields::new(2);
        cells.volume = vec![1.0, 1.0];
        cells.density = vec![1.0, 3.0];
        cells.env.mass_fraction = vec![[1.0, 0.0, 0.0], [0.25, 0.75, 0.0]];
        let mut masses = LagrangianMasses::new(2, mesh.n_nodes());
        compute_cell_masses(&cells, 2, &mut masses);
        assert_eq!(masses.cell, vec![1.0, 3.0]);
        assert_eq!(masses.env[1], [0.75, 2.25, 0.0]);

        compute_node_masses(&mesh, &mut masses);
        // corner node sees one cell, middle node sees both
        assert!((masses.node[mesh.node_at(0, 0).get()] - 1.0).abs() < 1e-14);
        assert!((masses.node[mesh.node_at(1, 0).get()] - 2.0).abs() < 1e-14);
        assert!((masses.node[mesh.node_at(2, 1).get()] - 3.0).abs() < 1e-14);
    }
}
