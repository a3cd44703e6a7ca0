//! Prescribed remap fluxes on boundary faces.

use crate::mesh::{geometry, MeshTopology};
use crate::remap::{PhiVec, MAX_PHI};
use crate::types::{Axis, CellIndex, Side, Sides, Vec2};

/// Inflow flux vectors per side, per unit face length and unit time.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FluxBoundary {
    values: Sides<Option<PhiVec>>,
    width: usize,
}

impl FluxBoundary {
    /// Build from per-side vectors of width `width`.
    ///
    /// Vectors are assumed validated; extra components are ignored.
    pub fn new(values: &Sides<Option<Vec<f64>>>, width: usize) -> Self {
        let values = values.clone().map(|v| {
            v.map(|vec| {
                let mut phi = [0.0; MAX_PHI];
                for (slot, x) in phi.iter_mut().zip(vec.iter()).take(width) {
                    *slot = *x;
                }
                phi
            })
        });
        Self { values, width }
    }

    /// `true` when any side carries a flux.
    pub fn is_active(&self) -> bool {
        Side::ALL.iter().any(|s| self.values.get(*s).is_some())
    }

    /// Amount entering `cell` through its boundary faces normal to `axis`
    /// during `dt`.
    pub fn inflow<M: MeshTopology + ?Sized>(
        &self,
        mesh: &M,
        cell: CellIndex,
        axis: Axis,
        coords: &[Vec2],
        dt: f64,
    ) -> PhiVec {
        let mut total = [0.0; MAX_PHI];
        for face in [mesh.back_face(cell, axis), mesh.front_face(cell, axis)] {
            let Some(side) = mesh.face_side(face) else {
                continue;
            };
            if let Some(value) = self.values.get(side) {
                let scale = geometry::face_length(mesh, face, coords) * dt;
                for k in 0..self.width {
                    total[k] += value[k] * scale;
                }
            }
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::CartesianMesh2D;

    #[test]
    fn test_inflow_only_on_configured_side() {
        let mesh = CartesianMesh2D::uniform_rectangle(0.0, 2.0, 0.0, 1.0, 2, 2).unwrap();
        let coords = mesh.node_coordinates();
        let mut sides: Sides<Option<Vec<f64>>> = Sides::default();
        sides.left = Some(vec![1.0, 2.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let bc = FluxBoundary::new(&sides, 7);
        assert!(bc.is_active());

        let left_cell = mesh.cell_at(0, 0);
        let inflow = bc.inflow(&mesh, left_cell, Axis::X, &coords, 0.1);
        // face length 0.5
        assert!((inflow[0] - 0.05).abs() < 1e-14);
        assert!((inflow[1] - 0.1).abs() < 1e-14);

        let none = bc.inflow(&mesh, left_cell, Axis::Y, &coords, 0.1);
        assert!(none.iter().all(|v| *v == 0.0));
        let right_cell = mesh.cell_at(1, 0);
        assert!(bc.inflow(&mesh, right_cell, Axis::X, &coords, 0.1).iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_inactive_by_default() {
        assert!(!FluxBoundary::new(&Sides::default(), 7).is_active());
    }
}
