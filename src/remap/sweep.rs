//! One directional remap sweep.
//!
//! A sweep along `axis` moves the conserved vector U across the faces
//! normal to `axis` by the volume each face swept during the Lagrangian
//! step. It runs five passes, each finished before the next starts:
//!
//! 1. Φ from U, plus cell centres and widths along the axis
//! 2. face pass: one-sided slope of Φ across every face
//! 3. cell pass: limited gradient, and under plateau-pente the bounded
//!    outgoing fluxes through the back and front faces
//! 4. face pass: signed flux along `+axis` (upwind order 1/2, bounded
//!    plateau-pente, or third order)
//! 5. cell pass: `U ← U − F_front + F_back + boundary inflow`

use super::limiters::{limited_gradient, LimiterKind, LimiterStencil};
use super::order3::third_order_flux_vec;
use super::phi::{PhiLayout, PhiVec, MAX_PHI};
use super::plateau_pente::{compute_flux_pp, compute_flux_pp_pure, CellStencil, FaceSide};
use crate::boundary::FluxBoundary;
use crate::config::ProjectionConfig;
use crate::mesh::{geometry, MeshTopology};
use crate::parallel;
use crate::types::{Axis, CellIndex, FaceIndex, Vec2, MAX_MATERIALS};

/// Faces whose normal is this close to orthogonal to the sweep carry no flux.
const NORMAL_CUTOFF: f64 = 1e-10;

/// Projection options resolved for one run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SweepOptions {
    pub layout: PhiLayout,
    pub order: u8,
    pub plateau_pente: bool,
    pub mixed_cell_limiting: bool,
    pub limiter: LimiterKind,
    pub pure_limiter: LimiterKind,
}

impl SweepOptions {
    pub fn new(nbmat: usize, projection: &ProjectionConfig) -> Self {
        Self {
            layout: PhiLayout::new(nbmat),
            order: projection.order,
            plateau_pente: projection.plateau_pente,
            mixed_cell_limiting: projection.mixed_cell_limiting,
            limiter: projection.limiter,
            pure_limiter: projection.pure_limiter,
        }
    }
}

/// Inputs of one sweep.
#[derive(Clone, Copy, Debug)]
pub struct SweepInput<'a> {
    pub axis: Axis,
    /// Node positions at the end of the Lagrangian phase
    pub coords: &'a [Vec2],
    /// Normal velocity of every face along `+axis`
    pub face_velocity: &'a [f64],
    /// U before the sweep
    pub conserved: &'a [PhiVec],
    /// Single material present in each cell, if any
    pub pure_material: &'a [Option<usize>],
    pub dt: f64,
}

/// Results of one sweep.
#[derive(Clone, Debug)]
pub struct SweepOutput {
    /// U after the sweep
    pub conserved: Vec<PhiVec>,
    /// Signed flux along `+axis` per face; zero on faces of the other axis
    pub face_flux: Vec<PhiVec>,
    /// Net bounded outflow `(front - back)` of each cell, plateau-pente only
    pub bounded_cell_flux: Vec<PhiVec>,
}

/// Centre and width along the sweep axis of a Lagrangian cell.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CellGeometry {
    pub center: Vec2,
    pub width: f64,
}

/// Cell centres and widths along `axis`.
pub fn cell_geometry<M: MeshTopology + ?Sized>(mesh: &M, coords: &[Vec2], axis: Axis) -> Vec<CellGeometry> {
    parallel::map_collect(mesh.n_cells(), |c| {
        let nodes = geometry::cell_coordinates(mesh, CellIndex::new(c), coords);
        CellGeometry {
            center: geometry::cell_center(&nodes),
            width: geometry::cell_width(&nodes, axis),
        }
    })
}

/// Face length projected on the sweep normal, zero below the cutoff.
pub fn projected_length<M: MeshTopology + ?Sized>(mesh: &M, face: FaceIndex, coords: &[Vec2], axis: Axis) -> f64 {
    let [a, b] = mesh.face_nodes(face);
    let edge = coords[b] - coords[a];
    let length = edge.norm();
    if length == 0.0 {
        return 0.0;
    }
    let projected = edge.along(axis.other()).abs();
    if projected / length < NORMAL_CUTOFF {
        0.0
    } else {
        projected
    }
}

/// Normal velocity of each face from the Lagrangian node displacement.
///
/// Faces normal to the other axis get zero.
pub fn face_normal_velocities<M: MeshTopology + ?Sized>(
    mesh: &M,
    axis: Axis,
    lagrangian: &[Vec2],
    reference: &[Vec2],
    dt: f64,
) -> Vec<f64> {
    parallel::map_collect(mesh.n_faces(), |f| {
        let face = FaceIndex::new(f);
        if mesh.face_axis(face) != axis || dt <= 0.0 {
            return 0.0;
        }
        let [a, b] = mesh.face_nodes(face);
        let displacement = ((lagrangian[a] - reference[a]) + (lagrangian[b] - reference[b])) * 0.5;
        displacement.along(axis) / dt
    })
}

/// One-sided slope of Φ across every interior face normal to `axis`.
pub fn face_gradients<M: MeshTopology + ?Sized>(
    mesh: &M,
    axis: Axis,
    width: usize,
    phi: &[PhiVec],
    geom: &[CellGeometry],
) -> Vec<PhiVec> {
    parallel::map_collect(mesh.n_faces(), |f| {
        let face = FaceIndex::new(f);
        let mut grad = [0.0; MAX_PHI];
        if mesh.face_axis(face) != axis {
            return grad;
        }
        if let (Some(back), Some(front)) = mesh.face_cells(face) {
            let dx = (geom[front].center - geom[back].center).along(axis);
            if dx != 0.0 {
                for k in 0..width {
                    grad[k] = (phi[front][k] - phi[back][k]) / dx;
                }
            }
        }
        grad
    })
}

/// Pure material of a cell: the only one above `threshold`, if exactly one.
pub fn pure_material(fraction: &[f64], threshold: f64) -> Option<usize> {
    let mut present = fraction.iter().enumerate().filter(|(_, f)| **f > threshold);
    match (present.next(), present.next()) {
        (Some((imat, _)), None) => Some(imat),
        _ => None,
    }
}

/// Pure material of every cell from the volume entries of U.
pub fn pure_materials(layout: PhiLayout, conserved: &[PhiVec], threshold: f64) -> Vec<Option<usize>> {
    conserved
        .iter()
        .map(|u| {
            let mut fraction = [0.0; MAX_MATERIALS];
            let total: f64 = (0..layout.nbmat).map(|m| u[layout.volume(m)].max(0.0)).sum();
            if total > 0.0 {
                for (imat, f) in fraction.iter_mut().enumerate().take(layout.nbmat) {
                    *f = u[layout.volume(imat)].max(0.0) / total;
                }
            }
            pure_material(&fraction[..layout.nbmat], threshold)
        })
        .collect()
}

/// Three-cell stencil of a cell along an axis; the cell stands in for a
/// missing neighbour.
#[inline]
fn neighbours<M: MeshTopology + ?Sized>(mesh: &M, cell: CellIndex, axis: Axis) -> (CellIndex, CellIndex) {
    (
        mesh.back_cell(cell, axis).unwrap_or(cell),
        mesh.front_cell(cell, axis).unwrap_or(cell),
    )
}

impl SweepOptions {
    /// `true` when the three-cell stencil holds a single common material
    /// and mixed-cell-aware limiting is on.
    fn is_pure_neighbourhood(
        &self,
        pure: &[Option<usize>],
        cell: CellIndex,
        back: CellIndex,
        front: CellIndex,
    ) -> bool {
        if !self.mixed_cell_limiting {
            return false;
        }
        match pure[cell] {
            Some(m) => pure[back] == Some(m) && pure[front] == Some(m),
            None => false,
        }
    }

    /// Limiter of a cell.
    fn limiter_for(&self, pure_stencil: bool) -> LimiterKind {
        if pure_stencil {
            self.pure_limiter
        } else {
            self.limiter
        }
    }
}

/// Per-cell results of the gradient pass.
#[derive(Clone, Copy, Debug)]
struct CellPass {
    grad: PhiVec,
    /// Bounded outflow through the back face, per unit length
    delta_back: PhiVec,
    /// Bounded outflow through the front face, per unit length
    delta_front: PhiVec,
}

/// Run one directional sweep.
pub fn directional_sweep<M: MeshTopology + ?Sized>(
    mesh: &M,
    options: &SweepOptions,
    flux_boundary: &FluxBoundary,
    input: &SweepInput<'_>,
) -> SweepOutput {
    let axis = input.axis;
    let layout = options.layout;
    let width = layout.width();
    let n_cells = mesh.n_cells();

    // Pass 1: Φ and geometry
    let phi: Vec<PhiVec> = parallel::map_collect(n_cells, |c| {
        let u = &input.conserved[c];
        layout.phi_from_conserved(u, layout.total_volume(u), options.plateau_pente)
    });
    let geom = cell_geometry(mesh, input.coords, axis);

    // Pass 2: face slopes
    let grad_face = face_gradients(mesh, axis, width, &phi, &geom);

    // Pass 3: limited gradients and bounded delta fluxes
    let cells: Vec<CellPass> = parallel::map_collect(n_cells, |c| {
        let cell = CellIndex::new(c);
        let (back, front) = neighbours(mesh, cell, axis);
        let pure_stencil = options.is_pure_neighbourhood(input.pure_material, cell, back, front);
        let kind = options.limiter_for(pure_stencil);
        let gp = &grad_face[mesh.front_face(cell, axis)];
        let gm = &grad_face[mesh.back_face(cell, axis)];

        let mut grad = [0.0; MAX_PHI];
        if options.order >= 2 {
            for k in 0..width {
                let stencil = LimiterStencil {
                    phi: phi[cell][k],
                    phi_plus: phi[front][k],
                    phi_minus: phi[back][k],
                    h0: geom[cell].width,
                    h_plus: geom[front].width,
                    h_minus: geom[back].width,
                };
                grad[k] = limited_gradient(kind, gp[k], gm[k], &stencil);
            }
        }

        let mut delta_back = [0.0; MAX_PHI];
        let mut delta_front = [0.0; MAX_PHI];
        if options.plateau_pente {
            let stencil = CellStencil {
                phi: &phi[cell],
                phi_plus: &phi[front],
                phi_minus: &phi[back],
                grad: &grad,
                h0: geom[cell].width,
                h_plus: geom[front].width,
                h_minus: geom[back].width,
            };
            let u_back = input.face_velocity[mesh.back_face(cell, axis)];
            let u_front = input.face_velocity[mesh.front_face(cell, axis)];
            let flux = if pure_stencil {
                compute_flux_pp_pure
            } else {
                compute_flux_pp
            };
            delta_back = flux(layout, kind, &stencil, FaceSide::Back, -u_back, input.dt);
            delta_front = flux(layout, kind, &stencil, FaceSide::Front, u_front, input.dt);
        }
        CellPass {
            grad,
            delta_back,
            delta_front,
        }
    });

    // Pass 4: face fluxes
    let face_flux: Vec<PhiVec> = parallel::map_collect(mesh.n_faces(), |f| {
        let face = FaceIndex::new(f);
        let mut flux = [0.0; MAX_PHI];
        if mesh.face_axis(face) != axis {
            return flux;
        }
        let length = projected_length(mesh, face, input.coords, axis);
        if length == 0.0 {
            return flux;
        }
        let (back, front) = mesh.face_cells(face);
        let u = input.face_velocity[face];

        if options.plateau_pente {
            let out_forward = back.map(|b| cells[b].delta_front).unwrap_or([0.0; MAX_PHI]);
            let out_backward = front.map(|c| cells[c].delta_back).unwrap_or([0.0; MAX_PHI]);
            for k in 0..width {
                flux[k] = length * (out_forward[k] - out_backward[k]);
            }
            return flux;
        }

        let donor = if u > 0.0 { back } else { front };
        let Some(donor) = donor else {
            return flux;
        };
        if u == 0.0 {
            return flux;
        }

        if options.order == 3 {
            let (h, values) = six_cell_stencil(mesh, axis, back.unwrap_or(donor), front.unwrap_or(donor), &phi, &geom);
            let integrated = third_order_flux_vec(width, &h, values, u * input.dt);
            for k in 0..width {
                flux[k] = length * integrated[k];
            }
        } else {
            let offset = (geometry::face_center(mesh, face, input.coords) - geom[donor].center).along(axis);
            for k in 0..width {
                let value = phi[donor][k] + offset * cells[donor].grad[k];
                flux[k] = u * length * input.dt * value;
            }
        }
        flux
    });

    // Pass 5: flux balance
    let bc_active = flux_boundary.is_active();
    let conserved: Vec<PhiVec> = parallel::map_collect(n_cells, |c| {
        let cell = CellIndex::new(c);
        let mut u = input.conserved[c];
        let back = &face_flux[mesh.back_face(cell, axis)];
        let front = &face_flux[mesh.front_face(cell, axis)];
        for k in 0..width {
            u[k] += back[k] - front[k];
        }
        if bc_active && mesh.is_boundary_cell(cell) {
            let inflow = flux_boundary.inflow(mesh, cell, axis, input.coords, input.dt);
            for k in 0..width {
                u[k] += inflow[k];
            }
        }
        u
    });

    let bounded_cell_flux = if options.plateau_pente {
        parallel::map_collect(n_cells, |c| {
            let cell = CellIndex::new(c);
            let mean_length = 0.5
                * (projected_length(mesh, mesh.back_face(cell, axis), input.coords, axis)
                    + projected_length(mesh, mesh.front_face(cell, axis), input.coords, axis));
            let mut net = [0.0; MAX_PHI];
            for k in 0..width {
                net[k] = mean_length * (cells[c].delta_front[k] - cells[c].delta_back[k]);
            }
            net
        })
    } else {
        Vec::new()
    };

    SweepOutput {
        conserved,
        face_flux,
        bounded_cell_flux,
    }
}

/// Widths and Φ of `[b3, b2, b1, f1, f2, f3]` around the face between
/// `b1` and `f1`, repeating the last cell at the boundary.
fn six_cell_stencil<'a, M: MeshTopology + ?Sized>(
    mesh: &M,
    axis: Axis,
    b1: CellIndex,
    f1: CellIndex,
    phi: &'a [PhiVec],
    geom: &[CellGeometry],
) -> ([f64; 6], [&'a PhiVec; 6]) {
    let b2 = mesh.back_cell(b1, axis).unwrap_or(b1);
    let b3 = mesh.back_cell(b2, axis).unwrap_or(b2);
    let f2 = mesh.front_cell(f1, axis).unwrap_or(f1);
    let f3 = mesh.front_cell(f2, axis).unwrap_or(f2);
    let cells = [b3, b2, b1, f1, f2, f3];
    (cells.map(|c| geom[c].width), cells.map(|c| &phi[c]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::CartesianMesh2D;
    use crate::types::Sides;

    fn options(order: u8, plateau_pente: bool, limiter: LimiterKind) -> SweepOptions {
        SweepOptions {
            layout: PhiLayout::new(1),
            order,
            plateau_pente,
            mixed_cell_limiting: false,
            limiter,
            pure_limiter: limiter,
        }
    }

    /// Single-material conserved vector of a unit-area cell.
    fn state(density: f64, energy: f64) -> PhiVec {
        let mut u = [0.0; MAX_PHI];
        u[0] = 1.0;
        u[1] = density;
        u[2] = density * energy;
        u
    }

    #[test]
    fn test_pure_material_indicator() {
        assert_eq!(pure_material(&[1.0, 0.0, 0.0], 1e-10), Some(0));
        assert_eq!(pure_material(&[0.0, 1.0, 1e-12], 1e-10), Some(1));
        assert_eq!(pure_material(&[0.5, 0.5, 0.0], 1e-10), None);
        assert_eq!(pure_material(&[0.0, 0.0, 0.0], 1e-10), None);
    }

    #[test]
    fn test_pure_materials_follow_remapped_volumes() {
        let layout = PhiLayout::new(2);
        let mut pure_cell = [0.0; MAX_PHI];
        pure_cell[layout.volume(1)] = 0.5;
        pure_cell[layout.mass(1)] = 1.0;
        let mut mixed_cell = pure_cell;
        mixed_cell[layout.volume(0)] = 0.05;
        mixed_cell[layout.mass(0)] = 0.1;
        let empty = [0.0; MAX_PHI];
        assert_eq!(
            pure_materials(layout, &[pure_cell, mixed_cell, empty], 1e-10),
            vec![Some(1), None, None]
        );
    }

    #[test]
    fn test_face_velocity_from_uniform_shift() {
        let mesh = CartesianMesh2D::uniform_rectangle(0.0, 2.0, 0.0, 2.0, 2, 2).unwrap();
        let reference = mesh.node_coordinates();
        let lagrangian: Vec<_> = reference.iter().map(|r| *r + Vec2::new(0.2, 0.1)).collect();
        let along_x = face_normal_velocities(&mesh, Axis::X, &lagrangian, &reference, 0.1);
        let interior = mesh.front_face(mesh.cell_at(0, 0), Axis::X);
        assert!((along_x[interior.get()] - 2.0).abs() < 1e-12);
        for f in 0..mesh.n_faces() {
            let face = FaceIndex::new(f);
            let expected = if mesh.face_axis(face) == Axis::X { 2.0 } else { 0.0 };
            assert!((along_x[f] - expected).abs() < 1e-12, "face {f}");
        }
        let along_y = face_normal_velocities(&mesh, Axis::Y, &lagrangian, &reference, 0.1);
        assert!((along_y[mesh.front_face(mesh.cell_at(0, 0), Axis::Y).get()] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_velocity_leaves_state_unchanged() {
        let mesh = CartesianMesh2D::uniform_rectangle(0.0, 4.0, 0.0, 1.0, 4, 1).unwrap();
        let coords = mesh.node_coordinates();
        let conserved: Vec<_> = (0..4).map(|i| state(1.0 + i as f64, 2.0)).collect();
        let face_velocity = vec![0.0; mesh.n_faces()];
        let pure = vec![Some(0); 4];
        for (order, pp, lim) in [
            (1, false, LimiterKind::Minmod),
            (2, false, LimiterKind::Superbee),
            (2, true, LimiterKind::SuperbeeG),
            (3, false, LimiterKind::Minmod),
        ] {
            let out = directional_sweep(
                &mesh,
                &options(order, pp, lim),
                &FluxBoundary::new(&Sides::default(), 7),
                &SweepInput {
                    axis: Axis::X,
                    coords: &coords,
                    face_velocity: &face_velocity,
                    conserved: &conserved,
                    pure_material: &pure,
                    dt: 0.1,
                },
            );
            for (a, b) in out.conserved.iter().zip(&conserved) {
                for k in 0..7 {
                    assert!((a[k] - b[k]).abs() < 1e-14, "order {order} pp {pp}");
                }
            }
        }
    }

    #[test]
    fn test_first_order_upwind_transfer() {
        let mesh = CartesianMesh2D::uniform_rectangle(0.0, 2.0, 0.0, 1.0, 2, 1).unwrap();
        let coords = mesh.node_coordinates();
        let conserved = vec![state(2.0, 1.0), state(1.0, 1.0)];
        let mut face_velocity = vec![0.0; mesh.n_faces()];
        let interior = mesh.front_face(mesh.cell_at(0, 0), Axis::X);
        face_velocity[interior.get()] = 1.0;
        let out = directional_sweep(
            &mesh,
            &options(1, false, LimiterKind::Minmod),
            &FluxBoundary::new(&Sides::default(), 7),
            &SweepInput {
                axis: Axis::X,
                coords: &coords,
                face_velocity: &face_velocity,
                conserved: &conserved,
                pure_material: &[Some(0), Some(0)],
                dt: 0.1,
            },
        );
        // 0.1 of the left cell's volume and mass moves right
        assert!((out.conserved[0][1] - 1.8).abs() < 1e-14);
        assert!((out.conserved[1][1] - 1.2).abs() < 1e-14);
        assert!((out.conserved[0][0] - 0.9).abs() < 1e-14);
        assert!((out.face_flux[interior.get()][1] - 0.2).abs() < 1e-14);
    }

    #[test]
    fn test_face_velocity_from_displacement() {
        let mesh = CartesianMesh2D::uniform_rectangle(0.0, 2.0, 0.0, 1.0, 2, 1).unwrap();
        let reference = mesh.node_coordinates();
        let mut moved = reference.clone();
        moved[mesh.node_at(1, 0).get()].x += 0.1;
        moved[mesh.node_at(1, 1).get()].x += 0.3;
        let u = face_normal_velocities(&mesh, Axis::X, &moved, &reference, 0.5);
        let face = mesh.front_face(mesh.cell_at(0, 0), Axis::X);
        assert!((u[face.get()] - 0.4).abs() < 1e-14);
        let horizontal = mesh.front_face(mesh.cell_at(0, 0), Axis::Y);
        assert_eq!(u[horizontal.get()], 0.0);
    }

    #[test]
    fn test_projected_length_of_tilted_face() {
        let mesh = CartesianMesh2D::uniform_rectangle(0.0, 2.0, 0.0, 1.0, 2, 1).unwrap();
        let mut coords = mesh.node_coordinates();
        coords[mesh.node_at(1, 1).get()].x += 0.5;
        let face = mesh.front_face(mesh.cell_at(0, 0), Axis::X);
        assert!((projected_length(&mesh, face, &coords, Axis::X) - 1.0).abs() < 1e-14);
        assert!(projected_length(&mesh, face, &coords, Axis::Y) > 0.49);
    }
}
