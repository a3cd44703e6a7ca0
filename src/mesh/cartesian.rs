//! Logically Cartesian quadrilateral mesh.
//!
//! Numbering:
//! - Node `(i, j)`, `0 <= i <= nx`, `0 <= j <= ny`: `j * (nx + 1) + i`
//! - Cell `(i, j)`, `0 <= i < nx`, `0 <= j < ny`: `j * nx + i`; its
//!   bottom-left node is node `(i, j)`
//! - Vertical faces (normal along x) first: face `(i, j)` with `0 <= i <= nx`
//!   at `j * (nx + 1) + i`, then horizontal faces (normal along y): face
//!   `(i, j)` with `0 <= j <= ny` at `n_vertical + j * nx + i`
//!
//! Face convention (counterclockwise around a cell):
//! - Face 0 (bottom): from node 0 to node 1
//! - Face 1 (right):  from node 1 to node 2
//! - Face 2 (top):    from node 2 to node 3
//! - Face 3 (left):   from node 3 to node 0

use super::topology::MeshTopology;
use crate::error::HydroError;
use crate::types::{Axis, CellIndex, FaceIndex, NodeIndex, Side, Sides, Vec2};

/// Structured quadrilateral mesh of a rectangle.
#[derive(Clone, Debug)]
pub struct CartesianMesh2D {
    /// Cells along x
    pub nx: usize,
    /// Cells along y
    pub ny: usize,
    /// Domain extent `[x0, x1] × [y0, y1]`
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
    cells_of_node: Vec<Vec<CellIndex>>,
    vertical_faces: Vec<FaceIndex>,
    horizontal_faces: Vec<FaceIndex>,
}

impl CartesianMesh2D {
    /// Create a uniform rectangular mesh of `[x0, x1] × [y0, y1]`.
    ///
    /// # Arguments
    /// * `x0`, `x1` - x-coordinate bounds
    /// * `y0`, `y1` - y-coordinate bounds
    /// * `nx` - number of cells in x-direction
    /// * `ny` - number of cells in y-direction
    pub fn uniform_rectangle(
        x0: f64,
        x1: f64,
        y0: f64,
        y1: f64,
        nx: usize,
        ny: usize,
    ) -> Result<Self, HydroError> {
        if nx == 0 || ny == 0 || x1 <= x0 || y1 <= y0 {
            return Err(HydroError::MeshMismatch(format!(
                "degenerate rectangle [{x0}, {x1}] x [{y0}, {y1}] with {nx}x{ny} cells"
            )));
        }

        let n_nodes = (nx + 1) * (ny + 1);
        let mut cells_of_node = vec![Vec::with_capacity(4); n_nodes];
        for j in 0..ny {
            for i in 0..nx {
                let cell = CellIndex::new(j * nx + i);
                for (ni, nj) in [(i, j), (i + 1, j), (i + 1, j + 1), (i, j + 1)] {
                    cells_of_node[nj * (nx + 1) + ni].push(cell);
                }
            }
        }

        let n_vertical = (nx + 1) * ny;
        let n_horizontal = nx * (ny + 1);
        let vertical_faces = FaceIndex::iter(n_vertical).collect();
        let horizontal_faces = (n_vertical..n_vertical + n_horizontal)
            .map(FaceIndex::new)
            .collect();

        Ok(Self {
            nx,
            ny,
            x0,
            x1,
            y0,
            y1,
            cells_of_node,
            vertical_faces,
            horizontal_faces,
        })
    }

    /// Uniform cell widths `(dx, dy)`.
    pub fn spacing(&self) -> (f64, f64) {
        (
            (self.x1 - self.x0) / self.nx as f64,
            (self.y1 - self.y0) / self.ny as f64,
        )
    }

    /// Reference (Eulerian) node coordinates.
    pub fn node_coordinates(&self) -> Vec<Vec2> {
        let (dx, dy) = self.spacing();
        let mut coords = Vec::with_capacity(self.n_nodes());
        for j in 0..=self.ny {
            for i in 0..=self.nx {
                coords.push(Vec2::new(self.x0 + i as f64 * dx, self.y0 + j as f64 * dy));
            }
        }
        coords
    }

    #[inline]
    pub fn cell_ij(&self, cell: CellIndex) -> (usize, usize) {
        (cell.get() % self.nx, cell.get() / self.nx)
    }

    #[inline]
    pub fn node_ij(&self, node: NodeIndex) -> (usize, usize) {
        (node.get() % (self.nx + 1), node.get() / (self.nx + 1))
    }

    #[inline]
    pub fn cell_at(&self, i: usize, j: usize) -> CellIndex {
        CellIndex::new(j * self.nx + i)
    }

    #[inline]
    pub fn node_at(&self, i: usize, j: usize) -> NodeIndex {
        NodeIndex::new(j * (self.nx + 1) + i)
    }

    #[inline]
    fn vertical_face(&self, i: usize, j: usize) -> FaceIndex {
        FaceIndex::new(j * (self.nx + 1) + i)
    }

    #[inline]
    fn horizontal_face(&self, i: usize, j: usize) -> FaceIndex {
        FaceIndex::new(self.vertical_faces.len() + j * self.nx + i)
    }

    /// Cell `(i, j)` if inside the grid, accepting signed offsets.
    fn checked_cell(&self, i: isize, j: isize) -> Option<CellIndex> {
        if i < 0 || j < 0 || i >= self.nx as isize || j >= self.ny as isize {
            None
        } else {
            Some(self.cell_at(i as usize, j as usize))
        }
    }
}

impl MeshTopology for CartesianMesh2D {
    fn n_cells(&self) -> usize {
        self.nx * self.ny
    }

    fn n_nodes(&self) -> usize {
        (self.nx + 1) * (self.ny + 1)
    }

    fn n_faces(&self) -> usize {
        self.vertical_faces.len() + self.horizontal_faces.len()
    }

    fn nodes_of(&self, cell: CellIndex) -> [NodeIndex; 4] {
        let (i, j) = self.cell_ij(cell);
        [
            self.node_at(i, j),
            self.node_at(i + 1, j),
            self.node_at(i + 1, j + 1),
            self.node_at(i, j + 1),
        ]
    }

    fn faces_of(&self, cell: CellIndex) -> [FaceIndex; 4] {
        let (i, j) = self.cell_ij(cell);
        [
            self.horizontal_face(i, j),
            self.vertical_face(i + 1, j),
            self.horizontal_face(i, j + 1),
            self.vertical_face(i, j),
        ]
    }

    fn cells_of(&self, node: NodeIndex) -> &[CellIndex] {
        &self.cells_of_node[node]
    }

    fn neighbor_across(&self, cell: CellIndex, local_face: usize) -> Option<CellIndex> {
        let (i, j) = self.cell_ij(cell);
        let (i, j) = (i as isize, j as isize);
        match local_face {
            0 => self.checked_cell(i, j - 1),
            1 => self.checked_cell(i + 1, j),
            2 => self.checked_cell(i, j + 1),
            3 => self.checked_cell(i - 1, j),
            _ => None,
        }
    }

    fn face_nodes(&self, face: FaceIndex) -> [NodeIndex; 2] {
        let n_vertical = self.vertical_faces.len();
        if face.get() < n_vertical {
            let (i, j) = (face.get() % (self.nx + 1), face.get() / (self.nx + 1));
            [self.node_at(i, j), self.node_at(i, j + 1)]
        } else {
            let k = face.get() - n_vertical;
            let (i, j) = (k % self.nx, k / self.nx);
            [self.node_at(i, j), self.node_at(i + 1, j)]
        }
    }

    fn face_axis(&self, face: FaceIndex) -> Axis {
        if face.get() < self.vertical_faces.len() {
            Axis::X
        } else {
            Axis::Y
        }
    }

    fn face_cells(&self, face: FaceIndex) -> (Option<CellIndex>, Option<CellIndex>) {
        let n_vertical = self.vertical_faces.len();
        if face.get() < n_vertical {
            let (i, j) = (face.get() % (self.nx + 1), face.get() / (self.nx + 1));
            let (i, j) = (i as isize, j as isize);
            (self.checked_cell(i - 1, j), self.checked_cell(i, j))
        } else {
            let k = face.get() - n_vertical;
            let (i, j) = ((k % self.nx) as isize, (k / self.nx) as isize);
            (self.checked_cell(i, j - 1), self.checked_cell(i, j))
        }
    }

    fn faces_normal_to(&self, axis: Axis) -> &[FaceIndex] {
        match axis {
            Axis::X => &self.vertical_faces,
            Axis::Y => &self.horizontal_faces,
        }
    }

    fn face_side(&self, face: FaceIndex) -> Option<Side> {
        match (self.face_axis(face), self.face_cells(face)) {
            (Axis::X, (None, Some(_))) => Some(Side::Left),
            (Axis::X, (Some(_), None)) => Some(Side::Right),
            (Axis::Y, (None, Some(_))) => Some(Side::Bottom),
            (Axis::Y, (Some(_), None)) => Some(Side::Top),
            _ => None,
        }
    }

    fn node_sides(&self, node: NodeIndex) -> Sides<bool> {
        let (i, j) = self.node_ij(node);
        Sides::new(i == 0, i == self.nx, j == 0, j == self.ny)
    }

    fn back_node(&self, node: NodeIndex, axis: Axis) -> Option<NodeIndex> {
        let (i, j) = self.node_ij(node);
        match axis {
            Axis::X if i > 0 => Some(self.node_at(i - 1, j)),
            Axis::Y if j > 0 => Some(self.node_at(i, j - 1)),
            _ => None,
        }
    }

    fn front_node(&self, node: NodeIndex, axis: Axis) -> Option<NodeIndex> {
        let (i, j) = self.node_ij(node);
        match axis {
            Axis::X if i < self.nx => Some(self.node_at(i + 1, j)),
            Axis::Y if j < self.ny => Some(self.node_at(i, j + 1)),
            _ => None,
        }
    }

    fn cells_ahead_of_node(&self, node: NodeIndex, axis: Axis) -> [Option<CellIndex>; 2] {
        let (i, j) = self.node_ij(node);
        let (i, j) = (i as isize, j as isize);
        match axis {
            Axis::X => [self.checked_cell(i, j - 1), self.checked_cell(i, j)],
            Axis::Y => [self.checked_cell(i - 1, j), self.checked_cell(i, j)],
        }
    }

    fn cells_behind_node(&self, node: NodeIndex, axis: Axis) -> [Option<CellIndex>; 2] {
        let (i, j) = self.node_ij(node);
        let (i, j) = (i as isize, j as isize);
        match axis {
            Axis::X => [self.checked_cell(i - 1, j - 1), self.checked_cell(i - 1, j)],
            Axis::Y => [self.checked_cell(i - 1, j - 1), self.checked_cell(i, j - 1)],
        }
    }
}
