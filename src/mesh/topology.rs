//! Mesh topology consumed by the Lagrangian and remap phases.
//!
//! The trait exposes exactly the queries the solver needs:
//!
//! - Element connectivity: nodes, faces and cells around a node
//! - Neighbour across a local face, `None` at the domain boundary
//! - Directional adjacency along a sweep axis (back/front = left/right for
//!   `Axis::X`, bottom/top for `Axis::Y`) for cells, faces and nodes
//! - The virtual dual faces of a node: the cells directly ahead of and
//!   behind it along an axis
//!
//! Coordinates are not part of the topology; they move every step and are
//! passed to the geometry helpers in [`super::geometry`] instead.

use crate::types::{Axis, CellIndex, FaceIndex, NodeIndex, Side, Sides};

/// Local face numbering, counterclockwise from the bottom.
pub const FACE_BOTTOM: usize = 0;
pub const FACE_RIGHT: usize = 1;
pub const FACE_TOP: usize = 2;
pub const FACE_LEFT: usize = 3;

/// Topology of a logically structured quadrilateral mesh.
pub trait MeshTopology: Send + Sync {
    fn n_cells(&self) -> usize;
    fn n_nodes(&self) -> usize;
    fn n_faces(&self) -> usize;

    /// Nodes of a cell, counterclockwise starting bottom-left.
    fn nodes_of(&self, cell: CellIndex) -> [NodeIndex; 4];

    /// Faces of a cell in local order bottom, right, top, left.
    ///
    /// Local face `k` runs from node `k` to node `k + 1` of [`Self::nodes_of`].
    fn faces_of(&self, cell: CellIndex) -> [FaceIndex; 4];

    /// Cells sharing a node.
    fn cells_of(&self, node: NodeIndex) -> &[CellIndex];

    /// Cell across local face `local_face`, `None` on the boundary.
    fn neighbor_across(&self, cell: CellIndex, local_face: usize) -> Option<CellIndex>;

    /// End nodes of a face, ordered along the transverse axis.
    fn face_nodes(&self, face: FaceIndex) -> [NodeIndex; 2];

    /// Axis the face normal points along.
    fn face_axis(&self, face: FaceIndex) -> Axis;

    /// `(back, front)` cells of a face along its normal axis.
    fn face_cells(&self, face: FaceIndex) -> (Option<CellIndex>, Option<CellIndex>);

    /// Every face whose normal points along `axis`.
    fn faces_normal_to(&self, axis: Axis) -> &[FaceIndex];

    /// Domain side of a boundary face.
    fn face_side(&self, face: FaceIndex) -> Option<Side>;

    /// Which domain sides a node lies on.
    fn node_sides(&self, node: NodeIndex) -> Sides<bool>;

    fn back_face(&self, cell: CellIndex, axis: Axis) -> FaceIndex {
        let faces = self.faces_of(cell);
        match axis {
            Axis::X => faces[FACE_LEFT],
            Axis::Y => faces[FACE_BOTTOM],
        }
    }

    fn front_face(&self, cell: CellIndex, axis: Axis) -> FaceIndex {
        let faces = self.faces_of(cell);
        match axis {
            Axis::X => faces[FACE_RIGHT],
            Axis::Y => faces[FACE_TOP],
        }
    }

    fn back_cell(&self, cell: CellIndex, axis: Axis) -> Option<CellIndex> {
        match axis {
            Axis::X => self.neighbor_across(cell, FACE_LEFT),
            Axis::Y => self.neighbor_across(cell, FACE_BOTTOM),
        }
    }

    fn front_cell(&self, cell: CellIndex, axis: Axis) -> Option<CellIndex> {
        match axis {
            Axis::X => self.neighbor_across(cell, FACE_RIGHT),
            Axis::Y => self.neighbor_across(cell, FACE_TOP),
        }
    }

    fn left_cell(&self, cell: CellIndex) -> Option<CellIndex> {
        self.back_cell(cell, Axis::X)
    }

    fn right_cell(&self, cell: CellIndex) -> Option<CellIndex> {
        self.front_cell(cell, Axis::X)
    }

    fn bottom_cell(&self, cell: CellIndex) -> Option<CellIndex> {
        self.back_cell(cell, Axis::Y)
    }

    fn top_cell(&self, cell: CellIndex) -> Option<CellIndex> {
        self.front_cell(cell, Axis::Y)
    }

    /// Neighbouring node behind `node` along `axis`.
    fn back_node(&self, node: NodeIndex, axis: Axis) -> Option<NodeIndex>;

    /// Neighbouring node ahead of `node` along `axis`.
    fn front_node(&self, node: NodeIndex, axis: Axis) -> Option<NodeIndex>;

    /// The (up to) two cells ahead of a node along `axis`.
    ///
    /// Together they carry the front dual face of the node.
    fn cells_ahead_of_node(&self, node: NodeIndex, axis: Axis) -> [Option<CellIndex>; 2];

    /// The (up to) two cells behind a node along `axis`.
    fn cells_behind_node(&self, node: NodeIndex, axis: Axis) -> [Option<CellIndex>; 2];

    /// `true` when a cell has no neighbour across some face.
    fn is_boundary_cell(&self, cell: CellIndex) -> bool {
        (0..4).any(|f| self.neighbor_across(cell, f).is_none())
    }
}
