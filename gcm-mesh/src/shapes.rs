use serde::{Deserialize, Serialize};

/// A border-surface triangle: three node-local indices into the
/// enclosing zone's node array.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Face {
    pub local_id: u32,
    pub vertex_indices: [u32; 3],
}

/// The wire shape for a face carried in a halo transfer, the Rust
/// analogue of `MPI_FACE_NUMBERED`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct NumberedFace {
    pub local_id: u32,
    pub vertex_indices: [u32; 3],
}

impl From<&Face> for NumberedFace {
    fn from(f: &Face) -> Self {
        NumberedFace {
            local_id: f.local_id,
            vertex_indices: f.vertex_indices,
        }
    }
}

/// A first-order tetrahedron: four node-local indices.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Tetrahedron {
    pub local_id: u32,
    pub vertex_indices: [u32; 4],
}

/// The wire shape for a tetrahedron carried in a halo transfer, the
/// Rust analogue of `MPI_TETR_NUMBERED`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct NumberedTetrahedron {
    pub local_id: u32,
    pub vertex_indices: [u32; 4],
}

impl From<&Tetrahedron> for NumberedTetrahedron {
    fn from(t: &Tetrahedron) -> Self {
        NumberedTetrahedron {
            local_id: t.local_id,
            vertex_indices: t.vertex_indices,
        }
    }
}
