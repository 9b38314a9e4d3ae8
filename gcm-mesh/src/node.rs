use crate::ZoneId;
use serde::{Deserialize, Serialize};

/// Whether a node's authoritative state lives in this zone or is a
/// ghost copy mirrored in from another.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Placement {
    Local,
    Remote,
}

/// A single mesh vertex, carrying both its coordinates and the
/// grid-characteristic state vector. For `placement == Remote`, the
/// `values`/`coords` here are a ghost copy whose owner is identified
/// by `(remote_zone_id, remote_local_id)`; `sync_nodes` is the only
/// thing that may overwrite them.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub local_id: u32,
    pub local_zone_id: ZoneId,
    pub remote_zone_id: ZoneId,
    pub remote_local_id: u32,
    pub placement: Placement,
    pub coords: [f32; 3],
    pub values: [f32; 13],
}

impl Node {
    pub fn new_local(local_id: u32, local_zone_id: ZoneId, coords: [f32; 3]) -> Self {
        Node {
            local_id,
            local_zone_id,
            remote_zone_id: local_zone_id,
            remote_local_id: local_id,
            placement: Placement::Local,
            coords,
            values: [0.0; 13],
        }
    }

    pub fn new_ghost(
        local_id: u32,
        local_zone_id: ZoneId,
        remote_zone_id: ZoneId,
        remote_local_id: u32,
    ) -> Self {
        Node {
            local_id,
            local_zone_id,
            remote_zone_id,
            remote_local_id,
            placement: Placement::Remote,
            coords: [0.0; 3],
            values: [0.0; 13],
        }
    }

    pub fn is_ghost(&self) -> bool {
        matches!(self.placement, Placement::Remote)
    }

    /// Overwrites this node's physical state from an authoritative
    /// twin, leaving identity fields (`local_id`, `placement`, ...)
    /// untouched. This is the payload of every `sync_nodes` write.
    pub fn adopt_state(&mut self, authoritative: &Node) {
        self.values = authoritative.values;
        self.coords = authoritative.coords;
    }
}

/// The wire shape carried by a node-state exchange: just the
/// `values`/`coords` block, addressed by the receiver's own index
/// into its node array. This is the Rust analogue of `MPI_ELNODE`,
/// the indexed record built over `values[13]` and `coords[3]` at
/// their real offsets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeState {
    pub coords: [f32; 3],
    pub values: [f32; 13],
}

impl From<&Node> for NodeState {
    fn from(node: &Node) -> Self {
        NodeState {
            coords: node.coords,
            values: node.values,
        }
    }
}

/// The wire shape for halo transfers that must also carry identity
/// (the faces/tetrahedra protocols materialise nodes they have never
/// seen before, so a bare `NodeState` is not enough): the Rust
/// analogue of `MPI_ELNODE_NUMBERED`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NumberedNode {
    pub local_id: u32,
    pub state: NodeState,
}

impl From<&Node> for NumberedNode {
    fn from(node: &Node) -> Self {
        NumberedNode {
            local_id: node.local_id,
            state: NodeState::from(node),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adopt_state_copies_physics_leaves_identity() {
        let mut ghost = Node::new_ghost(3, ZoneId(0), ZoneId(1), 7);
        let mut owner = Node::new_local(7, ZoneId(1), [1.0, 2.0, 3.0]);
        owner.values[0] = 9.5;

        ghost.adopt_state(&owner);

        assert_eq!(ghost.coords, owner.coords);
        assert_eq!(ghost.values, owner.values);
        assert_eq!(ghost.local_id, 3);
        assert_eq!(ghost.remote_local_id, 7);
    }
}
