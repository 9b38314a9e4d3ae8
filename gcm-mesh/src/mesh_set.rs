use crate::{Mesh, ZoneId};
use gcm_base::err;
use std::collections::BTreeMap;

/// The container the exchange protocols are handed: every zone this
/// process knows about, local or remote, keyed by zone id. Meshes are
/// never moved once inserted, so descriptors that reference a zone id
/// stay valid for the life of the process (see the descriptor-lifetime
/// design note this crate's sibling `gcm-exchange` resolves against).
#[derive(Clone, Debug, Default)]
pub struct MeshSet {
    meshes: BTreeMap<ZoneId, Mesh>,
}

impl MeshSet {
    pub fn new() -> Self {
        MeshSet::default()
    }

    pub fn insert(&mut self, mesh: Mesh) {
        self.meshes.insert(mesh.zone_id, mesh);
    }

    pub fn get(&self, zone: ZoneId) -> Option<&Mesh> {
        self.meshes.get(&zone)
    }

    pub fn get_mut(&mut self, zone: ZoneId) -> Option<&mut Mesh> {
        self.meshes.get_mut(&zone)
    }

    pub fn zones(&self) -> impl Iterator<Item = ZoneId> + '_ {
        self.meshes.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ZoneId, &Mesh)> {
        self.meshes.iter()
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Copies `values`/`coords` into `ghost_zone`'s nodes at
    /// `ghost_indices` from their authoritative twins in `owner_zone`,
    /// dereferencing each ghost's own `remote_local_id`. Used by
    /// `sync_nodes`'s intra-process fast path, where both zones live
    /// in this same `MeshSet` and no wire transfer is needed.
    ///
    /// `owner_zone` is briefly removed from the map so both it and
    /// `ghost_zone` can be borrowed at once; a `BTreeMap` has no
    /// `get_many_mut`, and the two zones are never the same mesh.
    pub fn copy_ghost_states(
        &mut self,
        ghost_zone: ZoneId,
        ghost_indices: &[u32],
        owner_zone: ZoneId,
    ) -> gcm_base::Result<()> {
        let owner_mesh = self
            .meshes
            .remove(&owner_zone)
            .ok_or_else(|| err(format!("unknown owner {owner_zone}")))?;
        let outcome = (|| -> gcm_base::Result<()> {
            let ghost_mesh = self
                .meshes
                .get_mut(&ghost_zone)
                .ok_or_else(|| err(format!("unknown ghost zone {ghost_zone}")))?;
            for &idx in ghost_indices {
                let owner_local = ghost_mesh
                    .nodes
                    .get(idx as usize)
                    .ok_or_else(|| err("ghost index out of range"))?
                    .remote_local_id;
                let owner_node = *owner_mesh
                    .nodes
                    .get(owner_local as usize)
                    .ok_or_else(|| err("owner index out of range"))?;
                ghost_mesh.nodes[idx as usize].adopt_state(&owner_node);
            }
            Ok(())
        })();
        self.meshes.insert(owner_zone, owner_mesh);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Node;

    #[test]
    fn copy_ghost_states_dereferences_remote_local_id() {
        let mut set = MeshSet::new();

        let mut owner = Mesh::new(ZoneId(1));
        owner.nodes = vec![
            Node::new_local(0, ZoneId(1), [0.0; 3]),
            Node::new_local(1, ZoneId(1), [1.0, 2.0, 3.0]),
        ];
        owner.nodes[1].values[0] = 42.0;
        set.insert(owner);

        let mut ghost_mesh = Mesh::new(ZoneId(0));
        ghost_mesh.nodes = vec![Node::new_ghost(0, ZoneId(0), ZoneId(1), 1)];
        set.insert(ghost_mesh);

        set.copy_ghost_states(ZoneId(0), &[0], ZoneId(1)).unwrap();

        let ghost = &set.get(ZoneId(0)).unwrap().nodes[0];
        assert_eq!(ghost.values[0], 42.0);
        assert_eq!(ghost.coords, [1.0, 2.0, 3.0]);
    }

    #[test]
    fn copy_ghost_states_rejects_unknown_owner_zone() {
        let mut set = MeshSet::new();
        set.insert(Mesh::new(ZoneId(0)));
        assert!(set.copy_ghost_states(ZoneId(0), &[], ZoneId(9)).is_err());
    }
}
