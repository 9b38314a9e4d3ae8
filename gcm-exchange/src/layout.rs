//! Per-pair index tables and the indexed-gather descriptors built
//! from them -- the Rust analogue of the original solver's strided
//! MPI datatypes, expressed here as plain index lists resolved
//! against a zone id rather than raw memory offsets (see the
//! descriptor-lifetime design note in this crate's documentation).

use crate::tags;
use crate::Fault;
use gcm_mesh::{Mesh, ZoneId};
use gcm_net::{Rank, Transport};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// `local_numbers[(i, j)]` / `remote_numbers[(i, j)]`: the ordered
/// index lists for zone pair `(i, j)`. What each list means depends
/// on which of `i`/`j` this process owns -- see
/// [`LayoutRegistry::setup_pair_index_table`].
#[derive(Clone, Debug, Default)]
pub struct PairIndexTable {
    pub local_numbers: BTreeMap<(ZoneId, ZoneId), Vec<u32>>,
    pub remote_numbers: BTreeMap<(ZoneId, ZoneId), Vec<u32>>,
}

impl PairIndexTable {
    /// Walks every locally-owned mesh's ghost nodes, filling
    /// `local_numbers[(i, j)]` with the ghost's own local id in zone
    /// `i` and `remote_numbers[(i, j)]` with the index the ghost
    /// names in zone `j`'s own array. Zones this process does not own
    /// are not scanned.
    pub fn scan_local<'a>(
        meshes: impl Iterator<Item = (ZoneId, &'a Mesh)>,
        self_rank: Rank,
        zone_map: &super::ZoneMap,
    ) -> Result<PairIndexTable, Fault> {
        let mut table = PairIndexTable::default();
        for (zone_id, mesh) in meshes {
            if zone_map.owner(zone_id)? != self_rank {
                continue;
            }
            for node in &mesh.nodes {
                if node.is_ghost() {
                    let j = node.remote_zone_id;
                    table
                        .local_numbers
                        .entry((zone_id, j))
                        .or_default()
                        .push(node.local_id);
                    table
                        .remote_numbers
                        .entry((zone_id, j))
                        .or_default()
                        .push(node.remote_local_id);
                }
            }
        }
        Ok(table)
    }
}

/// An indexed gather over one zone's node array: the indices named
/// here select which elements of `zone`'s own array this descriptor
/// reads (send side) or writes (receive side).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Descriptor {
    pub zone: ZoneId,
    pub indices: Vec<u32>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
struct NodeTypeHeader {
    count: u32,
    i: u32,
    j: u32,
}

/// Builds and caches the per-pair node descriptors; committed
/// descriptors live for the process lifetime until
/// [`LayoutRegistry::release_node_descriptors`] is called at teardown.
#[derive(Default)]
pub struct LayoutRegistry {
    node_descriptors: BTreeMap<(ZoneId, ZoneId), Descriptor>,
}

impl LayoutRegistry {
    pub fn new() -> Self {
        LayoutRegistry::default()
    }

    /// Runs the setup protocol described in the module docs: scans
    /// locally-owned meshes, then symmetrises cross-process pairs
    /// over the transport so each owner of `j` learns the index list
    /// it must gather to supply `i`'s ghosts. Same-process pairs never
    /// touch the network -- the fast path in `sync_nodes` dereferences
    /// them directly.
    pub fn setup_pair_index_table<'a, T: Transport>(
        &mut self,
        meshes: impl Iterator<Item = (ZoneId, &'a Mesh)>,
        zone_map: &super::ZoneMap,
        transport: &T,
    ) -> gcm_base::Result<PairIndexTable> {
        let self_rank = transport.rank();
        let mut table = PairIndexTable::scan_local(meshes, self_rank, zone_map)?;
        self.symmetrize(&mut table, zone_map, transport)?;
        self.build_node_pair_descriptors(&table, zone_map, self_rank)?;
        Ok(table)
    }

    fn symmetrize<T: Transport>(
        &self,
        table: &mut PairIndexTable,
        zone_map: &super::ZoneMap,
        transport: &T,
    ) -> gcm_base::Result<()> {
        let self_rank = transport.rank();
        debug!(target: "gcm::exchange", "pair index table setup: send phase");

        let mut pending = Vec::new();
        for (&(i, j), remote_list) in table.remote_numbers.iter() {
            let owner_i = zone_map.owner(i)?;
            let owner_j = zone_map.owner(j)?;
            if owner_i != self_rank || owner_i == owner_j {
                continue;
            }
            let header = [NodeTypeHeader {
                count: remote_list.len() as u32,
                i: i.0,
                j: j.0,
            }];
            pending.push(transport.isend(owner_j, tags::SYNC_NODE_TYPES_I, &header));
            pending.push(transport.isend(owner_j, tags::SYNC_NODE_TYPES, remote_list));
        }
        transport.barrier();

        debug!(target: "gcm::exchange", "pair index table setup: probe-drain phase");
        loop {
            let Some(source) = transport.try_probe_any(tags::SYNC_NODE_TYPES_I) else {
                break;
            };
            let headers: Vec<NodeTypeHeader> = transport.recv(source, tags::SYNC_NODE_TYPES_I)?;
            let header = headers.into_iter().next().ok_or_else(|| {
                gcm_base::Error::from(Fault::ProtocolDesync(
                    "missing node-type header".to_string(),
                ))
            })?;
            let list: Vec<u32> = transport.recv(source, tags::SYNC_NODE_TYPES)?;
            if list.len() != header.count as usize {
                return Err(Fault::DescriptorMismatch {
                    expected: header.count as usize,
                    actual: list.len(),
                }
                .into());
            }
            let key = (ZoneId(header.i), ZoneId(header.j));
            table.local_numbers.insert(key, list.clone());
            table.remote_numbers.insert(key, list);
        }

        transport.barrier();
        for send in pending {
            send.wait();
        }
        transport.barrier();
        debug!(target: "gcm::exchange", "pair index table setup: done");
        Ok(())
    }

    /// For every `(i, j)` whose pair spans two different processes,
    /// cache an indexed descriptor over whichever zone of `{i, j}`
    /// this process owns locally. Same-process pairs are skipped:
    /// the fast path never needs a descriptor for them.
    pub fn build_node_pair_descriptors(
        &mut self,
        table: &PairIndexTable,
        zone_map: &super::ZoneMap,
        self_rank: Rank,
    ) -> Result<(), Fault> {
        for (&(i, j), indices) in table.local_numbers.iter() {
            if indices.is_empty() {
                continue;
            }
            let owner_i = zone_map.owner(i)?;
            let owner_j = zone_map.owner(j)?;
            if owner_i == owner_j {
                continue;
            }
            let zone = if owner_i == self_rank { i } else { j };
            self.node_descriptors.insert(
                (i, j),
                Descriptor {
                    zone,
                    indices: indices.clone(),
                },
            );
        }
        Ok(())
    }

    pub fn node_descriptor(&self, i: ZoneId, j: ZoneId) -> Option<&Descriptor> {
        self.node_descriptors.get(&(i, j))
    }

    /// Generic indexed gather, built transiently and released by the
    /// caller at the end of a face/tetrahedron sync.
    pub fn build_indexed(&self, zone: ZoneId, indices: Vec<u32>) -> Descriptor {
        Descriptor { zone, indices }
    }

    pub fn release_node_descriptors(&mut self) {
        self.node_descriptors.clear();
    }
}
