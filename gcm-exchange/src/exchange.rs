//! `ExchangeEngine`: the four protocols that keep every process's
//! ghost data current between simulation steps -- node-state sync,
//! bounding-box all-gather, and the two sentinel-drained halo syncs
//! (faces in a collision intersection, tetrahedra behind a border
//! face).

use crate::{tags, Fault, LayoutRegistry, PairIndexTable, ZoneMap};
use gcm_collision::CollisionDetector;
use gcm_mesh::{Mesh, MeshSet, NodeState, NumberedFace, NumberedNode, NumberedTetrahedron, Outline, ZoneId};
use gcm_net::{Rank, Transport};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// A request target for the tetrahedron halo: "zone `target_zone`'s
/// border face `face_local_id`", produced by collision detection on
/// the face halo that preceded it.
#[derive(Clone, Copy, Debug)]
pub struct VirtNode {
    pub target_zone: ZoneId,
    pub face_local_id: u32,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
struct PairHeader {
    i: i32,
    j: i32,
}

impl PairHeader {
    fn sentinel() -> Self {
        PairHeader { i: -1, j: -1 }
    }

    fn is_sentinel(&self) -> bool {
        self.i < 0
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
struct FacesRespHeader {
    new_faces: u32,
    new_nodes: u32,
    i: u32,
    j: u32,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
struct TetrReqHeader {
    count: u32,
    j: u32,
}

impl TetrReqHeader {
    fn sentinel() -> Self {
        TetrReqHeader { count: u32::MAX, j: 0 }
    }

    fn is_sentinel(&self) -> bool {
        self.count == u32::MAX
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
struct TetrRespHeader {
    new_tetrs: u32,
    new_nodes: u32,
    j: u32,
}

/// Deduplicates `value` into `into`, preserving insertion order, the
/// way the original service loops accumulate face/node/tetrahedron
/// indices by linear scan.
fn dedup_insert(into: &mut Vec<u32>, value: u32) {
    if !into.contains(&value) {
        into.push(value);
    }
}

/// Orchestrates the exchange protocols for one process. Generic over
/// the transport and collision-detector implementations rather than
/// boxed as trait objects, since both are fixed for the life of a
/// process and `Transport::all_gather_v` is itself generic (which
/// would make a `dyn Transport` impossible to call through anyway).
pub struct ExchangeEngine<T: Transport, C: CollisionDetector> {
    zone_map: ZoneMap,
    registry: LayoutRegistry,
    pair_index: PairIndexTable,
    transport: Arc<T>,
    collision: Arc<C>,
}

impl<T: Transport, C: CollisionDetector> ExchangeEngine<T, C> {
    /// Runs the `PairIndexTable` setup protocol against `meshes` (the
    /// locally-owned meshes only need be present) and returns an
    /// engine ready to sync.
    pub fn new(
        zone_map: ZoneMap,
        transport: Arc<T>,
        collision: Arc<C>,
        meshes: &MeshSet,
    ) -> gcm_base::Result<Self> {
        let mut registry = LayoutRegistry::new();
        let pair_index = registry.setup_pair_index_table(
            meshes.iter().map(|(&z, m)| (z, m)),
            &zone_map,
            &*transport,
        )?;
        Ok(ExchangeEngine {
            zone_map,
            registry,
            pair_index,
            transport,
            collision,
        })
    }

    pub fn zone_map(&self) -> &ZoneMap {
        &self.zone_map
    }

    fn self_rank(&self) -> Rank {
        self.transport.rank()
    }

    /// Overwrites every ghost node's `values`/`coords` from its
    /// authoritative twin, as of the moment this call started.
    pub fn sync_nodes(&self, meshes: &mut MeshSet) -> gcm_base::Result<()> {
        debug!(target: "gcm::exchange", "sync_nodes: start");
        let self_rank = self.self_rank();

        for (&(i, j), indices) in self.pair_index.local_numbers.iter() {
            if indices.is_empty() {
                continue;
            }
            let owner_i = self.zone_map.owner(i)?;
            let owner_j = self.zone_map.owner(j)?;
            if owner_i == self_rank && owner_j == self_rank {
                meshes.copy_ghost_states(i, indices, j)?;
            }
        }
        debug!(target: "gcm::exchange", "sync_nodes: intra-process copy done");

        let mut pending = Vec::new();
        for (&(i, j), _) in self.pair_index.local_numbers.iter() {
            let owner_i = self.zone_map.owner(i)?;
            let owner_j = self.zone_map.owner(j)?;
            if owner_i == owner_j || owner_j != self_rank {
                continue;
            }
            let Some(descriptor) = self.registry.node_descriptor(i, j) else {
                continue;
            };
            let mesh_j = meshes.get(j).ok_or(Fault::UnknownZone(j))?;
            let states: Vec<NodeState> = descriptor
                .indices
                .iter()
                .map(|&idx| NodeState::from(&mesh_j.nodes[idx as usize]))
                .collect();
            pending.push(self.transport.isend(owner_i, tags::sync_node_tag(i, j), &states));
        }
        self.transport.barrier();
        debug!(target: "gcm::exchange", "sync_nodes: network phase");

        for (&(i, j), _) in self.pair_index.local_numbers.iter() {
            let owner_i = self.zone_map.owner(i)?;
            let owner_j = self.zone_map.owner(j)?;
            if owner_i == owner_j || owner_i != self_rank {
                continue;
            }
            let Some(descriptor) = self.registry.node_descriptor(i, j) else {
                continue;
            };
            let states: Vec<NodeState> = self.transport.recv(owner_j, tags::sync_node_tag(i, j))?;
            if states.len() != descriptor.indices.len() {
                return Err(Fault::DescriptorMismatch {
                    expected: descriptor.indices.len(),
                    actual: states.len(),
                }
                .into());
            }
            let mesh_i = meshes.get_mut(i).ok_or(Fault::UnknownZone(i))?;
            for (&idx, state) in descriptor.indices.iter().zip(states) {
                mesh_i.nodes[idx as usize].coords = state.coords;
                mesh_i.nodes[idx as usize].values = state.values;
            }
        }

        for send in pending {
            send.wait();
        }
        self.transport.barrier();
        debug!(target: "gcm::exchange", "sync_nodes: done");
        Ok(())
    }

    /// All-gathers every locally-owned mesh's outline and writes the
    /// result back into every zone this process tracks in `meshes`.
    pub fn sync_outlines(&self, meshes: &mut MeshSet) -> gcm_base::Result<()> {
        debug!(target: "gcm::exchange", "sync_outlines: start");
        let self_rank = self.self_rank();
        let local: Vec<Outline> = self
            .zone_map
            .zones()
            .filter(|&z| self.zone_map.owner(z).map(|o| o == self_rank).unwrap_or(false))
            .filter_map(|z| meshes.get(z))
            .map(|m| m.outline)
            .collect();

        let gathered = self.transport.all_gather_v(&local);

        let mut idx = 0;
        for rank in 0..self.transport.world_size() as u32 {
            for zone in self.zone_map.zones() {
                if self.zone_map.owner(zone)?.0 != rank {
                    continue;
                }
                if let Some(&outline) = gathered.get(idx) {
                    if let Some(mesh) = meshes.get_mut(zone) {
                        mesh.outline = outline;
                    }
                }
                idx += 1;
            }
        }
        debug!(target: "gcm::exchange", "sync_outlines: done");
        Ok(())
    }

    /// Refreshes the border-face halo for every `(i, j)` pair with a
    /// non-degenerate `intersections[(i, j)]`, fetching from `owner(j)`
    /// the faces of zone `j` that fall inside the intersection plus
    /// their incident nodes.
    ///
    /// Simplification from the distilled protocol: each `(i, j)` pair
    /// is served as one self-contained request/response round. If a
    /// process owns two local zones that both intersect the same
    /// remote zone, that remote zone receives two independent
    /// halo contributions (appended, not merged) rather than one
    /// combined response -- see `DESIGN.md`.
    pub fn sync_faces_in_intersection(
        &mut self,
        meshes: &mut MeshSet,
        intersections: &BTreeMap<(ZoneId, ZoneId), Outline>,
    ) -> gcm_base::Result<()> {
        debug!(target: "gcm::exchange", "sync_faces_in_intersection: request phase");
        let self_rank = self.self_rank();
        let world_size = self.transport.world_size();

        let mut requested = Vec::new();
        let mut pending = Vec::new();
        for (&(i, j), outline) in intersections.iter() {
            if outline.is_degenerate() {
                continue;
            }
            let owner_j = self.zone_map.owner(j)?;
            pending.push(self.transport.isend(owner_j, tags::SYNC_FACES_REQ_Z, &[*outline]));
            pending.push(self.transport.isend(
                owner_j,
                tags::SYNC_FACES_REQ_I,
                &[PairHeader { i: i.0 as i32, j: j.0 as i32 }],
            ));
            requested.push((i, j, owner_j));
        }
        for rank in 0..world_size as u32 {
            pending.push(self.transport.isend(
                Rank(rank),
                tags::SYNC_FACES_REQ_I,
                &[PairHeader::sentinel()],
            ));
        }
        self.transport.barrier();

        debug!(target: "gcm::exchange", "sync_faces_in_intersection: service phase");
        let mut remaining_sentinels = world_size;
        let mut served: Vec<(ZoneId, ZoneId, Rank, Vec<u32>, Vec<u32>)> = Vec::new();
        while remaining_sentinels > 0 {
            let source = self.transport.probe_any(tags::SYNC_FACES_REQ_I);
            let headers: Vec<PairHeader> = self.transport.recv(source, tags::SYNC_FACES_REQ_I)?;
            let header = headers
                .into_iter()
                .next()
                .ok_or_else(|| Fault::ProtocolDesync("missing face-request header".into()))?;
            if header.is_sentinel() {
                remaining_sentinels = remaining_sentinels.checked_sub(1).ok_or_else(|| {
                    Fault::ProtocolDesync("sentinel counter went negative".into())
                })?;
                continue;
            }
            let outlines: Vec<Outline> = self.transport.recv(source, tags::SYNC_FACES_REQ_Z)?;
            let outline = outlines
                .into_iter()
                .next()
                .ok_or_else(|| Fault::ProtocolDesync("missing face-request outline".into()))?;

            let i = ZoneId(header.i as u32);
            let j = ZoneId(header.j as u32);
            let mesh_j = meshes.get(j).ok_or(Fault::UnknownZone(j))?;
            let face_idx = self.collision.faces_in_outline(&mesh_j.border, &mesh_j.nodes, &outline);
            let mut node_idx = Vec::new();
            for &f in &face_idx {
                for &v in &mesh_j.border[f as usize].vertex_indices {
                    dedup_insert(&mut node_idx, v);
                }
            }

            self.transport.isend(
                source,
                tags::SYNC_FACES_RESP,
                &[FacesRespHeader {
                    new_faces: face_idx.len() as u32,
                    new_nodes: node_idx.len() as u32,
                    i: i.0,
                    j: j.0,
                }],
            ).wait();
            served.push((j, i, source, face_idx, node_idx));
        }
        self.transport.barrier();

        debug!(target: "gcm::exchange", "sync_faces_in_intersection: transfer phase");
        let mut pending_transfer = Vec::new();
        for (j, _i, source, face_idx, node_idx) in &served {
            let mesh_j = meshes.get(*j).ok_or(Fault::UnknownZone(*j))?;
            let face_descriptor = self.registry.build_indexed(*j, face_idx.clone());
            let node_descriptor = self.registry.build_indexed(*j, node_idx.clone());
            let faces: Vec<NumberedFace> = face_descriptor
                .indices
                .iter()
                .map(|&f| NumberedFace::from(&mesh_j.border[f as usize]))
                .collect();
            let nodes: Vec<NumberedNode> = node_descriptor
                .indices
                .iter()
                .map(|&n| NumberedNode::from(&mesh_j.nodes[n as usize]))
                .collect();
            pending_transfer.push(self.transport.isend(*source, tags::SYNC_FACES_F_RESP, &faces));
            pending_transfer.push(self.transport.isend(*source, tags::SYNC_FACES_N_RESP, &nodes));
            // face_descriptor/node_descriptor are transient: dropped here, at the
            // end of this sync, per the release-before-return lifecycle.
        }

        for zone in requested.iter().map(|&(_, j, _)| j).collect::<std::collections::BTreeSet<_>>() {
            match meshes.get_mut(zone) {
                Some(mesh) => mesh.clear_remote_data(),
                None => meshes.insert(Mesh::new(zone)),
            }
        }

        // Demultiplex by the (i, j) carried in each response header,
        // not by the order our own requests went out: the far side's
        // service loop drains its request queue via `probe_any` in
        // arrival order, which need not match ours when one owner
        // serves more than one of our requests.
        let requested_pairs: std::collections::BTreeSet<(ZoneId, ZoneId)> =
            requested.iter().map(|&(i, j, _)| (i, j)).collect();
        for _ in 0..requested.len() {
            let source = self.transport.probe_any(tags::SYNC_FACES_RESP);
            let headers: Vec<FacesRespHeader> = self.transport.recv(source, tags::SYNC_FACES_RESP)?;
            let header = headers
                .into_iter()
                .next()
                .ok_or_else(|| Fault::ProtocolDesync("missing face-response header".into()))?;
            let faces: Vec<NumberedFace> = self.transport.recv(source, tags::SYNC_FACES_F_RESP)?;
            let nodes: Vec<NumberedNode> = self.transport.recv(source, tags::SYNC_FACES_N_RESP)?;
            if faces.len() != header.new_faces as usize || nodes.len() != header.new_nodes as usize {
                return Err(Fault::DescriptorMismatch {
                    expected: header.new_faces as usize + header.new_nodes as usize,
                    actual: faces.len() + nodes.len(),
                }
                .into());
            }
            let i = ZoneId(header.i);
            let j = ZoneId(header.j);
            if !requested_pairs.contains(&(i, j)) {
                return Err(Fault::ProtocolDesync(format!(
                    "face response for unrequested pair ({i}, {j})"
                ))
                .into());
            }
            let mesh = meshes.get_mut(j).ok_or(Fault::UnknownZone(j))?;
            for f in faces {
                mesh.border.push(gcm_mesh::Face {
                    local_id: f.local_id,
                    vertex_indices: f.vertex_indices,
                });
            }
            for n in nodes {
                mesh.nodes.push(gcm_mesh::Node::new_ghost(n.local_id, j, j, n.local_id));
                if let Some(last) = mesh.nodes.last_mut() {
                    last.coords = n.state.coords;
                    last.values = n.state.values;
                }
            }
        }

        for send in pending_transfer {
            send.wait();
        }
        debug!(target: "gcm::exchange", "sync_faces_in_intersection: done");
        Ok(())
    }

    /// Fetches, for each `virt_node` whose `target_zone` is not owned
    /// locally, the tetrahedra incident on its face plus their nodes.
    pub fn sync_tetrs(
        &mut self,
        meshes: &mut MeshSet,
        virt_nodes: &[VirtNode],
    ) -> gcm_base::Result<()> {
        debug!(target: "gcm::exchange", "sync_tetrs: request phase");
        let self_rank = self.self_rank();
        let world_size = self.transport.world_size();

        let mut by_zone: BTreeMap<ZoneId, Vec<u32>> = BTreeMap::new();
        for vn in virt_nodes {
            if self.zone_map.is_local(vn.target_zone, self_rank)? {
                continue;
            }
            by_zone.entry(vn.target_zone).or_default().push(vn.face_local_id);
        }

        let mut requested = Vec::new();
        let mut pending = Vec::new();
        for (&j, faces) in by_zone.iter() {
            let owner_j = self.zone_map.owner(j)?;
            pending.push(self.transport.isend(
                owner_j,
                tags::SYNC_TETRS_REQ_I,
                &[TetrReqHeader { count: faces.len() as u32, j: j.0 }],
            ));
            pending.push(self.transport.isend(owner_j, tags::SYNC_TETRS_REQ, faces));
            requested.push((j, owner_j));
        }
        for rank in 0..world_size as u32 {
            pending.push(self.transport.isend(
                Rank(rank),
                tags::SYNC_TETRS_REQ_I,
                &[TetrReqHeader::sentinel()],
            ));
        }
        self.transport.barrier();

        debug!(target: "gcm::exchange", "sync_tetrs: service phase");
        let mut remaining_sentinels = world_size;
        let mut served: Vec<(ZoneId, Rank, Vec<u32>, Vec<u32>)> = Vec::new();
        while remaining_sentinels > 0 {
            let source = self.transport.probe_any(tags::SYNC_TETRS_REQ_I);
            let headers: Vec<TetrReqHeader> = self.transport.recv(source, tags::SYNC_TETRS_REQ_I)?;
            let header = headers
                .into_iter()
                .next()
                .ok_or_else(|| Fault::ProtocolDesync("missing tetr-request header".into()))?;
            if header.is_sentinel() {
                remaining_sentinels = remaining_sentinels.checked_sub(1).ok_or_else(|| {
                    Fault::ProtocolDesync("sentinel counter went negative".into())
                })?;
                continue;
            }
            let faces: Vec<u32> = self.transport.recv(source, tags::SYNC_TETRS_REQ)?;
            if faces.len() != header.count as usize {
                return Err(Fault::DescriptorMismatch {
                    expected: header.count as usize,
                    actual: faces.len(),
                }
                .into());
            }

            let j = ZoneId(header.j);
            let mesh_j = meshes.get(j).ok_or(Fault::UnknownZone(j))?;
            let mut tetr_idx = Vec::new();
            for face_local_id in &faces {
                let face = mesh_j
                    .border
                    .get(*face_local_id as usize)
                    .ok_or_else(|| Fault::ProtocolDesync("face local id out of range".into()))?;
                for &vertex in &face.vertex_indices {
                    for &tetr in mesh_j.tetrs_incident_on(vertex) {
                        dedup_insert(&mut tetr_idx, tetr);
                    }
                }
            }
            let mut node_idx = Vec::new();
            for &t in &tetr_idx {
                for &v in &mesh_j.tetrs[t as usize].vertex_indices {
                    dedup_insert(&mut node_idx, v);
                }
            }

            self.transport.isend(
                source,
                tags::SYNC_TETRS_I_RESP,
                &[TetrRespHeader {
                    new_tetrs: tetr_idx.len() as u32,
                    new_nodes: node_idx.len() as u32,
                    j: j.0,
                }],
            ).wait();
            served.push((j, source, tetr_idx, node_idx));
        }
        self.transport.barrier();

        debug!(target: "gcm::exchange", "sync_tetrs: transfer phase");
        let mut pending_transfer = Vec::new();
        for (j, source, tetr_idx, node_idx) in &served {
            let mesh_j = meshes.get(*j).ok_or(Fault::UnknownZone(*j))?;
            let tetr_descriptor = self.registry.build_indexed(*j, tetr_idx.clone());
            let node_descriptor = self.registry.build_indexed(*j, node_idx.clone());
            let tetrs: Vec<NumberedTetrahedron> = tetr_descriptor
                .indices
                .iter()
                .map(|&t| NumberedTetrahedron::from(&mesh_j.tetrs[t as usize]))
                .collect();
            let nodes: Vec<NumberedNode> = node_descriptor
                .indices
                .iter()
                .map(|&n| NumberedNode::from(&mesh_j.nodes[n as usize]))
                .collect();
            pending_transfer.push(self.transport.isend(*source, tags::SYNC_TETRS_T_RESP, &tetrs));
            pending_transfer.push(self.transport.isend(*source, tags::SYNC_TETRS_N_RESP, &nodes));
        }

        for &(zone, _) in &requested {
            match meshes.get_mut(zone) {
                Some(mesh) => mesh.clear_remote_data(),
                None => meshes.insert(Mesh::new(zone)),
            }
        }
        // Demultiplex by the zone id carried in each response header,
        // not by the order our own requests went out: the far side's
        // service loop drains its request queue via `probe_any` in
        // arrival order, which need not match ours when one owner
        // serves more than one of our requests.
        let requested_zones: std::collections::BTreeSet<ZoneId> =
            requested.iter().map(|&(j, _)| j).collect();
        for _ in 0..requested.len() {
            let source = self.transport.probe_any(tags::SYNC_TETRS_I_RESP);
            let headers: Vec<TetrRespHeader> = self.transport.recv(source, tags::SYNC_TETRS_I_RESP)?;
            let header = headers
                .into_iter()
                .next()
                .ok_or_else(|| Fault::ProtocolDesync("missing tetr-response header".into()))?;
            let tetrs: Vec<NumberedTetrahedron> = self.transport.recv(source, tags::SYNC_TETRS_T_RESP)?;
            let nodes: Vec<NumberedNode> = self.transport.recv(source, tags::SYNC_TETRS_N_RESP)?;
            if tetrs.len() != header.new_tetrs as usize || nodes.len() != header.new_nodes as usize {
                return Err(Fault::DescriptorMismatch {
                    expected: header.new_tetrs as usize + header.new_nodes as usize,
                    actual: tetrs.len() + nodes.len(),
                }
                .into());
            }
            let j = ZoneId(header.j);
            if !requested_zones.contains(&j) {
                return Err(Fault::ProtocolDesync(format!("tetr response for unrequested zone {j}")).into());
            }
            let mesh = meshes.get_mut(j).ok_or(Fault::UnknownZone(j))?;
            for t in tetrs {
                mesh.tetrs.push(gcm_mesh::Tetrahedron {
                    local_id: t.local_id,
                    vertex_indices: t.vertex_indices,
                });
            }
            for n in nodes {
                mesh.nodes.push(gcm_mesh::Node::new_ghost(n.local_id, j, j, n.local_id));
                if let Some(last) = mesh.nodes.last_mut() {
                    last.coords = n.state.coords;
                    last.values = n.state.values;
                }
            }
            mesh.rebuild_adjacency();
        }

        for send in pending_transfer {
            send.wait();
        }
        debug!(target: "gcm::exchange", "sync_tetrs: done");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gcm_collision::BruteForceCollisionDetector;
    use gcm_mesh::Node;
    use gcm_net::InProcessTransport;
    use test_log::test;

    fn two_rank_zone_map() -> ZoneMap {
        ZoneMap::new(vec![Rank(0), Rank(1)])
    }

    #[test]
    fn sync_nodes_carries_a_pattern_across_a_one_way_ghost() {
        let fleet = InProcessTransport::fleet(2);
        let t0 = fleet[0].clone();
        let t1 = fleet[1].clone();

        std::thread::scope(|scope| {
            scope.spawn(move || {
                let mut meshes = MeshSet::new();
                let mut zone0 = Mesh::new(ZoneId(0));
                zone0.nodes = vec![0u32, 1, 2, 3, 4]
                    .into_iter()
                    .map(|id| Node::new_ghost(id, ZoneId(0), ZoneId(1), [3, 7, 11, 19, 23][id as usize]))
                    .collect();
                meshes.insert(zone0);

                let engine = ExchangeEngine::new(
                    two_rank_zone_map(),
                    t0,
                    Arc::new(BruteForceCollisionDetector),
                    &meshes,
                )
                .unwrap();
                engine.sync_nodes(&mut meshes).unwrap();

                let zone0 = meshes.get(ZoneId(0)).unwrap();
                for node in &zone0.nodes {
                    assert_eq!(node.values[0], node.remote_local_id as f32);
                }
            });
            scope.spawn(move || {
                let mut meshes = MeshSet::new();
                let mut zone1 = Mesh::new(ZoneId(1));
                zone1.nodes = (0..24).map(|id| Node::new_local(id, ZoneId(1), [0.0; 3])).collect();
                for &id in &[3u32, 7, 11, 19, 23] {
                    zone1.nodes[id as usize].values[0] = id as f32;
                }
                meshes.insert(zone1);

                let engine = ExchangeEngine::new(
                    two_rank_zone_map(),
                    t1,
                    Arc::new(BruteForceCollisionDetector),
                    &meshes,
                )
                .unwrap();
                engine.sync_nodes(&mut meshes).unwrap();
            });
        });
    }

    #[test]
    fn sync_outlines_leaves_every_rank_with_identical_content() {
        let fleet = InProcessTransport::fleet(2);
        let t0 = fleet[0].clone();
        let t1 = fleet[1].clone();
        let zm = two_rank_zone_map();
        let zm0 = zm.clone();
        let zm1 = zm.clone();

        std::thread::scope(|scope| {
            scope.spawn(move || {
                let mut meshes = MeshSet::new();
                let mut zone0 = Mesh::new(ZoneId(0));
                zone0.outline = Outline::new([0.0; 3], [1.0; 3]);
                meshes.insert(zone0);
                meshes.insert(Mesh::new(ZoneId(1)));

                let engine = ExchangeEngine::new(
                    zm0,
                    t0,
                    Arc::new(BruteForceCollisionDetector),
                    &meshes,
                )
                .unwrap();
                engine.sync_outlines(&mut meshes).unwrap();
                assert_eq!(meshes.get(ZoneId(0)).unwrap().outline, Outline::new([0.0; 3], [1.0; 3]));
                assert_eq!(meshes.get(ZoneId(1)).unwrap().outline, Outline::new([2.0; 3], [3.0; 3]));
            });
            scope.spawn(move || {
                let mut meshes = MeshSet::new();
                let mut zone1 = Mesh::new(ZoneId(1));
                zone1.outline = Outline::new([2.0; 3], [3.0; 3]);
                meshes.insert(zone1);
                meshes.insert(Mesh::new(ZoneId(0)));

                let engine = ExchangeEngine::new(
                    zm1,
                    t1,
                    Arc::new(BruteForceCollisionDetector),
                    &meshes,
                )
                .unwrap();
                engine.sync_outlines(&mut meshes).unwrap();
                assert_eq!(meshes.get(ZoneId(0)).unwrap().outline, Outline::new([0.0; 3], [1.0; 3]));
                assert_eq!(meshes.get(ZoneId(1)).unwrap().outline, Outline::new([2.0; 3], [3.0; 3]));
            });
        });
    }
}
