use crate::{Face, Node, Outline, Tetrahedron, ZoneId};

/// One zone's materialised mesh: a contiguous node array, its border
/// triangulation, its tetrahedra, the bounding outline, and a reverse
/// map from vertex to incident tetrahedra that `sync_tetrs` walks to
/// answer "which tetrahedra touch this border vertex".
///
/// A remote mesh (one this process does not own) has the identical
/// shape; the exchange protocols populate its `nodes`/`border`/`tetrs`
/// in place rather than replacing the `Mesh` itself, so descriptors
/// addressed at this zone stay valid across syncs.
#[derive(Clone, Debug, Default)]
pub struct Mesh {
    pub zone_id: ZoneId,
    pub nodes: Vec<Node>,
    pub border: Vec<Face>,
    pub tetrs: Vec<Tetrahedron>,
    pub outline: Outline,
    /// `node_to_tetrs[v]` lists the local ids of tetrahedra incident
    /// on vertex `v`. Maintained by the mesh loader (out of scope);
    /// `sync_tetrs` only ever reads it.
    pub node_to_tetrs: Vec<Vec<u32>>,
}

impl Mesh {
    pub fn new(zone_id: ZoneId) -> Self {
        Mesh {
            zone_id,
            ..Default::default()
        }
    }

    /// Recomputes `node_to_tetrs` from `tetrs`. The real mesh loader
    /// builds this once at load time; tests use this helper instead
    /// of hand-rolling the adjacency.
    pub fn rebuild_adjacency(&mut self) {
        self.node_to_tetrs = vec![Vec::new(); self.nodes.len()];
        for tetr in &self.tetrs {
            for &v in &tetr.vertex_indices {
                self.node_to_tetrs[v as usize].push(tetr.local_id);
            }
        }
    }

    pub fn tetrs_incident_on(&self, vertex: u32) -> &[u32] {
        self.node_to_tetrs
            .get(vertex as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Discards all remote-materialised geometry, used before a
    /// remote mesh is rebuilt by a fresh `sync_faces`/`sync_tetrs`
    /// round. Local meshes are never cleared this way.
    pub fn clear_remote_data(&mut self) {
        self.nodes.clear();
        self.border.clear();
        self.tetrs.clear();
        self.node_to_tetrs.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Tetrahedron;

    #[test]
    fn adjacency_lists_every_incident_tetrahedron() {
        let mut mesh = Mesh::new(ZoneId(0));
        mesh.nodes = (0..5)
            .map(|i| Node::new_local(i, ZoneId(0), [0.0; 3]))
            .collect();
        mesh.tetrs = vec![
            Tetrahedron { local_id: 0, vertex_indices: [0, 1, 2, 3] },
            Tetrahedron { local_id: 1, vertex_indices: [1, 2, 3, 4] },
        ];
        mesh.rebuild_adjacency();

        assert_eq!(mesh.tetrs_incident_on(0), &[0]);
        assert_eq!(mesh.tetrs_incident_on(1), &[0, 1]);
        assert_eq!(mesh.tetrs_incident_on(4), &[1]);
    }
}
