// The spatial collision-intersection geometry is an external
// collaborator (see the core's exchange protocols in `gcm-exchange`,
// which use it only through this trait). This crate supplies the
// trait and one brute-force implementation suitable for the driver
// and the test suite; a production deployment would swap in a BVH or
// grid-accelerated implementation without touching the exchange core.

use gcm_mesh::{Face, Node, Outline};

/// The predicate interface the face- and tetrahedron-halo protocols
/// consult. Implementations answer purely geometric questions; they
/// never see zone ownership or process ranks.
pub trait CollisionDetector: Send + Sync {
    /// Indices (into `faces`) of every face whose geometry falls
    /// inside `outline`.
    fn faces_in_outline(&self, faces: &[Face], nodes: &[Node], outline: &Outline) -> Vec<u32>;

    /// The overlap of two outlines, or a degenerate outline if they
    /// do not intersect.
    fn intersect_outlines(&self, a: &Outline, b: &Outline) -> Outline;
}

/// A brute-force `CollisionDetector`: tests every face's centroid
/// against the outline, and intersects bounding boxes axis by axis.
/// O(faces) per query, which is adequate for the zone-local border
/// counts this solver deals with and keeps the reference
/// implementation free of spatial-index bookkeeping.
#[derive(Clone, Copy, Debug, Default)]
pub struct BruteForceCollisionDetector;

impl CollisionDetector for BruteForceCollisionDetector {
    fn faces_in_outline(&self, faces: &[Face], nodes: &[Node], outline: &Outline) -> Vec<u32> {
        if outline.is_degenerate() {
            return Vec::new();
        }
        faces
            .iter()
            .enumerate()
            .filter_map(|(idx, face)| {
                let centroid = face_centroid(face, nodes);
                outline.contains_point(centroid).then_some(idx as u32)
            })
            .collect()
    }

    fn intersect_outlines(&self, a: &Outline, b: &Outline) -> Outline {
        let mut min = [0.0f32; 3];
        let mut max = [0.0f32; 3];
        for axis in 0..3 {
            min[axis] = a.min[axis].max(b.min[axis]);
            max[axis] = a.max[axis].min(b.max[axis]);
            if min[axis] > max[axis] {
                return Outline::degenerate();
            }
        }
        Outline::new(min, max)
    }
}

fn face_centroid(face: &Face, nodes: &[Node]) -> [f32; 3] {
    let mut sum = [0.0f32; 3];
    for &vertex in &face.vertex_indices {
        let coords = nodes[vertex as usize].coords;
        for axis in 0..3 {
            sum[axis] += coords[axis];
        }
    }
    for axis in sum.iter_mut() {
        *axis /= face.vertex_indices.len() as f32;
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::*;
    use gcm_mesh::ZoneId;
    use test_log::test;

    fn node_at(id: u32, coords: [f32; 3]) -> Node {
        let mut n = Node::new_local(id, ZoneId(0), coords);
        n.coords = coords;
        n
    }

    #[test]
    fn faces_in_outline_filters_by_centroid() {
        let nodes = vec![
            node_at(0, [0.0, 0.0, 0.0]),
            node_at(1, [1.0, 0.0, 0.0]),
            node_at(2, [0.0, 1.0, 0.0]),
            node_at(3, [10.0, 10.0, 10.0]),
            node_at(4, [11.0, 10.0, 10.0]),
            node_at(5, [10.0, 11.0, 10.0]),
        ];
        let faces = vec![
            Face { local_id: 0, vertex_indices: [0, 1, 2] },
            Face { local_id: 1, vertex_indices: [3, 4, 5] },
        ];
        let outline = Outline::new([-1.0, -1.0, -1.0], [2.0, 2.0, 2.0]);

        let det = BruteForceCollisionDetector;
        let hits = det.faces_in_outline(&faces, &nodes, &outline);
        assert_eq!(hits, vec![0]);
    }

    #[test]
    fn faces_in_outline_is_empty_for_degenerate_outline() {
        let det = BruteForceCollisionDetector;
        let hits = det.faces_in_outline(&[], &[], &Outline::degenerate());
        assert!(hits.is_empty());
    }

    #[test]
    fn intersect_outlines_finds_overlap() {
        let det = BruteForceCollisionDetector;
        let a = Outline::new([0.0, 0.0, 0.0], [2.0, 2.0, 2.0]);
        let b = Outline::new([1.0, 1.0, 1.0], [3.0, 3.0, 3.0]);
        let i = det.intersect_outlines(&a, &b);
        assert_eq!(i.min, [1.0, 1.0, 1.0]);
        assert_eq!(i.max, [2.0, 2.0, 2.0]);
    }

    #[test]
    fn intersect_outlines_is_degenerate_when_disjoint() {
        let det = BruteForceCollisionDetector;
        let a = Outline::new([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]);
        let b = Outline::new([5.0, 5.0, 5.0], [6.0, 6.0, 6.0]);
        assert!(det.intersect_outlines(&a, &b).is_degenerate());
    }
}
