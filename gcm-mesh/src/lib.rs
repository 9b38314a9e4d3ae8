// The data model shared by every exchange protocol: zones, nodes,
// border faces, tetrahedra, bounding-box outlines, and the mesh
// container that holds one zone's contiguous arrays of each.
//
// Everything here is plain data. The numerical kernel, the mesh
// loader, and the rheology model (all out of scope for this crate)
// own the *meaning* of a node's values; this crate only owns their
// shape and the cross-references between zones.

mod mesh;
mod mesh_set;
mod node;
mod outline;
mod shapes;
mod zone;

pub use mesh::Mesh;
pub use mesh_set::MeshSet;
pub use node::{Node, NodeState, NumberedNode, Placement};
pub use outline::Outline;
pub use shapes::{Face, NumberedFace, NumberedTetrahedron, Tetrahedron};
pub use zone::ZoneId;
