//! The reserved tag namespace every exchange protocol posts under.
//! Tags must stay disjoint across protocols and, within a protocol,
//! across zone pairs -- see the zone-pair tag formula on
//! [`sync_node_tag`].

use gcm_mesh::ZoneId;
use gcm_net::Tag;

/// First tag in the per-zone-pair node-sync range. Node-sync tags run
/// `SYNC_NODE_BASE + 100*i + j` for zone pair `(i, j)`, so this must
/// sit above every fixed protocol tag below.
pub const SYNC_NODE_BASE: u32 = 1000;

pub const SYNC_NODE_TYPES: Tag = Tag(900);
pub const SYNC_NODE_TYPES_I: Tag = Tag(901);

pub const SYNC_FACES_REQ_I: Tag = Tag(910);
pub const SYNC_FACES_REQ_Z: Tag = Tag(911);
pub const SYNC_FACES_RESP: Tag = Tag(912);
pub const SYNC_FACES_N_RESP: Tag = Tag(913);
pub const SYNC_FACES_F_RESP: Tag = Tag(914);

pub const SYNC_TETRS_REQ: Tag = Tag(920);
pub const SYNC_TETRS_REQ_I: Tag = Tag(921);
pub const SYNC_TETRS_I_RESP: Tag = Tag(922);
pub const SYNC_TETRS_N_RESP: Tag = Tag(923);
pub const SYNC_TETRS_T_RESP: Tag = Tag(924);

/// The zone-pair tag for a node-sync message: `base + 100*i + j`,
/// disambiguating concurrent sends for different pairings.
pub fn sync_node_tag(i: ZoneId, j: ZoneId) -> Tag {
    Tag(SYNC_NODE_BASE + 100 * i.0 + j.0)
}
