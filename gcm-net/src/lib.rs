// The transport abstraction carried by every exchange protocol in
// `gcm-exchange`: barriers, a MIN all-reduce, a variable-length
// all-gather, and tagged point-to-point send/receive of indexed
// record batches.
//
// The wire-level contract is deliberately narrow -- it is exactly the
// set of MPI collectives the original solver used (see the tag
// namespace in `gcm-exchange::tags`) -- so a real cluster transport
// (MPI, UCX, a gRPC fan-out) could replace `InProcessTransport`
// without touching the exchange engine.

mod in_process;

pub use in_process::InProcessTransport;

use serde::{de::DeserializeOwned, Serialize};

/// A participating process. Ranks are dense, `0..world_size`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Rank(pub u32);

/// A transport-level message tag. The exchange engine is responsible
/// for keeping tags disjoint across protocols and zone pairs.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Tag(pub u32);

/// A handle to a non-blocking send, drained with `wait` the way the
/// original solver drains a `vector<MPI::Request>` with `Waitall`.
pub trait SendHandle {
    fn wait(self: Box<Self>);
}

/// The collective and point-to-point operations the exchange core
/// needs from the message-passing fabric.
pub trait Transport: Send + Sync {
    /// This process's rank.
    fn rank(&self) -> Rank;

    /// Total number of ranks in the fleet.
    fn world_size(&self) -> usize;

    /// Blocks until every rank has entered the barrier.
    fn barrier(&self);

    /// All-reduce under the MIN operator over one float per rank.
    fn all_reduce_min(&self, local: f32) -> f32;

    /// Gathers a variable-length record sequence from every rank,
    /// concatenated in rank order -- the wire-level analogue of
    /// `Allgatherv` with counts and displacements computed for you.
    fn all_gather_v<T: Serialize + DeserializeOwned + Clone>(&self, local: &[T]) -> Vec<T>;

    /// Posts a non-blocking send of `payload` to `dst` under `tag`.
    /// Returns immediately; completion is awaited via the returned
    /// handle's `wait`.
    fn isend<T: Serialize>(&self, dst: Rank, tag: Tag, payload: &[T]) -> Box<dyn SendHandle>;

    /// Blocking receive of a payload sent from `src` under `tag`.
    /// Blocks until a matching send has been posted.
    fn recv<T: DeserializeOwned>(&self, src: Rank, tag: Tag) -> gcm_base::Result<Vec<T>>;

    /// Blocks until a message tagged `tag` is pending from some
    /// source, and returns that source without consuming the
    /// message. Used by the sentinel-drain services (`sync_faces`,
    /// `sync_tetrs`) that must service whichever peer is ready first.
    fn probe_any(&self, tag: Tag) -> Rank;

    /// Non-blocking variant of [`Transport::probe_any`]: returns
    /// immediately with `None` if nothing tagged `tag` is pending.
    /// Used by the `PairIndexTable` setup drain, which has no a
    /// priori count of incoming messages and must stop polling once
    /// the queue is observed empty rather than block forever.
    fn try_probe_any(&self, tag: Tag) -> Option<Rank>;

    /// Collective abort: every rank observes process termination with
    /// `code`. Does not return.
    fn abort(&self, code: i32) -> !;
}
