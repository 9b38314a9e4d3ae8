// A transport that fans a simulated fleet of ranks out across real OS
// threads inside one process. Each rank's thread runs the exchange
// protocols exactly as a separate MPI process would; the only thing
// shared is this mailbox, which stands in for the network.
//
// Point-to-point messages are keyed by (src, dst, tag) the same way
// MPI keys them, and a blocking `recv` for a given (src, tag) only
// ever observes messages posted under that exact triple -- this is
// what lets the exchange core rely on per-pair-tag FIFO ordering.

use crate::{Rank, SendHandle, Tag, Transport};
use gcm_base::{err, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Condvar, Mutex};

#[derive(Default)]
struct BarrierState {
    arrived: usize,
    generation: u64,
}

type MailKey = (u32, u32, u32);

struct Shared {
    world_size: usize,
    barrier: Mutex<BarrierState>,
    barrier_cv: Condvar,
    reduce_slot: Mutex<Vec<Option<f32>>>,
    gather_slot: Mutex<Vec<Option<Vec<u8>>>>,
    round_cv: Condvar,
    mailbox: Mutex<HashMap<MailKey, VecDeque<Vec<u8>>>>,
    mailbox_cv: Condvar,
}

/// An in-process stand-in for a message-passing fabric, connecting
/// `world_size` simulated ranks that live as threads in the calling
/// process. Build a fleet with [`InProcessTransport::fleet`] and hand
/// one `Arc` to each simulated rank's thread.
pub struct InProcessTransport {
    rank: Rank,
    shared: Arc<Shared>,
}

impl InProcessTransport {
    /// Builds a fleet of `world_size` transports, one per rank, all
    /// sharing the same mailbox.
    pub fn fleet(world_size: usize) -> Vec<Arc<InProcessTransport>> {
        let shared = Arc::new(Shared {
            world_size,
            barrier: Mutex::new(BarrierState::default()),
            barrier_cv: Condvar::new(),
            reduce_slot: Mutex::new(vec![None; world_size]),
            gather_slot: Mutex::new(vec![None; world_size]),
            round_cv: Condvar::new(),
            mailbox: Mutex::new(HashMap::new()),
            mailbox_cv: Condvar::new(),
        });
        (0..world_size)
            .map(|r| {
                Arc::new(InProcessTransport {
                    rank: Rank(r as u32),
                    shared: shared.clone(),
                })
            })
            .collect()
    }
}

struct CompletedSend;

impl SendHandle for CompletedSend {
    fn wait(self: Box<Self>) {}
}

impl Transport for InProcessTransport {
    fn rank(&self) -> Rank {
        self.rank
    }

    fn world_size(&self) -> usize {
        self.shared.world_size
    }

    fn barrier(&self) {
        let mut state = self.shared.barrier.lock().unwrap();
        let entered = state.generation;
        state.arrived += 1;
        if state.arrived == self.shared.world_size {
            state.arrived = 0;
            state.generation += 1;
            self.shared.barrier_cv.notify_all();
        } else {
            while state.generation == entered {
                state = self.shared.barrier_cv.wait(state).unwrap();
            }
        }
    }

    fn all_reduce_min(&self, local: f32) -> f32 {
        {
            let mut slot = self.shared.reduce_slot.lock().unwrap();
            slot[self.rank.0 as usize] = Some(local);
        }
        self.barrier();
        let result = {
            let slot = self.shared.reduce_slot.lock().unwrap();
            slot.iter()
                .filter_map(|v| *v)
                .fold(f32::INFINITY, f32::min)
        };
        self.barrier();
        {
            let mut slot = self.shared.reduce_slot.lock().unwrap();
            slot[self.rank.0 as usize] = None;
        }
        self.barrier();
        result
    }

    fn all_gather_v<T: Serialize + DeserializeOwned + Clone>(&self, local: &[T]) -> Vec<T> {
        let encoded = rmp_serde::to_vec(local).expect("outline records always encode");
        {
            let mut slot = self.shared.gather_slot.lock().unwrap();
            slot[self.rank.0 as usize] = Some(encoded);
        }
        self.shared.round_cv.notify_all();
        let mut slot = self.shared.gather_slot.lock().unwrap();
        while slot.iter().any(Option::is_none) {
            slot = self.shared.round_cv.wait(slot).unwrap();
        }
        let mut all = Vec::new();
        for buf in slot.iter() {
            let buf = buf.as_ref().expect("checked all-filled above");
            let chunk: Vec<T> = rmp_serde::from_slice(buf).expect("round-tripped outline records");
            all.extend(chunk);
        }
        drop(slot);
        self.barrier();
        if self.rank.0 == 0 {
            let mut slot = self.shared.gather_slot.lock().unwrap();
            slot.iter_mut().for_each(|v| *v = None);
        }
        self.barrier();
        all
    }

    fn isend<T: Serialize>(&self, dst: Rank, tag: Tag, payload: &[T]) -> Box<dyn SendHandle> {
        let buf = rmp_serde::to_vec(payload)
            .unwrap_or_else(|e| panic!("failed to encode payload for tag {}: {e}", tag.0));
        let key = (self.rank.0, dst.0, tag.0);
        let mut mailbox = self.shared.mailbox.lock().unwrap();
        mailbox.entry(key).or_default().push_back(buf);
        drop(mailbox);
        self.shared.mailbox_cv.notify_all();
        Box::new(CompletedSend)
    }

    fn recv<T: DeserializeOwned>(&self, src: Rank, tag: Tag) -> Result<Vec<T>> {
        let key = (src.0, self.rank.0, tag.0);
        let mut mailbox = self.shared.mailbox.lock().unwrap();
        loop {
            if let Some(queue) = mailbox.get_mut(&key) {
                if let Some(buf) = queue.pop_front() {
                    return rmp_serde::from_slice(&buf)
                        .map_err(|e| err(format!("malformed payload for tag {}: {e}", tag.0)));
                }
            }
            mailbox = self.shared.mailbox_cv.wait(mailbox).unwrap();
        }
    }

    fn probe_any(&self, tag: Tag) -> Rank {
        let mut mailbox = self.shared.mailbox.lock().unwrap();
        loop {
            if let Some(((src, _, _), _)) = mailbox
                .iter()
                .find(|((_, dst, t), q)| *dst == self.rank.0 && *t == tag.0 && !q.is_empty())
            {
                return Rank(*src);
            }
            mailbox = self.shared.mailbox_cv.wait(mailbox).unwrap();
        }
    }

    fn try_probe_any(&self, tag: Tag) -> Option<Rank> {
        let mailbox = self.shared.mailbox.lock().unwrap();
        mailbox
            .iter()
            .find(|((_, dst, t), q)| *dst == self.rank.0 && *t == tag.0 && !q.is_empty())
            .map(|((src, _, _), _)| Rank(*src))
    }

    fn abort(&self, code: i32) -> ! {
        tracing::error!(target: "gcm::net", rank = self.rank.0, code, "collective abort");
        std::process::exit(code);
    }
}
