//! The distributed data-exchange subsystem: discovers which remote
//! data each process needs, builds indexed message layouts for
//! exactly those elements, and orchestrates the per-step collective
//! exchange of node state, bounding boxes, border faces, and
//! tetrahedra between zones owned by different processes.

mod coordinator;
mod exchange;
mod fault;
mod layout;
pub mod tags;
mod zone_map;

pub use coordinator::StepCoordinator;
pub use exchange::{ExchangeEngine, VirtNode};
pub use fault::Fault;
pub use layout::{Descriptor, LayoutRegistry, PairIndexTable};
pub use zone_map::ZoneMap;
