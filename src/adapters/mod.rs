//! Adapter implementations of the port traits.
//!
//! `live` adapters talk to the real system (disk, system clock, random
//! ids). `memory` adapters are deterministic in-memory implementations
//! used by tests and by embedders that bring their own document store.

pub mod live;
pub mod memory;
