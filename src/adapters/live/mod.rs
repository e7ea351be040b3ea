//! Live adapters backed by the real system.

pub mod clock;
pub mod id_gen;
pub mod storage;

pub use clock::LiveClock;
pub use id_gen::LiveIdGenerator;
pub use storage::LiveStorage;
