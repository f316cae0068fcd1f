mod record;
mod store;

pub use record::TrackedRecord;
pub use store::{FileStateStore, StateStore};

#[cfg(test)]
pub use store::MemoryStateStore;
