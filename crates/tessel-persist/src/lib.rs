//! Write-behind persistence: FIFO mutation queue, writer thread and durable stores.
#![forbid(unsafe_code)]

mod file;
mod memory;
mod ring;
mod store;
mod writer;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use ring::{DEFAULT_CAPACITY, QueueEntry, WriteQueue};
pub use store::{DurableStore, MAX_SIGN_LENGTH, ObserverState, Sign, StoreError};
pub use writer::{PersistWriter, SharedQueue, apply_entry};
