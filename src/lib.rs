//! tessel: streaming voxel world core with background meshing and write-behind persistence.
#![forbid(unsafe_code)]

mod chunk;
pub mod config;
mod loader;
mod remote;
pub mod scheduler;
mod session;
mod sign;
mod view;

pub use chunk::Chunk;
pub use config::{ConfigError, TesselConfig};
pub use loader::WorldLoader;
pub use remote::{OfflineRemote, RemoteEvent, RemoteNotifier};
pub use session::{Session, SessionStats};
pub use sign::SignList;
pub use view::View;

pub use tessel_blocks as blocks;
pub use tessel_map::{CHUNK_SIZE, VoxelMap, chunk_of, chunked};
pub use tessel_mesh_cpu::ChunkMesh;
pub use tessel_persist::{DurableStore, FileStore, MemoryStore, ObserverState, Sign, StoreError};
pub use tessel_runtime::ChunkLoader;
