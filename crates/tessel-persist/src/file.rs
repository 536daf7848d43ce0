use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tessel_map::VoxelMap;

use crate::memory::{Cell, MemoryStore, Tables};
use crate::store::{DurableStore, ObserverState, Sign, StoreError};

const SNAPSHOT_VERSION: u32 = 1;

/// On-disk form of the committed tables.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    blocks: Vec<(i32, i32, i32, i32, i32, i8)>,
    lights: Vec<(i32, i32, i32, i32, i32, i8)>,
    signs: Vec<(i32, i32, Sign)>,
    keys: Vec<(i32, i32, i32)>,
    state: Option<ObserverState>,
}

impl Snapshot {
    fn from_tables(t: &Tables) -> Self {
        let cells = |m: &hashbrown::HashMap<Cell, i8>| {
            let mut v: Vec<_> = m
                .iter()
                .map(|(&(p, q, x, y, z), &w)| (p, q, x, y, z, w))
                .collect();
            v.sort_unstable();
            v
        };
        let mut signs: Vec<_> = t.signs.values().cloned().collect();
        signs.sort_by_key(|(p, q, s)| (*p, *q, s.x, s.y, s.z, s.face));
        let mut keys: Vec<_> = t.keys.iter().map(|(&(p, q), &k)| (p, q, k)).collect();
        keys.sort_unstable();
        Self {
            version: SNAPSHOT_VERSION,
            blocks: cells(&t.blocks),
            lights: cells(&t.lights),
            signs,
            keys,
            state: t.state,
        }
    }

    fn into_tables(self) -> Tables {
        let mut t = Tables::default();
        for (p, q, x, y, z, w) in self.blocks {
            t.blocks.insert((p, q, x, y, z), w);
        }
        for (p, q, x, y, z, w) in self.lights {
            t.lights.insert((p, q, x, y, z), w);
        }
        for (p, q, sign) in self.signs {
            t.signs
                .insert((sign.x, sign.y, sign.z, sign.face), (p, q, sign));
        }
        for (p, q, key) in self.keys {
            t.keys.insert((p, q), key);
        }
        t.state = self.state;
        t
    }
}

fn backend(e: impl std::fmt::Display) -> StoreError {
    StoreError::Backend(e.to_string())
}

/// `MemoryStore` semantics with the committed state mirrored to a JSON file.
///
/// Every commit rewrites the file through a temporary sibling and a rename, so a
/// crash leaves either the previous or the new snapshot on disk.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    mem: MemoryStore,
}

impl FileStore {
    /// Opens `path`, starting empty when the file does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let committed = match fs::read(&path) {
            Ok(bytes) => {
                let snap: Snapshot = serde_json::from_slice(&bytes).map_err(backend)?;
                if snap.version != SNAPSHOT_VERSION {
                    return Err(StoreError::Backend(format!(
                        "{}: unsupported snapshot version {}",
                        path.display(),
                        snap.version
                    )));
                }
                log::info!(
                    target: "persist",
                    "opened {} blocks={} lights={} signs={}",
                    path.display(),
                    snap.blocks.len(),
                    snap.lights.len(),
                    snap.signs.len()
                );
                snap.into_tables()
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::info!(target: "persist", "creating {}", path.display());
                Tables::default()
            }
            Err(e) => return Err(backend(e)),
        };
        Ok(Self {
            path,
            mem: MemoryStore::with_committed(committed),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The in-memory side, for inspection.
    pub fn memory(&self) -> &MemoryStore {
        &self.mem
    }

    fn write_snapshot(&self, tables: &Tables) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(&Snapshot::from_tables(tables)).map_err(backend)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, &bytes).map_err(backend)?;
        fs::rename(&tmp, &self.path).map_err(backend)?;
        log::debug!(target: "persist", "wrote {} bytes to {}", bytes.len(), self.path.display());
        Ok(())
    }
}

impl DurableStore for FileStore {
    fn insert_block(
        &self,
        p: i32,
        q: i32,
        x: i32,
        y: i32,
        z: i32,
        w: i8,
    ) -> Result<(), StoreError> {
        self.mem.insert_block(p, q, x, y, z, w)
    }

    fn insert_light(
        &self,
        p: i32,
        q: i32,
        x: i32,
        y: i32,
        z: i32,
        w: i8,
    ) -> Result<(), StoreError> {
        self.mem.insert_light(p, q, x, y, z, w)
    }

    fn insert_sign(
        &self,
        p: i32,
        q: i32,
        x: i32,
        y: i32,
        z: i32,
        face: i32,
        text: &str,
    ) -> Result<(), StoreError> {
        self.mem.insert_sign(p, q, x, y, z, face, text)
    }

    fn delete_sign(&self, x: i32, y: i32, z: i32, face: i32) -> Result<(), StoreError> {
        self.mem.delete_sign(x, y, z, face)
    }

    fn delete_signs(&self, x: i32, y: i32, z: i32) -> Result<(), StoreError> {
        self.mem.delete_signs(x, y, z)
    }

    fn set_key(&self, p: i32, q: i32, key: i32) -> Result<(), StoreError> {
        self.mem.set_key(p, q, key)
    }

    fn get_key(&self, p: i32, q: i32) -> Result<i32, StoreError> {
        self.mem.get_key(p, q)
    }

    fn commit(&self) -> Result<(), StoreError> {
        let tables = self.mem.commit_tables()?;
        self.write_snapshot(&tables)
    }

    fn load_blocks(&self, p: i32, q: i32, map: &mut VoxelMap) -> Result<(), StoreError> {
        self.mem.load_blocks(p, q, map)
    }

    fn load_lights(&self, p: i32, q: i32, map: &mut VoxelMap) -> Result<(), StoreError> {
        self.mem.load_lights(p, q, map)
    }

    fn load_signs(&self, p: i32, q: i32) -> Result<Vec<Sign>, StoreError> {
        self.mem.load_signs(p, q)
    }

    fn save_state(&self, state: ObserverState) -> Result<(), StoreError> {
        self.mem.save_state(state)
    }

    fn load_state(&self) -> Result<Option<ObserverState>, StoreError> {
        self.mem.load_state()
    }
}
