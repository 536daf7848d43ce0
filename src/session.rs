use std::error::Error;
use std::sync::Arc;
use std::time::{Duration, Instant};

use hashbrown::HashMap;
use tessel_blocks::{BlockId, is_destructable, is_obstacle};
use tessel_lighting::MAX_LIGHT;
use tessel_map::{VoxelMap, chunk_of, chunked};
use tessel_mesh_cpu::{ChunkNeighborhood, MeshContext, compute_chunk};
use tessel_persist::{DurableStore, PersistWriter, QueueEntry, Sign};
use tessel_runtime::{ChunkLoader, WorkerItem, WorkerPool, WorkerState};

use crate::chunk::Chunk;
use crate::config::TesselConfig;
use crate::remote::{RemoteEvent, RemoteNotifier};
use crate::scheduler::{Residency, chunk_visible, pick_chunk};
use crate::sign::SignList;
use crate::view::View;

/// Snapshot of session counters for logs and overlays.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub chunks: usize,
    pub meshed: usize,
    pub dirty: usize,
    pub faces: usize,
    pub busy_workers: usize,
    pub pending_writes: usize,
}

/// Everything one running world owns: resident chunks, the meshing pool and the
/// persistence writer. Driven from a single thread, once per frame.
pub struct Session {
    config: TesselConfig,
    chunks: HashMap<(i32, i32), Chunk>,
    pool: WorkerPool,
    writer: PersistWriter,
    mesher: Arc<MeshContext>,
    loader: Arc<dyn ChunkLoader>,
    store: Arc<dyn DurableStore>,
    remote: Arc<dyn RemoteNotifier>,
    last_commit: Instant,
}

impl Session {
    pub fn new(
        config: TesselConfig,
        loader: Arc<dyn ChunkLoader>,
        store: Arc<dyn DurableStore>,
        remote: Arc<dyn RemoteNotifier>,
    ) -> Result<Self, Box<dyn Error>> {
        config.validate()?;
        let mesher = Arc::new(MeshContext::new(config.show_lights, config.terrain.seed));
        let pool = WorkerPool::with_context(config.workers, loader.clone(), mesher.clone())?;
        let writer = PersistWriter::spawn(store.clone())?;
        log::info!(
            "session started workers={} create_radius={} delete_radius={}",
            pool.len(),
            config.create_radius,
            config.delete_radius
        );
        Ok(Self {
            config,
            chunks: HashMap::new(),
            pool,
            writer,
            mesher,
            loader,
            store,
            remote,
            last_commit: Instant::now(),
        })
    }

    pub fn config(&self) -> &TesselConfig {
        &self.config
    }

    pub fn chunk(&self, p: i32, q: i32) -> Option<&Chunk> {
        self.chunks.get(&(p, q))
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn stats(&self) -> SessionStats {
        let mut s = SessionStats {
            chunks: self.chunks.len(),
            busy_workers: self.pool.busy_count(),
            pending_writes: self.writer.pending(),
            ..SessionStats::default()
        };
        for c in self.chunks.values() {
            s.meshed += usize::from(c.is_meshed());
            s.dirty += usize::from(c.dirty);
            s.faces += c.faces;
        }
        s
    }

    // ---- per-frame scheduling ----

    /// Streams chunks around `view`: evicts far chunks, collects finished meshes,
    /// meshes the observer's own neighborhood inline and hands one chunk to each idle worker.
    pub fn ensure(&mut self, view: &View) {
        self.delete_chunks(view);
        self.check_workers();
        self.force_chunks(view);
        let frustum = view.frustum(self.config.fov, self.config.render_radius);
        let center = view.chunk();
        let workers = self.pool.len();
        for i in 0..workers {
            let idle = self
                .pool
                .worker_mut(i)
                .is_some_and(|w| w.state() == WorkerState::Idle);
            if !idle {
                continue;
            }
            let pick = pick_chunk(
                center,
                self.config.create_radius,
                i,
                workers,
                &frustum,
                |a, b| {
                    self.chunks.get(&(a, b)).map(|c| Residency {
                        dirty: c.dirty,
                        meshed: c.is_meshed(),
                    })
                },
            );
            if let Some((a, b)) = pick {
                self.dispatch(i, a, b);
            }
        }
    }

    fn dispatch(&mut self, worker: usize, a: i32, b: i32) {
        let mut load = false;
        if !self.chunks.contains_key(&(a, b)) {
            if self.chunks.len() >= self.config.max_chunks {
                return;
            }
            self.init_chunk(a, b);
            load = true;
        }
        let mut item = WorkerItem::new(a, b, load);
        for dp in -1..=1 {
            for dq in -1..=1 {
                if let Some(other) = self.chunks.get(&(a + dp, b + dq)) {
                    let (i, j) = ((dp + 1) as usize, (dq + 1) as usize);
                    item.blocks[i][j] = Some(other.blocks.clone());
                    item.lights[i][j] = Some(other.lights.clone());
                }
            }
        }
        if let Some(chunk) = self.chunks.get_mut(&(a, b)) {
            chunk.dirty = false;
        }
        let refused = match self.pool.worker_mut(worker) {
            Some(w) => w.dispatch(item).err(),
            None => Some(item),
        };
        if let Some(item) = refused {
            log::warn!(target: "sched", "worker {} refused p={} q={}", worker, item.p, item.q);
            self.dirty_chunk(a, b);
        }
    }

    /// Collects every finished worker. Results for evicted chunks are dropped.
    fn check_workers(&mut self) {
        for i in 0..self.pool.len() {
            let Some(w) = self.pool.worker_mut(i) else {
                continue;
            };
            if w.poll() != WorkerState::Done {
                continue;
            }
            let Some(mut item) = w.take_result() else {
                continue;
            };
            let (p, q) = (item.p, item.q);
            let Some(chunk) = self.chunks.get_mut(&(p, q)) else {
                log::debug!(target: "sched", "dropping result for evicted p={} q={}", p, q);
                continue;
            };
            let mut loaded = false;
            if item.load {
                if let Some(blocks) = item.blocks[1][1].take() {
                    chunk.blocks = blocks;
                }
                if let Some(lights) = item.lights[1][1].take() {
                    chunk.lights = lights;
                }
                loaded = true;
            }
            if let Some(mesh) = item.mesh.take() {
                chunk.apply_mesh(mesh);
            }
            if loaded {
                self.request_chunk(p, q);
            }
        }
    }

    /// Meshes the observer's surrounding ring on this thread, creating chunks as needed.
    fn force_chunks(&mut self, view: &View) {
        let (p, q) = view.chunk();
        let r = self.config.force_radius;
        for dp in -r..=r {
            for dq in -r..=r {
                let (a, b) = (p + dp, q + dq);
                match self.chunks.get(&(a, b)).map(|c| c.dirty) {
                    Some(true) => self.gen_chunk_mesh(a, b),
                    Some(false) => {}
                    None if self.chunks.len() < self.config.max_chunks => {
                        self.create_chunk(a, b);
                        self.gen_chunk_mesh(a, b);
                    }
                    None => {}
                }
            }
        }
    }

    fn gen_chunk_mesh(&mut self, p: i32, q: i32) {
        let mut nb = ChunkNeighborhood {
            p,
            q,
            ..Default::default()
        };
        for dp in -1..=1 {
            for dq in -1..=1 {
                if let Some(c) = self.chunks.get(&(p + dp, q + dq)) {
                    let (i, j) = ((dp + 1) as usize, (dq + 1) as usize);
                    nb.blocks[i][j] = Some(&c.blocks);
                    nb.lights[i][j] = Some(&c.lights);
                }
            }
        }
        let mesh = compute_chunk(&self.mesher, &nb);
        if let Some(chunk) = self.chunks.get_mut(&(p, q)) {
            chunk.apply_mesh(mesh);
            chunk.dirty = false;
        }
    }

    fn init_chunk(&mut self, p: i32, q: i32) {
        let mut chunk = Chunk::new(p, q);
        match self.store.load_signs(p, q) {
            Ok(signs) => chunk.signs = SignList::from_signs(signs),
            Err(e) => log::warn!(target: "persist", "load signs p={} q={}: {}", p, q, e),
        }
        self.chunks.insert((p, q), chunk);
        self.dirty_chunk(p, q);
    }

    /// Creates and loads a chunk synchronously.
    fn create_chunk(&mut self, p: i32, q: i32) {
        self.init_chunk(p, q);
        if let Some(chunk) = self.chunks.get_mut(&(p, q)) {
            self.loader.load(p, q, &mut chunk.blocks, &mut chunk.lights);
        }
        self.request_chunk(p, q);
    }

    fn request_chunk(&self, p: i32, q: i32) {
        let key = self.store.get_key(p, q).unwrap_or_else(|e| {
            log::warn!(target: "persist", "get key p={} q={}: {}", p, q, e);
            0
        });
        self.remote.request_chunk(p, q, key);
    }

    fn delete_chunks(&mut self, view: &View) {
        let (p, q) = view.chunk();
        let radius = self.config.delete_radius;
        let before = self.chunks.len();
        self.chunks.retain(|_, c| c.distance(p, q) < radius);
        let evicted = before - self.chunks.len();
        if evicted > 0 {
            log::debug!(target: "sched", "evicted {} chunks around p={} q={}", evicted, p, q);
        }
    }

    /// True if lights are shown and any resident map in the 3x3 around `(p,q)` holds one.
    fn has_lights(&self, p: i32, q: i32) -> bool {
        if !self.config.show_lights {
            return false;
        }
        (-1..=1).any(|dp| {
            (-1..=1).any(|dq| {
                self.chunks
                    .get(&(p + dp, q + dq))
                    .is_some_and(|c| !c.lights.is_empty())
            })
        })
    }

    /// Marks `(p,q)` stale; with lights nearby the whole 3x3 goes stale.
    fn dirty_chunk(&mut self, p: i32, q: i32) {
        if self.has_lights(p, q) {
            self.dirty_neighborhood(p, q);
        } else if let Some(c) = self.chunks.get_mut(&(p, q)) {
            c.dirty = true;
        }
    }

    /// Marks the 3x3 around `(p,q)` stale.
    fn dirty_neighborhood(&mut self, p: i32, q: i32) {
        for dp in -1..=1 {
            for dq in -1..=1 {
                if let Some(c) = self.chunks.get_mut(&(p + dp, q + dq)) {
                    c.dirty = true;
                }
            }
        }
    }

    /// A light at `(p,q)` changed value. Switching one off must still re-mesh the
    /// neighbors it used to reach.
    fn dirty_light(&mut self, p: i32, q: i32) {
        if self.config.show_lights {
            self.dirty_neighborhood(p, q);
        } else {
            self.dirty_chunk(p, q);
        }
    }

    // ---- edits ----

    fn persist(&self, entry: QueueEntry) {
        self.writer.enqueue(entry);
    }

    /// Writes `w` into the map of chunk `(p,q)`. Returns true if the map changed.
    #[allow(clippy::too_many_arguments)]
    fn set_block_in(
        &mut self,
        p: i32,
        q: i32,
        x: i32,
        y: i32,
        z: i32,
        w: BlockId,
        dirty: bool,
    ) -> bool {
        let changed = match self.chunks.get_mut(&(p, q)) {
            Some(c) => c.blocks.set(x, y, z, w),
            None => true,
        };
        if changed {
            if dirty {
                self.dirty_chunk(p, q);
            }
            self.persist(QueueEntry::Block { p, q, x, y, z, w });
        }
        if w == 0 && chunk_of(x) == p && chunk_of(z) == q {
            self.unset_sign(x, y, z);
            self.set_light_in(p, q, x, y, z, 0);
        }
        changed
    }

    fn set_light_in(&mut self, p: i32, q: i32, x: i32, y: i32, z: i32, w: i8) -> bool {
        let changed = match self.chunks.get_mut(&(p, q)) {
            Some(c) => c.lights.set(x, y, z, w),
            None => true,
        };
        if changed {
            self.dirty_light(p, q);
            self.persist(QueueEntry::Light { p, q, x, y, z, w });
        }
        changed
    }

    /// Sets the block at world `(x,y,z)`, copying `-w` into the borders of up to three
    /// neighboring chunks, and notifies the remote. Returns true if the home chunk changed.
    pub fn set_block(&mut self, x: i32, y: i32, z: i32, w: BlockId) -> bool {
        let (p, q) = (chunk_of(x), chunk_of(z));
        let changed = self.set_block_in(p, q, x, y, z, w, true);
        for dx in -1..=1 {
            for dz in -1..=1 {
                if dx == 0 && dz == 0 {
                    continue;
                }
                if dx != 0 && chunk_of(x + dx) == p {
                    continue;
                }
                if dz != 0 && chunk_of(z + dz) == q {
                    continue;
                }
                self.set_block_in(p + dx, q + dz, x, y, z, -w, true);
            }
        }
        self.remote.send_block(x, y, z, w);
        changed
    }

    /// Block at world `(x,y,z)`; 0 when the chunk is not resident.
    pub fn get_block(&self, x: i32, y: i32, z: i32) -> BlockId {
        self.chunks
            .get(&(chunk_of(x), chunk_of(z)))
            .map_or(0, |c| c.blocks.get(x, y, z))
    }

    pub fn set_light(&mut self, x: i32, y: i32, z: i32, w: i8) -> bool {
        let changed = self.set_light_in(chunk_of(x), chunk_of(z), x, y, z, w);
        self.remote.send_light(x, y, z, w);
        changed
    }

    pub fn get_light(&self, x: i32, y: i32, z: i32) -> i8 {
        self.chunks
            .get(&(chunk_of(x), chunk_of(z)))
            .map_or(0, |c| c.lights.get(x, y, z))
    }

    /// Flips the light at `(x,y,z)` between off and full. No-op if the chunk is absent.
    pub fn toggle_light(&mut self, x: i32, y: i32, z: i32) -> Option<i8> {
        let (p, q) = (chunk_of(x), chunk_of(z));
        let chunk = self.chunks.get_mut(&(p, q))?;
        let w = if chunk.lights.get(x, y, z) != 0 {
            0
        } else {
            MAX_LIGHT as i8
        };
        chunk.lights.set(x, y, z, w);
        self.persist(QueueEntry::Light { p, q, x, y, z, w });
        self.remote.send_light(x, y, z, w);
        self.dirty_light(p, q);
        Some(w)
    }

    /// Replaces a destructable block with `w` (or clears it when `w` is 0).
    /// Rows outside `1..=255` are left alone.
    pub fn builder_block(&mut self, x: i32, y: i32, z: i32, w: BlockId) {
        if y <= 0 || y >= 256 {
            return;
        }
        if is_destructable(self.get_block(x, y, z)) {
            self.set_block(x, y, z, 0);
        }
        if w != 0 {
            self.set_block(x, y, z, w);
        }
    }

    /// Top obstacle y in the column under `(x,z)`, or -1.
    pub fn highest_block(&self, x: f32, z: f32) -> i32 {
        let (nx, nz) = (x.round() as i32, z.round() as i32);
        let Some(chunk) = self.chunks.get(&(chunked(x), chunked(z))) else {
            return -1;
        };
        chunk
            .blocks
            .iter()
            .filter(|&(ex, _, ez, ew)| ex == nx && ez == nz && is_obstacle(ew))
            .map(|(_, ey, _, _)| ey)
            .max()
            .unwrap_or(-1)
    }

    // ---- signs ----

    fn set_sign_in(&mut self, p: i32, q: i32, sign: Sign, dirty: bool) {
        if sign.text.is_empty() {
            self.unset_sign_face(sign.x, sign.y, sign.z, sign.face);
            return;
        }
        if let Some(c) = self.chunks.get_mut(&(p, q)) {
            c.signs.add(sign.clone());
            if dirty {
                c.dirty = true;
            }
        }
        self.persist(QueueEntry::Sign {
            p,
            q,
            x: sign.x,
            y: sign.y,
            z: sign.z,
            face: sign.face,
            text: sign.text,
        });
    }

    /// Attaches `text` to one face of the voxel at `(x,y,z)`; empty text removes it.
    pub fn set_sign(&mut self, x: i32, y: i32, z: i32, face: i32, text: &str) {
        let sign = Sign::new(x, y, z, face, text);
        self.remote.send_sign(x, y, z, face, &sign.text);
        self.set_sign_in(chunk_of(x), chunk_of(z), sign, true);
    }

    /// Removes every sign on the voxel at `(x,y,z)`.
    pub fn unset_sign(&mut self, x: i32, y: i32, z: i32) {
        let removed = self
            .chunks
            .get_mut(&(chunk_of(x), chunk_of(z)))
            .map(|c| {
                let removed = c.signs.remove_all(x, y, z);
                c.dirty |= removed;
                removed
            });
        // absent chunks still forward the delete to the store
        if removed.unwrap_or(true) {
            self.persist(QueueEntry::DeleteSigns { x, y, z });
        }
    }

    pub fn unset_sign_face(&mut self, x: i32, y: i32, z: i32, face: i32) {
        let removed = self
            .chunks
            .get_mut(&(chunk_of(x), chunk_of(z)))
            .map(|c| {
                let removed = c.signs.remove(x, y, z, face);
                c.dirty |= removed;
                removed
            });
        if removed.unwrap_or(true) {
            self.persist(QueueEntry::DeleteSign { x, y, z, face });
        }
    }

    // ---- remote feed ----

    /// Applies one decoded update from the remote source. Nothing is echoed back.
    pub fn apply_remote(&mut self, event: RemoteEvent) {
        log::trace!(target: "events", "remote {:?}", event);
        match event {
            RemoteEvent::Block { p, q, x, y, z, w } => {
                self.set_block_in(p, q, x, y, z, w, false);
            }
            RemoteEvent::Light { p, q, x, y, z, w } => {
                self.set_light_in(p, q, x, y, z, w);
            }
            RemoteEvent::Key { p, q, key } => self.persist(QueueEntry::Key { p, q, key }),
            RemoteEvent::Redraw { p, q } => {
                if self.chunks.contains_key(&(p, q)) {
                    self.dirty_chunk(p, q);
                }
            }
            RemoteEvent::Sign {
                p,
                q,
                x,
                y,
                z,
                face,
                text,
            } => self.set_sign_in(p, q, Sign::new(x, y, z, face, &text), false),
        }
    }

    // ---- persistence ----

    /// Queues a commit marker once the commit interval has passed. Returns the number
    /// of writes still waiting for the writer.
    pub fn drain_queue(&mut self) -> usize {
        let interval = Duration::from_secs_f32(self.config.commit_interval_secs);
        if self.last_commit.elapsed() >= interval {
            self.commit();
        }
        self.writer.pending()
    }

    pub fn commit(&mut self) {
        self.last_commit = Instant::now();
        self.writer.commit();
    }

    /// Flushes pending writes with a final commit and stops the writer.
    pub fn shutdown(self) {
        let stats = self.stats();
        log::info!(
            "session shutdown chunks={} pending_writes={}",
            stats.chunks,
            stats.pending_writes
        );
        let Session { writer, pool, .. } = self;
        drop(pool);
        writer.shutdown();
    }

    // ---- rendering ----

    /// Meshed chunks within the render radius whose height span intersects the view frustum.
    pub fn visible_chunks(&self, view: &View) -> Vec<&Chunk> {
        let (p, q) = view.chunk();
        let radius = self.config.render_radius;
        let frustum = view.frustum(self.config.fov, radius);
        self.chunks
            .values()
            .filter(|c| c.is_meshed() && c.distance(p, q) <= radius)
            .filter(|c| chunk_visible(&frustum, c.p, c.q, c.miny, c.maxy))
            .collect()
    }

    /// Live block map of chunk `(p,q)`.
    pub fn blocks(&self, p: i32, q: i32) -> Option<&VoxelMap> {
        self.chunks.get(&(p, q)).map(|c| &c.blocks)
    }
}
