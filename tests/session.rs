use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use proptest::prelude::*;
use tessel::blocks::{BRICK, GLASS, RED_FLOWER, STONE};
use tessel::{
    CHUNK_SIZE, ChunkLoader, DurableStore, FileStore, MemoryStore, OfflineRemote, RemoteEvent,
    RemoteNotifier, Session, TesselConfig, View, VoxelMap, WorldLoader,
};

const FLOOR: i32 = 10;
/// position, normal, uv, ao, light
const VERTEX_FLOATS: usize = 10;

#[derive(Default)]
struct Recorder {
    calls: Mutex<Vec<String>>,
}

impl Recorder {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl RemoteNotifier for Recorder {
    fn request_chunk(&self, p: i32, q: i32, key: i32) {
        self.calls.lock().unwrap().push(format!("chunk {p} {q} {key}"));
    }
    fn send_block(&self, x: i32, y: i32, z: i32, w: i8) {
        self.calls.lock().unwrap().push(format!("block {x} {y} {z} {w}"));
    }
    fn send_light(&self, x: i32, y: i32, z: i32, w: i8) {
        self.calls.lock().unwrap().push(format!("light {x} {y} {z} {w}"));
    }
    fn send_sign(&self, x: i32, y: i32, z: i32, face: i32, text: &str) {
        self.calls
            .lock()
            .unwrap()
            .push(format!("sign {x} {y} {z} {face} {text}"));
    }
}

fn floor_loader() -> Arc<dyn ChunkLoader> {
    Arc::new(|p: i32, q: i32, blocks: &mut VoxelMap, _: &mut VoxelMap| {
        for x in 0..CHUNK_SIZE {
            for z in 0..CHUNK_SIZE {
                for y in 0..FLOOR {
                    blocks.set(p * CHUNK_SIZE + x, y, q * CHUNK_SIZE + z, STONE);
                }
            }
        }
    })
}

fn config() -> TesselConfig {
    TesselConfig {
        workers: 2,
        create_radius: 1,
        render_radius: 2,
        delete_radius: 3,
        force_radius: 1,
        commit_interval_secs: 3600.0,
        ..TesselConfig::default()
    }
}

struct Harness {
    session: Session,
    store: Arc<MemoryStore>,
    remote: Arc<Recorder>,
}

fn harness(config: TesselConfig) -> Harness {
    let store = Arc::new(MemoryStore::new());
    let remote = Arc::new(Recorder::default());
    let session = Session::new(config, floor_loader(), store.clone(), remote.clone()).unwrap();
    Harness {
        session,
        store,
        remote,
    }
}

fn home() -> View {
    View::new(16.0, 20.0, 16.0)
}

#[test]
fn ensure_meshes_the_observer_ring_synchronously() {
    let mut h = harness(config());
    h.session.ensure(&home());
    for p in -1..=1 {
        for q in -1..=1 {
            let c = h.session.chunk(p, q).expect("resident");
            assert!(c.is_meshed(), "chunk ({p},{q}) not meshed");
            assert!(!c.dirty);
            assert!(c.faces > 0);
            assert_eq!(c.maxy, FLOOR - 1);
        }
    }
    assert_eq!(h.session.chunk_count(), 9);
    assert_eq!(h.session.get_block(3, FLOOR - 1, 3), STONE);
    assert_eq!(h.session.get_block(3, FLOOR, 3), 0);
    // each created chunk asks the remote for newer data
    let requests = h.remote.calls().iter().filter(|c| c.starts_with("chunk")).count();
    assert_eq!(requests, 9);
}

#[test]
fn absent_chunks_read_as_empty() {
    let h = harness(config());
    assert_eq!(h.session.get_block(1000, 5, 1000), 0);
    assert_eq!(h.session.get_light(1000, 5, 1000), 0);
    assert_eq!(h.session.highest_block(1000.0, 1000.0), -1);
}

#[test]
fn edge_edits_copy_into_neighbor_borders() {
    let mut h = harness(config());
    h.session.ensure(&home());
    assert!(h.session.set_block(0, 12, 0, BRICK));
    assert_eq!(h.session.get_block(0, 12, 0), BRICK);
    for (p, q) in [(-1, 0), (0, -1), (-1, -1)] {
        let map = h.session.blocks(p, q).unwrap();
        assert_eq!(map.get(0, 12, 0), -BRICK, "border of ({p},{q})");
    }
    assert_eq!(h.session.blocks(1, 0).unwrap().get(0, 12, 0), 0);

    // interior edits stay home
    h.session.set_block(5, 12, 5, GLASS);
    assert!(!h.session.chunk(1, 0).unwrap().dirty);
    assert!(h.session.chunk(0, 0).unwrap().dirty);
    assert!(h.remote.calls().contains(&"block 0 12 0 4".to_string()));
}

#[test]
fn edits_reach_the_store_after_commit() {
    let Harness { mut session, store, .. } = harness(config());
    session.ensure(&home());
    session.set_block(31, 12, 7, BRICK);
    session.set_light(31, 13, 7, 12);
    assert_eq!(store.committed_block(0, 0, 31, 12, 7), None);
    session.shutdown();
    assert_eq!(store.committed_block(0, 0, 31, 12, 7), Some(BRICK));
    assert_eq!(store.committed_block(1, 0, 31, 12, 7), Some(-BRICK));
    assert_eq!(store.committed_light(0, 0, 31, 13, 7), Some(12));
}

#[test]
fn drain_queue_commits_on_interval() {
    let Harness { mut session, store, .. } = harness(TesselConfig {
        commit_interval_secs: 0.0,
        ..config()
    });
    session.ensure(&home());
    session.set_block(4, 12, 4, BRICK);
    session.drain_queue();
    session.shutdown();
    // interval marker plus the final commit
    assert_eq!(store.commit_count(), 2);
    assert_eq!(store.committed_block(0, 0, 4, 12, 4), Some(BRICK));
}

#[test]
fn removing_a_block_clears_its_light_and_signs() {
    let mut h = harness(config());
    h.session.ensure(&home());
    h.session.set_block(6, 12, 6, BRICK);
    h.session.set_light(6, 12, 6, 15);
    h.session.set_sign(6, 12, 6, 2, "hello");
    assert_eq!(h.session.chunk(0, 0).unwrap().signs.len(), 1);
    h.session.set_block(6, 12, 6, 0);
    assert_eq!(h.session.get_light(6, 12, 6), 0);
    assert!(h.session.chunk(0, 0).unwrap().signs.is_empty());
}

#[test]
fn empty_sign_text_removes_the_face() {
    let mut h = harness(config());
    h.session.ensure(&home());
    h.session.set_sign(6, 9, 6, 1, "a");
    h.session.set_sign(6, 9, 6, 3, "b");
    h.session.set_sign(6, 9, 6, 1, "");
    let signs = &h.session.chunk(0, 0).unwrap().signs;
    assert_eq!(signs.len(), 1);
    assert!(signs.get(6, 9, 6, 3).is_some());
    h.session.unset_sign_face(6, 9, 6, 3);
    assert!(h.session.chunk(0, 0).unwrap().signs.is_empty());
}

#[test]
fn lights_dirty_the_whole_neighborhood() {
    let mut h = harness(config());
    h.session.ensure(&home());
    assert_eq!(h.session.toggle_light(5, 12, 5), Some(15));
    for p in -1..=1 {
        for q in -1..=1 {
            assert!(h.session.chunk(p, q).unwrap().dirty, "({p},{q}) clean");
        }
    }
    assert_eq!(h.session.get_light(5, 12, 5), 15);
    h.session.ensure(&home());
    assert!(!h.session.chunk(1, 1).unwrap().dirty);

    // switching the last light off still reaches the neighbors
    assert_eq!(h.session.toggle_light(5, 12, 5), Some(0));
    for p in -1..=1 {
        for q in -1..=1 {
            assert!(h.session.chunk(p, q).unwrap().dirty, "({p},{q}) clean after off");
        }
    }
    assert_eq!(h.session.toggle_light(5000, 12, 5), None);

    h.session.ensure(&home());
    assert!(!h.session.chunk(1, 1).unwrap().dirty);
}

fn lit_vertices(session: &Session, p: i32, q: i32) -> usize {
    let mesh = session.chunk(p, q).and_then(|c| c.mesh.as_ref()).expect("meshed");
    mesh.data
        .chunks(VERTEX_FLOATS)
        .filter(|v| v[9] > 0.0)
        .count()
}

#[test]
fn removed_light_leaves_no_glow_across_the_seam() {
    let mut h = harness(config());
    h.session.ensure(&home());
    assert_eq!(lit_vertices(&h.session, 1, 0), 0);

    h.session.set_light(31, 12, 5, 15);
    h.session.ensure(&home());
    assert!(lit_vertices(&h.session, 1, 0) > 0);

    h.session.set_light(31, 12, 5, 0);
    assert!(h.session.chunk(1, 0).unwrap().dirty);
    h.session.ensure(&home());
    assert_eq!(lit_vertices(&h.session, 1, 0), 0);
}

#[test]
fn builder_block_respects_world_bounds_and_replaces() {
    let mut h = harness(config());
    h.session.ensure(&home());
    h.session.builder_block(3, 0, 3, BRICK);
    assert_eq!(h.session.get_block(3, 0, 3), STONE);
    h.session.builder_block(3, FLOOR - 1, 3, BRICK);
    assert_eq!(h.session.get_block(3, FLOOR - 1, 3), BRICK);
    h.session.builder_block(3, FLOOR - 1, 3, 0);
    assert_eq!(h.session.get_block(3, FLOOR - 1, 3), 0);
}

#[test]
fn highest_block_ignores_plants() {
    let mut h = harness(config());
    h.session.ensure(&home());
    assert_eq!(h.session.highest_block(3.0, 3.0), FLOOR - 1);
    h.session.set_block(3, FLOOR, 3, RED_FLOWER);
    assert_eq!(h.session.highest_block(3.0, 3.0), FLOOR - 1);
    h.session.set_block(3, 20, 3, STONE);
    assert_eq!(h.session.highest_block(2.6, 3.4), 20);
}

#[test]
fn remote_events_apply_without_echo() {
    let mut h = harness(config());
    h.session.ensure(&home());
    let before = h.remote.calls().len();
    h.session.apply_remote(RemoteEvent::Block {
        p: 0,
        q: 0,
        x: 7,
        y: 12,
        z: 7,
        w: BRICK,
    });
    assert_eq!(h.session.get_block(7, 12, 7), BRICK);
    assert!(!h.session.chunk(0, 0).unwrap().dirty);
    h.session.apply_remote(RemoteEvent::Redraw { p: 0, q: 0 });
    assert!(h.session.chunk(0, 0).unwrap().dirty);
    h.session.apply_remote(RemoteEvent::Sign {
        p: 0,
        q: 0,
        x: 7,
        y: 12,
        z: 7,
        face: 0,
        text: "remote".into(),
    });
    assert_eq!(h.session.chunk(0, 0).unwrap().signs.len(), 1);
    h.session.apply_remote(RemoteEvent::Key { p: 0, q: 0, key: 99 });
    h.session.apply_remote(RemoteEvent::Light {
        p: 0,
        q: 0,
        x: 7,
        y: 13,
        z: 7,
        w: 9,
    });
    assert_eq!(h.session.get_light(7, 13, 7), 9);
    assert_eq!(h.remote.calls().len(), before);
    let Harness { session, store, .. } = h;
    session.shutdown();
    assert_eq!(store.committed_key(0, 0), Some(99));
}

#[test]
fn workers_load_and_mesh_outer_chunks() {
    let mut h = harness(TesselConfig {
        create_radius: 2,
        delete_radius: 4,
        ..config()
    });
    let view = home();
    let t0 = Instant::now();
    loop {
        h.session.ensure(&view);
        if h.session.chunk(0, -2).is_some_and(|c| c.is_meshed()) {
            break;
        }
        assert!(t0.elapsed() < Duration::from_secs(20), "outer chunk never meshed");
        thread::sleep(Duration::from_millis(2));
    }
    // loaded content replaced the empty placeholder maps
    assert_eq!(h.session.get_block(5, FLOOR - 1, -2 * CHUNK_SIZE + 5), STONE);
    assert!(h.session.chunk(0, -2).unwrap().faces > 0);
}

#[test]
fn chunk_cap_limits_residency() {
    let mut h = harness(TesselConfig {
        create_radius: 2,
        delete_radius: 4,
        max_chunks: 9,
        ..config()
    });
    for _ in 0..5 {
        h.session.ensure(&home());
        thread::sleep(Duration::from_millis(2));
    }
    assert_eq!(h.session.chunk_count(), 9);
}

#[test]
fn far_chunks_are_evicted() {
    let mut h = harness(config());
    h.session.ensure(&home());
    let far = View::new(16.0 + 10.0 * CHUNK_SIZE as f32, 20.0, 16.0);
    h.session.ensure(&far);
    assert!(h.session.chunk(0, 0).is_none());
    assert!(h.session.chunk(10, 0).is_some());
    assert_eq!(h.session.get_block(3, 5, 3), 0);
}

#[test]
fn visible_chunks_are_culled_by_the_frustum() {
    let mut h = harness(config());
    let eye = View::new(16.0, 12.0, 16.0);
    h.session.ensure(&eye);
    let visible: Vec<(i32, i32)> = h
        .session
        .visible_chunks(&eye)
        .iter()
        .map(|c| (c.p, c.q))
        .collect();
    assert!(visible.contains(&(0, 0)));
    assert!(visible.contains(&(0, -1)));
    assert!(!visible.contains(&(0, 1)), "chunk behind the observer: {visible:?}");
    let stats = h.session.stats();
    assert_eq!(stats.chunks, 9);
    assert_eq!(stats.meshed, 9);
}

#[test]
fn failing_store_still_streams_terrain() {
    let store = Arc::new(MemoryStore::new());
    store.close();
    let cfg = config();
    let loader = Arc::new(WorldLoader::new(cfg.terrain.clone(), store.clone()));
    let (h, surface) = loader.terrain().column(3, 3);
    let mut session = Session::new(cfg, loader, store.clone(), Arc::new(OfflineRemote)).unwrap();
    session.ensure(&View::new(3.0, (h + 2) as f32, 3.0));
    let chunk = session.chunk(0, 0).expect("resident");
    assert!(chunk.is_meshed());
    assert!(chunk.faces > 0);
    assert_eq!(session.get_block(3, 0, 3), surface);
    // edits still land in memory even though the store rejects them
    session.set_block(3, h + 1, 3, BRICK);
    assert_eq!(session.get_block(3, h + 1, 3), BRICK);
    session.drain_queue();
    session.shutdown();
    assert_eq!(store.commit_count(), 0);
}

#[test]
fn edits_come_back_after_restart() {
    let dir = std::env::temp_dir().join(format!("tessel-session-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("world.json");
    let _ = std::fs::remove_file(&path);
    let cfg = config();
    let eye = View::new(16.0, 120.0, 16.0);

    let open = |cfg: TesselConfig| {
        let store = Arc::new(FileStore::open(&path).unwrap());
        let loader = Arc::new(WorldLoader::new(cfg.terrain.clone(), store.clone()));
        Session::new(cfg, loader, store, Arc::new(OfflineRemote)).unwrap()
    };

    let mut first = open(cfg.clone());
    first.ensure(&eye);
    first.set_block(0, 100, 4, BRICK);
    first.set_light(5, 101, 5, 11);
    first.shutdown();

    let mut second = open(cfg);
    second.ensure(&eye);
    assert_eq!(second.get_block(0, 100, 4), BRICK);
    assert_eq!(second.blocks(-1, 0).unwrap().get(0, 100, 4), -BRICK);
    assert_eq!(second.get_light(5, 101, 5), 11);
    second.shutdown();
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    #[test]
    fn reads_follow_the_last_write(
        edits in prop::collection::vec((-32i32..64, FLOOR..40, -32i32..64, 0i8..=GLASS), 1..40)
    ) {
        let mut h = harness(config());
        h.session.ensure(&home());
        let mut model = HashMap::new();
        for &(x, y, z, w) in &edits {
            h.session.set_block(x, y, z, w);
            model.insert((x, y, z), w);
        }
        for (&(x, y, z), &w) in &model {
            prop_assert_eq!(h.session.get_block(x, y, z), w);
        }
    }
}
