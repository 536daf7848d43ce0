use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use tessel_map::{BLOCK_MAP_MASK, LIGHT_MAP_MASK, VoxelMap};
use tessel_persist::{DurableStore, FileStore, ObserverState, PersistWriter, StoreError};

fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("tessel-persist-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join(format!("{name}.json"));
    let _ = fs::remove_file(&path);
    path
}

#[test]
fn committed_writes_survive_reopen() {
    let path = scratch("reopen");
    {
        let store = FileStore::open(&path).unwrap();
        store.insert_block(0, 0, 3, 12, 4, 5).unwrap();
        store.insert_block(1, 0, 3, 12, 4, -5).unwrap();
        store.insert_light(0, 0, 3, 13, 4, 15).unwrap();
        store.insert_sign(0, 0, 3, 12, 4, 2, "north").unwrap();
        store.set_key(0, 0, 9).unwrap();
        store.commit().unwrap();
        // never committed: must not come back
        store.insert_block(0, 0, 7, 7, 7, 1).unwrap();
    }
    let store = FileStore::open(&path).unwrap();
    let mut blocks = VoxelMap::for_chunk(0, 0, BLOCK_MAP_MASK);
    store.load_blocks(0, 0, &mut blocks).unwrap();
    assert_eq!(blocks.get(3, 12, 4), 5);
    assert_eq!(blocks.get(7, 7, 7), 0);
    let mut border = VoxelMap::for_chunk(1, 0, BLOCK_MAP_MASK);
    store.load_blocks(1, 0, &mut border).unwrap();
    assert_eq!(border.get(3, 12, 4), -5);
    let mut lights = VoxelMap::for_chunk(0, 0, LIGHT_MAP_MASK);
    store.load_lights(0, 0, &mut lights).unwrap();
    assert_eq!(lights.get(3, 13, 4), 15);
    assert_eq!(store.load_signs(0, 0).unwrap()[0].text, "north");
    assert_eq!(store.get_key(0, 0).unwrap(), 9);
    assert!(!path.with_extension("tmp").exists());
}

#[test]
fn writer_shutdown_reaches_disk() {
    let path = scratch("writer");
    let store = Arc::new(FileStore::open(&path).unwrap());
    let w = PersistWriter::spawn(store.clone()).unwrap();
    w.with_queue(|q| {
        q.push_block(-1, 2, -20, 30, 70, 8);
        q.push_key(-1, 2, 3);
    });
    w.shutdown();
    drop(store);

    let reopened = FileStore::open(&path).unwrap();
    assert_eq!(reopened.memory().committed_block(-1, 2, -20, 30, 70), Some(8));
    assert_eq!(reopened.get_key(-1, 2).unwrap(), 3);
}

#[test]
fn observer_state_round_trips() {
    let path = scratch("state");
    let pose = ObserverState {
        x: 10.5,
        y: 33.0,
        z: -4.0,
        rx: 1.25,
        ry: -0.5,
    };
    {
        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.load_state().unwrap(), None);
        store.save_state(pose).unwrap();
        store.commit().unwrap();
    }
    assert_eq!(FileStore::open(&path).unwrap().load_state().unwrap(), Some(pose));
}

#[test]
fn corrupt_file_is_a_backend_error() {
    let path = scratch("corrupt");
    fs::write(&path, b"{ not json").unwrap();
    assert!(matches!(FileStore::open(&path), Err(StoreError::Backend(_))));
}
