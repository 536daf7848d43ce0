use std::collections::HashMap;

use proptest::prelude::*;
use tessel_map::{CHUNK_SIZE, LIGHT_MAP_MASK, VoxelMap};

fn chunk_coord() -> impl Strategy<Value = i32> {
    -64i32..=64
}

// Local coordinates inside the one-voxel-bordered chunk, never the aliased origin slot.
fn local_xyz() -> impl Strategy<Value = (i32, i32, i32)> {
    (0i32..=CHUNK_SIZE + 1, 0i32..=255, 0i32..=CHUNK_SIZE + 1)
        .prop_filter("origin slot", |&(x, y, z)| (x, y, z) != (0, 0, 0))
}

fn op() -> impl Strategy<Value = ((i32, i32, i32), i8)> {
    (local_xyz(), prop_oneof![Just(0i8), any::<i8>()])
}

proptest! {
    // get returns the last non-zero write, or 0
    #[test]
    fn get_matches_last_write(p in chunk_coord(), q in chunk_coord(), ops in prop::collection::vec(op(), 0..400)) {
        let mut map = VoxelMap::for_chunk(p, q, LIGHT_MAP_MASK);
        let (dx, dy, dz) = map.origin();
        let mut model: HashMap<(i32, i32, i32), i8> = HashMap::new();
        for ((lx, ly, lz), w) in ops.iter().copied() {
            let (x, y, z) = (lx + dx, ly + dy, lz + dz);
            let before = model.get(&(x, y, z)).copied().unwrap_or(0);
            let changed = map.set(x, y, z, w);
            prop_assert_eq!(changed, before != w);
            if w == 0 { model.remove(&(x, y, z)); } else { model.insert((x, y, z), w); }
        }
        for ((lx, ly, lz), _) in ops.iter().copied() {
            let (x, y, z) = (lx + dx, ly + dy, lz + dz);
            prop_assert_eq!(map.get(x, y, z), model.get(&(x, y, z)).copied().unwrap_or(0));
        }
        let mut seen: Vec<_> = map.iter().map(|(x, y, z, w)| ((x, y, z), w)).collect();
        let mut want: Vec<_> = model.into_iter().collect();
        seen.sort();
        want.sort();
        prop_assert_eq!(seen, want);
    }

    // capacity stays a power of two and iteration never duplicates
    #[test]
    fn growth_keeps_every_entry_once(ops in prop::collection::vec(local_xyz(), 1..600)) {
        let mut map = VoxelMap::new(0, 0, 0, 1);
        let mut distinct = std::collections::HashSet::new();
        for (x, y, z) in ops {
            map.set(x, y, z, 5);
            distinct.insert((x, y, z));
        }
        prop_assert!(map.capacity().is_power_of_two());
        prop_assert!(map.len() <= map.capacity());
        prop_assert_eq!(map.iter().count(), distinct.len());
        prop_assert_eq!(map.live_len(), distinct.len());
    }

    // clone is deep: mutating the copy leaves the source unchanged
    #[test]
    fn clone_is_independent(ops in prop::collection::vec(op(), 1..200), extra in prop::collection::vec(op(), 1..200)) {
        let mut src = VoxelMap::for_chunk(0, 0, LIGHT_MAP_MASK);
        let (dx, dy, dz) = src.origin();
        for ((x, y, z), w) in ops {
            src.set(x + dx, y + dy, z + dz, w);
        }
        let mut before: Vec<_> = src.iter().collect();
        before.sort();

        let mut copy = src.clone();
        prop_assert_eq!(copy.origin(), src.origin());
        let mut copied: Vec<_> = copy.iter().collect();
        copied.sort();
        prop_assert_eq!(&copied, &before);

        for ((x, y, z), w) in extra {
            copy.set(x + dx, y + dy, z + dz, w);
        }
        let mut after: Vec<_> = src.iter().collect();
        after.sort();
        prop_assert_eq!(after, before);
    }
}
