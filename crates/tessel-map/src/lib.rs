//! Sparse per-chunk voxel maps (open addressing, 8-bit local coordinates).
#![forbid(unsafe_code)]

mod hash;

pub use hash::{hash_int, slot_hash};

/// Horizontal chunk extent in voxels.
pub const CHUNK_SIZE: i32 = 32;
/// Initial mask for a chunk's block map.
pub const BLOCK_MAP_MASK: usize = 0x7fff;
/// Initial mask for a chunk's light map.
pub const LIGHT_MAP_MASK: usize = 0xf;
/// Probe distance past which an insertion grows the table.
pub const MAX_PROBES: usize = 16;

const MIN_CAPACITY: usize = 2;

/// Chunk coordinate of a continuous world position (`floor(round(x) / CHUNK_SIZE)`).
#[inline]
pub fn chunked(x: f32) -> i32 {
    (x.round() / CHUNK_SIZE as f32).floor() as i32
}

/// Chunk coordinate of an integer world voxel coordinate.
#[inline]
pub fn chunk_of(x: i32) -> i32 {
    x.div_euclid(CHUNK_SIZE)
}

/// One packed slot. All-zero is the empty slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct MapEntry {
    pub x: u8,
    pub y: u8,
    pub z: u8,
    pub w: i8,
}

impl MapEntry {
    pub const EMPTY: MapEntry = MapEntry {
        x: 0,
        y: 0,
        z: 0,
        w: 0,
    };

    // A real voxel at local (0,0,0) written with w=0 collapses into this state and
    // breaks its probe chain. Chunk maps keep a one-voxel border so that slot is
    // never addressed; callers must not write w=0 there.
    #[inline]
    pub fn is_empty(self) -> bool {
        self == MapEntry::EMPTY
    }
}

enum Probe {
    Found(usize),
    Vacant { index: usize, distance: usize },
    Full,
}

#[derive(Clone, Debug)]
pub struct VoxelMap {
    dx: i32,
    dy: i32,
    dz: i32,
    mask: usize,
    size: usize,
    data: Vec<MapEntry>,
}

impl VoxelMap {
    /// Creates a map with origin `(dx,dy,dz)`. `mask` is rounded up to `2^k - 1`.
    pub fn new(dx: i32, dy: i32, dz: i32, mask: usize) -> Self {
        let capacity = mask
            .saturating_add(1)
            .next_power_of_two()
            .max(MIN_CAPACITY);
        Self {
            dx,
            dy,
            dz,
            mask: capacity - 1,
            size: 0,
            data: vec![MapEntry::EMPTY; capacity],
        }
    }

    /// Map for chunk `(p,q)` with the one-voxel border origin.
    pub fn for_chunk(p: i32, q: i32, mask: usize) -> Self {
        Self::new(p * CHUNK_SIZE - 1, 0, q * CHUNK_SIZE - 1, mask)
    }

    #[inline]
    pub fn origin(&self) -> (i32, i32, i32) {
        (self.dx, self.dy, self.dz)
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Occupied slots, tombstones included.
    #[inline]
    pub fn len(&self) -> usize {
        self.size
    }

    /// Entries with a non-zero value.
    pub fn live_len(&self) -> usize {
        self.data
            .iter()
            .filter(|e| !e.is_empty() && e.w != 0)
            .count()
    }

    /// True when no entry holds a non-zero value.
    pub fn is_empty(&self) -> bool {
        self.size == 0 || self.live_len() == 0
    }

    #[inline]
    fn to_local(&self, x: i32, y: i32, z: i32) -> Option<(u8, u8, u8)> {
        let lx = u8::try_from(x.checked_sub(self.dx)?).ok()?;
        let ly = u8::try_from(y.checked_sub(self.dy)?).ok()?;
        let lz = u8::try_from(z.checked_sub(self.dz)?).ok()?;
        Some((lx, ly, lz))
    }

    // Lookups walk until a vacant slot; the load factor keeps one in reach.
    fn probe(&self, lx: u8, ly: u8, lz: u8) -> Probe {
        let mut index = slot_hash(lx, ly, lz) & self.mask;
        for distance in 0..self.data.len() {
            let e = self.data[index];
            if e.is_empty() {
                return Probe::Vacant { index, distance };
            }
            if e.x == lx && e.y == ly && e.z == lz {
                return Probe::Found(index);
            }
            index = (index + 1) & self.mask;
        }
        Probe::Full
    }

    /// Writes `w` at world `(x,y,z)`; returns whether the stored value changed.
    ///
    /// `w == 0` on an existing entry keeps the slot as a tombstone so later probe
    /// chains stay intact. Coordinates outside the 8-bit local range are ignored.
    /// An insertion landing more than `MAX_PROBES` slots from home doubles the
    /// table once, then takes the first vacant slot.
    pub fn set(&mut self, x: i32, y: i32, z: i32, w: i8) -> bool {
        let Some((lx, ly, lz)) = self.to_local(x, y, z) else {
            log::trace!("voxel map: ignoring out-of-range set at ({x},{y},{z})");
            return false;
        };
        let mut grown = false;
        loop {
            match self.probe(lx, ly, lz) {
                Probe::Found(i) => {
                    let entry = &mut self.data[i];
                    if entry.w == w {
                        return false;
                    }
                    entry.w = w;
                    return true;
                }
                Probe::Vacant { .. } | Probe::Full if w == 0 => return false,
                Probe::Vacant { distance, .. } if distance >= MAX_PROBES && !grown => {
                    self.grow();
                    grown = true;
                }
                Probe::Vacant { index, .. } => {
                    self.data[index] = MapEntry {
                        x: lx,
                        y: ly,
                        z: lz,
                        w,
                    };
                    self.size += 1;
                    if self.size * 2 > self.mask {
                        self.grow();
                    }
                    return true;
                }
                Probe::Full => self.grow(),
            }
        }
    }

    /// Value at world `(x,y,z)`, 0 when absent.
    pub fn get(&self, x: i32, y: i32, z: i32) -> i8 {
        let Some((lx, ly, lz)) = self.to_local(x, y, z) else {
            return 0;
        };
        match self.probe(lx, ly, lz) {
            Probe::Found(i) => self.data[i].w,
            Probe::Vacant { .. } | Probe::Full => 0,
        }
    }

    /// Live entries as `(x, y, z, w)` in world coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (i32, i32, i32, i8)> + '_ {
        self.data
            .iter()
            .filter(|e| !e.is_empty() && e.w != 0)
            .map(move |e| {
                (
                    i32::from(e.x) + self.dx,
                    i32::from(e.y) + self.dy,
                    i32::from(e.z) + self.dz,
                    e.w,
                )
            })
    }

    /// Doubles the table and reinserts live entries; tombstones are dropped.
    fn grow(&mut self) {
        let capacity = self.data.len() * 2;
        let mask = capacity - 1;
        let mut data = vec![MapEntry::EMPTY; capacity];
        let mut size = 0;
        for e in self.data.iter().filter(|e| !e.is_empty() && e.w != 0) {
            let mut index = slot_hash(e.x, e.y, e.z) & mask;
            while !data[index].is_empty() {
                index = (index + 1) & mask;
            }
            data[index] = *e;
            size += 1;
        }
        log::trace!(
            "voxel map grow: {} -> {} slots, {} live",
            self.data.len(),
            capacity,
            size
        );
        self.data = data;
        self.mask = mask;
        self.size = size;
    }
}
