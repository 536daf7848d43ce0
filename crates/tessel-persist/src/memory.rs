use std::sync::{Mutex, PoisonError};

use hashbrown::HashMap;
use tessel_map::VoxelMap;

use crate::store::{DurableStore, ObserverState, Sign, StoreError};

pub(crate) type Cell = (i32, i32, i32, i32, i32);

#[derive(Clone, Debug)]
enum Op {
    Block(Cell, i8),
    Light(Cell, i8),
    Sign { p: i32, q: i32, sign: Sign },
    DeleteSign(i32, i32, i32, i32),
    DeleteSigns(i32, i32, i32),
    Key(i32, i32, i32),
    State(ObserverState),
}

#[derive(Clone, Default, Debug, PartialEq)]
pub(crate) struct Tables {
    pub(crate) blocks: HashMap<Cell, i8>,
    pub(crate) lights: HashMap<Cell, i8>,
    // keyed like a unique (x,y,z,face) index; value carries the owning chunk
    pub(crate) signs: HashMap<(i32, i32, i32, i32), (i32, i32, Sign)>,
    pub(crate) keys: HashMap<(i32, i32), i32>,
    pub(crate) state: Option<ObserverState>,
}

impl Tables {
    fn apply(&mut self, op: &Op) {
        match op {
            Op::Block(cell, w) => {
                self.blocks.insert(*cell, *w);
            }
            Op::Light(cell, w) => {
                self.lights.insert(*cell, *w);
            }
            Op::Sign { p, q, sign } => {
                self.signs.insert(
                    (sign.x, sign.y, sign.z, sign.face),
                    (*p, *q, sign.clone()),
                );
            }
            Op::DeleteSign(x, y, z, face) => {
                self.signs.remove(&(*x, *y, *z, *face));
            }
            Op::DeleteSigns(x, y, z) => {
                self.signs
                    .retain(|&(sx, sy, sz, _), _| (sx, sy, sz) != (*x, *y, *z));
            }
            Op::Key(p, q, key) => {
                self.keys.insert((*p, *q), *key);
            }
            Op::State(state) => self.state = Some(*state),
        }
    }
}

#[derive(Default, Debug)]
struct Inner {
    committed: Tables,
    open: Vec<Op>,
    commits: usize,
    closed: bool,
}

impl Inner {
    fn fold(&mut self) {
        let ops = std::mem::take(&mut self.open);
        for op in &ops {
            self.committed.apply(op);
        }
        self.commits += 1;
        log::debug!(target: "persist", "commit ops={}", ops.len());
    }

    /// Committed state with the open transaction replayed on top.
    fn view(&self) -> Tables {
        let mut t = self.committed.clone();
        for op in &self.open {
            t.apply(op);
        }
        t
    }
}

/// Thread-safe in-memory store with single-transaction semantics.
#[derive(Default, Debug)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose committed state starts as `committed`.
    pub(crate) fn with_committed(committed: Tables) -> Self {
        Self {
            inner: Mutex::new(Inner {
                committed,
                ..Inner::default()
            }),
        }
    }

    /// Folds the open transaction in and returns the committed state.
    pub(crate) fn commit_tables(&self) -> Result<Tables, StoreError> {
        self.with(|inner| {
            inner.fold();
            inner.committed.clone()
        })
    }

    fn with<T>(&self, f: impl FnOnce(&mut Inner) -> T) -> Result<T, StoreError> {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if inner.closed {
            return Err(StoreError::Closed);
        }
        Ok(f(&mut inner))
    }

    fn record(&self, op: Op) -> Result<(), StoreError> {
        self.with(|inner| inner.open.push(op))
    }

    /// Rejects every later call with `StoreError::Closed`.
    pub fn close(&self) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .closed = true;
    }

    pub fn committed_block(&self, p: i32, q: i32, x: i32, y: i32, z: i32) -> Option<i8> {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.committed.blocks.get(&(p, q, x, y, z)).copied()
    }

    pub fn committed_light(&self, p: i32, q: i32, x: i32, y: i32, z: i32) -> Option<i8> {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.committed.lights.get(&(p, q, x, y, z)).copied()
    }

    pub fn committed_key(&self, p: i32, q: i32) -> Option<i32> {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.committed.keys.get(&(p, q)).copied()
    }

    pub fn committed_signs(&self) -> usize {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.committed.signs.len()
    }

    pub fn commit_count(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .commits
    }

    /// Operations waiting in the open transaction.
    pub fn uncommitted(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .open
            .len()
    }
}

impl DurableStore for MemoryStore {
    fn insert_block(
        &self,
        p: i32,
        q: i32,
        x: i32,
        y: i32,
        z: i32,
        w: i8,
    ) -> Result<(), StoreError> {
        self.record(Op::Block((p, q, x, y, z), w))
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
        self.record(Op::Light((p, q, x, y, z), w))
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
        self.record(Op::Sign {
            p,
            q,
            sign: Sign::new(x, y, z, face, text),
        })
    }

    fn delete_sign(&self, x: i32, y: i32, z: i32, face: i32) -> Result<(), StoreError> {
        self.record(Op::DeleteSign(x, y, z, face))
    }

    fn delete_signs(&self, x: i32, y: i32, z: i32) -> Result<(), StoreError> {
        self.record(Op::DeleteSigns(x, y, z))
    }

    fn set_key(&self, p: i32, q: i32, key: i32) -> Result<(), StoreError> {
        self.record(Op::Key(p, q, key))
    }

    fn get_key(&self, p: i32, q: i32) -> Result<i32, StoreError> {
        self.with(|inner| inner.view().keys.get(&(p, q)).copied().unwrap_or(0))
    }

    fn commit(&self) -> Result<(), StoreError> {
        self.with(Inner::fold)
    }

    fn save_state(&self, state: ObserverState) -> Result<(), StoreError> {
        self.record(Op::State(state))
    }

    fn load_state(&self) -> Result<Option<ObserverState>, StoreError> {
        self.with(|inner| inner.view().state)
    }

    fn load_blocks(&self, p: i32, q: i32, map: &mut VoxelMap) -> Result<(), StoreError> {
        let view = self.with(|inner| inner.view())?;
        for (&(bp, bq, x, y, z), &w) in &view.blocks {
            if (bp, bq) == (p, q) {
                map.set(x, y, z, w);
            }
        }
        Ok(())
    }

    fn load_lights(&self, p: i32, q: i32, map: &mut VoxelMap) -> Result<(), StoreError> {
        let view = self.with(|inner| inner.view())?;
        for (&(lp, lq, x, y, z), &w) in &view.lights {
            if (lp, lq) == (p, q) {
                map.set(x, y, z, w);
            }
        }
        Ok(())
    }

    fn load_signs(&self, p: i32, q: i32) -> Result<Vec<Sign>, StoreError> {
        let view = self.with(|inner| inner.view())?;
        let mut out: Vec<Sign> = view
            .signs
            .into_values()
            .filter(|(sp, sq, _)| (*sp, *sq) == (p, q))
            .map(|(_, _, s)| s)
            .collect();
        out.sort_by_key(|s| (s.x, s.y, s.z, s.face));
        Ok(out)
    }
}
