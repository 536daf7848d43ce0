use std::io;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use crate::ring::{QueueEntry, WriteQueue};
use crate::store::{DurableStore, StoreError};

pub type SharedQueue = Arc<(Mutex<WriteQueue>, Condvar)>;

/// Hands one data entry to the store. Control markers are ignored here.
pub fn apply_entry(store: &dyn DurableStore, entry: &QueueEntry) -> Result<(), StoreError> {
    match entry {
        QueueEntry::Block { p, q, x, y, z, w } => store.insert_block(*p, *q, *x, *y, *z, *w),
        QueueEntry::Light { p, q, x, y, z, w } => store.insert_light(*p, *q, *x, *y, *z, *w),
        QueueEntry::Key { p, q, key } => store.set_key(*p, *q, *key),
        QueueEntry::Sign {
            p,
            q,
            x,
            y,
            z,
            face,
            text,
        } => store.insert_sign(*p, *q, *x, *y, *z, *face, text),
        QueueEntry::DeleteSign { x, y, z, face } => store.delete_sign(*x, *y, *z, *face),
        QueueEntry::DeleteSigns { x, y, z } => store.delete_signs(*x, *y, *z),
        QueueEntry::Commit | QueueEntry::Exit => Ok(()),
    }
}

fn lock(queue: &SharedQueue) -> MutexGuard<'_, WriteQueue> {
    queue.0.lock().unwrap_or_else(PoisonError::into_inner)
}

fn next_entry(queue: &SharedQueue) -> QueueEntry {
    let (_, cvar) = &**queue;
    let mut q = lock(queue);
    loop {
        if let Some(entry) = q.pop() {
            return entry;
        }
        q = cvar.wait(q).unwrap_or_else(PoisonError::into_inner);
    }
}

fn run(queue: SharedQueue, store: Arc<dyn DurableStore>) {
    let mut applied = 0usize;
    loop {
        let entry = next_entry(&queue);
        let result = match &entry {
            QueueEntry::Commit | QueueEntry::Exit => {
                log::debug!(target: "persist", "commit applied={}", applied);
                applied = 0;
                store.commit()
            }
            other => {
                applied += 1;
                apply_entry(store.as_ref(), other)
            }
        };
        if let Err(e) = result {
            log::warn!(target: "persist", "{:?} failed: {}", entry, e);
        }
        if entry == QueueEntry::Exit {
            break;
        }
    }
    log::info!(target: "persist", "writer stopped");
}

/// Owns the write-behind queue and the thread draining it into a `DurableStore`.
pub struct PersistWriter {
    queue: SharedQueue,
    handle: Option<JoinHandle<()>>,
}

impl PersistWriter {
    pub fn spawn(store: Arc<dyn DurableStore>) -> io::Result<Self> {
        let queue: SharedQueue = Arc::new((Mutex::new(WriteQueue::default()), Condvar::new()));
        let worker_queue = queue.clone();
        let handle = thread::Builder::new()
            .name("tessel-persist".into())
            .spawn(move || run(worker_queue, store))?;
        Ok(Self {
            queue,
            handle: Some(handle),
        })
    }

    /// Appends under the queue lock and wakes the writer.
    pub fn enqueue(&self, entry: QueueEntry) {
        lock(&self.queue).push(entry);
        self.queue.1.notify_one();
    }

    /// Runs `f` against the locked queue, then wakes the writer.
    pub fn with_queue<T>(&self, f: impl FnOnce(&mut WriteQueue) -> T) -> T {
        let out = f(&mut lock(&self.queue));
        self.queue.1.notify_one();
        out
    }

    pub fn commit(&self) {
        self.enqueue(QueueEntry::Commit);
    }

    /// Entries not yet picked up by the writer.
    pub fn pending(&self) -> usize {
        lock(&self.queue).len()
    }

    fn stop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        self.enqueue(QueueEntry::Exit);
        if handle.join().is_err() {
            log::error!(target: "persist", "writer thread panicked");
        }
    }

    /// Flushes everything queued so far with a final commit and joins the writer.
    pub fn shutdown(mut self) {
        self.stop();
    }
}

impl Drop for PersistWriter {
    fn drop(&mut self) {
        self.stop();
    }
}
