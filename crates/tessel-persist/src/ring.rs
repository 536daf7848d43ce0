/// Slots allocated by `WriteQueue::default`.
pub const DEFAULT_CAPACITY: usize = 1024;

/// One queued mutation or control marker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QueueEntry {
    Block {
        p: i32,
        q: i32,
        x: i32,
        y: i32,
        z: i32,
        w: i8,
    },
    Light {
        p: i32,
        q: i32,
        x: i32,
        y: i32,
        z: i32,
        w: i8,
    },
    Key {
        p: i32,
        q: i32,
        key: i32,
    },
    Sign {
        p: i32,
        q: i32,
        x: i32,
        y: i32,
        z: i32,
        face: i32,
        text: String,
    },
    DeleteSign {
        x: i32,
        y: i32,
        z: i32,
        face: i32,
    },
    DeleteSigns {
        x: i32,
        y: i32,
        z: i32,
    },
    /// Flush everything before this marker as one transaction.
    Commit,
    /// Commit and stop the consumer.
    Exit,
}

/// Growable circular buffer. Empty when `start == end`; one slot always stays free.
#[derive(Debug)]
pub struct WriteQueue {
    start: usize,
    end: usize,
    data: Vec<Option<QueueEntry>>,
}

impl Default for WriteQueue {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl WriteQueue {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(2);
        Self {
            start: 0,
            end: 0,
            data: vec![None; capacity],
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.start == (self.end + 1) % self.capacity()
    }

    pub fn len(&self) -> usize {
        if self.end >= self.start {
            self.end - self.start
        } else {
            self.capacity() - (self.start - self.end)
        }
    }

    fn grow(&mut self) {
        let mut next = WriteQueue::with_capacity(self.capacity() * 2);
        while let Some(entry) = self.pop() {
            next.push(entry);
        }
        log::debug!(target: "persist", "write queue grew to {}", next.capacity());
        *self = next;
    }

    /// Appends at the tail, doubling the buffer first when full.
    pub fn push(&mut self, entry: QueueEntry) {
        if self.is_full() {
            self.grow();
        }
        self.data[self.end] = Some(entry);
        self.end = (self.end + 1) % self.capacity();
    }

    pub fn pop(&mut self) -> Option<QueueEntry> {
        if self.is_empty() {
            return None;
        }
        let entry = self.data[self.start].take();
        self.start = (self.start + 1) % self.capacity();
        entry
    }

    pub fn push_block(&mut self, p: i32, q: i32, x: i32, y: i32, z: i32, w: i8) {
        self.push(QueueEntry::Block { p, q, x, y, z, w });
    }

    pub fn push_light(&mut self, p: i32, q: i32, x: i32, y: i32, z: i32, w: i8) {
        self.push(QueueEntry::Light { p, q, x, y, z, w });
    }

    pub fn push_key(&mut self, p: i32, q: i32, key: i32) {
        self.push(QueueEntry::Key { p, q, key });
    }

    #[allow(clippy::too_many_arguments)]
    pub fn push_sign(&mut self, p: i32, q: i32, x: i32, y: i32, z: i32, face: i32, text: &str) {
        self.push(QueueEntry::Sign {
            p,
            q,
            x,
            y,
            z,
            face,
            text: text.to_string(),
        });
    }

    pub fn push_delete_sign(&mut self, x: i32, y: i32, z: i32, face: i32) {
        self.push(QueueEntry::DeleteSign { x, y, z, face });
    }

    pub fn push_delete_signs(&mut self, x: i32, y: i32, z: i32) {
        self.push(QueueEntry::DeleteSigns { x, y, z });
    }

    pub fn push_commit(&mut self) {
        self.push(QueueEntry::Commit);
    }

    pub fn push_exit(&mut self) {
        self.push(QueueEntry::Exit);
    }
}
