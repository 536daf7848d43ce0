//! Meshing worker pool: one job slot per worker, polled by a single orchestrator.
#![forbid(unsafe_code)]

mod item;

pub use item::{ChunkLoader, WorkerItem, process_item};

use std::sync::Arc;
use std::time::Instant;

use crossbeam_channel::{Receiver, Sender, TryRecvError, bounded};
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use tessel_mesh_cpu::MeshContext;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum WorkerState {
    Idle,
    Busy,
    Done,
}

/// One job slot. Transitions only Idle -> Busy -> Done -> Idle.
pub struct Worker {
    index: usize,
    state: WorkerState,
    job: Option<(i32, i32)>,
    dispatched_at: Option<Instant>,
    done: Option<WorkerItem>,
    job_tx: Sender<WorkerItem>,
    res_rx: Receiver<WorkerItem>,
}

impl Worker {
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn state(&self) -> WorkerState {
        self.state
    }

    /// Chunk of the job in flight or waiting for collection.
    #[inline]
    pub fn job(&self) -> Option<(i32, i32)> {
        self.job
    }

    /// Hands `item` to the worker. Fails with the item unless Idle.
    pub fn dispatch(&mut self, item: WorkerItem) -> Result<(), WorkerItem> {
        if self.state != WorkerState::Idle {
            return Err(item);
        }
        let pq = (item.p, item.q);
        self.job_tx.send(item).map_err(|e| e.into_inner())?;
        log::trace!(target: "sched", "worker {} dispatch p={} q={}", self.index, pq.0, pq.1);
        self.job = Some(pq);
        self.dispatched_at = Some(Instant::now());
        self.state = WorkerState::Busy;
        Ok(())
    }

    /// Checks for a finished job without blocking.
    pub fn poll(&mut self) -> WorkerState {
        if self.state == WorkerState::Busy {
            match self.res_rx.try_recv() {
                Ok(item) => {
                    if let Some(t0) = self.dispatched_at.take() {
                        log::trace!(
                            target: "perf",
                            "ms={:.2} worker={} job p={} q={}",
                            t0.elapsed().as_secs_f32() * 1000.0,
                            self.index,
                            item.p,
                            item.q
                        );
                    }
                    self.done = Some(item);
                    self.state = WorkerState::Done;
                }
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => {
                    log::error!(target: "sched", "worker {} disconnected while busy", self.index);
                }
            }
        }
        self.state
    }

    /// Takes the finished item and frees the slot. `None` unless Done.
    pub fn take_result(&mut self) -> Option<WorkerItem> {
        if self.state != WorkerState::Done {
            return None;
        }
        let item = self.done.take();
        self.job = None;
        self.state = WorkerState::Idle;
        item
    }
}

pub struct WorkerPool {
    workers: Vec<Worker>,
    _pool: ThreadPool,
}

impl WorkerPool {
    pub fn new(
        count: usize,
        loader: Arc<dyn ChunkLoader>,
        show_lights: bool,
    ) -> Result<Self, ThreadPoolBuildError> {
        Self::with_context(count, loader, Arc::new(MeshContext::new(show_lights, 0)))
    }

    pub fn with_context(
        count: usize,
        loader: Arc<dyn ChunkLoader>,
        ctx: Arc<MeshContext>,
    ) -> Result<Self, ThreadPoolBuildError> {
        let count = count.max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(count)
            .thread_name(|i| format!("tessel-worker-{i}"))
            .build()?;
        let mut workers = Vec::with_capacity(count);
        for index in 0..count {
            let (job_tx, job_rx) = bounded::<WorkerItem>(1);
            let (res_tx, res_rx) = bounded::<WorkerItem>(1);
            let loader = loader.clone();
            let ctx = ctx.clone();
            pool.spawn(move || {
                while let Ok(item) = job_rx.recv() {
                    let out = process_item(ctx.as_ref(), loader.as_ref(), item);
                    if res_tx.send(out).is_err() {
                        break;
                    }
                }
            });
            workers.push(Worker {
                index,
                state: WorkerState::Idle,
                job: None,
                dispatched_at: None,
                done: None,
                job_tx,
                res_rx,
            });
        }
        log::info!(target: "sched", "worker pool started workers={}", count);
        Ok(Self {
            workers,
            _pool: pool,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.workers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    pub fn workers(&self) -> &[Worker] {
        &self.workers
    }

    pub fn worker_mut(&mut self, i: usize) -> Option<&mut Worker> {
        self.workers.get_mut(i)
    }

    pub fn workers_mut(&mut self) -> impl Iterator<Item = &mut Worker> {
        self.workers.iter_mut()
    }

    pub fn idle_count(&self) -> usize {
        self.count(WorkerState::Idle)
    }

    pub fn busy_count(&self) -> usize {
        self.count(WorkerState::Busy)
    }

    fn count(&self, state: WorkerState) -> usize {
        self.workers.iter().filter(|w| w.state == state).count()
    }
}
