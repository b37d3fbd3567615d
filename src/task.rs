//! Concurrency primitives for the rasterizer: a single-producer/multiple-consumer task queue
//! and a deferred worker pool.
//!
//! "Deferred" means tasks accumulate without running: the producer pushes work while it keeps
//! mutating its scratch state, then releases the whole batch with
//! [`run_tasks_and_wait`][DeferredPool::run_tasks_and_wait], which doubles as the completion
//! barrier. With zero workers the pool degrades to running the batch inline on the caller,
//! which is the single-threaded mode.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;

/// A unit of rasterization work.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

struct QueueState {
    /// Tasks pushed but not yet released to the workers.
    pending: VecDeque<Task>,

    /// Tasks released and claimable by any worker.
    active: VecDeque<Task>,

    /// Number of workers currently executing a task.
    running: usize,

    /// Set on drop; workers exit when no active work remains.
    shutdown: bool,
}

/// Shared queue of the pool.
struct SpmcQueue {
    state: Mutex<QueueState>,

    /// Signalled when active work arrives or shutdown is requested.
    work_available: Condvar,

    /// Signalled when a worker finishes a task.
    work_done: Condvar,
}

impl SpmcQueue {
    fn new() -> SpmcQueue {
        SpmcQueue {
            state: Mutex::new(QueueState {
                pending: VecDeque::new(),
                active: VecDeque::new(),
                running: 0,
                shutdown: false,
            }),
            work_available: Condvar::new(),
            work_done: Condvar::new(),
        }
    }

    /// Worker loop: claim active tasks until shutdown.
    fn worker_loop(&self) {
        loop {
            let task = {
                let mut state = self.state.lock().unwrap();
                loop {
                    if let Some(task) = state.active.pop_front() {
                        state.running += 1;
                        break task;
                    }
                    if state.shutdown {
                        return;
                    }
                    state = self.work_available.wait(state).unwrap();
                }
            };

            task();

            let mut state = self.state.lock().unwrap();
            state.running -= 1;
            if state.active.is_empty() && state.running == 0 {
                self.work_done.notify_all();
            }
        }
    }
}

/// A fixed-size worker pool executing deferred task batches.
pub struct DeferredPool {
    queue: Arc<SpmcQueue>,
    workers: Vec<JoinHandle<()>>,
}

impl DeferredPool {
    /// Creates a pool with `thread_count` workers. `0` selects single-threaded operation.
    pub fn new(thread_count: usize) -> DeferredPool {
        let queue = Arc::new(SpmcQueue::new());

        let workers = (0..thread_count)
            .map(|i| {
                let queue = Arc::clone(&queue);
                std::thread::Builder::new()
                    .name(format!("glimmer-raster-{i}"))
                    .spawn(move || queue.worker_loop())
                    .expect("failed to spawn rasterizer worker")
            })
            .collect();

        log::debug!("rasterizer pool started with {thread_count} worker(s)");

        DeferredPool { queue, workers }
    }

    /// Number of workers.
    pub fn thread_count(&self) -> usize {
        self.workers.len()
    }

    /// Queues a task without running it.
    pub fn push_task(&self, task: Task) {
        let mut state = self.queue.state.lock().unwrap();
        state.pending.push_back(task);
    }

    /// Releases all queued tasks and blocks until every one of them has completed.
    pub fn run_tasks_and_wait(&self) {
        if self.workers.is_empty() {
            // Single-threaded mode: drain inline.
            loop {
                let task = {
                    let mut state = self.queue.state.lock().unwrap();
                    state.pending.pop_front()
                };
                match task {
                    Some(task) => task(),
                    None => return,
                }
            }
        }

        let mut state = self.queue.state.lock().unwrap();
        let released = std::mem::take(&mut state.pending);
        state.active.extend(released);
        self.queue.work_available.notify_all();

        while !(state.active.is_empty() && state.running == 0) {
            state = self.queue.work_done.wait(state).unwrap();
        }
    }
}

impl Drop for DeferredPool {
    fn drop(&mut self) {
        {
            let mut state = self.queue.state.lock().unwrap();
            state.shutdown = true;
        }
        self.queue.work_available.notify_all();

        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}
