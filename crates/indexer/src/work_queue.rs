use crate::error::{IndexerError, Result};
use log::{debug, error, warn};
use std::any::Any;
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

/// Pool size used when a thread count is requested without a value.
pub const DEFAULT_THREADS: usize = 5;

/// Unit of work executed by a pool thread.
pub type Task = Box<dyn FnOnce() -> Result<()> + Send + 'static>;

/// Validates an operator-supplied thread count before any pool is built.
pub fn thread_count(requested: i64) -> Result<usize> {
    match usize::try_from(requested) {
        Ok(threads) if threads > 0 => Ok(threads),
        _ => Err(IndexerError::InvalidThreadCount(requested)),
    }
}

struct QueueState {
    tasks: VecDeque<Task>,
    pending: usize,
    shutdown: bool,
}

struct Shared {
    state: Mutex<QueueState>,
    work_available: Condvar,
    idle: Condvar,
}

impl Shared {
    fn state(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn submit(&self, task: Task) {
        let mut state = self.state();
        if state.shutdown {
            warn!("work queue is shut down; dropping submitted task");
            return;
        }
        state.tasks.push_back(task);
        state.pending += 1;
        self.work_available.notify_one();
    }

    fn next_task(&self) -> Option<Task> {
        let mut state = self.state();
        while state.tasks.is_empty() && !state.shutdown {
            state = self
                .work_available
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        if state.shutdown {
            return None;
        }
        state.tasks.pop_front()
    }

    fn complete(&self) {
        let mut state = self.state();
        state.pending -= 1;
        if state.pending == 0 {
            self.idle.notify_all();
        }
    }
}

/// Fixed pool of worker threads draining a FIFO task queue.
///
/// Every submitted task is counted as pending until it finishes, whether it
/// returns `Ok`, returns `Err` or panics, so [`WorkQueue::await_idle`] always
/// returns once the queue drains. Call `await_idle` before
/// [`WorkQueue::shutdown`] when every submitted task must run: shutdown
/// discards the backlog that no worker has picked up yet.
pub struct WorkQueue {
    shared: Arc<Shared>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    size: usize,
}

impl WorkQueue {
    pub fn new(threads: usize) -> Result<Self> {
        if threads == 0 {
            return Err(IndexerError::InvalidThreadCount(0));
        }

        let shared = Arc::new(Shared {
            state: Mutex::new(QueueState {
                tasks: VecDeque::new(),
                pending: 0,
                shutdown: false,
            }),
            work_available: Condvar::new(),
            idle: Condvar::new(),
        });

        let queue = Self {
            shared,
            workers: Mutex::new(Vec::with_capacity(threads)),
            size: threads,
        };

        for id in 0..threads {
            let shared = Arc::clone(&queue.shared);
            let handle = thread::Builder::new()
                .name(format!("sift-worker-{id}"))
                .spawn(move || worker_loop(&shared))?;
            queue.workers().push(handle);
        }

        debug!("started work queue with {threads} workers");
        Ok(queue)
    }

    pub fn submit<F>(&self, task: F)
    where
        F: FnOnce() -> Result<()> + Send + 'static,
    {
        self.shared.submit(Box::new(task));
    }

    /// Cloneable handle that lets running tasks enqueue follow-up work.
    #[must_use]
    pub fn submitter(&self) -> Submitter {
        Submitter {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Blocks until every submitted task has finished.
    pub fn await_idle(&self) {
        let mut state = self.shared.state();
        while state.pending > 0 {
            state = self
                .shared
                .idle
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Stops the workers after their current task and joins them.
    ///
    /// Tasks still waiting in the queue are dropped without running.
    pub fn shutdown(&self) {
        {
            let mut state = self.shared.state();
            if !state.shutdown {
                state.shutdown = true;
                let dropped = state.tasks.len();
                if dropped > 0 {
                    warn!("work queue shut down with {dropped} queued tasks not run");
                    state.tasks.clear();
                    state.pending -= dropped;
                    if state.pending == 0 {
                        self.shared.idle.notify_all();
                    }
                }
            }
            self.shared.work_available.notify_all();
        }

        let current = thread::current().id();
        let handles: Vec<_> = self.workers().drain(..).collect();
        for handle in handles {
            if handle.thread().id() == current {
                continue;
            }
            if handle.join().is_err() {
                error!("work queue worker exited abnormally");
            }
        }
    }

    /// Drains all pending work, then stops the pool.
    pub fn close(&self) {
        self.await_idle();
        self.shutdown();
    }

    /// Number of worker threads.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Tasks submitted but not yet finished.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.shared.state().pending
    }

    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        self.shared.state().shutdown
    }

    fn workers(&self) -> MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.workers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for WorkQueue {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Submission-only handle to a [`WorkQueue`].
#[derive(Clone)]
pub struct Submitter {
    shared: Arc<Shared>,
}

impl Submitter {
    pub fn submit<F>(&self, task: F)
    where
        F: FnOnce() -> Result<()> + Send + 'static,
    {
        self.shared.submit(Box::new(task));
    }
}

fn worker_loop(shared: &Shared) {
    while let Some(task) = shared.next_task() {
        match panic::catch_unwind(AssertUnwindSafe(task)) {
            Ok(Ok(())) => {}
            Ok(Err(err)) => warn!("task failed: {err}"),
            Err(payload) => error!("task panicked: {}", panic_message(payload.as_ref())),
        }
        shared.complete();
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic payload"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn runs_every_task_exactly_once() {
        let queue = WorkQueue::new(4).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..100 {
            let counter = Arc::clone(&counter);
            queue.submit(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });
        }

        queue.await_idle();
        assert_eq!(counter.load(Ordering::SeqCst), 100);
        queue.shutdown();
        assert_eq!(counter.load(Ordering::SeqCst), 100);
        assert_eq!(queue.pending(), 0);
        assert_eq!(queue.size(), 4);
    }

    #[test]
    fn rejects_zero_threads() {
        assert!(matches!(
            WorkQueue::new(0),
            Err(IndexerError::InvalidThreadCount(0))
        ));
    }

    #[test]
    fn thread_count_rejects_non_positive_values() {
        assert_eq!(thread_count(3).unwrap(), 3);
        assert!(matches!(
            thread_count(0),
            Err(IndexerError::InvalidThreadCount(0))
        ));
        assert!(matches!(
            thread_count(-2),
            Err(IndexerError::InvalidThreadCount(-2))
        ));
    }

    #[test]
    fn failing_and_panicking_tasks_do_not_stall_the_pool() {
        let queue = WorkQueue::new(2).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));

        queue.submit(|| Err(IndexerError::Other("expected failure".into())));
        queue.submit(|| panic!("expected panic"));
        for _ in 0..10 {
            let counter = Arc::clone(&counter);
            queue.submit(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });
        }

        queue.close();
        assert_eq!(counter.load(Ordering::SeqCst), 10);
    }

    #[test]
    fn tasks_can_submit_follow_up_work() {
        let queue = WorkQueue::new(3).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..5 {
            let submitter = queue.submitter();
            let counter = Arc::clone(&counter);
            queue.submit(move || {
                for _ in 0..4 {
                    let counter = Arc::clone(&counter);
                    submitter.submit(move || {
                        counter.fetch_add(1, Ordering::SeqCst);
                        Ok(())
                    });
                }
                Ok(())
            });
        }

        queue.await_idle();
        assert_eq!(counter.load(Ordering::SeqCst), 20);
    }

    #[test]
    fn shutdown_discards_backlog_but_finishes_running_task() {
        let queue = Arc::new(WorkQueue::new(1).unwrap());
        let counter = Arc::new(AtomicUsize::new(0));
        let (started_tx, started_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();

        {
            let counter = Arc::clone(&counter);
            queue.submit(move || {
                started_tx.send(()).ok();
                release_rx.recv().ok();
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });
        }
        started_rx.recv().unwrap();

        for _ in 0..5 {
            let counter = Arc::clone(&counter);
            queue.submit(move || {
                counter.fetch_add(100, Ordering::SeqCst);
                Ok(())
            });
        }

        let stopper = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.shutdown())
        };
        while !queue.is_shutdown() {
            thread::sleep(Duration::from_millis(1));
        }
        release_tx.send(()).unwrap();
        stopper.join().unwrap();

        assert_eq!(counter.load(Ordering::SeqCst), 1);
        queue.await_idle();
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn submit_after_shutdown_is_ignored() {
        let queue = WorkQueue::new(1).unwrap();
        queue.shutdown();
        queue.submit(|| Ok(()));
        assert_eq!(queue.pending(), 0);
        queue.await_idle();
    }
}
