//! A bounded worker pool executing a fork-join traversal over dynamically
//! discovered work.
//!
//! A fixed set of N tasks drain a shared FIFO queue of work units. A unit's
//! processing function returns either further work units to enqueue
//! (`PoolOutcome::Spawn`), a result to collect (`PoolOutcome::Done`), or
//! nothing (`PoolOutcome::Empty` — the unit handled its own fan-out or was a
//! dead end). `join()` blocks until the queue is empty *and* no worker is
//! currently executing a unit; after it returns, `get_results()` drains the
//! accumulated results and the pool is ready for another round of
//! `push`/`join`.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{Mutex, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, error};

pub enum PoolOutcome<T, R> {
    Spawn(Vec<T>),
    Done(R),
    Empty,
}

type ProcessFuture<T, R> = Pin<Box<dyn Future<Output = PoolOutcome<T, R>> + Send>>;
type ProcessFn<T, R> = Arc<dyn Fn(T) -> ProcessFuture<T, R> + Send + Sync>;

struct State<T> {
    queue: VecDeque<T>,
    in_flight: usize,
}

/// The enqueue/join half of the pool, cheap to clone and shared with every
/// worker task so a unit's children can be pushed back without a reference
/// to the pool itself.
struct Handle<T> {
    state: Arc<Mutex<State<T>>>,
    notify: Arc<Notify>,
}

impl<T: Send + 'static> Handle<T> {
    async fn push(&self, unit: T) {
        {
            let mut state = self.state.lock().await;
            state.queue.push_back(unit);
        }
        self.notify.notify_waiters();
    }

    /// Pops a unit and marks it in-flight in the same critical section, so
    /// `join()` never observes a transient "queue empty, in_flight still
    /// zero" state for a unit that's about to start running.
    async fn pop_and_mark_in_flight(&self) -> Option<T> {
        let mut state = self.state.lock().await;
        let unit = state.queue.pop_front();
        if unit.is_some() {
            state.in_flight += 1;
        }
        unit
    }

    async fn mark_done(&self) {
        {
            let mut state = self.state.lock().await;
            state.in_flight -= 1;
        }
        self.notify.notify_waiters();
    }

    async fn is_drained(&self) -> bool {
        let state = self.state.lock().await;
        state.queue.is_empty() && state.in_flight == 0
    }

    async fn join(&self) {
        loop {
            // Create the Notified future *before* checking the condition: tokio
            // guarantees a notify_waiters() call racing with this check is not
            // lost, because the future captures the current notification epoch
            // at creation time, not at first poll.
            let notified = self.notify.notified();
            if self.is_drained().await {
                return;
            }
            notified.await;
        }
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            notify: self.notify.clone(),
        }
    }
}

pub struct WorkerPool<T, R>
where
    T: Send + 'static,
    R: Send + 'static,
{
    handle: Handle<T>,
    results: Arc<Mutex<Vec<R>>>,
    closed: Arc<AtomicBool>,
    workers: Vec<JoinHandle<()>>,
}

impl<T, R> WorkerPool<T, R>
where
    T: Send + 'static,
    R: Send + 'static,
{
    /// Spawns `num_workers` tasks that drain the queue using `process`. A
    /// failed `process` call (an `Err` the caller chooses to log) is reported
    /// by the caller; a task that panics is caught at the `process` call site
    /// by the caller wrapping it, since `process` itself returns `PoolOutcome`
    /// rather than a `Result` — callers fold their own error handling into
    /// `PoolOutcome::Empty` plus a `tracing::warn!` at the call site.
    pub fn new<F, Fut>(num_workers: usize, process: F) -> Self
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = PoolOutcome<T, R>> + Send + 'static,
    {
        let handle = Handle {
            state: Arc::new(Mutex::new(State {
                queue: VecDeque::new(),
                in_flight: 0,
            })),
            notify: Arc::new(Notify::new()),
        };
        let results: Arc<Mutex<Vec<R>>> = Arc::new(Mutex::new(Vec::new()));
        let closed = Arc::new(AtomicBool::new(false));
        let process: ProcessFn<T, R> = Arc::new(move |unit| Box::pin(process(unit)));

        let workers = (0..num_workers.max(1))
            .map(|id| {
                let handle = handle.clone();
                let results = results.clone();
                let closed = closed.clone();
                let process = process.clone();
                tokio::spawn(async move {
                    worker_loop(id, handle, results, closed, process).await;
                })
            })
            .collect();

        Self {
            handle,
            results,
            closed,
            workers,
        }
    }

    /// Enqueues a unit. Callable at any time, including from within a
    /// running task's own processing (handled transparently since `process`
    /// returns children instead of pushing directly).
    pub async fn push(&self, unit: T) {
        self.handle.push(unit).await;
    }

    /// Blocks until the queue is empty and no worker is executing. Safe to
    /// call `push` and `join` again afterwards.
    pub async fn join(&self) {
        self.handle.join().await;
    }

    /// Returns and clears the accumulated results.
    pub async fn get_results(&self) -> Vec<R> {
        let mut results = self.results.lock().await;
        std::mem::take(&mut *results)
    }

    pub async fn queue_len(&self) -> usize {
        self.handle.state.lock().await.queue.len()
    }

    pub async fn in_flight(&self) -> usize {
        self.handle.state.lock().await.in_flight
    }

    /// Terminates workers. Call after the final `join()`.
    pub async fn close(self) {
        self.closed.store(true, Ordering::SeqCst);
        self.handle.notify.notify_waiters();
        for worker in self.workers {
            let _ = worker.await;
        }
    }
}

async fn worker_loop<T, R>(
    id: usize,
    handle: Handle<T>,
    results: Arc<Mutex<Vec<R>>>,
    closed: Arc<AtomicBool>,
    process: ProcessFn<T, R>,
) where
    T: Send + 'static,
    R: Send + 'static,
{
    loop {
        let notified = handle.notify.notified();
        match handle.pop_and_mark_in_flight().await {
            Some(unit) => {
                let outcome = process(unit).await;
                match outcome {
                    PoolOutcome::Spawn(children) => {
                        for child in children {
                            handle.push(child).await;
                        }
                    }
                    PoolOutcome::Done(result) => {
                        results.lock().await.push(result);
                    }
                    PoolOutcome::Empty => {}
                }
                handle.mark_done().await;
            }
            None => {
                if closed.load(Ordering::SeqCst) {
                    debug!(worker = id, "worker exiting, pool closed");
                    return;
                }
                notified.await;
            }
        }
    }
}

/// Convenience for the common "log and drop" error policy: a task that fails
/// is reported and counted as complete, its error absent from results.
pub fn log_task_error(unit_debug: &str, err: &dyn std::error::Error) {
    error!(unit = unit_debug, error = %err, "work unit failed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[tokio::test]
    async fn fork_join_collects_every_leaf() {
        // Board -> 5 Pages -> 4 Threads -> 3 Posts, mirrors the spec's scenario 4.
        #[derive(Debug)]
        enum Unit {
            Board,
            Page,
            Thread,
            Post(u32),
        }

        let counter = Arc::new(AtomicUsize::new(0));
        let pool: WorkerPool<Unit, u32> = WorkerPool::new(8, move |unit| {
            let counter = counter.clone();
            async move {
                match unit {
                    Unit::Board => PoolOutcome::Spawn((0..5).map(|_| Unit::Page).collect()),
                    Unit::Page => PoolOutcome::Spawn((0..4).map(|_| Unit::Thread).collect()),
                    Unit::Thread => PoolOutcome::Spawn((0..3).map(Unit::Post).collect()),
                    Unit::Post(_) => {
                        let n = counter.fetch_add(1, Ordering::SeqCst) as u32;
                        PoolOutcome::Done(n)
                    }
                }
            }
        });

        pool.push(Unit::Board).await;
        pool.join().await;

        assert_eq!(pool.queue_len().await, 0);
        assert_eq!(pool.in_flight().await, 0);

        let results = pool.get_results().await;
        assert_eq!(results.len(), 60);

        pool.close().await;
    }

    #[tokio::test]
    async fn join_can_be_called_repeatedly() {
        let pool: WorkerPool<u32, u32> =
            WorkerPool::new(4, |n| async move { PoolOutcome::Done(n * 2) });

        pool.push(1).await;
        pool.join().await;
        assert_eq!(pool.get_results().await, vec![2]);

        pool.push(2).await;
        pool.join().await;
        assert_eq!(pool.get_results().await, vec![4]);

        pool.close().await;
    }

    #[tokio::test]
    async fn a_failing_task_does_not_poison_the_pool() {
        let pool: WorkerPool<u32, u32> = WorkerPool::new(2, |n| async move {
            if n == 0 {
                log_task_error("0", &std::io::Error::other("boom"));
                PoolOutcome::Empty
            } else {
                PoolOutcome::Done(n)
            }
        });

        pool.push(0).await;
        pool.push(1).await;
        pool.join().await;

        let mut results = pool.get_results().await;
        results.sort();
        assert_eq!(results, vec![1]);

        pool.close().await;
    }
}
