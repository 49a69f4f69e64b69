// Background job queue for scoring passes.
// A single dispatcher thread pops jobs in FIFO order; each job fans its own
// work out onto the rayon pool.

use parking_lot::{Condvar, Mutex};
use siftx_core::{Error, Result};
use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::warn;

/// Unit of work run on the background thread.
pub trait BackgroundJob: Send + 'static {
    fn execute(self: Box<Self>);
}

struct Queue {
    jobs: Mutex<VecDeque<Box<dyn BackgroundJob>>>,
    condvar: Condvar,
    running: AtomicBool,
    processed: AtomicU64,
}

/// Owner of the dispatcher thread. Dropping it stops the thread; jobs still
/// queued at that point are dropped without running.
pub struct BackgroundWorker {
    queue: Arc<Queue>,
    handle: Option<JoinHandle<()>>,
}

impl BackgroundWorker {
    pub fn spawn(name: &str) -> Result<Self> {
        let queue = Arc::new(Queue {
            jobs: Mutex::new(VecDeque::new()),
            condvar: Condvar::new(),
            running: AtomicBool::new(true),
            processed: AtomicU64::new(0),
        });

        let queue_for_thread = queue.clone();
        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || run(&queue_for_thread))
            .map_err(|e| Error::Worker(format!("failed to spawn {}: {}", name, e)))?;

        Ok(Self {
            queue,
            handle: Some(handle),
        })
    }

    pub fn submit(&self, job: Box<dyn BackgroundJob>) {
        let mut jobs = self.queue.jobs.lock();
        jobs.push_back(job);
        self.queue.condvar.notify_one();
    }

    pub fn pending_jobs(&self) -> usize {
        self.queue.jobs.lock().len()
    }

    /// Jobs that have finished running, including ones that panicked.
    pub fn jobs_processed(&self) -> u64 {
        self.queue.processed.load(Ordering::Relaxed)
    }

    pub fn shutdown(&self) {
        self.queue.running.store(false, Ordering::Release);
        // Take the lock so the store cannot slip between the worker's check
        // and its wait.
        let _jobs = self.queue.jobs.lock();
        self.queue.condvar.notify_all();
    }
}

impl Drop for BackgroundWorker {
    fn drop(&mut self) {
        self.shutdown();
        if let Some(handle) = self.handle.take() {
            // A job holding the last reference may drop us on our own thread.
            if handle.thread().id() != thread::current().id() {
                let _ = handle.join();
            }
        }
    }
}

fn run(queue: &Queue) {
    loop {
        let job = {
            let mut jobs = queue.jobs.lock();
            while jobs.is_empty() && queue.running.load(Ordering::Acquire) {
                queue.condvar.wait(&mut jobs);
            }
            if !queue.running.load(Ordering::Acquire) {
                jobs.clear();
                break;
            }
            jobs.pop_front()
        };

        if let Some(job) = job {
            if catch_unwind(AssertUnwindSafe(|| job.execute())).is_err() {
                warn!("background job panicked; result dropped");
            }
            queue.processed.fetch_add(1, Ordering::Relaxed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    struct Report(mpsc::Sender<u32>, u32);

    impl BackgroundJob for Report {
        fn execute(self: Box<Self>) {
            let _ = self.0.send(self.1);
        }
    }

    struct Panic;

    impl BackgroundJob for Panic {
        fn execute(self: Box<Self>) {
            panic!("job failure");
        }
    }

    #[test]
    fn test_jobs_run_in_fifo_order() {
        let worker = BackgroundWorker::spawn("test-worker").unwrap();
        let (tx, rx) = mpsc::channel();
        for i in 0..10 {
            worker.submit(Box::new(Report(tx.clone(), i)));
        }

        let received: Vec<u32> = (0..10)
            .map(|_| rx.recv_timeout(Duration::from_secs(5)).unwrap())
            .collect();
        assert_eq!(received, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_worker_survives_panicking_job() {
        let worker = BackgroundWorker::spawn("test-worker").unwrap();
        let (tx, rx) = mpsc::channel();
        worker.submit(Box::new(Panic));
        worker.submit(Box::new(Report(tx, 7)));

        assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), 7);
    }

    #[test]
    fn test_drop_stops_thread() {
        let worker = BackgroundWorker::spawn("test-worker").unwrap();
        let (tx, rx) = mpsc::channel();
        worker.submit(Box::new(Report(tx, 1)));
        assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), 1);
        drop(worker);
    }
}
