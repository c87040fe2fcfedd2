use crate::common::{DEFAULT_POOL_NAME, MAX_DEFAULT_POOL_SIZE, MIN_DEFAULT_POOL_SIZE};
use crate::errors::{ErrorKind, SpatiaError, SpatiaResult};
use crate::get_cpu_count;
use crossbeam_channel::{unbounded, Receiver, Sender};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::JoinHandle;

/// A unit of work handed to an executor.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Runs submitted tasks, usually on another thread.
///
/// Query and transaction work is dispatched through executors configured on
/// the builder. Implementations must not run tasks on the application's main
/// thread.
pub trait Executor: Send + Sync {
    fn execute(&self, task: Task) -> SpatiaResult<()>;
}

static DEFAULT_EXECUTOR: Lazy<Arc<ThreadPoolExecutor>> = Lazy::new(|| {
    let size = get_cpu_count().clamp(MIN_DEFAULT_POOL_SIZE, MAX_DEFAULT_POOL_SIZE);
    log::debug!("Starting default executor with {} threads", size);
    Arc::new(ThreadPoolExecutor::new(DEFAULT_POOL_NAME, size))
});

/// Returns the process-wide bounded pool used when the builder was given no
/// executor. Every call returns the same instance.
pub fn default_executor() -> Arc<dyn Executor> {
    DEFAULT_EXECUTOR.clone()
}

/// Fixed-size pool of worker threads fed by a shared channel.
///
/// A task that panics is logged and does not take its worker down.
pub struct ThreadPoolExecutor {
    name: String,
    size: usize,
    sender: Mutex<Option<Sender<Task>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl ThreadPoolExecutor {
    pub fn new(name: &str, size: usize) -> Self {
        let size = size.max(1);
        let (sender, receiver) = unbounded::<Task>();

        let workers = (0..size)
            .filter_map(|index| Self::spawn_worker(name, index, receiver.clone()))
            .collect::<Vec<_>>();

        ThreadPoolExecutor {
            name: name.to_string(),
            size,
            sender: Mutex::new(Some(sender)),
            workers: Mutex::new(workers),
        }
    }

    fn spawn_worker(name: &str, index: usize, receiver: Receiver<Task>) -> Option<JoinHandle<()>> {
        let thread_name = format!("{}-{}", name, index);
        let spawned = std::thread::Builder::new()
            .name(thread_name.clone())
            .spawn(move || {
                while let Ok(task) = receiver.recv() {
                    if catch_unwind(AssertUnwindSafe(task)).is_err() {
                        log::error!("Task panicked on executor thread {}", thread_name);
                    }
                }
            });

        match spawned {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::error!("Failed to spawn executor thread {}-{}: {}", name, index, e);
                None
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Stops accepting tasks and waits for queued ones to finish.
    pub fn shutdown(&self) {
        // dropping the sender ends every worker's recv loop once the queue drains
        self.sender.lock().take();
        let workers = std::mem::take(&mut *self.workers.lock());
        let current = std::thread::current().id();
        // the last handle may be released by one of the pool's own tasks
        for worker in workers.into_iter().filter(|w| w.thread().id() != current) {
            if worker.join().is_err() {
                log::error!("Executor thread of {} terminated abnormally", self.name);
            }
        }
    }
}

impl Executor for ThreadPoolExecutor {
    fn execute(&self, task: Task) -> SpatiaResult<()> {
        let sender = self.sender.lock();
        match sender.as_ref() {
            Some(sender) => sender.send(task).map_err(|_| {
                log::error!("Executor {} has no live workers", self.name);
                SpatiaError::new(
                    &format!("Executor {} has no live workers", self.name),
                    ErrorKind::ExecutorError,
                )
            }),
            None => {
                log::error!("Executor {} is shut down", self.name);
                Err(SpatiaError::new(
                    &format!("Executor {} is shut down", self.name),
                    ErrorKind::ExecutorError,
                ))
            }
        }
    }
}

impl Drop for ThreadPoolExecutor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Runs every task inline on the submitting thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectExecutor;

impl Executor for DirectExecutor {
    fn execute(&self, task: Task) -> SpatiaResult<()> {
        task();
        Ok(())
    }
}

struct SerialState {
    queue: VecDeque<Task>,
    active: bool,
}

/// Admits one task at a time to a delegate executor, in submission order.
///
/// Transactions go through a `SerialExecutor` regardless of the delegate's
/// pool size, so at most one transaction runs at any moment and waiting
/// transactions are served first come, first served.
#[derive(Clone)]
pub struct SerialExecutor {
    delegate: Arc<dyn Executor>,
    state: Arc<Mutex<SerialState>>,
}

impl SerialExecutor {
    pub fn new(delegate: Arc<dyn Executor>) -> Self {
        SerialExecutor {
            delegate,
            state: Arc::new(Mutex::new(SerialState {
                queue: VecDeque::new(),
                active: false,
            })),
        }
    }

    /// Number of tasks waiting behind the active one.
    pub fn pending(&self) -> usize {
        self.state.lock().queue.len()
    }

    fn run(state: Arc<Mutex<SerialState>>, delegate: Arc<dyn Executor>, task: Task) -> SpatiaResult<()> {
        let next_state = state.clone();
        let next_delegate = delegate.clone();

        let result = delegate.execute(Box::new(move || {
            if catch_unwind(AssertUnwindSafe(task)).is_err() {
                log::error!("Serialized task panicked");
            }
            Self::schedule_next(next_state, next_delegate);
        }));

        if result.is_err() {
            // the delegate will not take the waiting tasks either
            let dropped = {
                let mut guard = state.lock();
                guard.active = false;
                std::mem::take(&mut guard.queue).len()
            };
            if dropped > 0 {
                log::error!("Dropped {} serialized task(s) rejected by the delegate executor", dropped);
            }
        }
        result
    }

    fn schedule_next(state: Arc<Mutex<SerialState>>, delegate: Arc<dyn Executor>) {
        let next = {
            let mut guard = state.lock();
            let next = guard.queue.pop_front();
            if next.is_none() {
                guard.active = false;
            }
            next
        };

        if let Some(task) = next {
            if let Err(e) = Self::run(state, delegate, task) {
                log::error!("Failed to schedule next serialized task: {}", e);
            }
        }
    }
}

impl Executor for SerialExecutor {
    fn execute(&self, task: Task) -> SpatiaResult<()> {
        let next = {
            let mut guard = self.state.lock();
            guard.queue.push_back(task);
            if guard.active {
                None
            } else {
                guard.active = true;
                guard.queue.pop_front()
            }
        };

        match next {
            Some(task) => Self::run(self.state.clone(), self.delegate.clone(), task),
            None => Ok(()),
        }
    }
}
