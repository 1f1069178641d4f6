//! Asynchronous asset load handles
//!
//! A [`LoadHandle`] is the consumer side of an in-flight or completed asset
//! load. The producer side is a [`LoadCompleter`], held by whatever drives the
//! load (an engine scheduler, a tokio task, a test). Completion continuations
//! registered with [`LoadHandle::on_completed`] fire exactly once, on the thread
//! that completes the load, or immediately if the load is already done.

use crate::errors::LoadError;

use parking_lot::{Condvar, Mutex};
use std::fmt;
use std::pin::pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

type Continuation<A> = Box<dyn FnOnce(&Result<A, LoadError>) + Send>;
type ForceFn = Box<dyn Fn() + Send + Sync>;

struct LoadState<A> {
    result: Option<Result<A, LoadError>>,
    continuations: Vec<Continuation<A>>,
}

struct Operation<A> {
    state: Mutex<LoadState<A>>,
    done: Condvar,
    notify: Notify,
    force: Option<ForceFn>,
}

impl<A> Operation<A> {
    fn new(result: Option<Result<A, LoadError>>, force: Option<ForceFn>) -> Self {
        Self {
            state: Mutex::new(LoadState {
                result,
                continuations: Vec::new(),
            }),
            done: Condvar::new(),
            notify: Notify::new(),
            force,
        }
    }
}

/// Handle to an asynchronous asset load
///
/// # Examples
///
/// ```
/// use addressable_pool::LoadHandle;
///
/// let (handle, completer) = LoadHandle::pending();
/// assert!(!handle.is_done());
///
/// completer.complete(Ok("prefab"));
/// assert_eq!(handle.wait_for_completion(), Ok("prefab"));
/// ```
pub struct LoadHandle<A> {
    op: Option<Arc<Operation<A>>>,
}

impl<A> Clone for LoadHandle<A> {
    fn clone(&self) -> Self {
        Self {
            op: self.op.clone(),
        }
    }
}

impl<A> Default for LoadHandle<A> {
    fn default() -> Self {
        Self::invalid()
    }
}

impl<A> fmt::Debug for LoadHandle<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadHandle")
            .field("valid", &self.is_valid())
            .field("done", &self.is_done())
            .finish()
    }
}

impl<A: Clone + Send + 'static> LoadHandle<A> {
    /// Start a load that is completed later through the returned completer
    pub fn pending() -> (Self, LoadCompleter<A>) {
        Self::start(None)
    }

    /// Like [`pending`](Self::pending), with a hook that finishes the load
    /// synchronously.
    ///
    /// [`wait_for_completion`](Self::wait_for_completion) calls `force` on the
    /// waiting thread before blocking, so a load driven by the same thread
    /// that waits on it can still complete.
    ///
    /// # Examples
    ///
    /// ```
    /// use addressable_pool::{LoadCompleter, LoadHandle};
    /// use parking_lot::Mutex;
    /// use std::sync::Arc;
    ///
    /// let slot = Arc::new(Mutex::new(None::<LoadCompleter<i32>>));
    /// let forced = Arc::clone(&slot);
    /// let (handle, completer) = LoadHandle::pending_with(move || {
    ///     if let Some(completer) = forced.lock().take() {
    ///         completer.complete(Ok(5));
    ///     }
    /// });
    /// *slot.lock() = Some(completer);
    ///
    /// assert_eq!(handle.wait_for_completion(), Ok(5));
    /// ```
    pub fn pending_with<F>(force: F) -> (Self, LoadCompleter<A>)
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self::start(Some(Box::new(force)))
    }

    fn start(force: Option<ForceFn>) -> (Self, LoadCompleter<A>) {
        let op = Arc::new(Operation::new(None, force));
        (
            Self {
                op: Some(Arc::clone(&op)),
            },
            LoadCompleter { op: Some(op) },
        )
    }

    /// A load that has already succeeded
    pub fn ready(asset: A) -> Self {
        Self {
            op: Some(Arc::new(Operation::new(Some(Ok(asset)), None))),
        }
    }

    /// A load that has already failed
    pub fn failed(error: LoadError) -> Self {
        Self {
            op: Some(Arc::new(Operation::new(Some(Err(error)), None))),
        }
    }
}

impl<A> LoadHandle<A> {
    /// The empty handle, referring to no load at all
    pub const fn invalid() -> Self {
        Self { op: None }
    }

    pub fn is_valid(&self) -> bool {
        self.op.is_some()
    }

    /// Whether the load has finished, successfully or not.
    ///
    /// An invalid handle is never done.
    pub fn is_done(&self) -> bool {
        self.op
            .as_ref()
            .is_some_and(|op| op.state.lock().result.is_some())
    }

    /// Whether both handles refer to the same load
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.op, &other.op) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl<A: Clone> LoadHandle<A> {
    /// The load result, if the load has finished
    pub fn result(&self) -> Option<Result<A, LoadError>> {
        self.op.as_ref()?.state.lock().result.clone()
    }

    /// Register a continuation that fires once when the load finishes.
    ///
    /// Runs immediately on the calling thread if the load is already done.
    /// Continuations registered on an invalid handle never run.
    pub fn on_completed<F>(&self, continuation: F)
    where
        F: FnOnce(&Result<A, LoadError>) + Send + 'static,
    {
        let Some(op) = &self.op else {
            return;
        };

        let mut state = op.state.lock();
        match &state.result {
            Some(result) => {
                let result = result.clone();
                drop(state);
                continuation(&result);
            }
            None => state.continuations.push(Box::new(continuation)),
        }
    }

    /// Block the calling thread until the load finishes.
    ///
    /// Runs the load's force hook first, if it has one.
    pub fn wait_for_completion(&self) -> Result<A, LoadError> {
        let Some(op) = &self.op else {
            return Err(LoadError::Abandoned);
        };

        if let Some(force) = &op.force {
            if !self.is_done() {
                force();
            }
        }

        let mut state = op.state.lock();
        loop {
            if let Some(result) = &state.result {
                return result.clone();
            }
            op.done.wait(&mut state);
        }
    }

    /// Block until the load finishes or `timeout` elapses. Does not run the
    /// force hook.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<Result<A, LoadError>> {
        let op = self.op.as_ref()?;

        let mut state = op.state.lock();
        if state.result.is_none() {
            op.done.wait_while_for(&mut state, |s| s.result.is_none(), timeout);
        }
        state.result.clone()
    }

    /// Wait for the load to finish without blocking the runtime
    pub async fn completion(&self) -> Result<A, LoadError> {
        let Some(op) = &self.op else {
            return Err(LoadError::Abandoned);
        };

        loop {
            let mut notified = pin!(op.notify.notified());
            notified.as_mut().enable();

            if let Some(result) = op.state.lock().result.clone() {
                return result;
            }

            notified.await;
        }
    }
}

/// Producer side of a pending [`LoadHandle`].
///
/// Dropping a completer without calling [`complete`](Self::complete) fails
/// the load with [`LoadError::Abandoned`].
pub struct LoadCompleter<A: Clone> {
    op: Option<Arc<Operation<A>>>,
}

impl<A: Clone> LoadCompleter<A> {
    /// Finish the load and run every registered continuation
    pub fn complete(mut self, result: Result<A, LoadError>) {
        if let Some(op) = self.op.take() {
            Self::finish(&op, result);
        }
    }

    fn finish(op: &Operation<A>, result: Result<A, LoadError>) {
        let continuations = {
            let mut state = op.state.lock();
            if state.result.is_some() {
                return;
            }
            state.result = Some(result.clone());
            std::mem::take(&mut state.continuations)
        };

        op.done.notify_all();
        op.notify.notify_waiters();

        for continuation in continuations {
            continuation(&result);
        }
    }
}

impl<A: Clone> Drop for LoadCompleter<A> {
    fn drop(&mut self) {
        if let Some(op) = self.op.take() {
            Self::finish(&op, Err(LoadError::Abandoned));
        }
    }
}
