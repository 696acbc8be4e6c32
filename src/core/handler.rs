//! Enter/exit callbacks and their per-state subscriber chains.

use crate::error::BoxError;
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Future returned by async callbacks.
pub type HandlerFuture = BoxFuture<'static, Result<(), BoxError>>;

type SyncFn = dyn Fn() -> Result<(), BoxError> + Send + Sync;
type AsyncFn = dyn Fn() -> HandlerFuture + Send + Sync;

/// Machine-wide callback invoked with (state left, state entered).
pub type TransitionObserver<S> = Arc<dyn Fn(&S, &S) + Send + Sync>;

/// Which half of a transition a callback belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Exit,
    Enter,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Exit => f.write_str("Exit"),
            Phase::Enter => f.write_str("Enter"),
        }
    }
}

/// A single enter or exit callback.
///
/// Synchronous callbacks run inline. Async callbacks are only run by the
/// machine's `*_async` methods, which await them in chain order.
#[derive(Clone)]
pub enum Callback {
    Sync(Arc<SyncFn>),
    Async(Arc<AsyncFn>),
}

impl Callback {
    /// Wrap an infallible procedure.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Callback::Sync(Arc::new(move || {
            f();
            Ok::<(), BoxError>(())
        }))
    }

    /// Wrap a procedure that may fail.
    pub fn try_new<F, E>(f: F) -> Self
    where
        F: Fn() -> Result<(), E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        Callback::Sync(Arc::new(move || f().map_err(Into::<BoxError>::into)))
    }

    /// Wrap a closure producing a future.
    pub fn from_async<F, Fut, E>(f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: Into<BoxError>,
    {
        Callback::Async(Arc::new(move || -> HandlerFuture {
            f().map(|res| res.map_err(Into::<BoxError>::into)).boxed()
        }))
    }

    pub fn is_async(&self) -> bool {
        matches!(self, Callback::Async(_))
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callback::Sync(_) => f.write_str("Callback::Sync"),
            Callback::Async(_) => f.write_str("Callback::Async"),
        }
    }
}

/// Ordered callbacks for one phase of one state, invoked in addition order.
#[derive(Clone, Debug, Default)]
pub struct Subscribers {
    callbacks: Vec<Callback>,
    has_async: bool,
}

impl Subscribers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, callback: Callback) {
        self.has_async |= callback.is_async();
        self.callbacks.push(callback);
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Whether any subscriber needs to be awaited.
    pub fn has_async(&self) -> bool {
        self.has_async
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Callback> {
        self.callbacks.iter()
    }

    /// Run every subscriber inline, stopping at the first failure.
    ///
    /// Returns `Ok(false)` without running anything when an async subscriber
    /// is present.
    pub(crate) fn invoke(&self) -> Result<bool, BoxError> {
        if self.has_async {
            return Ok(false);
        }
        for callback in &self.callbacks {
            if let Callback::Sync(f) = callback {
                f()?;
            }
        }
        Ok(true)
    }

    /// Run every subscriber in order, awaiting async ones.
    pub(crate) async fn invoke_async(&self) -> Result<(), BoxError> {
        for callback in &self.callbacks {
            match callback {
                Callback::Sync(f) => f()?,
                Callback::Async(f) => f().await?,
            }
        }
        Ok(())
    }
}

impl FromIterator<Callback> for Subscribers {
    fn from_iter<I: IntoIterator<Item = Callback>>(iter: I) -> Self {
        let mut subscribers = Subscribers::new();
        for callback in iter {
            subscribers.push(callback);
        }
        subscribers
    }
}

/// An object reacting to both entering and leaving a state.
///
/// Registering a handler on a state adds `on_enter` to its enter chain and
/// `on_exit` to its exit chain.
///
/// # Example
///
/// ```rust
/// use hfsm::core::StateHandler;
/// use hfsm::BoxError;
/// use std::sync::atomic::{AtomicI32, Ordering};
///
/// struct Gauge(AtomicI32);
///
/// impl StateHandler for Gauge {
///     fn on_enter(&self) -> Result<(), BoxError> {
///         self.0.fetch_add(1, Ordering::SeqCst);
///         Ok(())
///     }
///
///     fn on_exit(&self) -> Result<(), BoxError> {
///         self.0.fetch_sub(1, Ordering::SeqCst);
///         Ok(())
///     }
/// }
/// ```
pub trait StateHandler: Send + Sync + 'static {
    fn on_enter(&self) -> Result<(), BoxError> {
        Ok(())
    }

    fn on_exit(&self) -> Result<(), BoxError> {
        Ok(())
    }
}

/// Async counterpart of [`StateHandler`].
///
/// Both methods take the shared handler by `Arc` so the returned future can
/// outlive the call. Chains holding one of these only run through the
/// machine's `*_async` methods.
///
/// # Example
///
/// ```rust
/// use futures::FutureExt;
/// use hfsm::core::{AsyncStateHandler, HandlerFuture};
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use std::sync::Arc;
///
/// struct Autosave(AtomicBool);
///
/// impl AsyncStateHandler for Autosave {
///     fn on_exit_async(self: Arc<Self>) -> HandlerFuture {
///         async move {
///             self.0.store(true, Ordering::SeqCst);
///             Ok(())
///         }
///         .boxed()
///     }
/// }
/// ```
pub trait AsyncStateHandler: Send + Sync + 'static {
    fn on_enter_async(self: Arc<Self>) -> HandlerFuture {
        futures::future::ok(()).boxed()
    }

    fn on_exit_async(self: Arc<Self>) -> HandlerFuture {
        futures::future::ok(()).boxed()
    }
}

pub(crate) fn handler_callbacks<H: StateHandler>(handler: Arc<H>) -> (Callback, Callback) {
    let enter = Arc::clone(&handler);
    let exit = handler;
    (
        Callback::Sync(Arc::new(move || enter.on_enter())),
        Callback::Sync(Arc::new(move || exit.on_exit())),
    )
}

pub(crate) fn async_handler_callbacks<H: AsyncStateHandler>(handler: Arc<H>) -> (Callback, Callback) {
    let enter = Arc::clone(&handler);
    let exit = handler;
    (
        Callback::Async(Arc::new(move || Arc::clone(&enter).on_enter_async())),
        Callback::Async(Arc::new(move || Arc::clone(&exit).on_exit_async())),
    )
}
