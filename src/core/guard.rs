//! Guard predicates for controlling transitions.
//!
//! A guard is a zero-argument boolean predicate attached to a declared
//! transition. Guards read whatever host state they captured; the engine only
//! evaluates them, possibly several times per fire attempt.

use crate::error::BoxError;
use std::fmt;
use std::sync::Arc;

type Predicate = dyn Fn() -> Result<bool, BoxError> + Send + Sync;

/// Predicate that determines whether a declared transition may be taken.
///
/// Guards are cheap to clone; clones share the same predicate.
///
/// # Example
///
/// ```rust
/// use hfsm::core::Guard;
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use std::sync::Arc;
///
/// let stamina = Arc::new(AtomicU32::new(10));
/// let can_sprint = {
///     let stamina = Arc::clone(&stamina);
///     Guard::new(move || stamina.load(Ordering::Relaxed) > 20)
/// };
///
/// assert!(!can_sprint.check().unwrap());
/// stamina.store(50, Ordering::Relaxed);
/// assert!(can_sprint.check().unwrap());
/// ```
#[derive(Clone)]
pub struct Guard {
    predicate: Arc<Predicate>,
}

impl Guard {
    /// Create a guard from an infallible predicate.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        Guard {
            predicate: Arc::new(move || Ok::<bool, BoxError>(predicate())),
        }
    }

    /// Create a guard whose evaluation may fail.
    ///
    /// A failure propagates unchanged to the caller of `fire`/`try_fire`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use hfsm::core::Guard;
    ///
    /// let guard = Guard::try_new(|| "17".parse::<u32>().map(|v| v > 10));
    /// assert!(guard.check().unwrap());
    ///
    /// let broken = Guard::try_new(|| "nope".parse::<u32>().map(|v| v > 10));
    /// assert!(broken.check().is_err());
    /// ```
    pub fn try_new<F, E>(predicate: F) -> Self
    where
        F: Fn() -> Result<bool, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        Guard {
            predicate: Arc::new(move || predicate().map_err(Into::<BoxError>::into)),
        }
    }

    /// Guard that always allows the transition.
    pub fn always() -> Self {
        Guard::new(|| true)
    }

    /// Evaluate the predicate.
    pub fn check(&self) -> Result<bool, BoxError> {
        (self.predicate)()
    }
}

impl Default for Guard {
    fn default() -> Self {
        Self::always()
    }
}

impl fmt::Debug for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Guard").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[test]
    fn default_guard_allows() {
        assert!(Guard::default().check().unwrap());
        assert!(Guard::always().check().unwrap());
    }

    #[test]
    fn guard_reads_captured_state() {
        let open = Arc::new(AtomicBool::new(false));
        let guard = {
            let open = Arc::clone(&open);
            Guard::new(move || open.load(Ordering::SeqCst))
        };

        assert!(!guard.check().unwrap());
        open.store(true, Ordering::SeqCst);
        assert!(guard.check().unwrap());
    }

    #[test]
    fn clones_share_predicate() {
        let calls = Arc::new(AtomicUsize::new(0));
        let guard = {
            let calls = Arc::clone(&calls);
            Guard::new(move || {
                calls.fetch_add(1, Ordering::SeqCst);
                true
            })
        };
        let cloned = guard.clone();

        guard.check().unwrap();
        cloned.check().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn fallible_guard_surfaces_error() {
        let guard = Guard::try_new(|| Err::<bool, _>("sensor offline"));
        let err = guard.check().unwrap_err();
        assert_eq!(err.to_string(), "sensor offline");
    }
}
