//! Process-wide printer state.
//!
//! Two pieces of shared state back the printer: the current
//! [`PeekOptions`] and the active [`OutputSink`]. Both are last-writer-wins
//! under concurrent mutation; callers needing cross-thread determinism must
//! serialize their own use.
//!
//! Scoped changes use a stack discipline: [`scoped`] swaps the options in
//! and returns a [`ScopeGuard`] that restores the prior value on drop, so
//! nested scopes compose and state is restored even when a scope unwinds.

use std::sync::{Mutex, MutexGuard, PoisonError};

use once_cell::sync::Lazy;

use crate::options::PeekOptions;
use crate::sink::{OutputSink, StdoutSink};

static OPTIONS: Lazy<Mutex<PeekOptions>> = Lazy::new(|| Mutex::new(PeekOptions::default()));

static SINK: Lazy<Mutex<Box<dyn OutputSink + Send>>> =
    Lazy::new(|| Mutex::new(Box::new(StdoutSink::new())));

// A panic while an options or sink lock is held poisons the mutex; the
// stored data is a plain value either way, so poisoning is absorbed.
fn lock_options() -> MutexGuard<'static, PeekOptions> {
    OPTIONS.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The options currently in effect.
pub fn current() -> PeekOptions {
    *lock_options()
}

/// Permanently replaces the current options.
///
/// This is the "store" mode: the change persists until the next
/// [`configure`] or until an enclosing [`ScopeGuard`] drops.
pub fn configure(opts: PeekOptions) {
    *lock_options() = opts;
}

/// Restores the previous options when dropped.
///
/// Returned by [`scoped`] and [`disabled`]. Dropping runs during unwinding
/// too, so a panic inside the scope still restores the prior state.
#[must_use = "dropping the guard immediately restores the previous options"]
pub struct ScopeGuard {
    saved: PeekOptions,
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        *lock_options() = self.saved;
    }
}

/// Swaps in `opts` for the dynamic extent of the returned guard.
///
/// # Examples
///
/// ```rust
/// use peek::PeekOptions;
/// let before = peek::current();
/// {
///     let _scope = peek::scoped(PeekOptions::new().with_type(true));
///     assert!(peek::current().with_type);
/// }
/// assert_eq!(peek::current(), before);
/// ```
pub fn scoped(opts: PeekOptions) -> ScopeGuard {
    let mut current = lock_options();
    let saved = *current;
    *current = opts;
    ScopeGuard { saved }
}

/// Suppresses all output for the dynamic extent of the returned guard.
pub fn disabled() -> ScopeGuard {
    let opts = current().enabled(false);
    scoped(opts)
}

/// Replaces the active output sink, returning the previous one.
pub fn set_sink(sink: Box<dyn OutputSink + Send>) -> Box<dyn OutputSink + Send> {
    let mut slot = SINK.lock().unwrap_or_else(PoisonError::into_inner);
    std::mem::replace(&mut *slot, sink)
}

/// Runs `f` with exclusive access to the active sink.
pub fn with_sink<R>(f: impl FnOnce(&mut dyn OutputSink) -> R) -> R {
    let mut slot = SINK.lock().unwrap_or_else(PoisonError::into_inner);
    f(&mut **slot)
}
