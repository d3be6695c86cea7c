//! Reactive Runtime
//!
//! The runtime is the central coordinator that connects subjects and
//! effects. It owns the dependency store and exposes the two primitives
//! everything else is built on.
//!
//! # How It Works
//!
//! 1. When an effect runs, it enters a reactive context and becomes the
//!    active effect.
//!
//! 2. When a subject's property is read, [`track`] subscribes the active
//!    effect to that (subject, property) pair. Reads outside any effect are
//!    not recorded.
//!
//! 3. When a subject's property is written, [`trigger`] looks up the
//!    subscriber set and, for each subscriber, runs its scheduling job if it
//!    has one, or the effect itself otherwise.
//!
//! Notification is synchronous and re-entrant: a subscriber that writes
//! other properties triggers them before the outer [`trigger`] returns.
//! There is no cycle detection, so an effect that unconditionally writes a
//! property it reads recurses until the stack runs out.
//!
//! # Threading
//!
//! The store and the context stack are thread-local. Effects and subjects
//! are `!Send` and live on the thread that created them.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, trace};

use super::context::ReactiveContext;
use super::store::DependencyStore;
use super::subscriber::{DepId, SubjectId, SubscriberId};

/// The type-erased face of an effect, as stored in subscriber sets.
pub trait Reactive {
    /// Get the subscriber ID for this effect.
    fn subscriber_id(&self) -> SubscriberId;

    /// React to a change of one of the effect's dependencies.
    ///
    /// Runs the configured scheduling job if there is one, otherwise re-runs
    /// the effect.
    fn schedule(&self);

    /// Record that the effect joined the dependency set `dep`.
    fn record_dependency(&self, dep: DepId);
}

/// Anything whose properties can be tracked and triggered.
///
/// Implementors embed a [`SubjectKey`] and hand it out here. Identity is the
/// key, not the subject's value.
///
/// ```rust,ignore
/// struct Point {
///     key: SubjectKey,
///     x: Cell<i32>,
/// }
///
/// impl Subject for Point {
///     fn subject_key(&self) -> &SubjectKey {
///         &self.key
///     }
/// }
///
/// impl Point {
///     fn x(&self) -> i32 {
///         track(self, "x");
///         self.x.get()
///     }
///
///     fn set_x(&self, x: i32) {
///         self.x.set(x);
///         trigger(self, "x");
///     }
/// }
/// ```
pub trait Subject {
    fn subject_key(&self) -> &SubjectKey;
}

/// Identity of a subject in the dependency store.
///
/// Dropping the key releases every dependency set recorded under it, so the
/// store never keeps a dead subject's entries around.
#[derive(Debug)]
pub struct SubjectKey {
    id: SubjectId,
}

impl SubjectKey {
    pub fn new() -> Self {
        Self { id: SubjectId::new() }
    }

    pub fn id(&self) -> SubjectId {
        self.id
    }
}

impl Default for SubjectKey {
    fn default() -> Self {
        Self::new()
    }
}

impl Subject for SubjectKey {
    fn subject_key(&self) -> &SubjectKey {
        self
    }
}

impl Drop for SubjectKey {
    fn drop(&mut self) {
        Runtime::release_subject(self.id);
    }
}

thread_local! {
    static STORE: RefCell<DependencyStore> = RefCell::new(DependencyStore::new());
}

/// The per-thread reactive runtime.
pub struct Runtime;

impl Runtime {
    /// Subscribe the active effect to `(subject, property)`.
    ///
    /// No-op outside an effect. Repeated calls for the same effect and pair
    /// have no further effect.
    pub fn track(subject: SubjectId, property: &str) {
        let Some(active) = ReactiveContext::active_effect() else {
            return;
        };

        let added = STORE.with(|store| store.borrow_mut().subscribe(subject, property, &active));

        if let Some(dep) = added {
            active.record_dependency(dep);
            trace!(
                effect = %active.subscriber_id(),
                %subject,
                property,
                ?dep,
                "subscribed"
            );
        }
    }

    /// Notify every subscriber of `(subject, property)`.
    ///
    /// Subscribers are notified in the order they subscribed. The set is
    /// walked live: an effect that subscribes while the pass is running is
    /// visited by it too. The store is not borrowed while a subscriber runs.
    pub fn trigger(subject: SubjectId, property: &str) {
        let count = Self::subscriber_count(subject, property);
        if count == 0 {
            trace!(%subject, property, "trigger with no subscribers");
            return;
        }

        debug!(%subject, property, subscribers = count, "trigger");
        let mut index = 0;
        while let Some(subscriber) =
            STORE.with(|store| store.borrow().subscriber_at(subject, property, index))
        {
            subscriber.schedule();
            index += 1;
        }
    }

    /// Drop every dependency set recorded under `subject`.
    ///
    /// Called when a [`SubjectKey`] is dropped.
    fn release_subject(subject: SubjectId) {
        // The store may already be gone during thread teardown.
        let released = STORE
            .try_with(|store| store.borrow_mut().release(subject))
            .unwrap_or_default();

        if !released.is_empty() {
            debug!(%subject, sets = released.len(), "released subject");
        }

        // Dropped here, outside the store borrow.
        drop(released);
    }

    /// Number of effects subscribed to `(subject, property)`.
    pub fn subscriber_count(subject: SubjectId, property: &str) -> usize {
        STORE.with(|store| store.borrow().subscriber_count(subject, property))
    }

    /// Number of subjects with recorded dependencies on this thread.
    pub fn subject_count() -> usize {
        STORE.with(|store| store.borrow().subject_count())
    }

    /// Get the current subscriber being tracked, if any.
    pub fn current_subscriber() -> Option<SubscriberId> {
        ReactiveContext::current_subscriber()
    }

    /// Check if we're inside a reactive context.
    pub fn is_tracking() -> bool {
        ReactiveContext::is_active()
    }
}

/// Record that the active effect reads `property` of `subject`.
pub fn track<S: Subject + ?Sized>(subject: &S, property: &str) {
    Runtime::track(subject.subject_key().id(), property);
}

/// Notify the effects that read `property` of `subject`.
pub fn trigger<S: Subject + ?Sized>(subject: &S, property: &str) {
    Runtime::trigger(subject.subject_key().id(), property);
}
