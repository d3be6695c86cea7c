//! Reactive Primitives
//!
//! This module implements the core reactive system: references, effects and
//! watchers.
//!
//! # Concepts
//!
//! ## References
//!
//! A [`Ref`] is a container for mutable state. When its value is read within
//! a running effect, the reference registers that effect as a subscriber.
//! When its value is written, every subscriber is notified.
//!
//! ## Effects
//!
//! An [`Effect`] is a computation whose reads are tracked. When one of the
//! things it read is written, it runs again, or runs its scheduling job if it
//! was given one.
//!
//! ## Watchers
//!
//! [`watch`] and [`watch_effect`] build on a single effect. `watch` calls back
//! only when the watched value actually changed; `watch_effect` re-runs on
//! every write of a dependency.
//!
//! ## Subjects
//!
//! Anything implementing [`Subject`] can take part in tracking through
//! [`track`] and [`trigger`]. `Ref` is the built-in subject.
//!
//! # Implementation Notes
//!
//! The reactive system uses a thread-local stack of running effects to detect
//! dependencies automatically, and a thread-local dependency store that maps
//! (subject, property) pairs to subscriber sets.
//!
//! Everything is synchronous: a write notifies every subscriber, recursively,
//! before it returns.

mod context;
mod effect;
mod reference;
mod runtime;
mod store;
mod subscriber;
mod watch;

pub use context::ReactiveContext;
pub use effect::{effect, Effect, EffectOptions, Job, WeakEffect};
pub use reference::{Ref, WeakRef};
pub use runtime::{track, trigger, Reactive, Runtime, Subject, SubjectKey};
pub use subscriber::{DepId, SubjectId, SubscriberId};
pub use watch::{watch, watch_effect, WatchOptions, WatchSource};
