//! Tether Core
//!
//! This crate provides the core runtime for Tether, a small fine-grained
//! reactivity library. It implements:
//!
//! - Reactive references: boxed values whose reads and writes are tracked
//! - Effects: computations that discover their dependencies as they run
//! - Watchers: change-detecting callbacks layered on effects
//!
//! Dependencies are never declared. An effect subscribes to whatever it reads
//! while it runs, and a write re-runs whatever subscribed.
//!
//! # Architecture
//!
//! - `reactive`: the dependency store, the effect runtime, references and
//!   the watch API
//! - `error`: errors the runtime itself can raise
//!
//! # Example
//!
//! ```rust,ignore
//! use tether_core::reactive::{Ref, watch, watch_effect, WatchOptions, WatchSource};
//!
//! // Create a reference
//! let count = Ref::new(0);
//!
//! // Call back when the value changes
//! watch(&count, |new, old| println!("{old:?} -> {new}"), WatchOptions::new());
//!
//! // Re-run on every write
//! let c = count.clone();
//! watch_effect(
//!     WatchSource::computation(move || println!("Count: {}", c.get())),
//!     WatchOptions::new(),
//! );
//!
//! // Update the reference
//! count.set(5);
//! // Prints "Some(0) -> 5" and "Count: 5"
//! ```

pub mod error;
pub mod reactive;

pub use error::{ReactiveError, Result};
