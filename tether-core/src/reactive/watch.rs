//! Watch API
//!
//! `watch` turns a source into a monitored computation built on a single
//! effect (its "runner").
//!
//! # Sources
//!
//! A [`WatchSource`] is resolved once, when the watch is created, into a
//! getter taking no arguments:
//!
//! - `Computation`: the function itself.
//! - `Reference`: a read of the reference. The getter holds the reference
//!   weakly, so watching it does not keep it alive; once it is gone the
//!   getter returns the last value it read.
//! - `Constant`: a clone of the value. It reads nothing, so it never fires.
//!
//! # Modes
//!
//! [`watch`] installs a job on the runner. On every dependency change the job
//! re-runs the getter and compares the result with the last recorded value.
//! Only when they differ does it call back with `(new, old)` and record the
//! new value. Values that mutate in place without a write are never seen as
//! changed.
//!
//! [`watch_effect`] installs no job, so every dependency change re-runs the
//! getter for its side effects, whether or not anything actually changed.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use super::effect::{effect, EffectOptions, WeakEffect};
use super::reference::Ref;

/// Something a watch can observe.
pub enum WatchSource<T: 'static> {
    /// A function of reactive state.
    Computation(Rc<dyn Fn() -> T>),
    /// A reactive reference.
    Reference(Ref<T>),
    /// A plain value.
    Constant(T),
}

impl<T: 'static> WatchSource<T> {
    pub fn computation<F>(f: F) -> Self
    where
        F: Fn() -> T + 'static,
    {
        Self::Computation(Rc::new(f))
    }

    pub fn constant(value: T) -> Self {
        Self::Constant(value)
    }
}

impl<T: Clone + 'static> WatchSource<T> {
    fn into_getter(self) -> Rc<dyn Fn() -> T> {
        match self {
            Self::Computation(f) => f,
            Self::Reference(r) => {
                let weak = r.downgrade();
                let last = RefCell::new(r.get_untracked());
                Rc::new(move || match weak.upgrade() {
                    Some(r) => {
                        let value = r.get();
                        *last.borrow_mut() = value.clone();
                        value
                    }
                    None => last.borrow().clone(),
                })
            }
            Self::Constant(value) => Rc::new(move || value.clone()),
        }
    }
}

impl<T: 'static> From<Ref<T>> for WatchSource<T> {
    fn from(r: Ref<T>) -> Self {
        Self::Reference(r)
    }
}

impl<T: 'static> From<&Ref<T>> for WatchSource<T> {
    fn from(r: &Ref<T>) -> Self {
        Self::Reference(r.clone())
    }
}

impl<T: 'static> fmt::Debug for WatchSource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Computation(_) => f.write_str("Computation"),
            Self::Reference(_) => f.write_str("Reference"),
            Self::Constant(_) => f.write_str("Constant"),
        }
    }
}

/// Options for [`watch`] and [`watch_effect`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WatchOptions {
    /// Passed through to the runner's [`EffectOptions`]; has no effect.
    pub lazy: bool,
    /// Accepted but not supported; watching is always shallow.
    pub deep: bool,
    /// Call back once during `watch` with the current value and no old value.
    pub immediate: bool,
}

impl WatchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lazy(mut self, lazy: bool) -> Self {
        self.lazy = lazy;
        self
    }

    pub fn deep(mut self, deep: bool) -> Self {
        self.deep = deep;
        self
    }

    pub fn immediate(mut self, immediate: bool) -> Self {
        self.immediate = immediate;
        self
    }

    fn effect_options(&self) -> EffectOptions {
        if self.deep {
            debug!("deep watching is not supported, watching shallowly");
        }
        EffectOptions::new().lazy(self.lazy)
    }
}

/// Watch `source` and call `callback(new, old)` whenever its value changes.
///
/// Without [`WatchOptions::immediate`], the getter runs once now to collect
/// dependencies and seed the old value, and the callback is not called.
/// With it, the callback is called right away with `old` set to `None`.
///
/// # Example
///
/// ```rust,ignore
/// let a = Ref::new(0);
/// watch(&a, |new, old| println!("{old:?} -> {new}"), WatchOptions::new());
///
/// a.set(1);  // Prints: "Some(0) -> 1"
/// a.set(1);  // Unchanged, prints nothing
/// ```
pub fn watch<T, S, F>(source: S, callback: F, options: WatchOptions)
where
    T: Clone + PartialEq + 'static,
    S: Into<WatchSource<T>>,
    F: Fn(T, Option<T>) + 'static,
{
    let source = source.into();
    debug!(?source, ?options, "watch");
    let getter = source.into_getter();

    let old_value: Rc<RefCell<Option<T>>> = Rc::new(RefCell::new(None));
    // The job needs the runner and the runner needs the job: the slot is
    // filled once the runner exists.
    let slot: Rc<RefCell<Option<WeakEffect<T>>>> = Rc::new(RefCell::new(None));

    let job = {
        let old_value = Rc::clone(&old_value);
        let slot = Rc::clone(&slot);
        move || {
            let Some(runner) = slot.borrow().as_ref().and_then(WeakEffect::upgrade) else {
                return;
            };

            let new_value = runner.run();
            let previous = old_value.borrow().clone();
            if previous.as_ref() != Some(&new_value) {
                callback(new_value.clone(), previous);
                *old_value.borrow_mut() = Some(new_value);
            }
        }
    };

    let runner = effect(move || getter(), options.effect_options().job(job));
    *slot.borrow_mut() = Some(runner.downgrade());

    if options.immediate {
        if let Some(job) = &runner.options().job {
            job();
        }
    } else {
        let initial = runner.run();
        *old_value.borrow_mut() = Some(initial);
    }
}

/// Run `source` now and again every time one of its dependencies is written.
///
/// No change detection is done: a write that stores an equal value still
/// re-runs the getter.
pub fn watch_effect<T, S>(source: S, options: WatchOptions)
where
    T: Clone + 'static,
    S: Into<WatchSource<T>>,
{
    let source = source.into();
    debug!(?source, ?options, "watch effect");
    let getter = source.into_getter();

    let runner = effect(move || getter(), options.effect_options());
    runner.run();
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::Runtime;
    use std::cell::Cell;
    use tracing_test::traced_test;

    type Log<T> = Rc<RefCell<Vec<(T, Option<T>)>>>;

    fn recorder<T: 'static>() -> (Log<T>, impl Fn(T, Option<T>) + 'static) {
        let log: Log<T> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        (log, move |new, old| sink.borrow_mut().push((new, old)))
    }

    #[test]
    fn watch_ref_reports_changes_only() {
        let a = Ref::new(0);
        let (log, cb) = recorder::<i32>();
        watch(&a, cb, WatchOptions::new());

        a.set(1);
        a.set(1);
        a.set(2);

        assert_eq!(*log.borrow(), vec![(1, Some(0)), (2, Some(1))]);
    }

    #[test]
    fn watch_does_not_call_back_initially() {
        let a = Ref::new(5);
        let (log, cb) = recorder::<i32>();
        watch(a.clone(), cb, WatchOptions::new());

        assert!(log.borrow().is_empty());
        assert_eq!(a.subscriber_count(), 1);
    }

    #[test]
    fn change_back_to_original_is_reported() {
        let a = Ref::new(0);
        let (log, cb) = recorder::<i32>();
        watch(&a, cb, WatchOptions::new());

        a.set(1);
        a.set(0);

        assert_eq!(*log.borrow(), vec![(1, Some(0)), (0, Some(1))]);
    }

    #[test]
    fn immediate_calls_back_with_no_old_value() {
        let a = Ref::new(3);
        let (log, cb) = recorder::<i32>();
        watch(&a, cb, WatchOptions::new().immediate(true));

        assert_eq!(*log.borrow(), vec![(3, None)]);

        a.set(4);
        assert_eq!(*log.borrow(), vec![(3, None), (4, Some(3))]);
    }

    #[test]
    fn watch_computation_over_several_refs() {
        let a = Ref::new(1);
        let b = Ref::new(2);
        let (log, cb) = recorder::<i32>();

        let (ra, rb) = (a.clone(), b.clone());
        watch(
            WatchSource::computation(move || ra.get() + rb.get()),
            cb,
            WatchOptions::new(),
        );

        a.set(2);
        a.set(1);
        b.set(3);
        // Same sum as before, no callback.
        b.set(3);

        assert_eq!(*log.borrow(), vec![(4, Some(3)), (3, Some(4)), (4, Some(3))]);
    }

    #[test]
    fn constant_source_never_fires() {
        let (log, cb) = recorder::<i32>();
        watch(WatchSource::constant(7), cb, WatchOptions::new().immediate(true));

        assert_eq!(*log.borrow(), vec![(7, None)]);
    }

    #[test]
    fn watch_effect_reruns_on_every_write() {
        let a = Ref::new(0);
        let runs = Rc::new(Cell::new(0));

        let (reader, counter) = (a.clone(), runs.clone());
        watch_effect(
            WatchSource::computation(move || {
                reader.get();
                counter.set(counter.get() + 1);
            }),
            WatchOptions::new(),
        );
        assert_eq!(runs.get(), 1);

        a.set(0);
        a.set(1);
        assert_eq!(runs.get(), 3);
    }

    #[test]
    fn lazy_is_accepted_and_ignored() {
        let a = Ref::new(0);
        let (log, cb) = recorder::<i32>();
        watch(&a, cb, WatchOptions::new().lazy(true));

        assert_eq!(a.subscriber_count(), 1);
        a.set(1);
        assert_eq!(*log.borrow(), vec![(1, Some(0))]);
    }

    #[test]
    fn watch_does_not_keep_its_reference_alive() {
        let before = Runtime::subject_count();
        let calls = Rc::new(Cell::new(0));

        {
            let a = Ref::new(0);
            let counter = calls.clone();
            watch(&a, move |_, _| counter.set(counter.get() + 1), WatchOptions::new());
            assert_eq!(Runtime::subject_count(), before + 1);
        }

        assert_eq!(Runtime::subject_count(), before);
        // The runner and its callback went with the reference.
        assert_eq!(Rc::strong_count(&calls), 1);
    }

    #[test]
    fn reference_getter_keeps_last_value_after_drop() {
        let a = Ref::new(1);
        let getter = WatchSource::from(&a).into_getter();

        a.set(2);
        assert_eq!(getter(), 2);

        drop(a);
        assert_eq!(getter(), 2);
    }

    #[test]
    #[traced_test]
    fn deep_is_accepted_and_logged() {
        let a = Ref::new(vec![1, 2]);
        let (log, cb) = recorder::<Vec<i32>>();
        watch(&a, cb, WatchOptions::new().deep(true));

        a.set(vec![1, 2, 3]);

        assert_eq!(log.borrow().len(), 1);
        assert!(logs_contain("deep watching is not supported"));
    }
}
