//! Effect Implementation
//!
//! An Effect wraps a computation so that the subjects it reads are recorded
//! as its dependencies.
//!
//! # How Effects Work
//!
//! 1. [`effect`] wraps a body into a runnable [`Effect`]. Creating it does not
//!    run it; the caller decides when the first run happens.
//!
//! 2. [`Effect::run`] enters a reactive context, runs the body and returns its
//!    result. Every subject the body reads subscribes the effect.
//!
//! 3. When a dependency changes, the runtime calls the effect's scheduling
//!    job if one is configured, or runs the effect again otherwise.
//!
//! # Dependencies
//!
//! Dependencies accumulate. A re-run does not clear the sets the effect
//! joined on earlier runs, so an effect that stops reading a property is
//! still notified when it changes. Each effect keeps a record of the sets it
//! joined (see [`Effect::dependencies`]); nothing consumes that record yet.
//!
//! # Errors
//!
//! The effect does not catch anything. A body returning `Result` hands its
//! error back through [`Effect::run`], and a panicking body unwinds through
//! it. Either way the context stack is restored before control leaves `run`.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use smallvec::SmallVec;
use tracing::{instrument, trace};

use super::context::ReactiveContext;
use super::runtime::Reactive;
use super::subscriber::{DepId, SubscriberId};

/// A scheduling job run in place of the effect when a dependency changes.
pub type Job = Rc<dyn Fn()>;

/// Options an effect is created with.
#[derive(Clone, Default)]
pub struct EffectOptions {
    /// Carried for callers; the runtime never consults it.
    pub lazy: bool,

    /// Run on dependency change instead of re-running the effect.
    pub job: Option<Job>,
}

impl EffectOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lazy(mut self, lazy: bool) -> Self {
        self.lazy = lazy;
        self
    }

    pub fn job<F>(mut self, job: F) -> Self
    where
        F: Fn() + 'static,
    {
        self.job = Some(Rc::new(job));
        self
    }
}

impl fmt::Debug for EffectOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectOptions")
            .field("lazy", &self.lazy)
            .field("job", &self.job.is_some())
            .finish()
    }
}

struct EffectInner<T: 'static> {
    id: SubscriberId,
    this: Weak<EffectInner<T>>,
    active: bool,
    deps: RefCell<SmallVec<[DepId; 4]>>,
    raw: Rc<dyn Fn() -> T>,
    options: EffectOptions,
}

impl<T: 'static> Reactive for EffectInner<T> {
    fn subscriber_id(&self) -> SubscriberId {
        self.id
    }

    fn schedule(&self) {
        if let Some(job) = &self.options.job {
            job();
        } else if let Some(inner) = self.this.upgrade() {
            Effect { inner }.run();
        }
    }

    fn record_dependency(&self, dep: DepId) {
        self.deps.borrow_mut().push(dep);
    }
}

/// A trackable computation returning `T`.
///
/// Cloning an `Effect` yields another handle to the same computation.
///
/// # Example
///
/// ```rust,ignore
/// let count = Ref::new(0);
///
/// let c = count.clone();
/// let runner = effect(move || println!("Count is: {}", c.get()), EffectOptions::new());
/// runner.run();  // Prints: "Count is: 0"
///
/// count.set(5);  // Prints: "Count is: 5"
/// ```
pub struct Effect<T: 'static> {
    inner: Rc<EffectInner<T>>,
}

impl<T: 'static> Effect<T> {
    /// Wrap `body` into an effect. The body is not run.
    pub fn new<F>(body: F, options: EffectOptions) -> Self
    where
        F: Fn() -> T + 'static,
    {
        let raw: Rc<dyn Fn() -> T> = Rc::new(body);
        let inner = Rc::new_cyclic(|this| EffectInner {
            id: SubscriberId::new(),
            this: this.clone(),
            active: true,
            deps: RefCell::new(SmallVec::new()),
            raw,
            options,
        });

        Self { inner }
    }

    /// Run the body as the active effect and return its result.
    #[instrument(level = "trace", skip_all, fields(effect = %self.inner.id))]
    pub fn run(&self) -> T {
        let _ctx = ReactiveContext::enter(self.inner.clone());
        trace!(depth = ReactiveContext::depth(), "running effect");

        (self.inner.raw)()
    }

    pub fn id(&self) -> SubscriberId {
        self.inner.id
    }

    /// Always `true`: effects cannot be stopped.
    pub fn is_active(&self) -> bool {
        self.inner.active
    }

    /// The dependency sets this effect has joined, in the order it joined them.
    pub fn dependencies(&self) -> SmallVec<[DepId; 4]> {
        self.inner.deps.borrow().clone()
    }

    /// Get the number of dependency sets this effect has joined.
    pub fn dependency_count(&self) -> usize {
        self.inner.deps.borrow().len()
    }

    /// The wrapped body, callable without tracking.
    pub fn raw(&self) -> Rc<dyn Fn() -> T> {
        Rc::clone(&self.inner.raw)
    }

    pub fn options(&self) -> &EffectOptions {
        &self.inner.options
    }

    pub fn downgrade(&self) -> WeakEffect<T> {
        WeakEffect {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: 'static> Clone for Effect<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: 'static> fmt::Debug for Effect<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Effect")
            .field("id", &self.inner.id)
            .field("active", &self.inner.active)
            .field("dependency_count", &self.dependency_count())
            .field("options", &self.inner.options)
            .finish()
    }
}

/// A non-owning handle to an [`Effect`].
pub struct WeakEffect<T: 'static> {
    inner: Weak<EffectInner<T>>,
}

impl<T: 'static> WeakEffect<T> {
    pub fn upgrade(&self) -> Option<Effect<T>> {
        self.inner.upgrade().map(|inner| Effect { inner })
    }
}

impl<T: 'static> Clone for WeakEffect<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

/// Wrap `body` into a runnable effect.
pub fn effect<T, F>(body: F, options: EffectOptions) -> Effect<T>
where
    T: 'static,
    F: Fn() -> T + 'static,
{
    Effect::new(body, options)
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
