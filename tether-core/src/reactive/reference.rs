//! Reactive Reference
//!
//! A `Ref` is a boxed mutable value. It is the basic subject of the reactive
//! system: reading it from inside an effect subscribes the effect, and writing
//! it notifies every subscribed effect.
//!
//! # How References Work
//!
//! 1. Every tracked read ([`Ref::get`], [`Ref::with`]) calls `track` with the
//!    reference itself as the subject and [`Ref::PROPERTY`] as the property.
//!
//! 2. Every write ([`Ref::set`], [`Ref::update`]) stores the new value and then
//!    calls `trigger`. There is no equality check: assigning the value the
//!    reference already holds still notifies.
//!
//! # Identity
//!
//! Clones of a `Ref` share one slot and one subject key, so they are the same
//! reference. Two references created separately are distinct subjects even
//! when they hold equal values.

use std::cell::RefCell;
use std::fmt::{self, Debug};
use std::rc::{Rc, Weak};

use super::runtime::{track, trigger, Runtime, Subject, SubjectKey};
use crate::error::Result;

struct RefInner<T> {
    key: SubjectKey,
    value: RefCell<T>,
}

/// A reactive reference holding a value of type T.
///
/// # Example
///
/// ```rust,ignore
/// let count = Ref::new(0);
///
/// // Read the value
/// let value = count.get();
///
/// // Update the value (notifies subscribers)
/// count.set(5);
/// ```
pub struct Ref<T: 'static> {
    inner: Rc<RefInner<T>>,
}

impl<T: 'static> Ref<T> {
    /// The property name reads and writes are tracked under.
    pub const PROPERTY: &'static str = "value";

    /// Create a new reference with the given initial value.
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefInner {
                key: SubjectKey::new(),
                value: RefCell::new(value),
            }),
        }
    }

    /// Borrow the current value.
    ///
    /// If called within an effect, this also subscribes the effect.
    ///
    /// # Panics
    ///
    /// Panics if `f` writes to this same reference.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        track(self, Self::PROPERTY);
        f(&*self.inner.value.borrow())
    }

    /// Set a new value and notify subscribers.
    ///
    /// This re-runs every effect that read the reference, even when the new
    /// value equals the old one.
    pub fn set(&self, value: T) {
        *self.inner.value.borrow_mut() = value;
        trigger(self, Self::PROPERTY);
    }

    /// Like [`Ref::set`], but fails instead of panicking when the value is
    /// currently borrowed.
    pub fn try_set(&self, value: T) -> Result<()> {
        *self.inner.value.try_borrow_mut()? = value;
        trigger(self, Self::PROPERTY);
        Ok(())
    }

    /// Update the value using a function.
    ///
    /// The current value is read without tracking; the write notifies as
    /// [`Ref::set`] does.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&T) -> T,
    {
        let new_value = f(&*self.inner.value.borrow());
        self.set(new_value);
    }

    /// Get the number of effects subscribed to this reference.
    pub fn subscriber_count(&self) -> usize {
        Runtime::subscriber_count(self.inner.key.id(), Self::PROPERTY)
    }

    /// Whether both handles point at the same reference.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Create a handle that does not keep the reference alive.
    pub fn downgrade(&self) -> WeakRef<T> {
        WeakRef {
            inner: Rc::downgrade(&self.inner),
        }
    }
}

impl<T: Clone + 'static> Ref<T> {
    /// Get the current value.
    ///
    /// If called within an effect, this also subscribes the effect.
    pub fn get(&self) -> T {
        self.with(T::clone)
    }

    /// Like [`Ref::get`], but fails instead of panicking when the value is
    /// being written.
    ///
    /// Outside of `with`, a write holds the slot only while the old value is
    /// being dropped, so this can only fail when that value's `Drop` reads
    /// the reference it is being replaced in.
    pub fn try_get(&self) -> Result<T> {
        track(self, Self::PROPERTY);
        Ok(self.inner.value.try_borrow()?.clone())
    }

    /// Get the current value without tracking dependencies.
    pub fn get_untracked(&self) -> T {
        self.inner.value.borrow().clone()
    }
}

impl<T: 'static> Subject for Ref<T> {
    fn subject_key(&self) -> &SubjectKey {
        &self.inner.key
    }
}

impl<T: 'static> Clone for Ref<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

/// A non-owning handle to a [`Ref`].
pub struct WeakRef<T: 'static> {
    inner: Weak<RefInner<T>>,
}

impl<T: 'static> WeakRef<T> {
    /// The reference, if it is still alive.
    pub fn upgrade(&self) -> Option<Ref<T>> {
        self.inner.upgrade().map(|inner| Ref { inner })
    }
}

impl<T: 'static> Clone for WeakRef<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<T: Default + 'static> Default for Ref<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Debug + 'static> Debug for Ref<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Ref");
        s.field("subject", &self.inner.key.id());
        match self.inner.value.try_borrow() {
            Ok(value) => s.field("value", &*value),
            Err(_) => s.field("value", &format_args!("<borrowed>")),
        };
        s.field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
