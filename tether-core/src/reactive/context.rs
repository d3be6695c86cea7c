//! Reactive Context
//!
//! The reactive context tracks which effect is currently running.
//! This enables automatic dependency tracking: when a subject is read,
//! the runtime subscribes the active effect to it.
//!
//! # Implementation
//!
//! We use a thread-local stack of running effects. Running an effect pushes
//! it onto the stack, and the top of the stack is the active effect. When the
//! effect's body returns, the guard pops it and the previous entry (if any)
//! becomes active again.
//!
//! This design supports nested effects: an effect run from inside another
//! effect's body attributes its own reads to itself, and the outer effect is
//! active again once the inner one finishes.
//!
//! Only the effect runner can enter a context. Callers can inspect the stack
//! but never move the active-effect pointer themselves.

use std::cell::RefCell;
use std::rc::Rc;

use super::runtime::Reactive;
use super::SubscriberId;

thread_local! {
    static CONTEXT_STACK: RefCell<Vec<Rc<dyn Reactive>>> = RefCell::new(Vec::new());
}

/// Guard that pops the context when dropped.
///
/// This ensures the context stack is properly maintained even if
/// the effect body panics.
pub struct ReactiveContext {
    subscriber_id: SubscriberId,
}

impl ReactiveContext {
    /// Enter a new reactive context for the given effect.
    ///
    /// While this context is active, any subject that is read will
    /// subscribe the effect.
    ///
    /// The context is automatically exited when the returned guard is dropped.
    pub(crate) fn enter(effect: Rc<dyn Reactive>) -> Self {
        let subscriber_id = effect.subscriber_id();
        CONTEXT_STACK.with(|stack| stack.borrow_mut().push(effect));

        Self { subscriber_id }
    }

    /// Check if there is an active reactive context.
    pub fn is_active() -> bool {
        CONTEXT_STACK.with(|stack| !stack.borrow().is_empty())
    }

    /// Get the ID of the active effect, if any.
    pub fn current_subscriber() -> Option<SubscriberId> {
        CONTEXT_STACK.with(|stack| stack.borrow().last().map(|e| e.subscriber_id()))
    }

    /// Number of effects currently executing on this thread.
    pub fn depth() -> usize {
        CONTEXT_STACK.with(|stack| stack.borrow().len())
    }

    pub(crate) fn active_effect() -> Option<Rc<dyn Reactive>> {
        CONTEXT_STACK.with(|stack| stack.borrow().last().cloned())
    }
}

impl Drop for ReactiveContext {
    fn drop(&mut self) {
        let popped = CONTEXT_STACK.with(|stack| stack.borrow_mut().pop());

        if let Some(entry) = popped {
            debug_assert_eq!(
                entry.subscriber_id(),
                self.subscriber_id,
                "ReactiveContext mismatch: expected {:?}, got {:?}",
                self.subscriber_id,
                entry.subscriber_id()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::DepId;
    use std::panic::AssertUnwindSafe;

    struct Probe(SubscriberId);

    impl Reactive for Probe {
        fn subscriber_id(&self) -> SubscriberId {
            self.0
        }

        fn schedule(&self) {}

        fn record_dependency(&self, _dep: DepId) {}
    }

    fn probe() -> (SubscriberId, Rc<dyn Reactive>) {
        let id = SubscriberId::new();
        (id, Rc::new(Probe(id)))
    }

    #[test]
    fn context_tracks_subscriber() {
        let (id, effect) = probe();

        assert!(!ReactiveContext::is_active());
        assert!(ReactiveContext::current_subscriber().is_none());

        {
            let _ctx = ReactiveContext::enter(effect);

            assert!(ReactiveContext::is_active());
            assert_eq!(ReactiveContext::current_subscriber(), Some(id));
        }

        // Context should be cleaned up after drop
        assert!(!ReactiveContext::is_active());
        assert!(ReactiveContext::current_subscriber().is_none());
    }

    #[test]
    fn nested_contexts() {
        let (id1, effect1) = probe();
        let (id2, effect2) = probe();

        {
            let _ctx1 = ReactiveContext::enter(effect1);
            assert_eq!(ReactiveContext::current_subscriber(), Some(id1));

            {
                let _ctx2 = ReactiveContext::enter(effect2);
                assert_eq!(ReactiveContext::current_subscriber(), Some(id2));
                assert_eq!(ReactiveContext::depth(), 2);
            }

            // After inner context drops, outer should be current
            assert_eq!(ReactiveContext::current_subscriber(), Some(id1));
        }

        assert!(ReactiveContext::current_subscriber().is_none());
    }

    #[test]
    fn context_is_popped_on_panic() {
        let (_, effect) = probe();

        let result = std::panic::catch_unwind(AssertUnwindSafe(move || {
            let _ctx = ReactiveContext::enter(effect);
            panic!("body failed");
        }));

        assert!(result.is_err());
        assert_eq!(ReactiveContext::depth(), 0);
    }
}
