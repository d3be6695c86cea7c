//! Dependency Store
//!
//! Maps a subject and a property name to the set of effects that read that
//! property. This is a plain data structure: the thread-local instance and the
//! track/trigger entry points live in the runtime.
//!
//! # Layout
//!
//! The store is an arena of dependency sets plus an index into it:
//!
//! ```text
//! targets: SubjectId -> (property -> DepId)
//! deps:    DepId     -> Dep (insertion-ordered subscriber set)
//! ```
//!
//! Entries are created lazily on first track and are never pruned when an
//! effect stops reading a property. The only removal is [`release`], which
//! drops everything under a subject once that subject is gone.
//!
//! [`release`]: DependencyStore::release

use std::collections::HashMap;
use std::rc::Rc;

use indexmap::IndexMap;

use super::runtime::Reactive;
use super::subscriber::{DepId, SubjectId, SubscriberId};

/// One dependency set: the effects subscribed to a (subject, property) pair.
///
/// Iteration order is insertion order.
#[derive(Default)]
pub(crate) struct Dep {
    subscribers: IndexMap<SubscriberId, Rc<dyn Reactive>>,
}

impl Dep {
    pub(crate) fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub(crate) fn contains(&self, id: SubscriberId) -> bool {
        self.subscribers.contains_key(&id)
    }
}

#[derive(Default)]
pub(crate) struct DependencyStore {
    targets: HashMap<SubjectId, HashMap<String, DepId>>,
    deps: HashMap<DepId, Dep>,
    next_dep: u64,
}

impl DependencyStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Add `effect` to the subscriber set of `(subject, property)`.
    ///
    /// Returns the set's ID when the effect was newly added, and `None` when
    /// it was already a member.
    pub(crate) fn subscribe(
        &mut self,
        subject: SubjectId,
        property: &str,
        effect: &Rc<dyn Reactive>,
    ) -> Option<DepId> {
        let dep_id = self.dep_id_or_insert(subject, property);
        let dep = self.deps.entry(dep_id).or_default();

        let id = effect.subscriber_id();
        if dep.contains(id) {
            return None;
        }
        dep.subscribers.insert(id, Rc::clone(effect));
        Some(dep_id)
    }

    fn dep_id_or_insert(&mut self, subject: SubjectId, property: &str) -> DepId {
        let properties = self.targets.entry(subject).or_default();
        if let Some(id) = properties.get(property) {
            return *id;
        }

        let id = DepId::from_raw(self.next_dep);
        self.next_dep += 1;
        properties.insert(property.to_owned(), id);
        id
    }

    /// The `index`-th subscriber of `(subject, property)`, in insertion order.
    ///
    /// Unknown subjects and properties have no subscribers.
    pub(crate) fn subscriber_at(
        &self,
        subject: SubjectId,
        property: &str,
        index: usize,
    ) -> Option<Rc<dyn Reactive>> {
        let (_, subscriber) = self.dep(subject, property)?.subscribers.get_index(index)?;
        Some(Rc::clone(subscriber))
    }

    pub(crate) fn subscriber_count(&self, subject: SubjectId, property: &str) -> usize {
        self.dep(subject, property).map_or(0, Dep::len)
    }

    fn dep(&self, subject: SubjectId, property: &str) -> Option<&Dep> {
        let id = self.targets.get(&subject)?.get(property)?;
        self.deps.get(id)
    }

    /// Number of subjects with at least one property entry.
    pub(crate) fn subject_count(&self) -> usize {
        self.targets.len()
    }

    /// Remove every entry under `subject`.
    ///
    /// The removed sets are returned rather than dropped here: dropping them
    /// can drop effects, whose closures may own other subjects, whose keys
    /// call back into the store.
    pub(crate) fn release(&mut self, subject: SubjectId) -> Vec<Dep> {
        let Some(properties) = self.targets.remove(&subject) else {
            return Vec::new();
        };

        properties
            .into_values()
            .filter_map(|id| self.deps.remove(&id))
            .collect()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
