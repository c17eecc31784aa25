//! Event registry
//!
//! Maps event names to their [`SubscriptionSet`]. A name is present only
//! while its set holds at least one listener; every removal path drops the
//! set as soon as it becomes empty. Names keep their first-registration
//! order.

use crate::listener::{ListenerKey, SharedListener};
use crate::subscription::{Insertion, SubscriptionSet};
use crate::types::Priority;
use indexmap::IndexMap;
use std::borrow::Borrow;
use std::hash::Hash;

pub(crate) struct Registry<T, K> {
    sets: IndexMap<K, SubscriptionSet<T>>,
    max_listeners: usize,
}

impl<T, K> Registry<T, K>
where
    K: Hash + Eq,
{
    pub(crate) fn new(max_listeners: usize) -> Self {
        Self {
            sets: IndexMap::new(),
            max_listeners,
        }
    }

    /// Add a listener, creating the event's set on first use.
    pub(crate) fn insert(
        &mut self,
        event: K,
        listener: SharedListener<T>,
        priority: Priority,
    ) -> Insertion {
        let max_listeners = self.max_listeners;
        self.sets
            .entry(event)
            .or_insert_with(|| SubscriptionSet::new(max_listeners))
            .insert(listener, priority)
    }

    /// Remove one listener from one event. Returns whether it was found.
    pub(crate) fn remove<Q>(&mut self, event: &Q, key: ListenerKey) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Some(set) = self.sets.get_mut(event) else {
            return false;
        };
        let removed = set.remove(key);
        if set.is_empty() {
            self.sets.shift_remove(event);
        }
        removed
    }

    /// Drop an event's whole set. Returns the number of listeners it held,
    /// or `None` when the event was not registered.
    pub(crate) fn remove_event<Q>(&mut self, event: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.sets.shift_remove(event).map(|mut set| set.clear())
    }

    /// Drop every set. Returns how many events were registered.
    pub(crate) fn clear(&mut self) -> usize {
        let count = self.sets.len();
        for set in self.sets.values_mut() {
            set.clear();
        }
        self.sets.clear();
        count
    }

    pub(crate) fn contains<Q>(&self, event: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.sets.contains_key(event)
    }

    pub(crate) fn count<Q>(&self, event: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.sets.get(event).map(SubscriptionSet::len).unwrap_or(0)
    }

    pub(crate) fn names(&self) -> Vec<K>
    where
        K: Clone,
    {
        self.sets.keys().cloned().collect()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Listeners of an event in dispatch order, if it is registered.
    pub(crate) fn snapshot<Q>(&self, event: &Q) -> Option<Vec<SharedListener<T>>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.sets.get(event).map(SubscriptionSet::snapshot)
    }
}
