//! Per-event subscription set
//!
//! Listeners for one event, kept in priority order (highest first). Equal
//! priorities keep their arrival order. Insertion is a linear scan, which is
//! fine for the tens of listeners an event is expected to carry.

use crate::listener::{ListenerKey, SharedListener};
use crate::types::Priority;

/// One registered listener.
pub(crate) struct Entry<T> {
    pub(crate) listener: SharedListener<T>,
    pub(crate) priority: Priority,
}

impl<T> Entry<T> {
    fn key(&self) -> ListenerKey {
        ListenerKey::of(&self.listener)
    }
}

/// Outcome of [`SubscriptionSet::insert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Insertion {
    /// Listener added. `exceeded` carries the count the set held before the
    /// insertion when it was already at or above the limit.
    Added { exceeded: Option<usize> },
    /// Listener was already registered, nothing changed
    Duplicate,
}

/// Ordered listeners of one event.
pub(crate) struct SubscriptionSet<T> {
    entries: Vec<Entry<T>>,
    max_listeners: usize,
}

impl<T> SubscriptionSet<T> {
    pub(crate) fn new(max_listeners: usize) -> Self {
        Self {
            entries: Vec::new(),
            max_listeners,
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn contains(&self, key: ListenerKey) -> bool {
        self.entries.iter().any(|e| e.key() == key)
    }

    /// Insert a listener after every entry with a priority greater than or
    /// equal to its own.
    pub(crate) fn insert(&mut self, listener: SharedListener<T>, priority: Priority) -> Insertion {
        if self.contains(ListenerKey::of(&listener)) {
            return Insertion::Duplicate;
        }

        let before = self.entries.len();
        let exceeded = (before >= self.max_listeners).then_some(before);

        let index = self
            .entries
            .iter()
            .position(|e| e.priority < priority)
            .unwrap_or(before);
        self.entries.insert(index, Entry { listener, priority });

        Insertion::Added { exceeded }
    }

    /// Remove the entry for a listener. Returns whether one was removed.
    pub(crate) fn remove(&mut self, key: ListenerKey) -> bool {
        match self.entries.iter().position(|e| e.key() == key) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Remove every entry, returning how many there were.
    pub(crate) fn clear(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }

    /// Listeners in dispatch order.
    pub(crate) fn snapshot(&self) -> Vec<SharedListener<T>> {
        self.entries.iter().map(|e| e.listener.clone()).collect()
    }

    #[cfg(test)]
    pub(crate) fn entries(&self) -> &[Entry<T>] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listener::listener_fn;

    fn noop() -> SharedListener<()> {
        listener_fn(|_: ()| async { Ok(()) })
    }

    fn priorities(set: &SubscriptionSet<()>) -> Vec<Priority> {
        set.entries().iter().map(|e| e.priority).collect()
    }

    #[test]
    fn test_insert_orders_by_priority_descending() {
        let mut set = SubscriptionSet::new(10);
        for p in [0, 2, 1, -5, 7] {
            set.insert(noop(), p);
        }
        assert_eq!(priorities(&set), vec![7, 2, 1, 0, -5]);
    }

    #[test]
    fn test_equal_priorities_keep_arrival_order() {
        let mut set = SubscriptionSet::new(10);
        let first = noop();
        let second = noop();
        let third = noop();

        set.insert(first.clone(), 1);
        set.insert(noop(), 5);
        set.insert(second.clone(), 1);
        set.insert(third.clone(), 1);

        let keys: Vec<ListenerKey> = set.entries()[1..].iter().map(|e| e.key()).collect();
        assert_eq!(
            keys,
            vec![
                ListenerKey::of(&first),
                ListenerKey::of(&second),
                ListenerKey::of(&third)
            ]
        );
    }

    #[test]
    fn test_duplicate_is_not_inserted() {
        let mut set = SubscriptionSet::new(10);
        let listener = noop();

        assert_eq!(
            set.insert(listener.clone(), 0),
            Insertion::Added { exceeded: None }
        );
        assert_eq!(set.insert(listener.clone(), 3), Insertion::Duplicate);
        assert_eq!(set.len(), 1);
        assert_eq!(priorities(&set), vec![0]);
    }

    #[test]
    fn test_exceeded_reported_once_limit_reached() {
        let mut set = SubscriptionSet::new(2);

        assert_eq!(set.insert(noop(), 0), Insertion::Added { exceeded: None });
        assert_eq!(set.insert(noop(), 0), Insertion::Added { exceeded: None });
        assert_eq!(set.insert(noop(), 0), Insertion::Added { exceeded: Some(2) });
        assert_eq!(set.insert(noop(), 0), Insertion::Added { exceeded: Some(3) });
        assert_eq!(set.len(), 4);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut set = SubscriptionSet::new(10);
        let a = noop();
        let b = noop();
        set.insert(a.clone(), 0);
        set.insert(b.clone(), 0);

        assert!(set.remove(ListenerKey::of(&a)));
        assert!(!set.remove(ListenerKey::of(&a)));
        assert!(set.contains(ListenerKey::of(&b)));
        assert_eq!(set.snapshot().len(), 1);

        assert_eq!(set.clear(), 1);
        assert!(set.is_empty());
    }
}
