//! Snapshot store with an explicit observer list.

use tracing::debug;

use crate::model::Snapshot;

/// Handle returned by [`StateStore::subscribe`]; pass it back to
/// [`StateStore::unsubscribe`] to stop deliveries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

type Observer = Box<dyn FnMut(&Snapshot)>;

/// Holds the last accepted snapshot and the observers interested in it.
///
/// The store has a single writer (the transport pump calls [`replace`]) and
/// any number of readers; [`snapshot`] hands out shared references, so held
/// state cannot be mutated in place. Observers run synchronously, in
/// registration order, exactly once per accepted snapshot.
///
/// [`replace`]: StateStore::replace
/// [`snapshot`]: StateStore::snapshot
pub struct StateStore {
    snapshot: Snapshot,
    observers: Vec<(ObserverId, Observer)>,
    next_observer: u64,
}

impl StateStore {
    /// An empty store with no observers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            snapshot: Snapshot::default(),
            observers: Vec::new(),
            next_observer: 0,
        }
    }

    /// The current snapshot, read-only.
    #[must_use]
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Overwrites the held state wholesale and notifies every observer.
    pub fn replace(&mut self, snapshot: Snapshot) {
        self.snapshot = snapshot;
        debug!(
            chains = self.snapshot.chains.len(),
            machines = self.snapshot.machines.len(),
            maintenance = self.snapshot.maintenance.len(),
            stock = self.snapshot.stock.len(),
            seq = self.snapshot.seq,
            "state replaced"
        );
        for (_, observer) in &mut self.observers {
            observer(&self.snapshot);
        }
    }

    /// Registers an observer; it will see every subsequently accepted
    /// snapshot until unsubscribed.
    pub fn subscribe(&mut self, observer: impl FnMut(&Snapshot) + 'static) -> ObserverId {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Removes an observer. Returns `false` when the id is unknown.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(observer_id, _)| *observer_id != id);
        self.observers.len() != before
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::model::Chain;

    fn snapshot_with_chain(name: &str) -> Snapshot {
        Snapshot {
            chains: vec![Chain {
                id_chain: "1".into(),
                name_chain: name.to_string(),
            }],
            ..Snapshot::default()
        }
    }

    #[test]
    fn replace_stores_the_snapshot_exactly() {
        let mut store = StateStore::new();
        let snapshot = snapshot_with_chain("A");
        store.replace(snapshot.clone());
        assert_eq!(*store.snapshot(), snapshot);
    }

    #[test]
    fn observers_fire_once_each_in_registration_order() {
        let mut store = StateStore::new();
        let calls: Rc<RefCell<Vec<&'static str>>> = Rc::new(RefCell::new(Vec::new()));

        let first = Rc::clone(&calls);
        store.subscribe(move |_| first.borrow_mut().push("first"));
        let second = Rc::clone(&calls);
        store.subscribe(move |_| second.borrow_mut().push("second"));

        store.replace(snapshot_with_chain("A"));
        assert_eq!(*calls.borrow(), ["first", "second"]);

        store.replace(snapshot_with_chain("B"));
        assert_eq!(*calls.borrow(), ["first", "second", "first", "second"]);
    }

    #[test]
    fn observers_see_the_new_snapshot() {
        let mut store = StateStore::new();
        let seen: Rc<RefCell<Option<Snapshot>>> = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&seen);
        store.subscribe(move |snapshot| *sink.borrow_mut() = Some(snapshot.clone()));

        let snapshot = snapshot_with_chain("A");
        store.replace(snapshot.clone());
        assert_eq!(seen.borrow().as_ref(), Some(&snapshot));
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let mut store = StateStore::new();
        let count = Rc::new(RefCell::new(0_u32));

        let sink = Rc::clone(&count);
        let id = store.subscribe(move |_| *sink.borrow_mut() += 1);

        store.replace(snapshot_with_chain("A"));
        assert_eq!(*count.borrow(), 1);

        assert!(store.unsubscribe(id));
        store.replace(snapshot_with_chain("B"));
        assert_eq!(*count.borrow(), 1);

        assert!(!store.unsubscribe(id));
    }
}
