//! Observer interfaces exposed by the sheet.
//!
//! Observers are held weakly: the sheet never keeps its host alive, and an
//! observer that has been dropped is simply skipped at call time.

use std::fmt;
use std::rc::{Rc, Weak};

use crate::host::SheetId;

/// Receives the sheet offset on every drag update.
pub trait PanObserver {
    /// `offset` is the visible extent above the container's bottom edge.
    fn on_pan(&self, sheet: SheetId, offset: f64);
}

/// Receives dismissal requests from user interaction.
pub trait DismissObserver {
    /// A drag ended in the dismiss area of a dismissible sheet.
    fn on_dismiss_area_reached(&self, sheet: SheetId);

    /// The backdrop outside the panel was tapped.
    fn on_backdrop_tapped(&self, sheet: SheetId);
}

/// A non-owning, possibly empty reference to an observer.
pub struct ObserverSlot<T: ?Sized> {
    inner: Option<Weak<T>>,
}

impl<T: ?Sized> Default for ObserverSlot<T> {
    fn default() -> Self {
        Self { inner: None }
    }
}

impl<T: ?Sized> Clone for ObserverSlot<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: ?Sized> fmt::Debug for ObserverSlot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverSlot")
            .field("set", &self.inner.is_some())
            .field("alive", &self.get().is_some())
            .finish()
    }
}

impl<T: ?Sized> ObserverSlot<T> {
    /// An empty slot.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// A slot pointing at `observer`.
    #[must_use]
    pub fn new(observer: Weak<T>) -> Self {
        Self {
            inner: Some(observer),
        }
    }

    /// Replace the observer (or clear it with `None`).
    pub fn set(&mut self, observer: Option<Weak<T>>) {
        self.inner = observer;
    }

    /// Clear the slot.
    pub fn clear(&mut self) {
        self.inner = None;
    }

    /// The observer, if one is set and still alive.
    #[must_use]
    pub fn get(&self) -> Option<Rc<T>> {
        self.inner.as_ref().and_then(Weak::upgrade)
    }

    /// The stored weak reference, alive or not.
    #[must_use]
    pub fn weak(&self) -> Option<Weak<T>> {
        self.inner.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Counter(Cell<usize>);

    impl PanObserver for Counter {
        fn on_pan(&self, _sheet: SheetId, _offset: f64) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn empty_slot_yields_nothing() {
        let slot: ObserverSlot<dyn PanObserver> = ObserverSlot::empty();
        assert!(slot.get().is_none());
        assert!(slot.weak().is_none());
    }

    #[test]
    fn slot_does_not_keep_observer_alive() {
        let observer = Rc::new(Counter(Cell::new(0)));
        let weak = Rc::downgrade(&observer) as Weak<dyn PanObserver>;
        let slot = ObserverSlot::new(weak);

        if let Some(live) = slot.get() {
            live.on_pan(SheetId::next(), 10.0);
        }
        assert_eq!(observer.0.get(), 1);

        drop(observer);
        assert!(slot.get().is_none());
        assert!(slot.weak().is_some());
    }

    #[test]
    fn clear_removes_observer() {
        let observer = Rc::new(Counter(Cell::new(0)));
        let weak = Rc::downgrade(&observer) as Weak<dyn PanObserver>;
        let mut slot = ObserverSlot::new(weak);
        slot.clear();
        assert!(slot.get().is_none());
    }
}
