//! Recording observers.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use bsheet_widgets::{DismissObserver, PanObserver, SheetId};

/// One observer callback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SheetEvent {
    Pan(f64),
    DismissAreaReached,
    BackdropTapped,
}

/// Records every pan and dismiss callback it receives, in order.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: RefCell<Vec<SheetEvent>>,
}

impl RecordingObserver {
    #[must_use]
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    #[must_use]
    pub fn events(&self) -> Vec<SheetEvent> {
        self.events.borrow().clone()
    }

    /// Offsets of the recorded pan callbacks.
    #[must_use]
    pub fn pans(&self) -> Vec<f64> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                SheetEvent::Pan(offset) => Some(*offset),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn count(&self, wanted: SheetEvent) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|event| std::mem::discriminant(*event) == std::mem::discriminant(&wanted))
            .count()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }

    #[must_use]
    pub fn pan_observer(self: &Rc<Self>) -> Weak<dyn PanObserver> {
        Rc::downgrade(self) as Weak<dyn PanObserver>
    }

    #[must_use]
    pub fn dismiss_observer(self: &Rc<Self>) -> Weak<dyn DismissObserver> {
        Rc::downgrade(self) as Weak<dyn DismissObserver>
    }
}

impl PanObserver for RecordingObserver {
    fn on_pan(&self, _sheet: SheetId, offset: f64) {
        self.events.borrow_mut().push(SheetEvent::Pan(offset));
    }
}

impl DismissObserver for RecordingObserver {
    fn on_dismiss_area_reached(&self, _sheet: SheetId) {
        self.events.borrow_mut().push(SheetEvent::DismissAreaReached);
    }

    fn on_backdrop_tapped(&self, _sheet: SheetId) {
        self.events.borrow_mut().push(SheetEvent::BackdropTapped);
    }
}

/// Shared log of completion results.
#[derive(Debug, Clone, Default)]
pub struct CompletionLog {
    entries: Rc<RefCell<Vec<bool>>>,
}

impl CompletionLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A completion that appends its result to this log.
    #[must_use]
    pub fn callback(&self) -> impl FnOnce(bool) + 'static {
        let entries = Rc::clone(&self.entries);
        move |did_complete| entries.borrow_mut().push(did_complete)
    }

    /// A completion that appends `(label, result)` to a shared ordering log.
    #[must_use]
    pub fn labeled(
        order: &Rc<RefCell<Vec<(&'static str, bool)>>>,
        label: &'static str,
    ) -> impl FnOnce(bool) + 'static {
        let order = Rc::clone(order);
        move |did_complete| order.borrow_mut().push((label, did_complete))
    }

    #[must_use]
    pub fn entries(&self) -> Vec<bool> {
        self.entries.borrow().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}
