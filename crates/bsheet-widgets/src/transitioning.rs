//! Host-facing factory for modal sheet transitions.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use bsheet_core::{SheetPolicy, TargetHeight};

use crate::coordinator::{TransitionCoordinator, TransitionState};
use crate::host::{ContentView, ModalHost};
use crate::observer::{ObserverSlot, PanObserver};

/// Creates a fresh [`TransitionCoordinator`] for every presentation and
/// hands it to the host as both animator and interactive controller.
///
/// The delegate only keeps the current coordinator weakly; the host owns it
/// for the length of the modal session.
#[derive(Debug)]
pub struct SheetTransitioningDelegate {
    targets: Vec<TargetHeight>,
    start_index: usize,
    policy: SheetPolicy,
    pan: RefCell<ObserverSlot<dyn PanObserver>>,
    coordinator: RefCell<Weak<TransitionCoordinator>>,
}

impl SheetTransitioningDelegate {
    #[must_use]
    pub fn new(targets: Vec<TargetHeight>) -> Self {
        Self {
            targets,
            start_index: 0,
            policy: SheetPolicy::default(),
            pan: RefCell::new(ObserverSlot::empty()),
            coordinator: RefCell::new(Weak::new()),
        }
    }

    #[must_use]
    pub fn start_index(mut self, index: usize) -> Self {
        self.start_index = index;
        self
    }

    #[must_use]
    pub fn policy(mut self, policy: SheetPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn targets(&self) -> &[TargetHeight] {
        &self.targets
    }

    /// Pan observer for the current and future presentations.
    pub fn set_pan_observer(&self, observer: Option<Weak<dyn PanObserver>>) {
        self.pan.borrow_mut().set(observer.clone());
        if let Some(coordinator) = self.coordinator() {
            coordinator.set_pan_observer(observer);
        }
    }

    /// The coordinator of the current presentation, while the host keeps it.
    #[must_use]
    pub fn coordinator(&self) -> Option<Rc<TransitionCoordinator>> {
        self.coordinator.borrow().upgrade()
    }

    /// Start a presentation: a new coordinator bound to `content`,
    /// dismissible, forwarding dismiss requests to `host`.
    ///
    /// The host owns the returned coordinator for the modal session.
    #[must_use]
    pub fn presentation_coordinator(
        &self,
        content: Option<Rc<dyn ContentView>>,
        host: Weak<dyn ModalHost>,
    ) -> Rc<TransitionCoordinator> {
        let coordinator = TransitionCoordinator::with_policy(self.policy);
        coordinator.set_modal_host(Some(host));
        coordinator.set_pan_observer(self.pan.borrow().weak());
        coordinator.begin_presentation(content, &self.targets, self.start_index, true);
        *self.coordinator.borrow_mut() = Rc::downgrade(&coordinator);
        coordinator
    }

    /// The animator for the present transition.
    #[must_use]
    pub fn animator_for_presented(&self) -> Option<Rc<TransitionCoordinator>> {
        self.animator(TransitionState::Presenting)
    }

    /// The animator for the dismiss transition.
    #[must_use]
    pub fn animator_for_dismissed(&self) -> Option<Rc<TransitionCoordinator>> {
        self.animator(TransitionState::Dismissing)
    }

    /// The interactive controller for dismissal; the same coordinator.
    #[must_use]
    pub fn interactive_controller_for_dismissal(&self) -> Option<Rc<TransitionCoordinator>> {
        self.coordinator()
    }

    fn animator(&self, state: TransitionState) -> Option<Rc<TransitionCoordinator>> {
        let coordinator = self.coordinator()?;
        coordinator.set_transition_state(state);
        Some(coordinator)
    }
}
