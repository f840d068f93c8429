//! Present/dismiss sequencing for one modal sheet session.
//!
//! A [`TransitionCoordinator`] binds a [`SheetSurface`] at the start of a
//! presentation, drives the present move and later the dismiss move through
//! the host's transition runtime, and routes the surface's dismiss requests
//! back to the host's own dismissal entry point.
//!
//! The host's animated and interactive transition entry points both land in
//! [`TransitionCoordinator::drive_transition`]; the direction comes from the
//! stored [`TransitionState`].

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

use bsheet_core::{SheetError, SheetPolicy, Size, TargetHeight};

use crate::LOG_TARGET;
use crate::host::{Completion, ContainerView, ContentView, ModalHost, SheetId, TransitionContext};
use crate::observer::{DismissObserver, ObserverSlot, PanObserver};
use crate::surface::{SheetOptions, SheetSurface};

/// Which move the coordinator drives next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionState {
    #[default]
    Presenting,
    Dismissing,
}

/// Drives one present and one dismiss transition for a modal session.
///
/// Created behind an [`Rc`] so the surface can hold it weakly as its dismiss
/// observer.
pub struct TransitionCoordinator {
    this: Weak<Self>,
    policy: SheetPolicy,
    state: Cell<TransitionState>,
    surface: RefCell<Option<SheetSurface>>,
    start_index: Cell<usize>,
    began: Cell<bool>,
    reduced_motion: Cell<bool>,
    host: RefCell<ObserverSlot<dyn ModalHost>>,
    pan: RefCell<ObserverSlot<dyn PanObserver>>,
}

impl fmt::Debug for TransitionCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionCoordinator")
            .field("state", &self.state.get())
            .field("began", &self.began.get())
            .field("start_index", &self.start_index.get())
            .field(
                "surface",
                &self
                    .surface
                    .try_borrow()
                    .ok()
                    .and_then(|surface| surface.as_ref().map(SheetSurface::id)),
            )
            .field("policy", &self.policy)
            .finish()
    }
}

impl TransitionCoordinator {
    /// Create a coordinator with the default policy.
    #[must_use]
    pub fn new() -> Rc<Self> {
        Self::with_policy(SheetPolicy::default())
    }

    #[must_use]
    pub fn with_policy(policy: SheetPolicy) -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            this: this.clone(),
            policy,
            state: Cell::new(TransitionState::default()),
            surface: RefCell::new(None),
            start_index: Cell::new(0),
            began: Cell::new(false),
            reduced_motion: Cell::new(false),
            host: RefCell::new(ObserverSlot::empty()),
            pan: RefCell::new(ObserverSlot::empty()),
        })
    }

    /// Where dismiss requests from the surface are forwarded.
    pub fn set_modal_host(&self, host: Option<Weak<dyn ModalHost>>) {
        self.host.borrow_mut().set(host);
    }

    /// Pan observer for the bound surface, now and for a later binding.
    pub fn set_pan_observer(&self, observer: Option<Weak<dyn PanObserver>>) {
        self.pan.borrow_mut().set(observer.clone());
        if let Some(surface) = self.surface() {
            surface.set_pan_observer(observer);
        }
    }

    pub fn set_reduced_motion(&self, reduced: bool) {
        self.reduced_motion.set(reduced);
        if let Some(surface) = self.surface() {
            surface.set_reduced_motion(reduced);
        }
    }

    #[must_use]
    pub fn transition_state(&self) -> TransitionState {
        self.state.get()
    }

    /// Set before the host asks for the animated or interactive transition.
    pub fn set_transition_state(&self, state: TransitionState) {
        self.state.set(state);
    }

    #[must_use]
    pub fn policy(&self) -> SheetPolicy {
        self.policy
    }

    /// The bound surface, until the dismiss move completes.
    #[must_use]
    pub fn surface(&self) -> Option<SheetSurface> {
        self.surface.borrow().clone()
    }

    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.surface.borrow().is_some()
    }

    // --- Lifecycle ---

    /// Bind a surface for `content` with the backdrop visible. Does not
    /// animate.
    ///
    /// Only the first call has any effect. Missing content or an empty
    /// height list leaves the coordinator unbound; later transitions then
    /// complete with `false`.
    pub fn begin_presentation(
        &self,
        content: Option<Rc<dyn ContentView>>,
        targets: &[TargetHeight],
        start_index: usize,
        dismissible: bool,
    ) {
        if self.began.replace(true) {
            tracing::warn!(target: LOG_TARGET, "presentation already began; ignored");
            return;
        }

        let Some(content) = content else {
            tracing::warn!(
                target: LOG_TARGET,
                error = %SheetError::MissingContent,
                "presentation not bound"
            );
            return;
        };

        let options = SheetOptions::new()
            .policy(self.policy)
            .dismissible(dismissible)
            .dim_hidden(false);
        let surface = match SheetSurface::new(content, targets, options) {
            Ok(surface) => surface,
            Err(err) => {
                tracing::warn!(target: LOG_TARGET, error = %err, "presentation not bound");
                return;
            }
        };

        let observer: Weak<dyn DismissObserver> = self.this.clone();
        surface.set_dismiss_observer(Some(observer));
        surface.set_pan_observer(self.pan.borrow().weak());
        surface.set_reduced_motion(self.reduced_motion.get());

        tracing::debug!(
            target: LOG_TARGET,
            sheet = surface.id().raw(),
            start_index,
            dismissible,
            "presentation bound"
        );
        self.start_index.set(start_index);
        *self.surface.borrow_mut() = Some(surface);
    }

    /// Run the move for `direction` inside `container`.
    ///
    /// `completion` fires exactly once: on arrival, when the move is
    /// superseded, or immediately with `false` when nothing is bound.
    pub fn drive_transition(
        &self,
        direction: TransitionState,
        container: Rc<dyn ContainerView>,
        completion: impl FnOnce(bool) + 'static,
    ) {
        let Some(surface) = self.surface() else {
            tracing::warn!(
                target: LOG_TARGET,
                direction = ?direction,
                error = %SheetError::MissingContent,
                "transition has no surface"
            );
            completion(false);
            return;
        };

        tracing::debug!(
            target: LOG_TARGET,
            sheet = surface.id().raw(),
            direction = ?direction,
            "driving transition"
        );
        match direction {
            TransitionState::Presenting => {
                surface.present(&container, self.start_index.get(), completion);
            }
            TransitionState::Dismissing => {
                let this = self.this.clone();
                let sheet = surface.id();
                let completion: Completion = Box::new(move |did_complete| {
                    if let Some(coordinator) = this.upgrade() {
                        coordinator.release_surface(sheet);
                    }
                    completion(did_complete);
                });
                surface.dismiss_joining(completion);
            }
        }
    }

    /// Interactive entry point; the live drag is owned by the surface, so
    /// this runs the same move as [`drive_transition`](Self::drive_transition).
    pub fn drive_interactive_transition(
        &self,
        direction: TransitionState,
        container: Rc<dyn ContainerView>,
        completion: impl FnOnce(bool) + 'static,
    ) {
        self.drive_transition(direction, container, completion);
    }

    /// Host animated-transition entry point, using the stored state.
    pub fn animate_transition(&self, context: Rc<dyn TransitionContext>) {
        let container = context.container();
        self.drive_transition(self.state.get(), container, move |did_complete| {
            context.complete_transition(did_complete);
        });
    }

    /// Host interactive-transition entry point, using the stored state.
    pub fn start_interactive_transition(&self, context: Rc<dyn TransitionContext>) {
        let container = context.container();
        self.drive_interactive_transition(self.state.get(), container, move |did_complete| {
            context.complete_transition(did_complete);
        });
    }

    /// The presenting context changed size: re-resolve and re-snap.
    pub fn on_size_change(&self, size: Size) {
        if let Some(surface) = self.surface() {
            surface.relayout(size);
        }
    }

    /// Advance the bound surface's motion.
    pub fn tick(&self, delta: Duration) -> bool {
        self.surface().is_some_and(|surface| surface.tick(delta))
    }

    fn release_surface(&self, sheet: SheetId) {
        let mut slot = self.surface.borrow_mut();
        if slot.as_ref().is_some_and(|surface| surface.id() == sheet) {
            tracing::debug!(target: LOG_TARGET, sheet = sheet.raw(), "surface released");
            *slot = None;
        }
    }

    fn request_host_dismiss(&self, sheet: SheetId, trigger: &'static str) {
        let host = self.host.borrow().get();
        if let Some(host) = host {
            tracing::debug!(
                target: LOG_TARGET,
                sheet = sheet.raw(),
                trigger,
                "requesting host dismissal"
            );
            self.state.set(TransitionState::Dismissing);
            host.dismiss_presented();
        }
    }
}

impl DismissObserver for TransitionCoordinator {
    fn on_dismiss_area_reached(&self, sheet: SheetId) {
        self.request_host_dismiss(sheet, "dismiss_area");
    }

    fn on_backdrop_tapped(&self, sheet: SheetId) {
        self.request_host_dismiss(sheet, "backdrop_tap");
    }
}
