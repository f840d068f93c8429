//! Fake host collaborators.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;

use bsheet_core::Size;
use bsheet_widgets::{
    ContainerView, ContentView, ModalHost, SheetId, SheetSurface, SheetTransitioningDelegate,
    TransitionContext, TransitionCoordinator,
};

/// A container whose size tests can change.
#[derive(Debug)]
pub struct TestContainer {
    size: Cell<Size>,
    attached: RefCell<Vec<SheetId>>,
    detached: RefCell<Vec<SheetId>>,
}

impl TestContainer {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Rc<Self> {
        Rc::new(Self {
            size: Cell::new(Size::new(width, height)),
            attached: RefCell::new(Vec::new()),
            detached: RefCell::new(Vec::new()),
        })
    }

    pub fn set_size(&self, size: Size) {
        self.size.set(size);
    }

    #[must_use]
    pub fn attached(&self) -> Vec<SheetId> {
        self.attached.borrow().clone()
    }

    #[must_use]
    pub fn detached(&self) -> Vec<SheetId> {
        self.detached.borrow().clone()
    }

    /// Attached and not yet detached.
    #[must_use]
    pub fn hosts(&self, sheet: SheetId) -> bool {
        let attached = self.attached.borrow().iter().filter(|id| **id == sheet).count();
        let detached = self.detached.borrow().iter().filter(|id| **id == sheet).count();
        attached > detached
    }

    #[must_use]
    pub fn as_view(self: &Rc<Self>) -> Rc<dyn ContainerView> {
        Rc::clone(self) as Rc<dyn ContainerView>
    }
}

impl ContainerView for TestContainer {
    fn size(&self) -> Size {
        self.size.get()
    }

    fn attach_sheet(&self, sheet: SheetId) {
        self.attached.borrow_mut().push(sheet);
    }

    fn detach_sheet(&self, sheet: SheetId) {
        self.detached.borrow_mut().push(sheet);
    }
}

/// Content with a fixed intrinsic height that records each query width.
#[derive(Debug)]
pub struct FixedContent {
    height: f64,
    queries: RefCell<Vec<f64>>,
}

impl FixedContent {
    #[must_use]
    pub fn new(height: f64) -> Rc<Self> {
        Rc::new(Self {
            height,
            queries: RefCell::new(Vec::new()),
        })
    }

    /// Widths passed to [`ContentView::intrinsic_height`], in order.
    #[must_use]
    pub fn queries(&self) -> Vec<f64> {
        self.queries.borrow().clone()
    }

    #[must_use]
    pub fn as_view(self: &Rc<Self>) -> Rc<dyn ContentView> {
        Rc::clone(self) as Rc<dyn ContentView>
    }
}

impl ContentView for FixedContent {
    fn intrinsic_height(&self, available_width: f64) -> f64 {
        self.queries.borrow_mut().push(available_width);
        self.height
    }
}

/// A transition context that records how it was completed.
#[derive(Debug)]
pub struct RecordingContext {
    container: Rc<TestContainer>,
    completions: RefCell<Vec<bool>>,
}

impl RecordingContext {
    #[must_use]
    pub fn new(container: Rc<TestContainer>) -> Rc<Self> {
        Rc::new(Self {
            container,
            completions: RefCell::new(Vec::new()),
        })
    }

    #[must_use]
    pub fn completions(&self) -> Vec<bool> {
        self.completions.borrow().clone()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.completions.borrow().is_empty()
    }
}

impl TransitionContext for RecordingContext {
    fn container(&self) -> Rc<dyn ContainerView> {
        self.container.as_view()
    }

    fn complete_transition(&self, did_complete: bool) {
        self.completions.borrow_mut().push(did_complete);
    }
}

/// A modal host that presents through a [`SheetTransitioningDelegate`].
///
/// Present runs the delegate's presentation animator; dismissal (requested by
/// the test or by the sheet) runs the interactive dismissal controller. A
/// second dismissal request while one is running is ignored, as a real host
/// would.
#[derive(Debug)]
pub struct FakeModalHost {
    this: Weak<Self>,
    delegate: SheetTransitioningDelegate,
    container: Rc<TestContainer>,
    coordinator: RefCell<Option<Rc<TransitionCoordinator>>>,
    present_context: RefCell<Option<Rc<RecordingContext>>>,
    dismiss_context: RefCell<Option<Rc<RecordingContext>>>,
    dismiss_requests: Cell<usize>,
}

impl FakeModalHost {
    #[must_use]
    pub fn new(delegate: SheetTransitioningDelegate, container: Rc<TestContainer>) -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            this: this.clone(),
            delegate,
            container,
            coordinator: RefCell::new(None),
            present_context: RefCell::new(None),
            dismiss_context: RefCell::new(None),
            dismiss_requests: Cell::new(0),
        })
    }

    #[must_use]
    pub fn delegate(&self) -> &SheetTransitioningDelegate {
        &self.delegate
    }

    #[must_use]
    pub fn container(&self) -> Rc<TestContainer> {
        Rc::clone(&self.container)
    }

    /// The coordinator of the current modal session.
    #[must_use]
    pub fn coordinator(&self) -> Option<Rc<TransitionCoordinator>> {
        self.coordinator.borrow().clone()
    }

    #[must_use]
    pub fn surface(&self) -> Option<SheetSurface> {
        self.coordinator().and_then(|coordinator| coordinator.surface())
    }

    /// Number of [`ModalHost::dismiss_presented`] calls received.
    #[must_use]
    pub fn dismiss_requests(&self) -> usize {
        self.dismiss_requests.get()
    }

    #[must_use]
    pub fn present_context(&self) -> Option<Rc<RecordingContext>> {
        self.present_context.borrow().clone()
    }

    #[must_use]
    pub fn dismiss_context(&self) -> Option<Rc<RecordingContext>> {
        self.dismiss_context.borrow().clone()
    }

    /// Start a modal presentation of `content`.
    pub fn present(&self, content: Option<Rc<dyn ContentView>>) -> Rc<RecordingContext> {
        let host: Weak<dyn ModalHost> = self.this.clone();
        let coordinator = self.delegate.presentation_coordinator(content, host);
        *self.coordinator.borrow_mut() = Some(coordinator);
        *self.dismiss_context.borrow_mut() = None;

        let context = RecordingContext::new(self.container());
        *self.present_context.borrow_mut() = Some(Rc::clone(&context));
        if let Some(animator) = self.delegate.animator_for_presented() {
            tracing::trace!("host presenting");
            animator.animate_transition(Rc::clone(&context) as Rc<dyn TransitionContext>);
        }
        context
    }

    /// Start the dismiss transition, unless one is already running.
    pub fn dismiss(&self) -> Option<Rc<RecordingContext>> {
        if self.dismiss_context.borrow().is_some() {
            return None;
        }
        let context = RecordingContext::new(self.container());
        *self.dismiss_context.borrow_mut() = Some(Rc::clone(&context));

        let animator = self.delegate.animator_for_dismissed();
        let controller = self.delegate.interactive_controller_for_dismissal();
        if let (Some(_), Some(controller)) = (animator, controller) {
            tracing::trace!("host dismissing");
            let context = Rc::clone(&context) as Rc<dyn TransitionContext>;
            controller.start_interactive_transition(context);
        } else {
            context.complete_transition(false);
        }
        Some(context)
    }

    /// Report a new container size to the live coordinator.
    pub fn resize(&self, size: Size) {
        self.container.set_size(size);
        if let Some(coordinator) = self.coordinator() {
            coordinator.on_size_change(size);
        }
    }

    /// Advance one frame; returns whether a motion is still in flight.
    pub fn tick(&self, delta: Duration) -> bool {
        let animating = self
            .coordinator()
            .is_some_and(|coordinator| coordinator.tick(delta));
        self.release_if_dismissed();
        animating
    }

    /// Tick until idle; returns the number of frames.
    pub fn run_until_idle(&self, step: Duration, max_frames: usize) -> usize {
        let mut frames = 0;
        while frames < max_frames && self.tick(step) {
            frames += 1;
        }
        self.release_if_dismissed();
        frames
    }

    fn release_if_dismissed(&self) {
        let done = self
            .dismiss_context
            .borrow()
            .as_ref()
            .is_some_and(|context| context.is_complete());
        if done {
            *self.coordinator.borrow_mut() = None;
        }
    }
}

impl ModalHost for FakeModalHost {
    fn dismiss_presented(&self) {
        self.dismiss_requests.set(self.dismiss_requests.get() + 1);
        let _ = self.dismiss();
    }
}
