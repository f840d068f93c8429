//! The draggable sheet panel and its drag/snap state machine.
//!
//! # Lifecycle
//!
//! ```text
//! Hidden ──present──▶ Presenting ──arrive──▶ Resting(i) ◀──snap── Dragging
//!                                              │    └──first delta──▶ │
//!                                              │                      │
//!                          dismiss / drag end in dismiss area         │
//!                                              ▼                      │
//!                      Hidden ◀──arrive── Dismissing ◀────────────────┘
//! ```
//!
//! # Invariants
//!
//! - At most one motion is in flight. Starting a motion cancels the previous
//!   one; a cancelled motion's completion fires with `false`.
//! - Every completion handed to [`SheetSurface::present`] or
//!   [`SheetSurface::dismiss`] fires at most once, and fires unless it was
//!   dropped by a coalesced dismissal whose in-flight move already carries
//!   one.
//! - `Resting(i)` always refers to a valid index of the resolved heights.
//! - Completions and observers run after the surface has committed its new
//!   state, so they may call back into the surface.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Out-of-range index | `present`/`snap_to` past the end | Clamped to the last index |
//! | Present while shown | `present` when not hidden | Completion fires `false`; no change |
//! | Re-entrant dismiss | `dismiss` while dismissing | [`DismissRequest::Coalesced`] |
//! | Detached observer | Observer dropped by its owner | Callback skipped |
//! | Container dropped | Host released the container early | Detach skipped |

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

use bsheet_core::{
    DismissTuning, DragDecision, DragOutcome, MotionConfig, Overdrag, Point, Rect,
    ResolvedHeights, SheetError, SheetPolicy, Size, TargetHeight, dim_progress,
    is_in_dismiss_area, nearest_index, relayout_index, resolve_drag_end,
};

use crate::LOG_TARGET;
use crate::host::{Completion, ContainerView, ContentView, SheetId};
use crate::motion::{Motion, MotionKind};
use crate::observer::{DismissObserver, ObserverSlot, PanObserver};

/// Where the sheet is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SheetPhase {
    /// Not shown; no container attached.
    #[default]
    Hidden,
    /// Animating in toward the start height.
    Presenting,
    /// At (or snapping to) the resolved height at this index.
    Resting(usize),
    /// Following an active drag.
    Dragging,
    /// Animating out; becomes `Hidden` on arrival.
    Dismissing,
}

impl SheetPhase {
    #[must_use]
    pub fn is_hidden(self) -> bool {
        matches!(self, Self::Hidden)
    }

    /// The rested index, when resting.
    #[must_use]
    pub fn rest_index(self) -> Option<usize> {
        match self {
            Self::Resting(index) => Some(index),
            _ => None,
        }
    }
}

/// Configuration for a [`SheetSurface`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SheetOptions {
    /// Whether a drag into the dismiss area dismisses the sheet.
    pub dismissible: bool,
    /// Whether the backdrop is hidden.
    pub dim_hidden: bool,
    pub dismiss: DismissTuning,
    pub overdrag: Overdrag,
    pub motion: MotionConfig,
}

impl Default for SheetOptions {
    fn default() -> Self {
        Self {
            dismissible: false,
            dim_hidden: true,
            dismiss: DismissTuning::default(),
            overdrag: Overdrag::default(),
            motion: MotionConfig::default(),
        }
    }
}

impl SheetOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn dismissible(mut self, dismissible: bool) -> Self {
        self.dismissible = dismissible;
        self
    }

    #[must_use]
    pub fn dim_hidden(mut self, hidden: bool) -> Self {
        self.dim_hidden = hidden;
        self
    }

    #[must_use]
    pub fn dismiss(mut self, tuning: DismissTuning) -> Self {
        self.dismiss = tuning;
        self
    }

    #[must_use]
    pub fn overdrag(mut self, overdrag: Overdrag) -> Self {
        self.overdrag = overdrag;
        self
    }

    #[must_use]
    pub fn motion(mut self, motion: MotionConfig) -> Self {
        self.motion = motion;
        self
    }

    /// Take dismiss tuning, overdrag and motion from a shared policy.
    #[must_use]
    pub fn policy(mut self, policy: SheetPolicy) -> Self {
        self.dismiss = policy.dismiss;
        self.overdrag = policy.overdrag;
        self.motion = policy.motion;
        self
    }
}

/// How a [`SheetSurface::dismiss`] call was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissRequest {
    /// A dismiss move started.
    Started,
    /// A dismiss move was already in flight; no second move was issued.
    Coalesced,
    /// The sheet was already hidden; the completion fired with `true`.
    AlreadyHidden,
}

#[derive(Debug, Clone, Copy)]
struct DragState {
    /// Offset before overdrag shaping.
    raw_offset: f64,
}

/// Work deferred until the surface is no longer borrowed.
enum Effect {
    Complete(Completion, bool),
    Pan(f64),
    DismissAreaReached,
    BackdropTapped,
    Attach(Rc<dyn ContainerView>),
    Detach(Rc<dyn ContainerView>),
}

struct SurfaceInner {
    id: SheetId,
    content: Rc<dyn ContentView>,
    targets: Vec<TargetHeight>,
    heights: ResolvedHeights,
    container: Option<Weak<dyn ContainerView>>,
    container_size: Size,
    phase: SheetPhase,
    offset: f64,
    rest_index: usize,
    drag: Option<DragState>,
    motion: Option<Motion>,
    options: SheetOptions,
    reduced_motion: bool,
    pan: ObserverSlot<dyn PanObserver>,
    dismiss_observer: ObserverSlot<dyn DismissObserver>,
}

impl SurfaceInner {
    fn frame(&self) -> Rect {
        Rect::bottom_anchored(self.container_size, self.offset)
    }

    fn start_motion(
        &mut self,
        kind: MotionKind,
        to: f64,
        completion: Option<Completion>,
        effects: &mut Vec<Effect>,
    ) {
        self.cancel_motion(effects);

        let config = self.options.motion.effective(self.reduced_motion);
        let (duration, easing) = match kind {
            MotionKind::Present { .. } => (config.present_duration, config.present_easing),
            MotionKind::Snap { .. } => (config.snap_duration, config.snap_easing),
            MotionKind::Dismiss => (config.dismiss_duration, config.dismiss_easing),
        };
        let motion = Motion::new(kind, self.offset, to, duration, easing, completion);
        tracing::debug!(
            target: LOG_TARGET,
            sheet = self.id.raw(),
            kind = ?kind,
            from = self.offset,
            to,
            duration_ms = duration.as_millis() as u64,
            "motion started"
        );

        if motion.is_finished() || (to - self.offset).abs() <= f64::EPSILON {
            self.arrive(motion, effects);
        } else {
            self.motion = Some(motion);
        }
    }

    fn cancel_motion(&mut self, effects: &mut Vec<Effect>) {
        if let Some(motion) = self.motion.take() {
            tracing::debug!(
                target: LOG_TARGET,
                sheet = self.id.raw(),
                kind = ?motion.kind,
                offset = self.offset,
                "motion cancelled"
            );
            if let Some(completion) = motion.completion {
                effects.push(Effect::Complete(completion, false));
            }
        }
    }

    fn arrive(&mut self, motion: Motion, effects: &mut Vec<Effect>) {
        self.offset = motion.target();
        match motion.kind {
            MotionKind::Present { index } | MotionKind::Snap { index } => {
                self.phase = SheetPhase::Resting(index);
                self.rest_index = index;
                tracing::debug!(
                    target: LOG_TARGET,
                    sheet = self.id.raw(),
                    index,
                    offset = self.offset,
                    "sheet at rest"
                );
            }
            MotionKind::Dismiss => {
                self.phase = SheetPhase::Hidden;
                self.offset = 0.0;
                self.drag = None;
                if let Some(container) = self.container.take().and_then(|weak| weak.upgrade()) {
                    effects.push(Effect::Detach(container));
                }
                tracing::debug!(target: LOG_TARGET, sheet = self.id.raw(), "sheet hidden");
            }
        }
        if let Some(completion) = motion.completion {
            effects.push(Effect::Complete(completion, true));
        }
    }

    fn settle_to(&mut self, index: usize, effects: &mut Vec<Effect>) {
        let index = self.heights.clamp_index(index);
        self.drag = None;
        self.phase = SheetPhase::Resting(index);
        self.rest_index = index;
        let target = self.heights.at_clamped(index);
        self.start_motion(MotionKind::Snap { index }, target, None, effects);
    }

    fn container_rc(&self) -> Option<Rc<dyn ContainerView>> {
        self.container.as_ref().and_then(Weak::upgrade)
    }
}

/// A draggable panel resting at one of several target heights.
///
/// `SheetSurface` is a cheap, cloneable handle; clones refer to the same
/// panel. It is single-threaded and never shared across threads.
///
/// Motion only advances when the host calls [`tick`](Self::tick). Drag input
/// arrives already decoded as vertical deltas ([`drag_changed`](Self::drag_changed))
/// and a release velocity ([`drag_ended`](Self::drag_ended)).
#[derive(Clone)]
pub struct SheetSurface {
    id: SheetId,
    inner: Rc<RefCell<SurfaceInner>>,
}

impl fmt::Debug for SheetSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("SheetSurface");
        s.field("id", &self.id);
        match self.inner.try_borrow() {
            Ok(inner) => s
                .field("phase", &inner.phase)
                .field("offset", &inner.offset)
                .field("heights", &inner.heights.as_slice())
                .field("motion", &inner.motion)
                .field("options", &inner.options)
                .finish(),
            Err(_) => s.finish_non_exhaustive(),
        }
    }
}

impl SheetSurface {
    /// Create a hidden surface bound to `content`.
    ///
    /// Heights are provisional until the surface is presented or laid out:
    /// automatic entries count as `0.0` until then.
    ///
    /// # Errors
    ///
    /// [`SheetError::EmptyTargetHeights`] when `targets` is empty.
    pub fn new(
        content: Rc<dyn ContentView>,
        targets: &[TargetHeight],
        options: SheetOptions,
    ) -> Result<Self, SheetError> {
        let heights = ResolvedHeights::new(targets.iter().map(|target| match target {
            TargetHeight::Fixed(value) => *value,
            TargetHeight::Automatic => 0.0,
        }))?;
        let id = SheetId::next();
        tracing::debug!(
            target: LOG_TARGET,
            sheet = id.raw(),
            targets = targets.len(),
            dismissible = options.dismissible,
            "sheet created"
        );
        let inner = SurfaceInner {
            id,
            content,
            targets: targets.to_vec(),
            heights,
            container: None,
            container_size: Size::ZERO,
            phase: SheetPhase::Hidden,
            offset: 0.0,
            rest_index: 0,
            drag: None,
            motion: None,
            options,
            reduced_motion: false,
            pan: ObserverSlot::empty(),
            dismiss_observer: ObserverSlot::empty(),
        };
        Ok(Self {
            id,
            inner: Rc::new(RefCell::new(inner)),
        })
    }

    #[must_use]
    pub fn id(&self) -> SheetId {
        self.id
    }

    // --- Lifecycle ---

    /// Attach to `container` and animate up to the height at `index`.
    ///
    /// Out-of-range indices clamp to the last valid index. `completion`
    /// fires with `true` on arrival, or with `false` if the surface was not
    /// hidden or the move is cancelled by a dismissal.
    pub fn present(
        &self,
        container: &Rc<dyn ContainerView>,
        index: usize,
        completion: impl FnOnce(bool) + 'static,
    ) {
        let completion: Completion = Box::new(completion);
        if !self.phase().is_hidden() {
            tracing::debug!(
                target: LOG_TARGET,
                sheet = self.id.raw(),
                phase = ?self.phase(),
                "present ignored; sheet already shown"
            );
            completion(false);
            return;
        }

        let size = container.size();
        let resolved = self.resolve_for(size);
        self.update(|inner, effects| {
            if let Some(heights) = resolved {
                inner.heights = heights;
            }
            inner.container = Some(Rc::downgrade(container));
            inner.container_size = size;

            let clamped = inner.heights.clamp_index(index);
            if clamped != index {
                tracing::debug!(
                    target: LOG_TARGET,
                    sheet = inner.id.raw(),
                    requested = index,
                    index = clamped,
                    "present index clamped"
                );
            }
            inner.rest_index = clamped;
            inner.offset = 0.0;
            inner.drag = None;
            inner.phase = SheetPhase::Presenting;
            effects.push(Effect::Attach(Rc::clone(container)));

            let target = inner.heights.at_clamped(clamped);
            inner.start_motion(
                MotionKind::Present { index: clamped },
                target,
                Some(completion),
                effects,
            );
        });
    }

    /// Animate fully off-screen and detach.
    ///
    /// Cancels any drag or in-flight motion. While a dismissal is already
    /// running this coalesces into it: the running move adopts `completion`
    /// if it has none, otherwise `completion` is dropped unused.
    pub fn dismiss(&self, completion: impl FnOnce(bool) + 'static) -> DismissRequest {
        self.dismiss_with(Box::new(completion), false)
    }

    /// Like [`dismiss`](Self::dismiss), but a coalesced `completion` is
    /// chained after the running move's own completion instead of dropped.
    pub(crate) fn dismiss_joining(&self, completion: Completion) -> DismissRequest {
        self.dismiss_with(completion, true)
    }

    fn dismiss_with(&self, completion: Completion, join: bool) -> DismissRequest {
        self.update(move |inner, effects| match inner.phase {
            SheetPhase::Hidden => {
                effects.push(Effect::Complete(completion, true));
                DismissRequest::AlreadyHidden
            }
            SheetPhase::Dismissing => {
                match inner.motion.as_mut() {
                    Some(motion) => {
                        motion.completion = match motion.completion.take() {
                            None => Some(completion),
                            Some(existing) if join => Some(Box::new(move |did_complete| {
                                existing(did_complete);
                                completion(did_complete);
                            })),
                            Some(existing) => Some(existing),
                        };
                    }
                    None => effects.push(Effect::Complete(completion, true)),
                }
                tracing::debug!(
                    target: LOG_TARGET,
                    sheet = inner.id.raw(),
                    join,
                    "dismiss coalesced"
                );
                DismissRequest::Coalesced
            }
            SheetPhase::Presenting | SheetPhase::Resting(_) | SheetPhase::Dragging => {
                inner.drag = None;
                inner.phase = SheetPhase::Dismissing;
                inner.start_motion(MotionKind::Dismiss, 0.0, Some(completion), effects);
                DismissRequest::Started
            }
        })
    }

    /// Re-resolve heights against the attached container's current size.
    pub fn reset(&self) {
        let (container, fallback) = {
            let inner = self.inner.borrow();
            (inner.container_rc(), inner.container_size)
        };
        let size = container.map_or(fallback, |container| container.size());
        self.relayout(size);
    }

    /// Re-resolve heights against `size` and re-snap.
    ///
    /// A resting or dragging sheet moves, without animation, to the new
    /// height nearest its previous rested height. Never starts a dismissal.
    pub fn relayout(&self, size: Size) {
        let Some(heights) = self.resolve_for(size) else {
            return;
        };
        self.update(|inner, effects| {
            inner.container_size = size;
            match inner.phase {
                SheetPhase::Hidden | SheetPhase::Dismissing => {
                    inner.heights = heights;
                }
                SheetPhase::Presenting => {
                    inner.heights = heights;
                    inner.rest_index = inner.heights.clamp_index(inner.rest_index);
                    let target = inner.heights.at_clamped(inner.rest_index);
                    if let Some(motion) = inner.motion.as_mut() {
                        motion.retarget(target);
                    }
                }
                SheetPhase::Resting(_) | SheetPhase::Dragging => {
                    let previous = inner.heights.at_clamped(inner.rest_index);
                    let index = relayout_index(previous, inner.rest_index, &heights);
                    inner.heights = heights;
                    inner.cancel_motion(effects);
                    inner.drag = None;
                    inner.phase = SheetPhase::Resting(index);
                    inner.rest_index = index;
                    inner.offset = inner.heights.at_clamped(index);
                    tracing::debug!(
                        target: LOG_TARGET,
                        sheet = inner.id.raw(),
                        previous,
                        index,
                        offset = inner.offset,
                        "sheet re-snapped after relayout"
                    );
                }
            }
        });
    }

    /// Animate to the height at `index` (clamped).
    ///
    /// Only acts while resting or dragging; returns the index snapped to.
    pub fn snap_to(&self, index: usize) -> Option<usize> {
        self.update(|inner, effects| match inner.phase {
            SheetPhase::Resting(_) | SheetPhase::Dragging => {
                inner.settle_to(index, effects);
                Some(inner.rest_index)
            }
            _ => None,
        })
    }

    /// Advance the in-flight motion by `delta`.
    ///
    /// Returns whether a motion is still in flight afterwards.
    pub fn tick(&self, delta: Duration) -> bool {
        self.update(|inner, effects| {
            let Some(mut motion) = inner.motion.take() else {
                return;
            };
            let finished = motion.advance(delta);
            inner.offset = motion.value();
            if finished {
                inner.arrive(motion, effects);
            } else {
                inner.motion = Some(motion);
            }
        });
        self.is_animating()
    }

    // --- Interaction ---

    /// Apply a vertical drag delta (positive = finger moved down).
    ///
    /// The first delta while resting enters `Dragging`, cancelling any snap
    /// motion at its current position. Deltas in other phases are ignored.
    pub fn drag_changed(&self, delta_y: f64) {
        if !delta_y.is_finite() {
            return;
        }
        self.update(|inner, effects| {
            match inner.phase {
                SheetPhase::Resting(_) => {
                    inner.cancel_motion(effects);
                    inner.drag = Some(DragState {
                        raw_offset: inner.offset,
                    });
                    inner.phase = SheetPhase::Dragging;
                    tracing::trace!(
                        target: LOG_TARGET,
                        sheet = inner.id.raw(),
                        offset = inner.offset,
                        "drag began"
                    );
                }
                SheetPhase::Dragging => {}
                _ => return,
            }
            let Some(drag) = inner.drag.as_mut() else {
                return;
            };
            drag.raw_offset -= delta_y;
            let raw = drag.raw_offset;
            inner.offset = inner.options.overdrag.apply(
                raw,
                inner.heights.largest(),
                inner.container_size.height,
            );
            tracing::trace!(
                target: LOG_TARGET,
                sheet = inner.id.raw(),
                raw,
                offset = inner.offset,
                "drag moved"
            );
            effects.push(Effect::Pan(inner.offset));
        });
    }

    /// End the drag with a release `velocity` (units/s, positive = down).
    ///
    /// Returns the decision taken, or `None` when no drag was active.
    pub fn drag_ended(&self, velocity: f64) -> Option<DragDecision> {
        let velocity = if velocity.is_finite() { velocity } else { 0.0 };
        self.update(|inner, effects| {
            if inner.phase != SheetPhase::Dragging {
                return None;
            }
            inner.drag = None;
            let decision = resolve_drag_end(
                inner.offset,
                velocity,
                inner.rest_index,
                &inner.heights,
                inner.options.dismiss,
                inner.options.dismissible,
            );
            match decision.outcome {
                DragOutcome::Dismiss(cause) => {
                    tracing::debug!(
                        target: LOG_TARGET,
                        sheet = inner.id.raw(),
                        offset = inner.offset,
                        velocity,
                        cause = ?cause,
                        "dismiss area reached"
                    );
                    inner.phase = SheetPhase::Dismissing;
                    inner.start_motion(MotionKind::Dismiss, 0.0, None, effects);
                    effects.push(Effect::DismissAreaReached);
                }
                DragOutcome::Snap { index, reason } => {
                    tracing::debug!(
                        target: LOG_TARGET,
                        sheet = inner.id.raw(),
                        offset = inner.offset,
                        velocity,
                        index,
                        reason = ?reason,
                        "drag snapped"
                    );
                    inner.settle_to(index, effects);
                }
            }
            Some(decision)
        })
    }

    /// The gesture was cancelled: snap to the nearest height, never dismiss.
    pub fn cancel_drag(&self) -> Option<usize> {
        self.update(|inner, effects| {
            if inner.phase != SheetPhase::Dragging {
                return None;
            }
            let index = nearest_index(inner.offset, &inner.heights, inner.rest_index);
            inner.settle_to(index, effects);
            Some(index)
        })
    }

    /// Report a tap at `point` in container coordinates.
    ///
    /// A tap outside the panel while presenting or resting notifies the
    /// dismiss observer, independent of [`SheetOptions::dismissible`].
    /// Returns whether the tap was reported.
    pub fn handle_tap(&self, point: Point) -> bool {
        self.update(|inner, effects| {
            let shown = matches!(inner.phase, SheetPhase::Presenting | SheetPhase::Resting(_));
            if !shown || inner.frame().contains(point) {
                return false;
            }
            tracing::debug!(
                target: LOG_TARGET,
                sheet = inner.id.raw(),
                x = point.x,
                y = point.y,
                "backdrop tapped"
            );
            effects.push(Effect::BackdropTapped);
            true
        })
    }

    // --- Configuration ---

    pub fn set_pan_observer(&self, observer: Option<Weak<dyn PanObserver>>) {
        self.inner.borrow_mut().pan.set(observer);
    }

    pub fn set_dismiss_observer(&self, observer: Option<Weak<dyn DismissObserver>>) {
        self.inner.borrow_mut().dismiss_observer.set(observer);
    }

    pub fn set_dismissible(&self, dismissible: bool) {
        self.inner.borrow_mut().options.dismissible = dismissible;
    }

    pub fn set_dim_hidden(&self, hidden: bool) {
        self.inner.borrow_mut().options.dim_hidden = hidden;
    }

    /// Host reduced-motion preference; applies to motions started afterwards.
    pub fn set_reduced_motion(&self, reduced: bool) {
        self.inner.borrow_mut().reduced_motion = reduced;
    }

    // --- Queries ---

    #[must_use]
    pub fn phase(&self) -> SheetPhase {
        self.inner.borrow().phase
    }

    /// Current visible extent above the container's bottom edge.
    #[must_use]
    pub fn offset(&self) -> f64 {
        self.inner.borrow().offset
    }

    /// Index of the last rested (or snap target) height.
    #[must_use]
    pub fn rest_index(&self) -> usize {
        self.inner.borrow().rest_index
    }

    /// Panel rectangle in container coordinates.
    #[must_use]
    pub fn frame(&self) -> Rect {
        self.inner.borrow().frame()
    }

    /// Backdrop opacity in `[0.0, 1.0]`.
    #[must_use]
    pub fn dim_opacity(&self) -> f64 {
        let inner = self.inner.borrow();
        if inner.options.dim_hidden || inner.phase.is_hidden() {
            0.0
        } else {
            dim_progress(inner.offset, &inner.heights)
        }
    }

    #[must_use]
    pub fn resolved_heights(&self) -> ResolvedHeights {
        self.inner.borrow().heights.clone()
    }

    #[must_use]
    pub fn container_size(&self) -> Size {
        self.inner.borrow().container_size
    }

    #[must_use]
    pub fn is_dismissible(&self) -> bool {
        self.inner.borrow().options.dismissible
    }

    #[must_use]
    pub fn is_dim_hidden(&self) -> bool {
        self.inner.borrow().options.dim_hidden
    }

    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.inner.borrow().motion.is_some()
    }

    /// Whether the live drag offset lies past the dismiss offset threshold.
    #[must_use]
    pub fn is_in_dismiss_area(&self) -> bool {
        let inner = self.inner.borrow();
        inner.phase == SheetPhase::Dragging
            && is_in_dismiss_area(inner.offset, 0.0, &inner.heights, inner.options.dismiss)
    }

    // --- Internals ---

    /// Resolve the configured targets for `size`, querying content outside
    /// any borrow.
    fn resolve_for(&self, size: Size) -> Option<ResolvedHeights> {
        let (content, targets) = {
            let inner = self.inner.borrow();
            (Rc::clone(&inner.content), inner.targets.clone())
        };
        match ResolvedHeights::resolve(&targets, size, |width| content.intrinsic_height(width)) {
            Ok(heights) => Some(heights),
            Err(err) => {
                tracing::warn!(
                    target: LOG_TARGET,
                    sheet = self.id.raw(),
                    error = %err,
                    "height resolution failed"
                );
                None
            }
        }
    }

    fn update<R>(&self, f: impl FnOnce(&mut SurfaceInner, &mut Vec<Effect>) -> R) -> R {
        let mut effects = Vec::new();
        let result = {
            let mut inner = self.inner.borrow_mut();
            f(&mut inner, &mut effects)
        };
        self.dispatch(effects);
        result
    }

    fn dispatch(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Complete(completion, did_complete) => completion(did_complete),
                Effect::Pan(offset) => {
                    let observer = self.inner.borrow().pan.get();
                    if let Some(observer) = observer {
                        observer.on_pan(self.id, offset);
                    }
                }
                Effect::DismissAreaReached => {
                    let observer = self.inner.borrow().dismiss_observer.get();
                    if let Some(observer) = observer {
                        observer.on_dismiss_area_reached(self.id);
                    }
                }
                Effect::BackdropTapped => {
                    let observer = self.inner.borrow().dismiss_observer.get();
                    if let Some(observer) = observer {
                        observer.on_backdrop_tapped(self.id);
                    }
                }
                Effect::Attach(container) => container.attach_sheet(self.id),
                Effect::Detach(container) => container.detach_sheet(self.id),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::cell::Cell;

    struct Container {
        size: Cell<Size>,
        attached: Cell<usize>,
        detached: Cell<usize>,
    }

    impl Container {
        fn new(width: f64, height: f64) -> Rc<Self> {
            Rc::new(Self {
                size: Cell::new(Size::new(width, height)),
                attached: Cell::new(0),
                detached: Cell::new(0),
            })
        }
    }

    impl ContainerView for Container {
        fn size(&self) -> Size {
            self.size.get()
        }
        fn attach_sheet(&self, _sheet: SheetId) {
            self.attached.set(self.attached.get() + 1);
        }
        fn detach_sheet(&self, _sheet: SheetId) {
            self.detached.set(self.detached.get() + 1);
        }
    }

    struct Content(f64);

    impl ContentView for Content {
        fn intrinsic_height(&self, _available_width: f64) -> f64 {
            self.0
        }
    }

    #[derive(Default)]
    struct Observer {
        pans: RefCell<Vec<f64>>,
        dismiss_area: Cell<usize>,
        taps: Cell<usize>,
    }

    impl PanObserver for Observer {
        fn on_pan(&self, _sheet: SheetId, offset: f64) {
            self.pans.borrow_mut().push(offset);
        }
    }

    impl DismissObserver for Observer {
        fn on_dismiss_area_reached(&self, _sheet: SheetId) {
            self.dismiss_area.set(self.dismiss_area.get() + 1);
        }
        fn on_backdrop_tapped(&self, _sheet: SheetId) {
            self.taps.set(self.taps.get() + 1);
        }
    }

    fn fixed(values: &[f64]) -> Vec<TargetHeight> {
        values.iter().copied().map(TargetHeight::Fixed).collect()
    }

    fn instant() -> SheetOptions {
        SheetOptions::new().motion(MotionConfig::none())
    }

    fn surface(values: &[f64], options: SheetOptions) -> SheetSurface {
        SheetSurface::new(Rc::new(Content(300.0)), &fixed(values), options)
            .expect("non-empty heights")
    }

    fn completions() -> (Rc<RefCell<Vec<bool>>>, impl Fn() -> Box<dyn FnOnce(bool)>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let make = move || {
            let sink = Rc::clone(&sink);
            Box::new(move |ok: bool| sink.borrow_mut().push(ok)) as Box<dyn FnOnce(bool)>
        };
        (log, make)
    }

    fn shown(values: &[f64], index: usize, options: SheetOptions) -> (SheetSurface, Rc<Container>) {
        let container = Container::new(400.0, 800.0);
        let view: Rc<dyn ContainerView> = container.clone();
        let sheet = surface(values, options);
        sheet.present(&view, index, |_| {});
        (sheet, container)
    }

    #[test]
    fn empty_targets_are_rejected() {
        let err = SheetSurface::new(Rc::new(Content(1.0)), &[], SheetOptions::default())
            .expect_err("empty heights must fail");
        assert_eq!(err, SheetError::EmptyTargetHeights);
    }

    #[test]
    fn defaults_for_direct_attachment() {
        let options = SheetOptions::default();
        assert!(!options.dismissible);
        assert!(options.dim_hidden);
    }

    #[test]
    fn instant_present_rests_and_completes() {
        let container = Container::new(400.0, 800.0);
        let view: Rc<dyn ContainerView> = container.clone();
        let sheet = surface(&[200.0, 500.0], instant());
        let (log, make) = completions();

        sheet.present(&view, 1, make());

        assert_eq!(sheet.phase(), SheetPhase::Resting(1));
        assert_eq!(sheet.offset(), 500.0);
        assert_eq!(*log.borrow(), vec![true]);
        assert_eq!(container.attached.get(), 1);
        assert!(!sheet.is_animating());
    }

    #[test]
    fn animated_present_completes_after_ticks() {
        let container = Container::new(400.0, 800.0);
        let view: Rc<dyn ContainerView> = container.clone();
        let sheet = surface(&[200.0, 500.0], SheetOptions::default());
        let (log, make) = completions();

        sheet.present(&view, 0, make());
        assert_eq!(sheet.phase(), SheetPhase::Presenting);
        assert!(log.borrow().is_empty());

        assert!(sheet.tick(Duration::from_millis(100)));
        assert!(sheet.offset() > 0.0 && sheet.offset() < 200.0);
        assert!(!sheet.tick(Duration::from_millis(500)));

        assert_eq!(sheet.phase(), SheetPhase::Resting(0));
        assert_eq!(sheet.offset(), 200.0);
        assert_eq!(*log.borrow(), vec![true]);
    }

    #[test]
    fn present_clamps_index() {
        let (sheet, _container) = shown(&[100.0, 200.0, 300.0], 99, instant());
        assert_eq!(sheet.phase(), SheetPhase::Resting(2));
        assert_eq!(sheet.offset(), 300.0);
    }

    #[test]
    fn present_twice_fails_second() {
        let (sheet, container) = shown(&[100.0], 0, instant());
        let view: Rc<dyn ContainerView> = container.clone();
        let (log, make) = completions();
        sheet.present(&view, 0, make());
        assert_eq!(*log.borrow(), vec![false]);
        assert_eq!(container.attached.get(), 1);
    }

    #[test]
    fn automatic_height_resolves_on_present() {
        let container = Container::new(400.0, 800.0);
        let view: Rc<dyn ContainerView> = container.clone();
        let sheet = SheetSurface::new(
            Rc::new(Content(300.0)),
            &[TargetHeight::AUTOMATIC, TargetHeight::Fixed(600.0)],
            instant(),
        )
        .expect("non-empty heights");
        sheet.present(&view, 0, |_| {});
        assert_eq!(sheet.offset(), 300.0);
        assert_eq!(sheet.resolved_heights().as_slice(), &[300.0, 600.0]);
    }

    #[test]
    fn drag_reports_pan_and_snaps_back() {
        let (sheet, _container) = shown(&[100.0, 500.0], 1, instant());
        let observer = Rc::new(Observer::default());
        let pan = Rc::downgrade(&observer) as Weak<dyn PanObserver>;
        sheet.set_pan_observer(Some(pan));

        sheet.drag_changed(50.0);
        sheet.drag_changed(30.0);
        assert_eq!(sheet.phase(), SheetPhase::Dragging);
        assert_eq!(*observer.pans.borrow(), vec![450.0, 420.0]);

        let decision = sheet.drag_ended(0.0).expect("drag was active");
        assert_eq!(decision.snap_index(), Some(1));
        assert_eq!(sheet.phase(), SheetPhase::Resting(1));
        assert_eq!(sheet.offset(), 500.0);
    }

    #[test]
    fn drag_clamps_at_largest() {
        let (sheet, _container) = shown(&[100.0, 500.0], 1, instant());
        sheet.drag_changed(-200.0);
        assert_eq!(sheet.offset(), 500.0);
    }

    #[test]
    fn non_dismissible_drag_snaps_to_nearest() {
        let (sheet, container) = shown(&[100.0, 500.0], 1, instant());
        sheet.drag_changed(480.0);
        let decision = sheet.drag_ended(5000.0).expect("drag was active");
        assert!(!decision.is_dismiss());
        assert_eq!(sheet.phase(), SheetPhase::Resting(0));
        assert_eq!(container.detached.get(), 0);
    }

    #[test]
    fn dismissible_drag_dismisses_and_notifies_once() {
        let (sheet, container) = shown(&[100.0, 500.0], 1, instant().dismissible(true));
        let observer = Rc::new(Observer::default());
        let weak = Rc::downgrade(&observer) as Weak<dyn DismissObserver>;
        sheet.set_dismiss_observer(Some(weak));

        sheet.drag_changed(460.0);
        let decision = sheet.drag_ended(2000.0).expect("drag was active");

        assert!(decision.is_dismiss());
        assert_eq!(sheet.phase(), SheetPhase::Hidden);
        assert_eq!(observer.dismiss_area.get(), 1);
        assert_eq!(container.detached.get(), 1);
    }

    #[test]
    fn drag_ignored_unless_resting() {
        let container = Container::new(400.0, 800.0);
        let view: Rc<dyn ContainerView> = container.clone();
        let sheet = surface(&[200.0], SheetOptions::default());
        sheet.drag_changed(10.0);
        assert_eq!(sheet.phase(), SheetPhase::Hidden);
        sheet.present(&view, 0, |_| {});
        sheet.drag_changed(10.0);
        assert_eq!(sheet.phase(), SheetPhase::Presenting);
        assert!(sheet.drag_ended(0.0).is_none());
    }

    #[test]
    fn new_drag_cancels_snap_motion() {
        let (sheet, _container) = shown(&[100.0, 500.0], 1, instant());
        sheet.set_dismissible(false);
        sheet.inner.borrow_mut().options.motion = MotionConfig::default();

        sheet.drag_changed(100.0);
        sheet.drag_ended(0.0);
        assert!(sheet.is_animating());
        sheet.tick(Duration::from_millis(50));
        let mid = sheet.offset();
        assert!(mid > 400.0 && mid < 500.0);

        sheet.drag_changed(10.0);
        assert!(!sheet.is_animating());
        assert_eq!(sheet.phase(), SheetPhase::Dragging);
        assert!((sheet.offset() - (mid - 10.0)).abs() < 1e-9);
    }

    #[test]
    fn dismiss_twice_completes_once() {
        let options = SheetOptions::default()
            .motion(MotionConfig::default().present_duration(Duration::ZERO));
        let (sheet, container) = shown(&[300.0], 0, options);
        let (log, make) = completions();

        assert_eq!(sheet.dismiss(make()), DismissRequest::Started);
        assert_eq!(sheet.dismiss(make()), DismissRequest::Coalesced);
        sheet.tick(Duration::from_secs(1));

        assert_eq!(*log.borrow(), vec![true]);
        assert_eq!(sheet.phase(), SheetPhase::Hidden);
        assert_eq!(container.detached.get(), 1);
    }

    #[test]
    fn dismiss_when_hidden_completes_immediately() {
        let sheet = surface(&[300.0], instant());
        let (log, make) = completions();
        assert_eq!(sheet.dismiss(make()), DismissRequest::AlreadyHidden);
        assert_eq!(*log.borrow(), vec![true]);
    }

    #[test]
    fn dismiss_during_present_fails_present_first() {
        let container = Container::new(400.0, 800.0);
        let view: Rc<dyn ContainerView> = container.clone();
        let sheet = surface(&[300.0], SheetOptions::default());
        let order = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&order);
        sheet.present(&view, 0, move |ok| sink.borrow_mut().push(("present", ok)));
        sheet.tick(Duration::from_millis(50));
        let sink = Rc::clone(&order);
        sheet.dismiss(move |ok| sink.borrow_mut().push(("dismiss", ok)));
        sheet.tick(Duration::from_secs(1));

        assert_eq!(*order.borrow(), vec![("present", false), ("dismiss", true)]);
    }

    #[test]
    fn drag_dismiss_adopts_later_completion() {
        let (sheet, _container) = shown(&[100.0, 500.0], 1, instant().dismissible(true));
        sheet.inner.borrow_mut().options.motion = MotionConfig::default();
        sheet.drag_changed(460.0);
        sheet.drag_ended(2000.0);
        assert_eq!(sheet.phase(), SheetPhase::Dismissing);

        let (log, make) = completions();
        assert_eq!(sheet.dismiss(make()), DismissRequest::Coalesced);
        sheet.tick(Duration::from_secs(1));
        assert_eq!(*log.borrow(), vec![true]);
    }

    #[test]
    fn relayout_keeps_nearest_rest() {
        let container = Container::new(400.0, 800.0);
        let view: Rc<dyn ContainerView> = container.clone();
        let sheet = SheetSurface::new(
            Rc::new(Content(300.0)),
            &fixed(&[200.0, 450.0, 700.0]),
            instant(),
        )
        .expect("non-empty heights");
        sheet.present(&view, 1, |_| {});

        container.size.set(Size::new(800.0, 500.0));
        sheet.reset();

        assert_eq!(sheet.resolved_heights().as_slice(), &[200.0, 450.0, 500.0]);
        assert_eq!(sheet.phase(), SheetPhase::Resting(1));
        assert_eq!(sheet.offset(), 450.0);
    }

    #[test]
    fn backdrop_tap_reports_outside_panel_only() {
        let (sheet, _container) = shown(&[300.0], 0, instant());
        let observer = Rc::new(Observer::default());
        let weak = Rc::downgrade(&observer) as Weak<dyn DismissObserver>;
        sheet.set_dismiss_observer(Some(weak));

        assert!(!sheet.handle_tap(Point::new(10.0, 700.0)));
        assert!(sheet.handle_tap(Point::new(10.0, 100.0)));
        assert_eq!(observer.taps.get(), 1);
    }

    #[test]
    fn dim_opacity_tracks_offset() {
        let (sheet, _container) = shown(&[100.0, 500.0], 1, instant().dim_hidden(false));
        assert_eq!(sheet.dim_opacity(), 1.0);
        sheet.drag_changed(200.0);
        assert!((sheet.dim_opacity() - 0.5).abs() < 1e-9);
        sheet.set_dim_hidden(true);
        assert_eq!(sheet.dim_opacity(), 0.0);
    }

    #[test]
    fn reentrant_dismiss_from_observer_is_tolerated() {
        struct Reenter {
            sheet: RefCell<Option<SheetSurface>>,
            results: RefCell<Vec<DismissRequest>>,
        }
        impl DismissObserver for Reenter {
            fn on_dismiss_area_reached(&self, _sheet: SheetId) {
                let sheet = self.sheet.borrow().clone();
                if let Some(sheet) = sheet {
                    let first = sheet.dismiss(|_| {});
                    let second = sheet.dismiss(|_| {});
                    self.results.borrow_mut().extend([first, second]);
                }
            }
            fn on_backdrop_tapped(&self, _sheet: SheetId) {}
        }

        let (sheet, _container) = shown(&[100.0, 500.0], 1, instant().dismissible(true));
        sheet.inner.borrow_mut().options.motion = MotionConfig::default();
        let observer = Rc::new(Reenter {
            sheet: RefCell::new(Some(sheet.clone())),
            results: RefCell::new(Vec::new()),
        });
        let weak = Rc::downgrade(&observer) as Weak<dyn DismissObserver>;
        sheet.set_dismiss_observer(Some(weak));

        sheet.drag_changed(460.0);
        sheet.drag_ended(5000.0);

        assert_eq!(
            *observer.results.borrow(),
            vec![DismissRequest::Coalesced, DismissRequest::Coalesced]
        );
    }

    proptest! {
        #[test]
        fn present_index_clamps_to_boundary(
            values in prop::collection::vec(0.0f64..800.0, 1..6),
            index in 0usize..20,
        ) {
            let (sheet, _container) = shown(&values, index, instant());
            let expected = index.min(values.len() - 1);
            prop_assert_eq!(sheet.phase(), SheetPhase::Resting(expected));
        }
    }
}
