//! Interfaces the sheet needs from its host.
//!
//! The host owns the view tree, the modal presentation chrome, and the
//! animation clock. The sheet only sees these narrow traits. All methods take
//! `&self`; implementations are expected to use interior mutability.

use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use bsheet_core::Size;

/// Callback fired exactly once when a present or dismiss move resolves.
///
/// The argument is `true` when the move reached its target.
pub type Completion = Box<dyn FnOnce(bool)>;

static SHEET_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a sheet surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SheetId(u64);

impl SheetId {
    pub(crate) fn next() -> Self {
        Self(SHEET_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Rebuild an ID from a value previously returned by [`raw`](Self::raw).
    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw ID value.
    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// The view a sheet is laid out in.
pub trait ContainerView {
    /// Current size of the container.
    fn size(&self) -> Size;

    /// The sheet's view was added to this container.
    fn attach_sheet(&self, sheet: SheetId);

    /// The sheet's view was removed from this container.
    fn detach_sheet(&self, sheet: SheetId);
}

/// Content hosted inside a sheet.
pub trait ContentView {
    /// Natural height of the content when laid out at `available_width`.
    ///
    /// Used to resolve [`bsheet_core::TargetHeight::Automatic`].
    fn intrinsic_height(&self, available_width: f64) -> f64;
}

/// One present or dismiss transition run by the host.
pub trait TransitionContext {
    /// Container the transition animates in.
    fn container(&self) -> Rc<dyn ContainerView>;

    /// Report the end of the transition. Called exactly once per transition.
    fn complete_transition(&self, did_complete: bool);
}

/// The host's own modal dismissal entry point.
pub trait ModalHost {
    /// Start dismissing the presented sheet (animated).
    fn dismiss_presented(&self);
}
