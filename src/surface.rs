//! The [`Surface`] trait and the per-surface [`AnimationGuard`].

use crate::segment::SegmentKind;
use anyhow::Result;
use std::cell::Cell;
use std::fmt;

/// Identifier of a styled text run on a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RunId(pub u64);

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run#{}", self.0)
    }
}

/// Marks whether an animation has ever been started on a surface.
///
/// Each surface owns exactly one guard. Once set it stays set for the
/// lifetime of the surface.
#[derive(Debug, Default)]
pub struct AnimationGuard {
    started: Cell<bool>,
}

impl AnimationGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_set(&self) -> bool {
        self.started.get()
    }

    /// Set the guard. Returns `false` if it was already set.
    pub fn try_set(&self) -> bool {
        !self.started.replace(true)
    }
}

/// A rendering target for the typing animation.
///
/// Implement this trait to animate onto a new kind of output. The engine only
/// ever holds one open run at a time and never touches a run after closing it;
/// implementations should reject writes to closed runs with an error.
///
/// All methods take `&self`: surfaces are shared between the caller and the
/// scheduled steps of a run, so implementations use interior mutability.
pub trait Surface {
    /// The guard that makes starting an animation on this surface idempotent.
    fn guard(&self) -> &AnimationGuard;

    /// Whether the surface can still be rendered to.
    ///
    /// A surface that reports `false` mid-run causes the run to be abandoned.
    fn is_attached(&self) -> bool {
        true
    }

    /// Remove any existing content.
    fn clear(&self) -> Result<()>;

    /// Open a new run styled for `kind`.
    fn open_run(&self, kind: SegmentKind) -> Result<RunId>;

    /// Append one character to an open run.
    fn append_char(&self, run: RunId, ch: char) -> Result<()>;

    /// Close a run. No further characters may be appended to it.
    fn close_run(&self, run: RunId) -> Result<()>;

    /// Insert a hard line break after the current content.
    fn insert_line_break(&self) -> Result<()>;
}
