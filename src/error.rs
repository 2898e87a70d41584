//! Reasons an animation does not start.

use thiserror::Error;

/// Why [`Engine::try_start`](crate::Engine::try_start) declined to start a run.
///
/// Neither case is fatal. The animation is cosmetic, so
/// [`Engine::start`](crate::Engine::start) logs these and returns `None`.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AnimationError {
    /// The surface is absent or no longer attached
    #[error("rendering surface is not available")]
    SurfaceUnavailable,

    /// The surface's guard is already set
    #[error("an animation has already been started on this surface")]
    AlreadyStarted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            AnimationError::SurfaceUnavailable.to_string(),
            "rendering surface is not available"
        );
        assert!(AnimationError::AlreadyStarted.to_string().contains("already"));
    }
}
