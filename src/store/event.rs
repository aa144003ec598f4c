//! Notifications published by the state store

use crate::state::ApplicationState;
use std::time::Duration;

/// UI instruction that accompanies a transition.
///
/// Hints are advisory: the store never waits for them, and they carry no
/// ordering guarantee relative to later mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostTransitionHint {
    /// Scroll the viewport to the top once the new view has rendered.
    ScrollToTop {
        /// Delay to let the view re-render first
        delay: Duration,
    },
}

impl PostTransitionHint {
    /// How long the view should wait before acting on the hint.
    #[must_use]
    pub const fn delay(self) -> Duration {
        match self {
            Self::ScrollToTop { delay } => delay,
        }
    }
}

/// Event delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// A mutation was applied; carries the resulting state.
    StateChanged(ApplicationState),
    /// A transition asked the view to do something after re-rendering.
    Hint(PostTransitionHint),
}
