//! Navigation state
//!
//! [`ActiveNavigationState`] is the only mutable state a router shares
//! between overlapping navigations. It records which navigation was
//! initiated last and which route was committed last. Each
//! [`Router`](crate::Router) owns its own instance, so independent routers
//! never observe each other's sequence numbers.

use crate::matching::MatchedRoute;
use crate::ViewRef;
use thiserror::Error;

/// A commit attempted by a navigation that is no longer the latest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("navigation #{sequence} was superseded by #{latest}")]
pub struct Superseded {
    /// Sequence number of the stale navigation
    pub sequence: u64,
    /// Sequence number of the latest initiated navigation
    pub latest: u64,
}

/// Phase of a single navigation.
///
/// ```text
/// Idle → Matching → Guarding → Loading → Committed
///           │          │  ↺        │
///           ▼          ├→ Aborted  ├→ Aborted (load failure)
///        NotFound      └→ Cancelled└→ Cancelled
/// ```
///
/// `Guarding` loops back to `Matching` on a redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavigationPhase {
    /// Not started
    Idle,
    /// Resolving the path against the route table
    Matching,
    /// Running the guard chain
    Guarding,
    /// Resolving the view
    Loading,
    /// New route is active
    Committed,
    /// Superseded by a newer navigation
    Cancelled,
    /// Rejected by a guard or by a load failure
    Aborted,
    /// No route matched
    NotFound,
}

impl NavigationPhase {
    /// `true` for phases a navigation never leaves.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Committed | Self::Cancelled | Self::Aborted | Self::NotFound
        )
    }
}

/// Most recently initiated sequence number plus the committed route and view.
#[derive(Debug, Default)]
pub struct ActiveNavigationState {
    latest_initiated: u64,
    committed: Option<(MatchedRoute, ViewRef)>,
}

impl ActiveNavigationState {
    /// Create an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new navigation and return its sequence number.
    ///
    /// Any navigation holding an older number is now stale.
    pub fn begin(&mut self) -> u64 {
        self.latest_initiated += 1;
        self.latest_initiated
    }

    /// Sequence number of the most recently initiated navigation.
    pub fn latest_initiated(&self) -> u64 {
        self.latest_initiated
    }

    /// Check if a navigation is still current (not superseded).
    pub fn is_current(&self, sequence: u64) -> bool {
        self.latest_initiated == sequence
    }

    /// Most recently committed route.
    pub fn committed_route(&self) -> Option<&MatchedRoute> {
        self.committed.as_ref().map(|(route, _)| route)
    }

    /// View of the most recently committed route.
    pub fn committed_view(&self) -> Option<&ViewRef> {
        self.committed.as_ref().map(|(_, view)| view)
    }

    /// Replace the committed route if `sequence` is still current.
    ///
    /// Returns the previously committed route. Nothing changes when the
    /// navigation was superseded.
    pub fn commit(
        &mut self,
        sequence: u64,
        route: MatchedRoute,
        view: ViewRef,
    ) -> Result<Option<MatchedRoute>, Superseded> {
        if !self.is_current(sequence) {
            return Err(Superseded {
                sequence,
                latest: self.latest_initiated,
            });
        }
        let previous = self.committed.replace((route, view));
        Ok(previous.map(|(route, _)| route))
    }
}
