/// Page state definitions for tracking crawl progress
///
/// A URL moves `queued -> in_flight -> {saved | rejected}`. Unseen URLs have
/// no state at all; they only exist once discovered and enqueued.
use std::fmt;

/// Represents the current state of a URL in the crawl process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageState {
    // ===== Active States =====
    /// URL is waiting in the work queue
    Queued,

    /// URL has been claimed by a worker and is being processed
    InFlight,

    // ===== Terminal States =====
    /// Page was fetched, stored, and recorded in the graph
    Saved,

    /// Page was dropped permanently for this run
    Rejected,
}

impl PageState {
    /// Returns true if this is a terminal state (no further processing needed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Saved | Self::Rejected)
    }

    /// Returns true if this is an active state (page may still be processed)
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    /// Returns true if the transition `self -> next` is legal
    pub fn can_transition_to(&self, next: PageState) -> bool {
        matches!(
            (self, next),
            (Self::Queued, Self::InFlight)
                | (Self::InFlight, Self::Saved)
                | (Self::InFlight, Self::Rejected)
        )
    }

    /// Performs a checked transition
    pub fn transition(self, next: PageState) -> crate::Result<PageState> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(crate::SiteGraphError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::InFlight => "in_flight",
            Self::Saved => "saved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
