//! Per-run crawl state: the two-phase (pinned then unpinned) stop rule.
//!
//! The site orders promoted cards before regular ones. Within each tier the
//! policy is "keep taking fresh cards; three stale in a row closes the
//! tier". The two counters and phase flags live here so the rule is
//! testable without a browser.

use super::STALE_STREAK_LIMIT;
use crate::classify::{Freshness, PinState};

/// What the coordinator should do with one classified card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardDecision {
    /// Visit the detail view and emit a record.
    Collect,
    /// Pass over the card without collecting.
    Skip,
}

/// Mutable counters for one run. Mutated only through [`CrawlState::decide`];
/// reset only at run start (construction).
#[derive(Debug, Default)]
pub struct CrawlState {
    pinned_phase_closed: bool,
    unpinned_phase_closed: bool,
    consecutive_stale_pinned: u32,
    consecutive_stale_unpinned: u32,
}

impl CrawlState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide one card, in document order.
    ///
    /// Pinned cards are considered only while the pinned phase is open;
    /// unpinned cards only once it has closed and their own phase is still
    /// open. The stale card that completes a streak of three closes its
    /// phase and is itself dropped. Every other combination is skipped
    /// without touching the counters.
    pub fn decide(&mut self, pin: PinState, freshness: Freshness) -> CardDecision {
        match pin {
            PinState::Pinned if !self.pinned_phase_closed => {
                if freshness == Freshness::Stale {
                    self.consecutive_stale_pinned += 1;
                } else {
                    self.consecutive_stale_pinned = 0;
                }
                if self.consecutive_stale_pinned >= STALE_STREAK_LIMIT {
                    self.pinned_phase_closed = true;
                    return CardDecision::Skip;
                }
                if freshness == Freshness::Stale {
                    CardDecision::Skip
                } else {
                    CardDecision::Collect
                }
            }
            PinState::Unpinned if self.pinned_phase_closed && !self.unpinned_phase_closed => {
                if freshness == Freshness::Stale {
                    self.consecutive_stale_unpinned += 1;
                } else {
                    self.consecutive_stale_unpinned = 0;
                }
                if self.consecutive_stale_unpinned >= STALE_STREAK_LIMIT {
                    self.unpinned_phase_closed = true;
                    return CardDecision::Skip;
                }
                if freshness == Freshness::Stale {
                    CardDecision::Skip
                } else {
                    CardDecision::Collect
                }
            }
            _ => CardDecision::Skip,
        }
    }

    pub fn pinned_phase_closed(&self) -> bool {
        self.pinned_phase_closed
    }

    pub fn unpinned_phase_closed(&self) -> bool {
        self.unpinned_phase_closed
    }

    /// Both tiers closed: nothing further can be collected.
    pub fn exhausted(&self) -> bool {
        self.pinned_phase_closed && self.unpinned_phase_closed
    }
}
