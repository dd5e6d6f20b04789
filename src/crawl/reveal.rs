//! Load-more controller: reveal enough cards for the coordinator to reach
//! its two-phase stop condition, without reloading indefinitely.
//!
//! Best effort throughout: a missing expand control, a failed scroll or an
//! unreadable card never aborts the crawl. The scroll budget is the hard
//! bound.

use super::{child_text, CrawlTuning, STALE_STREAK_LIMIT};
use crate::classify::{freshness, pin, Freshness, PinState};
use crate::renderer::{ElementHandle, PageSession};
use crate::site::SiteProfile;
use anyhow::Result;
use chrono::NaiveDate;
use tracing::{debug, info};

/// Drives incremental reveal of cards (expand + scroll) for one listing.
pub struct LoadMoreController<'a> {
    page: &'a dyn PageSession,
    profile: &'a SiteProfile,
    cutoff: NaiveDate,
    tuning: &'a CrawlTuning,
}

impl<'a> LoadMoreController<'a> {
    pub fn new(
        page: &'a dyn PageSession,
        profile: &'a SiteProfile,
        cutoff: NaiveDate,
        tuning: &'a CrawlTuning,
    ) -> Self {
        Self {
            page,
            profile,
            cutoff,
            tuning,
        }
    }

    /// Reveal cards until the staleness predicate is satisfied or the
    /// scroll budget runs out. The caller re-queries cards afterward.
    pub async fn reveal_until_sufficient(&self) {
        self.expand_once().await;

        for round in 0..self.tuning.max_scroll_rounds {
            if let Err(e) = self.page.scroll_to_bottom().await {
                debug!("scroll failed on round {round}: {e:#}");
            }
            tokio::time::sleep(self.tuning.scroll_settle).await;

            let cards = match self.page.query_all(&self.profile.card).await {
                Ok(cards) => cards,
                Err(e) => {
                    debug!("card query failed on round {round}: {e:#}");
                    continue;
                }
            };

            if cards.len() < self.tuning.min_cards_for_predicate {
                debug!(
                    "only {} cards visible after round {round}, continuing",
                    cards.len()
                );
                continue;
            }

            if self.enough_stale_revealed(&cards).await {
                info!(
                    "reveal predicate satisfied after {} scroll rounds ({} cards)",
                    round + 1,
                    cards.len()
                );
                return;
            }
        }

        info!("scroll budget exhausted, proceeding with visible cards");
    }

    /// One-time expand step: if the expand control is present and enabled,
    /// activate it and give lazily-mounted content time to settle. Any
    /// failure counts as "no expand available".
    async fn expand_once(&self) {
        match self.try_expand().await {
            Ok(true) => {
                debug!("expand control activated");
                tokio::time::sleep(self.tuning.expand_settle).await;
            }
            Ok(false) => {}
            Err(e) => debug!("expand control unavailable: {e:#}"),
        }
    }

    async fn try_expand(&self) -> Result<bool> {
        let buttons = self.page.query_all(&self.profile.expand_button).await?;
        let Some(button) = buttons.into_iter().next() else {
            return Ok(false);
        };
        if button.attribute("disabled").await?.is_some() {
            return Ok(false);
        }
        button.click(false).await?;
        Ok(true)
    }

    /// The stopping predicate: scanning visible cards in document order,
    /// track a stale streak inside the pinned prefix (reset by a fresh
    /// pinned card) and a stale streak after it (reset by a fresh unpinned
    /// card). Enough is revealed once both streaks reach the tier limit.
    async fn enough_stale_revealed(&self, cards: &[Box<dyn ElementHandle>]) -> bool {
        let mut pinned_streak = 0u32;
        let mut unpinned_streak = 0u32;
        let mut in_pinned_prefix = true;

        for card in cards {
            let pin_text = child_text(card.as_ref(), &self.profile.pin_tag).await;
            let pin_state = pin::classify(pin_text.as_deref());
            if pin_state == PinState::Unpinned {
                in_pinned_prefix = false;
            }

            let date_text = child_text(card.as_ref(), &self.profile.date)
                .await
                .unwrap_or_default();
            let stale = freshness::classify(&date_text, self.cutoff) == Freshness::Stale;

            match (pin_state, in_pinned_prefix) {
                (PinState::Pinned, true) => {
                    pinned_streak = if stale { pinned_streak + 1 } else { 0 };
                }
                (PinState::Unpinned, false) => {
                    unpinned_streak = if stale { unpinned_streak + 1 } else { 0 };
                }
                // A pinned card past the prefix does not affect either streak.
                _ => {}
            }

            if pinned_streak >= STALE_STREAK_LIMIT && unpinned_streak >= STALE_STREAK_LIMIT {
                return true;
            }
        }

        false
    }
}
