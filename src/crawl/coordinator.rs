//! Listing crawl coordinator: the top-level state machine for one
//! property-section run.
//!
//! One ordered pass over the revealed cards: classify each, apply the
//! two-phase stop rule, and visit qualifying cards' detail views. Output
//! order equals visitation order; a card without a resolved detail link is
//! never emitted.

use super::detail::DetailExtractionSession;
use super::reveal::LoadMoreController;
use super::state::{CardDecision, CrawlState};
use super::{child_attr, child_text, CrawlTuning};
use crate::classify::{freshness, pin, PinState};
use crate::model::{CardSummary, CrawlOutcome, ListingRecord};
use crate::renderer::{ElementHandle, PageSession};
use crate::site::SiteProfile;
use anyhow::Result;
use chrono::NaiveDate;
use tracing::{debug, info, warn};

/// Crawls one property-listing section through a rendered page session.
pub struct ListingCrawler {
    profile: SiteProfile,
    cutoff: NaiveDate,
    tuning: CrawlTuning,
}

impl ListingCrawler {
    /// A crawler with production timing. The cutoff is fixed for the whole
    /// run so a long crawl judges every card against the same instant.
    pub fn new(profile: SiteProfile, cutoff: NaiveDate) -> Self {
        Self::with_tuning(profile, cutoff, CrawlTuning::default())
    }

    pub fn with_tuning(profile: SiteProfile, cutoff: NaiveDate, tuning: CrawlTuning) -> Self {
        Self {
            profile,
            cutoff,
            tuning,
        }
    }

    /// Run one crawl pass. Only the initial listing load can end the run
    /// early, and it does so with the `NoCards` outcome rather than an
    /// error; everything after that is contained per card.
    pub async fn crawl(&self, page: &mut dyn PageSession) -> Result<CrawlOutcome> {
        info!(
            "crawling {} ({}), cutoff {}",
            self.profile.name, self.profile.listing_url, self.cutoff
        );

        if let Err(e) = self.open_listing(&mut *page).await {
            warn!(
                "listing view for {} never became ready: {e:#}",
                self.profile.name
            );
            return Ok(CrawlOutcome::NoCards);
        }

        LoadMoreController::new(&*page, &self.profile, self.cutoff, &self.tuning)
            .reveal_until_sufficient()
            .await;

        let cards = page
            .query_all(&self.profile.card)
            .await
            .unwrap_or_default();
        if cards.is_empty() {
            info!("no cards found for {}", self.profile.name);
            return Ok(CrawlOutcome::NoCards);
        }
        info!("{} cards revealed for {}", cards.len(), self.profile.name);

        let mut state = CrawlState::new();
        let mut records: Vec<ListingRecord> = Vec::new();

        for (index, card) in cards.iter().enumerate() {
            let pin_text = child_text(card.as_ref(), &self.profile.pin_tag).await;
            let pin_state = pin::classify(pin_text.as_deref());

            let date_text = child_text(card.as_ref(), &self.profile.date)
                .await
                .unwrap_or_default();
            let freshness = freshness::classify(date_text.trim(), self.cutoff);

            debug!(
                "card {index}: {pin_state:?} {freshness:?} (date '{}')",
                date_text.trim()
            );

            if state.decide(pin_state, freshness) == CardDecision::Skip {
                if state.exhausted() {
                    debug!("both tiers closed at card {index}, ending the pass");
                    break;
                }
                continue;
            }

            // Cache the listing-view fields first; the handle dies once the
            // detail visit navigates.
            let summary = self.capture_summary(card.as_ref(), pin_state).await;

            let detail = DetailExtractionSession::new(&mut *page, &self.profile, &self.tuning)
                .extract(card.as_ref())
                .await;

            let Some(link) = detail.link else {
                warn!("card {index}: dropping record without a detail link");
                continue;
            };

            records.push(summary.into_record(link, detail.phone, detail.views));
        }

        info!(
            "collected {} records for {}",
            records.len(),
            self.profile.name
        );
        Ok(CrawlOutcome::Records(records))
    }

    async fn open_listing(&self, page: &mut dyn PageSession) -> Result<()> {
        page.navigate(&self.profile.listing_url, self.tuning.page_ready_timeout)
            .await?;
        page.wait_for(&self.profile.container, self.tuning.page_ready_timeout)
            .await
    }

    async fn capture_summary(&self, card: &dyn ElementHandle, pin_state: PinState) -> CardSummary {
        CardSummary {
            title: child_text(card, &self.profile.title).await,
            price: child_text(card, &self.profile.price).await,
            relative_date: child_text(card, &self.profile.date)
                .await
                .map(|s| s.trim().to_string()),
            description: child_text(card, &self.profile.description).await,
            image_url: child_attr(card, &self.profile.image, "src").await,
            pin_status: pin_state,
        }
    }
}
