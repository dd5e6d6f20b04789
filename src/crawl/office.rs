//! Office-directory crawl: the bulk-snapshot pipeline.
//!
//! Unlike the property sections, every office card's summary fields are in
//! the listing view, so one HTML capture and a structured-query pass covers
//! them. Only the detail link needs the live page: each card is clicked by
//! index, the URL checked after a fixed wait, and the listing re-navigated
//! to restore position. The phone number is the link's last path segment
//! with the country prefix.

use super::CrawlTuning;
use crate::model::{CrawlOutcome, ListingRecord};
use crate::classify::PinState;
use crate::renderer::{Locator, PageSession};
use crate::site::OfficeProfile;
use crate::snapshot::{self, SnapshotSelectors};
use anyhow::Result;
use regex::Regex;
use tracing::{debug, info, warn};

/// Scroll rounds before the height-stability loop gives up. The directory
/// is short; this is a safety bound, not an expected exit.
const MAX_HEIGHT_ROUNDS: usize = 30;

/// Crawls the office directory through a rendered page session.
pub struct OfficeCrawler {
    profile: OfficeProfile,
    tuning: CrawlTuning,
    base: Option<url::Url>,
    phone_segment: Regex,
}

impl OfficeCrawler {
    pub fn new(profile: OfficeProfile) -> Self {
        Self::with_tuning(profile, CrawlTuning::default())
    }

    pub fn with_tuning(profile: OfficeProfile, tuning: CrawlTuning) -> Self {
        let base = url::Url::parse(&profile.base_url).ok();
        Self {
            profile,
            tuning,
            base,
            // Infallible: the pattern is a literal.
            phone_segment: Regex::new(r"/([^/]+)$").unwrap(),
        }
    }

    /// Run one directory pass. As with the listing crawler, only the
    /// initial load can end the run, and it ends it with `NoCards`.
    pub async fn crawl(&self, page: &mut dyn PageSession) -> Result<CrawlOutcome> {
        info!(
            "crawling {} ({})",
            self.profile.name, self.profile.listing_url
        );

        if let Err(e) = self.open_listing(&mut *page).await {
            warn!(
                "office directory {} never became ready: {e:#}",
                self.profile.name
            );
            return Ok(CrawlOutcome::NoCards);
        }

        self.scroll_until_stable(&*page).await;

        let html = page.content().await.unwrap_or_default();
        let summaries = snapshot::extract_cards(&html, &self.snapshot_selectors());
        if summaries.is_empty() {
            info!("no cards found for {}", self.profile.name);
            return Ok(CrawlOutcome::NoCards);
        }
        info!(
            "{} office cards in snapshot for {}",
            summaries.len(),
            self.profile.name
        );

        let mut records = Vec::new();
        for (index, summary) in summaries.into_iter().enumerate() {
            let Some(link) = self.resolve_link(&mut *page, index).await else {
                info!("office card {index}: no detail link, skipping");
                continue;
            };
            let link = self.absolutize(&link);
            let mobile_number = self.phone_from_link(&link);

            records.push(ListingRecord {
                title: summary.title,
                price: summary.ad_text,
                relative_date: None,
                description: summary.description,
                image_url: summary.image,
                link,
                mobile_number,
                views_number: None,
                pin_status: PinState::Unpinned,
            });
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

    /// Scroll until the document height stops growing (bounded).
    async fn scroll_until_stable(&self, page: &dyn PageSession) {
        let mut last_height = self.page_height(page).await;
        for _ in 0..MAX_HEIGHT_ROUNDS {
            if let Err(e) = page.scroll_to_bottom().await {
                debug!("scroll failed: {e:#}");
                return;
            }
            tokio::time::sleep(self.tuning.scroll_settle).await;
            let height = self.page_height(page).await;
            if height == last_height {
                return;
            }
            last_height = height;
        }
    }

    async fn page_height(&self, page: &dyn PageSession) -> u64 {
        page.evaluate("document.body.scrollHeight")
            .await
            .ok()
            .and_then(|v| v.as_u64())
            .unwrap_or(0)
    }

    /// Resolve one card's detail link by index: click, wait, compare URLs,
    /// and re-navigate to the listing to restore position. Failures restore
    /// the listing and yield no link.
    async fn resolve_link(&self, page: &mut dyn PageSession, index: usize) -> Option<String> {
        match self.try_resolve(&mut *page, index).await {
            Ok(link) => link,
            Err(e) => {
                warn!("office card {index}: link resolution failed: {e:#}");
                self.restore(page).await;
                None
            }
        }
    }

    async fn try_resolve(
        &self,
        page: &mut dyn PageSession,
        index: usize,
    ) -> Result<Option<String>> {
        let cards = page.query_all(&self.profile.card).await?;
        let Some(card) = cards.get(index) else {
            warn!(
                "office card {index} out of range ({} live cards)",
                cards.len()
            );
            return Ok(None);
        };

        card.scroll_into_view().await?;
        card.wait_visible(self.tuning.field_wait).await?;
        let before = page.current_url().await?;
        card.click(false).await?;
        tokio::time::sleep(self.tuning.link_settle).await;
        let after = page.current_url().await?;

        // Some cards open a dialog instead of navigating; the dialog's
        // first anchor carries the same link.
        let link = if after != before {
            Some(after)
        } else {
            self.dialog_link(&*page).await
        };

        // Either way, return to the listing before the next card.
        self.restore(&mut *page).await;
        Ok(link)
    }

    async fn dialog_link(&self, page: &dyn PageSession) -> Option<String> {
        let dialogs = page.query_all(&self.profile.dialog).await.ok()?;
        let dialog = dialogs.into_iter().next()?;
        let anchor = dialog
            .query(&Locator::css("a[href]"))
            .await
            .ok()
            .flatten()?;
        anchor.attribute("href").await.ok().flatten()
    }

    async fn restore(&self, page: &mut dyn PageSession) {
        if let Err(e) = page
            .navigate(&self.profile.listing_url, self.tuning.page_ready_timeout)
            .await
        {
            warn!("failed to restore office directory: {e:#}");
            return;
        }
        if let Err(e) = page
            .wait_for(&self.profile.container, self.tuning.recovery_wait)
            .await
        {
            warn!("office container missing after restore: {e:#}");
        }
    }

    fn snapshot_selectors(&self) -> SnapshotSelectors {
        SnapshotSelectors {
            card: self.profile.card.clone(),
            image: self.profile.image.clone(),
            title: self.profile.title.clone(),
            description: self.profile.description.clone(),
            ad_text: self.profile.ad_text.clone(),
        }
    }

    /// Resolve a detail link against the section base URL. Relative and
    /// protocol-relative links both resolve; an unjoinable link passes
    /// through unchanged.
    fn absolutize(&self, link: &str) -> String {
        match &self.base {
            Some(base) => base
                .join(link)
                .map(|u| u.to_string())
                .unwrap_or_else(|_| link.to_string()),
            None => link.to_string(),
        }
    }

    /// The detail link's last path segment is the office's phone number.
    fn phone_from_link(&self, link: &str) -> Option<String> {
        let digits = self
            .phone_segment
            .captures(link)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())?;
        Some(format!("{}{digits}", self.profile.phone_prefix))
    }
}
