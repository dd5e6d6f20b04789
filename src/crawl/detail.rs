//! Detail extraction session: the click → wait → extract → return protocol
//! for one card.
//!
//! This is the single-attempt-with-recovery variant: one click, a bounded
//! URL-change poll, and on any hard failure a full reload of the listing
//! view so the coordinator can always continue with the next card. Field
//! reads on the detail view are independent of each other; a missing phone
//! anchor or view counter is "no data", not an error.

use super::CrawlTuning;
use crate::model::DetailFields;
use crate::renderer::{ElementHandle, PageSession};
use crate::site::SiteProfile;
use anyhow::Result;
use tracing::{debug, warn};

/// Scheme prefix of the phone-contact anchor's href.
const TEL_SCHEME: &str = "tel:";

/// One card's detail visit against an already-positioned listing page.
pub struct DetailExtractionSession<'a> {
    page: &'a mut dyn PageSession,
    profile: &'a SiteProfile,
    tuning: &'a CrawlTuning,
}

impl<'a> DetailExtractionSession<'a> {
    pub fn new(
        page: &'a mut dyn PageSession,
        profile: &'a SiteProfile,
        tuning: &'a CrawlTuning,
    ) -> Self {
        Self {
            page,
            profile,
            tuning,
        }
    }

    /// Visit the card's detail view and return its fields.
    ///
    /// Never fails: an unresolved link or a wedged navigation ends in a
    /// full recovery reload and an all-`None` result.
    pub async fn extract(&mut self, card: &dyn ElementHandle) -> DetailFields {
        match self.try_extract(card).await {
            Ok(fields) => fields,
            Err(e) => {
                warn!("detail visit failed: {e:#}; recovering listing view");
                self.recover().await;
                DetailFields::unresolved()
            }
        }
    }

    async fn try_extract(&mut self, card: &dyn ElementHandle) -> Result<DetailFields> {
        card.scroll_into_view().await?;
        let before = self.page.current_url().await?;

        // The site sometimes updates in place instead of navigating; a
        // missed navigation event here is expected and ignored.
        let _ = self
            .page
            .wait_for_navigation(self.tuning.nav_race_timeout)
            .await;
        card.click(true).await?;

        let Some(link) = self.poll_url_change(&before).await? else {
            // The listing may be in an unknown state after the click; a
            // full reload restores a known position.
            debug!("URL never left {before}; detail link unresolved");
            self.recover().await;
            return Ok(DetailFields::unresolved());
        };

        let phone = self.read_phone().await;
        let views = self.read_views().await;

        self.page.go_back().await?;
        self.page
            .wait_for(&self.profile.container, self.tuning.return_wait)
            .await?;

        Ok(DetailFields {
            link: Some(link),
            phone,
            views,
        })
    }

    /// Poll the current URL against its pre-click value. Resolves to the
    /// new URL, or `None` when the poll budget runs out.
    async fn poll_url_change(&self, before: &str) -> Result<Option<String>> {
        for _ in 0..self.tuning.url_poll_attempts {
            let now = self.page.current_url().await?;
            if now != before {
                return Ok(Some(now));
            }
            tokio::time::sleep(self.tuning.url_poll_interval).await;
        }
        Ok(None)
    }

    /// Phone number from the tel: contact anchor. Absence is "no phone".
    async fn read_phone(&self) -> Option<String> {
        if let Err(e) = self
            .page
            .wait_for(&self.profile.phone_anchor, self.tuning.field_wait)
            .await
        {
            debug!("no phone anchor on detail view: {e:#}");
            return None;
        }
        let anchors = self.page.query_all(&self.profile.phone_anchor).await.ok()?;
        let anchor = anchors.into_iter().next()?;
        let href = anchor.attribute("href").await.ok()??;
        href.strip_prefix(TEL_SCHEME).map(str::to_string)
    }

    /// View count from the detail view's counter. Absence is "no count".
    async fn read_views(&self) -> Option<String> {
        if let Err(e) = self
            .page
            .wait_for(&self.profile.views_counter, self.tuning.field_wait)
            .await
        {
            debug!("no view counter on detail view: {e:#}");
            return None;
        }
        let counters = self
            .page
            .query_all(&self.profile.views_counter)
            .await
            .ok()?;
        let counter = counters.into_iter().next()?;
        counter.text().await.ok()?
    }

    /// Full recovery: reload the listing URL from scratch and wait for its
    /// defining container. Failures here are logged, not propagated; the
    /// next card's reads will fail soft and classify stale.
    async fn recover(&mut self) {
        if let Err(e) = self
            .page
            .navigate(&self.profile.listing_url, self.tuning.page_ready_timeout)
            .await
        {
            warn!("failed to reload listing view: {e:#}");
            return;
        }
        if let Err(e) = self
            .page
            .wait_for(&self.profile.container, self.tuning.recovery_wait)
            .await
        {
            warn!("listing container missing after recovery: {e:#}");
        }
    }
}
