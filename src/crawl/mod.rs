//! The incremental crawl-and-extract core.
//!
//! `coordinator` drives one run: reveal cards (`reveal`), walk them in
//! document order, decide per card (`state`), and visit qualifying cards'
//! detail views (`detail`). The office directory uses its own bulk-snapshot
//! pipeline (`office`).

pub mod coordinator;
pub mod detail;
pub mod office;
pub mod reveal;
pub mod state;

pub use coordinator::ListingCrawler;
pub use office::OfficeCrawler;

use crate::renderer::{ElementHandle, Locator};
use std::time::Duration;
use tracing::debug;

/// Timing and budget knobs for one crawl run.
///
/// Defaults are the production values; tests shrink the waits. Budgets are
/// the only bounding mechanism a run has, so every loop below consults one.
#[derive(Debug, Clone)]
pub struct CrawlTuning {
    /// Timeout for the initial listing navigation and container wait.
    pub page_ready_timeout: Duration,
    /// Settle pause after activating the expand control.
    pub expand_settle: Duration,
    /// Settle pause after each scroll round.
    pub scroll_settle: Duration,
    /// Maximum scroll rounds before revealing stops regardless.
    pub max_scroll_rounds: usize,
    /// Minimum visible cards before the reveal predicate is evaluated.
    pub min_cards_for_predicate: usize,
    /// Bounded wait raced against the detail click.
    pub nav_race_timeout: Duration,
    /// Interval between URL-change polls after a detail click.
    pub url_poll_interval: Duration,
    /// Number of URL-change polls before the link counts as unresolved.
    pub url_poll_attempts: usize,
    /// Per-field wait on the detail view (phone anchor, view counter).
    pub field_wait: Duration,
    /// Wait for the listing container after navigating back.
    pub return_wait: Duration,
    /// Wait for the listing container after a full recovery reload.
    pub recovery_wait: Duration,
    /// Fixed wait after an office-card click before the URL is inspected.
    pub link_settle: Duration,
}

impl Default for CrawlTuning {
    fn default() -> Self {
        Self {
            page_ready_timeout: Duration::from_secs(60),
            expand_settle: Duration::from_secs(10),
            scroll_settle: Duration::from_secs(2),
            max_scroll_rounds: 30,
            min_cards_for_predicate: 10,
            nav_race_timeout: Duration::from_secs(5),
            url_poll_interval: Duration::from_millis(200),
            url_poll_attempts: 30,
            field_wait: Duration::from_secs(5),
            return_wait: Duration::from_secs(10),
            recovery_wait: Duration::from_secs(15),
            link_settle: Duration::from_secs(3),
        }
    }
}

/// Consecutive stale cards that close a tier.
pub const STALE_STREAK_LIMIT: u32 = 3;

/// Text of a card's first descendant matching the locator. Absence and
/// transient read failures both resolve to `None`; they never abort a card.
pub(crate) async fn child_text(card: &dyn ElementHandle, locator: &Locator) -> Option<String> {
    match card.query(locator).await {
        Ok(Some(element)) => match element.text().await {
            Ok(text) => text,
            Err(e) => {
                debug!("text read failed for {}: {e:#}", locator.as_css());
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            debug!("child query failed for {}: {e:#}", locator.as_css());
            None
        }
    }
}

/// Attribute of a card's first descendant matching the locator, with the
/// same absence semantics as [`child_text`].
pub(crate) async fn child_attr(
    card: &dyn ElementHandle,
    locator: &Locator,
    name: &str,
) -> Option<String> {
    match card.query(locator).await {
        Ok(Some(element)) => element.attribute(name).await.unwrap_or_default(),
        Ok(None) => None,
        Err(e) => {
            debug!("child query failed for {}: {e:#}", locator.as_css());
            None
        }
    }
}
