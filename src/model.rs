//! Crawl output types.

use crate::classify::PinState;
use serde::{Deserialize, Serialize};

/// One exported listing. Immutable once appended to a crawl's output.
///
/// `link` is the only mandatory field: a card whose detail visit cannot
/// resolve a permanent link never becomes a record. Field names follow the
/// export format the downstream consumers already read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingRecord {
    pub title: Option<String>,
    pub price: Option<String>,
    pub relative_date: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub link: String,
    pub mobile_number: Option<String>,
    pub views_number: Option<String>,
    pub pin_status: PinState,
}

/// Listing-view fields cached from a live card before its detail visit.
///
/// Captured eagerly because element handles die on navigation.
#[derive(Debug, Clone)]
pub struct CardSummary {
    pub title: Option<String>,
    pub price: Option<String>,
    pub relative_date: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub pin_status: PinState,
}

impl CardSummary {
    /// Merge with the detail-view fields into a final record.
    pub fn into_record(
        self,
        link: String,
        mobile_number: Option<String>,
        views_number: Option<String>,
    ) -> ListingRecord {
        ListingRecord {
            title: self.title,
            price: self.price,
            relative_date: self.relative_date,
            description: self.description,
            image_url: self.image_url,
            link,
            mobile_number,
            views_number,
            pin_status: self.pin_status,
        }
    }
}

/// Fields recovered from one card's detail view. All optional; an
/// unresolved visit yields all `None`.
#[derive(Debug, Clone, Default)]
pub struct DetailFields {
    pub link: Option<String>,
    pub phone: Option<String>,
    pub views: Option<String>,
}

impl DetailFields {
    /// The all-unresolved result a recovered visit reports.
    pub fn unresolved() -> Self {
        Self::default()
    }
}

/// Terminal result of one crawl run.
#[derive(Debug)]
pub enum CrawlOutcome {
    /// Records in visitation order. May be empty when cards were visible
    /// but none qualified.
    Records(Vec<ListingRecord>),
    /// The listing never produced any cards (or never loaded).
    NoCards,
}
