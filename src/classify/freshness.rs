//! Freshness classification of a card's displayed date text.
//!
//! Cards show either an absolute `YYYY-MM-DD` date or a relative-time phrase
//! in the site's locale. Absolute dates compare against the run cutoff. A
//! relative phrase counts as fresh only when it names a recent unit (hour,
//! minute, second); coarser phrases ("days ago", "weeks ago") and anything
//! unrecognized classify stale. Preferring to stop over over-collecting is
//! deliberate product policy, carried over from the site's observed behavior.

use chrono::{Duration, Local, NaiveDate};

/// Date format the site uses for absolute card dates.
const ABSOLUTE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Relative-time tokens that mark a card as recent: hour, minute, second.
const RECENT_UNIT_TOKENS: [&str; 3] = ["ساعة", "دقيقة", "ثانية"];

/// How a card's age compares to the run cutoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Fresh,
    Stale,
}

/// Classify a card's date text against the cutoff date.
///
/// Total over all inputs: malformed or empty text classifies `Stale`.
pub fn classify(date_text: &str, cutoff: NaiveDate) -> Freshness {
    let text = date_text.trim();

    if let Ok(date) = NaiveDate::parse_from_str(text, ABSOLUTE_DATE_FORMAT) {
        return if date < cutoff {
            Freshness::Stale
        } else {
            Freshness::Fresh
        };
    }

    if RECENT_UNIT_TOKENS.iter().any(|token| text.contains(token)) {
        Freshness::Fresh
    } else {
        Freshness::Stale
    }
}

/// The run cutoff: yesterday's local date, computed once per run so that a
/// long crawl judges every card against the same instant.
pub fn cutoff_yesterday() -> NaiveDate {
    (Local::now() - Duration::days(1)).date_naive()
}
