//! Bulk listing-view extraction over a captured HTML snapshot.
//!
//! The office directory shows all of its per-card fields in the listing
//! view, so one HTML capture plus structured queries is much cheaper than
//! walking live element handles. Only the detail link still needs the live
//! page (see `crawl::office`).

use crate::renderer::Locator;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

/// Snapshot selectors for one card grid.
#[derive(Debug, Clone)]
pub struct SnapshotSelectors {
    pub card: Locator,
    pub image: Locator,
    pub title: Locator,
    pub description: Locator,
    pub ad_text: Locator,
}

/// Fields bulk-extracted for one card.
#[derive(Debug, Clone, Default)]
pub struct SnapshotCard {
    pub image: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub ad_text: Option<String>,
}

/// Extract every card from the captured HTML, in document order.
///
/// An unparsable selector yields no cards rather than an error; selectors
/// are frozen in the site profile and a bad one is a programming mistake
/// the logs will show immediately.
pub fn extract_cards(html: &str, selectors: &SnapshotSelectors) -> Vec<SnapshotCard> {
    let document = Html::parse_document(html);

    let Some(card_selector) = parse_selector(&selectors.card) else {
        return Vec::new();
    };

    document
        .select(&card_selector)
        .map(|card| SnapshotCard {
            image: select_attr(&card, &selectors.image, "src"),
            title: select_text(&card, &selectors.title),
            description: select_description(&card, &selectors.description),
            ad_text: select_text(&card, &selectors.ad_text),
        })
        .collect()
}

fn parse_selector(locator: &Locator) -> Option<Selector> {
    match Selector::parse(locator.as_css()) {
        Ok(selector) => Some(selector),
        Err(e) => {
            debug!("unparsable snapshot selector {}: {e}", locator.as_css());
            None
        }
    }
}

fn select_text(card: &ElementRef<'_>, locator: &Locator) -> Option<String> {
    let selector = parse_selector(locator)?;
    let element = card.select(&selector).next()?;
    let text = element.text().collect::<String>().trim().to_string();
    (!text.is_empty()).then_some(text)
}

fn select_attr(card: &ElementRef<'_>, locator: &Locator, name: &str) -> Option<String> {
    let selector = parse_selector(locator)?;
    card.select(&selector)
        .next()
        .and_then(|element| element.value().attr(name))
        .map(str::to_string)
}

/// The description is the second text-clamped block inside a card (the
/// first is the title); cards with a single block use that one.
fn select_description(card: &ElementRef<'_>, locator: &Locator) -> Option<String> {
    let selector = parse_selector(locator)?;
    let mut blocks = card.select(&selector);
    let first = blocks.next()?;
    let element = blocks.next().unwrap_or(first);
    let text = element.text().collect::<String>().trim().to_string();
    (!text.is_empty()).then_some(text)
}
