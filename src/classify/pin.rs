//! Pin-state classification from a card's promoted-tag indicator.

use serde::{Deserialize, Serialize};

/// Marker token the site renders inside the promoted tag.
const FEATURED_MARKER: &str = "مميز";

/// Whether a card sits in the promoted (pinned) tier.
///
/// Serialized names match the export format downstream consumers expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PinState {
    #[serde(rename = "Pinned")]
    Pinned,
    #[serde(rename = "Not pinned")]
    Unpinned,
}

/// Classify the pin-indicator text. `None` means the indicator element was
/// absent. Only an indicator whose text contains the featured marker counts
/// as pinned; everything else (missing element, empty or unrelated text)
/// is unpinned.
pub fn classify(indicator_text: Option<&str>) -> PinState {
    match indicator_text {
        Some(text) if text.contains(FEATURED_MARKER) => PinState::Pinned,
        _ => PinState::Unpinned,
    }
}
