//! Site profiles: every structural locator the crawl needs, plus the stock
//! sections of the target site. Selector strings live here and nowhere else.

use crate::renderer::Locator;

/// Locator set for a property-listing section (the card-grid pipeline with
/// live per-card detail visits).
#[derive(Debug, Clone)]
pub struct SiteProfile {
    /// Section name, used for logging and export file naming.
    pub name: String,
    /// Entry URL of the listing view.
    pub listing_url: String,
    /// The listing view's defining container; its presence means the view
    /// is ready.
    pub container: Locator,
    /// One listing card.
    pub card: Locator,
    /// The promoted-tag indicator inside a card.
    pub pin_tag: Locator,
    /// The date / relative-time label inside a card.
    pub date: Locator,
    pub title: Locator,
    pub price: Locator,
    pub description: Locator,
    pub image: Locator,
    /// Optional click-to-expand control shown before the infinite list.
    pub expand_button: Locator,
    /// Phone-contact anchor on the detail view.
    pub phone_anchor: Locator,
    /// View counter on the detail view.
    pub views_counter: Locator,
}

/// Locator set for the office directory (the bulk-snapshot pipeline).
#[derive(Debug, Clone)]
pub struct OfficeProfile {
    pub name: String,
    pub listing_url: String,
    /// Base URL for resolving relative detail links.
    pub base_url: String,
    pub container: Locator,
    pub card: Locator,
    /// The dialog some cards open on click instead of navigating; its first
    /// anchor carries the detail link.
    pub dialog: Locator,
    /// Snapshot selectors, applied to captured HTML rather than live handles.
    pub image: Locator,
    pub title: Locator,
    pub description: Locator,
    pub ad_text: Locator,
    /// Country calling prefix prepended to the phone digits recovered from
    /// the detail link.
    pub phone_prefix: String,
}

/// A section together with the pipeline that crawls it.
#[derive(Debug, Clone)]
pub enum Section {
    Property(SiteProfile),
    Office(OfficeProfile),
}

impl Section {
    pub fn name(&self) -> &str {
        match self {
            Section::Property(p) => &p.name,
            Section::Office(p) => &p.name,
        }
    }
}

fn property_profile(name: &str, listing_url: &str) -> SiteProfile {
    SiteProfile {
        name: name.to_string(),
        listing_url: listing_url.to_string(),
        container: Locator::css(".relative.min-h-48"),
        card: Locator::css(".relative.w-full.rounded-lg.card-shadow"),
        pin_tag: Locator::css("div.bg-stickyTag"),
        date: Locator::css(".rounded.text-xs.flex.items-center.gap-1"),
        title: Locator::css(".font-bold.text-lg.text-dark.line-clamp-2.break-words"),
        price: Locator::css(".rounded.font-bold.text-primary-dark"),
        description: Locator::css(".line-clamp-2:nth-of-type(2)"),
        image: Locator::css("img[alt=\"Post\"]"),
        expand_button: Locator::css(
            "button.text-base.shrink-0.select-none.whitespace-nowrap.transition-colors.\
             disabled\\:opacity-50.h-12.font-bold.bg-primary.text-on-primary.active\\:bg-active-primary.\
             w-full.cursor-pointer.z-20.max-w-2xl.py-3.md\\:py-4.px-8.rounded-full.flex.items-center.justify-center.gap-2\\.5",
        ),
        phone_anchor: Locator::css(".flex.gap-3.justify-center a"),
        views_counter: Locator::css(
            ".flex.items-center.justify-center.gap-1.rounded.bg-whitish-transparent.\
             py-1.px-1\\.5.text-xs.min-w-\\[62px\\] div",
        ),
    }
}

fn office_profile() -> OfficeProfile {
    OfficeProfile {
        name: "offices".to_string(),
        listing_url: "https://www.boshamlan.com/المكاتب".to_string(),
        base_url: "https://www.boshamlan.com".to_string(),
        container: Locator::css("div.max-w-2xl.mx-auto"),
        card: Locator::css("div.relative.w-full.rounded-lg.bg-main.card-shadow.flex.p-3"),
        dialog: Locator::css("div[role=\"dialog\"], div.modal, div.popup"),
        image: Locator::css("div.shrink-0 img.rounded-lg"),
        title: Locator::css("div.font-bold.text-lg"),
        description: Locator::css("div.line-clamp-2"),
        ad_text: Locator::css("div.text-base.text-primary-dark.font-bold"),
        phone_prefix: "+965".to_string(),
    }
}

/// The four stock sections, in crawl order.
pub fn stock_sections() -> Vec<Section> {
    vec![
        Section::Property(property_profile(
            "sale",
            "https://www.boshamlan.com/search?c=1&t=1",
        )),
        Section::Property(property_profile(
            "rent",
            "https://www.boshamlan.com/search?c=1&t=2",
        )),
        Section::Property(property_profile(
            "exchange",
            "https://www.boshamlan.com/search?c=1&t=3",
        )),
        Section::Office(office_profile()),
    ]
}
