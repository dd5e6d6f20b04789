//! Scripted in-memory renderer for crawl tests.
//!
//! Models just enough of a listing site: a card list revealed in scroll
//! increments, in-place navigation to per-card detail URLs, session
//! history, and detail-view fields. Every operation is instantaneous so
//! tests only pay the crawl's own (shrunk) waits.

// Each test binary compiles its own copy and uses a different subset.
#![allow(dead_code)]

use anyhow::{bail, Result};
use aqarscan::crawl::CrawlTuning;
use aqarscan::renderer::{ElementHandle, Locator, PageSession};
use aqarscan::site::SiteProfile;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Crawl tuning with all waits shrunk to keep tests fast.
pub fn fast_tuning() -> CrawlTuning {
    CrawlTuning {
        page_ready_timeout: Duration::from_millis(50),
        expand_settle: Duration::from_millis(1),
        scroll_settle: Duration::from_millis(1),
        max_scroll_rounds: 5,
        min_cards_for_predicate: 4,
        nav_race_timeout: Duration::from_millis(1),
        url_poll_interval: Duration::from_millis(1),
        url_poll_attempts: 3,
        field_wait: Duration::from_millis(5),
        return_wait: Duration::from_millis(5),
        recovery_wait: Duration::from_millis(5),
        link_settle: Duration::from_millis(1),
    }
}

/// A property-section profile with simple selectors the scripted site
/// understands.
pub fn test_profile(listing_url: &str) -> SiteProfile {
    SiteProfile {
        name: "test".to_string(),
        listing_url: listing_url.to_string(),
        container: Locator::css(".container"),
        card: Locator::css(".card"),
        pin_tag: Locator::css(".pin"),
        date: Locator::css(".date"),
        title: Locator::css(".title"),
        price: Locator::css(".price"),
        description: Locator::css(".desc"),
        image: Locator::css("img"),
        expand_button: Locator::css(".expand"),
        phone_anchor: Locator::css(".phone"),
        views_counter: Locator::css(".views"),
    }
}

/// The locators the scripted site recognizes, mapped to their roles.
#[derive(Clone)]
pub struct LocatorMap {
    pub container: Locator,
    pub card: Locator,
    pub pin_tag: Locator,
    pub date: Locator,
    pub title: Locator,
    pub price: Locator,
    pub description: Locator,
    pub image: Locator,
    pub phone_anchor: Locator,
    pub views_counter: Locator,
    pub dialog: Locator,
}

impl LocatorMap {
    pub fn from_profile(profile: &SiteProfile) -> Self {
        Self {
            container: profile.container.clone(),
            card: profile.card.clone(),
            pin_tag: profile.pin_tag.clone(),
            date: profile.date.clone(),
            title: profile.title.clone(),
            price: profile.price.clone(),
            description: profile.description.clone(),
            image: profile.image.clone(),
            phone_anchor: profile.phone_anchor.clone(),
            views_counter: profile.views_counter.clone(),
            dialog: Locator::css("__unused_dialog"),
        }
    }

    /// A map for sites that never use the per-card field locators.
    pub fn bare(container: &Locator, card: &Locator, dialog: &Locator) -> Self {
        Self {
            container: container.clone(),
            card: card.clone(),
            pin_tag: Locator::css("__unused_pin"),
            date: Locator::css("__unused_date"),
            title: Locator::css("__unused_title"),
            price: Locator::css("__unused_price"),
            description: Locator::css("__unused_desc"),
            image: Locator::css("__unused_img"),
            phone_anchor: Locator::css("__unused_phone"),
            views_counter: Locator::css("__unused_views"),
            dialog: dialog.clone(),
        }
    }
}

/// One scripted card.
#[derive(Debug, Clone)]
pub struct FakeCard {
    pub pinned: bool,
    pub date_text: String,
    pub title: String,
    pub price: String,
    pub description: String,
    pub image_url: String,
    pub detail_url: String,
    pub phone: Option<String>,
    pub views: Option<String>,
    /// Whether clicking the card performs the in-place navigation.
    pub click_navigates: bool,
    /// Whether clicking the card opens a dialog holding the detail link
    /// instead of navigating.
    pub click_opens_dialog: bool,
}

impl FakeCard {
    pub fn new(index: usize, pinned: bool, date_text: &str) -> Self {
        Self {
            pinned,
            date_text: date_text.to_string(),
            title: format!("card {index}"),
            price: format!("{} د.ك", 100 + index),
            description: format!("description {index}"),
            image_url: format!("https://img.example/{index}.jpg"),
            detail_url: format!("https://site.example/post/{index}"),
            phone: Some(format!("9650000{index:02}")),
            views: Some(format!("{}", 10 * (index + 1))),
            click_navigates: true,
            click_opens_dialog: false,
        }
    }
}

/// Shared scripted-site state, observable from tests.
pub struct SiteState {
    pub listing_url: String,
    pub cards: Vec<FakeCard>,
    pub visible: usize,
    pub per_scroll: usize,
    pub current_url: String,
    pub history: Vec<String>,
    pub scrolls: usize,
    pub navigations: usize,
    pub fail_navigation: bool,
    /// Per-card field reads, for asserting which cards were examined.
    pub card_queries: usize,
    /// Link carried by the currently open dialog, if any.
    pub open_dialog: Option<String>,
}

impl SiteState {
    pub fn new(listing_url: &str, cards: Vec<FakeCard>, visible: usize, per_scroll: usize) -> Self {
        Self {
            listing_url: listing_url.to_string(),
            cards,
            visible,
            per_scroll,
            current_url: "about:blank".to_string(),
            history: Vec::new(),
            scrolls: 0,
            navigations: 0,
            fail_navigation: false,
            card_queries: 0,
            open_dialog: None,
        }
    }

    fn on_listing(&self) -> bool {
        self.current_url == self.listing_url
    }

    /// Index of the card whose detail view is currently displayed.
    fn detail_card_index(&self) -> Option<usize> {
        self.cards
            .iter()
            .position(|c| c.detail_url == self.current_url)
    }
}

/// A scripted page session over [`SiteState`].
pub struct ScriptedPage {
    state: Arc<Mutex<SiteState>>,
    locators: Arc<LocatorMap>,
}

impl ScriptedPage {
    pub fn new(locators: LocatorMap, state: SiteState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
            locators: Arc::new(locators),
        }
    }

    /// Handle for post-run assertions.
    pub fn state(&self) -> Arc<Mutex<SiteState>> {
        Arc::clone(&self.state)
    }
}

#[async_trait]
impl PageSession for ScriptedPage {
    async fn navigate(&mut self, url: &str, _timeout: Duration) -> Result<()> {
        let mut s = self.state.lock().unwrap();
        if s.fail_navigation {
            bail!("connection refused");
        }
        s.navigations += 1;
        s.current_url = url.to_string();
        s.history.clear();
        s.open_dialog = None;
        Ok(())
    }

    async fn wait_for(&self, locator: &Locator, _timeout: Duration) -> Result<()> {
        let s = self.state.lock().unwrap();
        if *locator == self.locators.container {
            if s.on_listing() {
                return Ok(());
            }
            bail!("listing container absent at {}", s.current_url);
        }
        if *locator == self.locators.phone_anchor {
            if s.detail_card_index().is_some_and(|i| s.cards[i].phone.is_some()) {
                return Ok(());
            }
            bail!("no phone anchor");
        }
        if *locator == self.locators.views_counter {
            if s.detail_card_index().is_some_and(|i| s.cards[i].views.is_some()) {
                return Ok(());
            }
            bail!("no view counter");
        }
        bail!("locator {} never appears", locator.as_css());
    }

    async fn query_all(&self, locator: &Locator) -> Result<Vec<Box<dyn ElementHandle>>> {
        let s = self.state.lock().unwrap();

        if *locator == self.locators.card {
            if !s.on_listing() {
                return Ok(Vec::new());
            }
            let count = s.visible.min(s.cards.len());
            return Ok((0..count)
                .map(|index| {
                    Box::new(CardHandle {
                        state: Arc::clone(&self.state),
                        locators: Arc::clone(&self.locators),
                        index,
                    }) as Box<dyn ElementHandle>
                })
                .collect());
        }

        if *locator == self.locators.phone_anchor {
            if let Some(i) = s.detail_card_index() {
                if let Some(phone) = &s.cards[i].phone {
                    return Ok(vec![StaticHandle::with_attr("href", format!("tel:{phone}"))]);
                }
            }
            return Ok(Vec::new());
        }

        if *locator == self.locators.views_counter {
            if let Some(i) = s.detail_card_index() {
                if let Some(views) = &s.cards[i].views {
                    return Ok(vec![StaticHandle::with_text(views.clone())]);
                }
            }
            return Ok(Vec::new());
        }

        if *locator == self.locators.dialog {
            if let Some(link) = &s.open_dialog {
                return Ok(vec![Box::new(DialogHandle { link: link.clone() })]);
            }
            return Ok(Vec::new());
        }

        // Expand control and anything else: absent.
        Ok(Vec::new())
    }

    async fn scroll_to_bottom(&self) -> Result<()> {
        let mut s = self.state.lock().unwrap();
        s.scrolls += 1;
        if s.on_listing() {
            s.visible = (s.visible + s.per_scroll).min(s.cards.len());
        }
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.state.lock().unwrap().current_url.clone())
    }

    async fn go_back(&mut self) -> Result<()> {
        let mut s = self.state.lock().unwrap();
        match s.history.pop() {
            Some(previous) => {
                s.current_url = previous;
                Ok(())
            }
            None => bail!("no history to go back to"),
        }
    }

    async fn wait_for_navigation(&self, _timeout: Duration) -> Result<()> {
        bail!("no navigation event")
    }

    async fn evaluate(&self, script: &str) -> Result<serde_json::Value> {
        let s = self.state.lock().unwrap();
        if script.contains("scrollHeight") {
            return Ok(serde_json::json!(s.visible as u64 * 100));
        }
        Ok(serde_json::Value::Null)
    }

    async fn content(&self) -> Result<String> {
        // Office-directory HTML for the visible cards, using the selectors
        // office tests register (.grid/.card/img.thumb/.title/.clamp/.ad).
        let s = self.state.lock().unwrap();
        let mut html = String::from("<div class=\"grid\">");
        for card in s.cards.iter().take(s.visible) {
            html.push_str(&format!(
                concat!(
                    "<div class=\"card\">",
                    "<img class=\"thumb\" src=\"{}\">",
                    "<div class=\"title\">{}</div>",
                    "<div class=\"clamp\">{}</div>",
                    "<div class=\"clamp\">{}</div>",
                    "<div class=\"ad\">{}</div>",
                    "</div>"
                ),
                card.image_url, card.title, card.title, card.description, card.price
            ));
        }
        html.push_str("</div>");
        Ok(html)
    }

    async fn close(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

/// A live handle to one scripted card.
struct CardHandle {
    state: Arc<Mutex<SiteState>>,
    locators: Arc<LocatorMap>,
    index: usize,
}

#[async_trait]
impl ElementHandle for CardHandle {
    async fn click(&self, _force: bool) -> Result<()> {
        let mut s = self.state.lock().unwrap();
        let card = &s.cards[self.index];
        if card.click_navigates {
            let detail = card.detail_url.clone();
            let previous = std::mem::replace(&mut s.current_url, detail);
            s.history.push(previous);
        } else if card.click_opens_dialog {
            s.open_dialog = Some(s.cards[self.index].detail_url.clone());
        }
        Ok(())
    }

    async fn wait_visible(&self, _timeout: Duration) -> Result<()> {
        Ok(())
    }

    async fn scroll_into_view(&self) -> Result<()> {
        Ok(())
    }

    async fn attribute(&self, _name: &str) -> Result<Option<String>> {
        Ok(None)
    }

    async fn text(&self) -> Result<Option<String>> {
        Ok(None)
    }

    async fn query(&self, locator: &Locator) -> Result<Option<Box<dyn ElementHandle>>> {
        let mut s = self.state.lock().unwrap();
        s.card_queries += 1;
        let card = &s.cards[self.index];
        let l = &*self.locators;

        let handle = if *locator == l.pin_tag {
            card.pinned
                .then(|| StaticHandle::with_text("مميز".to_string()))
        } else if *locator == l.date {
            Some(StaticHandle::with_text(card.date_text.clone()))
        } else if *locator == l.title {
            Some(StaticHandle::with_text(card.title.clone()))
        } else if *locator == l.price {
            Some(StaticHandle::with_text(card.price.clone()))
        } else if *locator == l.description {
            Some(StaticHandle::with_text(card.description.clone()))
        } else if *locator == l.image {
            Some(StaticHandle::with_attr("src", card.image_url.clone()))
        } else {
            None
        };
        Ok(handle)
    }
}

/// An open dialog whose single anchor carries a detail link.
struct DialogHandle {
    link: String,
}

#[async_trait]
impl ElementHandle for DialogHandle {
    async fn click(&self, _force: bool) -> Result<()> {
        Ok(())
    }

    async fn wait_visible(&self, _timeout: Duration) -> Result<()> {
        Ok(())
    }

    async fn scroll_into_view(&self) -> Result<()> {
        Ok(())
    }

    async fn attribute(&self, _name: &str) -> Result<Option<String>> {
        Ok(None)
    }

    async fn text(&self) -> Result<Option<String>> {
        Ok(None)
    }

    async fn query(&self, locator: &Locator) -> Result<Option<Box<dyn ElementHandle>>> {
        if locator.as_css() == "a[href]" {
            return Ok(Some(StaticHandle::with_attr("href", self.link.clone())));
        }
        Ok(None)
    }
}

/// A leaf element with fixed text and attributes.
struct StaticHandle {
    text: Option<String>,
    attrs: HashMap<String, String>,
}

impl StaticHandle {
    fn with_text(text: String) -> Box<dyn ElementHandle> {
        Box::new(Self {
            text: Some(text),
            attrs: HashMap::new(),
        })
    }

    fn with_attr(name: &str, value: String) -> Box<dyn ElementHandle> {
        Box::new(Self {
            text: None,
            attrs: HashMap::from([(name.to_string(), value)]),
        })
    }
}

#[async_trait]
impl ElementHandle for StaticHandle {
    async fn click(&self, _force: bool) -> Result<()> {
        Ok(())
    }

    async fn wait_visible(&self, _timeout: Duration) -> Result<()> {
        Ok(())
    }

    async fn scroll_into_view(&self) -> Result<()> {
        Ok(())
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>> {
        Ok(self.attrs.get(name).cloned())
    }

    async fn text(&self) -> Result<Option<String>> {
        Ok(self.text.clone())
    }

    async fn query(&self, _locator: &Locator) -> Result<Option<Box<dyn ElementHandle>>> {
        Ok(None)
    }
}
