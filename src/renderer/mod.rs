//! Renderer abstraction for browser-driven page sessions.
//!
//! Defines the `Browser`, `PageSession` and `ElementHandle` traits that
//! abstract over the browser engine (currently Chromium via chromiumoxide).
//! Crawl logic depends only on these traits plus the opaque [`Locator`]
//! handle, so selector changes stay confined to the site profile.

pub mod chromium;

use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

/// An opaque handle to a structural marker on the rendered page.
///
/// Constructed by the site profile (and by tests); crawl logic never looks
/// inside it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator(String);

impl Locator {
    /// Build a locator from a CSS selector.
    pub fn css(selector: impl Into<String>) -> Self {
        Self(selector.into())
    }

    /// The underlying CSS selector, for renderer implementations.
    pub fn as_css(&self) -> &str {
        &self.0
    }
}

/// A browser engine that can open page sessions.
#[async_trait]
pub trait Browser: Send + Sync {
    /// Open a new page (tab).
    async fn new_page(&self) -> Result<Box<dyn PageSession>>;
    /// Shut down the browser engine.
    async fn shutdown(&self) -> Result<()>;
    /// Number of currently open pages.
    fn active_pages(&self) -> usize;
}

/// One live page. A crawl run drives exactly one session at a time and all
/// operations against it are strictly sequential.
#[async_trait]
pub trait PageSession: Send + Sync {
    /// Navigate to a URL, bounded by a timeout.
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<()>;
    /// Wait until at least one element matching the locator is attached.
    async fn wait_for(&self, locator: &Locator, timeout: Duration) -> Result<()>;
    /// All elements currently matching the locator, in document order.
    async fn query_all(&self, locator: &Locator) -> Result<Vec<Box<dyn ElementHandle>>>;
    /// Scroll the viewport to the bottom of the document.
    async fn scroll_to_bottom(&self) -> Result<()>;
    /// The page's current URL.
    async fn current_url(&self) -> Result<String>;
    /// Navigate back through session history.
    async fn go_back(&mut self) -> Result<()>;
    /// Wait for the next navigation event, if one arrives in time.
    async fn wait_for_navigation(&self, timeout: Duration) -> Result<()>;
    /// Execute JavaScript in the page context and return the result.
    async fn evaluate(&self, script: &str) -> Result<serde_json::Value>;
    /// Full page HTML, for the snapshot extraction pass.
    async fn content(&self) -> Result<String>;
    /// Close this page.
    async fn close(self: Box<Self>) -> Result<()>;
}

/// A handle to one rendered element.
///
/// Handles are positional: they are only valid while the page they were
/// captured from is still displayed. After any navigation the caller must
/// re-query.
#[async_trait]
pub trait ElementHandle: Send + Sync {
    /// Click the element. `force` dispatches the click directly on the node
    /// instead of going through hit testing.
    async fn click(&self, force: bool) -> Result<()>;
    /// Wait until the element is visible (laid out with a rendered box),
    /// bounded by a timeout.
    async fn wait_visible(&self, timeout: Duration) -> Result<()>;
    /// Scroll the element into the viewport.
    async fn scroll_into_view(&self) -> Result<()>;
    /// Attribute value, `None` when the attribute is absent.
    async fn attribute(&self, name: &str) -> Result<Option<String>>;
    /// Text content, `None` when the element has none.
    async fn text(&self) -> Result<Option<String>>;
    /// First descendant matching the locator, `None` when there is none.
    async fn query(&self, locator: &Locator) -> Result<Option<Box<dyn ElementHandle>>>;
}
