//! Chromium-based renderer using chromiumoxide.

use super::{Browser as BrowserEngine, ElementHandle, Locator, PageSession};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// How often `wait_for` re-checks for a locator.
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Find the Chromium binary path.
pub fn find_chromium() -> Option<PathBuf> {
    // 1. AQARSCAN_CHROMIUM_PATH env
    if let Ok(p) = std::env::var("AQARSCAN_CHROMIUM_PATH") {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }

    // 2. ~/.aqarscan/chromium/
    if let Some(home) = dirs::home_dir() {
        let candidates = if cfg!(target_os = "macos") {
            vec![
                home.join(".aqarscan/chromium/chrome-mac-arm64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                home.join(".aqarscan/chromium/chrome-mac-x64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                home.join(".aqarscan/chromium/chrome"),
            ]
        } else {
            vec![
                home.join(".aqarscan/chromium/chrome-linux64/chrome"),
                home.join(".aqarscan/chromium/chrome"),
            ]
        };
        for c in candidates {
            if c.exists() {
                return Some(c);
            }
        }
    }

    // 3. System PATH
    if let Ok(path) = which::which("google-chrome") {
        return Some(path);
    }
    if let Ok(path) = which::which("chromium") {
        return Some(path);
    }
    if let Ok(path) = which::which("chromium-browser") {
        return Some(path);
    }

    // 4. Common macOS locations
    if cfg!(target_os = "macos") {
        let common =
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}

/// Chromium-based browser engine.
pub struct ChromiumBrowser {
    browser: Browser,
    active_count: Arc<AtomicUsize>,
}

impl ChromiumBrowser {
    /// Create a new ChromiumBrowser, launching a headless Chromium instance.
    pub async fn new() -> Result<Self> {
        let chrome_path = find_chromium()
            .context("Chromium not found. Set AQARSCAN_CHROMIUM_PATH or install Chrome.")?;

        let config = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--disable-background-networking")
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build browser config: {e}"))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("failed to launch Chromium")?;

        // Spawn the handler task
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        Ok(Self {
            browser,
            active_count: Arc::new(AtomicUsize::new(0)),
        })
    }
}

#[async_trait]
impl BrowserEngine for ChromiumBrowser {
    async fn new_page(&self) -> Result<Box<dyn PageSession>> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .context("failed to create new page")?;

        self.active_count.fetch_add(1, Ordering::Relaxed);

        Ok(Box::new(ChromiumPage {
            page,
            active_count: Arc::clone(&self.active_count),
        }))
    }

    async fn shutdown(&self) -> Result<()> {
        // Browser is dropped when ChromiumBrowser is dropped
        Ok(())
    }

    fn active_pages(&self) -> usize {
        self.active_count.load(Ordering::Relaxed)
    }
}

/// A single Chromium page session.
pub struct ChromiumPage {
    page: Page,
    active_count: Arc<AtomicUsize>,
}

#[async_trait]
impl PageSession for ChromiumPage {
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<()> {
        let result = tokio::time::timeout(timeout, self.page.goto(url)).await;

        match result {
            Ok(Ok(_response)) => {
                // Wait for the page to settle
                let _ = self.page.wait_for_navigation().await;
                Ok(())
            }
            Ok(Err(e)) => bail!("navigation to {url} failed: {e}"),
            Err(_) => bail!("navigation to {url} timed out after {timeout:?}"),
        }
    }

    async fn wait_for(&self, locator: &Locator, timeout: Duration) -> Result<()> {
        // chromiumoxide has no wait-for-selector primitive; poll instead.
        let deadline = Instant::now() + timeout;
        loop {
            if self.page.find_element(locator.as_css()).await.is_ok() {
                return Ok(());
            }
            if Instant::now() >= deadline {
                bail!(
                    "timed out after {timeout:?} waiting for locator {}",
                    locator.as_css()
                );
            }
            tokio::time::sleep(WAIT_POLL_INTERVAL).await;
        }
    }

    async fn query_all(&self, locator: &Locator) -> Result<Vec<Box<dyn ElementHandle>>> {
        let elements = self
            .page
            .find_elements(locator.as_css())
            .await
            .unwrap_or_default();

        Ok(elements
            .into_iter()
            .map(|element| Box::new(ChromiumElement { element }) as Box<dyn ElementHandle>)
            .collect())
    }

    async fn scroll_to_bottom(&self) -> Result<()> {
        self.page
            .evaluate("window.scrollTo(0, document.body.scrollHeight)")
            .await
            .context("scroll failed")?;
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        let url = self
            .page
            .url()
            .await
            .context("failed to get URL")?
            .map(|u| u.to_string())
            .unwrap_or_default();
        Ok(url)
    }

    async fn go_back(&mut self) -> Result<()> {
        self.page
            .evaluate("history.back()")
            .await
            .context("history navigation failed")?;
        let _ = self.page.wait_for_navigation().await;
        Ok(())
    }

    async fn wait_for_navigation(&self, timeout: Duration) -> Result<()> {
        match tokio::time::timeout(timeout, self.page.wait_for_navigation()).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => bail!("navigation wait failed: {e}"),
            Err(_) => bail!("no navigation within {timeout:?}"),
        }
    }

    async fn evaluate(&self, script: &str) -> Result<serde_json::Value> {
        let result = self
            .page
            .evaluate(script)
            .await
            .context("JS execution failed")?;

        result
            .into_value()
            .map_err(|e| anyhow::anyhow!("failed to convert JS result: {e:?}"))
    }

    async fn content(&self) -> Result<String> {
        let result = self
            .page
            .evaluate("document.documentElement.outerHTML")
            .await
            .context("failed to get HTML")?;

        let html: String = result
            .into_value()
            .map_err(|e| anyhow::anyhow!("failed to convert HTML result: {e:?}"))?;

        Ok(html)
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.active_count.fetch_sub(1, Ordering::Relaxed);
        let _ = self.page.close().await;
        Ok(())
    }
}

/// A handle to one element on a Chromium page.
pub struct ChromiumElement {
    element: Element,
}

#[async_trait]
impl ElementHandle for ChromiumElement {
    async fn click(&self, force: bool) -> Result<()> {
        if force {
            // Dispatch the click on the node itself, bypassing hit testing.
            self.element
                .call_js_fn("function() { this.click(); }", false)
                .await
                .context("forced click failed")?;
        } else {
            self.element.click().await.context("click failed")?;
        }
        Ok(())
    }

    async fn wait_visible(&self, timeout: Duration) -> Result<()> {
        // An element with a clickable point is laid out and on screen; poll
        // until it gets one.
        let deadline = Instant::now() + timeout;
        loop {
            if self.element.clickable_point().await.is_ok() {
                return Ok(());
            }
            if Instant::now() >= deadline {
                bail!("element not visible after {timeout:?}");
            }
            tokio::time::sleep(WAIT_POLL_INTERVAL).await;
        }
    }

    async fn scroll_into_view(&self) -> Result<()> {
        self.element
            .scroll_into_view()
            .await
            .context("scroll into view failed")?;
        Ok(())
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>> {
        self.element
            .attribute(name)
            .await
            .context("attribute read failed")
    }

    async fn text(&self) -> Result<Option<String>> {
        self.element
            .inner_text()
            .await
            .context("text read failed")
    }

    async fn query(&self, locator: &Locator) -> Result<Option<Box<dyn ElementHandle>>> {
        // find_element errors when nothing matches; treat that as absence.
        match self.element.find_element(locator.as_css()).await {
            Ok(element) => Ok(Some(Box::new(ChromiumElement { element }))),
            Err(_) => Ok(None),
        }
    }
}
