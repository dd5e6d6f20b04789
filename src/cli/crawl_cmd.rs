//! `aqarscan crawl`: crawl listing sections and export the records.

use crate::classify::freshness;
use crate::crawl::{ListingCrawler, OfficeCrawler};
use crate::export;
use crate::model::CrawlOutcome;
use crate::renderer::chromium::ChromiumBrowser;
use crate::renderer::Browser;
use crate::site::{stock_sections, Section};
use anyhow::{bail, Result};
use std::path::Path;
use tracing::{info, warn};

/// Run the crawl command. `section` limits the run to one named section;
/// `None` crawls all of them with the same cutoff.
pub async fn run(section: Option<&str>, out_dir: &Path) -> Result<()> {
    let sections = select_sections(section)?;

    // One cutoff for the entire run, shared by every section.
    let cutoff = freshness::cutoff_yesterday();
    info!("run cutoff: {cutoff}");

    let browser = ChromiumBrowser::new().await?;
    let result = crawl_sections(&browser, &sections, cutoff, out_dir).await;

    // The browser goes down on every exit path.
    if let Err(e) = browser.shutdown().await {
        warn!("browser shutdown failed: {e:#}");
    }
    result
}

fn select_sections(requested: Option<&str>) -> Result<Vec<Section>> {
    let all = stock_sections();
    match requested {
        None => Ok(all),
        Some(name) => {
            let selected: Vec<Section> =
                all.into_iter().filter(|s| s.name() == name).collect();
            if selected.is_empty() {
                bail!("unknown section '{name}' (expected sale, rent, exchange or offices)");
            }
            Ok(selected)
        }
    }
}

async fn crawl_sections(
    browser: &dyn Browser,
    sections: &[Section],
    cutoff: chrono::NaiveDate,
    out_dir: &Path,
) -> Result<()> {
    for section in sections {
        let name = section.name().to_string();
        let mut page = browser.new_page().await?;

        let outcome = match section {
            Section::Property(profile) => {
                ListingCrawler::new(profile.clone(), cutoff)
                    .crawl(page.as_mut())
                    .await
            }
            Section::Office(profile) => {
                OfficeCrawler::new(profile.clone()).crawl(page.as_mut()).await
            }
        };

        // Close the page before acting on the outcome so the session never
        // leaks, whatever happened above.
        if let Err(e) = page.close().await {
            warn!("failed to close page for {name}: {e:#}");
        }

        match outcome {
            Ok(CrawlOutcome::Records(records)) => {
                let path = export::write_section(out_dir, cutoff, &name, &records)?;
                println!("  {name}: {} records -> {}", records.len(), path.display());
            }
            Ok(CrawlOutcome::NoCards) => {
                println!("  {name}: no cards found");
            }
            Err(e) => {
                warn!("section {name} failed: {e:#}");
                println!("  {name}: failed ({e:#})");
            }
        }
    }
    Ok(())
}
