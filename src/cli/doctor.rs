//! `aqarscan doctor`: check the environment and diagnose issues.

use crate::renderer::chromium::find_chromium;
use crate::site::stock_sections;
use anyhow::Result;

/// Run the doctor command.
pub async fn run() -> Result<()> {
    match find_chromium() {
        Some(path) => println!("  Chromium: {}", path.display()),
        None => {
            println!("  Chromium: not found");
            println!("  Set AQARSCAN_CHROMIUM_PATH or install Chrome / Chromium.");
        }
    }

    println!("  Sections:");
    for section in stock_sections() {
        println!("    {}", section.name());
    }

    Ok(())
}
