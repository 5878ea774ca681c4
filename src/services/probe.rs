// src/services/probe.rs

//! Latest-alert probe for listing pages.

use std::sync::Arc;

use scraper::Html;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{Alert, AlertSelectors};
use crate::services::PageFetcher;
use crate::utils::http::{element_text, parse_document, parse_selector};
use crate::utils::resolve_url;

/// Finds the most recent alert on a listing page.
pub struct AlertProbe {
    fetcher: Arc<dyn PageFetcher>,
    selectors: AlertSelectors,
}

impl AlertProbe {
    pub fn new(fetcher: Arc<dyn PageFetcher>, selectors: AlertSelectors) -> Self {
        Self { fetcher, selectors }
    }

    /// Fetch `listing_url` and return its first alert entry.
    pub async fn probe(&self, listing_url: &str) -> Result<Alert> {
        let html = self.fetcher.fetch_text(listing_url).await?;
        let document = parse_document(&html);
        extract_latest_alert(&document, listing_url, &self.selectors)
    }
}

/// Extract the first alert entry in document order.
///
/// Listing pages are ordered newest first, so the first entry is the latest
/// alert. Relative detail links are resolved against `listing_url`.
pub fn extract_latest_alert(
    document: &Html,
    listing_url: &str,
    selectors: &AlertSelectors,
) -> Result<Alert> {
    let entry_sel = parse_selector(&selectors.entry)?;
    let title_sel = parse_selector(&selectors.title)?;

    let entry = document
        .select(&entry_sel)
        .next()
        .ok_or_else(|| AppError::parse(listing_url, format!("no '{}' entry", selectors.entry)))?;

    let link = entry.select(&title_sel).next().ok_or_else(|| {
        AppError::parse(
            listing_url,
            format!("first entry has no '{}'", selectors.title),
        )
    })?;

    let title = element_text(&link).trim().to_string();
    if title.is_empty() {
        return Err(AppError::parse(listing_url, "first entry has an empty title"));
    }

    let href = link
        .value()
        .attr(&selectors.link_attr)
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .ok_or_else(|| {
            AppError::parse(
                listing_url,
                format!("first entry has no '{}' link", selectors.link_attr),
            )
        })?;
    let base = Url::parse(listing_url)?;

    Ok(Alert::new(title, resolve_url(&base, href)))
}
