// src/services/content.rs

//! Alert body retrieval for detail pages.

use std::sync::Arc;

use scraper::Html;

use crate::error::{AppError, Result};
use crate::models::AlertSelectors;
use crate::services::PageFetcher;
use crate::utils::http::{element_text, parse_document, parse_selector};

/// Fetches the plain-text body of an alert.
pub struct ContentFetcher {
    fetcher: Arc<dyn PageFetcher>,
    selectors: AlertSelectors,
}

impl ContentFetcher {
    pub fn new(fetcher: Arc<dyn PageFetcher>, selectors: AlertSelectors) -> Self {
        Self { fetcher, selectors }
    }

    /// Fetch `detail_url` and return the text of its content region.
    pub async fn fetch_body(&self, detail_url: &str) -> Result<String> {
        let html = self.fetcher.fetch_text(detail_url).await?;
        let document = parse_document(&html);
        extract_body(&document, detail_url, &self.selectors)
    }
}

/// Extract the body text without markup, trimmed of surrounding whitespace.
///
/// When the selector matches more than once, the last match is used.
pub fn extract_body(
    document: &Html,
    detail_url: &str,
    selectors: &AlertSelectors,
) -> Result<String> {
    let body_sel = parse_selector(&selectors.body)?;
    let region = document
        .select(&body_sel)
        .last()
        .ok_or_else(|| AppError::parse(detail_url, format!("no '{}' region", selectors.body)))?;

    Ok(element_text(&region).trim().to_string())
}
