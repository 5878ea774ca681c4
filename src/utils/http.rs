// src/utils/http.rs

//! HTTP client utilities.

use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};
use crate::models::FetcherConfig;

/// Create a configured asynchronous HTTP client for page fetches.
pub fn create_client(config: &FetcherConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(config.timeout())
        .build()
        .map_err(|e| AppError::config(format!("cannot build HTTP client: {e}")))?;
    Ok(client)
}

/// Parse a CSS selector, reporting the offending selector on failure.
pub fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

/// All text below an element, concatenated in document order.
pub fn element_text(element: &ElementRef<'_>) -> String {
    element.text().collect()
}

/// Parse a document, keeping parsing off any await point.
pub fn parse_document(html: &str) -> Html {
    Html::parse_document(html)
}
