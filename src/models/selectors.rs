// src/models/selectors.rs

//! CSS selectors for scraping alert pages.

use serde::{Deserialize, Serialize};

/// CSS selectors for the listing page and the alert detail page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertSelectors {
    /// Selector for each alert entry on the listing page
    #[serde(default = "defaults::entry")]
    pub entry: String,

    /// Selector for the title link within an entry
    #[serde(default = "defaults::title")]
    pub title: String,

    /// HTML attribute holding the detail link (usually "href")
    #[serde(default = "defaults::link_attr")]
    pub link_attr: String,

    /// Selector for the alert body region on the detail page
    #[serde(default = "defaults::body")]
    pub body: String,
}

impl Default for AlertSelectors {
    fn default() -> Self {
        Self {
            entry: defaults::entry(),
            title: defaults::title(),
            link_attr: defaults::link_attr(),
            body: defaults::body(),
        }
    }
}

mod defaults {
    // Layout of the WordPress theme used by usembassy.gov sites.
    pub fn entry() -> String {
        "#content article".into()
    }
    pub fn title() -> String {
        "h2.entry-title a".into()
    }
    pub fn link_attr() -> String {
        "href".into()
    }
    pub fn body() -> String {
        ".entry-content".into()
    }
}
