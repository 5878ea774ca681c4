// src/models/source.rs

//! Watched source and notification destination.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Opaque identifier of a notification channel.
///
/// Telegram chat ids are usually negative integers, but channel usernames
/// (`@name`) are strings, so both TOML integers and strings are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Destination(String);

impl Destination {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Destination {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Str(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Int(n) => Destination(n.to_string()),
            Raw::Str(s) => Destination(s),
        })
    }
}

/// One watched alert feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    /// Short stable key (e.g. a country code), unique across sources
    pub id: String,

    /// Address of the alert listing page
    pub listing_url: String,

    /// Where new alerts go; `None` means alerts are tracked but not sent
    pub destination: Option<Destination>,
}

impl Source {
    /// Build a source from its id, expanding `{id}` in the listing template.
    pub fn new(id: impl Into<String>, template: &str, destination: Option<Destination>) -> Self {
        let id = id.into();
        Self {
            listing_url: template.replace("{id}", &id),
            id,
            destination,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_url_from_template() {
        let source = Source::new("ua", "https://{id}.usembassy.gov/category/alert/", None);
        assert_eq!(source.listing_url, "https://ua.usembassy.gov/category/alert/");
        assert!(source.destination.is_none());
    }

    #[test]
    fn test_destination_accepts_int_and_string() {
        #[derive(Deserialize)]
        struct Wrap {
            a: Destination,
            b: Destination,
        }

        let wrap: Wrap = toml::from_str("a = -1002127502421\nb = \"@alerts\"").unwrap();
        assert_eq!(wrap.a.as_str(), "-1002127502421");
        assert_eq!(wrap.b.as_str(), "@alerts");
    }
}
