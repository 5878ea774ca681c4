//! Alert data structure.

/// The most recent entry on a listing page at probe time.
///
/// Built fresh on every probe. Only `title` outlives the cycle, as the
/// source's fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    /// Display title, used as the change-detection fingerprint
    pub title: String,

    /// Absolute URL of the full alert page
    pub detail_url: String,
}

impl Alert {
    pub fn new(title: impl Into<String>, detail_url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            detail_url: detail_url.into(),
        }
    }

    /// Whether this alert differs from the stored fingerprint.
    ///
    /// Exact string equality; an empty fingerprint never matches a real
    /// title, so the first observation of a source is always a change.
    pub fn is_new_since(&self, fingerprint: &str) -> bool {
        self.title != fingerprint
    }
}
