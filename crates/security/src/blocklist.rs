//! Domain blocklist request matching.
//!
//! Matching is plain substring containment on the full request URL, not an
//! anchored host or suffix match. A blocked domain string that appears in a
//! path or query segment blocks the request too, e.g. a blocklist entry
//! `adnxs.com` blocks `https://example.com/?ref=adnxs.com`. This is a known
//! source of false positives.

use std::collections::BTreeSet;

/// Hook consulted by the engine for every outgoing request.
pub trait RequestFilter: Send + Sync {
    /// Return true if the request should be blocked.
    fn should_block(&self, url: &str) -> bool;
}

/// Ad-serving domains blocked by default.
pub const DEFAULT_AD_DOMAINS: &[&str] = &[
    "doubleclick.net",
    "googleadservices.com",
    "googlesyndication.com",
    "adservice.google.com",
    "ads.youtube.com",
    "ad.doubleclick.net",
    "adform.net",
    "adnxs.com",
    "adsrvr.org",
    "advertising.com",
    "amazon-adsystem.com",
    "scorecardresearch.com",
    "2mdn.net",
    "adzerk.net",
    "taboola.com",
    "outbrain.com",
    "pubmatic.com",
    "rubiconproject.com",
    "openx.net",
    "criteo.com",
    "ads.pubmatic.com",
    "ads.linkedin.com",
    "ads.facebook.com",
    "ads.twitter.com",
];

/// A fixed set of blocked domain strings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Blocklist {
    domains: BTreeSet<String>,
}

impl Blocklist {
    /// Create a blocklist from domain strings. Blank entries are ignored.
    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let domains = domains
            .into_iter()
            .map(|d| d.as_ref().trim().to_string())
            .filter(|d| !d.is_empty())
            .collect();
        Self { domains }
    }

    /// Get the first entry matching the URL, if any.
    pub fn matching_entry(&self, url: &str) -> Option<&str> {
        self.domains
            .iter()
            .find(|domain| url.contains(domain.as_str()))
            .map(String::as_str)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    pub fn domains(&self) -> impl Iterator<Item = &str> {
        self.domains.iter().map(String::as_str)
    }
}

impl RequestFilter for Blocklist {
    fn should_block(&self, url: &str) -> bool {
        match self.matching_entry(url) {
            Some(entry) => {
                tracing::debug!(url, entry, "request blocked");
                true
            }
            None => false,
        }
    }
}
