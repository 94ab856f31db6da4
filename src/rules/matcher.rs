//! Target host matching.
//!
//! # Design Decisions
//! - Host matching is case-insensitive (RFC 9110)
//! - Suffix matches only on label boundaries
//! - No regex to guarantee O(n) matching

use crate::config::HostMatch;

/// Matches a target URL host against a configured domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostMatcher {
    expected_host: String,
    mode: HostMatch,
}

impl HostMatcher {
    /// Create a new host matcher.
    /// The host is normalized to lowercase for case-insensitive matching.
    pub fn new(host: impl Into<String>, mode: HostMatch) -> Self {
        let host = host.into().trim().trim_end_matches('.').to_ascii_lowercase();
        Self {
            expected_host: host,
            mode,
        }
    }

    pub fn exact(host: impl Into<String>) -> Self {
        Self::new(host, HostMatch::Exact)
    }

    pub fn suffix(host: impl Into<String>) -> Self {
        Self::new(host, HostMatch::Suffix)
    }

    /// Returns true if `host` matches this matcher.
    pub fn matches(&self, host: &str) -> bool {
        let host = host.trim_end_matches('.').to_ascii_lowercase();
        match self.mode {
            HostMatch::Exact => host == self.expected_host,
            HostMatch::Suffix => {
                host == self.expected_host
                    || host
                        .strip_suffix(self.expected_host.as_str())
                        .is_some_and(|prefix| prefix.ends_with('.'))
            }
        }
    }
}
