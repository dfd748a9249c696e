//! Request sequencing for summary fetches
//!
//! Every fetch is tagged with a token from a monotonically increasing
//! counter. Only the response carrying the latest issued token may be
//! applied; anything older is stale and dropped.

use std::sync::atomic::{AtomicU64, Ordering};

/// Token identifying one issued request
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    /// Get raw sequence number
    #[inline]
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for RequestToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Issues request tokens and answers whether a token is still current
#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: AtomicU64,
}

impl RequestSequencer {
    /// Create new sequencer
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next token, superseding all earlier ones
    #[inline]
    pub fn issue(&self) -> RequestToken {
        RequestToken(self.latest.fetch_add(1, Ordering::AcqRel) + 1)
    }

    /// Check if the token is the latest issued
    #[inline]
    #[must_use]
    pub fn is_current(&self, token: RequestToken) -> bool {
        self.latest.load(Ordering::Acquire) == token.0
    }

    /// Latest issued token, if any
    #[inline]
    #[must_use]
    pub fn latest(&self) -> Option<RequestToken> {
        match self.latest.load(Ordering::Acquire) {
            0 => None,
            n => Some(RequestToken(n)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_increase() {
        let seq = RequestSequencer::new();
        assert_eq!(seq.latest(), None);

        let a = seq.issue();
        let b = seq.issue();
        assert!(b > a);
        assert_eq!(seq.latest(), Some(b));
    }

    #[test]
    fn only_latest_is_current() {
        let seq = RequestSequencer::new();
        let a = seq.issue();
        assert!(seq.is_current(a));

        let b = seq.issue();
        assert!(!seq.is_current(a));
        assert!(seq.is_current(b));
    }
}
