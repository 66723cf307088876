//! Domain primitives: AffiliateId, TrackingTag.

use serde::{Deserialize, Serialize};

/// Identity of an authenticated affiliate, as issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AffiliateId(pub String);

impl AffiliateId {
    pub fn new(id: String) -> Self {
        AffiliateId(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AffiliateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Tracking tag (btag) used to attribute external activity to an affiliate.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TrackingTag(pub String);

impl TrackingTag {
    pub fn new(tag: String) -> Self {
        TrackingTag(tag)
    }

    /// Build a tag from user input, rejecting blank values.
    pub fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(TrackingTag(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TrackingTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
