use serde::{Deserialize, Serialize};
use std::fmt;

pub mod item;

// Re-exports for convenience
pub use item::*;

/// Known shop families. Each family has exactly one price locator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SiteFamily {
    #[serde(rename = "gg")]
    GittiGidiyor,
    #[serde(rename = "hb")]
    Hepsiburada,
    #[serde(rename = "n11")]
    N11,
}

impl SiteFamily {
    pub const ALL: [SiteFamily; 3] = [SiteFamily::GittiGidiyor, SiteFamily::Hepsiburada, SiteFamily::N11];

    pub fn tag(&self) -> &'static str {
        match self {
            SiteFamily::GittiGidiyor => "gg",
            SiteFamily::Hepsiburada => "hb",
            SiteFamily::N11 => "n11",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|family| family.tag() == tag)
    }

    /// CSS selector of the element holding the current price.
    pub fn price_selector(&self) -> &'static str {
        match self {
            SiteFamily::GittiGidiyor => "div#sp-price-lowPrice",
            SiteFamily::Hepsiburada => "div.extra-discount-price",
            SiteFamily::N11 => "div.newPrice",
        }
    }

    /// Families whose price is only present after client-side scripts run.
    pub fn requires_rendering(&self) -> bool {
        matches!(self, SiteFamily::Hepsiburada)
    }

    /// Substring every valid product host of this family contains.
    pub fn domain_marker(&self) -> &'static str {
        match self {
            SiteFamily::GittiGidiyor => "gittigidiyor",
            SiteFamily::Hepsiburada => "hepsiburada",
            SiteFamily::N11 => "n11",
        }
    }
}

impl fmt::Display for SiteFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
