use crate::models::SiteFamily;

/// Classifies a product link into the site family whose extraction rule applies.
///
/// Implementations must be total: every input, including malformed URLs,
/// resolves to some family.
pub trait SiteResolver: Send + Sync {
    fn resolve(&self, link: &str) -> SiteFamily;
}

/// Ordered substring rules with a fallback family.
#[derive(Debug, Clone)]
pub struct SubstringResolver {
    rules: Vec<(String, SiteFamily)>,
    fallback: SiteFamily,
}

impl SubstringResolver {
    pub fn new(fallback: SiteFamily) -> Self {
        Self {
            rules: Vec::new(),
            fallback,
        }
    }

    /// Appends a rule. Earlier rules win.
    pub fn with_rule(mut self, pattern: impl Into<String>, family: SiteFamily) -> Self {
        self.rules.push((pattern.into(), family));
        self
    }

    pub fn fallback(&self) -> SiteFamily {
        self.fallback
    }
}

impl Default for SubstringResolver {
    fn default() -> Self {
        Self::new(SiteFamily::GittiGidiyor)
            .with_rule("urun.n11", SiteFamily::N11)
            .with_rule("hepsiburada", SiteFamily::Hepsiburada)
    }
}

impl SiteResolver for SubstringResolver {
    fn resolve(&self, link: &str) -> SiteFamily {
        self.rules
            .iter()
            .find(|(pattern, _)| link.contains(pattern.as_str()))
            .map(|(_, family)| *family)
            .unwrap_or(self.fallback)
    }
}
