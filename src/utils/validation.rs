use regex::Regex;
use std::sync::LazyLock;
use url::Url;

use crate::models::SiteFamily;
use crate::utils::error::{AppError, Result};

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z0-9a-z._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,64}$").expect("e-mail pattern is valid")
});

pub fn validate_email(email: &str) -> Result<()> {
    if email.is_empty() {
        return Err(AppError::Validation("e-mail address cannot be empty".to_string()));
    }
    if !EMAIL_PATTERN.is_match(email) {
        return Err(AppError::Validation(format!("invalid e-mail address: {}", email)));
    }
    Ok(())
}

/// Checks that `link` is an http(s) product URL on the given site family's domain.
pub fn validate_link(link: &str, family: SiteFamily) -> Result<()> {
    let url = Url::parse(link).map_err(|e| AppError::Validation(format!("invalid link {}: {}", link, e)))?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(AppError::Validation(format!("unsupported URL scheme: {}", scheme)));
        }
    }

    let host = url.host_str().unwrap_or_default();
    if !host.contains(family.domain_marker()) {
        return Err(AppError::Validation(format!(
            "{} is not a {} link",
            link, family
        )));
    }
    Ok(())
}
