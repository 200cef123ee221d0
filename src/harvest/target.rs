use crate::utils::error::{HarvestError, Result};
use crate::utils::validation;
use url::Url;

/// True when `url` belongs to the expected resource family.
pub fn validate_target(url: &str, prefix: &str) -> bool {
    check_target(url, prefix).is_ok()
}

/// Prefix check first, then a real URL parse. Nothing touches the network.
pub fn check_target(url: &str, prefix: &str) -> Result<Url> {
    let trimmed = url.trim();
    if prefix.is_empty() || !trimmed.starts_with(prefix) {
        return Err(HarvestError::InvalidTarget {
            url: url.to_string(),
            reason: format!("expected a URL starting with {}", prefix),
        });
    }

    validation::validate_url("target", trimmed).map_err(|e| HarvestError::InvalidTarget {
        url: url.to_string(),
        reason: e.to_string(),
    })
}
