//! Pre-flight validation helpers.

use crate::error::GenerateError;

/// Validate that an API credential is present and non-blank.
pub fn validate_credential(credential: &str) -> Result<(), GenerateError> {
    if credential.trim().is_empty() {
        return Err(GenerateError::Auth(
            "No API credential configured".to_string(),
        ));
    }
    Ok(())
}

/// Validate that an asset URL is non-empty and uses http(s).
///
/// Asset URLs come from the rendering service, but a malformed one is
/// caught here before any download or host mutation happens.
pub fn validate_asset_url(url: &str) -> Result<(), GenerateError> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(GenerateError::Validation(
            "Asset URL must not be empty".to_string(),
        ));
    }
    if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
        return Err(GenerateError::Validation(format!(
            "Asset URL must start with http:// or https://, got: '{trimmed}'"
        )));
    }
    Ok(())
}
