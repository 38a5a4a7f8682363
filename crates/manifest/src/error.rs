use thiserror::Error;

/// Errors produced by the manifest layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ManifestError {
    /// Locator failed validation before any network access.
    #[error("invalid manifest locator: {0}")]
    InvalidLocator(String),
    /// Both the direct fetch and the relay retry failed.
    #[error("manifest fetch failed: {0}")]
    Fetch(String),
    /// Payload retrieved but not parseable as a manifest.
    #[error("manifest payload malformed: {0}")]
    Parse(String),
}
