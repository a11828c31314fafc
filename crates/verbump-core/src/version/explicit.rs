//! Explicit version mode — validate and canonicalize a user-supplied version.

use semver::{BuildMetadata, Version};
use tracing::{debug, instrument};

use crate::version::{VersionResult, parse_version};

/// Validate an explicit version string and return its canonical form.
///
/// Accepts `"1.2.3"`, `"v1.2.3"` and `"=1.2.3"`; build metadata is dropped.
#[instrument]
pub fn validate_explicit(version_str: &str) -> VersionResult<Version> {
    let mut version = parse_version(version_str)?;
    version.build = BuildMetadata::EMPTY;
    debug!(%version, "validated explicit version");
    Ok(version)
}
