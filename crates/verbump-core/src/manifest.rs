//! Package manifest recognition.
//!
//! A manifest is any JSON object whose `name`, `version` and `description`
//! fields are each absent, `null`, or a string. A lockfile-shaped manifest
//! (`package-lock.json`) additionally carries its authoritative version at
//! `packages[""].version`.

use serde_json::Value;

/// The primary manifest, relative to the working directory.
pub const PRIMARY_MANIFEST: &str = "package.json";

/// The lock manifest, relative to the working directory.
pub const LOCK_MANIFEST: &str = "package-lock.json";

/// Manifests checked for the current version when no JSON target is given.
pub const DEFAULT_MANIFESTS: &[&str] = &[PRIMARY_MANIFEST, LOCK_MANIFEST];

/// The shape of a recognized manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestKind {
    /// An ordinary manifest with a top-level `version`.
    Package,
    /// A lockfile that also nests the version at `packages[""].version`.
    PackageLock,
}

/// Classify a parsed JSON document.
///
/// Returns `None` when the document is not a manifest at all.
pub fn classify(value: &Value) -> Option<ManifestKind> {
    if !is_manifest(value) {
        return None;
    }
    if nested_lock_version(value).is_some() {
        Some(ManifestKind::PackageLock)
    } else {
        Some(ManifestKind::Package)
    }
}

/// Whether `value` looks like a package manifest.
pub fn is_manifest(value: &Value) -> bool {
    value.as_object().is_some_and(|obj| {
        ["name", "version", "description"]
            .iter()
            .all(|field| obj.get(*field).is_none_or(is_optional_string))
    })
}

/// Whether `value` is a manifest shaped like `package-lock.json`.
pub fn is_package_lock(value: &Value) -> bool {
    is_manifest(value) && nested_lock_version(value).is_some()
}

/// The top-level version string, if present and non-empty.
pub fn version_of(value: &Value) -> Option<&str> {
    value
        .get("version")
        .and_then(Value::as_str)
        .filter(|v| !v.is_empty())
}

/// Whether the manifest declares a non-empty script called `name`.
pub fn has_script(value: &Value, name: &str) -> bool {
    value
        .get("scripts")
        .and_then(|scripts| scripts.get(name))
        .is_some_and(|script| match script {
            Value::String(s) => !s.is_empty(),
            Value::Null | Value::Bool(false) => false,
            _ => true,
        })
}

/// Replace the version fields of a manifest in place.
///
/// Updates the top-level `version` when present, and for lockfiles also
/// `packages[""].version`. Returns `true` if any field changed.
pub fn set_version(value: &mut Value, version: &str) -> bool {
    let mut changed = false;

    if let Some(Value::String(current)) = value.get_mut("version")
        && current != version
    {
        *current = version.to_string();
        changed = true;
    }

    if let Some(Value::String(current)) = value
        .get_mut("packages")
        .and_then(|packages| packages.get_mut(""))
        .and_then(|root| root.get_mut("version"))
        && current != version
    {
        *current = version.to_string();
        changed = true;
    }

    changed
}

fn nested_lock_version(value: &Value) -> Option<&str> {
    value
        .get("packages")?
        .get("")?
        .get("version")?
        .as_str()
}

const fn is_optional_string(value: &Value) -> bool {
    matches!(value, Value::Null | Value::String(_))
}
