use crate::error::{Result, RudixError};
use std::path::{Component, Path, PathBuf};

/// Directories a package may list but must never be removed by an uninstall.
const PROTECTED_DIRS: &[&str] = &[
    "Applications",
    "Library",
    "Library/LaunchAgents",
    "Library/LaunchDaemons",
    "System",
    "bin",
    "etc",
    "private",
    "sbin",
    "tmp",
    "usr",
    "usr/bin",
    "usr/lib",
    "usr/libexec",
    "usr/sbin",
    "usr/share",
    "usr/local",
    "usr/local/bin",
    "usr/local/etc",
    "usr/local/include",
    "usr/local/lib",
    "usr/local/lib/pkgconfig",
    "usr/local/libexec",
    "usr/local/sbin",
    "usr/local/share",
    "usr/local/share/doc",
    "usr/local/share/info",
    "usr/local/share/locale",
    "usr/local/share/man",
    "var",
];

/// Provides path validation helpers for the target volume and uninstall walks.
pub struct PathValidator;

impl PathValidator {
    /// Validates and canonicalises the volume packages are installed on.
    pub fn validate_volume(path: impl AsRef<Path>) -> Result<PathBuf> {
        let path = path.as_ref();

        let canonical = path.canonicalize().map_err(|e| {
            RudixError::Config(format!("Invalid volume '{}': {e}", path.display()))
        })?;

        if !canonical.is_dir() {
            return Err(RudixError::Config(format!(
                "Volume '{}' is not a directory",
                canonical.display()
            )));
        }

        Ok(canonical)
    }

    /// Whether an uninstall must leave `path` alone.
    ///
    /// Paths outside the volume, paths with `..` and the standard hierarchy
    /// directories (including `usr/local/share/man/manN`) are protected.
    pub fn is_protected(path: impl AsRef<Path>, volume: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        let volume = volume.as_ref();

        if path
            .components()
            .any(|component| matches!(component, Component::ParentDir))
        {
            return true;
        }

        let relative = match path.strip_prefix(volume) {
            Ok(relative) => relative,
            Err(_) => return true,
        };

        let normalized: Vec<String> = relative
            .components()
            .filter_map(|component| match component {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();

        if normalized.is_empty() {
            return true;
        }

        let joined = normalized.join("/");
        if PROTECTED_DIRS.contains(&joined.as_str()) {
            return true;
        }

        Self::is_man_section(&joined)
    }

    fn is_man_section(relative: &str) -> bool {
        relative
            .strip_prefix("usr/local/share/man/man")
            .is_some_and(|section| !section.is_empty() && !section.contains('/'))
    }
}
