use crate::error::{Result, SyncError};
use crate::package::PackageDescriptor;
use crate::package::identity::PACKAGE_SUFFIX;
use crate::repository::{LineSource, SourceIdentity};
use log::{debug, warn};
use std::collections::BTreeMap;
use std::fmt;

const ALIAS_ARROW: &str = "->";

/// Immutable snapshot of the remote manifest and alias table.
///
/// A catalogue is built whole by one sync and never mutated afterwards; a
/// new sync produces a new value.
#[derive(Debug, Clone)]
pub struct Catalogue {
    source: SourceIdentity,
    packages: Vec<PackageDescriptor>,
    aliases: BTreeMap<String, String>,
}

impl Catalogue {
    /// Sync both resources from one line source.
    pub fn sync(
        source: SourceIdentity,
        lines: &dyn LineSource,
    ) -> std::result::Result<Self, SyncError> {
        let manifest_url = source.manifest_url();
        let aliases_url = source.aliases_url();
        Self::build(
            source,
            || lines.fetch_lines(&manifest_url),
            || lines.fetch_lines(&aliases_url),
        )
    }

    /// Build a catalogue from two fetchers.
    ///
    /// The manifest must yield at least one valid package; the alias fetch
    /// may fail, leaving the alias table empty.
    pub fn build<M, A>(
        source: SourceIdentity,
        fetch_manifest: M,
        fetch_aliases: A,
    ) -> std::result::Result<Self, SyncError>
    where
        M: FnOnce() -> Result<Vec<String>>,
        A: FnOnce() -> Result<Vec<String>>,
    {
        let unavailable = |reason: String| SyncError::ManifestUnavailable {
            url: source.base_url(),
            reason,
        };

        let manifest = fetch_manifest().map_err(|e| unavailable(e.to_string()))?;
        if manifest.is_empty() {
            return Err(unavailable("manifest is empty".to_string()));
        }

        let packages = Self::parse_manifest(&manifest);
        if packages.is_empty() {
            return Err(unavailable("manifest lists no packages".to_string()));
        }

        let aliases = match fetch_aliases() {
            Ok(lines) => Self::parse_aliases(&lines),
            Err(e) => {
                warn!("Alias table unavailable, continuing without aliases: {e}");
                BTreeMap::new()
            }
        };

        debug!(
            "Synchronized {} package(s) and {} alias(es) from {}",
            packages.len(),
            aliases.len(),
            source.base_url()
        );

        Ok(Self {
            source,
            packages,
            aliases,
        })
    }

    fn parse_manifest(lines: &[String]) -> Vec<PackageDescriptor> {
        lines
            .iter()
            .map(|line| line.trim())
            .filter(|line| line.ends_with(PACKAGE_SUFFIX))
            .filter(|line| {
                let plain = is_plain_filename(line);
                if !plain {
                    warn!("Skipping manifest entry with a path: '{line}'");
                }
                plain
            })
            .filter_map(|line| match PackageDescriptor::parse(line) {
                Ok(descriptor) => Some(descriptor),
                Err(e) => {
                    warn!("Skipping manifest entry: {e}");
                    None
                }
            })
            .collect()
    }

    fn parse_aliases(lines: &[String]) -> BTreeMap<String, String> {
        let mut aliases = BTreeMap::new();
        for line in lines {
            let Some((alias, target)) = line.split_once(ALIAS_ARROW) else {
                continue;
            };
            let (alias, target) = (alias.trim(), target.trim());
            if alias.is_empty() || target.is_empty() {
                continue;
            }
            aliases.insert(alias.to_string(), target.to_string());
        }
        aliases
    }

    pub fn source(&self) -> &SourceIdentity {
        &self.source
    }

    /// Packages in manifest order.
    pub fn packages(&self) -> &[PackageDescriptor] {
        &self.packages
    }

    pub fn aliases(&self) -> &BTreeMap<String, String> {
        &self.aliases
    }

    pub fn alias(&self, name: &str) -> Option<&str> {
        self.aliases.get(name).map(String::as_str)
    }

    /// Find a manifest entry by its exact filename.
    pub fn find_exact(&self, filename: &str) -> Option<&PackageDescriptor> {
        self.packages.iter().find(|p| p.raw_filename == filename)
    }
}

// Entries become local file names, so they must not name a directory.
fn is_plain_filename(line: &str) -> bool {
    !line.contains(['/', '\\']) && !line.contains("..")
}

impl fmt::Display for Catalogue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} package(s) available on '{}'",
            self.packages.len(),
            self.source.base_url()
        )
    }
}
