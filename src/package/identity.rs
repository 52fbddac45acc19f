use crate::error::{Result, RudixError};
use crate::package::version::VersionSpec;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

pub const PACKAGE_SUFFIX: &str = ".pkg";

// Shortest name whose remainder is a digit-led version with an optional revision.
static VERSIONED_FILENAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<name>.+?)-(?P<version>\d[^-]*(?:-\d+)?)\.pkg$")
        .expect("valid package filename pattern")
});

// Fallback: the last hyphen separates name and version.
static LOOSE_FILENAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<name>.+)-(?P<version>[^-]+)\.pkg$").expect("valid package filename pattern")
});

/// Split a package filename of the form `<name>-<version>[-<revision>].pkg`.
pub fn split(filename: &str) -> Result<(String, VersionSpec)> {
    let captures = VERSIONED_FILENAME
        .captures(filename)
        .or_else(|| LOOSE_FILENAME.captures(filename))
        .ok_or_else(|| RudixError::InvalidPackageFilename(filename.to_string()))?;

    let name = &captures["name"];
    if name.is_empty() {
        return Err(RudixError::InvalidPackageFilename(filename.to_string()));
    }

    let version = VersionSpec::parse(&captures["version"])
        .map_err(|_| RudixError::InvalidPackageFilename(filename.to_string()))?;

    Ok((name.to_string(), version))
}

/// Transform a package name into a vendor-qualified package id.
///
/// Names that already carry the vendor namespace are returned unchanged.
pub fn canonical_id(name: &str, vendor: &str) -> String {
    if has_vendor_prefix(name, vendor) {
        name.to_string()
    } else {
        format!("{vendor}.{name}")
    }
}

/// Transform a package id back into a package name.
pub fn denormalize(package_id: &str, vendor: &str) -> String {
    if has_vendor_prefix(package_id, vendor) {
        package_id[vendor.len() + 1..].to_string()
    } else {
        package_id.to_string()
    }
}

fn has_vendor_prefix(name: &str, vendor: &str) -> bool {
    name.strip_prefix(vendor)
        .is_some_and(|rest| rest.starts_with('.'))
}

/// Build the package filename for a name and version.
pub fn package_filename(name: &str, version: &str) -> String {
    format!("{name}-{version}{PACKAGE_SUFFIX}")
}

/// A package release parsed from a manifest filename.
#[derive(Debug, Clone, Serialize)]
pub struct PackageDescriptor {
    pub base_name: String,
    pub version: VersionSpec,
    pub raw_filename: String,
}

impl PackageDescriptor {
    pub fn parse(filename: &str) -> Result<Self> {
        let (base_name, version) = split(filename)?;
        Ok(Self {
            base_name,
            version,
            raw_filename: filename.to_string(),
        })
    }
}

// Same name and version is the same release, whatever the filename spelling.
impl PartialEq for PackageDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.base_name == other.base_name && self.version == other.version
    }
}

impl Eq for PackageDescriptor {}

impl fmt::Display for PackageDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw_filename)
    }
}
