use crate::config::Config;
use crate::error::{Result, RudixError};
use crate::package::{VersionSpec, denormalize, package_filename};
use jiff::Timestamp;
use jiff::tz::TimeZone;
use log::{debug, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

pub const NONE_LABEL: &str = "(none)";

/// Receipt details reported by the package database.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageInfo {
    pub version: Option<String>,
    pub install_time: Option<String>,
}

impl PackageInfo {
    /// Parse `pkgutil -v --pkg-info` output.
    pub fn parse(output: &str) -> Self {
        let mut info = PackageInfo::default();
        for line in output.lines().map(str::trim) {
            if let Some(version) = line.strip_prefix("version: ") {
                info.version = Some(version.trim().to_string());
            } else if let Some(time) = line.strip_prefix("install-time: ") {
                info.install_time = Some(time.trim().to_string());
            }
        }
        info
    }
}

/// Read access to the system package database, plus deregistration.
pub trait PackageDatabase: Send + Sync {
    /// Package ids installed under the vendor namespace.
    fn list_installed(&self, volume: &Path, vendor: &str) -> Result<Vec<String>>;

    /// `None` when the package is not installed.
    fn query_info(&self, package_id: &str, volume: &Path) -> Result<Option<PackageInfo>>;

    /// Absolute paths of the files a package installed.
    fn list_files(&self, package_id: &str, volume: &Path) -> Result<Vec<PathBuf>>;

    fn forget(&self, package_id: &str, volume: &Path) -> Result<()>;

    /// Package ids owning `path`.
    fn search_path(&self, path: &str, volume: &Path) -> Result<Vec<String>>;
}

/// A package recorded in the local package database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstalledPackage {
    pub package_id: String,
    pub base_name: String,
    /// `None` when the receipt carries no parseable version.
    pub version: Option<VersionSpec>,
    pub install_date: Option<String>,
}

impl InstalledPackage {
    pub fn new(package_id: &str, vendor: &str, info: &PackageInfo) -> Self {
        let version = info.version.as_deref().and_then(|raw| {
            VersionSpec::parse(raw)
                .map_err(|e| debug!("Ignoring version of {package_id}: {e}"))
                .ok()
        });

        Self {
            package_id: package_id.to_string(),
            base_name: denormalize(package_id, vendor),
            version,
            install_date: info.install_time.as_deref().map(format_install_time),
        }
    }

    pub fn version_label(&self) -> &str {
        self.version.as_ref().map_or(NONE_LABEL, VersionSpec::as_str)
    }

    pub fn install_date_label(&self) -> &str {
        self.install_date.as_deref().unwrap_or(NONE_LABEL)
    }

    /// Package filename this install corresponds to.
    pub fn package_filename(&self) -> String {
        package_filename(&self.base_name, self.version_label())
    }
}

/// Render epoch seconds as a local date; other values pass through.
pub fn format_install_time(raw: &str) -> String {
    raw.trim()
        .parse::<i64>()
        .ok()
        .and_then(|seconds| Timestamp::from_second(seconds).ok())
        .map(|ts| {
            ts.to_zoned(TimeZone::system())
                .strftime("%Y-%m-%d %H:%M:%S %Z")
                .to_string()
        })
        .unwrap_or_else(|| raw.trim().to_string())
}

/// Build the installed-package list for the configured volume.
pub fn load_installed(db: &dyn PackageDatabase, config: &Config) -> Result<Vec<InstalledPackage>> {
    let ids = db.list_installed(&config.volume, &config.vendor)?;
    let mut installed = Vec::with_capacity(ids.len());
    for id in ids {
        match db.query_info(&id, &config.volume)? {
            Some(info) => installed.push(InstalledPackage::new(&id, &config.vendor, &info)),
            None => warn!("Package '{id}' is listed but has no receipt"),
        }
    }
    Ok(installed)
}

/// Package database backed by `pkgutil`.
#[derive(Debug, Default)]
pub struct Pkgutil;

impl Pkgutil {
    pub fn new() -> Self {
        Self
    }

    fn run(&self, args: &[&str]) -> Result<Output> {
        debug!("Running: pkgutil {}", args.join(" "));
        Command::new("pkgutil").args(args).output().map_err(|e| {
            RudixError::PackageDatabase(format!(
                "Failed to execute 'pkgutil {}': {e}",
                args.join(" ")
            ))
        })
    }

    fn stdout_lines(output: &Output) -> Vec<String> {
        String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl PackageDatabase for Pkgutil {
    fn list_installed(&self, volume: &Path, vendor: &str) -> Result<Vec<String>> {
        let volume = volume.to_string_lossy();
        let pattern = format!("--pkgs={}\\..*", regex::escape(vendor));
        let output = self.run(&["--volume", &volume, &pattern])?;

        // pkgutil exits non-zero when nothing matches.
        if !output.status.success() {
            debug!(
                "No packages matched: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return Ok(Vec::new());
        }

        Ok(Self::stdout_lines(&output))
    }

    fn query_info(&self, package_id: &str, volume: &Path) -> Result<Option<PackageInfo>> {
        let volume = volume.to_string_lossy();
        let output = self.run(&["-v", "--volume", &volume, "--pkg-info", package_id])?;
        if !output.status.success() {
            return Ok(None);
        }
        Ok(Some(PackageInfo::parse(&String::from_utf8_lossy(
            &output.stdout,
        ))))
    }

    fn list_files(&self, package_id: &str, volume: &Path) -> Result<Vec<PathBuf>> {
        let volume_str = volume.to_string_lossy();
        let output = self.run(&["--volume", &volume_str, "--files", package_id])?;
        if !output.status.success() {
            return Err(RudixError::PackageDatabase(format!(
                "Could not list files of '{package_id}': {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(Self::stdout_lines(&output)
            .into_iter()
            .map(|line| volume.join(line))
            .collect())
    }

    fn forget(&self, package_id: &str, volume: &Path) -> Result<()> {
        let volume = volume.to_string_lossy();
        let output = self.run(&["--volume", &volume, "--forget", package_id])?;
        if output.status.success() {
            return Ok(());
        }

        Err(RudixError::PackageDatabase(format!(
            "pkgutil --forget {package_id} failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        )))
    }

    fn search_path(&self, path: &str, volume: &Path) -> Result<Vec<String>> {
        let volume = volume.to_string_lossy();
        let output = self.run(&["--volume", &volume, "--file-info", path])?;
        Ok(Self::stdout_lines(&output)
            .iter()
            .filter_map(|line| line.strip_prefix("pkgid: "))
            .map(|id| id.trim().to_string())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VENDOR: &str = "org.rudix.pkg";

    #[test]
    fn parses_pkg_info_output() {
        let output = "package-id: org.rudix.pkg.wget\n\
                      version: 1.19.1\n\
                      volume: /\n\
                      location: /\n\
                      install-time: 1489862400\n";
        let info = PackageInfo::parse(output);
        assert_eq!(info.version.as_deref(), Some("1.19.1"));
        assert_eq!(info.install_time.as_deref(), Some("1489862400"));
    }

    #[test]
    fn missing_fields_display_as_none() {
        let package = InstalledPackage::new("org.rudix.pkg.xyz", VENDOR, &PackageInfo::default());
        assert_eq!(package.base_name, "xyz");
        assert_eq!(package.version_label(), "(none)");
        assert_eq!(package.install_date_label(), "(none)");
        assert!(package.version.is_none());
    }

    #[test]
    fn installed_package_derives_name_and_filename() {
        let info = PackageInfo {
            version: Some("2.9.4-1".to_string()),
            install_time: None,
        };
        let package = InstalledPackage::new("org.rudix.pkg.static-foo", VENDOR, &info);
        assert_eq!(package.base_name, "static-foo");
        assert_eq!(package.version.as_ref().unwrap().revision(), 1);
        assert_eq!(package.package_filename(), "static-foo-2.9.4-1.pkg");
    }

    #[test]
    fn install_time_is_rendered_as_date() {
        let rendered = format_install_time("1489862400");
        assert!(rendered.starts_with("2017-03-1"), "{rendered}");
    }

    #[test]
    fn non_numeric_install_time_passes_through() {
        assert_eq!(format_install_time(" yesterday "), "yesterday");
    }
}
