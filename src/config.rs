use crate::error::{Result, RudixError};
use crate::repository::SourceIdentity;
use crate::utils::path_validator::PathValidator;
use std::path::PathBuf;
use std::process::Command;
use url::Url;

pub const DEFAULT_SITE: &str = "https://s3.amazonaws.com/rudix.org/packages";
pub const DEFAULT_TRACK: &str = "master";
pub const DEFAULT_VENDOR: &str = "org.rudix.pkg";
pub const DEFAULT_VOLUME: &str = "/";
const FALLBACK_PLATFORM: &str = "10.12";

const CODENAMES: &[(&str, &str)] = &[
    ("10.6", "Snow Leopard"),
    ("10.7", "Lion"),
    ("10.8", "Mountain Lion"),
    ("10.9", "Mavericks"),
    ("10.10", "Yosemite"),
    ("10.11", "El Capitan"),
    ("10.12", "Sierra"),
    ("10.13", "High Sierra"),
    ("10.14", "Mojave"),
    ("10.15", "Catalina"),
];

/// Settings for one session, resolved once from flags and environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub site: String,
    pub track: String,
    pub platform: String,
    pub vendor: String,
    pub volume: PathBuf,
}

impl Config {
    pub fn new(
        site: &str,
        track: &str,
        platform: Option<&str>,
        vendor: &str,
        volume: impl Into<PathBuf>,
    ) -> Result<Self> {
        let site = Self::validate_site(site)?;

        let track = track.trim();
        if track.is_empty() || track.contains('/') {
            return Err(RudixError::Config(format!("Invalid release track '{track}'")));
        }

        let vendor = vendor.trim().trim_end_matches('.');
        if vendor.is_empty() {
            return Err(RudixError::Config("Vendor must not be empty".to_string()));
        }

        let platform = match platform {
            Some(platform) => normalize_platform(platform),
            None => detect_platform().unwrap_or_else(|| FALLBACK_PLATFORM.to_string()),
        };

        Ok(Self {
            site,
            track: track.to_string(),
            platform,
            vendor: vendor.to_string(),
            volume: volume.into(),
        })
    }

    /// Canonicalise the volume; it must be an existing directory.
    pub fn with_validated_volume(mut self) -> Result<Self> {
        self.volume = PathValidator::validate_volume(&self.volume)?;
        Ok(self)
    }

    pub fn source_identity(&self) -> SourceIdentity {
        SourceIdentity::new(&self.site, &self.track, &self.platform)
    }

    pub fn platform_codename(&self) -> Option<&'static str> {
        platform_codename(&self.platform)
    }

    fn validate_site(site: &str) -> Result<String> {
        let site = site.trim().trim_end_matches('/');
        let parsed = Url::parse(site)
            .map_err(|_| RudixError::Config(format!("Invalid site URL: {site}")))?;

        match parsed.scheme() {
            "https" | "http" | "file" => Ok(site.to_string()),
            scheme => Err(RudixError::Config(format!(
                "Unsupported site scheme: {scheme}"
            ))),
        }
    }
}

/// Reduce `10.12.6` to `10.12`.
pub fn normalize_platform(version: &str) -> String {
    let version = version.trim();
    if version.matches('.').count() >= 2 {
        if let Some((major_minor, _)) = version.rsplit_once('.') {
            return major_minor.to_string();
        }
    }
    version.to_string()
}

pub fn platform_codename(platform: &str) -> Option<&'static str> {
    CODENAMES
        .iter()
        .find(|(version, _)| *version == platform)
        .map(|(_, name)| *name)
}

/// Ask the host for its product version; `None` off macOS.
pub fn detect_platform() -> Option<String> {
    let output = Command::new("sw_vers")
        .arg("-productVersion")
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if version.is_empty() {
        None
    } else {
        Some(normalize_platform(&version))
    }
}
