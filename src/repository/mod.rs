use crate::error::Result;
use serde::Serialize;
use std::path::Path;

pub mod catalogue;
pub mod factory;
pub mod http;
pub mod resolver;

pub use catalogue::Catalogue;
pub use factory::RepositoryFactory;
pub use resolver::Resolver;

pub const MANIFEST_FILE: &str = "00MANIFEST.txt";
pub const ALIASES_FILE: &str = "00ALIASES.txt";

/// Where a catalogue comes from: site, release track and platform tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceIdentity {
    pub site: String,
    pub track: String,
    pub platform: String,
}

impl SourceIdentity {
    pub fn new(site: impl Into<String>, track: impl Into<String>, platform: impl Into<String>) -> Self {
        Self {
            site: site.into(),
            track: track.into(),
            platform: platform.into(),
        }
    }

    pub fn base_url(&self) -> String {
        format!("{}/{}", self.site.trim_end_matches('/'), self.track)
    }

    pub fn manifest_url(&self) -> String {
        format!("{}/{}", self.base_url(), MANIFEST_FILE)
    }

    pub fn aliases_url(&self) -> String {
        format!("{}/{}", self.base_url(), ALIASES_FILE)
    }

    pub fn package_url(&self, filename: &str) -> String {
        format!("{}/{}", self.base_url(), filename)
    }
}

/// Fetches a remote text resource as lines (manifest and alias table).
pub trait LineSource: Send + Sync {
    fn fetch_lines(&self, url: &str) -> Result<Vec<String>>;
}

/// Materializes a remote package into a local file.
pub trait Transport: Send + Sync {
    fn download(&self, url: &str, destination: &Path) -> Result<()>;
}
