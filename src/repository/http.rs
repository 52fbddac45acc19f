use crate::error::{Result, RudixError};
use crate::repository::{LineSource, Transport};
use indicatif::{ProgressBar, ProgressStyle};
use log::debug;
use reqwest::blocking::Client;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

const MAX_LISTING_BYTES: usize = 10 * 1024 * 1024;
const USER_AGENT: &str = concat!("rudix/", env!("CARGO_PKG_VERSION"));

/// Fetches the manifest and alias table over HTTP(S), or from `file://` mirrors.
pub struct HttpLineSource {
    client: Client,
}

impl HttpLineSource {
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: build_client(Some(Duration::from_secs(10)))?,
        })
    }

    fn fetch_text(&self, url: &str) -> Result<String> {
        debug!("Fetching: {url}");

        if let Some(path) = local_path(url)? {
            return Ok(fs::read_to_string(path)?);
        }

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| RudixError::Transport(format!("{url}: {e}")))?;

        if !response.status().is_success() {
            debug!("HTTP {}: {url}", response.status());
            return Err(RudixError::Transport(format!(
                "{url}: HTTP {}",
                response.status()
            )));
        }

        let text = response
            .text()
            .map_err(|e| RudixError::Transport(format!("{url}: {e}")))?;

        if text.len() > MAX_LISTING_BYTES {
            return Err(RudixError::Transport(format!(
                "{url}: response exceeded 10MB limit"
            )));
        }

        Ok(text)
    }
}

impl LineSource for HttpLineSource {
    fn fetch_lines(&self, url: &str) -> Result<Vec<String>> {
        let text = self.fetch_text(url)?;
        Ok(split_lines(&text))
    }
}

/// Downloads packages with a progress bar.
pub struct HttpTransport {
    client: Client,
    show_progress: bool,
}

impl HttpTransport {
    pub fn new(show_progress: bool) -> Result<Self> {
        // Package downloads can be large; no overall timeout.
        Ok(Self {
            client: build_client(None)?,
            show_progress,
        })
    }

    fn progress_bar(&self, length: Option<u64>) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        match length {
            Some(length) => {
                let pb = ProgressBar::new(length);
                pb.set_style(
                    ProgressStyle::default_bar()
                        .template("  [{bar:40}] {bytes}/{total_bytes} {msg}")
                        .unwrap_or_else(|_| ProgressStyle::default_bar())
                        .progress_chars("=>-"),
                );
                pb
            }
            None => ProgressBar::new_spinner(),
        }
    }

    fn fetch_into(&self, url: &str, destination: &Path) -> Result<()> {
        let mut response = self
            .client
            .get(url)
            .send()
            .map_err(|e| RudixError::Transport(format!("{url}: {e}")))?;

        if !response.status().is_success() {
            return Err(RudixError::Transport(format!(
                "{url}: HTTP {}",
                response.status()
            )));
        }

        let pb = self.progress_bar(response.content_length());
        if let Some(name) = destination.file_name() {
            pb.set_message(name.to_string_lossy().into_owned());
        }

        let mut file = File::create(destination)?;
        let mut writer = pb.wrap_write(&mut file);
        io::copy(&mut response, &mut writer)
            .map_err(|e| RudixError::Transport(format!("{url}: {e}")))?;
        writer.flush()?;
        pb.finish_and_clear();

        Ok(())
    }
}

impl Transport for HttpTransport {
    fn download(&self, url: &str, destination: &Path) -> Result<()> {
        debug!("Downloading {url} to {}", destination.display());

        if let Some(path) = local_path(url)? {
            fs::copy(&path, destination)?;
            return Ok(());
        }

        let result = self.fetch_into(url, destination);
        if result.is_err() && destination.exists() {
            let _ = fs::remove_file(destination);
        }
        result
    }
}

fn build_client(timeout: Option<Duration>) -> Result<Client> {
    let mut builder = Client::builder().user_agent(USER_AGENT);
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder
        .build()
        .map_err(|e| RudixError::Transport(e.to_string()))
}

/// Map `file://` URLs to a filesystem path.
fn local_path(url: &str) -> Result<Option<PathBuf>> {
    if !url.starts_with("file:") {
        return Ok(None);
    }

    let parsed = Url::parse(url).map_err(|e| RudixError::Transport(format!("{url}: {e}")))?;
    parsed
        .to_file_path()
        .map(Some)
        .map_err(|_| RudixError::Transport(format!("{url}: not a local path")))
}

fn split_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
