use crate::error::{Result, RudixError};
use log::debug;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Installs a package file and registers it in the package database.
pub trait Installer: Send + Sync {
    fn install(&self, package_file: &Path, volume: &Path, verbose: bool) -> Result<()>;
}

/// Runs the native `installer` program.
pub struct SystemInstaller {
    program: PathBuf,
}

impl SystemInstaller {
    pub fn new() -> Self {
        Self::with_program("installer")
    }

    pub fn with_program<P: AsRef<Path>>(program: P) -> Self {
        Self {
            program: program.as_ref().to_path_buf(),
        }
    }

    fn arguments(package_file: &Path, volume: &Path, verbose: bool) -> Vec<String> {
        let mut args = Vec::new();
        if verbose {
            args.push("-verbose".to_string());
        }
        args.extend([
            "-pkg".to_string(),
            package_file.to_string_lossy().into_owned(),
            "-target".to_string(),
            volume.to_string_lossy().into_owned(),
        ]);
        args
    }
}

impl Default for SystemInstaller {
    fn default() -> Self {
        Self::new()
    }
}

impl Installer for SystemInstaller {
    /// Execute the installer with live output streaming
    fn install(&self, package_file: &Path, volume: &Path, verbose: bool) -> Result<()> {
        let args = Self::arguments(package_file, volume, verbose);
        debug!("Executing: {} {}", self.program.display(), args.join(" "));

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| RudixError::Installer(format!("Failed to spawn process: {}", e)))?;

        // Stream stdout
        if let Some(stdout) = child.stdout.take() {
            let reader = BufReader::new(stdout);
            for line in reader.lines().map_while(std::result::Result::ok) {
                println!("{}", line);
            }
        }

        let status = child
            .wait()
            .map_err(|e| RudixError::Installer(format!("Failed to wait for process: {}", e)))?;

        if !status.success() {
            return Err(RudixError::Installer(format!(
                "installer failed for '{}' with exit code: {}",
                package_file.display(),
                status.code().unwrap_or(-1)
            )));
        }

        Ok(())
    }
}
