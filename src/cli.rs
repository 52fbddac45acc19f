use crate::config::{DEFAULT_SITE, DEFAULT_TRACK, DEFAULT_VENDOR, DEFAULT_VOLUME};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "rudix",
    about = "Rudix Package Manager - install, update and remove Rudix packages",
    version,
    author
)]
pub struct Cli {
    /// Display more information when available
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Volume packages are installed on
    #[arg(long, env = "VOLUME", default_value = DEFAULT_VOLUME, global = true)]
    pub volume: PathBuf,

    /// Package id namespace of Rudix packages
    #[arg(long, env = "VENDOR", default_value = DEFAULT_VENDOR, global = true)]
    pub vendor: String,

    /// Remote site hosting the package tracks
    #[arg(long, env = "RUDIX_SITE", default_value = DEFAULT_SITE, global = true)]
    pub site: String,

    /// Release track on the remote site
    #[arg(long, env = "RUDIX_VERSION", default_value = DEFAULT_TRACK, global = true)]
    pub track: String,

    /// OS X version to use instead of the detected one
    #[arg(long, env = "OSX_VERSION", global = true)]
    pub platform: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// List all packages installed
    List,

    /// Show information about installed packages
    #[command(visible_alias = "show")]
    Info {
        /// Packages to show (all installed when omitted)
        packages: Vec<String>,
    },

    /// Show the files of installed packages
    #[command(visible_alias = "content")]
    Files {
        #[arg(required = true)]
        packages: Vec<String>,
    },

    /// Install local or remote packages
    Install {
        /// Package names, aliases, package filenames or paths to .pkg files
        #[arg(required = true)]
        packages: Vec<String>,
    },

    /// Download packages but do not install them
    Download {
        #[arg(required = true)]
        packages: Vec<String>,
    },

    /// Update all installed packages
    #[command(visible_alias = "upgrade")]
    Update {
        /// Show the update plan without installing anything
        #[arg(long)]
        dry_run: bool,

        /// Print the update plan as JSON (implies --dry-run)
        #[arg(long)]
        json: bool,
    },

    /// Remove (uninstall) packages
    #[command(visible_alias = "uninstall")]
    Remove {
        #[arg(required = true)]
        packages: Vec<String>,
    },

    /// Remove (uninstall) ALL packages
    #[command(name = "remove-all", visible_alias = "uninstall-all")]
    RemoveAll {
        /// Do not ask for confirmation
        #[arg(long)]
        force: bool,
    },

    /// Show repository status
    Status,

    /// Search for remote packages
    Search {
        /// Names or aliases to search (all packages when omitted)
        names: Vec<String>,
    },

    /// Search for paths in all installed packages
    #[command(name = "search-path")]
    SearchPath {
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// List aliases
    Alias {
        /// Aliases to look up (all when omitted)
        names: Vec<String>,
    },

    /// Output installed packages in package file format
    Freeze,
}

impl Commands {
    /// Commands that change installed packages need administrator rights.
    pub fn requires_administrator(&self) -> bool {
        match self {
            Commands::Install { .. } | Commands::Remove { .. } | Commands::RemoveAll { .. } => true,
            Commands::Update { dry_run, json } => !dry_run && !json,
            _ => false,
        }
    }
}
