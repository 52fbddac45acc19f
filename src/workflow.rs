use crate::agents::{
    Assessment, Confirmation, InstalledPackage, Installer, PackageDatabase, Pkgutil,
    SystemInstaller, UpdateCandidate, UpdatePlanner, Uninstaller, load_installed,
};
use crate::config::Config;
use crate::error::Result;
use crate::package::{PackageDescriptor, canonical_id};
use crate::repository::{Catalogue, LineSource, RepositoryFactory, Resolver, Transport};
use colored::Colorize;
use log::warn;
use std::path::Path;
use std::sync::Arc;

/// Outcome of a command that did not fail outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    Success,
    /// At least one argument matched nothing (not found, not installed).
    NoMatch,
}

impl CommandStatus {
    pub fn exit_code(self) -> i32 {
        match self {
            CommandStatus::Success => 0,
            CommandStatus::NoMatch => 1,
        }
    }

    fn and(self, other: CommandStatus) -> CommandStatus {
        if self == CommandStatus::NoMatch || other == CommandStatus::NoMatch {
            CommandStatus::NoMatch
        } else {
            CommandStatus::Success
        }
    }
}

/// External programs and services a session talks to.
pub struct Collaborators {
    pub lines: Arc<dyn LineSource>,
    pub transport: Arc<dyn Transport>,
    pub db: Arc<dyn PackageDatabase>,
    pub installer: Arc<dyn Installer>,
}

impl Collaborators {
    pub fn system() -> Result<Self> {
        Ok(Self {
            lines: RepositoryFactory::create_line_source()?,
            transport: RepositoryFactory::create_transport(true)?,
            db: Arc::new(Pkgutil::new()),
            installer: Arc::new(SystemInstaller::new()),
        })
    }
}

/// One invocation: configuration plus collaborators.
pub struct Session {
    config: Config,
    verbose: bool,
    clients: Collaborators,
}

impl Session {
    pub fn new(config: Config, verbose: bool) -> Result<Self> {
        Ok(Self::with_clients(config, verbose, Collaborators::system()?))
    }

    pub fn with_clients(config: Config, verbose: bool, clients: Collaborators) -> Self {
        Self {
            config,
            verbose,
            clients,
        }
    }

    fn sync(&self) -> Result<Catalogue> {
        Ok(Catalogue::sync(
            self.config.source_identity(),
            self.clients.lines.as_ref(),
        )?)
    }

    /// Sync for commands that can still work on local files without a catalogue.
    fn try_sync(&self) -> Option<Catalogue> {
        match self.sync() {
            Ok(catalogue) => Some(catalogue),
            Err(e) => {
                eprintln!("{}", e.to_string().red());
                None
            }
        }
    }

    fn installed(&self) -> Result<Vec<InstalledPackage>> {
        load_installed(self.clients.db.as_ref(), &self.config)
    }

    fn installed_ids(&self) -> Result<Vec<String>> {
        self.clients
            .db
            .list_installed(&self.config.volume, &self.config.vendor)
    }

    fn package_id(&self, name: &str) -> String {
        canonical_id(name, &self.config.vendor)
    }

    /// Download a remote package to a temporary file and install it.
    fn install_remote(&self, catalogue: &Catalogue, descriptor: &PackageDescriptor) -> Result<()> {
        let url = catalogue.source().package_url(&descriptor.raw_filename);
        let staged = tempfile::Builder::new()
            .prefix("rudix-")
            .suffix(&format!("-{}", descriptor.raw_filename))
            .tempfile()?;

        self.clients.transport.download(&url, staged.path())?;
        self.clients
            .installer
            .install(staged.path(), &self.config.volume, self.verbose)?;
        staged.close()?;
        Ok(())
    }
}

fn resolve_announced<'a>(resolver: &Resolver<'a>, name: &str) -> Option<&'a PackageDescriptor> {
    let target = resolver.expand_alias(name);
    if target != name {
        println!("Using '{}'", target.cyan());
    }
    resolver.resolve(name)
}

fn report_no_match(name: &str) -> CommandStatus {
    eprintln!("{}", format!("No match for '{}'", name).red());
    CommandStatus::NoMatch
}

fn report_not_installed(package_id: &str) -> CommandStatus {
    eprintln!(
        "{}",
        format!("Package '{}' is not installed", package_id).red()
    );
    CommandStatus::NoMatch
}

/// List aliases, all of them or the requested ones
pub fn execute_alias(session: &Session, names: &[String]) -> Result<CommandStatus> {
    let catalogue = session.sync()?;

    if names.is_empty() {
        for (alias, target) in catalogue.aliases() {
            println!("{}->{}", alias, target);
        }
        return Ok(CommandStatus::Success);
    }

    let mut status = CommandStatus::Success;
    for name in names {
        match catalogue.alias(name) {
            Some(target) => println!("{}->{}", name, target),
            None => {
                eprintln!("{}", format!("{}: Not found!", name).red());
                status = CommandStatus::NoMatch;
            }
        }
    }
    Ok(status)
}

/// List all available packages, or every version of the requested ones
pub fn execute_search(session: &Session, names: &[String]) -> Result<CommandStatus> {
    let catalogue = session.sync()?;

    if names.is_empty() {
        for package in catalogue.packages() {
            println!("{}", package);
        }
        return Ok(CommandStatus::Success);
    }

    let resolver = Resolver::new(&catalogue);
    let mut status = CommandStatus::Success;
    for name in names {
        let target = resolver.expand_alias(name);
        if target != name.as_str() {
            println!("Using '{}'", target.cyan());
        }

        let versions = resolver.versions(target);
        if versions.is_empty() {
            status = status.and(report_no_match(target));
            continue;
        }
        for package in versions {
            println!("{}", package);
        }
    }
    Ok(status)
}

/// List all installed packages
pub fn execute_list(session: &Session) -> Result<CommandStatus> {
    let ids = session.installed_ids()?;
    if ids.is_empty() {
        eprintln!("{}", "No Rudix packages installed.".yellow());
        return Ok(CommandStatus::NoMatch);
    }

    for id in &ids {
        if !session.verbose {
            println!("{}", id);
            continue;
        }

        match session.clients.db.query_info(id, &session.config.volume)? {
            Some(info) => {
                let package = InstalledPackage::new(id, &session.config.vendor, &info);
                println!(
                    "{} version {} (install: {})",
                    id.white().bold(),
                    package.version_label(),
                    package.install_date_label().dimmed()
                );
            }
            None => println!("{}", id),
        }
    }
    Ok(CommandStatus::Success)
}

/// Show information about installed packages
pub fn execute_info(session: &Session, names: &[String]) -> Result<CommandStatus> {
    let ids = if names.is_empty() {
        session.installed_ids()?
    } else {
        names.iter().map(|name| session.package_id(name)).collect()
    };

    let mut status = CommandStatus::Success;
    for id in ids {
        let Some(info) = session.clients.db.query_info(&id, &session.config.volume)? else {
            status = status.and(report_not_installed(&id));
            continue;
        };

        let package = InstalledPackage::new(&id, &session.config.vendor, &info);
        println!("---");
        println!("Name: {}", package.base_name.white().bold());
        println!("Version: {}", package.version_label());
        println!("Install date: {}", package.install_date_label());
        if session.verbose {
            println!("Package-id: {}", package.package_id);
            println!("Package: {}", package.package_filename());
        }
    }
    Ok(status)
}

/// Show the files of installed packages
pub fn execute_files(session: &Session, names: &[String]) -> Result<CommandStatus> {
    let volume = &session.config.volume;
    let mut status = CommandStatus::Success;

    for name in names {
        let id = session.package_id(name);
        if session.clients.db.query_info(&id, volume)?.is_none() {
            status = status.and(report_not_installed(&id));
            continue;
        }

        println!(
            "{}",
            format!("Package '{}' on volume '{}'", id, volume.display()).cyan()
        );
        for path in session.clients.db.list_files(&id, volume)? {
            if path.is_dir() && !session.verbose {
                continue;
            }
            println!("{}", path.display());
        }
    }
    Ok(status)
}

/// Download remote packages into `destination` without installing them
pub fn execute_download(
    session: &Session,
    names: &[String],
    destination: &Path,
) -> Result<CommandStatus> {
    let catalogue = session.try_sync();
    let mut status = CommandStatus::Success;

    for name in names {
        if Path::new(name).is_file() {
            println!("Found package '{}'", name);
            continue;
        }

        let Some(catalogue) = catalogue.as_ref() else {
            status = status.and(report_no_match(name));
            continue;
        };

        let resolver = Resolver::new(catalogue);
        let Some(descriptor) = resolve_announced(&resolver, name) else {
            status = status.and(report_no_match(name));
            continue;
        };

        println!("Downloading {}...", descriptor.raw_filename.cyan());
        let url = catalogue.source().package_url(&descriptor.raw_filename);
        session
            .clients
            .transport
            .download(&url, &destination.join(&descriptor.raw_filename))?;
    }
    Ok(status)
}

/// Install packages from the file system or the remote catalogue
pub fn execute_install(session: &Session, names: &[String]) -> Result<CommandStatus> {
    let catalogue = session.try_sync();
    let mut status = CommandStatus::Success;

    for name in names {
        let path = Path::new(name);
        if path.is_file() {
            println!("Found package '{}'", name);
            session
                .clients
                .installer
                .install(path, &session.config.volume, session.verbose)?;
            continue;
        }

        let Some(catalogue) = catalogue.as_ref() else {
            status = status.and(report_no_match(name));
            continue;
        };

        let resolver = Resolver::new(catalogue);
        let Some(descriptor) = resolve_announced(&resolver, name) else {
            status = status.and(report_no_match(name));
            continue;
        };

        println!("Downloading {}...", descriptor.raw_filename.cyan());
        session.install_remote(catalogue, descriptor)?;
        println!("{}", format!("✓ Installed {}", descriptor.raw_filename).green());
    }
    Ok(status)
}

/// Update every installed package that has a newer release
pub fn execute_update(session: &Session, dry_run: bool, json: bool) -> Result<CommandStatus> {
    let installed = session.installed()?;
    let catalogue = session.sync()?;
    let planner = UpdatePlanner::new(&catalogue);

    if session.verbose && !json {
        for local in &installed {
            print_assessment(local, &planner.assess(local));
        }
    }

    let plan = planner.plan(&installed);

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(CommandStatus::Success);
    }

    if plan.is_empty() {
        println!("{}", "All packages are up to date".green());
        return Ok(CommandStatus::Success);
    }

    print_plan(&plan);

    if dry_run {
        println!("\n{}", "To apply these updates, run:".dimmed());
        println!("  {}", "rudix update".cyan());
        return Ok(CommandStatus::Success);
    }

    let total = plan.len();
    for (index, candidate) in plan.iter().enumerate() {
        println!(
            "[{}/{}] Downloading {}...",
            index + 1,
            total,
            candidate.remote.raw_filename.cyan()
        );
        session.install_remote(&catalogue, &candidate.remote)?;
    }

    println!(
        "\n{}",
        format!("✨ {} package(s) updated", total).green().bold()
    );
    Ok(CommandStatus::Success)
}

fn print_assessment(local: &InstalledPackage, assessment: &Assessment<'_>) {
    let outcome = match assessment {
        Assessment::NotInCatalogue => "No updates available".dimmed(),
        Assessment::UnknownLocalVersion => "Installed version unknown".yellow(),
        Assessment::UpToDate(_) => "Already in the latest version".dimmed(),
        Assessment::NewVersion(_) => "New version available".green(),
    };
    println!("Processing package {}: {}", local.base_name, outcome);
}

fn print_plan(plan: &[UpdateCandidate]) {
    for candidate in plan {
        println!(
            "{:25} {:10} will be updated to version {}",
            candidate.local.base_name,
            candidate.local.version_label(),
            candidate.remote.version.to_string().green().bold()
        );
    }
}

/// Remove (uninstall) installed packages
pub fn execute_remove(session: &Session, names: &[String]) -> Result<CommandStatus> {
    let volume = &session.config.volume;
    let uninstaller = Uninstaller::new(session.clients.db.as_ref(), volume, session.verbose);
    let mut status = CommandStatus::Success;

    for name in names {
        let id = session.package_id(name);
        if session.clients.db.query_info(&id, volume)?.is_none() {
            status = status.and(report_not_installed(&id));
            continue;
        }

        let report = uninstaller.uninstall(&id)?;
        println!(
            "{}",
            format!(
                "✓ Removed {} ({} file(s), {} directorie(s))",
                id, report.removed_files, report.removed_dirs
            )
            .green()
        );
        if report.failed > 0 {
            warn!("{} file(s) of {} could not be removed", report.failed, id);
        }
    }
    Ok(status)
}

/// Remove (uninstall) every installed package
pub fn execute_remove_all(session: &Session, force: bool) -> Result<CommandStatus> {
    let confirmation = Confirmation::new(!force);
    if !confirmation.confirm("Using this option will remove *ALL* Rudix packages!")? {
        println!("Great!");
        return Ok(CommandStatus::Success);
    }

    println!("{}", "Removing package(s)...".yellow());
    let uninstaller = Uninstaller::new(
        session.clients.db.as_ref(),
        &session.config.volume,
        session.verbose,
    );
    let mut status = CommandStatus::Success;
    for id in session.installed_ids()? {
        if let Err(e) = uninstaller.uninstall(&id) {
            warn!("Failed to remove {id}: {e}");
            eprintln!("{}", format!("Could not remove '{}': {}", id, e).red());
            status = CommandStatus::NoMatch;
        }
    }

    if status == CommandStatus::Success {
        println!("Cry a little tear, because Rudix is not on this machine anymore...");
    }
    Ok(status)
}

/// Show local and remote repository status
pub fn execute_status(session: &Session) -> Result<CommandStatus> {
    let config = &session.config;
    println!(
        "{}",
        format!(
            "Rudix {} on OS X {} ({})",
            config.track,
            config.platform,
            config.platform_codename().unwrap_or("?")
        )
        .cyan()
        .bold()
    );

    let installed = session.installed_ids()?.len();
    println!(
        "{} package(s) installed on volume '{}'",
        installed,
        config.volume.display()
    );

    let catalogue = session.sync()?;
    println!("{}", catalogue);
    if session.verbose && !catalogue.aliases().is_empty() {
        println!("{} alias(es)", catalogue.aliases().len());
    }
    Ok(CommandStatus::Success)
}

/// Find which installed packages own the given paths
pub fn execute_search_path(session: &Session, paths: &[String]) -> Result<CommandStatus> {
    let mut status = CommandStatus::Success;
    for path in paths {
        let owners = session
            .clients
            .db
            .search_path(path, &session.config.volume)?;
        if owners.is_empty() {
            status = status.and(report_no_match(path));
        } else {
            println!("{}: {}", path, owners.join(" "));
        }
    }
    Ok(status)
}

/// Output installed packages in package file format
pub fn execute_freeze(session: &Session) -> Result<CommandStatus> {
    for package in session.installed()? {
        println!("{}", package.package_filename());
    }
    Ok(CommandStatus::Success)
}
