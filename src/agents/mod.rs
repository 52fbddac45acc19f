pub mod confirmation;
pub mod installer;
pub mod local_packages;
pub mod uninstaller;
pub mod update_planner;

pub use confirmation::Confirmation;
pub use installer::{Installer, SystemInstaller};
pub use local_packages::{InstalledPackage, PackageDatabase, Pkgutil, load_installed};
pub use uninstaller::Uninstaller;
pub use update_planner::{Assessment, UpdateCandidate, UpdatePlanner};
