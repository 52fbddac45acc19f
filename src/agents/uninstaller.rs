use crate::agents::local_packages::PackageDatabase;
use crate::error::Result;
use crate::utils::PathValidator;
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Counts of what an uninstall touched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UninstallReport {
    pub removed_files: usize,
    pub removed_dirs: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Removes a package's files from the volume, then forgets its receipt.
pub struct Uninstaller<'a> {
    db: &'a dyn PackageDatabase,
    volume: PathBuf,
    verbose: bool,
}

impl<'a> Uninstaller<'a> {
    pub fn new(db: &'a dyn PackageDatabase, volume: impl AsRef<Path>, verbose: bool) -> Self {
        Self {
            db,
            volume: volume.as_ref().to_path_buf(),
            verbose,
        }
    }

    pub fn uninstall(&self, package_id: &str) -> Result<UninstallReport> {
        let mut report = UninstallReport::default();
        let mut dirs = Vec::new();

        for path in self.db.list_files(package_id, &self.volume)? {
            if PathValidator::is_protected(&path, &self.volume) {
                self.say(format!("Skipping '{}'", path.display()));
                report.skipped += 1;
                continue;
            }

            // symlink_metadata: a link to a directory is removed as a file.
            let metadata = match fs::symlink_metadata(&path) {
                Ok(metadata) => metadata,
                Err(e) => {
                    debug!("Already gone '{}': {e}", path.display());
                    continue;
                }
            };

            if metadata.is_dir() {
                dirs.push(path);
                continue;
            }

            self.say(format!("Removing '{}'", path.display()));
            match fs::remove_file(&path) {
                Ok(()) => report.removed_files += 1,
                Err(e) => {
                    warn!("Could not remove '{}': {e}", path.display());
                    report.failed += 1;
                }
            }
        }

        // Deepest first, so children go before their parents.
        dirs.sort_by_key(|dir| std::cmp::Reverse(dir.components().count()));
        for dir in dirs {
            self.say(format!("Removing directory '{}'", dir.display()));
            match fs::remove_dir(&dir) {
                Ok(()) => report.removed_dirs += 1,
                Err(e) => {
                    // Shared directories still holding other files stay.
                    debug!("Keeping directory '{}': {e}", dir.display());
                    report.skipped += 1;
                }
            }
        }

        self.db.forget(package_id, &self.volume)?;
        Ok(report)
    }

    fn say(&self, message: String) {
        if self.verbose {
            println!("{message}");
        } else {
            debug!("{message}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::local_packages::PackageInfo;
    use std::sync::Mutex;
    use tempfile::tempdir;

    struct FakeDatabase {
        files: Vec<PathBuf>,
        forgotten: Mutex<Vec<String>>,
    }

    impl PackageDatabase for FakeDatabase {
        fn list_installed(&self, _volume: &Path, _vendor: &str) -> Result<Vec<String>> {
            Ok(Vec::new())
        }

        fn query_info(&self, _package_id: &str, _volume: &Path) -> Result<Option<PackageInfo>> {
            Ok(None)
        }

        fn list_files(&self, _package_id: &str, _volume: &Path) -> Result<Vec<PathBuf>> {
            Ok(self.files.clone())
        }

        fn forget(&self, package_id: &str, _volume: &Path) -> Result<()> {
            self.forgotten.lock().unwrap().push(package_id.to_string());
            Ok(())
        }

        fn search_path(&self, _path: &str, _volume: &Path) -> Result<Vec<String>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn removes_files_and_empty_dirs_but_keeps_protected_paths() {
        let volume = tempdir().unwrap();
        let root = volume.path();
        let bin = root.join("usr/local/bin");
        let doc = root.join("usr/local/share/doc/wget");
        fs::create_dir_all(&bin).unwrap();
        fs::create_dir_all(&doc).unwrap();
        fs::write(bin.join("wget"), "bin").unwrap();
        fs::write(bin.join("other-tool"), "keep").unwrap();
        fs::write(doc.join("README"), "doc").unwrap();

        let db = FakeDatabase {
            files: vec![
                root.to_path_buf(),
                root.join("usr/local"),
                bin.clone(),
                bin.join("wget"),
                root.join("usr/local/share/doc"),
                doc.clone(),
                doc.join("README"),
                root.join("usr/local/bin/missing"),
            ],
            forgotten: Mutex::new(Vec::new()),
        };

        let report = Uninstaller::new(&db, root, false)
            .uninstall("org.rudix.pkg.wget")
            .unwrap();

        assert!(!bin.join("wget").exists());
        assert!(bin.join("other-tool").exists());
        assert!(!doc.exists());
        assert!(root.join("usr/local/share/doc").exists());
        assert_eq!(report.removed_files, 2);
        assert_eq!(report.removed_dirs, 1);
        assert_eq!(report.failed, 0);
        assert_eq!(*db.forgotten.lock().unwrap(), vec!["org.rudix.pkg.wget"]);
    }

    #[test]
    fn non_empty_directories_are_left_in_place() {
        let volume = tempdir().unwrap();
        let root = volume.path();
        let shared = root.join("opt/shared");
        fs::create_dir_all(&shared).unwrap();
        fs::write(shared.join("from-another-package"), "x").unwrap();

        let db = FakeDatabase {
            files: vec![shared.clone()],
            forgotten: Mutex::new(Vec::new()),
        };

        let report = Uninstaller::new(&db, root, false).uninstall("pkg").unwrap();
        assert!(shared.exists());
        assert_eq!(report.removed_dirs, 0);
        assert_eq!(report.skipped, 1);
    }
}
