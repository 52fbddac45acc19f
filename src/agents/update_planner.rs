use crate::agents::local_packages::InstalledPackage;
use crate::package::{PackageDescriptor, VersionComparator};
use crate::repository::{Catalogue, Resolver};
use serde::Serialize;

/// An installed package paired with the newer release that replaces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateCandidate {
    pub local: InstalledPackage,
    pub remote: PackageDescriptor,
}

/// Per-package outcome of comparing an install against the catalogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assessment<'a> {
    NotInCatalogue,
    UnknownLocalVersion,
    UpToDate(&'a PackageDescriptor),
    NewVersion(&'a PackageDescriptor),
}

/// Diffs installed packages against a catalogue.
pub struct UpdatePlanner<'a> {
    resolver: Resolver<'a>,
}

impl<'a> UpdatePlanner<'a> {
    pub fn new(catalogue: &'a Catalogue) -> Self {
        Self {
            resolver: Resolver::new(catalogue),
        }
    }

    /// Only releases of the same base name qualify; aliases are not expanded.
    pub fn assess(&self, local: &InstalledPackage) -> Assessment<'a> {
        let Some(remote) = self.resolver.latest(&local.base_name) else {
            return Assessment::NotInCatalogue;
        };

        let Some(local_version) = &local.version else {
            return Assessment::UnknownLocalVersion;
        };

        if VersionComparator::is_newer(&remote.version, local_version) {
            Assessment::NewVersion(remote)
        } else {
            Assessment::UpToDate(remote)
        }
    }

    /// Candidates whose remote version is strictly newer, in `installed` order.
    pub fn plan(&self, installed: &[InstalledPackage]) -> Vec<UpdateCandidate> {
        installed
            .iter()
            .filter_map(|local| match self.assess(local) {
                Assessment::NewVersion(remote) => Some(UpdateCandidate {
                    local: local.clone(),
                    remote: remote.clone(),
                }),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::local_packages::PackageInfo;
    use crate::repository::SourceIdentity;

    const VENDOR: &str = "org.rudix.pkg";

    fn catalogue(manifest: &[&str]) -> Catalogue {
        let manifest: Vec<String> = manifest.iter().map(|s| s.to_string()).collect();
        Catalogue::build(
            SourceIdentity::new("https://example.com", "master", "10.12"),
            || Ok(manifest),
            || Ok(vec!["get->wget".to_string()]),
        )
        .unwrap()
    }

    fn installed(name: &str, version: Option<&str>) -> InstalledPackage {
        let info = PackageInfo {
            version: version.map(str::to_string),
            install_time: None,
        };
        InstalledPackage::new(&format!("{VENDOR}.{name}"), VENDOR, &info)
    }

    #[test]
    fn equal_version_produces_no_candidate() {
        let catalogue = catalogue(&["foo-1.0.pkg", "foo-2.0.pkg"]);
        let planner = UpdatePlanner::new(&catalogue);
        assert!(planner.plan(&[installed("foo", Some("2.0"))]).is_empty());
        assert!(planner.plan(&[installed("foo", Some("2.0-0"))]).is_empty());
    }

    #[test]
    fn older_version_produces_candidate() {
        let catalogue = catalogue(&["foo-1.0.pkg", "foo-2.0.pkg"]);
        let planner = UpdatePlanner::new(&catalogue);
        let plan = planner.plan(&[installed("foo", Some("1.0"))]);
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].remote.raw_filename, "foo-2.0.pkg");
        assert_eq!(plan[0].local.version_label(), "1.0");
    }

    #[test]
    fn newer_local_version_produces_no_candidate() {
        let catalogue = catalogue(&["foo-2.0.pkg"]);
        let planner = UpdatePlanner::new(&catalogue);
        assert!(planner.plan(&[installed("foo", Some("3.0"))]).is_empty());
    }

    #[test]
    fn revision_bump_is_an_update() {
        let catalogue = catalogue(&["foo-2.0-1.pkg"]);
        let planner = UpdatePlanner::new(&catalogue);
        assert_eq!(planner.plan(&[installed("foo", Some("2.0"))]).len(), 1);
    }

    #[test]
    fn alias_named_like_installed_package_is_ignored() {
        let manifest: Vec<String> = vec!["python-2.7.13.pkg".into(), "python3-3.6.1.pkg".into()];
        let catalogue = Catalogue::build(
            SourceIdentity::new("https://example.com", "master", "10.12"),
            || Ok(manifest),
            || Ok(vec!["python->python3".to_string()]),
        )
        .unwrap();
        let planner = UpdatePlanner::new(&catalogue);

        let python = installed("python", Some("2.7.13"));
        assert!(planner.plan(std::slice::from_ref(&python)).is_empty());
        match planner.assess(&python) {
            Assessment::UpToDate(remote) => assert_eq!(remote.raw_filename, "python-2.7.13.pkg"),
            other => panic!("unexpected assessment: {other:?}"),
        }
    }

    #[test]
    fn package_only_reachable_by_alias_is_not_in_catalogue() {
        let catalogue = catalogue(&["wget-1.20.pkg"]);
        let planner = UpdatePlanner::new(&catalogue);
        assert_eq!(
            planner.assess(&installed("get", Some("1.0"))),
            Assessment::NotInCatalogue
        );
    }

    #[test]
    fn plan_preserves_installed_order() {
        let catalogue = catalogue(&["zlib-1.3.pkg", "bzip2-1.0.8.pkg", "wget-1.20.pkg"]);
        let planner = UpdatePlanner::new(&catalogue);
        let packages = vec![
            installed("zlib", Some("1.2")),
            installed("absent", Some("0.1")),
            installed("wget", Some("1.20")),
            installed("bzip2", Some("1.0.6")),
        ];
        let names: Vec<String> = planner
            .plan(&packages)
            .into_iter()
            .map(|c| c.local.base_name)
            .collect();
        assert_eq!(names, vec!["zlib", "bzip2"]);
    }

    #[test]
    fn plan_is_idempotent() {
        let catalogue = catalogue(&["foo-2.0.pkg", "bar-1.1.pkg"]);
        let planner = UpdatePlanner::new(&catalogue);
        let packages = vec![installed("foo", Some("1.0")), installed("bar", Some("1.0"))];
        assert_eq!(planner.plan(&packages), planner.plan(&packages));
    }

    #[test]
    fn assess_reports_each_outcome() {
        let catalogue = catalogue(&["foo-2.0.pkg"]);
        let planner = UpdatePlanner::new(&catalogue);
        assert_eq!(
            planner.assess(&installed("missing", Some("1.0"))),
            Assessment::NotInCatalogue
        );
        assert_eq!(
            planner.assess(&installed("foo", None)),
            Assessment::UnknownLocalVersion
        );
        assert!(matches!(
            planner.assess(&installed("foo", Some("2.0"))),
            Assessment::UpToDate(_)
        ));
        assert!(matches!(
            planner.assess(&installed("foo", Some("1.0"))),
            Assessment::NewVersion(_)
        ));
    }
}
