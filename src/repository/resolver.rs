use crate::package::{PackageDescriptor, VersionComparator};
use crate::repository::Catalogue;
use log::debug;

/// Resolves user-typed names against a catalogue.
///
/// Alias expansion is a single hop: the target of an alias is looked up as
/// a package name and is never expanded again.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    catalogue: &'a Catalogue,
}

impl<'a> Resolver<'a> {
    pub fn new(catalogue: &'a Catalogue) -> Self {
        Self { catalogue }
    }

    /// Substitute an alias with its target, or return the name unchanged.
    pub fn expand_alias<'n>(&self, name: &'n str) -> &'n str
    where
        'a: 'n,
    {
        match self.catalogue.alias(name) {
            Some(target) => {
                debug!("Alias '{name}' expands to '{target}'");
                target
            }
            None => name,
        }
    }

    /// Resolve a name, alias or exact package filename to one descriptor.
    ///
    /// Returns `None` when nothing in the catalogue matches.
    pub fn resolve(&self, input: &str) -> Option<&'a PackageDescriptor> {
        let name = self.expand_alias(input);

        if let Some(exact) = self.catalogue.find_exact(name) {
            return Some(exact);
        }

        self.latest(name)
    }

    /// Greatest version of a base name; the first in manifest order wins ties.
    pub fn latest(&self, base_name: &str) -> Option<&'a PackageDescriptor> {
        VersionComparator::latest_by(self.matching(base_name), |p| &p.version)
    }

    /// Every release of a base name, newest first, equal versions listed once.
    pub fn versions(&self, base_name: &str) -> Vec<&'a PackageDescriptor> {
        let mut versions: Vec<&'a PackageDescriptor> = Vec::new();
        for descriptor in self.matching(base_name) {
            if !versions.iter().any(|seen| seen.version == descriptor.version) {
                versions.push(descriptor);
            }
        }
        // Stable sort keeps manifest order among equals.
        versions.sort_by(|a, b| VersionComparator::compare(&b.version, &a.version));
        versions
    }

    fn matching(&self, base_name: &str) -> Vec<&'a PackageDescriptor> {
        self.catalogue
            .packages()
            .iter()
            .filter(|p| p.base_name == base_name)
            .collect()
    }
}
