use super::PackageQuery;
use crate::{
    error::Result,
    list::PackageList,
    types::{Dependency, Package},
};

/// Debian dependency-like condition, answered through the list's name index
#[derive(Debug)]
pub struct DependencyQuery {
    pub dep: Dependency,
}

/// A specific package version on a specific architecture
#[derive(Debug)]
pub struct PkgQuery {
    pub pkg: String,
    pub version: String,
    pub arch: String,
}

impl DependencyQuery {
    pub fn new(dep: Dependency) -> Self {
        DependencyQuery { dep }
    }
}

impl PkgQuery {
    pub fn new(pkg: &str, version: &str, arch: &str) -> Self {
        PkgQuery {
            pkg: pkg.to_owned(),
            version: version.to_owned(),
            arch: arch.to_owned(),
        }
    }

    fn key(&self) -> String {
        format!("{} {} {}", self.arch, self.pkg, self.version)
    }
}

impl PackageQuery for DependencyQuery {
    fn matches(&self, pkg: &Package) -> Result<bool> {
        pkg.matches_dependency(&self.dep)
    }

    fn fast(&self) -> bool {
        true
    }

    fn query(&self, list: &PackageList) -> Result<PackageList> {
        Ok(list.search(&self.dep)?.into_iter().collect())
    }
}

impl PackageQuery for PkgQuery {
    fn matches(&self, pkg: &Package) -> Result<bool> {
        Ok(pkg.name == self.pkg && pkg.version == self.version && pkg.architecture == self.arch)
    }

    fn fast(&self) -> bool {
        true
    }

    fn query(&self, list: &PackageList) -> Result<PackageList> {
        Ok(list.get(&self.key()).cloned().into_iter().collect())
    }
}
