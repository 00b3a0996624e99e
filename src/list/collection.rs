use super::{import_packages, PackageList};
use crate::{
    error::{RepoError, Result},
    types::Package,
};

use std::{fs::File, path::Path, sync::Arc};

/// Where packages named by a snapshot are resolved from
pub trait PackageCollection {
    /// Get the package with the given `architecture name version` key
    fn by_key(&self, key: &str) -> Result<Arc<Package>>;
}

/// A package collection held entirely in memory
#[derive(Debug, Default)]
pub struct InMemoryCollection {
    list: PackageList,
}

impl InMemoryCollection {
    pub fn new() -> Self {
        InMemoryCollection::default()
    }

    /// Load a Packages index. `Filename` entries are relative to `storage_root`.
    pub fn from_packages_file(index: &Path, storage_root: &Path) -> Result<Self> {
        let f = File::open(index)
            .map_err(|e| RepoError::io(format!("unable to open {}", index.display()), e))?;
        let mut res = InMemoryCollection::new();
        for pkg in import_packages(f, storage_root)? {
            res.add(pkg)?;
        }
        Ok(res)
    }

    pub fn add(&mut self, pkg: Package) -> Result<()> {
        self.list.add(Arc::new(pkg))
    }

    pub fn list(&self) -> &PackageList {
        &self.list
    }
}

impl PackageCollection for InMemoryCollection {
    fn by_key(&self, key: &str) -> Result<Arc<Package>> {
        self.list
            .get(key)
            .cloned()
            .ok_or_else(|| RepoError::UnresolvedReference(key.to_owned()))
    }
}
