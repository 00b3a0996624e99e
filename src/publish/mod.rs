//! Rendering a snapshot as a signed Debian repository.
//!
//! Publishing is not atomic: a failure leaves whatever was written so far in
//! place, and every step is safe to repeat, so running the whole publish again
//! converges on the complete tree.

mod compress;
mod storage;

pub use storage::PublishedStorage;

use compress::compress_file;

use crate::{
    debug,
    error::{RepoError, Result},
    info,
    list::{PackageCollection, PackageList},
    signer::Signer,
    snapshot::Snapshot,
    types::{ChecksumInfo, Stanza},
    warn,
};

use chrono::Utc;
use rayon::prelude::*;
use std::{
    collections::BTreeMap,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    sync::Arc,
};

const DESCRIPTION: &str = "Generated by aptrepo";

/// A snapshot published under a prefix as one distribution/component
#[derive(Debug)]
pub struct PublishedRepo {
    // Prefix, distribution and component together should be unique
    // across all published repositories
    pub prefix: String,
    pub distribution: String,
    pub component: String,
    architectures: Option<Vec<String>>,
    snapshot: Arc<Snapshot>,
}

impl PublishedRepo {
    /// `architectures` of `None` means: use whatever the snapshot contains
    pub fn new(
        prefix: &str,
        distribution: &str,
        component: &str,
        architectures: Option<Vec<String>>,
        snapshot: Arc<Snapshot>,
    ) -> Self {
        PublishedRepo {
            prefix: prefix.to_owned(),
            distribution: distribution.to_owned(),
            component: component.to_owned(),
            architectures,
            snapshot,
        }
    }

    /// Architectures this repository is published for, empty until known
    pub fn architectures(&self) -> &[String] {
        self.architectures.as_deref().unwrap_or_default()
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Distribution directory relative to the storage root
    fn base_path(&self) -> PathBuf {
        Path::new(&self.prefix)
            .join("dists")
            .join(&self.distribution)
    }

    /// Link package files, generate Packages and Release files, sign them
    pub fn publish(
        &mut self,
        storage: &PublishedStorage,
        collection: &dyn PackageCollection,
        signer: &dyn Signer,
    ) -> Result<()> {
        let prefix = Path::new(&self.prefix);
        storage.mkdir(&prefix.join("pool"))?;
        let base_path = self.base_path();
        storage.mkdir(&base_path)?;

        debug!("Loading packages of snapshot {}", self.snapshot.name);
        let list = PackageList::from_ref_list(self.snapshot.ref_list(), collection)?;
        if list.is_empty() {
            return Err(RepoError::EmptyRepository);
        }

        let architectures = self
            .architectures
            .get_or_insert_with(|| list.architectures());
        // Every architecture owns its index files, so each must appear once
        architectures.sort_unstable();
        architectures.dedup();
        let architectures = architectures.clone();
        if architectures.is_empty() {
            return Err(RepoError::NoArchitectures);
        }

        // Architectures don't share any output file, so they can go in parallel
        let generated: BTreeMap<String, ChecksumInfo> = architectures
            .par_iter()
            .map(|arch| self.publish_architecture(storage, &list, arch))
            .collect::<Result<Vec<_>>>()?
            .into_iter()
            .flatten()
            .collect();

        let release = self.release_stanza(&architectures, &generated);
        let release_path = base_path.join("Release");
        debug!("Writing {}", release_path.display());
        let mut w = BufWriter::new(storage.create_file(&release_path)?);
        let write_err = |e| RepoError::io("unable to write Release file", e);
        release.write_to(&mut w).map_err(write_err)?;
        w.flush().map_err(write_err)?;
        drop(w);

        let release_file = storage.path(&release_path);
        let sign_err = |e: anyhow::Error| RepoError::Signing {
            path: release_file.clone(),
            reason: format!("{:#}", e),
        };
        signer
            .detached_sign(&release_file, &storage.path(&base_path.join("Release.gpg")))
            .map_err(sign_err)?;
        signer
            .clear_sign(&release_file, &storage.path(&base_path.join("InRelease")))
            .map_err(sign_err)?;

        info!(
            "Published {} packages of snapshot {} as {}/{} [{}]",
            list.len(),
            self.snapshot.name,
            self.prefix,
            self.distribution,
            architectures.join(", ")
        );
        Ok(())
    }

    /// Write `binary-<arch>/Packages` with its compressed variants,
    /// returning checksums keyed by path relative to the distribution
    fn publish_architecture(
        &self,
        storage: &PublishedStorage,
        list: &PackageList,
        arch: &str,
    ) -> Result<Vec<(String, ChecksumInfo)>> {
        let relative_path = format!("{}/binary-{}/Packages", self.component, arch);
        let base_path = self.base_path();
        let packages_path = base_path.join(&relative_path);
        if let Some(dir) = packages_path.parent() {
            storage.mkdir(dir)?;
        }

        debug!("Generating {}", packages_path.display());
        let prefix = Path::new(&self.prefix);
        let mut w = BufWriter::new(storage.create_file(&packages_path)?);
        let write_err = |e| RepoError::io(format!("unable to write {}", relative_path), e);
        let mut count = 0;
        for pkg in list.iter().filter(|pkg| pkg.matches_architecture(arch)) {
            let pool_path = pkg.pool_path(&self.component);
            storage.link_from_pool(pkg.file(), &prefix.join(&pool_path))?;

            pkg.stanza_with_filename(&pool_path)
                .write_to(&mut w)
                .map_err(write_err)?;
            w.write_all(b"\n").map_err(write_err)?;
            count += 1;
        }
        w.flush().map_err(write_err)?;
        drop(w);
        if count == 0 {
            warn!("No packages for architecture {}, {} is empty", arch, relative_path);
        } else {
            debug!("{} packages in {}", count, relative_path);
        }

        compress_file(&storage.path(&packages_path))?;

        let mut res = Vec::with_capacity(3);
        res.push((
            relative_path.clone(),
            storage.checksums_for_file(&packages_path)?,
        ));
        for ext in compress::EXTENSIONS {
            let path = format!("{}.{}", relative_path, ext);
            let info = storage.checksums_for_file(&base_path.join(&path))?;
            res.push((path, info));
        }
        Ok(res)
    }

    fn release_stanza(
        &self,
        architectures: &[String],
        generated: &BTreeMap<String, ChecksumInfo>,
    ) -> Stanza {
        let origin = format!("{} {}", self.prefix, self.distribution);
        let mut release = Stanza::new();
        release.set("Origin", origin.clone());
        release.set("Label", origin);
        release.set("Codename", self.distribution.clone());
        release.set(
            "Date",
            Utc::now().format("%a, %d %b %Y %H:%M:%S UTC").to_string(),
        );
        release.set("Components", self.component.clone());
        release.set("Architectures", architectures.join(" "));
        release.set("Description", DESCRIPTION);

        let (mut md5, mut sha1, mut sha256) = (String::new(), String::new(), String::new());
        for (path, info) in generated {
            md5.push_str(&format!("\n{} {:>8} {}", info.md5, info.size, path));
            sha1.push_str(&format!("\n{} {:>8} {}", info.sha1, info.size, path));
            sha256.push_str(&format!("\n{} {:>8} {}", info.sha256, info.size, path));
        }
        release.set("MD5Sum", md5);
        release.set("SHA1", sha1);
        release.set("SHA256", sha256);

        release
    }
}
