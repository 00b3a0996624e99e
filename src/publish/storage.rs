use crate::{
    debug,
    error::{RepoError, Result},
    types::{ChecksumInfo, PackageFile},
};

use std::{
    fs::{self, File},
    io,
    path::{Component, Path, PathBuf},
};

/// The public directory published repositories are rendered into.
/// All paths taken by its methods are relative to the root.
#[derive(Debug, Clone)]
pub struct PublishedStorage {
    root: PathBuf,
}

impl PublishedStorage {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        PublishedStorage { root: root.into() }
    }

    /// Absolute path of a file in storage.
    /// Leading `/` and `..` components are dropped, so the result never leaves the root.
    pub fn path(&self, rel: &Path) -> PathBuf {
        let inside: PathBuf = rel
            .components()
            .filter(|c| matches!(c, Component::Normal(_)))
            .collect();
        self.root.join(inside)
    }

    /// Create a directory and its parents. Existing directories are fine.
    pub fn mkdir(&self, rel: &Path) -> Result<()> {
        let path = self.path(rel);
        fs::create_dir_all(&path).map_err(|e| {
            RepoError::io(format!("unable to create directory {}", path.display()), e)
        })
    }

    /// Create (or truncate) a file for writing
    pub fn create_file(&self, rel: &Path) -> Result<File> {
        let path = self.path(rel);
        File::create(&path)
            .map_err(|e| RepoError::io(format!("unable to create file {}", path.display()), e))
    }

    pub fn checksums_for_file(&self, rel: &Path) -> Result<ChecksumInfo> {
        checksums(self.path(rel))
    }

    /// Put a package file at `rel` inside the published pool.
    ///
    /// Hard-links when possible so the same file published in several places
    /// takes no extra space, copies otherwise. A file already in place with the
    /// same content is left alone, which makes re-publishing idempotent.
    pub fn link_from_pool(&self, file: &PackageFile, rel: &Path) -> Result<()> {
        let source = &file.source;
        let dest = self.path(rel);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                RepoError::io(format!("unable to create directory {}", parent.display()), e)
            })?;
        }

        let link_err = |e| {
            RepoError::io(
                format!("unable to link {} to {}", source.display(), dest.display()),
                e,
            )
        };
        fs::metadata(source).map_err(link_err)?;

        if dest.exists() {
            return check_existing(&dest, file);
        }

        match fs::hard_link(source, &dest) {
            Ok(()) => Ok(()),
            // Someone else linked it in the meantime
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => check_existing(&dest, file),
            Err(e) => {
                debug!("Hard link of {} failed ({}), copying", source.display(), e);
                copy_into_place(source, &dest).map_err(link_err)
            }
        }
    }
}

fn checksums(path: PathBuf) -> Result<ChecksumInfo> {
    File::open(&path)
        .and_then(ChecksumInfo::from_reader)
        .map_err(|source| RepoError::Checksum { path, source })
}

/// Compare a file already in the pool with the package it should hold.
/// Recorded digests are preferred, the source file is hashed when there are none.
fn check_existing(dest: &Path, file: &PackageFile) -> Result<()> {
    let existing = checksums(dest.to_owned())?;
    let same = existing.size == file.size
        && match (&file.sha256, &file.md5) {
            (Some(sha256), _) => existing.sha256.eq_ignore_ascii_case(sha256),
            (None, Some(md5)) => existing.md5.eq_ignore_ascii_case(md5),
            (None, None) => existing.sha256 == checksums(file.source.clone())?.sha256,
        };
    if !same {
        return Err(RepoError::io(
            format!("unable to place {}", dest.display()),
            io::Error::new(
                io::ErrorKind::AlreadyExists,
                "a different file with the same name is already in the pool",
            ),
        ));
    }
    Ok(())
}

// Copy under a temporary name first so a half-written file never shows up in the pool
fn copy_into_place(source: &Path, dest: &Path) -> io::Result<()> {
    let mut tmp = dest.as_os_str().to_owned();
    tmp.push(format!(".{}.tmp", uuid::Uuid::new_v4()));
    let tmp = PathBuf::from(tmp);
    fs::copy(source, &tmp)?;
    fs::rename(&tmp, dest)
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn mkdir_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let storage = PublishedStorage::new(tmp.path());
        storage.mkdir(Path::new("a/b/c")).unwrap();
        storage.mkdir(Path::new("a/b/c")).unwrap();
        assert!(tmp.path().join("a/b/c").is_dir());
    }

    #[test]
    fn create_and_checksum() {
        let tmp = TempDir::new().unwrap();
        let storage = PublishedStorage::new(tmp.path());
        let mut f = storage.create_file(Path::new("hello")).unwrap();
        f.write_all(b"hello\n").unwrap();
        drop(f);

        let info = storage.checksums_for_file(Path::new("hello")).unwrap();
        assert_eq!(info.size, 6);
        assert!(matches!(
            storage.checksums_for_file(Path::new("missing")),
            Err(RepoError::Checksum { .. })
        ));
    }

    fn package_file(source: PathBuf) -> PackageFile {
        let size = fs::metadata(&source).unwrap().len();
        PackageFile {
            filename: source.file_name().unwrap().to_str().unwrap().to_owned(),
            size,
            md5: None,
            sha256: None,
            source,
        }
    }

    #[test]
    fn paths_stay_inside_root() {
        let storage = PublishedStorage::new("/srv/public");
        assert_eq!(
            storage.path(Path::new("/etc/dists/stable")),
            Path::new("/srv/public/etc/dists/stable")
        );
        assert_eq!(
            storage.path(Path::new("../../outside/./Release")),
            Path::new("/srv/public/outside/Release")
        );
        assert_eq!(
            storage.path(Path::new("./dists/stable")),
            Path::new("/srv/public/dists/stable")
        );
    }

    #[test]
    fn link_twice() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("pkg.deb");
        fs::write(&src, b"debian binary").unwrap();
        let file = package_file(src);

        let storage = PublishedStorage::new(tmp.path().join("public"));
        let rel = Path::new("pool/main/p/pkg/pkg.deb");
        storage.link_from_pool(&file, rel).unwrap();
        storage.link_from_pool(&file, rel).unwrap();
        assert_eq!(fs::read(storage.path(rel)).unwrap(), b"debian binary");

        let other = tmp.path().join("other.deb");
        fs::write(&other, b"something else entirely").unwrap();
        assert!(storage.link_from_pool(&package_file(other), rel).is_err());
    }

    #[test]
    fn same_size_different_content() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("pkg.deb");
        fs::write(&src, b"AAAA").unwrap();
        let storage = PublishedStorage::new(tmp.path().join("public"));
        let rel = Path::new("pool/main/p/pkg/pkg.deb");
        storage.link_from_pool(&package_file(src.clone()), rel).unwrap();

        // A new file under the old name, not a write through the hard link
        fs::remove_file(&src).unwrap();
        fs::write(&src, b"BBBB").unwrap();
        let mut file = package_file(src);
        assert!(storage.link_from_pool(&file, rel).is_err());

        let bbbb = ChecksumInfo::from_reader(&b"BBBB"[..]).unwrap();
        file.sha256 = Some(bbbb.sha256);
        assert!(storage.link_from_pool(&file, rel).is_err());
        file.sha256 = None;
        file.md5 = Some(bbbb.md5);
        assert!(storage.link_from_pool(&file, rel).is_err());

        // Recorded digests of what is pooled are accepted
        let aaaa = ChecksumInfo::from_reader(&b"AAAA"[..]).unwrap();
        file.md5 = None;
        file.sha256 = Some(aaaa.sha256.to_uppercase());
        storage.link_from_pool(&file, rel).unwrap();
        assert_eq!(fs::read(storage.path(rel)).unwrap(), b"AAAA");
    }

    #[test]
    fn link_missing_source() {
        let tmp = TempDir::new().unwrap();
        let storage = PublishedStorage::new(tmp.path());
        let file = PackageFile {
            filename: "nope.deb".to_owned(),
            size: 0,
            md5: None,
            sha256: None,
            source: tmp.path().join("nope.deb"),
        };
        let res = storage.link_from_pool(&file, Path::new("pool/x.deb"));
        assert!(matches!(res, Err(RepoError::Io { .. })));
    }
}
