use super::{Dependency, PkgVersion, Relation, Stanza};
use crate::error::{RepoError, Result};

use std::path::{Path, PathBuf};

/// The .deb file backing a package
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackageFile {
    /// Base name, e.g. `hello_2.10-2_amd64.deb`
    pub filename: String,
    pub size: u64,
    pub md5: Option<String>,
    pub sha256: Option<String>,
    /// Where the file currently lives in package storage
    pub source: PathBuf,
}

/// One binary package. Immutable once created.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Package {
    pub name: String,
    pub version: String,
    pub architecture: String,
    parsed_version: PkgVersion,
    // Complete control stanza in original field order
    stanza: Stanza,
    file: PackageFile,
}

impl Package {
    /// Build a package from its control stanza. `Filename` is resolved against `storage_root`.
    pub fn from_stanza(stanza: Stanza, storage_root: &Path) -> Result<Self> {
        let required = |name: &'static str| {
            stanza
                .get(name)
                .map(str::to_owned)
                .ok_or_else(|| RepoError::malformed("package stanza", format!("missing {name}")))
        };

        let name = required("Package")?;
        let version = required("Version")?;
        let architecture = required("Architecture")?;
        let filename = required("Filename")?;
        let size = required("Size")?
            .parse()
            .map_err(|_| RepoError::malformed("package size", format!("{name} {version}")))?;

        let basename = Path::new(&filename)
            .file_name()
            .and_then(|f| f.to_str())
            .ok_or_else(|| RepoError::malformed("package filename", filename.clone()))?
            .to_owned();

        let file = PackageFile {
            filename: basename,
            size,
            md5: stanza.get("MD5sum").map(str::to_owned),
            sha256: stanza.get("SHA256").map(str::to_owned),
            source: storage_root.join(&filename),
        };

        Ok(Package {
            parsed_version: PkgVersion::try_from(version.as_str())?,
            name,
            version,
            architecture,
            stanza,
            file,
        })
    }

    /// Unique key of this package within a list: `architecture name version`
    pub fn key(&self) -> String {
        format!("{} {} {}", self.architecture, self.name, self.version)
    }

    pub fn parsed_version(&self) -> &PkgVersion {
        &self.parsed_version
    }

    pub fn file(&self) -> &PackageFile {
        &self.file
    }

    pub fn stanza(&self) -> &Stanza {
        &self.stanza
    }

    /// Value of a control field, empty if the package doesn't have it
    pub fn get_field(&self, name: &str) -> &str {
        self.stanza.get(name).unwrap_or("")
    }

    /// Architecture "all" packages are part of every architecture
    pub fn matches_architecture(&self, arch: &str) -> bool {
        self.architecture == arch || self.architecture == "all"
    }

    pub fn matches_dependency(&self, dep: &Dependency) -> Result<bool> {
        if let Some(arch) = &dep.architecture {
            if !self.matches_architecture(arch) {
                return Ok(false);
            }
        }
        if dep.pkg != self.name {
            return Ok(false);
        }

        self.matches_version(dep.relation, &dep.version, dep.parsed_version())
    }

    /// Test this package's version against an operand. Ordering relations
    /// need the operand already parsed as `parsed`.
    pub fn matches_version(
        &self,
        relation: Relation,
        operand: &str,
        parsed: Option<&PkgVersion>,
    ) -> Result<bool> {
        match relation {
            Relation::DontCare => Ok(true),
            Relation::PatternMatch => Ok(glob::Pattern::new(operand)
                .map(|p| p.matches(&self.version))
                .unwrap_or(false)),
            Relation::Regexp => Err(RepoError::NotImplemented("regexp")),
            relation => {
                let parsed = parsed.ok_or_else(|| RepoError::malformed("version", operand))?;
                Ok(relation.accepts(self.parsed_version.cmp(parsed)))
            }
        }
    }

    /// Name of the source package, without any version in parentheses
    pub fn source_name(&self) -> &str {
        match self.stanza.get("Source") {
            Some(source) => source.split_whitespace().next().unwrap_or(&self.name),
            None => &self.name,
        }
    }

    /// Location of the package file under a published prefix,
    /// e.g. `pool/main/libx/libxml2/libxml2_2.9_amd64.deb`
    pub fn pool_path(&self, component: &str) -> String {
        let source = self.source_name();
        let initial = if source.starts_with("lib") && source.len() > 3 {
            source.get(..4).unwrap_or(source)
        } else {
            source.get(..1).unwrap_or(source)
        };
        format!(
            "pool/{}/{}/{}/{}",
            component, initial, source, self.file.filename
        )
    }

    /// The control stanza as it should appear in a published Packages file
    pub fn stanza_with_filename(&self, filename: &str) -> Stanza {
        let mut stanza = self.stanza.clone();
        stanza.set("Filename", filename);
        stanza
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;

    /// A minimal package stanza for tests
    pub(crate) fn pkg(name: &str, version: &str, arch: &str) -> Package {
        let stanza: Stanza = vec![
            ("Package", name.to_owned()),
            ("Version", version.to_owned()),
            ("Architecture", arch.to_owned()),
            ("Maintainer", "Nobody <nobody@example.org>".to_owned()),
            (
                "Filename",
                format!("incoming/{}_{}_{}.deb", name, version, arch),
            ),
            ("Size", "1024".to_owned()),
            ("Description", format!("the {} package", name)),
        ]
        .into_iter()
        .collect();
        Package::from_stanza(stanza, Path::new("/srv/storage")).unwrap()
    }

    #[test]
    fn architecture_all() {
        assert!(pkg("a", "1.0", "all").matches_architecture("amd64"));
        assert!(pkg("a", "1.0", "amd64").matches_architecture("amd64"));
        assert!(!pkg("a", "1.0", "i386").matches_architecture("amd64"));
    }

    #[test]
    fn dependency_uses_version_order() {
        let p = pkg("a", "1.10", "amd64");
        let dep = Dependency::new("a", Relation::Greater, "1.9").unwrap();
        // "1.10" < "1.9" as plain strings
        assert!(p.matches_dependency(&dep).unwrap());

        let dep = Dependency::new("b", Relation::Greater, "1.9").unwrap();
        assert!(!p.matches_dependency(&dep).unwrap());

        let dep = Dependency::any("a").with_architecture("i386");
        assert!(!p.matches_dependency(&dep).unwrap());

        let dep = Dependency::new("a", Relation::PatternMatch, "1.1*").unwrap();
        assert!(p.matches_dependency(&dep).unwrap());

        let dep = Dependency::new("a", Relation::Regexp, "1.*").unwrap();
        assert!(matches!(
            p.matches_dependency(&dep),
            Err(RepoError::NotImplemented(_))
        ));
    }

    #[test]
    fn pool_layout() {
        let p = pkg("hello", "2.10-2", "amd64");
        assert_eq!(p.file().filename, "hello_2.10-2_amd64.deb");
        assert_eq!(p.file().source, Path::new("/srv/storage/incoming/hello_2.10-2_amd64.deb"));
        assert_eq!(p.pool_path("main"), "pool/main/h/hello/hello_2.10-2_amd64.deb");

        let mut stanza = p.stanza().clone();
        stanza.set("Package", "libxml2-dev");
        stanza.set("Source", "libxml2 (2.9.14+dfsg-1)");
        let lib = Package::from_stanza(stanza, Path::new("/")).unwrap();
        assert_eq!(lib.source_name(), "libxml2");
        assert!(lib.pool_path("contrib").starts_with("pool/contrib/libx/libxml2/"));
    }

    #[test]
    fn published_stanza_rewrites_filename() {
        let p = pkg("hello", "2.10-2", "amd64");
        let s = p.stanza_with_filename("pool/main/h/hello/hello_2.10-2_amd64.deb");
        let names: Vec<&str> = s.iter().map(|(k, _)| k).collect();
        assert_eq!(names[4], "Filename");
        assert_eq!(s.get("Filename"), Some("pool/main/h/hello/hello_2.10-2_amd64.deb"));
        // Original stays untouched
        assert_eq!(p.get_field("Filename"), "incoming/hello_2.10-2_amd64.deb");
    }

    #[test]
    fn missing_fields() {
        let stanza: Stanza = vec![("Package", "a"), ("Version", "1.0")].into_iter().collect();
        assert!(Package::from_stanza(stanza, Path::new("/")).is_err());
    }
}
