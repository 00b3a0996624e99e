use super::PkgVersion;
use crate::error::Result;

use std::{cmp::Ordering, fmt};

/// How a version (or field value) is compared against an operand
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Relation {
    DontCare,
    Equal,
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,
    PatternMatch,
    Regexp,
}

impl Relation {
    /// Whether `ord` (left operand compared to right) satisfies an ordering relation.
    /// Only meaningful for the six ordering relations.
    pub fn accepts(self, ord: Ordering) -> bool {
        match self {
            Relation::DontCare => true,
            Relation::Equal => ord == Ordering::Equal,
            Relation::Greater => ord == Ordering::Greater,
            Relation::GreaterOrEqual => ord != Ordering::Less,
            Relation::Less => ord == Ordering::Less,
            Relation::LessOrEqual => ord != Ordering::Greater,
            Relation::PatternMatch | Relation::Regexp => false,
        }
    }

    /// Whether the operand of this relation is a version to be parsed
    pub fn is_ordering(self) -> bool {
        !matches!(
            self,
            Relation::DontCare | Relation::PatternMatch | Relation::Regexp
        )
    }

    pub fn as_operator(self) -> &'static str {
        match self {
            Relation::DontCare => "",
            Relation::Equal => "=",
            Relation::Greater => ">>",
            Relation::GreaterOrEqual => ">=",
            Relation::Less => "<<",
            Relation::LessOrEqual => "<=",
            Relation::PatternMatch => "%",
            Relation::Regexp => "~",
        }
    }

    /// Map a Debian relation operator. The obsolete `>` and `<` forms mean `>=` and `<=`.
    pub fn from_operator(op: &str) -> Option<Self> {
        let res = match op {
            "=" => Relation::Equal,
            ">>" => Relation::Greater,
            ">=" | ">" => Relation::GreaterOrEqual,
            "<<" => Relation::Less,
            "<=" | "<" => Relation::LessOrEqual,
            "%" => Relation::PatternMatch,
            "~" => Relation::Regexp,
            _ => return None,
        };
        Some(res)
    }
}

/// A version-constrained reference to a package, e.g. `libc6 (>= 2.31) {amd64}`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dependency {
    pub pkg: String,
    pub relation: Relation,
    pub version: String,
    pub architecture: Option<String>,
    // Pre-parsed operand for the ordering relations
    parsed: Option<PkgVersion>,
}

impl Dependency {
    pub fn new(pkg: &str, relation: Relation, version: &str) -> Result<Self> {
        let parsed = if relation.is_ordering() {
            Some(PkgVersion::try_from(version)?)
        } else {
            None
        };

        Ok(Dependency {
            pkg: pkg.to_owned(),
            relation,
            version: version.to_owned(),
            architecture: None,
            parsed,
        })
    }

    /// A dependency on any version of `pkg`
    pub fn any(pkg: &str) -> Self {
        Dependency {
            pkg: pkg.to_owned(),
            relation: Relation::DontCare,
            version: String::new(),
            architecture: None,
            parsed: None,
        }
    }

    pub fn with_architecture(mut self, arch: &str) -> Self {
        self.architecture = Some(arch.to_owned());
        self
    }

    /// The operand as a parsed version, present for ordering relations
    pub fn parsed_version(&self) -> Option<&PkgVersion> {
        self.parsed.as_ref()
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.pkg)?;
        if self.relation != Relation::DontCare {
            write!(f, " ({} {})", self.relation.as_operator(), self.version)?;
        }
        if let Some(arch) = &self.architecture {
            write!(f, " {{{}}}", arch)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn relation_accepts() {
        use Ordering::*;
        assert!(Relation::GreaterOrEqual.accepts(Equal));
        assert!(Relation::GreaterOrEqual.accepts(Greater));
        assert!(!Relation::Greater.accepts(Equal));
        assert!(Relation::LessOrEqual.accepts(Less));
        assert!(!Relation::Less.accepts(Equal));
        assert!(Relation::DontCare.accepts(Less));
    }

    #[test]
    fn obsolete_operators() {
        assert_eq!(Relation::from_operator(">"), Some(Relation::GreaterOrEqual));
        assert_eq!(Relation::from_operator("<"), Some(Relation::LessOrEqual));
        assert_eq!(Relation::from_operator("=="), None);
    }

    #[test]
    fn display_dependency() {
        let dep = Dependency::new("libc6", Relation::GreaterOrEqual, "2.31")
            .unwrap()
            .with_architecture("amd64");
        assert_eq!(dep.to_string(), "libc6 (>= 2.31) {amd64}");
        assert_eq!(Dependency::any("bash").to_string(), "bash");
    }

    #[test]
    fn ordering_operand_must_be_version() {
        assert!(Dependency::new("a", Relation::Less, "not a version").is_err());
        assert!(Dependency::new("a", Relation::PatternMatch, "1.*").is_ok());
    }
}
