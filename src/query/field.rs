use super::PackageQuery;
use crate::{
    error::{RepoError, Result},
    list::PackageList,
    types::{Package, PkgVersion, Relation},
};

/// Generic condition on a control field.
///
/// Two pseudo-fields are understood: `$Version` compares with Debian version
/// semantics, `$Architecture` with `=` honors "all" packages. Every other
/// field is compared as a plain string.
#[derive(Debug)]
pub struct FieldQuery {
    pub field: String,
    pub relation: Relation,
    pub value: String,
    // `value` as a version, for ordering relations on `$Version`
    version: Option<PkgVersion>,
}

impl FieldQuery {
    pub fn new(field: &str, relation: Relation, value: &str) -> Result<Self> {
        let version = if field == "$Version" && relation.is_ordering() {
            Some(PkgVersion::try_from(value)?)
        } else {
            None
        };

        Ok(FieldQuery {
            field: field.to_owned(),
            relation,
            value: value.to_owned(),
            version,
        })
    }
}

impl PackageQuery for FieldQuery {
    fn matches(&self, pkg: &Package) -> Result<bool> {
        if self.field == "$Version" {
            return pkg.matches_version(self.relation, &self.value, self.version.as_ref());
        }
        if self.field == "$Architecture" && self.relation == Relation::Equal {
            return Ok(pkg.matches_architecture(&self.value));
        }

        let field = match self.field.as_str() {
            "$Architecture" => pkg.architecture.as_str(),
            name => pkg.get_field(name),
        };
        let value = self.value.as_str();

        // Plain string comparison, on purpose not version aware
        let res = match self.relation {
            Relation::DontCare => !field.is_empty(),
            Relation::Equal => field == value,
            Relation::Greater => field > value,
            Relation::GreaterOrEqual => field >= value,
            Relation::Less => field < value,
            Relation::LessOrEqual => field <= value,
            Relation::PatternMatch => glob::Pattern::new(value)
                .map(|p| p.matches(field))
                .unwrap_or(false),
            Relation::Regexp => return Err(RepoError::NotImplemented("regexp")),
        };
        Ok(res)
    }

    fn fast(&self) -> bool {
        false
    }

    fn query(&self, list: &PackageList) -> Result<PackageList> {
        list.scan(self)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::types::pkg;

    fn with_field(name: &str, value: &str) -> Package {
        let mut stanza = pkg("a", "1.10", "amd64").stanza().clone();
        stanza.set(name, value);
        Package::from_stanza(stanza, std::path::Path::new("/")).unwrap()
    }

    fn check(field: &str, rel: Relation, value: &str, p: &Package) -> bool {
        FieldQuery::new(field, rel, value).unwrap().matches(p).unwrap()
    }

    #[test]
    fn string_relations() {
        let p = with_field("Priority", "optional");
        assert!(check("Priority", Relation::DontCare, "", &p));
        assert!(!check("Essential", Relation::DontCare, "", &p));
        assert!(check("Priority", Relation::Equal, "optional", &p));
        assert!(check("Priority", Relation::Greater, "important", &p));
        assert!(check("Priority", Relation::LessOrEqual, "optional", &p));
        assert!(!check("Priority", Relation::Less, "extra", &p));
        assert!(check("Priority", Relation::PatternMatch, "opt*", &p));
        assert!(!check("Priority", Relation::PatternMatch, "[", &p));
    }

    #[test]
    fn lexicographic_not_numeric() {
        let p = with_field("Installed-Size", "900");
        // Numerically 900 < 1000, but not as strings
        assert!(check("Installed-Size", Relation::Greater, "1000", &p));
    }

    #[test]
    fn version_pseudo_field() {
        let p = with_field("Priority", "optional");
        // Version 1.10 is newer than 1.9 in Debian ordering
        assert!(check("$Version", Relation::Greater, "1.9", &p));
        assert!(check("$Version", Relation::Equal, "1.10", &p));
        assert!(check("$Version", Relation::PatternMatch, "1.*", &p));
        assert!(FieldQuery::new("$Version", Relation::Less, "").is_err());
    }

    #[test]
    fn architecture_pseudo_field() {
        let all = pkg("b", "1", "all");
        assert!(check("$Architecture", Relation::Equal, "amd64", &all));
        assert!(!check("$Architecture", Relation::Equal, "amd64", &pkg("b", "1", "i386")));
        // Only equality knows about "all"
        assert!(!check("$Architecture", Relation::PatternMatch, "amd*", &all));
    }

    #[test]
    fn regexp_is_not_implemented() {
        let p = with_field("Priority", "optional");
        let q = FieldQuery::new("Priority", Relation::Regexp, "^opt").unwrap();
        assert!(matches!(q.matches(&p), Err(RepoError::NotImplemented(_))));
    }
}
