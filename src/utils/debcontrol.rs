use crate::{
    error::{RepoError, Result},
    types::{Dependency, Relation},
};

use nom::{
    bytes::complete::{take_till1, take_while, take_while1},
    character::{
        complete::{alphanumeric1, char, space0},
        is_alphanumeric,
    },
    combinator::{eof, opt, recognize},
    sequence::{delimited, pair, preceded, separated_pair, terminated, tuple},
    IResult,
};

// parser combinators
fn parse_package_name(s: &[u8]) -> IResult<&[u8], &[u8]> {
    recognize(pair(
        alphanumeric1,
        take_while(|c| is_alphanumeric(c) || c == b'+' || c == b'-' || c == b'.'),
    ))(s)
}

fn parse_version_op(s: &[u8]) -> IResult<&[u8], &[u8]> {
    take_while1(|c| c == b'>' || c == b'<' || c == b'=' || c == b'%' || c == b'~')(s)
}

// Patterns and regular expressions are operands too, so take everything up to ')'
fn parse_operand(s: &[u8]) -> IResult<&[u8], &[u8]> {
    take_till1(|c| c == b')')(s)
}

fn parse_version_expr(s: &[u8]) -> IResult<&[u8], (&[u8], &[u8])> {
    separated_pair(parse_version_op, space0, parse_operand)(s)
}

fn parse_relation_suffix(s: &[u8]) -> IResult<&[u8], (&[u8], &[u8])> {
    preceded(
        space0,
        delimited(
            pair(char('('), space0),
            parse_version_expr,
            char(')'),
        ),
    )(s)
}

fn parse_arch_suffix(s: &[u8]) -> IResult<&[u8], &[u8]> {
    preceded(
        space0,
        delimited(
            char('{'),
            take_while1(|c| is_alphanumeric(c) || c == b'-'),
            char('}'),
        ),
    )(s)
}

type Relational<'a> = (&'a [u8], Option<(&'a [u8], &'a [u8])>, Option<&'a [u8]>);

fn parse_relational(s: &[u8]) -> IResult<&[u8], Relational<'_>> {
    delimited(
        space0,
        tuple((
            parse_package_name,
            opt(parse_relation_suffix),
            opt(parse_arch_suffix),
        )),
        terminated(space0, eof),
    )(s)
}

/// Parse `name`, `name (op version)` or either followed by `{arch}`
pub fn parse_dependency(s: &str) -> Result<Dependency> {
    let malformed = || RepoError::malformed("dependency", s);
    let (_, (name, version, arch)) = parse_relational(s.as_bytes()).map_err(|_| malformed())?;
    // The parsers only accept ASCII
    let text = |b: &[u8]| String::from_utf8_lossy(b).into_owned();

    let mut res = match version {
        Some((op, operand)) => {
            let relation = Relation::from_operator(&text(op)).ok_or_else(malformed)?;
            Dependency::new(&text(name), relation, text(operand).trim_end())?
        }
        None => Dependency::any(&text(name)),
    };
    if let Some(arch) = arch {
        res = res.with_architecture(&text(arch));
    }

    Ok(res)
}

/// Parse a comma separated list such as a `Depends` field.
/// Alternatives (`a | b`) are not supported.
pub fn parse_dependency_list(s: &str) -> Result<Vec<Dependency>> {
    if s.trim().is_empty() {
        return Ok(Vec::new());
    }
    s.split(',').map(parse_dependency).collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parsers() {
        assert_eq!(parse_version_op(&b">>"[..]), Ok((&b""[..], &b">>"[..])));
        assert_eq!(parse_version_op(&b"<="[..]), Ok((&b""[..], &b"<="[..])));
        assert_eq!(
            parse_version_expr(&b">= 2:1.1.0~rc.1"[..]),
            Ok((&b""[..], (&b">="[..], &b"2:1.1.0~rc.1"[..])))
        );
        assert_eq!(
            parse_package_name(&b"sqlite-ass"[..]),
            Ok((&b""[..], &b"sqlite-ass"[..]))
        );
        assert_eq!(
            parse_package_name(&b"sqlite_ass"[..]),
            Ok((&b"_ass"[..], &b"sqlite"[..]))
        );
        assert_eq!(
            parse_arch_suffix(&b" {amd64}"[..]),
            Ok((&b""[..], &b"amd64"[..]))
        );
        assert!(parse_relational(&b"libpcap_invalid (>= 1.9.1)"[..]).is_err());
    }

    #[test]
    fn dependencies() {
        let dep = parse_dependency("libpcap (>= 1.9.1)").unwrap();
        assert_eq!(dep.pkg, "libpcap");
        assert_eq!(dep.relation, Relation::GreaterOrEqual);
        assert_eq!(dep.version, "1.9.1");
        assert!(dep.parsed_version().is_some());
        assert_eq!(dep.architecture, None);

        let dep = parse_dependency("libpcap").unwrap();
        assert_eq!(dep.relation, Relation::DontCare);

        let dep = parse_dependency("hello (<< 2.0) {i386}").unwrap();
        assert_eq!(dep.relation, Relation::Less);
        assert_eq!(dep.architecture.as_deref(), Some("i386"));

        let dep = parse_dependency("bash {arm64}").unwrap();
        assert_eq!(dep.to_string(), "bash {arm64}");

        // Obsolete single character forms
        assert_eq!(
            parse_dependency("a (> 1)").unwrap().relation,
            Relation::GreaterOrEqual
        );
        assert_eq!(
            parse_dependency("a (< 1)").unwrap().relation,
            Relation::LessOrEqual
        );
    }

    #[test]
    fn patterns() {
        let dep = parse_dependency("hello (% 2.*)").unwrap();
        assert_eq!(dep.relation, Relation::PatternMatch);
        assert_eq!(dep.version, "2.*");
        assert!(dep.parsed_version().is_none());

        let dep = parse_dependency("hello (~ ^2\\.[0-9]+ )").unwrap();
        assert_eq!(dep.relation, Relation::Regexp);
        assert_eq!(dep.version, "^2\\.[0-9]+");
    }

    #[test]
    fn malformed() {
        assert!(parse_dependency("").is_err());
        assert!(parse_dependency("hello (>= 1.0").is_err());
        assert!(parse_dependency("hello (=> 1.0)").is_err());
        assert!(parse_dependency("hello (>= not a version)").is_err());
        assert!(parse_dependency("hello trailing").is_err());
    }

    #[test]
    fn lists() {
        let deps = parse_dependency_list("libc6 (>= 2.31), zlib1g,tzdata").unwrap();
        let names: Vec<&str> = deps.iter().map(|d| d.pkg.as_str()).collect();
        assert_eq!(names, vec!["libc6", "zlib1g", "tzdata"]);
        assert!(parse_dependency_list(" ").unwrap().is_empty());
        assert!(parse_dependency_list("a, ").is_err());
    }
}
