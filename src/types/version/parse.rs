use super::PkgVersion;
use crate::error::{RepoError, Result};

use nom::{
    bytes::complete::take_while1,
    character::complete::{char, digit1},
    combinator::{eof, map_res, opt},
    error::context,
    sequence::terminated,
    IResult,
};

fn is_version_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '+' | '~' | '-' | ':')
}

fn epoch(i: &str) -> IResult<&str, u64> {
    map_res(terminated(digit1, char(':')), str::parse)(i)
}

/// Parse a complete version string. The revision is whatever follows the last hyphen.
fn parse_version(i: &str) -> IResult<&str, PkgVersion> {
    let (i, epoch) = context("parsing epoch", opt(epoch))(i)?;
    let (i, rest) = context("parsing version", take_while1(is_version_char))(i)?;
    let (i, _) = eof(i)?;

    let (upstream, revision) = match rest.rfind('-') {
        Some(pos) => (&rest[..pos], &rest[pos + 1..]),
        None => (rest, ""),
    };

    let res = PkgVersion {
        epoch: epoch.unwrap_or(0),
        upstream: upstream.to_owned(),
        revision: revision.to_owned(),
    };

    Ok((i, res))
}

impl TryFrom<&str> for PkgVersion {
    type Error = RepoError;

    fn try_from(s: &str) -> Result<Self> {
        let (_, ver) = parse_version(s).map_err(|_| RepoError::malformed("version", s))?;
        if ver.upstream.is_empty() {
            return Err(RepoError::malformed("version", s));
        }
        Ok(ver)
    }
}
