//! Reading package stanzas out of Packages indices
use crate::{
    debug,
    error::{RepoError, Result},
    types::{Package, Stanza},
};

use debcontrol::{BufParse, Streaming};
use std::{io::Read, path::Path};

/// Parse every paragraph of a Packages index into packages, keeping field order
pub fn import_packages<R: Read>(r: R, storage_root: &Path) -> Result<Vec<Package>> {
    let mut buf_parse = BufParse::new(r, 16384);
    let mut stanzas = Vec::new();

    loop {
        let next = buf_parse
            .try_next()
            .map_err(|e| RepoError::malformed("Packages index", format!("{:?}", e)))?;
        match next {
            Some(Streaming::Item(paragraph)) => {
                let stanza: Stanza = paragraph
                    .fields
                    .into_iter()
                    .map(|field| (field.name, field.value))
                    .collect();
                stanzas.push(stanza);
            }
            Some(Streaming::Incomplete) => buf_parse
                .buffer()
                .map_err(|e| RepoError::io("unable to read Packages index", e))?,
            None => break,
        }
    }

    debug!("Read {} stanzas from package index", stanzas.len());
    stanzas
        .into_iter()
        .map(|stanza| Package::from_stanza(stanza, storage_root))
        .collect()
}
