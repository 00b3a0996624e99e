use crate::error::{RepoError, Result};

use bzip2::write::BzEncoder;
use flate2::write::GzEncoder;
use std::{
    fs::File,
    io::{self, BufReader},
    path::{Path, PathBuf},
};

/// Compressed variants written next to every index file
pub const EXTENSIONS: [&str; 2] = ["gz", "bz2"];

fn with_extension(path: &Path, ext: &str) -> PathBuf {
    let mut res = path.as_os_str().to_owned();
    res.push(".");
    res.push(ext);
    PathBuf::from(res)
}

/// Write `<path>.gz` and `<path>.bz2` from the contents of `path`
pub fn compress_file(path: &Path) -> Result<()> {
    let err = |e| RepoError::io(format!("unable to compress {}", path.display()), e);

    let open = || File::open(path).map(BufReader::new);
    let create = |ext| File::create(with_extension(path, ext));

    let mut gz = GzEncoder::new(create("gz").map_err(err)?, flate2::Compression::best());
    io::copy(&mut open().map_err(err)?, &mut gz).map_err(err)?;
    gz.finish().map_err(err)?;

    let mut bz = BzEncoder::new(create("bz2").map_err(err)?, bzip2::Compression::best());
    io::copy(&mut open().map_err(err)?, &mut bz).map_err(err)?;
    bz.finish().map_err(err)?;

    Ok(())
}
