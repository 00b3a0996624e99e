use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::io::{self, Read, Write};

/// Size and digests of one file, as listed in Release files
#[derive(PartialEq, Eq, Clone, Debug, Default)]
pub struct ChecksumInfo {
    pub size: u64,
    pub md5: String,
    pub sha1: String,
    pub sha256: String,
}

/// Feeds everything written to it into all three digests at once
#[derive(Default)]
struct Hashers {
    size: u64,
    md5: Md5,
    sha1: Sha1,
    sha256: Sha256,
}

impl Write for Hashers {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.md5.update(buf);
        self.sha1.update(buf);
        self.sha256.update(buf);
        self.size += buf.len() as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl ChecksumInfo {
    pub fn from_reader<R: Read>(mut r: R) -> io::Result<Self> {
        let mut hashers = Hashers::default();
        io::copy(&mut r, &mut hashers)?;
        Ok(ChecksumInfo {
            size: hashers.size,
            md5: hex::encode(hashers.md5.finalize()),
            sha1: hex::encode(hashers.sha1.finalize()),
            sha256: hex::encode(hashers.sha256.finalize()),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn known_digests() {
        let info = ChecksumInfo::from_reader(&b"hello\n"[..]).unwrap();
        assert_eq!(info.size, 6);
        assert_eq!(info.md5, "b1946ac92492d2347c6235b4d2611184");
        assert_eq!(info.sha1, "f572d396fae9206628714fb2ce00f72e94f2258f");
        assert_eq!(
            info.sha256,
            "5891b5b522d5df086d0ff0b110fbd9d21bb4fc7163af34d08286a2e846f6be03"
        );
    }

    #[test]
    fn empty_input() {
        let info = ChecksumInfo::from_reader(io::empty()).unwrap();
        assert_eq!(info.size, 0);
        assert_eq!(info.md5, "d41d8cd98f00b204e9800998ecf8427e");
    }
}
