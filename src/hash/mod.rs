use std::io::Read;
use std::path::Path;

use md5::Context as Md5Context;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};

use crate::error::ManifestError;
use crate::metadata::modfile::HashFormat;

enum Hasher {
    Sha1(Sha1),
    Sha256(Sha256),
    Sha512(Sha512),
    Md5(Md5Context),
}

impl Hasher {
    fn new(format: HashFormat) -> Option<Self> {
        match format {
            HashFormat::Sha1 => Some(Hasher::Sha1(Sha1::new())),
            HashFormat::Sha256 => Some(Hasher::Sha256(Sha256::new())),
            HashFormat::Sha512 => Some(Hasher::Sha512(Sha512::new())),
            HashFormat::Md5 => Some(Hasher::Md5(Md5Context::new())),
            // curseforge fingerprints are never computed locally
            HashFormat::Murmur2 => None,
        }
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            Hasher::Sha1(h) => h.update(data),
            Hasher::Sha256(h) => h.update(data),
            Hasher::Sha512(h) => h.update(data),
            Hasher::Md5(h) => h.consume(data),
        }
    }

    fn finish_hex(self) -> String {
        match self {
            Hasher::Sha1(h) => format!("{:x}", h.finalize()),
            Hasher::Sha256(h) => format!("{:x}", h.finalize()),
            Hasher::Sha512(h) => format!("{:x}", h.finalize()),
            Hasher::Md5(h) => format!("{:x}", h.compute()),
        }
    }
}

pub fn hash_reader_hex(format: HashFormat, mut reader: impl Read) -> std::io::Result<String> {
    let mut hasher = Hasher::new(format).ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            format!("unsupported hash format: {}", format.as_str()),
        )
    })?;
    let mut buf = [0u8; 8192];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finish_hex())
}

pub fn hash_file_hex(format: HashFormat, path: &Path) -> Result<String, ManifestError> {
    let file = std::fs::File::open(path).map_err(|e| ManifestError::io(path, e))?;
    hash_reader_hex(format, std::io::BufReader::new(file)).map_err(|e| ManifestError::io(path, e))
}
