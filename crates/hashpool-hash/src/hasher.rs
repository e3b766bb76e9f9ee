//! Streaming content hashing.
//!
//! Files are read through a fixed 64 KiB buffer, so memory use does not
//! grow with file size. The algorithm is chosen once per run.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use sha2::{Digest, Sha256, Sha512};

use hashpool_core::{ContentDigest, DigestAlgorithm, HashError};

/// Size of the read buffer used while streaming a file.
pub const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Running digest state for one of the supported algorithms.
enum Accumulator {
    Sha256(Sha256),
    Sha512(Sha512),
    Blake3(Box<blake3::Hasher>),
}

impl Accumulator {
    fn new(algorithm: DigestAlgorithm) -> Self {
        match algorithm {
            DigestAlgorithm::Sha256 => Self::Sha256(Sha256::new()),
            DigestAlgorithm::Sha512 => Self::Sha512(Sha512::new()),
            DigestAlgorithm::Blake3 => Self::Blake3(Box::new(blake3::Hasher::new())),
        }
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            Self::Sha256(h) => h.update(data),
            Self::Sha512(h) => h.update(data),
            Self::Blake3(h) => {
                h.update(data);
            }
        }
    }

    fn finalize(self) -> ContentDigest {
        match self {
            Self::Sha256(h) => ContentDigest::new(DigestAlgorithm::Sha256, h.finalize().to_vec()),
            Self::Sha512(h) => ContentDigest::new(DigestAlgorithm::Sha512, h.finalize().to_vec()),
            Self::Blake3(h) => {
                ContentDigest::new(DigestAlgorithm::Blake3, h.finalize().as_bytes().to_vec())
            }
        }
    }
}

/// Hash everything a reader yields.
pub fn hash_reader<R: Read>(reader: R, algorithm: DigestAlgorithm) -> io::Result<ContentDigest> {
    hash_reader_counted(reader, algorithm).map(|(digest, _)| digest)
}

/// Hash everything a reader yields and count the bytes consumed.
pub fn hash_reader_counted<R: Read>(
    mut reader: R,
    algorithm: DigestAlgorithm,
) -> io::Result<(ContentDigest, u64)> {
    let mut accumulator = Accumulator::new(algorithm);
    let mut buffer = vec![0u8; READ_BUFFER_SIZE];
    let mut total = 0u64;

    loop {
        let bytes_read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        accumulator.update(&buffer[..bytes_read]);
        total += bytes_read as u64;
    }

    Ok((accumulator.finalize(), total))
}

/// Hash an in-memory byte slice.
pub fn hash_bytes(data: &[u8], algorithm: DigestAlgorithm) -> ContentDigest {
    let mut accumulator = Accumulator::new(algorithm);
    accumulator.update(data);
    accumulator.finalize()
}

/// Hash a file's content.
///
/// The file handle is closed when this returns, on success or failure.
pub fn hash_file(path: &Path, algorithm: DigestAlgorithm) -> Result<ContentDigest, HashError> {
    hash_file_counted(path, algorithm).map(|(digest, _)| digest)
}

/// Hash a file's content and return the number of bytes read with it.
///
/// The count is what was actually hashed, not the size reported by
/// metadata.
pub fn hash_file_counted(
    path: &Path,
    algorithm: DigestAlgorithm,
) -> Result<(ContentDigest, u64), HashError> {
    let file = File::open(path).map_err(|source| HashError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    hash_reader_counted(file, algorithm).map_err(|source| HashError::Read {
        path: path.to_path_buf(),
        source,
    })
}
