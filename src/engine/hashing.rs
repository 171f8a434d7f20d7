//! File hashing utilities

use blake3::Hasher;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::ContentHash;
use crate::error::TaskError;
use crate::utils::config::HashingConsts;

/// Hash a file with blake3, streaming it in fixed-size chunks so memory stays bounded.
pub fn hash_file(path: &Path) -> Result<ContentHash, TaskError> {
    let read_err = |source| TaskError::Read {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(read_err)?;
    let mut reader = BufReader::with_capacity(HashingConsts::HASH_READ_CHUNK_SIZE, file);
    let mut hasher = Hasher::new();
    let mut buffer = vec![0u8; HashingConsts::HASH_READ_CHUNK_SIZE];
    loop {
        let n = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(read_err(e)),
        };
        hasher.update(&buffer[..n]);
    }
    Ok(ContentHash::from(hasher.finalize()))
}

/// Hash an in-memory byte slice. Same digest as [`hash_file`] on a file with these bytes.
pub fn hash_bytes(bytes: &[u8]) -> ContentHash {
    ContentHash::from(blake3::hash(bytes))
}
