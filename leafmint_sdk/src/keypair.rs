use crate::error::{Error, Result};
use solana_sdk::signature::{read_keypair_file, Keypair};
use std::path::Path;

/// Read a keypair file in the JSON byte-array format written by the
/// Solana CLI (`[12, 201, ...]`, 64 entries)
pub fn load_keypair(path: impl AsRef<Path>) -> Result<Keypair> {
    let path = path.as_ref();
    read_keypair_file(path).map_err(|e| Error::Keypair(format!("{}: {}", path.display(), e)))
}
