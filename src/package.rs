//! One-package decode pipeline: raw bytes → decrypt → parse → extract.

use std::path::Path;

use rayon::ThreadPool;

use crate::cipher;
use crate::container;
use crate::error::Result;
use crate::extract::{self, ExtractionReport};
use crate::key::KeyMaterial;

/// Decrypt and unpack a single raw package under `dest`.
///
/// Cipher and format errors abort this package only; callers iterating many
/// packages continue with the next one. Per-entry write failures land in
/// the report without failing the call.
pub fn unpack_package(
    key: &KeyMaterial,
    raw: &[u8],
    dest: &Path,
    pool: &ThreadPool,
) -> Result<ExtractionReport> {
    let decrypted = cipher::decrypt(raw, key)?;
    let entries = container::parse(&decrypted)?;
    extract::extract(&decrypted, &entries, dest, pool)
}
