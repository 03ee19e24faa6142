use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use rayon::ThreadPool;
use serde::Serialize;

use crate::container::{FileKind, TocEntry};
use crate::error::Result;

/// Worker count used when the caller does not pick one.
pub const DEFAULT_WORKERS: usize = 30;

/// A single entry that could not be written. Collected, never fatal.
#[derive(Debug, Clone, Serialize)]
pub struct EntryFailure {
    pub name: String,
    pub error: String,
}

/// Outcome of materializing one package's entries.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractionReport {
    pub files_written: usize,
    pub bytes_written: u64,
    pub by_kind: BTreeMap<FileKind, usize>,
    pub failures: Vec<EntryFailure>,
}

impl ExtractionReport {
    /// Fold another report into this one (multi-package runs).
    pub fn merge(&mut self, other: ExtractionReport) {
        self.files_written += other.files_written;
        self.bytes_written += other.bytes_written;
        for (kind, count) in other.by_kind {
            *self.by_kind.entry(kind).or_insert(0) += count;
        }
        self.failures.extend(other.failures);
    }
}

/// Write every entry's byte range under `dest`, fanning out across `pool`.
///
/// The decrypted buffer is shared read-only across workers; nothing writes
/// to it after parsing, so no locking is needed. Entries with duplicate
/// names are reduced to the LAST table occurrence before fan-out, which
/// makes last-write-wins deterministic instead of a write race. Directory
/// creation is idempotent, so workers may create the same parent
/// concurrently. Per-entry failures go into the report; only an unusable
/// destination root aborts up front.
pub fn extract(
    decrypted: &[u8],
    entries: &[TocEntry],
    dest: &Path,
    pool: &ThreadPool,
) -> Result<ExtractionReport> {
    fs::create_dir_all(dest)?;

    // Last table occurrence wins for duplicate names.
    let mut winners: HashMap<&str, &TocEntry> = HashMap::with_capacity(entries.len());
    for entry in entries {
        winners.insert(entry.name.as_str(), entry);
    }
    let winners: Vec<&TocEntry> = winners.into_values().collect();

    let results: Vec<std::result::Result<(u64, FileKind), EntryFailure>> = pool.install(|| {
        winners
            .par_iter()
            .map(|entry| write_entry(decrypted, entry, dest))
            .collect()
    });

    let mut report = ExtractionReport::default();
    for result in results {
        match result {
            Ok((bytes, kind)) => {
                report.files_written += 1;
                report.bytes_written += bytes;
                *report.by_kind.entry(kind).or_insert(0) += 1;
            }
            Err(failure) => report.failures.push(failure),
        }
    }
    Ok(report)
}

fn write_entry(
    decrypted: &[u8],
    entry: &TocEntry,
    dest: &Path,
) -> std::result::Result<(u64, FileKind), EntryFailure> {
    let path = dest_path(dest, &entry.name);
    let data = &decrypted[entry.range()];

    let write = || -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, data)
    };

    match write() {
        Ok(()) => Ok((data.len() as u64, entry.kind())),
        Err(e) => Err(EntryFailure {
            name: entry.name.clone(),
            error: e.to_string(),
        }),
    }
}

/// Map a virtual path onto the destination root. Leading slashes are
/// stripped so absolute-looking names stay inside the root; `..` segments
/// were already rejected by the parser.
fn dest_path(dest: &Path, name: &str) -> PathBuf {
    let mut path = dest.to_path_buf();
    for seg in name.split('/').filter(|s| !s.is_empty()) {
        path.push(seg);
    }
    path
}
