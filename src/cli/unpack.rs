use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use crate::error::{Result, WxapkgError};
use crate::extract::{ExtractionReport, DEFAULT_WORKERS};
use crate::{key, package, scan};

/// Options for the unpack command
#[derive(Debug, Clone)]
pub struct UnpackOptions {
    /// wxid override; recovered from the root path when absent
    pub wxid: Option<String>,
    /// Destination root shared by every package of the run
    pub output: PathBuf,
    /// Worker threads for file materialization
    pub workers: usize,
}

impl Default for UnpackOptions {
    fn default() -> Self {
        Self {
            wxid: None,
            output: PathBuf::from("unpack"),
            workers: DEFAULT_WORKERS,
        }
    }
}

/// A package that could not be decoded at all (cipher/format/read error).
#[derive(Debug, Clone, Serialize)]
pub struct PackageFailure {
    pub package: String,
    pub reason: String,
}

/// Outcome of one unpack run over many packages.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UnpackSummary {
    pub wxid: String,
    pub packages_ok: usize,
    pub packages_failed: usize,
    pub report: ExtractionReport,
    pub failed_packages: Vec<PackageFailure>,
}

/// Decrypt and unpack every package under `root` into the shared output
/// root (the main package and its subpackages form one virtual tree).
///
/// The key is derived once, the worker pool built once. A package that
/// fails to decode is recorded with its reason and the run continues with
/// the next one. The stop flag is checked between packages only: an
/// in-flight package always completes.
pub fn run_unpack(root: &Path, options: &UnpackOptions, stop: &AtomicBool) -> Result<UnpackSummary> {
    let wxid = match &options.wxid {
        Some(wxid) => wxid.clone(),
        None => scan::parse_wxid(&root.to_string_lossy())
            .ok_or_else(|| WxapkgError::WxidNotFound(root.display().to_string()))?,
    };

    let packages = scan::scan_packages(root);
    if packages.is_empty() {
        return Err(WxapkgError::NoPackages(root.display().to_string()));
    }

    let key = key::derive(&wxid);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.workers)
        .build()?;

    let pb = ProgressBar::new(packages.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    let mut summary = UnpackSummary {
        wxid,
        ..Default::default()
    };

    for pkg in &packages {
        if stop.load(Ordering::SeqCst) {
            break;
        }
        pb.set_message(
            pkg.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        );

        let outcome = fs::read(pkg)
            .map_err(WxapkgError::from)
            .and_then(|raw| package::unpack_package(&key, &raw, &options.output, &pool));

        match outcome {
            Ok(report) => {
                summary.packages_ok += 1;
                summary.report.merge(report);
            }
            Err(e) => {
                summary.packages_failed += 1;
                summary.failed_packages.push(PackageFailure {
                    package: pkg.display().to_string(),
                    reason: e.to_string(),
                });
            }
        }
        pb.inc(1);
    }

    pb.finish_and_clear();
    Ok(summary)
}
