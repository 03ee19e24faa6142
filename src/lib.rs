//! wxapkg - WeChat mini-program package decryption and extraction
//!
//! Decodes vendor-encrypted `.wxapkg` package containers into plain files
//! on disk. A package is protected in two stages: the leading 1024 bytes
//! with AES-256-CBC under a key derived from the app's wxid, the remainder
//! with a repeating single-byte XOR keystream. The decrypted stream is a
//! container with a fixed header, a table of contents and a data region
//! holding the embedded files.
//!
//! ## Decode Pipeline
//!
//! ```text
//! wxid → KeyMaterial → Decrypt(raw) → Parse(container) → Extract → files
//! ```
//!
//! - **KeyMaterial**: PBKDF2-HMAC-SHA1 over the wxid plus the single-byte
//!   XOR key, derived once per decode
//! - **Decrypt**: block cipher over the header region (padding validated as
//!   the wrong-key signal), XOR over the rest, length-preserving
//! - **Parse**: magic marks, big-endian TOC, bounds and traversal checks
//! - **Extract**: bounded worker pool materializes the entries; per-entry
//!   failures are reported, not fatal
//!
//! Beautification, terminal pickers and wxid metadata lookup are external
//! consumers: extraction exposes raw bytes plus a [`FileKind`] per entry,
//! and the wxid string is the whole metadata-lookup interface.
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use wxapkg::{derive, unpack_package};
//!
//! let key = derive("wx1234567890abcdef");
//! let raw = std::fs::read("__APP__.wxapkg").unwrap();
//! let pool = rayon::ThreadPoolBuilder::new().num_threads(8).build().unwrap();
//!
//! let report = unpack_package(&key, &raw, Path::new("unpack"), &pool).unwrap();
//! println!("{} files, {} bytes", report.files_written, report.bytes_written);
//! ```

pub mod cipher;
pub mod cli;
pub mod container;
pub mod error;
pub mod extract;
pub mod key;
pub mod package;
pub mod scan;

#[cfg(test)]
pub(crate) mod testutil;

pub use cipher::decrypt;
pub use container::{parse, ContainerHeader, ContainerVersion, FileKind, TocEntry};
pub use error::{CipherError, FormatError, Result, WxapkgError};
pub use extract::{extract, EntryFailure, ExtractionReport};
pub use key::{derive, KeyMaterial};
pub use package::unpack_package;
