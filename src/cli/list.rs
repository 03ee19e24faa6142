use std::fs;
use std::path::Path;

use crate::error::{Result, WxapkgError};
use crate::{cipher, container, key, scan};

/// Options for the list command
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    /// wxid override; recovered from the package path when absent
    pub wxid: Option<String>,
    /// Show size and kind columns
    pub detailed: bool,
    /// Emit the entry table as JSON instead of text
    pub json: bool,
}

/// Decrypt one package and print its table of contents in table order.
/// Returns the entry count.
pub fn run_list(package_path: &Path, options: &ListOptions) -> Result<usize> {
    let wxid = match &options.wxid {
        Some(wxid) => wxid.clone(),
        None => scan::parse_wxid(&package_path.to_string_lossy())
            .ok_or_else(|| WxapkgError::WxidNotFound(package_path.display().to_string()))?,
    };

    let raw = fs::read(package_path)?;
    let km = key::derive(&wxid);
    let decrypted = cipher::decrypt(&raw, &km)?;
    let entries = container::parse(&decrypted)?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(entries.len());
    }

    for entry in &entries {
        if options.detailed {
            println!("{:>10} {:>6} {}", entry.size, entry.kind(), entry.name);
        } else {
            println!("{}", entry.name);
        }
    }
    println!("\nTotal: {} entries", entries.len());

    Ok(entries.len())
}
