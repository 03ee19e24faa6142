use std::fmt;
use std::ops::Range;

use serde::Serialize;

use crate::error::FormatError;

/// First container mark
pub const FIRST_MARK: u8 = 0xBE;
/// Last container mark
pub const LAST_MARK: u8 = 0xED;
/// Fixed header size: marks, three u32 fields, entry count
pub const HEADER_LEN: usize = 18;
/// Sanity bound on a single entry name
const MAX_NAME_LEN: usize = 10 * 1024 * 1024;

/// Supported container layouts, dispatched on the magic marks.
///
/// Only one layout exists today; a future revision with different marks
/// gets its own variant and parse routine rather than runtime probing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerVersion {
    V1,
}

impl ContainerVersion {
    /// Detect the container version from the magic marks.
    pub fn detect(data: &[u8]) -> Result<Self, FormatError> {
        if data.len() < HEADER_LEN {
            return Err(FormatError::TruncatedTable {
                needed: HEADER_LEN,
                available: data.len(),
            });
        }
        let first = data[0];
        let last = data[13];
        match (first, last) {
            (FIRST_MARK, LAST_MARK) => Ok(Self::V1),
            _ => Err(FormatError::BadMagic { first, last }),
        }
    }
}

/// Fixed-layout container header (all integers big-endian).
///
/// Layout: `first_mark(1) | info1(4) | index_len(4) | body_len(4) |
/// last_mark(1) | entry_count(4)`. `index_len` spans the entry count plus
/// the entry records; `info1` is reserved by the protocol.
#[derive(Debug, Clone)]
pub struct ContainerHeader {
    pub version: ContainerVersion,
    pub info1: u32,
    pub index_len: u32,
    pub body_len: u32,
    pub entry_count: u32,
}

impl ContainerHeader {
    /// Parse and validate the header at the start of a decrypted stream.
    pub fn parse(data: &[u8]) -> Result<Self, FormatError> {
        let version = ContainerVersion::detect(data)?;
        let info1 = read_be_u32(data, 1);
        let index_len = read_be_u32(data, 5);
        let body_len = read_be_u32(data, 9);
        let entry_count = read_be_u32(data, 14);

        // The index region starts at the count field (offset 14) and must
        // fit inside the stream.
        let index_end = 14usize.saturating_add(index_len as usize);
        if index_end > data.len() {
            return Err(FormatError::TruncatedTable {
                needed: index_end,
                available: data.len(),
            });
        }

        Ok(Self {
            version,
            info1,
            index_len,
            body_len,
            entry_count,
        })
    }
}

fn read_be_u32(data: &[u8], at: usize) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&data[at..at + 4]);
    u32::from_be_bytes(buf)
}

/// Logical type of an extracted file, for the external beautifier stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Script,
    Markup,
    Style,
    Data,
    Other,
}

impl FileKind {
    /// Classify by file extension.
    pub fn from_name(name: &str) -> Self {
        let ext = match name.rsplit_once('.') {
            Some((_, ext)) => ext.to_ascii_lowercase(),
            None => return Self::Other,
        };
        match ext.as_str() {
            "js" => Self::Script,
            "wxml" | "html" => Self::Markup,
            "wxss" | "css" => Self::Style,
            "json" => Self::Data,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Script => "script",
            Self::Markup => "markup",
            Self::Style => "style",
            Self::Data => "data",
            Self::Other => "other",
        };
        write!(f, "{}", s)
    }
}

/// One table-of-contents entry: a virtual path and its byte range in the
/// decrypted stream. Offsets are absolute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    pub name: String,
    pub offset: u32,
    pub size: u32,
}

impl TocEntry {
    /// Byte range of this entry within the decrypted stream.
    pub fn range(&self) -> Range<usize> {
        let start = self.offset as usize;
        start..start + self.size as usize
    }

    /// Logical file type for the external beautifier.
    pub fn kind(&self) -> FileKind {
        FileKind::from_name(&self.name)
    }
}

/// Bounds-checked cursor over the index region.
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8], pos: usize) -> Self {
        Self { data, pos }
    }

    fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], FormatError> {
        let end = self.pos.saturating_add(n);
        if end > self.data.len() {
            return Err(FormatError::TruncatedTable {
                needed: end,
                available: self.data.len(),
            });
        }
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn read_u32(&mut self) -> Result<u32, FormatError> {
        let bytes = self.read_bytes(4)?;
        let mut buf = [0u8; 4];
        buf.copy_from_slice(bytes);
        Ok(u32::from_be_bytes(buf))
    }
}

/// Parse the decrypted stream into its TOC entries, in table order.
///
/// Table order defines the deterministic traversal order; duplicates are
/// permitted by the format and resolved last-write-wins at extraction.
/// Every entry is validated here, before any file I/O happens: byte range
/// against the stream length, name against `..` traversal.
pub fn parse(data: &[u8]) -> Result<Vec<TocEntry>, FormatError> {
    let header = ContainerHeader::parse(data)?;
    match header.version {
        ContainerVersion::V1 => parse_v1(data, &header),
    }
}

fn parse_v1(data: &[u8], header: &ContainerHeader) -> Result<Vec<TocEntry>, FormatError> {
    let mut reader = Reader::new(data, HEADER_LEN);
    let mut entries = Vec::with_capacity(header.entry_count as usize);

    for _ in 0..header.entry_count {
        let name_len = reader.read_u32()? as usize;
        if name_len == 0 || name_len > MAX_NAME_LEN {
            return Err(FormatError::InvalidName(format!(
                "name length {} out of range",
                name_len
            )));
        }
        let name_bytes = reader.read_bytes(name_len)?;
        let name = std::str::from_utf8(name_bytes)
            .map_err(|_| FormatError::InvalidName("name is not valid UTF-8".into()))?
            .to_string();
        let offset = reader.read_u32()?;
        let size = reader.read_u32()?;

        check_traversal(&name)?;

        let end = offset as usize + size as usize;
        if end > data.len() {
            return Err(FormatError::EntryOutOfBounds {
                name,
                offset,
                size,
                len: data.len(),
            });
        }

        entries.push(TocEntry { name, offset, size });
    }

    Ok(entries)
}

/// Reject names with parent-directory segments, regardless of whether
/// their byte range is otherwise valid.
fn check_traversal(name: &str) -> Result<(), FormatError> {
    if name.split(['/', '\\']).any(|seg| seg == "..") {
        return Err(FormatError::PathTraversal(name.to_string()));
    }
    Ok(())
}
