use thiserror::Error;

/// Errors from the two-stage cipher over a raw package.
///
/// Both variants mean the package could not be decrypted at all; `BadPadding`
/// is the strong "wrong wxid" signal.
#[derive(Error, Debug)]
pub enum CipherError {
    #[error("package truncated: {len} bytes, header region needs {min}")]
    Truncated { len: usize, min: usize },

    #[error("header region failed padding check (wrong wxid?)")]
    BadPadding,
}

/// Errors from parsing the decrypted container.
///
/// Always fatal for the package in question: the input is either not a
/// wxapkg container (or was decrypted with the wrong key) or is hostile.
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("bad container marks: first {first:#04x}, last {last:#04x}")]
    BadMagic { first: u8, last: u8 },

    #[error("index table truncated: needs {needed} bytes, have {available}")]
    TruncatedTable { needed: usize, available: usize },

    #[error("entry name escapes output root: {0}")]
    PathTraversal(String),

    #[error("entry {name} out of range: offset {offset} + size {size} exceeds {len} bytes")]
    EntryOutOfBounds {
        name: String,
        offset: u32,
        size: u32,
        len: usize,
    },

    #[error("invalid entry name: {0}")]
    InvalidName(String),
}

#[derive(Error, Debug)]
pub enum WxapkgError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cipher error: {0}")]
    Cipher(#[from] CipherError),

    #[error("format error: {0}")]
    Format(#[from] FormatError),

    #[error("worker pool error: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),

    #[error("no wxid found in path: {0} (expected wx followed by 16 hex digits)")]
    WxidNotFound(String),

    #[error("no .wxapkg packages found under {0}")]
    NoPackages(String),
}

pub type Result<T> = std::result::Result<T, WxapkgError>;
