//! Test fixtures: build plaintext containers and run the documented cipher
//! forward so the decode path can be exercised end to end.

use aes::cipher::{generic_array::GenericArray, BlockEncryptMut, KeyIvInit};

use crate::cipher::{HEADER_REGION, IV};
use crate::container::{FIRST_MARK, HEADER_LEN, LAST_MARK};
use crate::key::KeyMaterial;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;

/// Where file data starts in fixtures: right after the cipher header region.
pub const DATA_START: usize = HEADER_REGION;
/// Pad tail the packer writes at the end of the header region (pad = 16).
const PAD_REGION: std::ops::Range<usize> = HEADER_REGION - 16..HEADER_REGION;

/// Build a bare header + index with explicit entry offsets/sizes, resized to
/// `total_len`. No pad tail, no file data: parser-level fixtures only.
pub fn build_toc(entries: &[(&str, u32, u32)], total_len: usize) -> Vec<u8> {
    let mut buf = vec![0u8; HEADER_LEN];
    buf[0] = FIRST_MARK;
    buf[13] = LAST_MARK;
    buf[14..18].copy_from_slice(&(entries.len() as u32).to_be_bytes());

    for (name, offset, size) in entries {
        buf.extend_from_slice(&(name.len() as u32).to_be_bytes());
        buf.extend_from_slice(name.as_bytes());
        buf.extend_from_slice(&offset.to_be_bytes());
        buf.extend_from_slice(&size.to_be_bytes());
    }

    let index_len = (buf.len() - 14) as u32;
    buf[5..9].copy_from_slice(&index_len.to_be_bytes());

    if buf.len() < total_len {
        buf.resize(total_len, 0);
    }
    buf
}

/// Build a complete plaintext container: header + index in the first region,
/// the packer's pad tail at its end, file data laid out sequentially from
/// [`DATA_START`]. Offsets are absolute, as the protocol stores them.
pub fn build_container(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut laid_out = Vec::with_capacity(files.len());
    let mut cursor = DATA_START as u32;
    for (name, data) in files {
        laid_out.push((*name, cursor, data.len() as u32));
        cursor += data.len() as u32;
    }

    let total = cursor as usize;
    let mut buf = build_toc(&laid_out, total.max(HEADER_REGION));
    assert!(
        index_end(&laid_out) <= PAD_REGION.start,
        "fixture index collides with the pad tail"
    );

    buf[9..13].copy_from_slice(&((total - DATA_START) as u32).to_be_bytes());
    buf[PAD_REGION].fill(0x10);

    for ((_, offset, _), (_, data)) in laid_out.iter().zip(files) {
        let start = *offset as usize;
        buf[start..start + data.len()].copy_from_slice(data);
    }
    buf
}

fn index_end(entries: &[(&str, u32, u32)]) -> usize {
    HEADER_LEN
        + entries
            .iter()
            .map(|(name, _, _)| 12 + name.len())
            .sum::<usize>()
}

/// Run the documented cipher forward: AES-256-CBC over the header region
/// (which must already carry its pad tail), single-byte XOR over the rest.
pub fn encrypt_package(plain: &[u8], key: &KeyMaterial) -> Vec<u8> {
    assert!(plain.len() >= HEADER_REGION, "fixture shorter than the header region");
    assert!(
        plain[PAD_REGION].iter().all(|&b| b == 0x10),
        "fixture header region missing its pad tail"
    );

    let mut out = plain.to_vec();
    let mut enc = Aes256CbcEnc::new(&key.cipher_key.into(), &IV.into());
    for block in out[..HEADER_REGION].chunks_exact_mut(16) {
        enc.encrypt_block_mut(GenericArray::from_mut_slice(block));
    }
    for byte in &mut out[HEADER_REGION..] {
        *byte ^= key.xor_key;
    }
    out
}
