use aes::cipher::{generic_array::GenericArray, BlockDecryptMut, KeyIvInit};

use crate::error::CipherError;
use crate::key::KeyMaterial;

type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// CBC initialization vector fixed by the protocol
pub const IV: [u8; 16] = *b"the iv: 16 bytes";
/// Length of the AES-CBC protected region at the start of a package
pub const HEADER_REGION: usize = 1024;
/// AES block length
const BLOCK_LEN: usize = 16;

/// Decrypt a raw package into the plaintext container stream.
///
/// Two stages: AES-256-CBC over the first [`HEADER_REGION`] bytes with the
/// protocol IV, then a repeating single-byte XOR over everything after it.
/// The header region must end in a well-formed PKCS#7 tail; a malformed
/// tail means the key (and therefore the wxid) is wrong. The padding is
/// validated but left in place, so the output has exactly the input's
/// length and all container offsets stay absolute.
pub fn decrypt(raw: &[u8], key: &KeyMaterial) -> Result<Vec<u8>, CipherError> {
    if raw.len() < HEADER_REGION {
        return Err(CipherError::Truncated {
            len: raw.len(),
            min: HEADER_REGION,
        });
    }

    let mut out = raw.to_vec();

    let mut dec = Aes256CbcDec::new(&key.cipher_key.into(), &IV.into());
    for block in out[..HEADER_REGION].chunks_exact_mut(BLOCK_LEN) {
        dec.decrypt_block_mut(GenericArray::from_mut_slice(block));
    }
    check_pkcs7_tail(&out[..HEADER_REGION])?;

    for byte in &mut out[HEADER_REGION..] {
        *byte ^= key.xor_key;
    }

    Ok(out)
}

/// Validate the PKCS#7 tail of the decrypted header region without
/// stripping it: pad value in 1..=16 and all pad bytes equal to it.
fn check_pkcs7_tail(region: &[u8]) -> Result<(), CipherError> {
    let pad = region[region.len() - 1] as usize;
    if pad == 0 || pad > BLOCK_LEN {
        return Err(CipherError::BadPadding);
    }
    if region[region.len() - pad..].iter().any(|&b| b as usize != pad) {
        return Err(CipherError::BadPadding);
    }
    Ok(())
}
