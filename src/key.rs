use pbkdf2::pbkdf2_hmac;
use sha1::Sha1;

/// PBKDF2 salt fixed by the protocol
pub const SALT: &[u8] = b"saltiest";
/// PBKDF2 iteration count fixed by the protocol
pub const PBKDF2_ROUNDS: u32 = 1000;
/// AES-256 key length
pub const KEY_LEN: usize = 32;
/// XOR key used when the wxid is too short to supply one
pub const DEFAULT_XOR_KEY: u8 = 0x66;

/// Key material for one package decode: the AES key for the header region
/// and the single-byte keystream for everything past it.
///
/// The two derivation paths are independent: the AES key comes from PBKDF2
/// over the wxid, the XOR key is the wxid's second-to-last byte (the
/// protocol's own choice, not derived from the PBKDF2 output).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMaterial {
    pub cipher_key: [u8; KEY_LEN],
    pub xor_key: u8,
}

/// Derive key material from a wxid.
///
/// Pure and deterministic: the same wxid always yields the same material,
/// and a wrong wxid yields material that fails padding validation
/// downstream rather than an error here.
pub fn derive(wxid: &str) -> KeyMaterial {
    let mut cipher_key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha1>(wxid.as_bytes(), SALT, PBKDF2_ROUNDS, &mut cipher_key);

    let bytes = wxid.as_bytes();
    let xor_key = if bytes.len() >= 2 {
        bytes[bytes.len() - 2]
    } else {
        DEFAULT_XOR_KEY
    };

    KeyMaterial { cipher_key, xor_key }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_derive_is_deterministic() {
        let a = derive("wx1234567890abcdef");
        let b = derive("wx1234567890abcdef");
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_wxids_differ() {
        let a = derive("wx1234567890abcdef");
        let b = derive("wxfedcba0987654321");
        assert_ne!(a.cipher_key, b.cipher_key);
    }

    #[test]
    fn test_xor_key_is_second_to_last_byte() {
        let km = derive("wxExample123");
        assert_eq!(km.xor_key, b'2');
    }

    #[test]
    fn test_xor_key_fallback_for_short_wxid() {
        assert_eq!(derive("").xor_key, DEFAULT_XOR_KEY);
        assert_eq!(derive("w").xor_key, DEFAULT_XOR_KEY);
        assert_eq!(derive("wx").xor_key, b'w');
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_derive_deterministic(wxid in "[a-z0-9]{0,24}") {
            prop_assert_eq!(derive(&wxid), derive(&wxid));
        }

        #[test]
        fn prop_distinct_wxids_distinct_keys(
            a in "wx[0-9a-f]{16}",
            b in "wx[0-9a-f]{16}",
        ) {
            prop_assume!(a != b);
            prop_assert_ne!(derive(&a).cipher_key, derive(&b).cipher_key);
        }
    }
}
