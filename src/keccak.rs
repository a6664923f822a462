//! The single seam through which this crate touches a hash primitive.
//!
//! Selector and event-topic derivation both reduce to "KECCAK-256 a UTF-8
//! signature string". Keeping that one call behind a named function, rather
//! than scattering `Keccak256::digest` calls through [`crate::selector`] and
//! [`crate::spec`], means a downstream crate that needs a different (but
//! still Ethereum-flavor) Keccak implementation only has to shadow this one
//! function.

use sha3::{Digest, Keccak256};

/// KECCAK-256 (the Ethereum flavor, not NIST SHA3) of `data`.
pub fn hash256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_vector() {
        // keccak256("") per the canonical Ethereum test vectors.
        let digest = hash256(b"");
        let expected = alloy_primitives::hex::decode(
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470",
        )
        .unwrap();
        assert_eq!(&digest[..], &expected[..]);
    }

    #[test]
    fn baz_selector_vector() {
        let digest = hash256(b"baz(uint256,address)");
        assert_eq!(&digest[..4], &[0xa2, 0x91, 0xad, 0xd6]);
    }

    #[test]
    fn transfer_topic_vector() {
        let digest = hash256(b"Transfer(address,address,uint256)");
        let expected = alloy_primitives::hex::decode(
            "ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef",
        )
        .unwrap();
        assert_eq!(&digest[..], &expected[..]);
    }
}
