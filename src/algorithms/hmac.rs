use std::fmt;

use rand::RngCore;
use zeroize::Zeroize;

/// A secret key for the HS algorithms.
///
/// The key material is wiped from memory when the key is dropped.
#[derive(Clone)]
pub struct HMACKey {
    raw_key: Vec<u8>,
}

impl Drop for HMACKey {
    fn drop(&mut self) {
        self.raw_key.zeroize();
    }
}

impl HMACKey {
    /// Create a HMAC key from a byte slice.
    pub fn from_bytes(raw_key: &[u8]) -> Self {
        HMACKey {
            raw_key: raw_key.to_vec(),
        }
    }

    /// Generate a random 256-bit HMAC key.
    pub fn generate() -> Self {
        let mut raw_key = vec![0u8; 32];
        rand::thread_rng().fill_bytes(&mut raw_key);
        HMACKey { raw_key }
    }
}

impl AsRef<[u8]> for HMACKey {
    /// Get the raw key, as a byte slice
    fn as_ref(&self) -> &[u8] {
        &self.raw_key
    }
}

impl fmt::Debug for HMACKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HMACKey")
            .field("len", &self.raw_key.len())
            .finish()
    }
}

#[test]
fn generated_keys_differ() {
    let a = HMACKey::generate();
    let b = HMACKey::generate();
    assert_eq!(a.as_ref().len(), 32);
    assert_ne!(a.as_ref(), b.as_ref());
    assert_eq!(HMACKey::from_bytes(a.as_ref()).as_ref(), a.as_ref());
    assert!(!format!("{:?}", a).contains(&format!("{:?}", a.as_ref())));
}
