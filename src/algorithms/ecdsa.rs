use std::fmt;

use p256::ecdsa::signature::hazmat::{PrehashVerifier, RandomizedPrehashSigner};
use p256::pkcs8::{DecodePrivateKey, DecodePublicKey};

use super::Curve;
use crate::bigint::BigintPair;
use crate::error::*;

/// An ECDSA key over one of the NIST curves used by ES256, ES384 and ES512.
///
/// Keys loaded from a public key only verify; signing with them fails with
/// `UnsupportedAlgorithm`.
#[derive(Clone)]
pub enum ECDSAKey {
    P256 {
        sk: Option<p256::ecdsa::SigningKey>,
        pk: p256::ecdsa::VerifyingKey,
    },
    P384 {
        sk: Option<p384::ecdsa::SigningKey>,
        pk: p384::ecdsa::VerifyingKey,
    },
    P521 {
        sk: Option<p521::ecdsa::SigningKey>,
        pk: p521::ecdsa::VerifyingKey,
    },
}

impl ECDSAKey {
    pub fn generate(curve: Curve) -> Self {
        let mut rng = rand::thread_rng();
        match curve {
            Curve::P256 => {
                let sk = p256::ecdsa::SigningKey::random(&mut rng);
                let pk = *sk.verifying_key();
                ECDSAKey::P256 { sk: Some(sk), pk }
            }
            Curve::P384 => {
                let sk = p384::ecdsa::SigningKey::random(&mut rng);
                let pk = *sk.verifying_key();
                ECDSAKey::P384 { sk: Some(sk), pk }
            }
            Curve::P521 => {
                let sk = p521::ecdsa::SigningKey::random(&mut rng);
                let pk = p521::ecdsa::VerifyingKey::from(&sk);
                ECDSAKey::P521 { sk: Some(sk), pk }
            }
        }
    }

    /// Load a private key from a raw big-endian scalar.
    pub fn from_bytes(curve: Curve, raw: &[u8]) -> Result<Self, Error> {
        let key = match curve {
            Curve::P256 => {
                let sk = p256::ecdsa::SigningKey::from_slice(raw)
                    .map_err(|_| JWTError::InvalidKeyPair)?;
                let pk = *sk.verifying_key();
                ECDSAKey::P256 { sk: Some(sk), pk }
            }
            Curve::P384 => {
                let sk = p384::ecdsa::SigningKey::from_slice(raw)
                    .map_err(|_| JWTError::InvalidKeyPair)?;
                let pk = *sk.verifying_key();
                ECDSAKey::P384 { sk: Some(sk), pk }
            }
            Curve::P521 => {
                let sk = p521::ecdsa::SigningKey::from_slice(raw)
                    .map_err(|_| JWTError::InvalidKeyPair)?;
                let pk = p521::ecdsa::VerifyingKey::from(&sk);
                ECDSAKey::P521 { sk: Some(sk), pk }
            }
        };
        Ok(key)
    }

    /// Load a PKCS#8 private key. The curve is taken from the key itself.
    pub fn from_der(der: &[u8]) -> Result<Self, Error> {
        if let Ok(secret) = p256::SecretKey::from_pkcs8_der(der) {
            return Self::from_bytes(Curve::P256, &secret.to_bytes());
        }
        if let Ok(secret) = p384::SecretKey::from_pkcs8_der(der) {
            return Self::from_bytes(Curve::P384, &secret.to_bytes());
        }
        let secret =
            p521::SecretKey::from_pkcs8_der(der).map_err(|_| JWTError::InvalidKeyPair)?;
        Self::from_bytes(Curve::P521, &secret.to_bytes())
    }

    /// Load a PKCS#8 private key from PEM. The curve is taken from the key itself.
    pub fn from_pem(pem: &str) -> Result<Self, Error> {
        let pem = pem.trim();
        if let Ok(secret) = p256::SecretKey::from_pkcs8_pem(pem) {
            return Self::from_bytes(Curve::P256, &secret.to_bytes());
        }
        if let Ok(secret) = p384::SecretKey::from_pkcs8_pem(pem) {
            return Self::from_bytes(Curve::P384, &secret.to_bytes());
        }
        let secret =
            p521::SecretKey::from_pkcs8_pem(pem).map_err(|_| JWTError::InvalidKeyPair)?;
        Self::from_bytes(Curve::P521, &secret.to_bytes())
    }

    /// Load a verification-only key from a SubjectPublicKeyInfo PEM document.
    pub fn public_key_from_pem(pem: &str) -> Result<Self, Error> {
        let pem = pem.trim();
        if let Ok(public) = p256::PublicKey::from_public_key_pem(pem) {
            let pk = p256::ecdsa::VerifyingKey::from_affine(*public.as_affine())
                .map_err(|_| JWTError::InvalidPublicKey)?;
            return Ok(ECDSAKey::P256 { sk: None, pk });
        }
        if let Ok(public) = p384::PublicKey::from_public_key_pem(pem) {
            let pk = p384::ecdsa::VerifyingKey::from_affine(*public.as_affine())
                .map_err(|_| JWTError::InvalidPublicKey)?;
            return Ok(ECDSAKey::P384 { sk: None, pk });
        }
        let public =
            p521::PublicKey::from_public_key_pem(pem).map_err(|_| JWTError::InvalidPublicKey)?;
        let pk = p521::ecdsa::VerifyingKey::from_affine(*public.as_affine())
            .map_err(|_| JWTError::InvalidPublicKey)?;
        Ok(ECDSAKey::P521 { sk: None, pk })
    }

    /// Load a verification-only key from a SEC1 encoded point.
    pub fn public_key_from_sec1_bytes(curve: Curve, raw: &[u8]) -> Result<Self, Error> {
        let key = match curve {
            Curve::P256 => ECDSAKey::P256 {
                sk: None,
                pk: p256::ecdsa::VerifyingKey::from_sec1_bytes(raw)
                    .map_err(|_| JWTError::InvalidPublicKey)?,
            },
            Curve::P384 => ECDSAKey::P384 {
                sk: None,
                pk: p384::ecdsa::VerifyingKey::from_sec1_bytes(raw)
                    .map_err(|_| JWTError::InvalidPublicKey)?,
            },
            Curve::P521 => ECDSAKey::P521 {
                sk: None,
                pk: p521::ecdsa::VerifyingKey::from_sec1_bytes(raw)
                    .map_err(|_| JWTError::InvalidPublicKey)?,
            },
        };
        Ok(key)
    }

    /// A verification-only copy of this key.
    pub fn public_key(&self) -> ECDSAKey {
        match self {
            ECDSAKey::P256 { pk, .. } => ECDSAKey::P256 { sk: None, pk: *pk },
            ECDSAKey::P384 { pk, .. } => ECDSAKey::P384 { sk: None, pk: *pk },
            ECDSAKey::P521 { pk, .. } => ECDSAKey::P521 {
                sk: None,
                pk: pk.clone(),
            },
        }
    }

    pub fn curve(&self) -> Curve {
        match self {
            ECDSAKey::P256 { .. } => Curve::P256,
            ECDSAKey::P384 { .. } => Curve::P384,
            ECDSAKey::P521 { .. } => Curve::P521,
        }
    }

    pub fn can_sign(&self) -> bool {
        match self {
            ECDSAKey::P256 { sk, .. } => sk.is_some(),
            ECDSAKey::P384 { sk, .. } => sk.is_some(),
            ECDSAKey::P521 { sk, .. } => sk.is_some(),
        }
    }

    /// Sign a precomputed digest, returning `r || s` at the curve's field size.
    ///
    /// Signatures are randomized: the nonce mixes fresh entropy into the
    /// deterministic RFC 6979 derivation.
    pub(crate) fn sign_prehash(&self, digest: &[u8]) -> Result<Vec<u8>, Error> {
        let mut rng = rand::thread_rng();
        let (r, s) = match self {
            ECDSAKey::P256 { sk: Some(sk), .. } => {
                let signature: p256::ecdsa::Signature = sk
                    .sign_prehash_with_rng(&mut rng, digest)
                    .map_err(|_| JWTError::SigningFailed)?;
                let (r, s) = signature.split_bytes();
                (r.to_vec(), s.to_vec())
            }
            ECDSAKey::P384 { sk: Some(sk), .. } => {
                let signature: p384::ecdsa::Signature = sk
                    .sign_prehash_with_rng(&mut rng, digest)
                    .map_err(|_| JWTError::SigningFailed)?;
                let (r, s) = signature.split_bytes();
                (r.to_vec(), s.to_vec())
            }
            ECDSAKey::P521 { sk: Some(sk), .. } => {
                let signature: p521::ecdsa::Signature = sk
                    .sign_prehash_with_rng(&mut rng, digest)
                    .map_err(|_| JWTError::SigningFailed)?;
                let (r, s) = signature.split_bytes();
                (r.to_vec(), s.to_vec())
            }
            _ => return Err(JWTError::UnsupportedAlgorithm),
        };
        BigintPair::from_be_bytes(&r, &s)
            .encode(self.curve().field_size())
            .map_err(|_| JWTError::SigningFailed)
    }

    /// Verify a fixed-width `r || s` signature over a precomputed digest.
    pub(crate) fn verify_prehash(&self, digest: &[u8], signature: &[u8]) -> Result<(), Error> {
        let width = self.curve().field_size();
        ensure!(signature.len() == 2 * width, JWTError::InvalidToken);
        let (r, s) = BigintPair::decode(signature)?.to_padded_halves(width)?;
        let verified = match self {
            ECDSAKey::P256 { pk, .. } => {
                let signature = p256::ecdsa::Signature::from_scalars(
                    p256::FieldBytes::clone_from_slice(&r),
                    p256::FieldBytes::clone_from_slice(&s),
                )
                .map_err(|_| JWTError::InvalidToken)?;
                pk.verify_prehash(digest, &signature)
            }
            ECDSAKey::P384 { pk, .. } => {
                let signature = p384::ecdsa::Signature::from_scalars(
                    p384::FieldBytes::clone_from_slice(&r),
                    p384::FieldBytes::clone_from_slice(&s),
                )
                .map_err(|_| JWTError::InvalidToken)?;
                pk.verify_prehash(digest, &signature)
            }
            ECDSAKey::P521 { pk, .. } => {
                let signature = p521::ecdsa::Signature::from_scalars(
                    p521::FieldBytes::clone_from_slice(&r),
                    p521::FieldBytes::clone_from_slice(&s),
                )
                .map_err(|_| JWTError::InvalidToken)?;
                pk.verify_prehash(digest, &signature)
            }
        };
        verified.map_err(|_| JWTError::InvalidToken)
    }
}

impl fmt::Debug for ECDSAKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ECDSAKey")
            .field("curve", &self.curve())
            .field("can_sign", &self.can_sign())
            .finish()
    }
}
