use std::fmt;

use hmac_sha512::sha384 as hmac_sha384;
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::traits::PublicKeyParts;
use rsa::{Pkcs1v15Sign, Pss, RsaPrivateKey, RsaPublicKey};

use super::HashFunction;
use crate::error::*;

/// An RSA key, used by both the RS and PS algorithms.
///
/// A key loaded from a public key only verifies; signing with it fails with
/// `UnsupportedAlgorithm`.
#[derive(Clone)]
pub struct RSAKey {
    rsa_sk: Option<RsaPrivateKey>,
    rsa_pk: RsaPublicKey,
}

impl RSAKey {
    /// Load a private key from DER, either PKCS#8 or PKCS#1.
    pub fn from_der(der: &[u8]) -> Result<Self, Error> {
        let rsa_sk = RsaPrivateKey::from_pkcs8_der(der)
            .or_else(|_| RsaPrivateKey::from_pkcs1_der(der))
            .map_err(|_| JWTError::InvalidKeyPair)?;
        Self::from_private_key(rsa_sk)
    }

    /// Load a private key from PEM, either PKCS#8 or PKCS#1.
    pub fn from_pem(pem: &str) -> Result<Self, Error> {
        let pem = pem.trim();
        let rsa_sk = RsaPrivateKey::from_pkcs8_pem(pem)
            .or_else(|_| RsaPrivateKey::from_pkcs1_pem(pem))
            .map_err(|_| JWTError::InvalidKeyPair)?;
        Self::from_private_key(rsa_sk)
    }

    pub fn from_private_key(rsa_sk: RsaPrivateKey) -> Result<Self, Error> {
        rsa_sk.validate().map_err(|_| JWTError::InvalidKeyPair)?;
        let rsa_pk = rsa_sk.to_public_key();
        Ok(RSAKey {
            rsa_sk: Some(rsa_sk),
            rsa_pk,
        })
    }

    /// Load a verification-only key from DER (SubjectPublicKeyInfo or PKCS#1).
    pub fn public_key_from_der(der: &[u8]) -> Result<Self, Error> {
        let rsa_pk = RsaPublicKey::from_public_key_der(der)
            .or_else(|_| RsaPublicKey::from_pkcs1_der(der))
            .map_err(|_| JWTError::InvalidPublicKey)?;
        Ok(Self::from_public_key(rsa_pk))
    }

    /// Load a verification-only key from PEM (SubjectPublicKeyInfo or PKCS#1).
    pub fn public_key_from_pem(pem: &str) -> Result<Self, Error> {
        let pem = pem.trim();
        let rsa_pk = RsaPublicKey::from_public_key_pem(pem)
            .or_else(|_| RsaPublicKey::from_pkcs1_pem(pem))
            .map_err(|_| JWTError::InvalidPublicKey)?;
        Ok(Self::from_public_key(rsa_pk))
    }

    pub fn from_public_key(rsa_pk: RsaPublicKey) -> Self {
        RSAKey {
            rsa_sk: None,
            rsa_pk,
        }
    }

    pub fn generate(modulus_bits: usize) -> Result<Self, Error> {
        match modulus_bits {
            2048 | 3072 | 4096 => {}
            _ => return Err(JWTError::UnsupportedRSAModulus),
        };
        let mut rng = rand::thread_rng();
        let rsa_sk =
            RsaPrivateKey::new(&mut rng, modulus_bits).map_err(|_| JWTError::InvalidKeyPair)?;
        Self::from_private_key(rsa_sk)
    }

    /// A verification-only copy of this key.
    pub fn public_key(&self) -> RSAKey {
        Self::from_public_key(self.rsa_pk.clone())
    }

    pub fn modulus_bits(&self) -> usize {
        self.rsa_pk.n().bits()
    }

    pub fn can_sign(&self) -> bool {
        self.rsa_sk.is_some()
    }

    fn signing_key(&self) -> Result<&RsaPrivateKey, Error> {
        self.rsa_sk.as_ref().ok_or(JWTError::UnsupportedAlgorithm)
    }

    /// RSASSA-PKCS1-v1_5 over a precomputed digest.
    pub(crate) fn sign_pkcs1v15(
        &self,
        hash_function: HashFunction,
        digest: &[u8],
    ) -> Result<Vec<u8>, Error> {
        let mut rng = rand::thread_rng();
        self.signing_key()?
            .sign_with_rng(&mut rng, pkcs1v15_scheme(hash_function), digest)
            .map_err(|_| JWTError::SigningFailed)
    }

    pub(crate) fn verify_pkcs1v15(
        &self,
        hash_function: HashFunction,
        digest: &[u8],
        signature: &[u8],
    ) -> Result<(), Error> {
        self.rsa_pk
            .verify(pkcs1v15_scheme(hash_function), digest, signature)
            .map_err(|_| JWTError::InvalidToken)
    }

    /// RSASSA-PSS over a precomputed digest. Signatures are randomized.
    pub(crate) fn sign_pss(&self, options: &PssOptions, digest: &[u8]) -> Result<Vec<u8>, Error> {
        let mut rng = rand::thread_rng();
        self.signing_key()?
            .sign_with_rng(&mut rng, options.scheme(), digest)
            .map_err(|_| JWTError::SigningFailed)
    }

    pub(crate) fn verify_pss(
        &self,
        options: &PssOptions,
        digest: &[u8],
        signature: &[u8],
    ) -> Result<(), Error> {
        self.rsa_pk
            .verify(options.scheme(), digest, signature)
            .map_err(|_| JWTError::InvalidToken)
    }
}

impl fmt::Debug for RSAKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RSAKey")
            .field("modulus_bits", &self.modulus_bits())
            .field("can_sign", &self.can_sign())
            .finish()
    }
}

fn pkcs1v15_scheme(hash_function: HashFunction) -> Pkcs1v15Sign {
    match hash_function {
        HashFunction::Sha256 => Pkcs1v15Sign::new::<hmac_sha256::Hash>(),
        HashFunction::Sha384 => Pkcs1v15Sign::new::<hmac_sha384::Hash>(),
        HashFunction::Sha512 => Pkcs1v15Sign::new::<hmac_sha512::Hash>(),
    }
}

/// Salt length used by RSASSA-PSS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaltLength {
    /// As many salt bytes as the hash function outputs.
    EqualsHash,
    Bytes(usize),
}

/// Parameters of RSASSA-PSS signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PssOptions {
    pub hash_function: HashFunction,
    pub salt_length: SaltLength,
}

impl PssOptions {
    pub fn new(hash_function: HashFunction) -> Self {
        PssOptions {
            hash_function,
            salt_length: SaltLength::EqualsHash,
        }
    }

    pub fn with_salt_length(mut self, salt_length: SaltLength) -> Self {
        self.salt_length = salt_length;
        self
    }

    pub fn salt_len(&self) -> usize {
        match self.salt_length {
            SaltLength::EqualsHash => self.hash_function.output_size(),
            SaltLength::Bytes(len) => len,
        }
    }

    fn scheme(&self) -> Pss {
        let salt_len = self.salt_len();
        match self.hash_function {
            HashFunction::Sha256 => Pss::new_with_salt::<hmac_sha256::Hash>(salt_len),
            HashFunction::Sha384 => Pss::new_with_salt::<hmac_sha384::Hash>(salt_len),
            HashFunction::Sha512 => Pss::new_with_salt::<hmac_sha512::Hash>(salt_len),
        }
    }
}
