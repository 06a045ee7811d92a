use std::ops::{Deref, DerefMut};

use crate::algorithms::*;
use crate::common::ProviderConfig;
use crate::digest::{DigestPool, DigestState};
use crate::error::*;

/// An asymmetric key held by a provider.
#[derive(Debug, Clone)]
pub enum AsymmetricKey {
    Rsa(RSAKey),
    Ecdsa(ECDSAKey),
}

impl From<RSAKey> for AsymmetricKey {
    fn from(key: RSAKey) -> Self {
        AsymmetricKey::Rsa(key)
    }
}

impl From<ECDSAKey> for AsymmetricKey {
    fn from(key: ECDSAKey) -> Self {
        AsymmetricKey::Ecdsa(key)
    }
}

/// Supplies digest objects and keys to the signing and verification routines.
///
/// Implementations are shared by every in-flight call, so they must be
/// thread-safe. A digest handed out by `acquire_digest` belongs to a single
/// call until it is passed back to `release_digest`.
pub trait Provider: Send + Sync {
    /// A digest object for `alg`: keyed for HS, plain for every other family.
    /// `None` means the algorithm isn't configured.
    fn acquire_digest(&self, alg: Algorithm) -> Option<DigestState>;

    /// Give back an object previously returned by `acquire_digest`.
    fn release_digest(&self, alg: Algorithm, digest: DigestState);

    /// The key used by an RS, PS or ES algorithm.
    fn key(&self, alg: Algorithm) -> Option<&AsymmetricKey>;

    /// Options for the PS algorithms. `None` selects the default options.
    fn pss_options(&self, alg: Algorithm) -> Option<PssOptions>;
}

/// A digest object borrowed from a provider, returned to it when dropped.
pub struct DigestLoan<'a, P: Provider + ?Sized> {
    provider: &'a P,
    alg: Algorithm,
    digest: DigestState,
}

impl<'a, P: Provider + ?Sized> DigestLoan<'a, P> {
    pub fn acquire(provider: &'a P, alg: Algorithm) -> Result<Self, Error> {
        let digest = provider
            .acquire_digest(alg)
            .ok_or(JWTError::UnsupportedAlgorithm)?;
        Ok(DigestLoan {
            provider,
            alg,
            digest,
        })
    }
}

impl<P: Provider + ?Sized> Deref for DigestLoan<'_, P> {
    type Target = DigestState;

    fn deref(&self) -> &DigestState {
        &self.digest
    }
}

impl<P: Provider + ?Sized> DerefMut for DigestLoan<'_, P> {
    fn deref_mut(&mut self) -> &mut DigestState {
        &mut self.digest
    }
}

impl<P: Provider + ?Sized> Drop for DigestLoan<'_, P> {
    fn drop(&mut self) {
        let digest = std::mem::take(&mut self.digest);
        self.provider.release_digest(self.alg, digest);
    }
}

pub(crate) fn rsa_key<P: Provider + ?Sized>(provider: &P, alg: Algorithm) -> Result<&RSAKey, Error> {
    match provider.key(alg) {
        Some(AsymmetricKey::Rsa(key)) => Ok(key),
        _ => Err(JWTError::UnsupportedAlgorithm),
    }
}

pub(crate) fn ecdsa_key<P: Provider + ?Sized>(
    provider: &P,
    alg: Algorithm,
) -> Result<&ECDSAKey, Error> {
    match provider.key(alg) {
        Some(AsymmetricKey::Ecdsa(key)) if Some(key.curve()) == alg.curve() => Ok(key),
        _ => Err(JWTError::UnsupportedAlgorithm),
    }
}

pub(crate) fn pss_options<P: Provider + ?Sized>(provider: &P, alg: Algorithm) -> PssOptions {
    provider
        .pss_options(alg)
        .unwrap_or_else(|| PssOptions::new(alg.hash_function()))
}

/// The standard provider.
///
/// Plain digests are pooled per hash function and shared by the RS, PS and ES
/// algorithms. Each HS algorithm gets its own pool of keyed HMAC states once
/// a secret is configured for it.
///
/// Keys and secrets are replaced through the `set_*` methods, which need
/// exclusive access: rotation can't race with signing or verification.
#[derive(Debug)]
pub struct DefaultProvider {
    config: ProviderConfig,
    hashes: [DigestPool; 3],
    hmacs: [Option<DigestPool>; 3],
    keys: [Option<AsymmetricKey>; 12],
    pss: [Option<PssOptions>; 3],
}

impl Default for DefaultProvider {
    fn default() -> Self {
        Self::with_config(ProviderConfig::default())
    }
}

impl DefaultProvider {
    /// A provider with plain digests only. HS algorithms and every
    /// asymmetric algorithm stay unsupported until configured.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ProviderConfig) -> Self {
        let max_idle = config.max_idle_digests;
        tracing::debug!(max_idle, "creating provider");
        DefaultProvider {
            config,
            hashes: [
                DigestPool::new(HashFunction::Sha256, max_idle),
                DigestPool::new(HashFunction::Sha384, max_idle),
                DigestPool::new(HashFunction::Sha512, max_idle),
            ],
            hmacs: Default::default(),
            keys: Default::default(),
            pss: Default::default(),
        }
    }

    /// A provider with the three HMAC secrets set, a fresh 2048-bit RSA key
    /// shared by the RS and PS algorithms, and fresh keys for ES256, ES384 and
    /// ES512.
    pub fn generate(
        hs256: impl AsRef<[u8]>,
        hs384: impl AsRef<[u8]>,
        hs512: impl AsRef<[u8]>,
    ) -> Result<Self, Error> {
        let rsa_key = RSAKey::generate(2048)?;
        let mut provider = DefaultProvider::new()
            .with_hmac_secret(Algorithm::HS256, hs256)?
            .with_hmac_secret(Algorithm::HS384, hs384)?
            .with_hmac_secret(Algorithm::HS512, hs512)?;
        for &alg in &[Algorithm::RS256, Algorithm::RS384, Algorithm::RS512] {
            provider.set_rsa_key(alg, rsa_key.clone())?;
        }
        for &alg in &[Algorithm::PS256, Algorithm::PS384, Algorithm::PS512] {
            provider.set_rsa_pss_key(alg, rsa_key.clone(), None)?;
        }
        for &alg in &[Algorithm::ES256, Algorithm::ES384, Algorithm::ES512] {
            if let Some(curve) = alg.curve() {
                provider.set_ecdsa_key(alg, ECDSAKey::generate(curve))?;
            }
        }
        Ok(provider)
    }

    pub fn with_hmac_secret(mut self, alg: Algorithm, secret: impl AsRef<[u8]>) -> Result<Self, Error> {
        self.set_hmac_secret(alg, secret)?;
        Ok(self)
    }

    pub fn with_rsa_key(mut self, alg: Algorithm, key: RSAKey) -> Result<Self, Error> {
        self.set_rsa_key(alg, key)?;
        Ok(self)
    }

    pub fn with_rsa_pss_key(
        mut self,
        alg: Algorithm,
        key: RSAKey,
        options: Option<PssOptions>,
    ) -> Result<Self, Error> {
        self.set_rsa_pss_key(alg, key, options)?;
        Ok(self)
    }

    pub fn with_ecdsa_key(mut self, alg: Algorithm, key: ECDSAKey) -> Result<Self, Error> {
        self.set_ecdsa_key(alg, key)?;
        Ok(self)
    }

    /// Replace the secret of an HS algorithm.
    ///
    /// Idle HMAC states keyed with the previous secret are discarded.
    pub fn set_hmac_secret(&mut self, alg: Algorithm, secret: impl AsRef<[u8]>) -> Result<(), Error> {
        ensure!(alg.family() == Family::Hmac, JWTError::UnsupportedAlgorithm);
        let hash_function = alg.hash_function();
        let pool = DigestPool::new_hmac(
            hash_function,
            secret.as_ref(),
            self.config.max_idle_digests,
        )?;
        self.hmacs[hash_function.index()] = Some(pool);
        tracing::debug!(alg = %alg, "HMAC secret set");
        Ok(())
    }

    /// Replace the key of an RS algorithm.
    pub fn set_rsa_key(&mut self, alg: Algorithm, key: RSAKey) -> Result<(), Error> {
        ensure!(alg.family() == Family::Rsa, JWTError::UnsupportedAlgorithm);
        tracing::debug!(alg = %alg, modulus_bits = key.modulus_bits(), "RSA key set");
        self.keys[alg.index()] = Some(key.into());
        Ok(())
    }

    /// Replace the key and options of a PS algorithm.
    ///
    /// The options must use the hash function of the algorithm.
    pub fn set_rsa_pss_key(
        &mut self,
        alg: Algorithm,
        key: RSAKey,
        options: Option<PssOptions>,
    ) -> Result<(), Error> {
        ensure!(alg.family() == Family::RsaPss, JWTError::UnsupportedAlgorithm);
        if let Some(options) = &options {
            ensure!(
                options.hash_function == alg.hash_function(),
                JWTError::UnsupportedAlgorithm
            );
        }
        tracing::debug!(alg = %alg, modulus_bits = key.modulus_bits(), "RSA-PSS key set");
        self.keys[alg.index()] = Some(key.into());
        self.pss[alg.hash_function().index()] = options;
        Ok(())
    }

    /// Replace the key of an ES algorithm. The key must be on the curve the
    /// algorithm requires.
    pub fn set_ecdsa_key(&mut self, alg: Algorithm, key: ECDSAKey) -> Result<(), Error> {
        ensure!(
            alg.family() == Family::Ecdsa && alg.curve() == Some(key.curve()),
            JWTError::UnsupportedAlgorithm
        );
        tracing::debug!(alg = %alg, curve = ?key.curve(), "ECDSA key set");
        self.keys[alg.index()] = Some(key.into());
        Ok(())
    }

    /// Forget the secret or key of an algorithm.
    pub fn remove(&mut self, alg: Algorithm) {
        match alg.family() {
            Family::Hmac => self.hmacs[alg.hash_function().index()] = None,
            Family::RsaPss => {
                self.keys[alg.index()] = None;
                self.pss[alg.hash_function().index()] = None;
            }
            Family::Rsa | Family::Ecdsa => self.keys[alg.index()] = None,
        }
        tracing::debug!(alg = %alg, "key removed");
    }

    /// Number of idle digest objects ready for `alg`.
    pub fn idle_digests(&self, alg: Algorithm) -> usize {
        self.pool(alg).map_or(0, DigestPool::idle)
    }

    fn pool(&self, alg: Algorithm) -> Option<&DigestPool> {
        let index = alg.hash_function().index();
        match alg.family() {
            Family::Hmac => self.hmacs[index].as_ref(),
            _ => Some(&self.hashes[index]),
        }
    }
}

impl Provider for DefaultProvider {
    fn acquire_digest(&self, alg: Algorithm) -> Option<DigestState> {
        self.pool(alg).map(DigestPool::acquire)
    }

    fn release_digest(&self, alg: Algorithm, digest: DigestState) {
        if let Some(pool) = self.pool(alg) {
            pool.release(digest);
        }
    }

    fn key(&self, alg: Algorithm) -> Option<&AsymmetricKey> {
        self.keys[alg.index()].as_ref()
    }

    fn pss_options(&self, alg: Algorithm) -> Option<PssOptions> {
        match alg.family() {
            Family::RsaPss => self.pss[alg.hash_function().index()],
            _ => None,
        }
    }
}

/// A provider that keys every HS algorithm with a single borrowed secret.
///
/// It has no asymmetric keys, so every other algorithm is unsupported.
#[derive(Clone, Copy)]
pub struct SecretProvider<'a> {
    secret: &'a [u8],
}

impl<'a> SecretProvider<'a> {
    pub fn new(secret: &'a [u8]) -> Self {
        SecretProvider { secret }
    }
}

impl Provider for SecretProvider<'_> {
    fn acquire_digest(&self, alg: Algorithm) -> Option<DigestState> {
        match alg.family() {
            Family::Hmac => DigestState::new_hmac(alg.hash_function(), self.secret).ok(),
            _ => None,
        }
    }

    fn release_digest(&self, _alg: Algorithm, _digest: DigestState) {}

    fn key(&self, _alg: Algorithm) -> Option<&AsymmetricKey> {
        None
    }

    fn pss_options(&self, _alg: Algorithm) -> Option<PssOptions> {
        None
    }
}
