use std::fmt;
use std::mem;

use crossbeam_queue::ArrayQueue;
use hmac::digest::{Digest, KeyInit};
use hmac::{Mac, SimpleHmac};
use hmac_sha512::sha384 as hmac_sha384;

use crate::algorithms::HashFunction;
use crate::error::*;

/// A reusable digest object.
///
/// Plain hashes serve the RS, PS and ES families, keyed HMAC states serve HS.
/// `finalize_reset` leaves the object ready for the next input, so a state
/// can go back to its pool without being rebuilt.
#[derive(Clone)]
pub enum DigestState {
    Sha256(hmac_sha256::Hash),
    Sha384(hmac_sha384::Hash),
    Sha512(hmac_sha512::Hash),
    HmacSha256(SimpleHmac<hmac_sha256::Hash>),
    HmacSha384(SimpleHmac<hmac_sha384::Hash>),
    HmacSha512(SimpleHmac<hmac_sha512::Hash>),
}

impl DigestState {
    /// A fresh plain hash.
    pub fn new(hash_function: HashFunction) -> Self {
        match hash_function {
            HashFunction::Sha256 => DigestState::Sha256(Digest::new()),
            HashFunction::Sha384 => DigestState::Sha384(Digest::new()),
            HashFunction::Sha512 => DigestState::Sha512(Digest::new()),
        }
    }

    /// A fresh HMAC state keyed with `secret`.
    pub fn new_hmac(hash_function: HashFunction, secret: &[u8]) -> Result<Self, Error> {
        let state = match hash_function {
            HashFunction::Sha256 => DigestState::HmacSha256(
                KeyInit::new_from_slice(secret).map_err(|_| JWTError::InvalidKeyPair)?,
            ),
            HashFunction::Sha384 => DigestState::HmacSha384(
                KeyInit::new_from_slice(secret).map_err(|_| JWTError::InvalidKeyPair)?,
            ),
            HashFunction::Sha512 => DigestState::HmacSha512(
                KeyInit::new_from_slice(secret).map_err(|_| JWTError::InvalidKeyPair)?,
            ),
        };
        Ok(state)
    }

    pub fn hash_function(&self) -> HashFunction {
        match self {
            DigestState::Sha256(_) | DigestState::HmacSha256(_) => HashFunction::Sha256,
            DigestState::Sha384(_) | DigestState::HmacSha384(_) => HashFunction::Sha384,
            DigestState::Sha512(_) | DigestState::HmacSha512(_) => HashFunction::Sha512,
        }
    }

    pub fn is_keyed(&self) -> bool {
        matches!(
            self,
            DigestState::HmacSha256(_) | DigestState::HmacSha384(_) | DigestState::HmacSha512(_)
        )
    }

    pub fn output_size(&self) -> usize {
        self.hash_function().output_size()
    }

    pub fn update(&mut self, input: &[u8]) {
        match self {
            DigestState::Sha256(h) => Digest::update(h, input),
            DigestState::Sha384(h) => Digest::update(h, input),
            DigestState::Sha512(h) => Digest::update(h, input),
            DigestState::HmacSha256(h) => Mac::update(h, input),
            DigestState::HmacSha384(h) => Mac::update(h, input),
            DigestState::HmacSha512(h) => Mac::update(h, input),
        }
    }

    /// Return the digest of everything absorbed so far, and reset the state.
    pub fn finalize_reset(&mut self) -> Vec<u8> {
        match self {
            DigestState::Sha256(h) => Digest::finalize_reset(h).to_vec(),
            DigestState::Sha384(h) => Digest::finalize_reset(h).to_vec(),
            DigestState::Sha512(h) => Digest::finalize_reset(h).to_vec(),
            DigestState::HmacSha256(h) => Mac::finalize_reset(h).into_bytes().to_vec(),
            DigestState::HmacSha384(h) => Mac::finalize_reset(h).into_bytes().to_vec(),
            DigestState::HmacSha512(h) => Mac::finalize_reset(h).into_bytes().to_vec(),
        }
    }

    /// Discard any absorbed input. HMAC states keep their key.
    pub fn reset(&mut self) {
        match self {
            DigestState::Sha256(h) => Digest::reset(h),
            DigestState::Sha384(h) => Digest::reset(h),
            DigestState::Sha512(h) => Digest::reset(h),
            DigestState::HmacSha256(h) => Mac::reset(h),
            DigestState::HmacSha384(h) => Mac::reset(h),
            DigestState::HmacSha512(h) => Mac::reset(h),
        }
    }

    /// One-shot digest of `input`.
    pub fn digest(&mut self, input: &[u8]) -> Vec<u8> {
        self.update(input);
        self.finalize_reset()
    }

    fn same_kind(&self, other: &DigestState) -> bool {
        mem::discriminant(self) == mem::discriminant(other)
    }
}

impl Default for DigestState {
    fn default() -> Self {
        DigestState::new(HashFunction::Sha256)
    }
}

impl fmt::Debug for DigestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DigestState::Sha256(_) => "Sha256",
            DigestState::Sha384(_) => "Sha384",
            DigestState::Sha512(_) => "Sha512",
            DigestState::HmacSha256(_) => "HmacSha256",
            DigestState::HmacSha384(_) => "HmacSha384",
            DigestState::HmacSha512(_) => "HmacSha512",
        };
        f.debug_tuple("DigestState").field(&name).finish()
    }
}

/// A bounded, lock-free pool of interchangeable digest objects.
///
/// New objects are cloned from a template, so a keyed pool never needs to
/// keep the raw secret around.
pub struct DigestPool {
    template: DigestState,
    idle: ArrayQueue<DigestState>,
}

impl DigestPool {
    pub fn new(hash_function: HashFunction, max_idle: usize) -> Self {
        Self::with_template(DigestState::new(hash_function), max_idle)
    }

    pub fn new_hmac(
        hash_function: HashFunction,
        secret: &[u8],
        max_idle: usize,
    ) -> Result<Self, Error> {
        let template = DigestState::new_hmac(hash_function, secret)?;
        Ok(Self::with_template(template, max_idle))
    }

    fn with_template(template: DigestState, max_idle: usize) -> Self {
        DigestPool {
            template,
            idle: ArrayQueue::new(max_idle.max(1)),
        }
    }

    /// Take an idle object, or build a new one if the pool is empty.
    pub fn acquire(&self) -> DigestState {
        match self.idle.pop() {
            Some(state) => {
                tracing::trace!(digest = ?state, "digest pool hit");
                state
            }
            None => {
                tracing::trace!(digest = ?self.template, "digest pool miss");
                self.template.clone()
            }
        }
    }

    /// Reset an object and make it available again.
    ///
    /// Objects of another kind than the pool's are dropped, as are objects
    /// returned while the pool is already full.
    pub fn release(&self, mut state: DigestState) {
        if !state.same_kind(&self.template) {
            tracing::debug!(digest = ?state, "foreign digest returned to pool");
            return;
        }
        state.reset();
        if self.idle.push(state).is_err() {
            tracing::trace!("digest pool full");
        }
    }

    /// Number of objects currently waiting in the pool.
    pub fn idle(&self) -> usize {
        self.idle.len()
    }

    pub fn capacity(&self) -> usize {
        self.idle.capacity()
    }
}

impl fmt::Debug for DigestPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DigestPool")
            .field("kind", &self.template)
            .field("idle", &self.idle.len())
            .finish()
    }
}
