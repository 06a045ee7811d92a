use num_bigint_dig::BigUint;

use crate::error::*;

/// The two integers of an ECDSA signature.
///
/// On the wire, a pair is stored as `r || s`, each half big-endian and
/// left-padded with zeros to the field size of the curve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BigintPair {
    pub r: BigUint,
    pub s: BigUint,
}

impl BigintPair {
    pub fn new(r: BigUint, s: BigUint) -> Self {
        BigintPair { r, s }
    }

    /// Build a pair from big-endian byte strings of any length.
    pub fn from_be_bytes(r: &[u8], s: &[u8]) -> Self {
        BigintPair {
            r: BigUint::from_bytes_be(r),
            s: BigUint::from_bytes_be(s),
        }
    }

    /// Encode the pair as exactly `2 * width` bytes.
    ///
    /// Fails if either integer needs more than `width` bytes.
    pub fn encode(&self, width: usize) -> Result<Vec<u8>, Error> {
        let (mut out, s) = self.to_padded_halves(width)?;
        out.extend_from_slice(&s);
        Ok(out)
    }

    /// `r` and `s` as separate big-endian strings of exactly `width` bytes.
    pub fn to_padded_halves(&self, width: usize) -> Result<(Vec<u8>, Vec<u8>), Error> {
        let mut r = vec![0u8; width];
        let mut s = vec![0u8; width];
        write_padded(&mut r, &self.r)?;
        write_padded(&mut s, &self.s)?;
        Ok((r, s))
    }

    /// Split an encoded signature at its midpoint.
    pub fn decode(encoded: &[u8]) -> Result<Self, Error> {
        ensure!(
            !encoded.is_empty() && encoded.len() % 2 == 0,
            JWTError::InvalidToken
        );
        let (r, s) = encoded.split_at(encoded.len() / 2);
        Ok(BigintPair::from_be_bytes(r, s))
    }
}

fn write_padded(out: &mut [u8], value: &BigUint) -> Result<(), Error> {
    let bytes = value.to_bytes_be();
    let significant = bytes
        .iter()
        .position(|&b| b != 0)
        .map_or(&bytes[bytes.len()..], |first| &bytes[first..]);
    ensure!(significant.len() <= out.len(), JWTError::InvalidToken);
    let offset = out.len() - significant.len();
    out[offset..].copy_from_slice(significant);
    Ok(())
}
