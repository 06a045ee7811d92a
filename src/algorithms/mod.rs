use std::fmt;
use std::str::FromStr;

use crate::error::*;

mod ecdsa;
mod hmac;
mod rsa;

pub use self::ecdsa::*;
pub use self::hmac::*;
pub use self::rsa::*;

/// A JWT signature algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    HS256,
    HS384,
    HS512,
    RS256,
    RS384,
    RS512,
    PS256,
    PS384,
    PS512,
    ES256,
    ES384,
    ES512,
}

/// The cryptographic family an algorithm belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    Hmac,
    Rsa,
    RsaPss,
    Ecdsa,
}

/// The hash function an algorithm digests the signing input with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashFunction {
    Sha256,
    Sha384,
    Sha512,
}

/// A NIST curve used by the ES algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Curve {
    P256,
    P384,
    P521,
}

impl Algorithm {
    pub const ALL: [Algorithm; 12] = [
        Algorithm::HS256,
        Algorithm::HS384,
        Algorithm::HS512,
        Algorithm::RS256,
        Algorithm::RS384,
        Algorithm::RS512,
        Algorithm::PS256,
        Algorithm::PS384,
        Algorithm::PS512,
        Algorithm::ES256,
        Algorithm::ES384,
        Algorithm::ES512,
    ];

    /// The canonical "alg" value.
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::HS256 => "HS256",
            Algorithm::HS384 => "HS384",
            Algorithm::HS512 => "HS512",
            Algorithm::RS256 => "RS256",
            Algorithm::RS384 => "RS384",
            Algorithm::RS512 => "RS512",
            Algorithm::PS256 => "PS256",
            Algorithm::PS384 => "PS384",
            Algorithm::PS512 => "PS512",
            Algorithm::ES256 => "ES256",
            Algorithm::ES384 => "ES384",
            Algorithm::ES512 => "ES512",
        }
    }

    pub fn family(self) -> Family {
        match self {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Family::Hmac,
            Algorithm::RS256 | Algorithm::RS384 | Algorithm::RS512 => Family::Rsa,
            Algorithm::PS256 | Algorithm::PS384 | Algorithm::PS512 => Family::RsaPss,
            Algorithm::ES256 | Algorithm::ES384 | Algorithm::ES512 => Family::Ecdsa,
        }
    }

    pub fn hash_function(self) -> HashFunction {
        match self {
            Algorithm::HS256 | Algorithm::RS256 | Algorithm::PS256 | Algorithm::ES256 => {
                HashFunction::Sha256
            }
            Algorithm::HS384 | Algorithm::RS384 | Algorithm::PS384 | Algorithm::ES384 => {
                HashFunction::Sha384
            }
            Algorithm::HS512 | Algorithm::RS512 | Algorithm::PS512 | Algorithm::ES512 => {
                HashFunction::Sha512
            }
        }
    }

    /// The curve required by an ES algorithm. ES512 is P-521, not P-512.
    pub fn curve(self) -> Option<Curve> {
        match self {
            Algorithm::ES256 => Some(Curve::P256),
            Algorithm::ES384 => Some(Curve::P384),
            Algorithm::ES512 => Some(Curve::P521),
            _ => None,
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    /// Matches an "alg" value case-insensitively.
    fn from_str(alg: &str) -> Result<Self, Error> {
        Algorithm::ALL
            .iter()
            .copied()
            .find(|candidate| candidate.name().eq_ignore_ascii_case(alg))
            .ok_or(JWTError::UnsupportedAlgorithm)
    }
}

impl HashFunction {
    pub fn output_size(self) -> usize {
        match self {
            HashFunction::Sha256 => 32,
            HashFunction::Sha384 => 48,
            HashFunction::Sha512 => 64,
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl Curve {
    /// Size in bytes of a scalar, and of each half of an encoded signature.
    pub fn field_size(self) -> usize {
        match self {
            Curve::P256 => 32,
            Curve::P384 => 48,
            Curve::P521 => 66,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("hs256".parse::<Algorithm>().unwrap(), Algorithm::HS256);
        assert_eq!("Es512".parse::<Algorithm>().unwrap(), Algorithm::ES512);
        assert_eq!("PS384".parse::<Algorithm>().unwrap(), Algorithm::PS384);
        assert_eq!(
            "XX999".parse::<Algorithm>().unwrap_err(),
            JWTError::UnsupportedAlgorithm
        );
        assert!("".parse::<Algorithm>().is_err());
        assert!("HS256 ".parse::<Algorithm>().is_err());
    }

    #[test]
    fn names_round_trip() {
        for alg in Algorithm::ALL.iter() {
            assert_eq!(alg.name().parse::<Algorithm>().unwrap(), *alg);
            assert_eq!(alg.to_string(), alg.name());
        }
    }

    #[test]
    fn es_widths() {
        assert_eq!(Algorithm::ES256.curve().unwrap().field_size(), 32);
        assert_eq!(Algorithm::ES384.curve().unwrap().field_size(), 48);
        assert_eq!(Algorithm::ES512.curve().unwrap().field_size(), 66);
        assert!(Algorithm::PS512.curve().is_none());
    }
}
