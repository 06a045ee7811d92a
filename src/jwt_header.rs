use crate::algorithms::Algorithm;
use crate::claims::Claims;
use crate::error::*;

pub const ALGORITHM: &str = "alg";
pub const SIGNATURE_TYPE: &str = "typ";
pub const JWT_SIGNATURE_TYPE: &str = "JWT";

impl Claims {
    /// Set the "alg" header attribute
    pub fn set_algorithm(&mut self, alg: Algorithm) {
        self.set(ALGORITHM, alg.name());
    }

    /// Set the "typ" header attribute to "JWT"
    pub fn set_type(&mut self) {
        self.set(SIGNATURE_TYPE, JWT_SIGNATURE_TYPE);
    }

    /// The algorithm named by the "alg" header attribute.
    ///
    /// A missing or non-string value makes the header invalid, while a name
    /// outside of the supported set is reported as `UnsupportedAlgorithm`.
    pub fn algorithm(&self) -> Result<Algorithm, Error> {
        self.get_str(ALGORITHM)
            .ok_or(JWTError::InvalidToken)?
            .parse()
    }
}

#[test]
fn header_attributes() {
    let mut header = Claims::new().with(ALGORITHM, "none").with("kid", "k1");
    header.set_algorithm(Algorithm::ES512);
    header.set_type();
    assert_eq!(header.get_str(ALGORITHM), Some("ES512"));
    assert_eq!(header.get_str(SIGNATURE_TYPE), Some("JWT"));
    assert_eq!(header.get_str("kid"), Some("k1"));
    assert_eq!(header.algorithm(), Ok(Algorithm::ES512));

    header.set(ALGORITHM, "ps256");
    assert_eq!(header.algorithm(), Ok(Algorithm::PS256));
    header.set(ALGORITHM, "XX999");
    assert_eq!(header.algorithm(), Err(JWTError::UnsupportedAlgorithm));
    header.set(ALGORITHM, 256);
    assert_eq!(header.algorithm(), Err(JWTError::InvalidToken));
    header.remove(ALGORITHM);
    assert_eq!(header.algorithm(), Err(JWTError::InvalidToken));
}
