/// Errors returned by token signing, verification and key loading.
///
/// Verification failures are coarse: the step that rejected a token is
/// only reported through a `tracing` debug event.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JWTError {
    #[error("Invalid token")]
    InvalidToken,
    #[error("Unsupported algorithm")]
    UnsupportedAlgorithm,
    #[error("Signing failed")]
    SigningFailed,
    #[error("Unsupported RSA modulus")]
    UnsupportedRSAModulus,
    #[error("Invalid public key")]
    InvalidPublicKey,
    #[error("Invalid key pair")]
    InvalidKeyPair,
}

pub type Error = JWTError;

/// Returns early with the given error if the condition doesn't hold.
macro_rules! ensure {
    ($cond:expr, $err:expr) => {
        if !($cond) {
            return Err($err);
        }
    };
}

pub(crate) use ensure;
