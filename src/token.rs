use std::fmt;

use ct_codecs::{Base64UrlSafeNoPadding, Decoder, Encoder};

use crate::algorithms::*;
use crate::claims::Claims;
use crate::common::*;
use crate::error::*;
use crate::jwt_header::*;
use crate::provider::*;

/// Signing and verification of compact JWT tokens
pub struct Token;

/// The decoded content of a token whose signature has been verified
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedToken {
    pub header: Claims,
    pub payload: Claims,
}

/// JWT token information useful before signature/tag verification
#[derive(Debug, Clone, Default)]
pub struct TokenMetadata {
    pub(crate) header: Claims,
}

impl TokenMetadata {
    /// The JWT algorithm for this token ("alg")
    /// This information should not be trusted: it is unprotected and can be
    /// freely modified by a third party.
    pub fn algorithm(&self) -> Option<&str> {
        self.header.get_str(ALGORITHM)
    }

    /// The signature type for this token ("typ")
    pub fn signature_type(&self) -> Option<&str> {
        self.header.get_str(SIGNATURE_TYPE)
    }

    /// The key identifier for this token ("kid")
    pub fn key_id(&self) -> Option<&str> {
        self.header.get_str("kid")
    }

    /// The content type for this token ("cty")
    pub fn content_type(&self) -> Option<&str> {
        self.header.get_str("cty")
    }

    /// Every header attribute, unverified
    pub fn header(&self) -> &Claims {
        &self.header
    }
}

fn rejected(error: JWTError, step: &'static str, alg: Option<Algorithm>) -> JWTError {
    tracing::debug!(step, alg = ?alg, %error, "token rejected");
    error
}

fn decode_segment(segment: &str) -> Result<Vec<u8>, Error> {
    Base64UrlSafeNoPadding::decode_to_vec(segment, None).map_err(|_| JWTError::InvalidToken)
}

fn decode_claims(segment: &str) -> Result<Claims, Error> {
    serde_json::from_slice(&decode_segment(segment)?).map_err(|_| JWTError::InvalidToken)
}

fn encode_segment(bin: impl AsRef<[u8]>) -> Result<String, Error> {
    Base64UrlSafeNoPadding::encode_to_string(bin).map_err(|_| JWTError::SigningFailed)
}

impl Token {
    /// Sign `payload` with `alg`, using the digests and keys of `provider`.
    ///
    /// `alg` and `typ` are written into `header` before it is encoded.
    pub fn sign<P: Provider + ?Sized>(
        alg: Algorithm,
        header: &mut Claims,
        payload: &Claims,
        provider: &P,
    ) -> Result<String, Error> {
        let mut token = Self::signing_input(alg, header, payload)?;
        let signature = Self::signature(alg, token.as_bytes(), provider)?;
        token.push('.');
        token.push_str(&encode_segment(signature)?);
        tracing::trace!(alg = %alg, len = token.len(), "token signed");
        Ok(token)
    }

    /// Sign a token and write it to `writer`.
    ///
    /// Nothing is written if signing fails.
    pub fn sign_to<W: fmt::Write, P: Provider + ?Sized>(
        writer: &mut W,
        alg: Algorithm,
        header: &mut Claims,
        payload: &Claims,
        provider: &P,
    ) -> Result<(), Error> {
        let token = Self::sign(alg, header, payload, provider)?;
        writer
            .write_str(&token)
            .map_err(|_| JWTError::SigningFailed)
    }

    /// Sign a token with an HS algorithm and a single secret.
    pub fn sign_with_secret(
        alg: Algorithm,
        header: &mut Claims,
        payload: &Claims,
        secret: impl AsRef<[u8]>,
    ) -> Result<String, Error> {
        Self::sign(alg, header, payload, &SecretProvider::new(secret.as_ref()))
    }

    /// Verify a token with the default options.
    pub fn verify<P: Provider + ?Sized>(token: &str, provider: &P) -> Result<VerifiedToken, Error> {
        Self::verify_with_options(token, provider, &VerificationOptions::default())
    }

    /// Verify a token signed with an HS algorithm and a single secret.
    pub fn verify_with_secret(
        token: &str,
        secret: impl AsRef<[u8]>,
    ) -> Result<VerifiedToken, Error> {
        Self::verify(token, &SecretProvider::new(secret.as_ref()))
    }

    /// Verify a token, and decode its header and payload.
    ///
    /// The algorithm is taken from the header, and the key from the provider.
    /// Nothing is returned unless the signature is valid.
    pub fn verify_with_options<P: Provider + ?Sized>(
        token: &str,
        provider: &P,
        options: &VerificationOptions,
    ) -> Result<VerifiedToken, Error> {
        if let Some(max_token_length) = options.max_token_length {
            ensure!(
                token.len() <= max_token_length,
                rejected(JWTError::InvalidToken, "parse", None)
            );
        }
        let mut parts = token.split('.');
        let (header_b64, payload_b64, signature_b64) =
            match (parts.next(), parts.next(), parts.next(), parts.next()) {
                (Some(header), Some(payload), Some(signature), None) => {
                    (header, payload, signature)
                }
                _ => return Err(rejected(JWTError::InvalidToken, "parse", None)),
            };
        ensure!(
            header_b64.len() <= options.max_header_length.unwrap_or(MAX_HEADER_LENGTH),
            rejected(JWTError::InvalidToken, "parse", None)
        );

        let header =
            decode_claims(header_b64).map_err(|e| rejected(e, "header_decode", None))?;
        let alg = header
            .algorithm()
            .map_err(|e| rejected(e, "dispatch", None))?;

        let signed = &token[..header_b64.len() + 1 + payload_b64.len()];
        let digest = {
            let mut loan = DigestLoan::acquire(provider, alg)
                .map_err(|e| rejected(e, "digest", Some(alg)))?;
            loan.digest(signed.as_bytes())
        };
        Self::check_signature(alg, &digest, signature_b64, provider)
            .map_err(|e| rejected(e, "signature", Some(alg)))?;

        let payload =
            decode_claims(payload_b64).map_err(|e| rejected(e, "payload_decode", Some(alg)))?;
        Ok(VerifiedToken { header, payload })
    }

    /// Decode token information that can be useful prior to signature
    /// verification
    pub fn decode_metadata(token: &str) -> Result<TokenMetadata, Error> {
        let header_b64 = token.split('.').next().unwrap_or_default();
        ensure!(
            header_b64.len() <= MAX_HEADER_LENGTH,
            JWTError::InvalidToken
        );
        let header = decode_claims(header_b64)?;
        Ok(TokenMetadata { header })
    }

    /// `b64(header) "." b64(payload)`, after setting `alg` and `typ` in the header.
    fn signing_input(alg: Algorithm, header: &mut Claims, payload: &Claims) -> Result<String, Error> {
        header.set_algorithm(alg);
        header.set_type();
        let header_json = serde_json::to_vec(header).map_err(|_| JWTError::SigningFailed)?;
        let payload_json = serde_json::to_vec(payload).map_err(|_| JWTError::SigningFailed)?;
        let header_b64 = encode_segment(header_json)?;
        let payload_b64 = encode_segment(payload_json)?;

        // room for the signature of a 4096-bit RSA key
        let mut input = String::with_capacity(header_b64.len() + payload_b64.len() + 2 + 683);
        input.push_str(&header_b64);
        input.push('.');
        input.push_str(&payload_b64);
        Ok(input)
    }

    fn signature<P: Provider + ?Sized>(
        alg: Algorithm,
        input: &[u8],
        provider: &P,
    ) -> Result<Vec<u8>, Error> {
        let digest = {
            let mut loan = DigestLoan::acquire(provider, alg)?;
            loan.digest(input)
        };
        match alg.family() {
            Family::Hmac => Ok(digest),
            Family::Rsa => rsa_key(provider, alg)?.sign_pkcs1v15(alg.hash_function(), &digest),
            Family::RsaPss => {
                let key = rsa_key(provider, alg)?;
                let options = pss_options(provider, alg);
                ensure!(
                    options.hash_function == alg.hash_function(),
                    JWTError::SigningFailed
                );
                key.sign_pss(&options, &digest)
            }
            Family::Ecdsa => ecdsa_key(provider, alg)?.sign_prehash(&digest),
        }
    }

    fn check_signature<P: Provider + ?Sized>(
        alg: Algorithm,
        digest: &[u8],
        signature_b64: &str,
        provider: &P,
    ) -> Result<(), Error> {
        match alg.family() {
            Family::Hmac => {
                let expected = Base64UrlSafeNoPadding::encode_to_string(digest)
                    .map_err(|_| JWTError::InvalidToken)?;
                ensure!(
                    ct_codecs::verify(expected.as_bytes(), signature_b64.as_bytes()),
                    JWTError::InvalidToken
                );
                Ok(())
            }
            Family::Rsa => {
                let key = rsa_key(provider, alg)?;
                key.verify_pkcs1v15(alg.hash_function(), digest, &decode_segment(signature_b64)?)
            }
            Family::RsaPss => {
                let key = rsa_key(provider, alg)?;
                let options = pss_options(provider, alg);
                ensure!(
                    options.hash_function == alg.hash_function(),
                    JWTError::InvalidToken
                );
                key.verify_pss(&options, digest, &decode_segment(signature_b64)?)
            }
            Family::Ecdsa => {
                let key = ecdsa_key(provider, alg)?;
                key.verify_prehash(digest, &decode_segment(signature_b64)?)
            }
        }
    }
}

#[test]
fn should_verify_token() {
    use crate::prelude::*;

    let mut header = Claims::new().with("sub", "alice");
    let payload = Claims::new().with("role", "admin");
    let token = Token::sign_with_secret(Algorithm::HS256, &mut header, &payload, "k").unwrap();
    assert_eq!(token.split('.').count(), 3);
    assert_eq!(header.get_str("alg"), Some("HS256"));
    assert_eq!(header.get_str("typ"), Some("JWT"));

    let verified = Token::verify_with_secret(&token, "k").unwrap();
    assert_eq!(verified.payload, payload);
    assert_eq!(verified.header, header);
    assert_eq!(
        Token::verify_with_secret(&token, "k2"),
        Err(JWTError::InvalidToken)
    );
}

#[test]
fn token_limits() {
    use crate::prelude::*;

    let mut header = Claims::new().with("pad", "x".repeat(200));
    let token = Token::sign_with_secret(Algorithm::HS512, &mut header, &Claims::new(), "k").unwrap();
    let provider = SecretProvider::new(b"k");
    let options = VerificationOptions::default().with_max_token_length(token.len());
    Token::verify_with_options(&token, &provider, &options).unwrap();
    let options = VerificationOptions::default().with_max_token_length(token.len() - 1);
    assert_eq!(
        Token::verify_with_options(&token, &provider, &options),
        Err(JWTError::InvalidToken)
    );
    let options = VerificationOptions::default().with_max_header_length(100);
    assert_eq!(
        Token::verify_with_options(&token, &provider, &options),
        Err(JWTError::InvalidToken)
    );
}

#[test]
fn metadata() {
    use crate::prelude::*;

    let mut header = Claims::new().with("kid", "key-1");
    let token = Token::sign_with_secret(Algorithm::HS384, &mut header, &Claims::new(), "k").unwrap();
    let metadata = Token::decode_metadata(&token).unwrap();
    assert_eq!(metadata.algorithm(), Some("HS384"));
    assert_eq!(metadata.signature_type(), Some("JWT"));
    assert_eq!(metadata.key_id(), Some("key-1"));
    assert_eq!(metadata.content_type(), None);
    assert_eq!(metadata.header().len(), 3);
    assert!(Token::decode_metadata("").is_err());
    assert!(Token::decode_metadata("bm90IGpzb24.e30.").is_err());
}

#[test]
fn sign_to_writer() {
    use crate::prelude::*;

    let provider = DefaultProvider::new()
        .with_hmac_secret(Algorithm::HS256, "k")
        .unwrap();
    let mut out = String::from("Bearer ");
    Token::sign_to(&mut out, Algorithm::HS256, &mut Claims::new(), &Claims::new(), &provider)
        .unwrap();
    let token = out.strip_prefix("Bearer ").unwrap();
    Token::verify(token, &provider).unwrap();

    let mut out = String::new();
    assert_eq!(
        Token::sign_to(&mut out, Algorithm::HS384, &mut Claims::new(), &Claims::new(), &provider),
        Err(JWTError::UnsupportedAlgorithm)
    );
    assert!(out.is_empty());
}
