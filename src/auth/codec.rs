use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use super::claims::{TokenClaims, TokenKind};
use crate::error::{AuthError, Result, VerificationError, VerificationFailure};

const ALGORITHM: Algorithm = Algorithm::HS256;

/// HMAC (HS256) codec over [`TokenClaims`].
///
/// One shared secret and one algorithm for the whole subsystem; there is no
/// per-token key selection.
pub struct TokenCodec {
    header: Header,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    validation_ignoring_expiry: Validation,
}

impl TokenCodec {
    /// Creates a codec; an empty secret is a startup-time configuration error.
    pub fn new(secret: &str) -> Result<Self> {
        if secret.trim().is_empty() {
            return Err(AuthError::configuration("signing secret is empty"));
        }

        let mut validation = Validation::new(ALGORITHM);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let mut validation_ignoring_expiry = validation.clone();
        validation_ignoring_expiry.validate_exp = false;

        Ok(Self {
            header: Header::new(ALGORITHM),
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            validation_ignoring_expiry,
        })
    }

    /// Signs the claim set. Identical claims and key always give the same string.
    pub fn sign(&self, claims: &TokenClaims) -> Result<String> {
        encode(&self.header, claims, &self.encoding_key)
            .map_err(|err| AuthError::Encoding(err.to_string()))
    }

    /// Verifies signature, structure, expiry and token kind.
    pub fn verify_and_decode(
        &self,
        token: &str,
        expected: TokenKind,
    ) -> std::result::Result<TokenClaims, VerificationError> {
        self.decode_with(token, expected, &self.validation)
    }

    /// Same as [`verify_and_decode`](Self::verify_and_decode) but accepts
    /// expired tokens. The signature is still checked.
    pub fn decode_ignoring_expiry(
        &self,
        token: &str,
        expected: TokenKind,
    ) -> std::result::Result<TokenClaims, VerificationError> {
        self.decode_with(token, expected, &self.validation_ignoring_expiry)
    }

    fn decode_with(
        &self,
        token: &str,
        expected: TokenKind,
        validation: &Validation,
    ) -> std::result::Result<TokenClaims, VerificationError> {
        let claims = decode::<TokenClaims>(token, &self.decoding_key, validation)?.claims;
        if claims.typ != expected {
            return Err(VerificationError::new(VerificationFailure::WrongKind));
        }
        Ok(claims)
    }
}
