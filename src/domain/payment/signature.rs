//! Detached request/response signatures.
//!
//! The gateway signs with `SHA256withRSA` (RSA PKCS#1 v1.5 over SHA-256) and
//! carries the base64 signature in a `sign` header, detached from the JSON
//! body. Signatures always cover the exact bytes on the wire.
//!
//! Keys are accepted either as PEM documents or as the bare base64 DER bodies
//! the merchant dashboard hands out.

use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::pkcs1v15::{Signature, SigningKey, VerifyingKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::signature::{SignatureEncoding, Signer, Verifier};
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;

use super::errors::PaymentError;

const PEM_PREFIX: &str = "-----BEGIN";

/// Private key used to sign outbound request bodies.
#[derive(Clone)]
pub struct PrivateSigningKey {
    key: RsaPrivateKey,
}

impl PrivateSigningKey {
    /// Wraps an already-parsed RSA private key.
    pub fn from_rsa(key: RsaPrivateKey) -> Self {
        Self { key }
    }

    /// Parses a PKCS#8 or PKCS#1 key, PEM or bare base64 DER.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::Configuration` if the key cannot be decoded.
    pub fn from_encoded(encoded: &str) -> Result<Self, PaymentError> {
        let trimmed = encoded.trim();
        if trimmed.is_empty() {
            return Err(PaymentError::configuration("private key is empty"));
        }

        let key = if trimmed.starts_with(PEM_PREFIX) {
            RsaPrivateKey::from_pkcs8_pem(trimmed)
                .or_else(|_| RsaPrivateKey::from_pkcs1_pem(trimmed))
                .map_err(|e| PaymentError::configuration(format!("invalid private key: {}", e)))?
        } else {
            let der = decode_base64_body(trimmed)?;
            RsaPrivateKey::from_pkcs8_der(&der)
                .or_else(|_| RsaPrivateKey::from_pkcs1_der(&der))
                .map_err(|e| PaymentError::configuration(format!("invalid private key: {}", e)))?
        };

        Ok(Self { key })
    }

    /// Signs `body` and returns the base64 signature.
    pub fn sign(&self, body: &[u8]) -> Result<String, PaymentError> {
        let signing_key = SigningKey::<Sha256>::new(self.key.clone());
        let signature = signing_key
            .try_sign(body)
            .map_err(|e| PaymentError::configuration(format!("signing failed: {}", e)))?;
        Ok(STANDARD.encode(signature.to_bytes()))
    }

    /// Returns the matching public key.
    pub fn public_key(&self) -> PublicVerifyingKey {
        PublicVerifyingKey::from_rsa(self.key.to_public_key())
    }
}

impl fmt::Debug for PrivateSigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateSigningKey([REDACTED])")
    }
}

/// Public key used to verify inbound response and notification bodies.
#[derive(Clone)]
pub struct PublicVerifyingKey {
    key: RsaPublicKey,
}

impl PublicVerifyingKey {
    /// Wraps an already-parsed RSA public key.
    pub fn from_rsa(key: RsaPublicKey) -> Self {
        Self { key }
    }

    /// Parses an SPKI or PKCS#1 key, PEM or bare base64 DER.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::Configuration` if the key cannot be decoded.
    pub fn from_encoded(encoded: &str) -> Result<Self, PaymentError> {
        let trimmed = encoded.trim();
        if trimmed.is_empty() {
            return Err(PaymentError::configuration("public key is empty"));
        }

        let key = if trimmed.starts_with(PEM_PREFIX) {
            RsaPublicKey::from_public_key_pem(trimmed)
                .or_else(|_| RsaPublicKey::from_pkcs1_pem(trimmed))
                .map_err(|e| PaymentError::configuration(format!("invalid public key: {}", e)))?
        } else {
            let der = decode_base64_body(trimmed)?;
            RsaPublicKey::from_public_key_der(&der)
                .or_else(|_| RsaPublicKey::from_pkcs1_der(&der))
                .map_err(|e| PaymentError::configuration(format!("invalid public key: {}", e)))?
        };

        Ok(Self { key })
    }

    /// Returns true only if `signature` is a valid base64 signature over
    /// exactly `body`. Malformed signatures are simply invalid.
    pub fn verify(&self, body: &[u8], signature: &str) -> bool {
        let Ok(raw) = STANDARD.decode(signature.trim()) else {
            return false;
        };
        let Ok(signature) = Signature::try_from(raw.as_slice()) else {
            return false;
        };
        VerifyingKey::<Sha256>::new(self.key.clone())
            .verify(body, &signature)
            .is_ok()
    }
}

impl fmt::Debug for PublicVerifyingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PublicVerifyingKey(..)")
    }
}

/// Signs `body` with `key`.
pub fn sign(body: &[u8], key: &PrivateSigningKey) -> Result<String, PaymentError> {
    key.sign(body)
}

/// Verifies a detached `signature` over `body` with `key`.
pub fn verify(body: &[u8], signature: &str, key: &PublicVerifyingKey) -> bool {
    key.verify(body, signature)
}

fn decode_base64_body(encoded: &str) -> Result<Vec<u8>, PaymentError> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD
        .decode(compact)
        .map_err(|e| PaymentError::configuration(format!("key is not valid base64: {}", e)))
}
