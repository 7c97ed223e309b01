//! Client and backend token generation.
//!
//! A fresh generator is seeded from the operating system for every pair.
//! The client token is the hex SHA-256 digest of 32 random bytes. The
//! backend token is the client token followed by the first 12 hex
//! characters of the digest of 12 further bytes drawn from the same
//! generator, so a backend token always starts with its client token.

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use sha2::{Digest, Sha256};

use crate::error::TokenError;

/// Random bytes hashed into the client token.
const TOKEN_ENTROPY_BYTES: usize = 32;

/// Random bytes hashed into the backend suffix.
const SUFFIX_ENTROPY_BYTES: usize = 12;

/// Hex characters of the backend suffix.
pub const SUFFIX_LEN: usize = 12;

/// Hex characters of a client token (SHA-256 digest).
pub const TOKEN_LEN: usize = 64;

/// A freshly generated credential pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    /// Client-facing token.
    pub token: String,
    /// Backend token: `token` followed by a 12 character suffix.
    pub backend_token: String,
}

/// Generate a new token pair.
///
/// # Errors
///
/// Returns [`TokenError::Entropy`] if the operating system entropy source
/// cannot be read. No retry is attempted.
pub fn generate_tokens() -> Result<TokenPair, TokenError> {
    let mut rng = StdRng::try_from_os_rng().map_err(|e| TokenError::Entropy(e.to_string()))?;

    let mut token_bytes = [0_u8; TOKEN_ENTROPY_BYTES];
    rng.fill_bytes(&mut token_bytes);
    let token = hex::encode(Sha256::digest(token_bytes));

    let mut suffix_bytes = [0_u8; SUFFIX_ENTROPY_BYTES];
    rng.fill_bytes(&mut suffix_bytes);
    let mut suffix = hex::encode(Sha256::digest(suffix_bytes));
    suffix.truncate(SUFFIX_LEN);

    let backend_token = format!("{token}{suffix}");

    Ok(TokenPair {
        token,
        backend_token,
    })
}
