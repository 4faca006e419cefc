//! Participant identifier issuance.
//!
//! An identifier is the hex SHA-512 of `salt + email`, where the salt is a
//! version-4 UUID drawn from a Mersenne Twister keyed by the sum of the
//! lowercased email's code points. Issuance is deterministic, so the same
//! email always maps to the same identifier.

use rand::RngCore;
use rand_mt::Mt;
use serde::Serialize;
use sha2::{Digest, Sha512};
use uuid::Builder;

/// A freshly issued participant identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuedIdentifier {
    pub email: String,
    pub salt: String,
    pub identifier: String,
}

fn key_words(mut value: u64) -> Vec<u32> {
    if value == 0 {
        return vec![0];
    }
    let mut words = Vec::with_capacity(2);
    while value > 0 {
        words.push(value as u32);
        value >>= 32;
    }
    words
}

/// 128 random bits, first draw in the lowest word.
fn random_u128(rng: &mut impl RngCore) -> u128 {
    (0..4).fold(0u128, |acc, word| acc | u128::from(rng.next_u32()) << (32 * word))
}

/// Issue the identifier for `email`. Case-insensitive.
pub fn issue_identifier(email: &str) -> IssuedIdentifier {
    let email = email.to_lowercase();
    let code_point_sum: u64 = email.chars().map(u64::from).sum();

    let mut rng = Mt::new_with_key(key_words(code_point_sum));
    let bits = random_u128(&mut rng);
    let salt = Builder::from_random_bytes(bits.to_be_bytes())
        .into_uuid()
        .hyphenated()
        .to_string();

    let mut hasher = Sha512::new();
    hasher.update(salt.as_bytes());
    hasher.update(email.as_bytes());
    let identifier = hex::encode(hasher.finalize());

    tracing::debug!(code_point_sum, "issued identifier");
    IssuedIdentifier {
        email,
        salt,
        identifier,
    }
}
