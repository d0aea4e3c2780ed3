use sha2::{Digest, Sha256};
use std::fmt;

/// Collaborator deciding whether a caller may run revenue administration.
///
/// Implementations must fail closed: anything other than a positive match
/// is a rejection.
pub trait CredentialCheck: Send + Sync {
    fn verify(&self, presented: &str) -> bool;
}

/// Single shared admin secret, held only as its SHA-256 digest.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminSecret {
    digest: [u8; 32],
}

impl AdminSecret {
    pub fn new(secret: &str) -> Self {
        Self {
            digest: digest(secret),
        }
    }
}

impl CredentialCheck for AdminSecret {
    fn verify(&self, presented: &str) -> bool {
        constant_time_eq(&self.digest, &digest(presented))
    }
}

impl fmt::Debug for AdminSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminSecret").finish_non_exhaustive()
    }
}

fn digest(secret: &str) -> [u8; 32] {
    Sha256::digest(secret.as_bytes()).into()
}

fn constant_time_eq(left: &[u8; 32], right: &[u8; 32]) -> bool {
    left.iter()
        .zip(right.iter())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}
