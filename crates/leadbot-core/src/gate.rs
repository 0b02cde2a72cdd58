//! Password gate in front of the questionnaire.
//!
//! The configured secret is never compared byte-by-byte. Both the secret and
//! each candidate are run through HMAC-SHA256 under a per-process random key
//! and the tags are checked with `Mac::verify_slice`, which compares in
//! constant time and hides the secret's length.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const INCORRECT_PASSWORD: &str = "Incorrect password";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Accepted,
    /// Non-empty submission that did not match.
    Rejected,
    /// Nothing submitted yet; keep prompting without a message.
    Empty,
}

impl GateDecision {
    pub fn message(self) -> Option<&'static str> {
        match self {
            GateDecision::Rejected => Some(INCORRECT_PASSWORD),
            GateDecision::Accepted | GateDecision::Empty => None,
        }
    }
}

#[derive(Clone)]
pub struct AccessGate {
    key: [u8; 32],
    expected: Vec<u8>,
}

impl AccessGate {
    pub fn new(secret: &str) -> Self {
        let key: [u8; 32] = rand::random();
        let expected = tag(&key, secret).finalize().into_bytes().to_vec();
        Self { key, expected }
    }

    /// Exact, case-sensitive check of `candidate` against the secret.
    pub fn check(&self, candidate: &str) -> GateDecision {
        if candidate.is_empty() {
            return GateDecision::Empty;
        }
        match tag(&self.key, candidate).verify_slice(&self.expected) {
            Ok(()) => GateDecision::Accepted,
            Err(_) => GateDecision::Rejected,
        }
    }
}

impl std::fmt::Debug for AccessGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessGate").finish_non_exhaustive()
    }
}

fn tag(key: &[u8], value: &str) -> HmacSha256 {
    let mut mac =
        HmacSha256::new_from_slice(key).expect("infallible: HMAC accepts keys of any length");
    mac.update(value.as_bytes());
    mac
}
