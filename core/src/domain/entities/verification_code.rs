//! Issued verification code entity.

use chrono::{DateTime, Utc};
use rand::{rngs::OsRng, Rng};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use super::channel::Channel;

/// Default number of digits in a code
pub const CODE_LENGTH: usize = 6;

/// Default lifetime of a code (5 minutes)
pub const DEFAULT_EXPIRATION_MINUTES: u64 = 5;

/// Default number of wrong guesses tolerated per code
pub const MAX_ATTEMPTS: u32 = 3;

/// A code that has been dispatched and persisted
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedCode {
    /// Unique identifier of this issuance, for log correlation
    pub id: Uuid,

    /// Channel the code was sent through
    pub channel: Channel,

    /// Destination the code was sent to
    pub destination: String,

    /// The numeric code
    pub code: String,

    /// Timestamp when the code was issued
    pub issued_at: DateTime<Utc>,

    /// Timestamp when the code stops verifying
    pub expires_at: DateTime<Utc>,
}

impl IssuedCode {
    /// Build the record for a freshly generated code living for `ttl`
    pub fn new(channel: Channel, destination: impl Into<String>, code: String, ttl: Duration) -> Self {
        let issued_at = Utc::now();
        let ttl = chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::zero());
        Self {
            id: Uuid::new_v4(),
            channel,
            destination: destination.into(),
            code,
            issued_at,
            expires_at: issued_at + ttl,
        }
    }
}

// The code is a secret; keep it out of `{:?}` output.
impl std::fmt::Debug for IssuedCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuedCode")
            .field("id", &self.id)
            .field("channel", &self.channel)
            .field("destination", &self.channel.mask(&self.destination))
            .field("code", &"<redacted>")
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Generate a numeric code of `length` digits from the OS CSPRNG
///
/// Each digit is drawn independently with `gen_range`, which rejects
/// out-of-range samples, so every code is equally likely.
pub fn generate_secure_code(length: usize) -> String {
    let mut rng = OsRng;
    (0..length)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

/// Whether `code` has the shape of an issued code
pub fn is_well_formed(code: &str, length: usize) -> bool {
    code.len() == length && code.chars().all(|c| c.is_ascii_digit())
}
