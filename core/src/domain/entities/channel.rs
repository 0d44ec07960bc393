//! Verification delivery channels.

use serde::{Deserialize, Serialize};
use std::fmt;

use vc_shared::utils::{is_valid_email, is_valid_phone, mask_email, mask_phone_number};

/// Medium a verification code is delivered through
///
/// The set is closed: adding a channel means adding a variant here and a
/// matching strategy variant, and the compiler points at every dispatch site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Email,
    Phone,
}

impl Channel {
    /// Every supported channel
    pub const ALL: [Channel; 2] = [Channel::Email, Channel::Phone];

    /// Map the numeric code used by clients to a channel
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(Channel::Email),
            2 => Some(Channel::Phone),
            _ => None,
        }
    }

    /// Numeric code used by clients
    pub fn code(&self) -> i32 {
        match self {
            Channel::Email => 1,
            Channel::Phone => 2,
        }
    }

    /// Lower-case name used in keys and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Email => "email",
            Channel::Phone => "phone",
        }
    }

    /// Store key holding the live code for `destination`
    pub fn code_key(&self, destination: &str) -> String {
        format!("login:{}:code:{}", self.as_str(), destination)
    }

    /// Store key holding the failed-attempt counter for `destination`
    pub fn attempts_key(&self, destination: &str) -> String {
        format!("login:{}:attempts:{}", self.as_str(), destination)
    }

    /// Syntactic destination check shared by the send and verify paths
    pub fn is_valid_destination(&self, destination: &str) -> bool {
        match self {
            Channel::Email => is_valid_email(destination),
            Channel::Phone => is_valid_phone(destination),
        }
    }

    /// Destination masked for logs and error messages
    pub fn mask(&self, destination: &str) -> String {
        match self {
            Channel::Email => mask_email(destination),
            Channel::Phone => mask_phone_number(destination),
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
