//! Result of a successful verification.

use serde::{Deserialize, Serialize};

use crate::domain::entities::{AuthCredential, UserInfo};

/// Identity resolved for a verified destination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateOutcome {
    pub credential: AuthCredential,
    /// Profile for the requested app; absent when the user never used it
    pub profile: Option<UserInfo>,
    /// Whether the credential was created by this verification
    pub created: bool,
}
