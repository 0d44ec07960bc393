//! Inbound issuance request.

use serde::{Deserialize, Serialize};

/// Request to issue a code to an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationRequest {
    /// Destination: a phone number or an email address
    pub account_number: String,
    /// Numeric channel code (see `Channel::from_code`)
    pub channel: i32,
    /// Optional message template; `{code}` is replaced by the code
    #[serde(default)]
    pub content: Option<String>,
    /// Application the caller authenticates into
    pub app_code: String,
}

impl VerificationRequest {
    pub fn new(account_number: impl Into<String>, channel: i32, app_code: impl Into<String>) -> Self {
        Self {
            account_number: account_number.into(),
            channel,
            content: None,
            app_code: app_code.into(),
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }
}
