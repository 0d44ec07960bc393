//! Logging email transport
//!
//! Renders the email and logs it with a masked address instead of
//! contacting a provider.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use vc_core::errors::CollaboratorError;
use vc_core::services::verification::ChannelTransport;
use vc_shared::utils::email::mask_email;

use super::render_message;

const DEFAULT_EMAIL_TEMPLATE: &str =
    "Your verification code is {code}. If you did not request it, ignore this email.";
const SUBJECT: &str = "Your verification code";

/// Email transport for development and testing
///
/// This implementation:
/// - Renders the caller template (or a default text)
/// - Logs the delivery with a masked address
/// - Generates message IDs and counts messages
/// - Optionally echoes the message to the console
#[derive(Clone, Default)]
pub struct LogEmailTransport {
    message_count: Arc<AtomicU64>,
    simulate_failure: Arc<AtomicBool>,
    console_output: bool,
}

impl LogEmailTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transport with configurable options
    pub fn with_options(console_output: bool, simulate_failure: bool) -> Self {
        Self {
            message_count: Arc::new(AtomicU64::new(0)),
            simulate_failure: Arc::new(AtomicBool::new(simulate_failure)),
            console_output,
        }
    }

    /// Total number of messages sent
    pub fn message_count(&self) -> u64 {
        self.message_count.load(Ordering::SeqCst)
    }

    pub fn set_simulate_failure(&self, simulate: bool) {
        self.simulate_failure.store(simulate, Ordering::SeqCst);
    }
}

#[async_trait]
impl ChannelTransport for LogEmailTransport {
    async fn send(
        &self,
        destination: &str,
        code: &str,
        content: Option<&str>,
    ) -> Result<String, CollaboratorError> {
        let masked_email = mask_email(destination);

        if self.simulate_failure.load(Ordering::SeqCst) {
            warn!(email = %masked_email, "Email transport simulating failure");
            return Err(CollaboratorError::Unavailable(
                "Simulated email sending failure".to_string(),
            ));
        }

        let message = render_message(content, code, DEFAULT_EMAIL_TEMPLATE);
        let message_id = format!("email_{}", Uuid::new_v4());
        let count = self.message_count.fetch_add(1, Ordering::SeqCst) + 1;

        if self.console_output {
            println!("[email #{}] to {} / {}: {}", count, destination, SUBJECT, message);
        }

        info!(
            target: "email_transport",
            provider = self.provider_name(),
            email = %masked_email,
            subject = SUBJECT,
            message_id = %message_id,
            message_length = message.chars().count(),
            event = "email_sent",
            "Email dispatched"
        );

        Ok(message_id)
    }

    fn provider_name(&self) -> &str {
        "log-email"
    }
}
