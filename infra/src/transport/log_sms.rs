//! Logging SMS transport
//!
//! Renders the SMS and logs it with a masked phone number instead of
//! contacting a provider.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use vc_core::errors::CollaboratorError;
use vc_core::services::verification::ChannelTransport;
use vc_shared::utils::phone::mask_phone_number;

use super::render_message;

const DEFAULT_SMS_TEMPLATE: &str = "Your verification code is {code}. Do not share it with anyone.";

/// SMS transport for development and testing
///
/// This implementation:
/// - Renders the caller template (or a default text)
/// - Logs the delivery with a masked phone number
/// - Generates message IDs and counts messages
/// - Optionally echoes the message to the console
#[derive(Clone, Default)]
pub struct LogSmsTransport {
    message_count: Arc<AtomicU64>,
    simulate_failure: Arc<AtomicBool>,
    console_output: bool,
}

impl LogSmsTransport {
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
impl ChannelTransport for LogSmsTransport {
    async fn send(
        &self,
        destination: &str,
        code: &str,
        content: Option<&str>,
    ) -> Result<String, CollaboratorError> {
        let masked_phone = mask_phone_number(destination);

        if self.simulate_failure.load(Ordering::SeqCst) {
            warn!(phone = %masked_phone, "SMS transport simulating failure");
            return Err(CollaboratorError::Unavailable(
                "Simulated SMS sending failure".to_string(),
            ));
        }

        let message = render_message(content, code, DEFAULT_SMS_TEMPLATE);
        let message_id = format!("sms_{}", Uuid::new_v4());
        let count = self.message_count.fetch_add(1, Ordering::SeqCst) + 1;

        if self.console_output {
            println!("[sms #{}] to {}: {}", count, destination, message);
        }

        info!(
            target: "sms_transport",
            provider = self.provider_name(),
            phone = %masked_phone,
            message_id = %message_id,
            message_length = message.chars().count(),
            event = "sms_sent",
            "SMS dispatched"
        );

        Ok(message_id)
    }

    fn provider_name(&self) -> &str {
        "log-sms"
    }
}
