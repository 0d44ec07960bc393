//! Per-channel strategies
//!
//! Send-side and verify-side capabilities live on one [`ChannelStrategy`]
//! per channel, so both paths share a single destination check and a single
//! store key layout. Channel-specific work (destination syntax, transport,
//! directory endpoints) is in [`EmailStrategy`] and [`PhoneStrategy`]; store
//! handling is common and lives in [`CodeSlots`].

mod email;
mod phone;

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::domain::entities::{AuthCredential, Channel, UserInfo};
use crate::errors::{VerificationError, VerificationResult};

use super::deadline::{Deadline, RetryPolicy};
use super::traits::{ChannelTransport, CodeStore, CredentialDirectory};

pub use email::EmailStrategy;
pub use phone::PhoneStrategy;

const CODE_STORE: &str = "code store";
const CREDENTIAL_DIRECTORY: &str = "credential directory";

/// Collaborators and limits shared by every channel strategy
#[derive(Clone)]
pub struct StrategyContext {
    pub store: Arc<dyn CodeStore>,
    pub directory: Arc<dyn CredentialDirectory>,
    /// Retry policy for idempotent directory lookups
    pub lookup_retry: RetryPolicy,
}

/// Store operations for one channel's codes and attempt counters
#[derive(Clone)]
pub struct CodeSlots {
    channel: Channel,
    store: Arc<dyn CodeStore>,
    ttl: Duration,
}

impl CodeSlots {
    pub fn new(channel: Channel, store: Arc<dyn CodeStore>, ttl: Duration) -> Self {
        Self { channel, store, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Overwrite the live code and reset the attempt counter
    pub async fn persist(&self, destination: &str, code: &str, deadline: &Deadline) -> VerificationResult<()> {
        let code_key = self.channel.code_key(destination);
        deadline
            .run(CODE_STORE, self.store.set_with_expiry(&code_key, code, self.ttl))
            .await?;

        let attempts_key = self.channel.attempts_key(destination);
        deadline.run(CODE_STORE, self.store.delete(&attempts_key)).await?;

        debug!(
            channel = %self.channel,
            destination = %self.channel.mask(destination),
            ttl_secs = self.ttl.as_secs(),
            "Stored verification code"
        );
        Ok(())
    }

    /// Read the live code, failing when it is absent, blank or expired
    pub async fn fetch(&self, destination: &str, deadline: &Deadline) -> VerificationResult<String> {
        let code_key = self.channel.code_key(destination);
        match deadline.run(CODE_STORE, self.store.get(&code_key)).await? {
            Some(code) if !code.trim().is_empty() => Ok(code),
            _ => Err(VerificationError::CodeNotFoundOrExpired),
        }
    }

    /// Atomically remove the live code if it still equals `code`
    pub async fn consume(&self, destination: &str, code: &str, deadline: &Deadline) -> VerificationResult<bool> {
        let code_key = self.channel.code_key(destination);
        deadline
            .run(CODE_STORE, self.store.compare_and_delete(&code_key, code))
            .await
    }

    /// Reserve one verification attempt; returns the attempts used so far, this one included
    ///
    /// Called before the supplied code is compared, so concurrent guesses each
    /// hold a distinct slot and at most `max_attempts` of them get compared.
    pub async fn reserve_attempt(&self, destination: &str, deadline: &Deadline) -> VerificationResult<u64> {
        let attempts_key = self.channel.attempts_key(destination);
        deadline
            .run(CODE_STORE, self.store.increment(&attempts_key, self.ttl))
            .await
    }

    /// Drop the attempt counter after a successful verification
    ///
    /// Failure is logged only: the counter expires with the code anyway and
    /// the next issuance resets it.
    pub async fn clear_attempts(&self, destination: &str, deadline: &Deadline) {
        let attempts_key = self.channel.attempts_key(destination);
        if let Err(err) = deadline.run(CODE_STORE, self.store.delete(&attempts_key)).await {
            warn!(
                channel = %self.channel,
                destination = %self.channel.mask(destination),
                error = %err,
                "Failed to clear verification attempt counter"
            );
        }
    }

    /// Burn the exhausted code `stored`, leaving any newer reissued code alone
    ///
    /// The attempt counter is kept; it expires with the code and the next
    /// issuance resets it.
    pub async fn invalidate(&self, destination: &str, stored: &str, deadline: &Deadline) -> VerificationResult<bool> {
        self.consume(destination, stored, deadline).await
    }
}

/// Strategy for one channel, selected by a closed `match`
pub enum ChannelStrategy {
    Email(EmailStrategy),
    Phone(PhoneStrategy),
}

impl ChannelStrategy {
    /// Email strategy delivering through `mailer`
    pub fn email(mailer: Arc<dyn ChannelTransport>, context: StrategyContext, ttl: Duration) -> Self {
        ChannelStrategy::Email(EmailStrategy::new(mailer, context, ttl))
    }

    /// Phone strategy delivering through `sms`
    pub fn phone(sms: Arc<dyn ChannelTransport>, context: StrategyContext, ttl: Duration) -> Self {
        ChannelStrategy::Phone(PhoneStrategy::new(sms, context, ttl))
    }

    pub fn channel(&self) -> Channel {
        match self {
            ChannelStrategy::Email(_) => Channel::Email,
            ChannelStrategy::Phone(_) => Channel::Phone,
        }
    }

    /// Store operations for this channel
    pub fn slots(&self) -> &CodeSlots {
        match self {
            ChannelStrategy::Email(strategy) => &strategy.slots,
            ChannelStrategy::Phone(strategy) => &strategy.slots,
        }
    }

    /// Syntactic destination check, identical on the send and verify paths
    pub fn validate_destination(&self, destination: &str) -> VerificationResult<()> {
        let channel = self.channel();
        if channel.is_valid_destination(destination) {
            Ok(())
        } else {
            Err(VerificationError::InvalidFormat {
                channel,
                destination: channel.mask(destination),
            })
        }
    }

    /// Deliver `code` to `destination`; does not persist anything
    pub async fn dispatch(
        &self,
        destination: &str,
        code: &str,
        content: Option<&str>,
        deadline: &Deadline,
    ) -> VerificationResult<String> {
        match self {
            ChannelStrategy::Email(strategy) => strategy.dispatch(destination, code, content, deadline).await,
            ChannelStrategy::Phone(strategy) => strategy.dispatch(destination, code, content, deadline).await,
        }
    }

    pub async fn persist(&self, destination: &str, code: &str, deadline: &Deadline) -> VerificationResult<()> {
        self.slots().persist(destination, code, deadline).await
    }

    pub async fn fetch_code(&self, destination: &str, deadline: &Deadline) -> VerificationResult<String> {
        self.slots().fetch(destination, deadline).await
    }

    pub async fn consume_code(&self, destination: &str, code: &str, deadline: &Deadline) -> VerificationResult<bool> {
        self.slots().consume(destination, code, deadline).await
    }

    pub async fn resolve_credential(
        &self,
        destination: &str,
        deadline: &Deadline,
    ) -> VerificationResult<Option<AuthCredential>> {
        match self {
            ChannelStrategy::Email(strategy) => strategy.resolve_credential(destination, deadline).await,
            ChannelStrategy::Phone(strategy) => strategy.resolve_credential(destination, deadline).await,
        }
    }

    pub async fn resolve_profile(
        &self,
        destination: &str,
        app_code: &str,
        deadline: &Deadline,
    ) -> VerificationResult<Option<UserInfo>> {
        match self {
            ChannelStrategy::Email(strategy) => strategy.resolve_profile(destination, app_code, deadline).await,
            ChannelStrategy::Phone(strategy) => strategy.resolve_profile(destination, app_code, deadline).await,
        }
    }

    /// Create a credential bound to `destination`; never retried
    pub async fn create_credential(&self, destination: &str, deadline: &Deadline) -> VerificationResult<()> {
        match self {
            ChannelStrategy::Email(strategy) => strategy.create_credential(destination, deadline).await,
            ChannelStrategy::Phone(strategy) => strategy.create_credential(destination, deadline).await,
        }
    }
}
