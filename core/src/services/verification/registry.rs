//! Strategy registry: the single dispatch point from channel to strategy

use std::sync::Arc;
use tracing::warn;

use crate::domain::entities::Channel;
use crate::errors::{VerificationError, VerificationResult};

use super::config::VerificationServiceConfig;
use super::deadline::RetryPolicy;
use super::strategy::{ChannelStrategy, StrategyContext};
use super::traits::{ChannelTransport, CodeStore, CredentialDirectory};

/// Collaborators needed to build every channel strategy
#[derive(Clone)]
pub struct StrategyDependencies {
    pub store: Arc<dyn CodeStore>,
    pub directory: Arc<dyn CredentialDirectory>,
    pub sms: Arc<dyn ChannelTransport>,
    pub mailer: Arc<dyn ChannelTransport>,
}

/// Immutable set of channel strategies, built once at startup
///
/// Share it between the issuance and verification services through an
/// `Arc`; nothing in it changes after construction.
pub struct StrategyRegistry {
    email: ChannelStrategy,
    phone: ChannelStrategy,
}

impl StrategyRegistry {
    pub fn new(dependencies: StrategyDependencies, config: &VerificationServiceConfig) -> Self {
        let context = StrategyContext {
            store: dependencies.store,
            directory: dependencies.directory,
            lookup_retry: RetryPolicy::new(config.lookup_max_retries, config.lookup_retry_delay),
        };

        Self {
            email: ChannelStrategy::email(
                dependencies.mailer,
                context.clone(),
                config.ttl_for(Channel::Email),
            ),
            phone: ChannelStrategy::phone(dependencies.sms, context, config.ttl_for(Channel::Phone)),
        }
    }

    /// Strategy for `channel`
    pub fn resolve(&self, channel: Channel) -> &ChannelStrategy {
        match channel {
            Channel::Email => &self.email,
            Channel::Phone => &self.phone,
        }
    }

    /// Strategy for a client-supplied channel code, failing closed on unknown codes
    pub fn resolve_code(&self, code: i32) -> VerificationResult<&ChannelStrategy> {
        match Channel::from_code(code) {
            Some(channel) => Ok(self.resolve(channel)),
            None => {
                warn!(
                    channel_code = code,
                    event = "unsupported_channel",
                    "Rejected request for unsupported verification channel"
                );
                Err(VerificationError::UnsupportedChannel { code })
            }
        }
    }
}
