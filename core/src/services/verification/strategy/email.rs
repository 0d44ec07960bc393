use std::sync::Arc;
use std::time::Duration;

use crate::domain::entities::{AuthCredential, Channel, UserInfo};
use crate::errors::VerificationResult;
use crate::services::verification::deadline::Deadline;
use crate::services::verification::traits::ChannelTransport;

use super::{CodeSlots, StrategyContext, CREDENTIAL_DIRECTORY};

const EMAIL_TRANSPORT: &str = "email transport";

/// Email channel: mailer delivery, email-keyed directory endpoints
pub struct EmailStrategy {
    mailer: Arc<dyn ChannelTransport>,
    context: StrategyContext,
    pub(super) slots: CodeSlots,
}

impl EmailStrategy {
    pub fn new(mailer: Arc<dyn ChannelTransport>, context: StrategyContext, ttl: Duration) -> Self {
        let slots = CodeSlots::new(Channel::Email, context.store.clone(), ttl);
        Self {
            mailer,
            context,
            slots,
        }
    }

    pub async fn dispatch(
        &self,
        email: &str,
        code: &str,
        content: Option<&str>,
        deadline: &Deadline,
    ) -> VerificationResult<String> {
        deadline
            .run(EMAIL_TRANSPORT, self.mailer.send(email, code, content))
            .await
    }

    pub async fn resolve_credential(&self, email: &str, deadline: &Deadline) -> VerificationResult<Option<AuthCredential>> {
        let directory = &self.context.directory;
        self.context
            .lookup_retry
            .run(deadline, CREDENTIAL_DIRECTORY, move || directory.credential_by_email(email))
            .await
    }

    pub async fn resolve_profile(
        &self,
        email: &str,
        app_code: &str,
        deadline: &Deadline,
    ) -> VerificationResult<Option<UserInfo>> {
        let directory = &self.context.directory;
        self.context
            .lookup_retry
            .run(deadline, CREDENTIAL_DIRECTORY, move || directory.profile_by_email(email, app_code))
            .await
    }

    pub async fn create_credential(&self, email: &str, deadline: &Deadline) -> VerificationResult<()> {
        deadline
            .run(
                CREDENTIAL_DIRECTORY,
                self.context.directory.create_credential_by_email(email),
            )
            .await
    }
}
