use std::sync::Arc;
use std::time::Duration;

use crate::domain::entities::{AuthCredential, Channel, UserInfo};
use crate::errors::VerificationResult;
use crate::services::verification::deadline::Deadline;
use crate::services::verification::traits::ChannelTransport;

use super::{CodeSlots, StrategyContext, CREDENTIAL_DIRECTORY};

const SMS_TRANSPORT: &str = "sms transport";

/// Phone channel: SMS delivery, phone-keyed directory endpoints
pub struct PhoneStrategy {
    sms: Arc<dyn ChannelTransport>,
    context: StrategyContext,
    pub(super) slots: CodeSlots,
}

impl PhoneStrategy {
    pub fn new(sms: Arc<dyn ChannelTransport>, context: StrategyContext, ttl: Duration) -> Self {
        let slots = CodeSlots::new(Channel::Phone, context.store.clone(), ttl);
        Self {
            sms,
            context,
            slots,
        }
    }

    pub async fn dispatch(
        &self,
        phone: &str,
        code: &str,
        content: Option<&str>,
        deadline: &Deadline,
    ) -> VerificationResult<String> {
        deadline
            .run(SMS_TRANSPORT, self.sms.send(phone, code, content))
            .await
    }

    pub async fn resolve_credential(&self, phone: &str, deadline: &Deadline) -> VerificationResult<Option<AuthCredential>> {
        let directory = &self.context.directory;
        self.context
            .lookup_retry
            .run(deadline, CREDENTIAL_DIRECTORY, move || directory.credential_by_phone(phone))
            .await
    }

    pub async fn resolve_profile(
        &self,
        phone: &str,
        app_code: &str,
        deadline: &Deadline,
    ) -> VerificationResult<Option<UserInfo>> {
        let directory = &self.context.directory;
        self.context
            .lookup_retry
            .run(deadline, CREDENTIAL_DIRECTORY, move || directory.profile_by_phone(phone, app_code))
            .await
    }

    pub async fn create_credential(&self, phone: &str, deadline: &Deadline) -> VerificationResult<()> {
        deadline
            .run(
                CREDENTIAL_DIRECTORY,
                self.context.directory.create_credential_by_phone(phone),
            )
            .await
    }
}
