//! Tests for code issuance

use std::time::Duration;

use super::mocks::{Harness, MockDirectory, MockTransport};
use crate::domain::entities::Channel;
use crate::domain::value_objects::VerificationRequest;
use crate::errors::{CollaboratorError, VerificationError};
use crate::services::verification::VerificationServiceConfig;

const PHONE: &str = "+15551234567";
const EMAIL: &str = "alice@example.com";

#[tokio::test]
async fn test_issue_phone_code_dispatches_and_stores() {
    let harness = Harness::new();
    let request = VerificationRequest::new(PHONE, Channel::Phone.code(), "APP1");

    let issued = harness.codes.issue_code(&request).await.unwrap();

    assert_eq!(issued.channel, Channel::Phone);
    assert_eq!(issued.code.len(), 6);
    assert!(issued.code.chars().all(|c| c.is_ascii_digit()));
    assert_eq!(harness.sms.sent_code(PHONE), Some(issued.code.clone()));
    assert_eq!(harness.mailer.call_count(), 0);
    assert_eq!(
        harness.store.live_value("login:phone:code:+15551234567"),
        Some(issued.code)
    );
}

#[tokio::test]
async fn test_issue_email_code_uses_mailer() {
    let harness = Harness::new();
    let request = VerificationRequest::new(EMAIL, Channel::Email.code(), "APP1");

    let issued = harness.codes.issue_code(&request).await.unwrap();

    assert_eq!(harness.mailer.sent_code(EMAIL), Some(issued.code.clone()));
    assert_eq!(harness.sms.call_count(), 0);
    assert_eq!(
        harness.store.live_value(&Channel::Email.code_key(EMAIL)),
        Some(issued.code)
    );
}

#[tokio::test]
async fn test_issue_passes_message_template_to_transport() {
    let harness = Harness::new();
    let request = VerificationRequest::new(PHONE, 2, "APP1").with_content("Your code is {code}");

    harness.codes.issue_code(&request).await.unwrap();

    assert_eq!(
        harness.sms.sent_content(PHONE).as_deref(),
        Some("Your code is {code}")
    );
}

#[tokio::test]
async fn test_issue_rejects_malformed_phone_without_side_effects() {
    let harness = Harness::new();
    let request = VerificationRequest::new("abc123", Channel::Phone.code(), "APP1");

    let result = harness.codes.issue_code(&request).await;

    assert!(matches!(
        result,
        Err(VerificationError::InvalidFormat { channel: Channel::Phone, .. })
    ));
    assert_eq!(harness.store.call_count(), 0);
    assert_eq!(harness.sms.call_count(), 0);
}

#[tokio::test]
async fn test_issue_rejects_malformed_email_without_side_effects() {
    let harness = Harness::new();
    let request = VerificationRequest::new("not-an-email", Channel::Email.code(), "APP1");

    let result = harness.codes.issue_code(&request).await;

    assert!(matches!(
        result,
        Err(VerificationError::InvalidFormat { channel: Channel::Email, .. })
    ));
    assert_eq!(harness.store.call_count(), 0);
    assert_eq!(harness.mailer.call_count(), 0);
}

#[tokio::test]
async fn test_issue_rejects_unknown_channel() {
    let harness = Harness::new();
    let request = VerificationRequest::new(PHONE, 99, "APP1");

    let result = harness.codes.issue_code(&request).await;

    assert_eq!(result.unwrap_err(), VerificationError::UnsupportedChannel { code: 99 });
    assert_eq!(harness.store.call_count(), 0);
    assert_eq!(harness.sms.call_count(), 0);
}

#[tokio::test]
async fn test_failed_dispatch_leaves_no_code() {
    let harness = Harness::build(
        MockTransport::failing(),
        MockTransport::default(),
        MockDirectory::default(),
        VerificationServiceConfig::default(),
    );
    let request = VerificationRequest::new(PHONE, 2, "APP1");

    let err = harness.codes.issue_code(&request).await.unwrap_err();

    assert!(matches!(
        err,
        VerificationError::RemoteLookupFailure {
            service: "sms transport",
            source: CollaboratorError::Unavailable(_),
        }
    ));
    // Not retried
    assert_eq!(harness.sms.call_count(), 1);
    assert!(harness.store.live_keys().is_empty());
    assert_eq!(harness.store.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_dispatch_past_deadline_is_abandoned() {
    let config = VerificationServiceConfig {
        request_timeout: Duration::from_secs(2),
        ..Default::default()
    };
    let harness = Harness::build(
        MockTransport::slow(Duration::from_secs(10)),
        MockTransport::default(),
        MockDirectory::default(),
        config,
    );
    let request = VerificationRequest::new(PHONE, 2, "APP1");

    let err = harness.codes.issue_code(&request).await.unwrap_err();

    assert!(matches!(
        err,
        VerificationError::RemoteLookupFailure {
            source: CollaboratorError::DeadlineExceeded,
            ..
        }
    ));
    assert!(harness.store.live_keys().is_empty());
}

#[tokio::test]
async fn test_store_failure_after_dispatch_is_reported() {
    let harness = Harness::new();
    harness
        .store
        .should_fail
        .store(true, std::sync::atomic::Ordering::SeqCst);
    let request = VerificationRequest::new(PHONE, 2, "APP1");

    let err = harness.codes.issue_code(&request).await.unwrap_err();

    assert!(matches!(
        err,
        VerificationError::RemoteLookupFailure { service: "code store", .. }
    ));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_reissue_replaces_previous_code() {
    let harness = Harness::new();
    let request = VerificationRequest::new(PHONE, 2, "APP1");

    let _first = harness.codes.issue_code(&request).await.unwrap();
    let second = harness.codes.issue_code(&request).await.unwrap();

    assert_eq!(harness.store.live_keys(), vec![Channel::Phone.code_key(PHONE)]);
    assert_eq!(
        harness.store.live_value(&Channel::Phone.code_key(PHONE)),
        Some(second.code)
    );
}

#[tokio::test]
async fn test_issue_honours_configured_code_length() {
    let config = VerificationServiceConfig {
        code_length: 8,
        ..Default::default()
    };
    let harness = Harness::build(
        MockTransport::default(),
        MockTransport::default(),
        MockDirectory::default(),
        config,
    );

    let issued = harness
        .codes
        .issue_code(&VerificationRequest::new(EMAIL, 1, "APP1"))
        .await
        .unwrap();

    assert_eq!(issued.code.len(), 8);
}
