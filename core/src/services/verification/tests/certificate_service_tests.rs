//! Tests for code verification and identity resolution

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

use super::mocks::{Harness, MockDirectory};
use crate::domain::entities::Channel;
use crate::domain::value_objects::VerificationRequest;
use crate::errors::{CollaboratorError, VerificationError};

const PHONE: &str = "+15551234567";
const EMAIL: &str = "alice@example.com";

async fn issue(harness: &Harness, channel: Channel, destination: &str) -> String {
    harness
        .codes
        .issue_code(&VerificationRequest::new(destination, channel.code(), "APP1"))
        .await
        .unwrap()
        .code
}

// Same length, every digit different
fn wrong_code(code: &str) -> String {
    code.chars()
        .map(|c| {
            let digit = c.to_digit(10).unwrap();
            char::from_digit((digit + 1) % 10, 10).unwrap()
        })
        .collect()
}

#[tokio::test]
async fn test_verify_existing_phone_credential() {
    let harness = Harness::with_directory(
        MockDirectory::default()
            .with_credential(PHONE, "cred-42")
            .with_profile(PHONE, "APP1", "user-7"),
    );
    let code = issue(&harness, Channel::Phone, PHONE).await;

    let outcome = harness.certificates.verify(2, PHONE, &code, "APP1").await.unwrap();

    assert_eq!(outcome.credential.credential_id, "cred-42");
    assert_eq!(outcome.profile.map(|p| p.user_id), Some("user-7".to_string()));
    assert!(!outcome.created);
    assert_eq!(harness.directory.creation_count(), 0);
}

#[tokio::test]
async fn test_verify_creates_credential_for_new_phone() {
    let harness = Harness::new();
    let code = issue(&harness, Channel::Phone, PHONE).await;

    let outcome = harness.certificates.verify(2, PHONE, &code, "APP1").await.unwrap();

    assert!(outcome.created);
    assert_eq!(outcome.credential.phone.as_deref(), Some(PHONE));
    assert!(outcome.profile.is_none());
    assert_eq!(harness.directory.creation_count(), 1);
}

#[tokio::test]
async fn test_verify_email_profile_is_per_app() {
    let harness = Harness::with_directory(
        MockDirectory::default()
            .with_credential(EMAIL, "cred-1")
            .with_profile(EMAIL, "APP2", "user-2"),
    );
    let code = issue(&harness, Channel::Email, EMAIL).await;

    let outcome = harness.certificates.verify(1, EMAIL, &code, "APP1").await.unwrap();

    assert_eq!(outcome.credential.email.as_deref(), Some(EMAIL));
    assert!(outcome.profile.is_none());
}

#[tokio::test]
async fn test_code_is_single_use() {
    let harness = Harness::new();
    let code = issue(&harness, Channel::Phone, PHONE).await;

    harness.certificates.verify(2, PHONE, &code, "APP1").await.unwrap();
    let second = harness.certificates.verify(2, PHONE, &code, "APP1").await;

    assert_eq!(second.unwrap_err(), VerificationError::CodeNotFoundOrExpired);
    assert_eq!(harness.directory.creation_count(), 1);
}

#[tokio::test]
async fn test_verify_without_issued_code() {
    let harness = Harness::new();

    let result = harness.certificates.verify(1, EMAIL, "123456", "APP1").await;

    assert_eq!(result.unwrap_err(), VerificationError::CodeNotFoundOrExpired);
    assert_eq!(harness.directory.lookup_count(), 0);
}

#[tokio::test]
async fn test_mismatch_keeps_code_valid() {
    let harness = Harness::new();
    let code = issue(&harness, Channel::Phone, PHONE).await;

    let miss = harness
        .certificates
        .verify(2, PHONE, &wrong_code(&code), "APP1")
        .await;
    assert_eq!(
        miss.unwrap_err(),
        VerificationError::VerificationMismatch { remaining_attempts: 2 }
    );

    let outcome = harness.certificates.verify(2, PHONE, &code, "APP1").await;
    assert!(outcome.is_ok());
}

#[tokio::test]
async fn test_attempts_exhausted_burns_code() {
    let harness = Harness::new();
    let code = issue(&harness, Channel::Email, EMAIL).await;
    let wrong = wrong_code(&code);

    let first = harness.certificates.verify(1, EMAIL, &wrong, "APP1").await;
    let second = harness.certificates.verify(1, EMAIL, &wrong, "APP1").await;
    let third = harness.certificates.verify(1, EMAIL, &wrong, "APP1").await;

    assert_eq!(
        first.unwrap_err(),
        VerificationError::VerificationMismatch { remaining_attempts: 2 }
    );
    assert_eq!(
        second.unwrap_err(),
        VerificationError::VerificationMismatch { remaining_attempts: 1 }
    );
    assert_eq!(
        third.unwrap_err(),
        VerificationError::AttemptsExceeded { max_attempts: 3 }
    );

    let late = harness.certificates.verify(1, EMAIL, &code, "APP1").await;
    assert_eq!(late.unwrap_err(), VerificationError::CodeNotFoundOrExpired);
}

#[tokio::test]
async fn test_correct_code_on_last_attempt_succeeds() {
    let harness = Harness::new();
    let code = issue(&harness, Channel::Phone, PHONE).await;
    let wrong = wrong_code(&code);
    for _ in 0..2 {
        let _ = harness.certificates.verify(2, PHONE, &wrong, "APP1").await;
    }

    assert!(harness.certificates.verify(2, PHONE, &code, "APP1").await.is_ok());
    assert!(harness
        .store
        .live_value(&Channel::Phone.attempts_key(PHONE))
        .is_none());
}

#[tokio::test]
async fn test_malformed_guess_counts_as_attempt() {
    let harness = Harness::new();
    let code = issue(&harness, Channel::Phone, PHONE).await;

    let result = harness.certificates.verify(2, PHONE, "12", "APP1").await;

    assert_eq!(
        result.unwrap_err(),
        VerificationError::VerificationMismatch { remaining_attempts: 2 }
    );
    assert!(harness.certificates.verify(2, PHONE, &code, "APP1").await.is_ok());
}

#[tokio::test]
async fn test_reissue_resets_attempts() {
    let harness = Harness::new();
    let code = issue(&harness, Channel::Phone, PHONE).await;
    let wrong = wrong_code(&code);
    for _ in 0..2 {
        let _ = harness.certificates.verify(2, PHONE, &wrong, "APP1").await;
    }

    let fresh = issue(&harness, Channel::Phone, PHONE).await;
    let miss = harness
        .certificates
        .verify(2, PHONE, &wrong_code(&fresh), "APP1")
        .await;

    assert_eq!(
        miss.unwrap_err(),
        VerificationError::VerificationMismatch { remaining_attempts: 2 }
    );
}

#[tokio::test]
async fn test_only_latest_code_verifies() {
    let harness = Harness::new();
    let mut first = issue(&harness, Channel::Phone, PHONE).await;
    let mut second = issue(&harness, Channel::Phone, PHONE).await;
    // Two draws can collide; retry until they differ
    while first == second {
        first = second;
        second = issue(&harness, Channel::Phone, PHONE).await;
    }

    let stale = harness.certificates.verify(2, PHONE, &first, "APP1").await;
    assert!(matches!(
        stale,
        Err(VerificationError::VerificationMismatch { .. })
    ));

    assert!(harness.certificates.verify(2, PHONE, &second, "APP1").await.is_ok());
}

#[tokio::test(start_paused = true)]
async fn test_code_expires_after_ttl() {
    let harness = Harness::new();
    let code = issue(&harness, Channel::Phone, PHONE).await;

    tokio::time::advance(Duration::from_secs(5 * 60 + 1)).await;

    let result = harness.certificates.verify(2, PHONE, &code, "APP1").await;
    assert_eq!(result.unwrap_err(), VerificationError::CodeNotFoundOrExpired);
}

#[tokio::test(start_paused = true)]
async fn test_code_valid_just_before_ttl() {
    let harness = Harness::new();
    let code = issue(&harness, Channel::Email, EMAIL).await;

    tokio::time::advance(Duration::from_secs(5 * 60 - 1)).await;

    assert!(harness.certificates.verify(1, EMAIL, &code, "APP1").await.is_ok());
}

#[tokio::test]
async fn test_verify_rejects_malformed_destination() {
    let harness = Harness::new();

    let result = harness.certificates.verify(1, "not-an-email", "123456", "APP1").await;

    assert!(matches!(
        result,
        Err(VerificationError::InvalidFormat { channel: Channel::Email, .. })
    ));
    assert_eq!(harness.store.call_count(), 0);
}

#[tokio::test]
async fn test_verify_rejects_unknown_channel() {
    let harness = Harness::new();

    let result = harness.certificates.verify(99, PHONE, "123456", "APP1").await;

    assert_eq!(result.unwrap_err(), VerificationError::UnsupportedChannel { code: 99 });
    assert_eq!(harness.store.call_count(), 0);
}

#[tokio::test]
async fn test_concurrent_verifications_succeed_once() {
    let harness = Harness::new();
    let code = issue(&harness, Channel::Phone, PHONE).await;
    harness.store.interleave();

    let (a, b) = tokio::join!(
        harness.certificates.verify(2, PHONE, &code, "APP1"),
        harness.certificates.verify(2, PHONE, &code, "APP1"),
    );

    // Both requests read the live code before either consumes it
    assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);
    let loser = if a.is_ok() { b } else { a };
    assert_eq!(loser.unwrap_err(), VerificationError::CodeNotFoundOrExpired);
    assert_eq!(harness.directory.creation_count(), 1);
}

#[tokio::test]
async fn test_parallel_guessing_is_bounded_by_attempt_budget() {
    let harness = Arc::new(Harness::new());
    harness
        .store
        .seed(&Channel::Phone.code_key(PHONE), "000777", Duration::from_secs(300));
    harness.store.interleave();

    let mut tasks = JoinSet::new();
    for n in 0..1000u32 {
        let harness = harness.clone();
        tasks.spawn(async move {
            let guess = format!("{:06}", n);
            harness.certificates.verify(2, PHONE, &guess, "APP1").await
        });
    }

    let (mut verified, mut mismatched, mut exceeded, mut gone) = (0, 0, 0, 0);
    while let Some(joined) = tasks.join_next().await {
        match joined.unwrap() {
            Ok(_) => verified += 1,
            Err(VerificationError::VerificationMismatch { .. }) => mismatched += 1,
            Err(VerificationError::AttemptsExceeded { .. }) => exceeded += 1,
            Err(VerificationError::CodeNotFoundOrExpired) => gone += 1,
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    // At most max_attempts guesses were compared; the correct one came too late
    assert!(verified + mismatched < 3);
    assert_eq!(verified, 0);
    assert_eq!(verified + mismatched + exceeded + gone, 1000);
    assert!(harness.store.live_value(&Channel::Phone.code_key(PHONE)).is_none());
    assert_eq!(harness.directory.lookup_count(), 0);
}

#[tokio::test]
async fn test_exhaustion_spares_reissued_code() {
    let harness = Harness::new();
    let code = issue(&harness, Channel::Phone, PHONE).await;
    let wrong = wrong_code(&code);
    for _ in 0..2 {
        let _ = harness.certificates.verify(2, PHONE, &wrong, "APP1").await;
    }
    harness.store.interleave();

    // The final wrong guess reads the old code, then a reissue lands
    let key = Channel::Phone.code_key(PHONE);
    let (exhausted, _) = tokio::join!(
        harness.certificates.verify(2, PHONE, &wrong, "APP1"),
        async {
            tokio::task::yield_now().await;
            tokio::task::yield_now().await;
            harness.store.seed(&key, "424242", Duration::from_secs(300));
        },
    );

    assert_eq!(
        exhausted.unwrap_err(),
        VerificationError::AttemptsExceeded { max_attempts: 3 }
    );
    assert_eq!(harness.store.live_value(&key).as_deref(), Some("424242"));
}

#[tokio::test(start_paused = true)]
async fn test_transient_directory_failure_is_retried() {
    let directory = MockDirectory::default().with_credential(PHONE, "cred-9");
    directory.transient_failures.store(1, Ordering::SeqCst);
    let harness = Harness::with_directory(directory);
    let code = issue(&harness, Channel::Phone, PHONE).await;

    let outcome = harness.certificates.verify(2, PHONE, &code, "APP1").await.unwrap();

    assert_eq!(outcome.credential.credential_id, "cred-9");
    // Credential lookup twice, profile lookup once
    assert_eq!(harness.directory.lookup_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_persistent_directory_outage_surfaces() {
    let directory = MockDirectory::default();
    directory.transient_failures.store(10, Ordering::SeqCst);
    let harness = Harness::with_directory(directory);
    let code = issue(&harness, Channel::Phone, PHONE).await;

    let err = harness
        .certificates
        .verify(2, PHONE, &code, "APP1")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        VerificationError::RemoteLookupFailure {
            service: "credential directory",
            source: CollaboratorError::Unavailable(_),
        }
    ));
    assert_eq!(harness.directory.lookup_count(), 3);
    // Already consumed; the user has to request a new code
    let again = harness.certificates.verify(2, PHONE, &code, "APP1").await;
    assert_eq!(again.unwrap_err(), VerificationError::CodeNotFoundOrExpired);
}

#[tokio::test]
async fn test_rejected_lookup_is_not_retried() {
    let directory = MockDirectory::default();
    directory.reject_lookups.store(true, Ordering::SeqCst);
    let harness = Harness::with_directory(directory);
    let code = issue(&harness, Channel::Email, EMAIL).await;

    let err = harness
        .certificates
        .verify(1, EMAIL, &code, "APP1")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        VerificationError::RemoteLookupFailure {
            source: CollaboratorError::Rejected(_),
            ..
        }
    ));
    assert!(!err.is_retryable());
    assert_eq!(harness.directory.lookup_count(), 1);
}

#[tokio::test]
async fn test_credential_missing_after_creation() {
    let directory = MockDirectory::default();
    directory.drop_creations.store(true, Ordering::SeqCst);
    let harness = Harness::with_directory(directory);
    let code = issue(&harness, Channel::Phone, PHONE).await;

    let err = harness
        .certificates
        .verify(2, PHONE, &code, "APP1")
        .await
        .unwrap_err();

    assert!(matches!(err, VerificationError::NotFound { .. }));
    assert_eq!(harness.directory.creation_count(), 1);
}
