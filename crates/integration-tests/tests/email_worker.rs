//! Tests for the background email dispatch worker.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use tableside_core::{Email, OtpCode};
use tableside_integration_tests::RecordingMailer;
use tableside_server::services::email::{EmailDispatchWorker, EmailKind, EmailTask};
use tableside_server::services::queue::{MemoryQueue, TaskQueue};

async fn wait_for_sent(mailer: &RecordingMailer, count: usize) -> Vec<(EmailKind, String, String)> {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    loop {
        let sent = mailer.sent().await;
        if sent.len() >= count {
            return sent;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "worker did not deliver {count} emails in time"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn test_worker_delivers_queued_tasks_in_order() {
    let queue = Arc::new(MemoryQueue::new());
    let mailer = Arc::new(RecordingMailer::default());
    let worker = tokio::spawn(EmailDispatchWorker::new(queue.clone(), mailer.clone()).run());

    let email = Email::parse("a@b.com").unwrap();
    let otp = OtpCode::parse("123456").unwrap();
    EmailTask::verification(&email, &otp)
        .enqueue(queue.as_ref())
        .await
        .unwrap();
    EmailTask::password_reset(&email, &otp)
        .enqueue(queue.as_ref())
        .await
        .unwrap();

    let sent = wait_for_sent(&mailer, 2).await;
    assert_eq!(sent[0].0, EmailKind::Verification);
    assert_eq!(sent[1].0, EmailKind::PasswordReset);
    assert_eq!(sent[0].1, "a@b.com");
    assert_eq!(sent[0].2, "123456");

    worker.abort();
}

#[tokio::test]
async fn test_malformed_payload_is_skipped() {
    let queue = Arc::new(MemoryQueue::new());
    let mailer = Arc::new(RecordingMailer::default());
    let worker = tokio::spawn(EmailDispatchWorker::new(queue.clone(), mailer.clone()).run());

    queue.push(b"not json at all".to_vec()).await.unwrap();

    let email = Email::parse("a@b.com").unwrap();
    let otp = OtpCode::parse("654321").unwrap();
    EmailTask::verification(&email, &otp)
        .enqueue(queue.as_ref())
        .await
        .unwrap();

    let sent = wait_for_sent(&mailer, 1).await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].2, "654321");

    worker.abort();
}

#[tokio::test]
async fn test_delivery_failure_does_not_stop_the_worker() {
    let queue = Arc::new(MemoryQueue::new());
    let mailer = Arc::new(RecordingMailer::default());
    let worker = tokio::spawn(EmailDispatchWorker::new(queue.clone(), mailer.clone()).run());

    mailer.fail_next_delivery();

    let email = Email::parse("a@b.com").unwrap();
    EmailTask::verification(&email, &OtpCode::parse("111111").unwrap())
        .enqueue(queue.as_ref())
        .await
        .unwrap();
    EmailTask::verification(&email, &OtpCode::parse("222222").unwrap())
        .enqueue(queue.as_ref())
        .await
        .unwrap();

    // The first delivery failed and was not retried; only the second lands.
    let sent = wait_for_sent(&mailer, 1).await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].2, "222222");

    worker.abort();
}

/// Untagged legacy entries fall back to the verification template.
#[tokio::test]
async fn test_untagged_task_delivers_as_verification() {
    let queue = Arc::new(MemoryQueue::new());
    let mailer = Arc::new(RecordingMailer::default());
    let worker = tokio::spawn(EmailDispatchWorker::new(queue.clone(), mailer.clone()).run());

    queue
        .push(br#"{"email":"a@b.com","otp":"123456"}"#.to_vec())
        .await
        .unwrap();

    let sent = wait_for_sent(&mailer, 1).await;
    assert_eq!(sent[0].0, EmailKind::Verification);

    worker.abort();
}
