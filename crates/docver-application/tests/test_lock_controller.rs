mod support;

use docver_application::LockController;
use docver_core::document::LockState;
use docver_core::gateway::CheckoutFlag;
use docver_core::session::SessionHandle;
use docver_core::status;
use support::{FakeEcm, SESSION, document, sample_groups};

fn session() -> SessionHandle {
    SessionHandle::new(SESSION)
}

#[tokio::test]
async fn test_acquire_returns_descriptor_and_marks_self() {
    let ecm = FakeEcm::with_groups(sample_groups());
    let mut lock = LockController::new(ecm.clone());

    let descriptor = lock.acquire_lock(&session(), &document()).await.unwrap();

    assert_eq!(descriptor.version_number, "1.0");
    assert_eq!(descriptor.volume_id, "7");
    assert_eq!(descriptor.site_id, "2");
    assert_eq!(descriptor.parent_folder_index.as_deref(), Some("88"));
    assert_eq!(lock.state(), LockState::CheckedOutBySelf);
    assert!(ecm.is_checked_out());
}

#[tokio::test]
async fn test_single_conflict_is_recovered() {
    let ecm = FakeEcm::with_groups(sample_groups());
    ecm.script_conflicts(&[status::ALREADY_CHECKED_OUT]);
    let mut lock = LockController::new(ecm.clone());

    let descriptor = lock.acquire_lock(&session(), &document()).await.unwrap();

    assert_eq!(descriptor.version_number, "1.0");
    assert_eq!(
        ecm.checkout_calls(),
        vec![CheckoutFlag::Lock, CheckoutFlag::Unlock, CheckoutFlag::Lock]
    );
    assert_eq!(lock.state(), LockState::CheckedOutBySelf);
}

#[tokio::test]
async fn test_alternate_conflict_code_is_recovered() {
    let ecm = FakeEcm::with_groups(sample_groups());
    ecm.script_conflicts(&[status::CHECKED_OUT_LOCKED]);
    let mut lock = LockController::new(ecm.clone());

    assert!(lock.acquire_lock(&session(), &document()).await.is_ok());
}

#[tokio::test]
async fn test_second_conflict_is_fatal() {
    let ecm = FakeEcm::with_groups(sample_groups());
    ecm.script_conflicts(&[status::ALREADY_CHECKED_OUT, status::CHECKED_OUT_LOCKED]);
    let mut lock = LockController::new(ecm.clone());

    let err = lock.acquire_lock(&session(), &document()).await.unwrap_err();

    assert!(err.is_lock_conflict());
    assert_eq!(ecm.checkout_calls().len(), 3);
    assert_eq!(lock.state(), LockState::CheckedOutByOther);
}

#[tokio::test]
async fn test_other_status_is_rejected_without_retry() {
    let ecm = FakeEcm::with_groups(sample_groups());
    ecm.script_conflicts(&["-50020"]);
    let mut lock = LockController::new(ecm.clone());

    let err = lock.acquire_lock(&session(), &document()).await.unwrap_err();

    assert!(err.is_rejected());
    assert_eq!(ecm.checkout_calls(), vec![CheckoutFlag::Lock]);
}

#[tokio::test]
async fn test_force_release_swallows_failure_status() {
    let ecm = FakeEcm::with_groups(sample_groups());
    let mut lock = LockController::new(ecm.clone());

    // Nothing is checked out, so the fake answers with a failure status.
    lock.force_release(&session(), &document()).await.unwrap();

    assert_eq!(lock.state(), LockState::Unlocked);
    assert_eq!(ecm.checkout_calls(), vec![CheckoutFlag::Unlock]);
}

#[tokio::test]
async fn test_peek_leaves_document_unlocked() {
    let ecm = FakeEcm::with_groups(sample_groups());
    let mut lock = LockController::new(ecm.clone());

    let descriptor = lock.peek_version(&session(), &document()).await.unwrap();

    assert_eq!(descriptor.version_number, "1.0");
    assert!(!ecm.is_checked_out());
    assert_eq!(lock.state(), LockState::Unlocked);
}

#[tokio::test]
async fn test_missing_storage_ids_default_to_one() {
    let ecm = FakeEcm::with_groups(sample_groups());
    ecm.omit_storage_ids();
    let mut lock = LockController::new(ecm.clone());

    let descriptor = lock.acquire_lock(&session(), &document()).await.unwrap();

    assert_eq!(descriptor.volume_id, "1");
    assert_eq!(descriptor.site_id, "1");
}
