use presskit_sdk::{PressKitError, Session};
use serde_json::json;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_test::traced_test;

mod common;
use common::{config, confirmed, hash, pending, setup_session, MockWallet};

#[tokio::test(start_paused = true)]
async fn test_second_press_while_busy_is_refused() -> anyhow::Result<()> {
    let wallet = MockWallet::with(|s| {
        s.statuses = [pending(), confirmed(hash(0xcc))].into();
    });
    let session = setup_session(&wallet, config());
    session.connect().await?;

    let (first, second) = tokio::join!(session.submit_press(), session.submit_press());

    assert!(first?.is_some());
    assert!(matches!(second, Err(PressKitError::Busy)));
    assert_eq!(wallet.count("wallet_sendCalls"), 1);
    assert!(!session.is_busy());
    Ok(())
}

#[tokio::test]
async fn test_rejected_batch_is_user_rejected() -> anyhow::Result<()> {
    let wallet = MockWallet::with(|s| s.reject_send = true);
    let session = setup_session(&wallet, config());
    session.connect().await?;

    let err = session.submit_press().await.unwrap_err();

    assert!(matches!(err, PressKitError::UserRejected(_)));
    assert!(!err.is_unconfirmed());
    assert_eq!(wallet.count("wallet_getCallsStatus"), 0);

    let snapshot = session.snapshot();
    assert!(!snapshot.busy);
    assert!(snapshot.last_error.is_some());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_reverted_batch_is_poll_failure() -> anyhow::Result<()> {
    let wallet = MockWallet::with(|s| {
        s.statuses = [pending(), Ok(json!({ "status": 500, "receipts": [] }))].into();
    });
    let session = setup_session(&wallet, config());
    session.connect().await?;
    let before = session.snapshot().display;

    let err = session.submit_press().await.unwrap_err();

    match &err {
        PressKitError::PollFailure { status, .. } => assert_eq!(status, "failed"),
        other => panic!("unexpected error {other:?}"),
    }
    assert!(err.is_unconfirmed());
    assert_eq!(session.snapshot().display, before);
    Ok(())
}

#[tokio::test(start_paused = true)]
#[traced_test]
async fn test_cancel_pending_stops_polling() -> anyhow::Result<()> {
    let wallet = MockWallet::with(|s| {
        s.statuses = [pending(), pending(), pending(), confirmed(hash(0xcc))].into();
    });
    let session = setup_session(&wallet, config());
    session.connect().await?;

    let (result, _) = tokio::join!(session.submit_press(), async {
        tokio::time::sleep(Duration::from_millis(1_500)).await;
        session.cancel_pending().await;
    });

    assert!(matches!(result, Err(PressKitError::Cancelled)));
    assert_eq!(wallet.count("wallet_getCallsStatus"), 2);
    assert!(logs_contain("press cancelled after submission, outcome unconfirmed"));
    assert!(!session.is_busy());
    assert_eq!(session.snapshot().last_error, None);

    // Fresh token: the next press runs normally
    wallet.state().statuses = [confirmed(hash(0xcc))].into();
    assert!(session.submit_press().await?.is_some());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_disconnect_cancels_in_flight_press() -> anyhow::Result<()> {
    let wallet = MockWallet::new();
    let session = setup_session(&wallet, config());
    session.connect().await?;

    let (result, _) = tokio::join!(session.submit_press(), async {
        tokio::time::sleep(Duration::from_millis(3_500)).await;
        session.disconnect().await;
    });

    assert!(matches!(result, Err(PressKitError::Cancelled)));
    assert_eq!(wallet.count("wallet_getCallsStatus"), 4);
    let snapshot = session.snapshot();
    assert!(!snapshot.connected);
    assert!(!snapshot.busy);
    Ok(())
}

#[tokio::test]
async fn test_cancelled_token_never_submits() -> anyhow::Result<()> {
    let wallet = MockWallet::new();
    let session = setup_session(&wallet, config());
    session.connect().await?;

    let token = CancellationToken::new();
    token.cancel();
    let result = session.press().with_cancellation(token).submit().await;

    assert!(matches!(result, Err(PressKitError::Cancelled)));
    assert_eq!(wallet.count("wallet_sendCalls"), 0);
    assert!(!session.snapshot().busy);
    Ok(())
}

#[tokio::test]
async fn test_uninitialized_session_refuses_writes() {
    let session = Session::new(config()).unwrap();

    assert!(matches!(
        session.submit_press().await,
        Err(PressKitError::ProviderUnavailable)
    ));
    assert!(!session.is_busy());
}

#[tokio::test(start_paused = true)]
#[traced_test]
async fn test_transient_status_errors_are_logged_not_surfaced() -> anyhow::Result<()> {
    let wallet = MockWallet::with(|s| {
        s.statuses = [common::method_missing(), confirmed(hash(0xcc))].into();
    });
    let session = setup_session(&wallet, config());
    session.connect().await?;

    let settlement = session.submit_press().await?.unwrap();

    assert_eq!(settlement.attempts, 2);
    assert_eq!(session.snapshot().last_error, None);
    assert!(logs_contain("status query failed"));
    Ok(())
}
