use super::*;

#[tokio::test]
async fn noop_notify_returns_ok() {
    let notifier = NoopNotifier::new();
    assert!(notifier.notify("title", "message").await.is_ok());
}

#[test]
fn noop_notifier_is_zero_sized() {
    let notifier = NoopNotifier::default();
    assert_eq!(std::mem::size_of_val(&notifier), 0);
}
