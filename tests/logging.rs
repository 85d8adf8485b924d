use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use stand_in::infrastructure::mocks::MockCaptureLayer;
use stand_in::{InvocationFailure, LogReporter, Mock, UnmatchedCallPolicy, Verifier};

#[test]
fn test_default_fallback_is_logged() {
    let capture = MockCaptureLayer::new();
    let subscriber = tracing_subscriber::registry().with(capture.clone());

    tracing::subscriber::with_default(subscriber, || {
        let mock = Mock::new("View");
        let display = mock.method::<i32, bool>("display").unwrap();
        assert!(!display.invoke(7));
    });

    let fallbacks: Vec<_> = capture
        .at_level(Level::DEBUG)
        .into_iter()
        .filter(|e| e.message.contains("no stub matched"))
        .collect();
    assert_eq!(fallbacks.len(), 1);
    assert_eq!(fallbacks[0].field("operation"), Some("View::display"));
    assert_eq!(fallbacks[0].field("arguments"), Some("7"));
}

#[test]
fn test_every_call_is_traced() {
    let capture = MockCaptureLayer::new();
    let subscriber = tracing_subscriber::registry().with(capture.clone());

    tracing::subscriber::with_default(subscriber, || {
        let mock = Mock::new("View");
        let display = mock.method::<i32, bool>("display").unwrap();
        display.when().always_return(true);
        for v in 0..3 {
            display.invoke(v);
        }
    });

    let traced: Vec<_> = capture
        .at_level(Level::TRACE)
        .into_iter()
        .filter(|e| e.message == "call recorded")
        .collect();
    assert_eq!(traced.len(), 3);
    assert_eq!(traced[2].field("sequence"), Some("3"));
    assert_eq!(traced[0].field("outcome"), Some("Stubbed { entry: 0 }"));
}

#[test]
fn test_stub_configuration_is_logged() {
    let capture = MockCaptureLayer::new();
    let subscriber = tracing_subscriber::registry().with(capture.clone());

    tracing::subscriber::with_default(subscriber, || {
        let mock = Mock::new("View");
        let display = mock.method::<i32, bool>("display").unwrap();
        display.when().with_args(3).returns(true);
    });

    let configured: Vec<_> = capture
        .get_captured()
        .into_iter()
        .filter(|e| e.message == "stub configured")
        .collect();
    assert_eq!(configured.len(), 1);
    assert_eq!(configured[0].field("matcher"), Some("== 3"));
    assert_eq!(configured[0].field("generator"), Some("constant"));
}

#[test]
fn test_strict_mock_failure_is_logged() {
    let capture = MockCaptureLayer::new();
    let subscriber = tracing_subscriber::registry().with(capture.clone());

    tracing::subscriber::with_default(subscriber, || {
        let mock = Mock::builder("Store")
            .with_unmatched_policy(UnmatchedCallPolicy::Fail)
            .build();
        let get = mock.method::<String, Option<u32>>("get").unwrap();
        get.when().with_args("known".to_string()).returns(Some(1));

        assert_eq!(get.try_invoke("known".to_string()), Ok(Some(1)));
        assert!(get.try_invoke("missing".to_string()).is_err());
        assert_eq!(get.call_count(), 2);
        assert_eq!(mock.metrics().calls_failed(), 1);
    });

    let failures: Vec<_> = capture
        .at_level(Level::DEBUG)
        .into_iter()
        .filter(|e| e.message == "mocked call failed")
        .collect();
    assert_eq!(failures.len(), 1);
    assert!(failures[0].field("error").unwrap().contains("Store::get failed"));
}

#[test]
fn test_computed_failure_is_logged() {
    let capture = MockCaptureLayer::new();
    let subscriber = tracing_subscriber::registry().with(capture.clone());

    tracing::subscriber::with_default(subscriber, || {
        let mock = Mock::new("Store");
        let put = mock.method::<(String, u32), ()>("put").unwrap();
        put.when().always_fail(InvocationFailure::new("read-only"));
        assert!(put.try_invoke(("k".to_string(), 1)).is_err());
    });

    let failures = capture.at_level(Level::DEBUG);
    assert!(failures
        .iter()
        .any(|e| e.field("error") == Some("Store::put failed: read-only")));
}

#[test]
fn test_log_reporter_emits_error_event() {
    let capture = MockCaptureLayer::new();
    let subscriber = tracing_subscriber::registry().with(capture.clone());

    tracing::subscriber::with_default(subscriber, || {
        let mock = Mock::new("View");
        let display = mock.method::<i32, bool>("display").unwrap();
        display.invoke(1);

        let verifier = Verifier::with_reporter(Arc::new(LogReporter));
        let verdict = verifier.check(display.calls().exactly(2));
        assert!(verdict.failed());
    });

    let errors = capture.at_level(Level::ERROR);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("verification failed: View::display called exactly 2 times"));
    assert_eq!(errors[0].field("actual_calls"), Some("1"));
}

#[test]
fn test_reset_is_logged() {
    let capture = MockCaptureLayer::new();
    let subscriber = tracing_subscriber::registry().with(capture.clone());

    tracing::subscriber::with_default(subscriber, || {
        let mock = Mock::new("View");
        mock.method::<i32, bool>("display").unwrap();
        mock.reset();
    });

    assert!(capture
        .at_level(Level::DEBUG)
        .iter()
        .any(|e| e.message == "mock reset" && e.field("capability") == Some("View")));
}
