//! Integration tests for the login status flow.

use std::sync::{Arc, Mutex};

use herald_auth::{LoginStatus, StatusConfig, StatusStore};
use herald_events::{Callback, Target};
use herald_models::{LoginEvent, LoginFailure, LoginPayload, LoginState};
use serde_json::json;

type Seen = Arc<Mutex<Vec<LoginPayload>>>;

fn recorder(seen: &Seen) -> Callback<LoginPayload> {
    let seen = seen.clone();
    Callback::new(move |payload: &LoginPayload| {
        seen.lock().unwrap().push(payload.clone());
    })
}

fn taken(seen: &Seen) -> Vec<LoginPayload> {
    std::mem::take(&mut *seen.lock().unwrap())
}

#[test]
fn test_success_subscriber_queued_until_success() {
    let store = StatusStore::default();
    let status = LoginStatus::with_store(&store);
    let successes = Seen::default();
    let changes = Seen::default();

    assert_eq!(status.status(), LoginState::Pending);
    status.on_success(recorder(&successes)).unwrap();
    status.on_status_change(recorder(&changes)).unwrap();
    assert!(taken(&successes).is_empty());

    status.logging().unwrap();
    assert_eq!(status.status(), LoginState::InProgress);
    assert_eq!(
        taken(&changes),
        vec![LoginPayload::StatusChange(LoginState::InProgress)]
    );
    assert!(taken(&successes).is_empty());

    status.success("token-123").unwrap();
    assert_eq!(status.status(), LoginState::Succeeded);
    assert_eq!(
        taken(&changes),
        vec![LoginPayload::StatusChange(LoginState::Succeeded)]
    );
    assert_eq!(
        taken(&successes),
        vec![LoginPayload::Success(json!("token-123"))]
    );
}

#[test]
fn test_late_success_subscriber_fires_immediately() {
    let store = StatusStore::default();
    let status = LoginStatus::with_store(&store);
    status.logging().unwrap();
    status.success("token-123").unwrap();

    let seen = Seen::default();
    status.on_success(recorder(&seen)).unwrap();

    assert_eq!(taken(&seen), vec![LoginPayload::Success(json!("token-123"))]);
    assert_eq!(status.listener_count(LoginEvent::Success), 0);
}

#[test]
fn test_failure_is_not_retained() {
    let store = StatusStore::default();
    let status = LoginStatus::with_store(&store);
    let first = Seen::default();
    let second = Seen::default();

    status.on_fail(recorder(&first)).unwrap();
    status.logging().unwrap();
    status.fail(LoginFailure::new("bad credentials")).unwrap();

    assert_eq!(status.status(), LoginState::Pending);
    let received = taken(&first);
    assert_eq!(received.len(), 1);
    assert_eq!(
        received[0].as_failure().map(|e| e.to_string()),
        Some("bad credentials".to_string())
    );

    status.on_fail(recorder(&second)).unwrap();
    assert!(taken(&second).is_empty());
}

#[test]
fn test_event_order_per_transition() {
    let store = StatusStore::default();
    let status = LoginStatus::with_store(&store);
    let seen = Seen::default();

    for event in LoginEvent::ALL {
        status.on(event, recorder(&seen), None).unwrap();
    }

    status.logging().unwrap();
    status.fail(LoginFailure::new("timeout")).unwrap();

    assert_eq!(
        taken(&seen),
        vec![
            LoginPayload::StatusChange(LoginState::InProgress),
            LoginPayload::Logging,
            LoginPayload::StatusChange(LoginState::Pending),
            LoginPayload::Fail(LoginFailure::new("timeout")),
        ]
    );
}

#[test]
fn test_reauthentication_cycle() {
    let store = StatusStore::default();
    let status = LoginStatus::with_store(&store);
    let seen = Seen::default();

    status.logging().unwrap();
    status.success("first").unwrap();
    status.on_status_change(recorder(&seen)).unwrap();

    status.logging().unwrap();
    assert!(status.last_result().is_none());
    status.success("second").unwrap();

    assert_eq!(
        taken(&seen),
        vec![
            LoginPayload::StatusChange(LoginState::InProgress),
            LoginPayload::StatusChange(LoginState::Succeeded),
        ]
    );
    assert_eq!(status.results().len(), 2);
}

#[test]
fn test_holders_share_state_not_listeners() {
    let store = StatusStore::default();
    let header = LoginStatus::with_store(&store);
    let sidebar = LoginStatus::with_store(&store);
    let header_seen = Seen::default();
    let sidebar_seen = Seen::default();

    header.on_success(recorder(&header_seen)).unwrap();
    sidebar.on_success(recorder(&sidebar_seen)).unwrap();

    // Clearing one holder leaves the other subscribed.
    header.off(LoginEvent::Success, Target::Any).unwrap();

    sidebar.logging().unwrap();
    sidebar.success("token").unwrap();

    assert_eq!(header.status(), LoginState::Succeeded);
    assert!(taken(&header_seen).is_empty());
    assert_eq!(taken(&sidebar_seen), vec![LoginPayload::Success(json!("token"))]);
}

#[test]
fn test_transition_from_other_holder_notifies_all() {
    let store = StatusStore::default();
    let a = LoginStatus::with_store(&store);
    let b = LoginStatus::with_store(&store);
    let seen = Seen::default();

    a.on_logging(recorder(&seen)).unwrap();
    b.on_logging(recorder(&seen)).unwrap();

    b.logging().unwrap();

    assert_eq!(taken(&seen), vec![LoginPayload::Logging, LoginPayload::Logging]);
}

#[test]
fn test_off_by_group_and_wildcard() {
    let store = StatusStore::default();
    let status = LoginStatus::with_store(&store);
    let seen = Seen::default();

    status.on(LoginEvent::StatusChange, recorder(&seen), Some("menu")).unwrap();
    status.on(LoginEvent::StatusChange, recorder(&seen), None).unwrap();
    status.on(LoginEvent::Fail, recorder(&seen), Some("menu")).unwrap();

    assert_eq!(status.off(LoginEvent::StatusChange, "menu").unwrap(), 1);
    assert_eq!(status.listener_count(LoginEvent::StatusChange), 1);
    assert_eq!(status.listener_count(LoginEvent::Fail), 1);

    assert_eq!(status.off(LoginEvent::StatusChange, "*").unwrap(), 1);
    assert_eq!(status.listener_count(LoginEvent::StatusChange), 0);
    assert_eq!(status.listener_count(LoginEvent::Fail), 1);

    status.logging().unwrap();
    status.fail(LoginFailure::new("x")).unwrap();
    assert_eq!(taken(&seen), vec![LoginPayload::Fail(LoginFailure::new("x"))]);

    assert_eq!(status.clear().unwrap(), 1);
    status.fail(LoginFailure::new("y")).unwrap();
    assert!(taken(&seen).is_empty());
}

#[test]
fn test_once_listener_fires_on_next_transition_only() {
    let store = StatusStore::default();
    let status = LoginStatus::with_store(&store);
    let seen = Seen::default();

    status
        .once(LoginEvent::StatusChange, recorder(&seen), None)
        .unwrap();
    status.logging().unwrap();
    status.success(json!({"token": "abc"})).unwrap();

    assert_eq!(
        taken(&seen),
        vec![LoginPayload::StatusChange(LoginState::InProgress)]
    );
}

#[test]
fn test_listener_can_drive_transitions() {
    let store = StatusStore::default();
    let status = LoginStatus::with_store(&store);
    let seen = Seen::default();

    let driver = {
        let status = status.clone();
        Callback::new(move |_: &LoginPayload| {
            status.success("from-listener").unwrap();
        })
    };
    status.once(LoginEvent::Logging, driver, None).unwrap();
    status.on_success(recorder(&seen)).unwrap();

    status.logging().unwrap();

    assert_eq!(status.status(), LoginState::Succeeded);
    assert_eq!(
        taken(&seen),
        vec![LoginPayload::Success(json!("from-listener"))]
    );
}

#[test]
fn test_panicking_listener_does_not_block_transition() {
    let store = StatusStore::default();
    let status = LoginStatus::with_store(&store);
    let seen = Seen::default();

    status
        .on_success(Callback::new(|_: &LoginPayload| panic!("render failed")))
        .unwrap();
    status.on_success(recorder(&seen)).unwrap();

    assert!(status.success("token").is_ok());
    assert_eq!(taken(&seen).len(), 1);
}

#[test]
fn test_destroyed_holder_stops_receiving() {
    let store = StatusStore::new(StatusConfig::default());
    let kept = LoginStatus::with_store(&store);
    let destroyed = LoginStatus::with_store(&store);
    let seen = Seen::default();

    kept.on_status_change(recorder(&seen)).unwrap();
    destroyed.on_status_change(recorder(&seen)).unwrap();
    assert_eq!(store.holder_count(), 2);

    destroyed.destroy();
    assert_eq!(store.holder_count(), 1);

    kept.logging().unwrap();
    assert_eq!(taken(&seen).len(), 1);
}

#[test]
fn test_dropped_holder_is_released() {
    let store = StatusStore::default();
    {
        let temp = LoginStatus::with_store(&store);
        temp.on_status_change(Callback::new(|_: &LoginPayload| {}))
            .unwrap();
        assert_eq!(store.holder_count(), 1);
    }

    assert_eq!(store.holder_count(), 0);
    assert_eq!(store.registry().prune(), 1);
}
