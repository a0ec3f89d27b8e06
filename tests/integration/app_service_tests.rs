//! Integration tests for the AppService → FSM → ports pipeline.
//!
//! These run on the host (x86_64) and drive the control loop with
//! explicit timestamps against [`MockHardware`], checking the latch,
//! display and telemetry outputs end to end.

use lockbox::app::events::AppEvent;
use lockbox::app::service::{AccessDecision, AppService};
use lockbox::config::SystemConfig;
use lockbox::display::{LEAK_ALERT, STATUS_OPEN, STATUS_SECURE, TEMP_ERROR, TIME_UNKNOWN};
use lockbox::fsm::StateId;
use lockbox::fsm::context::LockState;
use lockbox::telemetry::SENTINEL_LINE;

use crate::mock_hw::{HwCall, LogSink, MockClock, MockHardware};

const AUTHORIZED: &str = "0F B8 E2 29";
const STRANGER: &str = "DE AD BE EF";
/// Line 1 of the status screen for the default mock reading and time.
const STATUS_LINE1: &str = "T:22\u{00b0}C     14:05";

/// Started at t=0 and settled into Locked at t=500, history cleared.
fn make_app() -> (AppService, MockHardware, LogSink) {
    let mut app = AppService::from_config(SystemConfig::default()).unwrap();
    let mut hw = MockHardware::new();
    let mut sink = LogSink::new();
    app.start(0, &mut hw, &mut sink);
    app.iterate(500, &mut hw, &mut sink);
    assert_eq!(app.state(), StateId::Locked);
    hw.clear_history();
    sink.events.clear();
    (app, hw, sink)
}

// ── Startup ───────────────────────────────────────────────────

#[test]
fn startup_shows_boot_screen_and_relocks() {
    let mut app = AppService::from_config(SystemConfig::default()).unwrap();
    let mut hw = MockHardware::new();
    let mut sink = LogSink::new();

    app.start(0, &mut hw, &mut sink);
    assert_eq!(
        hw.calls,
        vec![
            HwCall::Show("LockBox".into(), "Starting...".into()),
            HwCall::DriveTo(0),
        ]
    );
    assert_eq!(app.lock_state(), LockState::Locked);
    assert!(matches!(sink.events.first(), Some(AppEvent::Started)));

    app.iterate(499, &mut hw, &mut sink);
    assert_eq!(app.state(), StateId::Relocking);
    app.iterate(500, &mut hw, &mut sink);
    assert_eq!(app.state(), StateId::Locked);
    assert_eq!(hw.servo_calls(), vec![HwCall::DriveTo(0), HwCall::Release]);
}

#[test]
fn reader_not_polled_during_startup_relock() {
    let mut app = AppService::from_config(SystemConfig::default()).unwrap();
    let mut hw = MockHardware::new();
    let mut sink = LogSink::new();
    app.start(0, &mut hw, &mut sink);
    app.iterate(100, &mut hw, &mut sink);
    assert_eq!(hw.polls, 0);
    app.iterate(500, &mut hw, &mut sink);
    assert_eq!(hw.polls, 1);
}

// ── Telemetry + status display ───────────────────────────────

#[test]
fn telemetry_every_interval_with_status_screen() {
    let (mut app, mut hw, mut sink) = make_app();

    app.iterate(1_999, &mut hw, &mut sink);
    assert!(hw.lines.is_empty());

    app.iterate(2_000, &mut hw, &mut sink);
    assert_eq!(hw.lines, vec!["22.50|41.00|DRY|LOCKED".to_string()]);
    assert_eq!(hw.last_show(), Some((STATUS_LINE1, STATUS_SECURE)));
    assert_eq!(app.last_telemetry_ms(), 2_000);

    app.iterate(3_999, &mut hw, &mut sink);
    assert_eq!(hw.lines.len(), 1);
    app.iterate(4_000, &mut hw, &mut sink);
    assert_eq!(hw.lines.len(), 2);
}

#[test]
fn sensor_fault_sends_sentinel_and_shows_error() {
    let (mut app, mut hw, mut sink) = make_app();
    hw.reading.humidity_pct = None;

    app.iterate(2_000, &mut hw, &mut sink);
    assert_eq!(hw.lines, vec![SENTINEL_LINE.to_string()]);
    assert!(sink.events.iter().any(|e| matches!(e, AppEvent::SensorFault)));
    // Temperature itself is still valid, so the display shows it.
    assert_eq!(hw.last_show().map(|(l1, _)| l1.starts_with("T:22")), Some(true));

    hw.reading.temperature_c = None;
    app.iterate(4_000, &mut hw, &mut sink);
    assert_eq!(hw.lines[1], SENTINEL_LINE);
    assert_eq!(hw.last_show().map(|(l1, _)| l1.starts_with(TEMP_ERROR)), Some(true));
}

#[test]
fn unreadable_rtc_shows_placeholder() {
    let (mut app, mut hw, mut sink) = make_app();
    hw.time = None;
    app.iterate(2_000, &mut hw, &mut sink);
    assert_eq!(hw.last_show().map(|(l1, _)| l1.ends_with(TIME_UNKNOWN)), Some(true));
}

#[test]
fn leak_reported_in_telemetry_and_display() {
    let (mut app, mut hw, mut sink) = make_app();
    hw.reading.leak_raw = 301;
    app.iterate(2_000, &mut hw, &mut sink);
    assert_eq!(hw.lines, vec!["22.50|41.00|LEAK|LOCKED".to_string()]);
    assert_eq!(hw.last_show().map(|(_, l2)| l2), Some(LEAK_ALERT));

    hw.reading.leak_raw = 300;
    app.iterate(4_000, &mut hw, &mut sink);
    assert_eq!(hw.lines[1], "22.50|41.00|DRY|LOCKED");
    assert_eq!(hw.last_show().map(|(_, l2)| l2), Some(STATUS_SECURE));
}

// ── Authorized card ──────────────────────────────────────────

#[test]
fn authorized_card_end_to_end() {
    let (mut app, mut hw, mut sink) = make_app();

    hw.tap(AUTHORIZED);
    app.iterate(1_000, &mut hw, &mut sink);
    assert_eq!(app.lock_state(), LockState::Open);
    assert_eq!(hw.servo_calls(), vec![HwCall::DriveTo(90)]);

    app.iterate(1_500, &mut hw, &mut sink);
    assert_eq!(app.state(), StateId::Open);
    assert_eq!(hw.last_show(), Some(("Access Granted", "Box Open")));

    // Telemetry keeps flowing while the box is open.
    app.iterate(2_000, &mut hw, &mut sink);
    assert!(hw.lines.last().unwrap().ends_with("|DRY|OPEN"));

    // OPEN -> LOCKED exactly settle + hold after the grant.
    app.iterate(6_499, &mut hw, &mut sink);
    assert_eq!(app.lock_state(), LockState::Open);
    app.iterate(6_500, &mut hw, &mut sink);
    assert_eq!(app.lock_state(), LockState::Locked);

    app.iterate(7_000, &mut hw, &mut sink);
    assert_eq!(app.state(), StateId::Locked);
    assert_eq!(
        hw.servo_calls(),
        vec![
            HwCall::DriveTo(90),
            HwCall::Release,
            HwCall::DriveTo(0),
            HwCall::Release,
        ]
    );

    assert_eq!(
        sink.lock_sequence(LockState::Locked),
        vec![LockState::Locked, LockState::Open, LockState::Locked]
    );
    assert_eq!(sink.granted(), 1);
    assert_eq!(sink.denied(), 0);
}

#[test]
fn status_screen_returns_after_session() {
    let (mut app, mut hw, mut sink) = make_app();
    hw.tap(AUTHORIZED);
    app.iterate(1_000, &mut hw, &mut sink);
    app.iterate(1_500, &mut hw, &mut sink);
    app.iterate(6_500, &mut hw, &mut sink);
    app.iterate(7_000, &mut hw, &mut sink);
    app.iterate(8_500, &mut hw, &mut sink);
    assert_eq!(hw.last_show().map(|(_, l2)| l2), Some(STATUS_SECURE));
}

#[test]
fn status_repainted_as_soon_as_box_relocks() {
    let (mut app, mut hw, mut sink) = make_app();
    hw.tap(AUTHORIZED);
    app.iterate(1_000, &mut hw, &mut sink);
    // Lock flip repaints the status screen without waiting for a tick.
    assert_eq!(hw.last_show(), Some((STATUS_LINE1, STATUS_OPEN)));

    for t in (1_500..6_500).step_by(500) {
        app.iterate(t, &mut hw, &mut sink);
    }
    assert_eq!(hw.last_show(), Some(("Access Granted", "Box Open")));

    app.iterate(6_500, &mut hw, &mut sink);
    assert_eq!(app.lock_state(), LockState::Locked);
    assert_eq!(hw.last_show(), Some((STATUS_LINE1, STATUS_SECURE)));

    for t in (6_600..8_000).step_by(100) {
        app.iterate(t, &mut hw, &mut sink);
        assert_eq!(hw.last_show().map(|(_, l2)| l2), Some(STATUS_SECURE));
    }
}

#[test]
fn status_repainted_when_denial_dwell_ends() {
    let (mut app, mut hw, mut sink) = make_app();
    hw.tap(STRANGER);
    app.iterate(5_000, &mut hw, &mut sink);
    hw.clear_history();

    app.iterate(6_990, &mut hw, &mut sink);
    assert_eq!(app.state(), StateId::Denied);
    app.iterate(7_000, &mut hw, &mut sink);
    assert_eq!(app.state(), StateId::Locked);
    assert_eq!(
        hw.calls.last(),
        Some(&HwCall::Show(STATUS_LINE1.into(), STATUS_SECURE.into()))
    );
}

#[test]
fn leak_alert_shown_on_feedback_screens_immediately() {
    let (mut app, mut hw, mut sink) = make_app();
    hw.reading.leak_raw = 900;
    app.iterate(2_000, &mut hw, &mut sink);

    hw.tap(STRANGER);
    app.iterate(2_100, &mut hw, &mut sink);
    assert_eq!(hw.last_show(), Some(("Access Denied", LEAK_ALERT)));

    app.iterate(4_100, &mut hw, &mut sink);
    assert_eq!(app.state(), StateId::Locked);
    assert_eq!(hw.last_show().map(|(_, l2)| l2), Some(LEAK_ALERT));

    hw.tap(AUTHORIZED);
    app.iterate(4_200, &mut hw, &mut sink);
    app.iterate(4_700, &mut hw, &mut sink);
    assert_eq!(app.state(), StateId::Open);
    assert_eq!(hw.last_show(), Some(("Access Granted", LEAK_ALERT)));
}

#[test]
fn status_shows_open_while_servo_moves() {
    let (mut app, mut hw, mut sink) = make_app();
    // Telemetry tick falls inside the servo settle window.
    hw.tap(AUTHORIZED);
    app.iterate(1_800, &mut hw, &mut sink);
    app.iterate(2_000, &mut hw, &mut sink);
    assert_eq!(app.state(), StateId::Unlocking);
    assert_eq!(hw.last_show().map(|(_, l2)| l2), Some(STATUS_OPEN));
}

#[test]
fn cards_ignored_while_session_runs() {
    let (mut app, mut hw, mut sink) = make_app();
    hw.tap(AUTHORIZED);
    app.iterate(1_000, &mut hw, &mut sink);
    let polls = hw.polls;

    hw.tap(STRANGER);
    for t in (1_100..7_000).step_by(100) {
        app.iterate(t, &mut hw, &mut sink);
    }
    assert_eq!(hw.polls, polls);
    assert_eq!(sink.denied(), 0);
    assert_eq!(app.lock_state(), LockState::Locked);
}

#[test]
fn check_credential_during_session_cannot_extend_it() {
    let (mut app, mut hw, mut sink) = make_app();
    hw.tap(AUTHORIZED);
    app.iterate(1_000, &mut hw, &mut sink);
    app.iterate(1_500, &mut hw, &mut sink);

    let again = AUTHORIZED.parse().unwrap();
    assert_eq!(
        app.check_credential(again, 4_000, &mut hw, &mut sink),
        AccessDecision::Ignored
    );

    app.iterate(6_500, &mut hw, &mut sink);
    assert_eq!(app.lock_state(), LockState::Locked);
    assert_eq!(sink.granted(), 1);
}

// ── Unauthorized card ────────────────────────────────────────

#[test]
fn unauthorized_card_shows_denial_then_clears() {
    let (mut app, mut hw, mut sink) = make_app();

    hw.tap(STRANGER);
    app.iterate(1_000, &mut hw, &mut sink);
    assert_eq!(app.state(), StateId::Denied);
    assert_eq!(app.lock_state(), LockState::Locked);
    assert_eq!(hw.last_show(), Some(("Access Denied", "")));

    app.iterate(2_999, &mut hw, &mut sink);
    assert_eq!(app.state(), StateId::Denied);
    app.iterate(3_000, &mut hw, &mut sink);
    assert_eq!(app.state(), StateId::Locked);
    let tail = &hw.calls[hw.calls.len() - 2..];
    assert_eq!(tail[0], HwCall::Clear);
    assert_eq!(
        tail[1],
        HwCall::Show(STATUS_LINE1.into(), STATUS_SECURE.into())
    );

    assert!(hw.servo_calls().is_empty());
    assert_eq!(sink.denied(), 1);
    assert_eq!(sink.granted(), 0);
    assert_eq!(sink.lock_sequence(LockState::Locked), vec![LockState::Locked]);
}

#[test]
fn repeated_denials_have_no_lockout() {
    let (mut app, mut hw, mut sink) = make_app();
    let mut t = 1_000;
    for _ in 0..5 {
        hw.tap(STRANGER);
        app.iterate(t, &mut hw, &mut sink);
        t += 2_000;
        app.iterate(t, &mut hw, &mut sink);
        t += 10;
    }
    hw.tap(AUTHORIZED);
    app.iterate(t, &mut hw, &mut sink);
    assert_eq!(app.lock_state(), LockState::Open);
    assert_eq!(sink.denied(), 5);
}

#[test]
fn lowercase_config_uid_matches_reader_uid() {
    let mut config = SystemConfig::default();
    config.authorized_uids.clear();
    let mut uid = heapless::String::new();
    uid.push_str("0f b8 e2 29").unwrap();
    config.authorized_uids.push(uid).unwrap();

    let mut app = AppService::from_config(config).unwrap();
    let mut hw = MockHardware::new();
    let mut sink = LogSink::new();
    app.start(0, &mut hw, &mut sink);
    app.iterate(500, &mut hw, &mut sink);

    let id = AUTHORIZED.parse().unwrap();
    assert_eq!(app.check_credential(id, 600, &mut hw, &mut sink), AccessDecision::Granted);
}

// ── External lock requests ───────────────────────────────────

#[test]
fn lock_while_locked_is_idempotent() {
    let (mut app, mut hw, mut sink) = make_app();

    assert!(app.lock(1_000, &mut hw, &mut sink));
    assert_eq!(app.lock_state(), LockState::Locked);
    assert_eq!(app.state(), StateId::Relocking);
    app.iterate(1_500, &mut hw, &mut sink);
    assert_eq!(app.state(), StateId::Locked);

    assert!(app.lock(2_000, &mut hw, &mut sink));
    assert!(app.lock(2_100, &mut hw, &mut sink));
    app.iterate(2_600, &mut hw, &mut sink);
    assert_eq!(app.state(), StateId::Locked);
    assert_eq!(app.lock_state(), LockState::Locked);

    assert_eq!(
        hw.servo_calls(),
        vec![
            HwCall::DriveTo(0),
            HwCall::Release,
            HwCall::DriveTo(0),
            HwCall::DriveTo(0),
            HwCall::Release,
        ]
    );
    assert!(!sink.events.iter().any(|e| matches!(e, AppEvent::LockChanged { .. })));
}

#[test]
fn lock_request_cannot_shorten_session() {
    let (mut app, mut hw, mut sink) = make_app();
    hw.tap(AUTHORIZED);
    app.iterate(1_000, &mut hw, &mut sink);
    app.iterate(1_500, &mut hw, &mut sink);

    assert!(!app.lock(2_000, &mut hw, &mut sink));
    assert_eq!(app.lock_state(), LockState::Open);

    app.iterate(6_499, &mut hw, &mut sink);
    assert_eq!(app.lock_state(), LockState::Open);
    app.iterate(6_500, &mut hw, &mut sink);
    assert_eq!(app.lock_state(), LockState::Locked);
}

// ── Clock-driven iteration ───────────────────────────────────

#[test]
fn iterate_with_reads_the_clock() {
    let (mut app, mut hw, mut sink) = make_app();
    let mut clock = MockClock { now_ms: 1_000 };
    app.iterate_with(&clock, &mut hw, &mut sink);
    assert!(hw.lines.is_empty());
    clock.now_ms = 2_000;
    app.iterate_with(&clock, &mut hw, &mut sink);
    assert_eq!(hw.lines.len(), 1);
}
