//! Unit tests for the engine crate.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::*;

const DELAY: Duration = Duration::from_secs(3);

/// Sensor that replays a fixed script of results, then matches forever.
struct ScriptedSensor {
    delay: Duration,
    script: Mutex<VecDeque<Result<CaptureOutcome, CaptureError>>>,
    calls: Mutex<usize>,
}

impl ScriptedSensor {
    fn new(
        delay: Duration,
        script: impl IntoIterator<Item = Result<CaptureOutcome, CaptureError>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            delay,
            script: Mutex::new(script.into_iter().collect()),
            calls: Mutex::new(0),
        })
    }

    fn always_matching() -> Arc<Self> {
        Self::new(DELAY, [])
    }

    fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl CaptureService for ScriptedSensor {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn attempt_capture(&self) -> CaptureFut {
        *self.calls.lock().unwrap() += 1;
        let next = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(CaptureOutcome::Matched));
        let delay = self.delay;
        Box::pin(async move {
            tokio::time::sleep(delay).await;
            next
        })
    }
}

/// Sensor that never answers.
struct SilentSensor;

impl CaptureService for SilentSensor {
    fn attempt_capture(&self) -> CaptureFut {
        Box::pin(std::future::pending())
    }
}

fn id(label: &str) -> Identifier {
    Identifier::new(label).unwrap()
}

fn settings(variant: FlowVariant) -> EnrollmentSettings {
    EnrollmentSettings {
        variant,
        identifiers: vec![id("Right index"), id("Left index")],
    }
}

fn app_with(sensor: Arc<dyn CaptureService>, variant: FlowVariant) -> App {
    let mut app = App::new(
        settings(variant),
        sensor,
        Duration::from_secs(60),
        UiOptions::default(),
    );
    app.open_modal();
    app
}

/// Let paused time run forward and apply whatever completed.
async fn pump(app: &mut App, wait: Duration) {
    tokio::time::sleep(wait).await;
    for _ in 0..8 {
        tokio::task::yield_now().await;
        app.process_capture_events();
    }
}

#[tokio::test(start_paused = true)]
async fn two_phase_flow_enrolls_after_confirmation() {
    let mut app = app_with(ScriptedSensor::always_matching(), FlowVariant::TwoPhase);

    assert!(app.choose_index(0));
    assert!(app.advance());
    assert_eq!(app.step(), Step::Scanning);
    assert!(app.is_busy());

    pump(&mut app, DELAY).await;
    assert_eq!(app.step(), Step::CaptureOk);
    assert!(app.snapshot().enrolled.is_empty());

    assert!(app.advance());
    assert_eq!(app.step(), Step::Confirming);
    assert!(app.advance());
    assert_eq!(app.step(), Step::ConfirmScanning);

    pump(&mut app, DELAY).await;
    assert_eq!(app.step(), Step::FinalSuccess);
    assert!(app.snapshot().enrolled.contains(&id("Right index")));
    assert!(app.snapshot().selection.is_none());

    assert!(app.finish());
    assert!(!app.is_modal_open());
    match app.take_exit() {
        Some(SessionExit::Finished { enrolled }) => {
            assert_eq!(enrolled.as_slice(), &[id("Right index")]);
        }
        other => panic!("expected finished exit, got {other:?}"),
    }
    assert!(app.take_exit().is_none());
    assert_eq!(app.last_finished().map(EnrollmentSet::len), Some(1));
}

#[tokio::test(start_paused = true)]
async fn single_phase_flow_commits_on_first_match() {
    let mut app = app_with(ScriptedSensor::always_matching(), FlowVariant::SinglePhase);

    assert!(app.choose_index(1));
    assert!(app.advance());
    pump(&mut app, DELAY).await;

    assert_eq!(app.step(), Step::Success);
    assert!(app.snapshot().enrolled.contains(&id("Left index")));
}

#[tokio::test(start_paused = true)]
async fn rejected_capture_keeps_selection_and_shakes() {
    let sensor = ScriptedSensor::new(DELAY, [Ok(CaptureOutcome::Rejected)]);
    let mut app = app_with(sensor, FlowVariant::TwoPhase);
    app.clear_modal_effect();

    app.choose_index(0);
    app.advance();
    pump(&mut app, DELAY).await;

    assert_eq!(app.step(), Step::Rejected);
    assert_eq!(app.snapshot().selection, Some(&id("Right index")));
    assert!(app.notice().is_none());
    assert_eq!(
        app.modal_effect_mut().map(|effect| effect.kind()),
        Some(ModalEffectKind::Shake)
    );

    assert!(app.retry());
    assert_eq!(app.step(), Step::Select);
    assert!(app.advance(), "retry keeps the selection so advance is allowed");
}

#[tokio::test(start_paused = true)]
async fn silent_sensor_times_out_into_rejected_with_notice() {
    let mut app = App::new(
        settings(FlowVariant::TwoPhase),
        Arc::new(SilentSensor),
        Duration::from_secs(5),
        UiOptions::default(),
    );
    app.open_modal();

    let timeout = app.capture_timeout();
    app.choose_index(0);
    app.advance();
    pump(&mut app, timeout - Duration::from_secs(1)).await;
    assert_eq!(app.step(), Step::Scanning);

    pump(&mut app, Duration::from_secs(2)).await;
    assert_eq!(app.step(), Step::Rejected);
    let notice = app.notice().unwrap_or_default();
    assert!(notice.contains("did not respond"), "notice was {notice:?}");
}

#[tokio::test(start_paused = true)]
async fn unavailable_sensor_routes_to_rejected() {
    let sensor = ScriptedSensor::new(
        Duration::from_millis(10),
        [Err(CaptureError::Unavailable {
            message: "device busy".to_string(),
        })],
    );
    let mut app = app_with(sensor, FlowVariant::TwoPhase);

    app.choose_index(0);
    app.advance();
    pump(&mut app, Duration::from_millis(10)).await;

    assert_eq!(app.step(), Step::Rejected);
    assert!(app.notice().is_some_and(|n| n.contains("device busy")));

    // The picker shown after a retry carries no stale notice.
    assert!(app.retry());
    assert_eq!(app.step(), Step::Select);
    assert!(app.notice().is_none());
}

#[tokio::test(start_paused = true)]
async fn timeout_notice_is_cleared_by_retry() {
    let mut app = App::new(
        settings(FlowVariant::SinglePhase),
        Arc::new(SilentSensor),
        Duration::from_secs(5),
        UiOptions::default(),
    );
    app.open_modal();

    app.choose_index(1);
    app.advance();
    pump(&mut app, Duration::from_secs(6)).await;
    assert_eq!(app.step(), Step::Rejected);
    assert!(app.notice().is_some());

    // Rejected intents leave the notice alone.
    assert!(!app.advance());
    assert!(app.notice().is_some());

    assert!(app.retry());
    assert!(app.notice().is_none());
    assert_eq!(app.snapshot().selection, Some(&id("Left index")));
}

#[tokio::test(start_paused = true)]
async fn busy_machine_only_accepts_cancel() {
    let sensor = ScriptedSensor::always_matching();
    let mut app = app_with(sensor.clone(), FlowVariant::TwoPhase);

    app.choose_index(0);
    app.advance();
    assert!(app.is_busy());

    assert!(!app.choose_index(1));
    assert!(!app.advance());
    assert!(!app.finish());
    assert!(!app.restart());
    assert!(!app.retry());
    assert_eq!(sensor.calls(), 1);
    assert_eq!(app.snapshot().selection, Some(&id("Right index")));

    assert!(app.cancel());
    assert!(!app.is_modal_open());
    assert_eq!(app.take_exit(), Some(SessionExit::Cancelled));
    assert_eq!(app.step(), Step::Select);
    assert!(app.snapshot().selection.is_none());
}

#[tokio::test(start_paused = true)]
async fn result_arriving_after_cancel_is_discarded() {
    let sensor = ScriptedSensor::new(Duration::ZERO, []);
    let mut app = app_with(sensor, FlowVariant::SinglePhase);

    app.choose_index(0);
    app.advance();
    // Let the capture finish so its completion is already queued.
    tokio::time::sleep(Duration::from_millis(1)).await;
    for _ in 0..4 {
        tokio::task::yield_now().await;
    }

    assert!(app.cancel());
    app.open_modal();
    app.process_capture_events();

    assert_eq!(app.step(), Step::Select);
    assert!(app.snapshot().enrolled.is_empty());
}

#[tokio::test(start_paused = true)]
async fn dismiss_during_scan_aborts_the_capture() {
    let mut app = app_with(ScriptedSensor::always_matching(), FlowVariant::TwoPhase);

    app.choose_index(0);
    app.advance();
    app.dismiss_modal();

    assert!(!app.is_modal_open());
    assert!(app.take_exit().is_none());
    assert_eq!(app.step(), Step::Select);

    pump(&mut app, DELAY * 2).await;
    assert_eq!(app.step(), Step::Select);
    assert!(app.snapshot().enrolled.is_empty());
}

#[tokio::test(start_paused = true)]
async fn close_modal_dismisses_where_cancel_is_not_offered() {
    let mut app = app_with(ScriptedSensor::always_matching(), FlowVariant::TwoPhase);

    app.choose_index(0);
    app.advance();
    pump(&mut app, DELAY).await;
    assert_eq!(app.step(), Step::CaptureOk);

    app.close_modal();
    assert!(!app.is_modal_open());
    assert!(app.take_exit().is_none());
    assert_eq!(app.step(), Step::Select);
}

#[tokio::test(start_paused = true)]
async fn enrollments_survive_restart_and_dismiss() {
    let mut app = app_with(ScriptedSensor::always_matching(), FlowVariant::SinglePhase);

    app.choose_index(0);
    app.advance();
    pump(&mut app, DELAY).await;
    assert!(app.restart());
    assert_eq!(app.step(), Step::Select);

    // Already enrolled; cycling lands on the other identifier.
    assert!(!app.choose_index(0));
    assert!(app.cycle_selection(true));
    assert_eq!(app.snapshot().selection, Some(&id("Left index")));

    app.dismiss_modal();
    app.open_modal();
    assert_eq!(app.snapshot().enrolled.len(), 1);
}

#[test]
fn intents_are_ignored_while_closed() {
    let mut app = App::new(
        settings(FlowVariant::TwoPhase),
        ScriptedSensor::always_matching(),
        Duration::from_secs(60),
        UiOptions::default(),
    );

    assert!(!app.choose_index(0));
    assert!(!app.cancel());
    assert!(app.snapshot().selection.is_none());
}

#[test]
fn cycle_selection_wraps_both_ways() {
    let mut app = App::new(
        settings(FlowVariant::TwoPhase),
        ScriptedSensor::always_matching(),
        Duration::from_secs(60),
        UiOptions::default(),
    );
    app.open_modal();

    assert!(app.cycle_selection(true));
    assert_eq!(app.snapshot().selection, Some(&id("Right index")));
    assert!(app.cycle_selection(true));
    assert_eq!(app.snapshot().selection, Some(&id("Left index")));
    assert!(app.cycle_selection(true));
    assert_eq!(app.snapshot().selection, Some(&id("Right index")));
    assert!(app.cycle_selection(false));
    assert_eq!(app.snapshot().selection, Some(&id("Left index")));
}

#[test]
fn reduced_motion_suppresses_effects() {
    let mut app = App::new(
        settings(FlowVariant::TwoPhase),
        ScriptedSensor::always_matching(),
        Duration::from_secs(60),
        UiOptions {
            reduced_motion: true,
            ..UiOptions::default()
        },
    );
    app.open_modal();
    assert!(app.modal_effect_mut().is_none());

    let mut animated = App::new(
        settings(FlowVariant::TwoPhase),
        ScriptedSensor::always_matching(),
        Duration::from_secs(60),
        UiOptions::default(),
    );
    animated.open_modal();
    assert_eq!(
        animated.modal_effect_mut().map(|effect| effect.kind()),
        Some(ModalEffectKind::PopScale)
    );
}

#[tokio::test(start_paused = true)]
async fn primary_action_follows_the_step() {
    let mut app = app_with(ScriptedSensor::always_matching(), FlowVariant::TwoPhase);

    // Nothing selected yet.
    assert!(!app.primary_action());
    app.choose_index(0);

    assert!(app.primary_action());
    assert_eq!(app.step(), Step::Scanning);
    assert!(!app.primary_action());

    pump(&mut app, DELAY).await;
    assert!(app.primary_action());
    assert_eq!(app.step(), Step::Confirming);
    assert!(app.primary_action());
    assert_eq!(app.step(), Step::ConfirmScanning);

    pump(&mut app, DELAY).await;
    assert_eq!(app.step(), Step::FinalSuccess);
    assert!(app.primary_action());
    assert!(matches!(app.take_exit(), Some(SessionExit::Finished { .. })));
}

#[test]
fn spinner_tick_runs_near_ten_hertz_regardless_of_frame_rate() {
    let mut app = app_with(ScriptedSensor::always_matching(), FlowVariant::TwoPhase);
    let start = app.view.last_ui_tick;
    let frame = Duration::from_millis(8);

    let mut now = start;
    for _ in 0..125 {
        now += frame;
        app.tick_at(now);
    }
    let ticks = app.tick_count();
    assert!((9..=10).contains(&ticks), "{ticks} ticks in one second");

    // A single long frame advances by one step, not several.
    app.tick_at(now + Duration::from_secs(2));
    assert_eq!(app.tick_count(), ticks + 1);
}
