// Tests for the audio engine lifecycle, scheduling and recovery.

mod common;

use common::*;
use orrery_core::*;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

const TICK: Duration = Duration::from_millis(50);

#[test]
fn start_triggers_every_planet_once() {
    let (mut engine, log) = mock_engine();
    engine.start().unwrap();
    assert!(engine.is_playing());
    assert_eq!(engine.transport().scheduled_count(), 8);

    engine.tick(TICK);
    let log = log.borrow();
    assert_eq!(log.created.len(), 8);
    assert_eq!(log.triggers.len(), 8);
    // tones come out closest planet first
    assert_eq!(log.triggers[0], "mercury");
}

#[test]
fn inner_planets_sound_more_often() {
    let (mut engine, log) = mock_engine();
    engine.start().unwrap();
    run_for(&mut engine, 30.0);
    let log = log.borrow();
    assert!(log.triggers_of("mercury") > log.triggers_of("earth"));
    assert!(log.triggers_of("earth") > log.triggers_of("neptune"));
    assert!(log.triggers_of("neptune") >= 1);
}

#[test]
fn muting_stops_only_that_planet() {
    let (mut engine, log) = mock_engine();
    engine.start().unwrap();
    run_for(&mut engine, 5.0);

    let mars_before = log.borrow().triggers_of("mars");
    let earth_before = log.borrow().triggers_of("earth");
    assert!(engine.set_planet_mute("mars", true));
    assert!(log.borrow().silenced.contains(&"mars".to_string()));

    engine.tick(TICK);
    run_for(&mut engine, 30.0);
    let log = log.borrow();
    assert_eq!(log.triggers_of("mars"), mars_before);
    assert!(log.triggers_of("earth") > earth_before);
    assert!(!engine.transport().is_scheduled("mars"));
    assert_eq!(engine.transport().scheduled_count(), 7);
}

#[test]
fn unmuting_while_playing_resumes_at_once() {
    let (mut engine, log) = mock_engine();
    engine.start().unwrap();
    engine.set_planet_mute("neptune", true);
    run_for(&mut engine, 1.0);
    let before = log.borrow().triggers_of("neptune");

    engine.set_planet_mute("neptune", false);
    engine.tick(TICK);
    assert_eq!(log.borrow().triggers_of("neptune"), before + 1);
}

#[test]
fn unmuting_an_unmuted_planet_keeps_its_grid() {
    let (mut engine, log) = mock_engine();
    engine.start().unwrap();
    engine.tick(TICK);
    let before = log.borrow().triggers_of("neptune");
    assert_eq!(before, 1);

    for _ in 0..5 {
        assert!(engine.set_planet_mute("neptune", false));
        engine.tick(TICK);
    }
    assert_eq!(log.borrow().triggers_of("neptune"), before);
    assert!(engine.transport().is_scheduled("neptune"));
}

#[test]
fn stop_then_start_does_not_double_schedule() {
    let (mut engine, log) = mock_engine();
    engine.start().unwrap();
    engine.tick(TICK);
    engine.stop();
    assert!(!engine.is_playing());
    assert_eq!(engine.transport().scheduled_count(), 0);

    engine.start().unwrap();
    assert_eq!(engine.transport().scheduled_count(), 8);
    engine.tick(TICK);
    run_for(&mut engine, 1.0);

    let log = log.borrow();
    for planet in engine.planets() {
        assert_eq!(log.triggers_of(planet.id()), 2, "{}", planet.name());
    }
}

#[test]
fn start_while_playing_is_a_no_op() {
    let (mut engine, log) = mock_engine();
    engine.start().unwrap();
    engine.start().unwrap();
    engine.tick(TICK);
    assert_eq!(engine.transport().scheduled_count(), 8);
    assert_eq!(log.borrow().triggers.len(), 8);
    assert_eq!(log.borrow().created.len(), 8);
}

#[test]
fn stopped_engine_ignores_ticks() {
    let (mut engine, log) = mock_engine();
    engine.initialize().unwrap();
    run_for(&mut engine, 10.0);
    assert!(log.borrow().triggers.is_empty());
}

#[test]
fn tempo_round_trip() {
    let (mut engine, _log) = mock_engine();
    for x in [-5.0, 0.0, 59.0, 60.0, 90.5, 120.0, 180.0, 181.0, 1000.0] {
        engine.set_tempo(x);
        assert_eq!(engine.settings().tempo, x.clamp(60.0, 180.0));
    }
}

#[test]
fn tempo_change_reschedules_every_voice() {
    let (mut engine, _log) = mock_engine();
    engine.start().unwrap();
    engine.set_tempo(180.0);
    let m = engine.settings().time_multiplier;
    for (i, planet) in engine.planets().iter().enumerate() {
        let got = engine.transport().interval_of(planet.id()).unwrap();
        assert!((got - effective_interval(i, 180.0, m)).abs() < 1e-12);
    }
}

#[test]
fn time_multiplier_is_clamped_and_speeds_up_schedules() {
    let (mut engine, _log) = mock_engine();
    engine.start().unwrap();
    let slow = engine.transport().interval_of("earth").unwrap();
    engine.set_time_multiplier(1e9);
    assert_eq!(engine.settings().time_multiplier, 10_000.0);
    let fast = engine.transport().interval_of("earth").unwrap();
    assert!(fast < slow);
    engine.set_time_multiplier(0.0);
    assert_eq!(engine.settings().time_multiplier, 1.0);
}

#[test]
fn no_audio_output_degrades_to_silent_engine() {
    let mut engine = AudioEngine::new(Catalogue::solar_system(), NoAudio);
    let err = engine.initialize().unwrap_err();
    assert_eq!(err.kind, ErrorKind::Initialization);

    let state = engine.state();
    assert!(state.is_initialized);
    assert!(state.has_error);
    assert!(state.is_silent);

    assert!(engine.start().is_ok());
    assert!(engine.is_playing());
    assert!(engine.state().is_playing);
    run_for(&mut engine, 3.0);
    engine.stop();
    assert!(!engine.is_playing());
}

#[test]
fn start_without_initialize_still_plays_when_output_is_missing() {
    let mut engine = AudioEngine::new(Catalogue::solar_system(), NoAudio);
    assert!(engine.start().is_ok());
    assert!(engine.state().is_initialized);
    assert!(engine.state().has_error);
    assert!(engine.is_playing());
}

#[test]
fn initialize_retries_the_driver() {
    let log = SharedLog::default();
    let mut engine = AudioEngine::new(
        Catalogue::solar_system(),
        mock_driver(log.clone(), Faults::default(), 2),
    );
    engine.initialize().unwrap();
    assert_eq!(log.borrow().probes, 3);
    assert!(!engine.state().has_error);
    assert_eq!(engine.state().lifecycle, Lifecycle::Ready);
    assert_eq!(engine.state().context_state, ContextState::Running);

    // idempotent
    engine.initialize().unwrap();
    assert_eq!(log.borrow().probes, 3);
}

#[test]
fn initialize_gives_up_after_three_retries() {
    let log = SharedLog::default();
    let mut engine = AudioEngine::new(
        Catalogue::solar_system(),
        mock_driver(log.clone(), Faults::default(), 100),
    );
    assert!(engine.initialize().is_err());
    assert_eq!(log.borrow().probes, 4);
    assert_eq!(engine.state().lifecycle, Lifecycle::Error);
}

#[test]
fn planet_volume_survives_mute_and_unmute() {
    let (mut engine, log) = mock_engine();
    engine.start().unwrap();
    assert!(engine.set_planet_volume("mars", 0.3));
    assert!(engine.set_planet_mute("mars", true));
    assert_eq!(log.borrow().voice_gains["mars"], 0.0);

    assert!(engine.set_planet_mute("mars", false));
    assert_eq!(log.borrow().voice_gains["mars"], 0.3);
    let ps = engine.planet_state("mars").unwrap();
    assert_eq!(ps.volume, 0.3);
    assert!(!ps.is_muted);
}

#[test]
fn unknown_planet_ids_are_rejected() {
    let (mut engine, _log) = mock_engine();
    assert!(!engine.set_planet_volume("pluto", 0.5));
    assert!(!engine.set_planet_mute("pluto", true));
}

#[test]
fn settings_made_before_start_reach_new_voices() {
    let (mut engine, log) = mock_engine();
    engine.set_planet_volume("venus", 0.25);
    engine.set_planet_mute("uranus", true);
    engine.start().unwrap();
    let log_ref = log.borrow();
    assert_eq!(log_ref.voice_gains["venus"], 0.25);
    assert_eq!(log_ref.voice_gains["uranus"], 0.0);
    assert!(!engine.transport().is_scheduled("uranus"));
}

#[test]
fn failed_synth_skips_only_that_planet() {
    let (mut engine, log) = mock_engine_with(Faults {
        bad_voices: vec!["saturn".into()],
        ..Faults::default()
    });
    assert!(engine.start().is_ok());
    assert!(!engine.has_voice("saturn"));
    assert!(engine.has_voice("jupiter"));
    assert!(!engine.state().has_error);

    engine.tick(TICK);
    assert_eq!(log.borrow().triggers.len(), 7);
}

#[test]
fn trigger_failures_surface_after_retries() {
    let (mut engine, _log) = mock_engine_with(Faults {
        trigger_fails: true,
        ..Faults::default()
    });
    let errors = Rc::new(RefCell::new(Vec::new()));
    let sink = errors.clone();
    engine.on_error(move |e| sink.borrow_mut().push(e.kind));

    engine.start().unwrap();
    engine.tick(TICK);

    assert_eq!(errors.borrow().len(), 8);
    assert!(errors.borrow().iter().all(|k| *k == ErrorKind::Playback));
    assert!(engine.state().has_error);
    // failing planets are dropped from the schedule instead of spinning
    assert_eq!(engine.transport().scheduled_count(), 0);
    assert!(engine.is_playing());
}

#[test]
fn suspended_context_is_resumed_on_start() {
    let (mut engine, log) = mock_engine_with(Faults {
        suspended: true,
        resume_failures: 2,
        ..Faults::default()
    });
    engine.initialize().unwrap();
    assert_eq!(engine.state().context_state, ContextState::Suspended);

    engine.start().unwrap();
    assert_eq!(log.borrow().resumes, 3);
    assert_eq!(engine.state().context_state, ContextState::Running);
}

fn collect_errors(engine: &mut AudioEngine) -> Rc<RefCell<Vec<AudioError>>> {
    let errors = Rc::new(RefCell::new(Vec::new()));
    let sink = errors.clone();
    engine.on_error(move |e| sink.borrow_mut().push(e.clone()));
    errors
}

#[test]
fn deferred_resume_is_picked_up_by_tick() {
    let (mut engine, log) = mock_engine_with(Faults {
        suspended: true,
        deferred_resume: Some(Deferred::RunsAfterPolls(2)),
        ..Faults::default()
    });
    let errors = collect_errors(&mut engine);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    engine.on_state_change(move |s| sink.borrow_mut().push(s.context_state));

    engine.start().unwrap();
    assert_eq!(engine.state().context_state, ContextState::Suspended);

    for _ in 0..3 {
        engine.tick(TICK);
    }
    assert_eq!(log.borrow().polls, 3);
    assert_eq!(engine.state().context_state, ContextState::Running);
    assert_eq!(seen.borrow().last(), Some(&ContextState::Running));
    assert!(errors.borrow().is_empty());
    assert!(!engine.state().has_error);

    // settled; a slow clock afterwards is not a failure
    run_for(&mut engine, 5.0);
    assert!(errors.borrow().is_empty());
}

#[test]
fn rejected_deferred_resume_surfaces_once() {
    let (mut engine, _log) = mock_engine_with(Faults {
        suspended: true,
        deferred_resume: Some(Deferred::Rejects),
        ..Faults::default()
    });
    let errors = collect_errors(&mut engine);
    engine.start().unwrap();
    assert!(errors.borrow().is_empty());

    engine.tick(TICK);
    run_for(&mut engine, 5.0);
    let errors = errors.borrow();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, ErrorKind::Context);
    assert!(errors[0].recoverable);
    assert!(engine.state().has_error);
    assert_eq!(engine.state().context_state, ContextState::Suspended);
    assert!(engine.is_playing());
}

#[test]
fn resume_that_never_lands_times_out() {
    let (mut engine, _log) = mock_engine_with(Faults {
        suspended: true,
        deferred_resume: Some(Deferred::Hangs),
        ..Faults::default()
    });
    let errors = collect_errors(&mut engine);
    engine.start().unwrap();

    run_for(&mut engine, 1.0);
    assert!(errors.borrow().is_empty());
    run_for(&mut engine, 2.0);
    run_for(&mut engine, 5.0);
    let errors = errors.borrow();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, ErrorKind::Context);
    assert!(errors[0].recoverable);
}

#[test]
fn unresumable_context_is_reported_but_playback_continues() {
    let (mut engine, _log) = mock_engine_with(Faults {
        suspended: true,
        resume_failures: 100,
        ..Faults::default()
    });
    let err = engine.start().unwrap_err();
    assert_eq!(err.kind, ErrorKind::Context);
    assert!(engine.is_playing());
    assert!(engine.state().has_error);
}

#[test]
fn global_mute_set_before_output_is_honoured() {
    let (mut engine, log) = mock_engine();
    engine.set_global_mute(true);
    engine.start().unwrap();
    assert_eq!(log.borrow().master_gain, 0.0);

    engine.set_global_mute(false);
    assert_eq!(log.borrow().master_gain, 0.7);

    engine.set_master_volume(2.0);
    assert_eq!(engine.settings().volume, 1.0);
    assert_eq!(log.borrow().master_gain, 1.0);
}

#[test]
fn subscribers_are_notified_and_can_leave() {
    let (mut engine, _log) = mock_engine();
    let states = Rc::new(RefCell::new(Vec::new()));
    let sink = states.clone();
    let token = engine.on_state_change(move |s| sink.borrow_mut().push(s.is_playing));

    let tempos = Rc::new(RefCell::new(Vec::new()));
    let sink = tempos.clone();
    engine.on_settings_change(move |s| sink.borrow_mut().push(s.tempo));

    engine.start().unwrap();
    assert_eq!(states.borrow().last(), Some(&true));

    engine.set_tempo(90.0);
    assert_eq!(tempos.borrow().last(), Some(&90.0));

    assert!(engine.off_state_change(token));
    let seen = states.borrow().len();
    engine.stop();
    assert_eq!(states.borrow().len(), seen);
    assert_eq!(engine.listener_count(), 1);
}

#[test]
fn dispose_fully_resets() {
    let (mut engine, log) = mock_engine();
    engine.on_state_change(|_| {});
    engine.on_error(|_| {});
    engine.start().unwrap();
    engine.set_planet_volume("mars", 0.3);

    engine.dispose();
    assert!(!engine.is_playing());
    assert_eq!(*engine.state(), AudioState::default());
    assert_eq!(engine.listener_count(), 0);
    assert_eq!(engine.transport().scheduled_count(), 0);
    assert!(engine.planet_state("mars").is_none());
    assert!(!engine.has_voice("mars"));
    {
        let log = log.borrow();
        assert_eq!(log.closed, 1);
        assert_eq!(log.released, 8);
    }

    // a fresh acquisition works from scratch
    engine.start().unwrap();
    assert_eq!(log.borrow().probes, 2);
    assert_eq!(log.borrow().created.len(), 16);
}

#[test]
fn retry_rebuilds_output_and_keeps_settings() {
    let (mut engine, log) = mock_engine();
    engine.start().unwrap();
    engine.set_planet_volume("earth", 0.4);
    engine.set_planet_mute("mars", true);

    engine.retry().unwrap();
    assert!(engine.is_playing());
    assert!(!engine.state().has_error);
    let log_ref = log.borrow();
    assert_eq!(log_ref.probes, 2);
    assert_eq!(log_ref.closed, 1);
    assert_eq!(log_ref.voice_gains["earth"], 0.4);
    assert_eq!(log_ref.voice_gains["mars"], 0.0);
    assert!(!engine.transport().is_scheduled("mars"));
}
