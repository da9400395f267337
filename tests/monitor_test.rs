//! Integration tests for the monitoring pipeline

use crossbeam_channel::bounded;
use guardian_keyboard::{
    AlertDelivery, ChannelAlertSink, Config, FileResetFlag, InputEvent, Lexicon, Monitor, Phase,
    ResetSignal,
};
use std::sync::Arc;

const SELF_HARM: &str = r#"{"self_harm": {"terms": ["hurt"], "weight": 5}}"#;

fn config(threshold: u32) -> Config {
    Config {
        threshold,
        alert_destination: Some("+15550100".to_string()),
        ..Config::default()
    }
}

fn words(monitor: &mut Monitor, words: &[&str]) -> Vec<guardian_keyboard::AlertSignal> {
    let mut alerts = Vec::new();
    for word in words {
        alerts.extend(monitor.handle(&InputEvent::Commit(format!("{word} "))));
    }
    alerts
}

#[test]
fn test_scenario_threshold_crossing_alerts_and_resets() {
    let (tx, rx) = bounded::<AlertDelivery>(4);
    let mut monitor = Monitor::new(config(5), Lexicon::load(SELF_HARM))
        .with_alert_sink(ChannelAlertSink::new(tx));

    assert!(words(&mut monitor, &["I", "want", "to"]).is_empty());
    assert_eq!(monitor.score(), 0);
    assert_eq!(monitor.phase(), Phase::Idle);

    let alerts = words(&mut monitor, &["hurt"]);
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].score, 5);

    let delivery = rx.try_recv().expect("alert delivered");
    assert_eq!(delivery.alert.score, 5);
    assert_eq!(delivery.destination, "+15550100");

    assert_eq!(monitor.score(), 0);
    assert_eq!(monitor.phase(), Phase::Idle);
}

#[test]
fn test_scenario_containment_accumulates_below_threshold() {
    let mut monitor = Monitor::new(config(10), Lexicon::load(SELF_HARM));

    assert!(words(&mut monitor, &["hurtful"]).is_empty());
    assert_eq!(monitor.score(), 5);
    assert_eq!(monitor.phase(), Phase::Accumulating);
}

#[test]
fn test_scenario_word_matching_two_categories() {
    let lexicon = Lexicon::load(
        r#"{
            "violence": {"terms": ["kill"], "weight": 3},
            "threat": {"terms": ["kill", "destroy"], "weight": 4}
        }"#,
    );
    let mut monitor = Monitor::new(config(100), lexicon);

    words(&mut monitor, &["kill"]);
    assert_eq!(monitor.score(), 7);
}

#[test]
fn test_scenario_empty_lexicon_never_scores() {
    let mut monitor = Monitor::new(config(1), Lexicon::load("not a lexicon"));

    let alerts = words(&mut monitor, &["hurt", "kill", "anything", "at", "all"]);
    assert!(alerts.is_empty());
    assert_eq!(monitor.score(), 0);
    assert_eq!(monitor.phase(), Phase::Idle);
}

#[test]
fn test_scenario_reset_mid_word() {
    let mut monitor = Monitor::new(config(20), Lexicon::load(SELF_HARM));
    words(&mut monitor, &["hurt"]);
    assert_eq!(monitor.score(), 5);

    for event in InputEvent::from_keys("hu") {
        monitor.handle(&event);
    }
    monitor.reset_signal().signal_reset();

    monitor.handle(&InputEvent::Char('r'));
    assert_eq!(monitor.buffer(), "hur");
    assert_eq!(monitor.score(), 0);
    assert_eq!(monitor.phase(), Phase::Idle);

    monitor.handle(&InputEvent::Char('t'));
    monitor.handle(&InputEvent::Char(' '));
    assert_eq!(monitor.score(), 5);
    assert_eq!(monitor.phase(), Phase::Accumulating);
}

#[test]
fn test_keystrokes_with_backspace() {
    let mut monitor = Monitor::new(config(20), Lexicon::load(SELF_HARM));

    // "hurx" corrected to "hurt", then a full stop completes it.
    let mut events = InputEvent::from_keys("hurx\u{8}t.");
    events.push(InputEvent::EndOfSession);
    monitor.handle_all(&events);

    assert_eq!(monitor.score(), 5);
    assert_eq!(monitor.transparency().stats().words_completed, 1);
}

#[test]
fn test_end_of_session_flushes_final_word() {
    let mut monitor = Monitor::new(config(5), Lexicon::load(SELF_HARM));
    monitor.handle(&InputEvent::Commit("please don't hurt".into()));
    assert_eq!(monitor.score(), 0);

    let alerts = monitor.handle(&InputEvent::EndOfSession);
    assert_eq!(alerts.len(), 1);
}

#[test]
fn test_dismissal_from_another_process() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        threshold: 50,
        unlock_secret: Some("2468".to_string()),
        data_path: dir.path().to_path_buf(),
        ..Config::default()
    };

    let mut monitor = Monitor::new(config.clone(), Lexicon::load(SELF_HARM))
        .with_reset_signal(Arc::new(config.reset_flag()));
    words(&mut monitor, &["hurt", "hurt"]);
    assert_eq!(monitor.score(), 10);

    // The dismissal side only shares the data directory with the monitor.
    let dismissal_flag = FileResetFlag::in_dir(dir.path());
    let gate = config.unlock_gate();
    assert!(!gate.dismiss("0000", &dismissal_flag));
    assert!(!monitor.poll_reset());

    assert!(gate.dismiss("2468", &dismissal_flag));
    assert!(gate.dismiss("2468", &dismissal_flag));
    assert!(monitor.poll_reset());
    assert!(!monitor.poll_reset());
    assert_eq!(monitor.score(), 0);
    assert_eq!(monitor.phase(), Phase::Idle);
    assert!(!dismissal_flag.consume_reset_if_pending());
}

#[test]
fn test_live_threshold_change() {
    let mut monitor = Monitor::new(config(20), Lexicon::load(SELF_HARM));
    words(&mut monitor, &["hurt", "hurt"]);
    assert_eq!(monitor.score(), 10);

    monitor.reload_config(config(8));
    assert_eq!(monitor.score(), 10);
    assert_eq!(monitor.phase(), Phase::Accumulating);

    let alerts = words(&mut monitor, &["hurt"]);
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].score, 15);
}

#[test]
fn test_bundled_lexicon_flags_threat() {
    let mut monitor = Monitor::new(config(100), Lexicon::load_path(None));
    words(&mut monitor, &["hello", "there"]);
    assert_eq!(monitor.score(), 0);

    words(&mut monitor, &["murder"]);
    assert!(monitor.score() > 0);
}

#[test]
fn test_bundled_lexicon_ignores_everyday_sentences() {
    let mut monitor = Monitor::new(config(5), Lexicon::load_path(None));

    let sentences = [
        "see you at the end of it all ",
        "I want to go back home and beat my high score. ",
        "do you need me to get the car? no, it's fine! ",
    ];
    for sentence in sentences {
        let alerts = monitor.handle(&InputEvent::Commit(sentence.to_string()));
        assert!(alerts.is_empty(), "{sentence:?} raised an alert");
    }
    assert_eq!(monitor.score(), 0);
    assert_eq!(monitor.phase(), Phase::Idle);
}
