use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, ModifierKeyCode};

use hotkey_drill::{
    challenge::Challenge,
    clock::ManualClock,
    events::GameEvent,
    runtime::{Runner, Step, TerminalEvent},
    session::{Phase, Session, SessionConfig},
};

type TestSession = Session<ManualClock, Vec<GameEvent>>;

/// Runs the event loop until the session finishes, with one clock tick per
/// wakeup so pauses run out.
fn drive(session: &mut TestSession, events: Vec<TerminalEvent>, enhanced: bool) {
    let (tx, rx) = mpsc::channel();
    for ev in events {
        tx.send(ev).unwrap();
    }

    let runner = Runner::new(rx, Duration::from_millis(1), enhanced);

    for _ in 0..200u32 {
        session.clock_mut().advance(1);
        assert_eq!(runner.step(session), Step::Continue);
        if session.phase() == Phase::Finished {
            break;
        }
    }
    drop(tx);
}

fn press(code: KeyCode, modifiers: KeyModifiers) -> TerminalEvent {
    TerminalEvent::Key(KeyEvent::new(code, modifiers))
}

fn with_kind(code: KeyCode, modifiers: KeyModifiers, kind: KeyEventKind) -> TerminalEvent {
    TerminalEvent::Key(KeyEvent::new_with_kind(code, modifiers, kind))
}

fn typed(text: &str) -> Vec<TerminalEvent> {
    text.chars()
        .map(|c| press(KeyCode::Char(c), KeyModifiers::NONE))
        .collect()
}

#[test]
fn headless_session_completes_from_plain_presses() {
    let mut session = Session::new(
        vec![
            Challenge::from_keys("Editing", "Copy", "Ctrl+C"),
            Challenge::from_keys("Git", "Status", "'git status'"),
        ],
        SessionConfig::default(),
        ManualClock::new(),
        Vec::new(),
    );
    session.start();

    let mut events = vec![press(KeyCode::Char('c'), KeyModifiers::CONTROL)];
    // Pause after the first answer runs out on idle ticks
    events.push(TerminalEvent::Resize);
    drive(&mut session, events, false);
    assert_eq!(session.current_index(), 1);
    assert_eq!(session.phase(), Phase::Playing);

    drive(&mut session, typed("git status"), false);

    assert_eq!(session.phase(), Phase::Finished);
    let names: Vec<String> = session.sink().iter().map(GameEvent::name).collect();
    assert_eq!(names.iter().filter(|n| *n == "correct").count(), 2);
    assert!(!names.contains(&"failed".to_string()));
    assert_eq!(names.last().map(String::as_str), Some("finished"));
}

#[test]
fn headless_enhanced_chord_with_real_releases() {
    let mut session = Session::new(
        vec![Challenge::from_keys("Editing", "Select occurrences", "Ctrl+Shift+L")],
        SessionConfig::default(),
        ManualClock::new(),
        Vec::new(),
    );
    session.start();

    let ctrl = KeyCode::Modifier(ModifierKeyCode::LeftControl);
    let shift = KeyCode::Modifier(ModifierKeyCode::LeftShift);
    let held = KeyModifiers::CONTROL | KeyModifiers::SHIFT;
    let events = vec![
        with_kind(ctrl, KeyModifiers::CONTROL, KeyEventKind::Press),
        with_kind(shift, held, KeyEventKind::Press),
        with_kind(KeyCode::Char('L'), held, KeyEventKind::Press),
        with_kind(KeyCode::Char('L'), held, KeyEventKind::Repeat),
        with_kind(KeyCode::Char('L'), held, KeyEventKind::Release),
        with_kind(shift, held, KeyEventKind::Release),
        with_kind(ctrl, KeyModifiers::CONTROL, KeyEventKind::Release),
    ];
    drive(&mut session, events, true);

    assert_eq!(session.phase(), Phase::Finished);
    assert!(session.sink().contains(&GameEvent::Correct {
        user_input_steps: "Ctrl+Shift+L".into()
    }));
}

#[test]
fn headless_wrong_answer_is_retried() {
    let mut session = Session::new(
        vec![Challenge::from_keys("General", "Quick open", "Ctrl+P")],
        SessionConfig::default(),
        ManualClock::new(),
        Vec::new(),
    );
    session.start();

    drive(
        &mut session,
        vec![press(KeyCode::Char('o'), KeyModifiers::CONTROL)],
        false,
    );
    assert_eq!(session.phase(), Phase::Playing);
    assert_eq!(session.current_challenge().map(|c| c.attempt), Some(2));
    assert!(session.sink().contains(&GameEvent::Failed {
        solution: "Ctrl+P".into(),
        user_input_steps: "Ctrl+O".into()
    }));

    drive(
        &mut session,
        vec![press(KeyCode::Char('p'), KeyModifiers::CONTROL)],
        false,
    );
    assert_eq!(session.phase(), Phase::Finished);
}

#[test]
fn headless_literal_with_grammar_characters() {
    let mut session = Session::new(
        vec![
            Challenge::from_keys("Shell", "Add", "'a+b'"),
            Challenge::from_keys("Shell", "Quoted", "'it's'"),
        ],
        SessionConfig::default(),
        ManualClock::new(),
        Vec::new(),
    );
    session.start();

    let mut events = typed("a+b");
    events.push(TerminalEvent::Resize);
    drive(&mut session, events, false);
    assert_eq!(session.current_index(), 1);
    assert!(session.sink().contains(&GameEvent::Correct {
        user_input_steps: "a+b".into()
    }));

    drive(&mut session, typed("it's"), false);
    assert_eq!(session.phase(), Phase::Finished);
    assert!(!session.sink().iter().any(|e| e.name() == "failed"));
}
