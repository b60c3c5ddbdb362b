//! Feeds terminal input into a drill session, one event at a time.
//!
//! Crossterm events are read on a background thread and handed over through a
//! channel. The runner translates keys into engine key actions, handles the
//! app-level keys (quit, restart) and lets the session clock catch up after
//! every wakeup.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyCode, KeyEvent, KeyEventKind};
use tracing::{info, warn};

use crate::clock::Clock;
use crate::events::PresentationSink;
use crate::keymap::{translate, KeyAction};
use crate::session::{Phase, Session};

/// Terminal input the runner cares about
#[derive(Clone, Debug)]
pub enum TerminalEvent {
    Key(KeyEvent),
    Resize,
}

/// Where terminal input comes from
pub trait TerminalEvents {
    /// Block for up to `timeout` waiting for the next event.
    fn next_within(&self, timeout: Duration) -> Result<TerminalEvent, RecvTimeoutError>;
}

impl TerminalEvents for Receiver<TerminalEvent> {
    fn next_within(&self, timeout: Duration) -> Result<TerminalEvent, RecvTimeoutError> {
        self.recv_timeout(timeout)
    }
}

/// Starts reading crossterm events on a background thread.
///
/// The channel disconnects when reading fails.
pub fn spawn_terminal_reader() -> Receiver<TerminalEvent> {
    let (tx, rx) = mpsc::channel();

    std::thread::spawn(move || loop {
        let ev = match event::read() {
            Ok(CtEvent::Key(key)) => TerminalEvent::Key(key),
            Ok(CtEvent::Resize(_, _)) => TerminalEvent::Resize,
            Ok(_) => continue,
            Err(err) => {
                warn!(%err, "terminal read failed");
                break;
            }
        };
        if tx.send(ev).is_err() {
            break;
        }
    });

    rx
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Continue,
    Quit,
}

pub struct Runner<E: TerminalEvents> {
    events: E,
    poll_interval: Duration,
    /// Terminal reports key releases
    enhanced: bool,
}

impl<E: TerminalEvents> Runner<E> {
    pub fn new(events: E, poll_interval: Duration, enhanced: bool) -> Self {
        Self {
            events,
            poll_interval,
            enhanced,
        }
    }

    /// Waits up to one poll interval for input, applies it, then pumps the clock.
    pub fn step<C: Clock, S: PresentationSink>(&self, session: &mut Session<C, S>) -> Step {
        let step = match self.events.next_within(self.poll_interval) {
            Ok(TerminalEvent::Key(key)) => self.on_key(session, &key),
            Ok(TerminalEvent::Resize) | Err(RecvTimeoutError::Timeout) => Step::Continue,
            Err(RecvTimeoutError::Disconnected) => {
                warn!("terminal input closed");
                Step::Quit
            }
        };
        session.pump_clock();
        step
    }

    /// Esc quits. After the session finishes, `r` starts it again. Every
    /// other key goes to the session as key-down/key-up actions.
    pub fn on_key<C: Clock, S: PresentationSink>(
        &self,
        session: &mut Session<C, S>,
        key: &KeyEvent,
    ) -> Step {
        if key.code == KeyCode::Esc {
            return match key.kind {
                KeyEventKind::Press => Step::Quit,
                _ => Step::Continue,
            };
        }
        if session.phase() == Phase::Finished {
            if key.kind == KeyEventKind::Press && key.code == KeyCode::Char('r') {
                info!("restarting session");
                session.start();
            }
            return Step::Continue;
        }

        for action in translate(key, self.enhanced) {
            match action {
                KeyAction::Down(id) => session.key_down(&id),
                KeyAction::Up(id) => {
                    session.key_up(&id);
                }
            }
        }
        Step::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::challenge::Challenge;
    use crate::clock::ManualClock;
    use crate::events::GameEvent;
    use crate::session::SessionConfig;
    use crossterm::event::KeyModifiers;

    type TestSession = Session<ManualClock, Vec<GameEvent>>;

    fn session(solution: &str) -> TestSession {
        let mut s = Session::new(
            vec![Challenge::from_keys("Editing", "Copy", solution)],
            SessionConfig::default(),
            ManualClock::new(),
            Vec::new(),
        );
        s.start();
        s
    }

    fn key(code: KeyCode, modifiers: KeyModifiers) -> TerminalEvent {
        TerminalEvent::Key(KeyEvent::new(code, modifiers))
    }

    fn runner(rx: Receiver<TerminalEvent>) -> Runner<Receiver<TerminalEvent>> {
        Runner::new(rx, Duration::from_millis(1), false)
    }

    #[test]
    fn keys_reach_the_session_as_actions() {
        let (tx, rx) = mpsc::channel();
        tx.send(key(KeyCode::Char('c'), KeyModifiers::CONTROL)).unwrap();
        let mut s = session("Ctrl+C");

        assert_eq!(runner(rx).step(&mut s), Step::Continue);
        assert!(s.sink().contains(&GameEvent::Correct {
            user_input_steps: "Ctrl+C".into()
        }));
    }

    #[test]
    fn idle_wakeup_pumps_the_clock() {
        let (_tx, rx) = mpsc::channel();
        let mut s = session("Ctrl+C");
        s.clock_mut().advance(2);

        assert_eq!(runner(rx).step(&mut s), Step::Continue);
        assert_eq!(s.elapsed_secs(), 2);
    }

    #[test]
    fn esc_press_quits_but_release_does_not() {
        let (tx, rx) = mpsc::channel();
        tx.send(TerminalEvent::Key(KeyEvent::new_with_kind(
            KeyCode::Esc,
            KeyModifiers::NONE,
            KeyEventKind::Release,
        )))
        .unwrap();
        tx.send(key(KeyCode::Esc, KeyModifiers::NONE)).unwrap();
        let runner = runner(rx);
        let mut s = session("Ctrl+C");

        assert_eq!(runner.step(&mut s), Step::Continue);
        assert_eq!(runner.step(&mut s), Step::Quit);
    }

    #[test]
    fn r_restarts_only_after_finish() {
        let (tx, rx) = mpsc::channel();
        tx.send(key(KeyCode::Char('r'), KeyModifiers::NONE)).unwrap();
        tx.send(key(KeyCode::Char('r'), KeyModifiers::NONE)).unwrap();
        let runner = runner(rx);
        let mut s = session("R");
        s.stop(false);
        assert_eq!(s.phase(), Phase::Finished);

        runner.step(&mut s);
        assert_eq!(s.phase(), Phase::Playing);

        // While playing, `r` is an answer
        runner.step(&mut s);
        assert!(matches!(s.phase(), Phase::Paused { .. }));
    }

    #[test]
    fn closed_input_quits() {
        let (tx, rx) = mpsc::channel::<TerminalEvent>();
        drop(tx);
        let mut s = session("Ctrl+C");
        assert_eq!(runner(rx).step(&mut s), Step::Quit);
    }
}
