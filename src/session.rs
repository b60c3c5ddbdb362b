use tracing::{debug, info, warn};

use crate::challenge::Challenge;
use crate::clock::Clock;
use crate::events::{GameEvent, PresentationSink};
use crate::matcher::{evaluate, Evaluation, MatchOutcome};
use crate::recorder::{InputRecorder, KeyRelease};

/// Countdown after a correct or failed answer; the next challenge starts on
/// the tick after it runs out
pub const DEFAULT_PAUSE_TICKS: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub pause_ticks: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            pause_ticks: DEFAULT_PAUSE_TICKS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Phase {
    Idle,
    Playing,
    /// Showing the result of the last challenge; `remaining` ticks until the next one
    Paused { after: MatchOutcome, remaining: u32 },
    Finished,
}

/// One game: owns the challenge list and every piece of mutable engine state.
///
/// All operations are synchronous state transitions; key events and clock
/// ticks are expected to be delivered one at a time.
pub struct Session<C: Clock, S: PresentationSink> {
    challenges: Vec<Challenge>,
    recorder: InputRecorder,
    current: usize,
    retrying: bool,
    elapsed_secs: u32,
    phase: Phase,
    config: SessionConfig,
    clock: C,
    sink: S,
}

impl<C: Clock, S: PresentationSink> Session<C, S> {
    pub fn new(challenges: Vec<Challenge>, config: SessionConfig, clock: C, sink: S) -> Self {
        Self {
            challenges,
            recorder: InputRecorder::new(),
            current: 0,
            retrying: false,
            elapsed_secs: 0,
            phase: Phase::Idle,
            config,
            clock,
            sink,
        }
    }

    pub fn start(&mut self) {
        if self.challenges.is_empty() {
            warn!("cannot start a session without challenges");
            return;
        }
        info!(count = self.challenges.len(), "starting session");

        self.elapsed_secs = 0;
        self.current = 0;
        self.retrying = false;
        self.recorder.reset();
        for challenge in &mut self.challenges {
            challenge.reset_for_new_session();
        }

        self.clock.start();
        self.phase = Phase::Playing;
        self.notify_playing(None);
    }

    /// Ends the session. A forced stop discards progress silently; a normal
    /// stop reports `finished`.
    pub fn stop(&mut self, forced: bool) {
        info!(forced, elapsed_secs = self.elapsed_secs, "stopping session");
        self.clock.stop();
        self.current = 0;
        self.retrying = false;
        self.recorder.reset();

        if forced {
            self.phase = Phase::Idle;
        } else {
            self.phase = Phase::Finished;
            self.sink.notify(&GameEvent::Finished);
        }
    }

    pub fn key_down(&mut self, key: &str) {
        if self.phase != Phase::Playing {
            debug!(key, phase = %self.phase, "key down ignored");
            return;
        }
        if self.recorder.key_down(key) {
            let preview = self.recorder.preview();
            self.sink.notify(&GameEvent::UserInputSteps {
                user_input_steps: preview,
            });
        }
    }

    /// Releases `key` and checks the input against the current challenge.
    /// Returns the evaluation when one was made.
    pub fn key_up(&mut self, key: &str) -> Option<Evaluation> {
        if self.phase != Phase::Playing {
            debug!(key, phase = %self.phase, "key up ignored");
            return None;
        }
        if self.recorder.key_up(key) == KeyRelease::Ignored {
            return None;
        }

        let challenge = &self.challenges[self.current];
        let evaluation = evaluate(&challenge.solutions, self.recorder.steps_mut());
        debug!(
            outcome = %evaluation.outcome,
            cause = ?evaluation.cause,
            steps = %self.recorder.rendered(),
            "input evaluated"
        );

        if evaluation.flattened {
            self.sink.notify(&GameEvent::UserInputSteps {
                user_input_steps: self.recorder.rendered(),
            });
        }
        match evaluation.outcome {
            MatchOutcome::Correct => self.mark_correct(),
            MatchOutcome::Failed => self.mark_failed(),
            MatchOutcome::Progressing => {}
        }

        Some(evaluation)
    }

    /// One clock interval. While playing it counts towards the session and the
    /// current challenge. While paused it counts down; the first tick after the
    /// countdown hits zero moves on to the next challenge.
    pub fn on_tick(&mut self) {
        let resume = match &mut self.phase {
            Phase::Playing => {
                self.elapsed_secs += 1;
                self.challenges[self.current].seconds_spent += 1;
                false
            }
            Phase::Paused { remaining, .. } if *remaining > 0 => {
                *remaining -= 1;
                false
            }
            Phase::Paused { .. } => true,
            Phase::Idle | Phase::Finished => return,
        };

        self.sink.notify(&GameEvent::Tick {
            seconds: self.elapsed_secs,
            paused: matches!(self.phase, Phase::Paused { .. }),
        });

        if resume {
            self.resume();
        }
    }

    /// Delivers every tick the clock says is due. Returns how many were due.
    pub fn pump_clock(&mut self) -> u32 {
        let due = self.clock.poll();
        for _ in 0..due {
            if !self.clock.is_running() {
                break;
            }
            self.on_tick();
        }
        due
    }

    fn mark_correct(&mut self) {
        self.challenges[self.current].failed = false;
        self.sink.notify(&GameEvent::Correct {
            user_input_steps: self.recorder.rendered(),
        });
        self.pause(MatchOutcome::Correct);
    }

    fn mark_failed(&mut self) {
        let challenge = &mut self.challenges[self.current];
        challenge.failed = true;
        let solution = challenge.solutions.canonical();
        self.sink.notify(&GameEvent::Failed {
            solution,
            user_input_steps: self.recorder.rendered(),
        });
        self.pause(MatchOutcome::Failed);
    }

    fn pause(&mut self, after: MatchOutcome) {
        debug!(%after, ticks = self.config.pause_ticks, "pausing");
        self.phase = Phase::Paused {
            after,
            remaining: self.config.pause_ticks,
        };
    }

    fn resume(&mut self) {
        debug!("resuming");
        self.advance();
    }

    /// Moves to the next challenge in order, then cycles through failed ones
    /// until none remain.
    fn advance(&mut self) {
        self.recorder.reset();

        if !self.retrying && self.current + 1 < self.challenges.len() {
            self.current += 1;
        } else {
            match self.next_failed() {
                Some(idx) => {
                    self.retrying = true;
                    self.current = idx;
                    self.challenges[idx].attempt += 1;
                    debug!(index = idx, attempt = self.challenges[idx].attempt, "retrying failed challenge");
                }
                None => {
                    self.stop(false);
                    return;
                }
            }
        }

        self.phase = Phase::Playing;
        let attempt = self.challenges[self.current].attempt;
        self.notify_playing(Some(attempt));
    }

    /// First failed challenge other than the current one, else the current one if it failed.
    fn next_failed(&self) -> Option<usize> {
        self.challenges
            .iter()
            .enumerate()
            .find(|(idx, c)| c.failed && *idx != self.current)
            .map(|(idx, _)| idx)
            .or_else(|| self.challenges[self.current].failed.then_some(self.current))
    }

    fn notify_playing(&mut self, attempt: Option<u32>) {
        let challenge = &self.challenges[self.current];
        let event = GameEvent::Playing {
            index: self.current + 1,
            count: self.challenges.len(),
            attempt,
            category: challenge.category.clone(),
            description: challenge.description.clone(),
            user_input_steps: String::new(),
        };
        self.sink.notify(&event);
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        matches!(self.phase, Phase::Playing | Phase::Paused { .. })
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_challenge(&self) -> Option<&Challenge> {
        self.challenges.get(self.current)
    }

    pub fn challenges(&self) -> &[Challenge] {
        &self.challenges
    }

    pub fn is_retrying(&self) -> bool {
        self.retrying
    }

    pub fn elapsed_secs(&self) -> u32 {
        self.elapsed_secs
    }

    /// Committed steps plus the keys currently held
    pub fn preview(&self) -> String {
        self.recorder.preview()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }
}
