//! Notifications sent from the engine to whatever renders it.

/// The closed set of notifications a session emits.
///
/// `user_input_steps` is always rendered as committed steps joined by `,`
/// with keys inside a step joined by `+`.
#[derive(Clone, Debug, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum GameEvent {
    Playing {
        /// 1-based position of the challenge
        index: usize,
        count: usize,
        /// Absent for the very first challenge of a session
        attempt: Option<u32>,
        category: String,
        description: String,
        user_input_steps: String,
    },
    /// Live preview of the input, including keys still held down
    UserInputSteps { user_input_steps: String },
    Correct { user_input_steps: String },
    Failed {
        /// Canonical rendering of the first accepted alternative
        solution: String,
        user_input_steps: String,
    },
    Finished,
    /// One clock tick; `seconds` is the time spent playing so far
    Tick { seconds: u32, paused: bool },
}

impl GameEvent {
    /// Notification name as seen by the presentation layer
    pub fn name(&self) -> String {
        self.to_string()
    }
}

/// Receives read-only snapshots of the session
pub trait PresentationSink {
    fn notify(&mut self, event: &GameEvent);
}

/// Collects every notification, mostly useful in tests and headless runs
impl PresentationSink for Vec<GameEvent> {
    fn notify(&mut self, event: &GameEvent) {
        self.push(event.clone());
    }
}
