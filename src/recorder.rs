//! Turns key-down/key-up events into committed input steps.

use itertools::Itertools;
use std::fmt;
use tracing::debug;

/// Grammar characters reach the engine under these key names
const NAMED_CHARACTERS: [(char, &str); 3] = [(',', "Comma"), ('+', "Plus"), ('\'', "Quote")];

/// Key name for a character that would clash with the solution grammar
pub fn character_name(c: char) -> Option<&'static str> {
    NAMED_CHARACTERS
        .iter()
        .find(|(ch, _)| *ch == c)
        .map(|(_, name)| *name)
}

/// What a key contributes when typing text
fn typed_text(key: &str) -> String {
    NAMED_CHARACTERS
        .iter()
        .find(|(_, name)| *name == key)
        .map(|(ch, _)| ch.to_string())
        .unwrap_or_else(|| key.to_lowercase())
}

/// A recorded unit of user input
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputStep {
    /// Keys held together, in the order they went down
    Keys(Vec<String>),
    /// Already-confirmed typed text produced by flattening
    Text(String),
}

impl InputStep {
    pub fn keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        InputStep::Keys(keys.into_iter().map(Into::into).collect())
    }

    /// Lower-cased text this step contributes when typing a literal.
    pub fn as_text(&self) -> String {
        match self {
            InputStep::Keys(keys) if keys.len() == 1 => typed_text(&keys[0]),
            InputStep::Keys(keys) => keys.concat().to_lowercase(),
            InputStep::Text(text) => text.to_lowercase(),
        }
    }
}

impl fmt::Display for InputStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputStep::Keys(keys) => write!(f, "{}", keys.iter().join("+")),
            InputStep::Text(text) => write!(f, "{text}"),
        }
    }
}

/// Renders steps the way the presentation layer expects: `,` between steps, `+` inside.
pub fn render_steps(steps: &[InputStep]) -> String {
    steps.iter().join(",")
}

/// Keys currently held down, in press order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PressedKeys {
    keys: Vec<String>,
}

impl PressedKeys {
    /// Returns false when the key was already held.
    pub fn insert(&mut self, key: &str) -> bool {
        if self.contains(key) {
            return false;
        }
        self.keys.push(key.to_string());
        true
    }

    pub fn remove(&mut self, key: &str) -> bool {
        let before = self.keys.len();
        self.keys.retain(|k| k != key);
        self.keys.len() != before
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.keys.iter()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    fn snapshot(&self) -> Vec<String> {
        self.keys.clone()
    }
}

/// What a key-up did to the recording
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyRelease {
    /// The key was not held; nothing changed
    Ignored,
    /// The key was released; `committed` tells whether a new step was recorded
    Released { committed: bool },
}

#[derive(Debug, Default)]
pub struct InputRecorder {
    pressed: PressedKeys,
    steps: Vec<InputStep>,
}

impl InputRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `key` as held. Returns true when this changed the held set,
    /// i.e. when a live preview should be shown.
    pub fn key_down(&mut self, key: &str) -> bool {
        let added = self.pressed.insert(key);
        if added {
            debug!(key, held = %self.pressed.iter().join("+"), "key down");
        }
        added
    }

    pub fn key_up(&mut self, key: &str) -> KeyRelease {
        if !self.pressed.contains(key) {
            return KeyRelease::Ignored;
        }

        let committed = !self.is_sub_combination();
        if committed {
            self.steps.push(InputStep::Keys(self.pressed.snapshot()));
        }
        debug!(key, committed, steps = %self.rendered(), "key up");
        self.pressed.remove(key);

        KeyRelease::Released { committed }
    }

    /// True when the held keys are what is left of the previously committed
    /// multi-key combination, being released one at a time.
    fn is_sub_combination(&self) -> bool {
        match self.steps.last() {
            Some(InputStep::Keys(previous)) if previous.len() > 1 => {
                self.pressed.iter().all(|k| previous.contains(k))
            }
            _ => false,
        }
    }

    pub fn steps(&self) -> &[InputStep] {
        &self.steps
    }

    pub fn steps_mut(&mut self) -> &mut Vec<InputStep> {
        &mut self.steps
    }

    pub fn pressed(&self) -> &PressedKeys {
        &self.pressed
    }

    /// Committed steps only
    pub fn rendered(&self) -> String {
        render_steps(&self.steps)
    }

    /// Committed steps followed by the combination currently held down
    pub fn preview(&self) -> String {
        let held = self.pressed.iter().join("+");
        if self.steps.is_empty() {
            held
        } else {
            format!("{},{}", self.rendered(), held)
        }
    }

    pub fn reset(&mut self) {
        self.pressed.clear();
        self.steps.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pressed_keys_keep_press_order() {
        let mut pressed = PressedKeys::default();
        assert!(pressed.insert("Ctrl"));
        assert!(pressed.insert("K"));
        assert!(!pressed.insert("Ctrl"));

        let keys: Vec<&String> = pressed.iter().collect();
        assert_eq!(keys, ["Ctrl", "K"]);

        assert!(pressed.remove("Ctrl"));
        assert!(!pressed.remove("Ctrl"));
        assert_eq!(pressed.len(), 1);
    }

    #[test]
    fn test_key_down_is_idempotent() {
        let mut rec = InputRecorder::new();
        assert!(rec.key_down("Ctrl"));
        assert!(!rec.key_down("Ctrl"));
        assert_eq!(rec.pressed().len(), 1);
        assert!(rec.steps().is_empty());
    }

    #[test]
    fn test_key_down_does_not_commit() {
        let mut rec = InputRecorder::new();
        rec.key_down("Ctrl");
        rec.key_down("K");
        assert!(rec.steps().is_empty());
        assert_eq!(rec.preview(), "Ctrl+K");
    }

    #[test]
    fn test_key_up_without_key_down_is_ignored() {
        let mut rec = InputRecorder::new();
        assert_eq!(rec.key_up("K"), KeyRelease::Ignored);
        assert!(rec.steps().is_empty());
    }

    #[test]
    fn test_single_key_commits_on_release() {
        let mut rec = InputRecorder::new();
        rec.key_down("F5");
        assert_eq!(rec.key_up("F5"), KeyRelease::Released { committed: true });
        assert_eq!(rec.steps(), &[InputStep::keys(["F5"])]);
        assert!(rec.pressed().is_empty());
    }

    #[test]
    fn test_releasing_combo_commits_once() {
        let mut rec = InputRecorder::new();
        rec.key_down("Ctrl");
        rec.key_down("K");

        assert_eq!(rec.key_up("K"), KeyRelease::Released { committed: true });
        assert_eq!(
            rec.key_up("Ctrl"),
            KeyRelease::Released { committed: false }
        );

        assert_eq!(rec.steps(), &[InputStep::keys(["Ctrl", "K"])]);
        assert_eq!(rec.rendered(), "Ctrl+K");
    }

    #[test]
    fn test_three_key_combo_released_one_by_one() {
        let mut rec = InputRecorder::new();
        for k in ["Ctrl", "K", "Oem5"] {
            rec.key_down(k);
        }
        rec.key_up("Oem5");
        rec.key_up("K");
        rec.key_up("Ctrl");
        assert_eq!(rec.steps(), &[InputStep::keys(["Ctrl", "K", "Oem5"])]);
    }

    #[test]
    fn test_held_modifier_then_new_key_commits_new_step() {
        // Ctrl stays down across two combinations: Ctrl+K, Ctrl+C
        let mut rec = InputRecorder::new();
        rec.key_down("Ctrl");
        rec.key_down("K");
        rec.key_up("K");
        rec.key_down("C");
        rec.key_up("C");
        rec.key_up("Ctrl");

        assert_eq!(
            rec.steps(),
            &[InputStep::keys(["Ctrl", "K"]), InputStep::keys(["Ctrl", "C"])]
        );
    }

    #[test]
    fn test_repeated_single_key_commits_each_time() {
        let mut rec = InputRecorder::new();
        for _ in 0..2 {
            rec.key_down("M");
            rec.key_up("M");
        }
        assert_eq!(rec.steps().len(), 2);
    }

    #[test]
    fn test_text_step_never_suppresses() {
        let mut rec = InputRecorder::new();
        rec.steps_mut().push(InputStep::Text("gi".into()));
        rec.key_down("t");
        assert_eq!(rec.key_up("t"), KeyRelease::Released { committed: true });
        assert_eq!(rec.rendered(), "gi,t");
    }

    #[test]
    fn test_preview_appends_held_keys() {
        let mut rec = InputRecorder::new();
        rec.key_down("Ctrl");
        rec.key_down("K");
        rec.key_up("K");
        rec.key_down("C");
        assert_eq!(rec.preview(), "Ctrl+K,Ctrl+C");
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut rec = InputRecorder::new();
        rec.key_down("A");
        rec.key_up("A");
        rec.key_down("B");
        rec.reset();
        assert!(rec.steps().is_empty());
        assert!(rec.pressed().is_empty());
        assert_eq!(rec.preview(), "");
    }

    #[test]
    fn test_as_text_lowercases_and_concatenates() {
        assert_eq!(InputStep::keys(["G"]).as_text(), "g");
        assert_eq!(InputStep::keys(["Shift", "G"]).as_text(), "shiftg");
        assert_eq!(InputStep::Text("Git".into()).as_text(), "git");
    }

    #[test]
    fn test_named_keys_type_their_character() {
        assert_eq!(InputStep::keys(["Plus"]).as_text(), "+");
        assert_eq!(InputStep::keys(["Comma"]).as_text(), ",");
        assert_eq!(InputStep::keys(["Quote"]).as_text(), "'");
        assert_eq!(InputStep::keys(["Ctrl", "Plus"]).as_text(), "ctrlplus");
        assert_eq!(character_name('+'), Some("Plus"));
        assert_eq!(character_name('a'), None);
    }
}
