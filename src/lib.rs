// Library surface for headless/integration tests and reuse.
// Terminal drawing lives in the binary.
pub mod catalog;
pub mod challenge;
pub mod clock;
pub mod config;
pub mod events;
pub mod keymap;
pub mod matcher;
pub mod recorder;
pub mod runtime;
pub mod session;
pub mod solution;
