//! Time source for a session. The session only starts and stops the clock;
//! whoever drives the event loop asks it how many whole ticks are due.

use std::time::{Duration, Instant};

pub trait Clock {
    fn start(&mut self);
    fn stop(&mut self);
    fn is_running(&self) -> bool;
    /// Whole intervals elapsed since the previous poll, zero while stopped.
    fn poll(&mut self) -> u32;
}

/// Wall-clock ticks at a fixed interval
#[derive(Debug)]
pub struct IntervalClock {
    interval: Duration,
    last: Option<Instant>,
}

impl IntervalClock {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    pub fn every_second() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl Clock for IntervalClock {
    fn start(&mut self) {
        self.last = Some(Instant::now());
    }

    fn stop(&mut self) {
        self.last = None;
    }

    fn is_running(&self) -> bool {
        self.last.is_some()
    }

    fn poll(&mut self) -> u32 {
        let Some(last) = self.last else {
            return 0;
        };
        if self.interval.is_zero() {
            return 0;
        }
        let due = (last.elapsed().as_nanos() / self.interval.as_nanos()) as u32;
        if due > 0 {
            // Carry the remainder so ticks do not drift
            self.last = Some(last + self.interval * due);
        }
        due
    }
}

/// Clock advanced by hand
#[derive(Debug, Default)]
pub struct ManualClock {
    running: bool,
    pending: u32,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `ticks` for the next poll; ignored while stopped.
    pub fn advance(&mut self, ticks: u32) {
        if self.running {
            self.pending += ticks;
        }
    }
}

impl Clock for ManualClock {
    fn start(&mut self) {
        self.running = true;
        self.pending = 0;
    }

    fn stop(&mut self) {
        self.running = false;
        self.pending = 0;
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn poll(&mut self) -> u32 {
        std::mem::take(&mut self.pending)
    }
}
