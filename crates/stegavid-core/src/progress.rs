//! Progress reporting and cooperative interruption.
//!
//! A run reports an integer percentage through a [`ProgressSink`]. The
//! [`ProgressTracker`] forwards a value only when the percentage increased,
//! so a sink sees at most 101 calls per run and the values never go back.
//! Between two carrier units the tracker also asks the optional
//! [`Interrupt`] whether the caller wants to stop.

use crate::error::StegError;
use crate::result::Result;

/// Receives progress updates as percentage in `0..=100`
pub trait ProgressSink {
    fn report(&mut self, percent: u8);
}

impl<F> ProgressSink for F
where
    F: FnMut(u8),
{
    fn report(&mut self, percent: u8) {
        self(percent)
    }
}

/// Asked between carrier units, `true` stops the run with [`StegError::Interrupted`]
pub trait Interrupt {
    fn should_stop(&self) -> bool;
}

impl<F> Interrupt for F
where
    F: Fn() -> bool,
{
    fn should_stop(&self) -> bool {
        self()
    }
}

pub struct ProgressTracker<'a> {
    sink: Option<Box<dyn ProgressSink + 'a>>,
    interrupt: Option<Box<dyn Interrupt + 'a>>,
    last: Option<u8>,
    range: (u8, u8),
}

impl<'a> ProgressTracker<'a> {
    pub fn new(
        sink: Option<Box<dyn ProgressSink + 'a>>,
        interrupt: Option<Box<dyn Interrupt + 'a>>,
    ) -> Self {
        Self {
            sink,
            interrupt,
            last: None,
            range: (0, 100),
        }
    }

    /// a tracker that reports nowhere and is never interrupted
    pub fn silent() -> Self {
        Self::new(None, None)
    }

    /// maps the following `update` calls into `from..=to` of the overall run
    pub fn phase(&mut self, from: u8, to: u8) {
        let from = from.min(100);
        self.range = (from, to.clamp(from, 100));
    }

    /// reports `done` of `total` units of the current phase
    pub fn update(&mut self, done: usize, total: usize) {
        let (from, to) = self.range;
        let span = u64::from(to - from);
        let fraction = if total == 0 {
            span
        } else {
            (done.min(total) as u64 * span) / total as u64
        };

        self.set(from + fraction as u8);
    }

    /// reports an absolute percentage, lower or equal values than the last one are dropped
    pub fn set(&mut self, percent: u8) {
        let percent = percent.min(100);
        if self.last.is_some_and(|last| percent <= last) {
            return;
        }
        self.last = Some(percent);
        if let Some(sink) = self.sink.as_mut() {
            sink.report(percent);
        }
    }

    pub fn finish(&mut self) {
        self.set(100);
    }

    /// fails with [`StegError::Interrupted`] when a stop was requested
    pub fn checkpoint(&self) -> Result<()> {
        match &self.interrupt {
            Some(interrupt) if interrupt.should_stop() => Err(StegError::Interrupted),
            _ => Ok(()),
        }
    }
}
