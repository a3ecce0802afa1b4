//! `TerminalReporter`: Presentation-layer implementation of `ProgressReporter`.
//!
//! Wraps `&OutputContext` and implements the `application::ports::ProgressReporter`
//! trait so application services can emit progress events without depending on
//! any presentation type directly.

use std::cell::RefCell;

use indicatif::ProgressBar;

use crate::application::ports::ProgressReporter;
use crate::domain::CommandLine;
use crate::output::{OutputContext, progress};

/// Terminal progress reporter that wraps an `OutputContext`.
///
/// On a TTY each `step()` runs a spinner until the next event replaces it;
/// otherwise steps print as plain `→` lines.
pub struct TerminalReporter<'a> {
    ctx: &'a OutputContext,
    spinners: bool,
    active: RefCell<Option<ProgressBar>>,
}

impl<'a> TerminalReporter<'a> {
    /// Create a new `TerminalReporter` wrapping the given output context.
    ///
    /// Spinners are disabled when `plain` is set (verbose logging would
    /// interleave with them) or when the context cannot show progress.
    #[must_use]
    pub fn new(ctx: &'a OutputContext, plain: bool) -> Self {
        Self {
            ctx,
            spinners: ctx.show_progress() && !plain,
            active: RefCell::new(None),
        }
    }

    fn clear(&self) {
        if let Some(pb) = self.active.borrow_mut().take() {
            pb.finish_and_clear();
        }
    }
}

impl ProgressReporter for TerminalReporter<'_> {
    fn step(&self, message: &str) {
        self.clear();
        if self.spinners {
            *self.active.borrow_mut() = Some(progress::spinner(message));
        } else {
            self.ctx.step(message);
        }
    }

    fn success(&self, message: &str) {
        match self.active.borrow_mut().take() {
            Some(pb) => progress::finish_ok(&pb, message),
            None => self.ctx.success(message),
        }
    }

    fn warn(&self, message: &str) {
        self.clear();
        self.ctx.warn(message);
    }

    fn dry_run(&self, command: &CommandLine) {
        self.clear();
        self.ctx.dry_run(command);
    }
}

impl Drop for TerminalReporter<'_> {
    fn drop(&mut self) {
        self.clear();
    }
}
