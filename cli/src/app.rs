//! Application context: unified state passed to the command handler.
//!
//! Built once in `Cli::run()` from the top-level flags. Adding a new
//! cross-cutting concern requires only one field change here.

use crate::domain::Settings;
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::provisioner::GcloudProvisioner;
use crate::output::{HumanRenderer, OutputContext, TerminalReporter};

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Echo mutating commands instead of running them.
    pub dry_run: bool,
    /// Debug-level command logging.
    pub verbose: bool,
}

/// Unified application context passed to the command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// When `true`, no external command is executed.
    pub dry_run: bool,
    /// When `true`, tracing logs every command; spinners are disabled.
    pub verbose: bool,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    #[must_use]
    pub fn new(flags: &AppFlags) -> Self {
        Self {
            output: OutputContext::new(flags.no_color, flags.quiet),
            dry_run: flags.dry_run,
            verbose: flags.verbose,
        }
    }

    /// Cloud CLI adapter scoped to the resolved project and region.
    #[must_use]
    pub fn provisioner(&self, settings: &Settings) -> GcloudProvisioner<TokioCommandRunner> {
        GcloudProvisioner::default_runner(&settings.project, &settings.region, self.dry_run)
    }

    /// Progress reporter for application services.
    #[must_use]
    pub fn terminal_reporter(&self) -> TerminalReporter<'_> {
        TerminalReporter::new(&self.output, self.verbose)
    }

    #[must_use]
    pub fn renderer(&self) -> HumanRenderer<'_> {
        HumanRenderer::new(&self.output)
    }
}
