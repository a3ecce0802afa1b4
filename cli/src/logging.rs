//! Tracing subscriber setup.

use console::Term;
use tracing_subscriber::EnvFilter;

/// Initialize diagnostic logging on stderr.
///
/// `RUST_LOG` wins when set; otherwise `--verbose` selects `debug` for this
/// crate and everything else stays at `warn`. ANSI styling follows the same
/// rule as terminal output: off under `--no-color`/`NO_COLOR` or when stderr
/// is not a terminal.
pub fn init(verbose: bool, no_color: bool) {
    let default = if verbose {
        "warn,cm360_deploy=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(use_ansi(no_color, Term::stderr().is_term()))
        .with_target(verbose)
        .init();

    tracing::debug!("verbose logging enabled");
}

fn use_ansi(no_color: bool, is_tty: bool) -> bool {
    !no_color && is_tty
}
