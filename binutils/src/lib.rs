//! Command line plumbing shared by the simulator binaries.

pub use clap;
pub use clap_verbosity_flag as verbose;

use clap::builder::styling::{AnsiColor, Effects, Styles};

/// Colour scheme of the `--help` output.
pub fn get_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Cyan.on_default())
        .error(AnsiColor::Red.on_default() | Effects::BOLD)
}

/// Map the `-v` count to a tracing level. Without any flag only errors are
/// shown, each `-v` opens one more level.
pub fn verbose_level_to_trace(level: Option<verbose::Level>) -> &'static tracing::Level {
    match level {
        Some(verbose::Level::Error) => &tracing::Level::WARN,
        Some(verbose::Level::Warn) => &tracing::Level::INFO,
        Some(verbose::Level::Info) => &tracing::Level::DEBUG,
        Some(verbose::Level::Debug) => &tracing::Level::TRACE,
        Some(verbose::Level::Trace) => &tracing::Level::TRACE,
        None => &tracing::Level::ERROR,
    }
}

/// Install the global subscriber.
///
/// Logs go to stderr in a compact human format. If `log_file` is given they
/// are written there as JSON lines instead. Calling this twice is harmless,
/// the second subscriber is dropped.
pub fn logging_setup(level: &tracing::Level, log_file: Option<&std::fs::File>) {
    let builder = tracing_subscriber::fmt()
        .with_max_level(*level)
        .with_target(false);

    let r = match log_file.and_then(|f| f.try_clone().ok()) {
        Some(file) => builder
            .json()
            .with_writer(std::sync::Mutex::new(file))
            .try_init(),
        None => builder
            .without_time()
            .with_writer(std::io::stderr)
            .try_init(),
    };
    if r.is_err() {
        tracing::debug!("global subscriber already installed");
    }
}
