use tracing_subscriber::EnvFilter;

/// Initializes logging for the CLI.
///
/// Level defaults to `info` (`debug` with `--verbose`); the `RUST_LOG`
/// environment variable overrides both.
pub fn init(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
