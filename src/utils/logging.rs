const DEFAULT_DIRECTIVES: &str = "info,qalam=debug";

/// Installs the console subscriber. `RUST_LOG` overrides the default directives.
pub fn setup_console_log() {
    use std::io;
    use tracing_subscriber::{prelude::*, EnvFilter};

    let console_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(io::stdout)
        .boxed();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));

    tracing_subscriber::registry()
        .with(vec![console_log])
        .with(filter)
        .init();
}
