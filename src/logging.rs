use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber. `RUST_LOG` overrides `default_level`.
pub fn init(default_level: &str) -> Result<(), String> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| format!("build log filter: {e}"))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| format!("initialize tracing subscriber: {e}"))
}
