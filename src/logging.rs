use env_logger::Env;

/// Initializes logging for a function binary. `RUST_LOG` overrides the `info` default.
pub fn init() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        // CloudWatch stamps every line on ingestion.
        .format_timestamp(None)
        .init();
}
