/// Initializes the global logger
///
/// Logs go to stderr so stdout only carries translation output.
/// Log level is Debug in development builds and Info in production builds;
/// `RUST_LOG` overrides it.
pub fn init() {
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .try_init();
}
