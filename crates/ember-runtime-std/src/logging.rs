use log::LevelFilter;

/// Installs `env_logger` for binaries. `RUST_LOG` wins over the `info` default.
/// Calling it again is harmless.
pub fn init_logging() {
    let result = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init();
    if result.is_err() {
        log::debug!("logger already initialised");
    }
}

/// Test flavour of [`init_logging`]: captured output, `debug` for ember crates.
pub fn init_test_logging() {
    let _ = env_logger::Builder::from_default_env()
        .is_test(true)
        .filter_level(LevelFilter::Warn)
        .filter_module("ember_core", LevelFilter::Debug)
        .filter_module("ember_dom", LevelFilter::Debug)
        .filter_module("ember_ssr", LevelFilter::Debug)
        .filter_module("ember_router", LevelFilter::Debug)
        .try_init();
}
