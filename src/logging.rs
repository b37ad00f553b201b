use env_logger::{Builder, Env};

/// Log filter for a `-v` count: 0=warn, 1=info, 2=debug, 3+=trace.
///
/// Both binaries live in the `p2site` crate, so one target covers them.
pub fn filter_for(verbose: u8) -> &'static str {
    match verbose {
        0 => "p2site=warn",
        1 => "p2site=info",
        2 => "p2site=debug",
        _ => "p2site=trace",
    }
}

/// Installs the global logger. `RUST_LOG` still wins over `verbose`.
pub fn setup_logger(verbose: u8) {
    let result = Builder::from_env(Env::default().default_filter_or(filter_for(verbose)))
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false)
        .try_init();

    if let Err(e) = result {
        log::debug!("Logger already initialized: {e}");
    }
}
