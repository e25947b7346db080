//! Process-wide logger setup

use std::sync::Once;

static INIT: Once = Once::new();

/// Install `env_logger` once. `RUST_LOG` takes precedence over `level`.
pub fn init_logging(level: &str) {
    INIT.call_once(|| {
        let env = env_logger::Env::default().default_filter_or(level);
        // a logger installed by an embedding test harness is fine
        let _ = env_logger::Builder::from_env(env)
            .format_timestamp_millis()
            .try_init();
    });
}
