use std::sync::OnceLock;
use tracing_subscriber::{
    EnvFilter, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _,
};

const DEFAULT_FILTER: &str = "ssh_krl=info,krl_inspect=info,warn";

static INIT: OnceLock<()> = OnceLock::new();

/// Install the global subscriber once. `RUST_LOG` takes precedence over the
/// built-in filter. Output goes to stderr so stdout stays free for reports.
pub fn init_tracing() {
    init_tracing_with(DEFAULT_FILTER);
}

pub fn init_tracing_with(default_filter: &str) {
    let _ = INIT.get_or_init(|| {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_filter));
        let _ = tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
            .with(env_filter)
            .try_init();
    });
}
