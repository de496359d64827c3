use std::sync::Once;

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "info",
/// "lumen_engine=debug"). When neither it nor `RUST_LOG` is set, the level is
/// `info` and, with `quiet_gpu`, the GPU stack is held to `warn`.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub quiet_gpu: bool,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            quiet_gpu: true,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

/// wgpu internals log surface and resource churn at `info`.
const GPU_TARGETS: [&str; 3] = ["wgpu_core", "wgpu_hal", "naga"];

/// Resolves the filter string: explicit config, then `RUST_LOG`, then default.
fn resolve_filter(config: &LoggingConfig, rust_log: Option<String>) -> String {
    if let Some(filter) = config.env_filter.clone().or(rust_log) {
        return filter;
    }
    let mut filter = String::from("info");
    if config.quiet_gpu {
        for target in GPU_TARGETS {
            filter.push_str(&format!(",{target}=warn"));
        }
    }
    filter
}

static INIT: Once = Once::new();

/// Initializes the global logger once.
///
/// Later calls are ignored. Call early in `main`.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = resolve_filter(&config, std::env::var("RUST_LOG").ok());

        env_logger::Builder::new()
            .parse_filters(&filter)
            .write_style(config.write_style)
            .init();

        log::debug!("logging initialized ({filter})");
    });
}
