//! Console logging bootstrap

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Install a compact console subscriber
///
/// `RUST_LOG` takes precedence; otherwise the workspace crates log at
/// `default_level` and HTTP internals at `warn`. Returns `false` when a
/// global subscriber was already installed.
pub fn init_logging(default_level: &str) -> bool {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{level},okul_client={level},app_state={level},app_core={level},storage={level},\
             hyper=warn,reqwest=warn,h2=warn,rustls=warn,sled=warn",
            level = default_level
        ))
    });

    let console_layer = fmt::layer()
        .compact()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_filter(env_filter);

    match tracing_subscriber::registry().with(console_layer).try_init() {
        Ok(()) => true,
        Err(e) => {
            tracing::debug!("logging already initialized: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_does_not_panic() {
        let _ = init_logging("debug");
        assert!(!init_logging("info"));
    }
}
