use crate::config::LoggingConfig;
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise the configured level applies to this crate.
/// Output goes to stderr so command output on stdout stays machine-readable.
pub fn init(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(config)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    let result = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    if let Err(e) = result {
        eprintln!("Logging already initialized: {e}");
    }
}

fn default_directive(config: &LoggingConfig) -> String {
    format!("privops={}", config.level.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LoggingLevel;

    #[test]
    fn directive_uses_configured_level() {
        let config = LoggingConfig {
            level: LoggingLevel::Debug,
            json: false,
        };
        assert_eq!(default_directive(&config), "privops=debug");
        assert_eq!(
            default_directive(&LoggingConfig::default()),
            "privops=info"
        );
    }
}
