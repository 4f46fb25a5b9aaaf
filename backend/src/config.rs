use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Runtime configuration, read once at startup. Every value has a default
/// suitable for local development; set the matching environment variable to
/// override it.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Base URL of the downstream certificate service.
    pub certificate_api_base: String,
    /// Fixed sleep between consecutive item mutations in a batch.
    pub pacing: Duration,
    /// Per-request timeout on the mutation client.
    pub mutation_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            host: env::var("BIND_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parsed("BIND_PORT", 8080),
            certificate_api_base: env::var("CERTIFICATE_API_BASE")
                .unwrap_or_else(|_| "http://127.0.0.1:9090".to_string()),
            pacing: Duration::from_millis(parsed("BATCH_PACING_MS", 100)),
            mutation_timeout: Duration::from_millis(parsed("MUTATION_TIMEOUT_MS", 10_000)),
        }
    }
}

/// Parses an environment variable, falling back to `default` when it is
/// unset or unparsable.
fn parsed<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
