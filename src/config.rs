use std::env;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct Config {
    pub api_url: String,
    pub api_token: Option<String>,
    pub public_url: String,
    pub http_timeout: Duration,
    pub event_capacity: usize,
    pub otel_exporter_endpoint: Option<String>,
    pub service_name: String,
    pub metrics_port: Option<u16>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from any key/value source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = url_var(
            &lookup,
            "JUANTAP_API_URL",
            "http://localhost:8000/api",
        )?;

        let api_token = lookup("JUANTAP_TOKEN").filter(|token| !token.trim().is_empty());

        let public_url = url_var(&lookup, "JUANTAP_PUBLIC_URL", "http://localhost:3000")?;

        let http_timeout = Duration::from_secs(number_var(&lookup, "JUANTAP_HTTP_TIMEOUT_SECS", 30)?);

        let event_capacity = number_var(&lookup, "JUANTAP_EVENT_CAPACITY", 256)?;

        let otel_exporter_endpoint = lookup("OTEL_EXPORTER_OTLP_ENDPOINT");

        let service_name = lookup("SERVICE_NAME").unwrap_or_else(|| "juantap".to_string());

        // Prometheus exporter stays off unless a port is given
        let metrics_port = lookup("JUANTAP_METRICS_PORT")
            .map(|raw| {
                raw.trim().parse().map_err(|_| ConfigError::InvalidNumber {
                    var: "JUANTAP_METRICS_PORT",
                })
            })
            .transpose()?;

        Ok(Config {
            api_url,
            api_token,
            public_url,
            http_timeout,
            event_capacity,
            otel_exporter_endpoint,
            service_name,
            metrics_port,
        })
    }
}

fn url_var<F>(lookup: &F, var: &'static str, default: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = lookup(var).unwrap_or_else(|| default.to_string());
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(value.trim_end_matches('/').to_string())
    } else {
        Err(ConfigError::InvalidUrl { var, value })
    }
}

fn number_var<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(var) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidNumber { var }),
        None => Ok(default),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be an http(s) URL, got {value:?}")]
    InvalidUrl { var: &'static str, value: String },

    #[error("{var} must be a positive number")]
    InvalidNumber { var: &'static str },
}
