use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use secrecy::Secret;

const DEFAULT_DATABASE_URL: &str = "sqlite://articles.db?mode=rwc";
const DEFAULT_USER_AGENT: &str = "article-counter (+https://github.com/article-counter/article-counter)";
const DEFAULT_DATADOG_AGENT: &str = "http://127.0.0.1:8126";

#[derive(thiserror::Error, Debug)]
pub enum ConfigurationError {
    #[error("Invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// # Application configuration
#[derive(Debug, Clone)]
pub struct ApplicationConfiguration {
    /// Address the HTTP server listens on
    pub listen_on: String,
    pub database: DatabaseSettings,
    pub fetch: FetchSettings,
    pub rate_limiting: RateLimitingSettings,
    pub observability: ObservabilitySettings,
}

#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: Secret<String>,
    pub max_connections: u32,
}

/// Settings of the client fetching the articles
#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub timeout: Duration,
    pub user_agent: String,
}

#[derive(Debug, Clone)]
pub struct RateLimitingSettings {
    /// Seconds between two replenishments of one request of a client's quota
    pub fill_rate: u64,
    pub bucket_size: u32,
    /// Key clients on `Forwarded`/`X-Forwarded-For` instead of the peer address.
    /// Only safe behind a proxy that overwrites those headers.
    pub trust_proxy: bool,
}

#[derive(Debug, Clone)]
pub struct ObservabilitySettings {
    /// `EnvFilter` directives of the log output
    pub log_filter: String,
    pub exporter: Option<TraceExporter>,
}

/// OpenTelemetry backend the spans are sent to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceExporter {
    Datadog { agent_endpoint: String },
    Jaeger,
}

impl ApplicationConfiguration {
    /// Read the configuration from the environment, `.env` included if it was loaded beforehand.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(ApplicationConfiguration {
            listen_on: lookup("LISTEN_ON").unwrap_or_else(|| String::from("0.0.0.0:8080")),
            database: DatabaseSettings {
                url: Secret::new(
                    lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_owned()),
                ),
                max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 5)?,
            },
            fetch: FetchSettings {
                timeout: Duration::from_secs(parse_or(&lookup, "FETCH_TIMEOUT_SECONDS", 10)?),
                user_agent: lookup("FETCH_USER_AGENT")
                    .unwrap_or_else(|| DEFAULT_USER_AGENT.to_owned()),
            },
            rate_limiting: RateLimitingSettings {
                fill_rate: parse_or(&lookup, "RATE_LIMITING_FILL_RATE", 10)?,
                bucket_size: parse_or(&lookup, "RATE_LIMITING_BUCKET_SIZE", 100)?,
                trust_proxy: parse_flag(&lookup, "RATE_LIMITING_TRUST_PROXY")?,
            },
            observability: ObservabilitySettings {
                log_filter: lookup("RUST_LOG").unwrap_or_else(|| String::from("info")),
                exporter: trace_exporter(&lookup)?,
            },
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigurationError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(value) => {
            let parsed = value.trim().parse::<T>();
            parsed.map_err(|err| ConfigurationError::InvalidValue {
                key,
                reason: err.to_string(),
                value,
            })
        }
        None => Ok(default),
    }
}

/// Datadog wins when both exporters are enabled.
fn trace_exporter<F>(lookup: &F) -> Result<Option<TraceExporter>, ConfigurationError>
where
    F: Fn(&str) -> Option<String>,
{
    if parse_flag(lookup, "DD_ENABLED")? {
        let agent_endpoint =
            lookup("DD_AGENT").unwrap_or_else(|| DEFAULT_DATADOG_AGENT.to_owned());
        return Ok(Some(TraceExporter::Datadog { agent_endpoint }));
    }

    if parse_flag(lookup, "JAEGER_ENABLED")? {
        return Ok(Some(TraceExporter::Jaeger));
    }

    Ok(None)
}

/// Unset means `false`.
fn parse_flag<F>(lookup: &F, key: &'static str) -> Result<bool, ConfigurationError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = lookup(key) else {
        return Ok(false);
    };

    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigurationError::InvalidValue {
            key,
            value,
            reason: String::from("expected a boolean"),
        }),
    }
}
