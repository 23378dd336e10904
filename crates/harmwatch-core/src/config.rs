use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value cannot be parsed or is out of range.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value cannot be parsed or is out of range.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("HARMWATCH_ENV", "development"))?;
    let bind_addr = parse_addr("HARMWATCH_BIND_ADDR", "127.0.0.1:8765")?;
    let log_level = or_default("HARMWATCH_LOG_LEVEL", "info");
    let store_path = PathBuf::from(or_default(
        "HARMWATCH_STORE_PATH",
        "./harmwatch-store.json",
    ));

    let collector_url = or_default(
        "HARMWATCH_COLLECTOR_URL",
        "http://localhost:8000/api/feedback",
    );
    if !(collector_url.starts_with("http://") || collector_url.starts_with("https://")) {
        return Err(invalid(
            "HARMWATCH_COLLECTOR_URL",
            format!("expected an http(s) URL, got \"{collector_url}\""),
        ));
    }

    let source_tag = or_default("HARMWATCH_SOURCE_TAG", "extension_v1");
    let user_agent = or_default("HARMWATCH_USER_AGENT", "harmwatch/0.1 (collector)");

    let dispatch_interval_secs = parse_u64("HARMWATCH_DISPATCH_INTERVAL_SECS", "30")?;
    if dispatch_interval_secs == 0 {
        return Err(invalid(
            "HARMWATCH_DISPATCH_INTERVAL_SECS",
            "must be greater than zero".to_string(),
        ));
    }

    let batch_size = parse_usize("HARMWATCH_BATCH_SIZE", "50")?;
    if batch_size == 0 {
        return Err(invalid(
            "HARMWATCH_BATCH_SIZE",
            "must be greater than zero".to_string(),
        ));
    }

    let request_timeout_secs = parse_u64("HARMWATCH_REQUEST_TIMEOUT_SECS", "15")?;
    let extract_timeout_secs = parse_u64("HARMWATCH_EXTRACT_TIMEOUT_SECS", "8")?;
    for (var, secs) in [
        ("HARMWATCH_REQUEST_TIMEOUT_SECS", request_timeout_secs),
        ("HARMWATCH_EXTRACT_TIMEOUT_SECS", extract_timeout_secs),
    ] {
        if secs == 0 {
            return Err(invalid(var, "must be greater than zero".to_string()));
        }
    }
    let max_queue_len = match parse_usize("HARMWATCH_MAX_QUEUE_LEN", "0")? {
        0 => None,
        n => Some(n),
    };

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        store_path,
        collector_url,
        source_tag,
        user_agent,
        dispatch_interval_secs,
        batch_size,
        request_timeout_secs,
        extract_timeout_secs,
        max_queue_len,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "HARMWATCH_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
