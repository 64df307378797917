use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Minerals warm-loaded at process start when `LITHOCORE_DEFAULT_MINERALS`
/// is not set. Alpine fissure minerals common in the Swiss Alps.
pub const DEFAULT_MINERALS: &str = "Quarz,Fluorit,Calcit,Pyrit,Hämatit,Titanit,Adular";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are present but invalid.
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
/// Returns `ConfigError` if values are present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a pure
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

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
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

    let env = parse_environment(&or_default("LITHOCORE_ENV", "development"))?;
    let bind_addr = parse_addr("LITHOCORE_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("LITHOCORE_LOG_LEVEL", "info");
    let sites_path = PathBuf::from(or_default("LITHOCORE_SITES_PATH", "./config/sites.yaml"));

    let mindat_api_key = lookup("MINDAT_API_KEY")
        .ok()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty());
    let mindat_base_url = or_default("LITHOCORE_MINDAT_BASE_URL", "https://api.mindat.org/v1/");
    if !mindat_base_url.starts_with("http://") && !mindat_base_url.starts_with("https://") {
        return Err(invalid(
            "LITHOCORE_MINDAT_BASE_URL",
            "must start with http:// or https://".to_string(),
        ));
    }

    let provider_timeout_secs = parse_u64("LITHOCORE_PROVIDER_TIMEOUT_SECS", "20")?;
    let session_deadline_secs = parse_u64("LITHOCORE_SESSION_DEADLINE_SECS", "30")?;
    if session_deadline_secs == 0 {
        return Err(invalid(
            "LITHOCORE_SESSION_DEADLINE_SECS",
            "must be greater than zero".to_string(),
        ));
    }

    let user_agent = or_default("LITHOCORE_USER_AGENT", "lithocore/0.1 (mineral-localities)");

    let search_country = Some(or_default("LITHOCORE_SEARCH_COUNTRY", "Switzerland"))
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());

    let mineral_page_size = parse_u32("LITHOCORE_MINERAL_PAGE_SIZE", "20")?;
    let locality_page_size = parse_u32("LITHOCORE_LOCALITY_PAGE_SIZE", "200")?;
    if mineral_page_size == 0 || locality_page_size == 0 {
        let var = if mineral_page_size == 0 {
            "LITHOCORE_MINERAL_PAGE_SIZE"
        } else {
            "LITHOCORE_LOCALITY_PAGE_SIZE"
        };
        return Err(invalid(var, "page size must be at least 1".to_string()));
    }

    let default_minerals = parse_mineral_list(&or_default(
        "LITHOCORE_DEFAULT_MINERALS",
        DEFAULT_MINERALS,
    ));
    let rate_limit_per_minute = parse_usize("LITHOCORE_RATE_LIMIT_PER_MINUTE", "120")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        sites_path,
        mindat_api_key,
        mindat_base_url,
        provider_timeout_secs,
        session_deadline_secs,
        user_agent,
        search_country,
        mineral_page_size,
        locality_page_size,
        default_minerals,
        rate_limit_per_minute,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] for anything other than
/// `development`, `test` or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "LITHOCORE_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

/// Split a comma-separated mineral list, dropping blanks and
/// case-insensitive duplicates while keeping first-seen order.
fn parse_mineral_list(raw: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.to_lowercase()))
        .map(ToOwned::to_owned)
        .collect()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
