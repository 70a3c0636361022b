//! Environment helpers: centralized dotenv loading and ergonomic getters.
//! Call `init_env()` once early in each binary (or rely on lazy Once).
use std::str::FromStr;
use std::sync::Once;
use tracing::{info, warn};

static INIT: Once = Once::new();

/// DSN variables, most specific first.
pub const DB_URL_KEYS: [&str; 3] = ["SUPABASE_DB_URL", "DATABASE_URL", "DB_URL"];

/// Load .env exactly once. Safe to call many times.
pub fn init_env() {
    INIT.call_once(|| {
        if dotenv::dotenv().is_err() {
            // Fallback to the crate root so `cargo run` from elsewhere still works.
            let candidate = format!("{}/.env", env!("CARGO_MANIFEST_DIR"));
            let _ = dotenv::from_filename(candidate);
        }
    });
}

/// Get optional env var (None if unset or empty).
pub fn env_opt(key: &str) -> Option<String> {
    init_env();
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => Some(v),
        _ => None,
    }
}

/// Get parsed value with default fallback.
pub fn env_parse<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    match env_opt(key) {
        Some(raw) => match raw.trim().parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                warn!(key, value = %raw, "unparsable env value; using default");
                default
            }
        },
        None => default,
    }
}

/// Boolean flag; accepts 1/true/on/yes (case-insensitive) as true.
pub fn env_flag(key: &str, default: bool) -> bool {
    env_opt(key).map(|raw| parse_flag(&raw)).unwrap_or(default)
}

/// Comma-separated list; `default` when unset.
pub fn env_list(key: &str, default: &[&str]) -> Vec<String> {
    match env_opt(key) {
        Some(raw) => split_list(&raw),
        None => default.iter().map(|s| s.to_string()).collect(),
    }
}

/// First configured database URL, checked in `DB_URL_KEYS` order.
pub fn db_url() -> anyhow::Result<String> {
    for key in DB_URL_KEYS {
        if let Some(v) = env_opt(key) {
            info!(target = "env", source = key, "database URL detected");
            return Ok(v);
        }
    }
    Err(anyhow::anyhow!(
        "no database URL configured; set one of {}",
        DB_URL_KEYS.join(", ")
    ))
}

fn parse_flag(raw: &str) -> bool {
    let v = raw.trim().to_ascii_lowercase();
    matches!(v.as_str(), "1" | "true" | "on" | "yes")
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
