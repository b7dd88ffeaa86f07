use dotenvy::dotenv;
use once_cell::sync::Lazy;
use std::env;
use std::str::FromStr;

pub static CONFIG: Lazy<Config> = Lazy::new(|| {
    dotenv().ok(); // Load .env file if present
    Config {
        google_api_key: get_env_opt("GOOGLE_API_KEY"),
        google_cx: get_env_opt("GOOGLE_CX"),
        search_endpoint: get_env_or_default("SEARCH_ENDPOINT", DEFAULT_SEARCH_ENDPOINT),
        host: get_env_or_default("HOST", "0.0.0.0"),
        port: get_parsed_or_default("PORT", 5175),
        rate_window_ms: get_parsed_or_default("RATE_WINDOW_MS", 1000),
        rate_max_per_window: get_parsed_or_default("RATE_MAX_PER_WINDOW", 10),
        max_query_length: get_parsed_or_default("MAX_QUERY_LENGTH", 1800),
        api_base_url: get_env_or_default("API_BASE_URL", "http://localhost:5175"),
    }
});

pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";

pub struct Config {
    /// Missing credentials are not fatal; every search then reports `config_error`.
    pub google_api_key: Option<String>,
    pub google_cx: Option<String>,
    pub search_endpoint: String,
    pub host: String,
    pub port: u16,
    pub rate_window_ms: u64,
    pub rate_max_per_window: u32,
    pub max_query_length: usize,
    /// Gateway base used by the `explore` command.
    pub api_base_url: String,
}

fn get_env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn get_env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn get_parsed_or_default<T: FromStr + Copy + std::fmt::Display>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("invalid value {raw:?} for {key}, using default {default}");
            default
        }),
        Err(_) => default,
    }
}
