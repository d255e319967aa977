use std::env;

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::security_headers;

const DEFAULT_PORT: u16 = 3001;

pub struct Config {
    pub database_url: String,
    /// Public base URL baked into check-in payloads. Changing it invalidates
    /// nothing already printed only if the old URL keeps redirecting here.
    pub base_url: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost/turnstile".to_string()),
            base_url: env::var("CHECKIN_BASE_URL")
                .unwrap_or_else(|_| format!("http://localhost:{DEFAULT_PORT}")),
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_PORT),
        }
    }
}
