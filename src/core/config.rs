use std::env;

use chrono::Duration;

use crate::shared::constants::{DEFAULT_EDIT_WINDOW_MINUTES, DEFAULT_LINK_TTL_HOURS};

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub swagger: SwaggerConfig,
    pub report_links: ReportLinkConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub frontend_url: String,
    pub environment: String,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

/// Report link and edit window settings
#[derive(Clone)]
pub struct ReportLinkConfig {
    /// Server-side secret appended to every token before hashing
    pub pepper: String,
    /// How long an issued link stays valid
    pub link_ttl: Duration,
    /// How long after submission a report stays editable
    pub edit_window: Duration,
    /// Bearer key for the issuance endpoint; issuance is disabled when unset
    pub issuer_key: Option<String>,
}

impl std::fmt::Debug for ReportLinkConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportLinkConfig")
            .field("pepper", &"***")
            .field("link_ttl", &self.link_ttl)
            .field("edit_window", &self.edit_window)
            .field("issuer_key", &self.issuer_key.as_ref().map(|_| "***"))
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            // Only error if it's not "file not found" - that's acceptable
            if !e.to_string().contains("not found") {
                tracing::warn!("Error loading .env file: {}", e);
            }
        }

        let app = AppConfig::from_env()?;
        let report_links = ReportLinkConfig::from_env(app.is_production())?;

        Ok(Config {
            app,
            database: DatabaseConfig::from_env()?,
            swagger: SwaggerConfig::from_env()?,
            report_links,
        })
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        // Parse CORS allowed origins from comma-separated string
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:5173".to_string());

        let environment = env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
            frontend_url,
            environment,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}

impl DatabaseConfig {
    // Default values for database connection pool (conservative defaults for small-medium apps)
    const DEFAULT_MAX_CONNECTIONS: u32 = 10;
    const DEFAULT_MIN_CONNECTIONS: u32 = 1;
    const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
    const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600; // 10 minutes
    const DEFAULT_MAX_LIFETIME_SECS: u64 = 1800; // 30 minutes

    pub fn from_env() -> Result<Self, String> {
        let url = env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())?;

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MAX_CONNECTIONS must be a valid number".to_string())?;

        let min_connections = env::var("DB_MIN_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MIN_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MIN_CONNECTIONS must be a valid number".to_string())?;

        let acquire_timeout_secs = env::var("DB_ACQUIRE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_ACQUIRE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_ACQUIRE_TIMEOUT_SECS must be a valid number".to_string())?;

        let idle_timeout_secs = env::var("DB_IDLE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_IDLE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_IDLE_TIMEOUT_SECS must be a valid number".to_string())?;

        let max_lifetime_secs = env::var("DB_MAX_LIFETIME_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_LIFETIME_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_MAX_LIFETIME_SECS must be a valid number".to_string())?;

        Ok(Self {
            url,
            max_connections,
            min_connections,
            acquire_timeout_secs,
            idle_timeout_secs,
            max_lifetime_secs,
        })
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        // Only use credentials if they are non-empty
        let username = env::var("SWAGGER_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SWAGGER_PASSWORD").ok().filter(|s| !s.is_empty());
        let title = env::var("SWAGGER_TITLE").unwrap_or_else(|_| "Fleet Report Links API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION")
            .unwrap_or_else(|_| "Public driver report links and edit windows".to_string());

        Ok(Self {
            username,
            password,
            title,
            version,
            description,
        })
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}

impl ReportLinkConfig {
    const DEV_PEPPER: &'static str = "development-only-report-token-pepper";
    const MIN_PEPPER_LENGTH: usize = 32;

    pub fn from_env(is_production: bool) -> Result<Self, String> {
        let pepper = env::var("REPORT_TOKEN_PEPPER").ok().filter(|s| !s.is_empty());
        let link_ttl_hours = env::var("REPORT_LINK_TTL_HOURS")
            .unwrap_or_else(|_| DEFAULT_LINK_TTL_HOURS.to_string())
            .parse::<i64>()
            .map_err(|_| "REPORT_LINK_TTL_HOURS must be a valid number".to_string())?;
        let edit_window_minutes = env::var("REPORT_EDIT_WINDOW_MINUTES")
            .unwrap_or_else(|_| DEFAULT_EDIT_WINDOW_MINUTES.to_string())
            .parse::<i64>()
            .map_err(|_| "REPORT_EDIT_WINDOW_MINUTES must be a valid number".to_string())?;
        let issuer_key = env::var("REPORT_LINK_ISSUER_KEY")
            .ok()
            .filter(|s| !s.is_empty());

        Self::build(
            pepper,
            is_production,
            link_ttl_hours,
            edit_window_minutes,
            issuer_key,
        )
    }

    fn build(
        pepper: Option<String>,
        is_production: bool,
        link_ttl_hours: i64,
        edit_window_minutes: i64,
        issuer_key: Option<String>,
    ) -> Result<Self, String> {
        let pepper = match pepper {
            Some(p) if is_production && p.len() < Self::MIN_PEPPER_LENGTH => {
                return Err(format!(
                    "REPORT_TOKEN_PEPPER must be at least {} characters in production",
                    Self::MIN_PEPPER_LENGTH
                ));
            }
            Some(p) => p,
            None if is_production => {
                return Err("REPORT_TOKEN_PEPPER must be set in production".to_string());
            }
            None => {
                tracing::warn!("REPORT_TOKEN_PEPPER not set, using development pepper");
                Self::DEV_PEPPER.to_string()
            }
        };

        if link_ttl_hours <= 0 {
            return Err("REPORT_LINK_TTL_HOURS must be positive".to_string());
        }
        if edit_window_minutes <= 0 {
            return Err("REPORT_EDIT_WINDOW_MINUTES must be positive".to_string());
        }

        Ok(Self {
            pepper,
            link_ttl: Duration::hours(link_ttl_hours),
            edit_window: Duration::minutes(edit_window_minutes),
            issuer_key,
        })
    }
}
