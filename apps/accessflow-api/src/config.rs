//! Application configuration loaded from environment variables.
//!
//! Loading is fail-fast: malformed values abort startup with a clear
//! message. Insecure development defaults are tolerated in development and
//! rejected in production by [`Config::validate_security_config`].

use std::env;

use accessflow_notify::MailApiConfig;
use thiserror::Error;

/// JWT secret used when `JWT_SECRET` is unset. Development only.
pub const INSECURE_JWT_SECRET: &str = "development-jwt-secret-change-in-production";

/// Minimum HS256 secret length accepted in production.
pub const MIN_JWT_SECRET_LEN: usize = 32;

const DEFAULT_APPROVER_ROLE: &str = "access_approver";
const DEFAULT_MAIL_API_URL: &str = "https://api.mailgun.net/v3";

// ── AppEnvironment ───────────────────────────────────────────────────────

/// Application environment mode.
///
/// - `Development`: insecure defaults are allowed with WARN-level logging.
/// - `Production`: insecure defaults cause the application to refuse startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Production,
}

impl AppEnvironment {
    /// Parse an `APP_ENV` value. Defaults to `Development` if unrecognized.
    pub fn from_env_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "development" | "dev" => Self::Development,
            other => {
                tracing::warn!(
                    value = other,
                    "Unrecognized APP_ENV value, defaulting to Development"
                );
                Self::Development
            }
        }
    }

    #[must_use]
    pub fn is_production(&self) -> bool {
        *self == Self::Production
    }
}

impl std::fmt::Display for AppEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

/// Configuration errors that can occur during environment loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    #[error("Invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },

    #[error("Failed to parse port: {0}")]
    InvalidPort(#[from] std::num::ParseIntError),
}

/// Application configuration.
#[derive(Clone)]
pub struct Config {
    pub app_env: AppEnvironment,

    /// PostgreSQL connection string. `None` selects the in-memory store
    /// (development only).
    pub database_url: Option<String>,

    /// HS256 secret used to verify bearer tokens.
    pub jwt_secret: String,

    /// Expected `iss` claim, if any.
    pub jwt_issuer: Option<String>,

    /// Accepted `aud` values, if any.
    pub jwt_audience: Option<Vec<String>>,

    /// Token role that grants approver rights.
    pub approver_role: String,

    /// Emails that are approvers regardless of token roles.
    pub approver_emails: Vec<String>,

    /// Address that receives a copy of every new submission.
    pub admin_notify_email: Option<String>,

    /// Mail API settings. `None` disables email notifications.
    pub mail: Option<MailApiConfig>,

    /// Chat incoming-webhook URL. `None` disables chat notifications.
    pub chat_webhook_url: Option<String>,

    /// Tracing filter directive (e.g., "info,accessflow=debug")
    pub rust_log: String,

    /// Allowed CORS origins (comma-separated URLs or "*" for development)
    pub cors_origins: Vec<String>,

    pub host: String,
    pub port: u16,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("app_env", &self.app_env)
            .field("database_url", &self.database_url.as_ref().map(|_| "[redacted]"))
            .field("jwt_secret", &"[redacted]")
            .field("jwt_issuer", &self.jwt_issuer)
            .field("jwt_audience", &self.jwt_audience)
            .field("approver_role", &self.approver_role)
            .field("approver_emails", &self.approver_emails.len())
            .field("mail", &self.mail)
            .field("chat_webhook_url", &self.chat_webhook_url.as_ref().map(|_| "[redacted]"))
            .field("host", &self.host)
            .field("port", &self.port)
            .field("cors_origins", &self.cors_origins)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Load configuration from environment variables, reading `.env` first
    /// if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a value is malformed (e.g., invalid port
    /// number, partial mail settings, or a non-http(s) CORS origin in
    /// production).
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `get`, which returns the raw value of a
    /// variable. Blank values count as unset.
    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let app_env = AppEnvironment::from_env_str(
            &var("APP_ENV").unwrap_or_else(|| "development".to_string()),
        );

        let database_url = var("DATABASE_URL");
        let jwt_secret = var("JWT_SECRET").unwrap_or_else(|| INSECURE_JWT_SECRET.to_string());
        let jwt_issuer = var("JWT_ISSUER");
        let jwt_audience = var("JWT_AUDIENCE").map(|s| split_list(&s));

        let approver_role =
            var("APPROVER_ROLE").unwrap_or_else(|| DEFAULT_APPROVER_ROLE.to_string());
        let approver_emails = var("APPROVER_EMAILS")
            .map(|s| split_list(&s))
            .unwrap_or_default();
        let admin_notify_email = var("ADMIN_NOTIFY_EMAIL");

        let mail = mail_config(&var)?;
        let chat_webhook_url = var("CHAT_WEBHOOK_URL");

        let rust_log = var("RUST_LOG").unwrap_or_else(|| "info".to_string());

        let cors_origins = var("CORS_ORIGINS")
            .map(|s| split_list(&s))
            .unwrap_or_else(|| vec!["*".to_string()]);
        validate_cors_origins(&cors_origins, &app_env)?;

        let host = var("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port: u16 = var("PORT")
            .unwrap_or_else(|| "8080".to_string())
            .parse()?;
        if port == 0 {
            return Err(ConfigError::InvalidValue {
                var: "PORT".to_string(),
                message: "Port must be between 1 and 65535".to_string(),
            });
        }

        Ok(Config {
            app_env,
            database_url,
            jwt_secret,
            jwt_issuer,
            jwt_audience,
            approver_role,
            approver_emails,
            admin_notify_email,
            mail,
            chat_webhook_url,
            rust_log,
            cors_origins,
            host,
            port,
        })
    }

    /// Get the server bind address as a socket address string.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Validate security configuration based on the application environment.
    ///
    /// In **production** mode: returns `Err(errors)` listing every issue.
    /// In **development** mode: returns `Ok(warnings)` listing every issue.
    pub fn validate_security_config(&self) -> Result<Vec<String>, Vec<String>> {
        let mut issues = Vec::new();

        if self.jwt_secret == INSECURE_JWT_SECRET {
            issues.push("JWT_SECRET is using the default insecure value".to_string());
        } else if self.jwt_secret.len() < MIN_JWT_SECRET_LEN {
            issues.push(format!(
                "JWT_SECRET is shorter than {MIN_JWT_SECRET_LEN} bytes"
            ));
        }

        if self.cors_origins.iter().any(|o| o == "*") {
            issues.push(
                "CORS_ORIGINS contains wildcard '*' which is not allowed in production".to_string(),
            );
        }

        if self.database_url.is_none() {
            issues.push(
                "DATABASE_URL is not set; requests are kept in memory and lost on restart"
                    .to_string(),
            );
        }

        if issues.is_empty() {
            return Ok(Vec::new());
        }

        if self.app_env.is_production() {
            Err(issues)
        } else {
            Ok(issues)
        }
    }
}

fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Mail settings are all-or-nothing: `MAIL_API_KEY`, `MAIL_DOMAIN` and
/// `MAIL_FROM` must be set together. `MAIL_API_URL` has a default.
fn mail_config<F>(var: &F) -> Result<Option<MailApiConfig>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let api_key = var("MAIL_API_KEY");
    let domain = var("MAIL_DOMAIN");
    let from = var("MAIL_FROM");

    match (api_key, domain, from) {
        (None, None, None) => Ok(None),
        (Some(api_key), Some(domain), Some(from)) => Ok(Some(MailApiConfig {
            base_url: var("MAIL_API_URL").unwrap_or_else(|| DEFAULT_MAIL_API_URL.to_string()),
            api_key,
            domain,
            from,
        })),
        (api_key, domain, from) => {
            let missing: Vec<&str> = [
                ("MAIL_API_KEY", api_key.is_none()),
                ("MAIL_DOMAIN", domain.is_none()),
                ("MAIL_FROM", from.is_none()),
            ]
            .into_iter()
            .filter_map(|(name, missing)| missing.then_some(name))
            .collect();
            Err(ConfigError::InvalidValue {
                var: "MAIL_API_KEY".to_string(),
                message: format!(
                    "partial mail configuration, also set {}",
                    missing.join(", ")
                ),
            })
        }
    }
}

/// Validate CORS origin URL formats at startup.
///
/// Invalid URLs are a startup error in production and a warning in
/// development. The wildcard is checked by `validate_security_config`.
fn validate_cors_origins(origins: &[String], app_env: &AppEnvironment) -> Result<(), ConfigError> {
    for origin in origins {
        if origin == "*" {
            continue;
        }

        let is_valid = origin.starts_with("http://") || origin.starts_with("https://");
        if !is_valid {
            let msg = format!(
                "CORS origin '{}' is not a valid URL (must start with http:// or https://)",
                origin
            );
            if app_env.is_production() {
                return Err(ConfigError::InvalidValue {
                    var: "CORS_ORIGINS".to_string(),
                    message: msg,
                });
            }
            tracing::warn!(target: "security", origin = %origin, "{}", msg);
        }

        if is_valid && origin.ends_with('/') {
            tracing::warn!(
                target: "security",
                origin = %origin,
                "CORS origin has a trailing slash, origins should not end with '/'"
            );
        }
    }
    Ok(())
}
