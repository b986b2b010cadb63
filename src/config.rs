use serde::Deserialize;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Database connection URL (e.g. sqlite://talentbase.db, postgres://...)
    pub database_url: String,

    /// JWT signing secret
    pub jwt_secret: String,

    /// JWT token expiry in hours (default: 24)
    pub jwt_expiry_hours: u64,

    /// Server host (default: 127.0.0.1)
    pub server_host: String,

    /// Server port (default: 3000)
    pub server_port: u16,

    /// Environment: development, production, test
    pub environment: String,

    /// How long a registration verification code stays valid, in seconds
    /// (default: 1800). Expiry is checked lazily at use-time; expired
    /// pending registrations are never swept.
    pub verification_code_expiry_secs: i64,

    /// How long a password-reset token stays valid, in seconds
    /// (default: 3600). Same lazy-expiry rule as verification codes.
    pub password_reset_expiry_secs: i64,

    /// Email backend: "console" logs outgoing mail, "smtp" delivers it
    /// (default: console — matches the development mail backend)
    pub email_backend: String,

    /// From address for all outgoing mail (default: noreply@example.com)
    pub email_from: String,

    /// Public base URL used in password-reset links
    /// (default: http://127.0.0.1:3000)
    pub public_base_url: String,

    /// SMTP relay host (required when email_backend = "smtp")
    pub smtp_host: Option<String>,

    /// SMTP relay port (default: 587)
    pub smtp_port: u16,

    /// SMTP username (optional)
    pub smtp_username: Option<String>,

    /// SMTP password (optional)
    pub smtp_password: Option<String>,
}

impl Config {
    /// Load configuration from environment variables (with .env support).
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        // Load .env file if present (ignore errors if missing)
        let _ = dotenvy::dotenv();

        Ok(Config {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://talentbase.db?mode=rwc".to_string()),
            jwt_secret: std::env::var("JWT_SECRET")
                .unwrap_or_else(|_| "talentbase-dev-secret-change-me".to_string()),
            jwt_expiry_hours: std::env::var("JWT_EXPIRY_HOURS")
                .unwrap_or_else(|_| "24".to_string())
                .parse()
                .unwrap_or(24),
            server_host: std::env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: std::env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            verification_code_expiry_secs: std::env::var("VERIFICATION_CODE_EXPIRY_SECS")
                .unwrap_or_else(|_| "1800".to_string())
                .parse()
                .unwrap_or(1800),
            password_reset_expiry_secs: std::env::var("PASSWORD_RESET_EXPIRY_SECS")
                .unwrap_or_else(|_| "3600".to_string())
                .parse()
                .unwrap_or(3600),
            email_backend: std::env::var("EMAIL_BACKEND").unwrap_or_else(|_| "console".to_string()),
            email_from: std::env::var("EMAIL_FROM")
                .unwrap_or_else(|_| "noreply@example.com".to_string()),
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:3000".to_string()),
            smtp_host: std::env::var("SMTP_HOST").ok(),
            smtp_port: std::env::var("SMTP_PORT")
                .unwrap_or_else(|_| "587".to_string())
                .parse()
                .unwrap_or(587),
            smtp_username: std::env::var("SMTP_USERNAME").ok(),
            smtp_password: std::env::var("SMTP_PASSWORD").ok(),
        })
    }

    /// Check if running in development mode.
    pub fn is_dev(&self) -> bool {
        self.environment == "development"
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}
