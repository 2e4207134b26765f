use std::env;

/// Everything the service reads from the environment, collected once at
/// startup and handed to the app as `web::Data` instead of being re-read
/// from `env::var` all over the place.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub host: String,
    pub port: u16,
    pub debug: bool,
    /// Seconds between last-login checks. 10s is a dev-time value.
    pub check_interval_secs: u64,
    /// Held for the external payment gateway.
    pub stripe_api_key: Option<String>,
    /// Held for the external mail transport.
    pub email: EmailConfig,
}

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub use_tls: bool,
    pub user: Option<String>,
    pub password: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let database_url =
            env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())?;
        let jwt_secret = env::var("JWT_SECRET").map_err(|_| "JWT_SECRET must be set".to_string())?;

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = match env::var("PORT") {
            Ok(p) => p.parse::<u16>().map_err(|_| format!("invalid PORT: {}", p))?,
            Err(_) => 8080,
        };

        let check_interval_secs = match env::var("CHECK_INTERVAL_SECS") {
            Ok(s) => s
                .parse::<u64>()
                .map_err(|_| format!("invalid CHECK_INTERVAL_SECS: {}", s))?,
            Err(_) => 10,
        };

        let email_port = match env::var("EMAIL_PORT") {
            Ok(p) => Some(
                p.parse::<u16>()
                    .map_err(|_| format!("invalid EMAIL_PORT: {}", p))?,
            ),
            Err(_) => None,
        };

        Ok(AppConfig {
            database_url,
            jwt_secret,
            host,
            port,
            debug: env::var("DEBUG").map(|v| v == "True").unwrap_or(false),
            check_interval_secs,
            stripe_api_key: env::var("STRIPE_API_KEY").ok(),
            email: EmailConfig {
                host: env::var("EMAIL_HOST").ok(),
                port: email_port,
                use_tls: env::var("EMAIL_USE_TLS").map(|v| v == "True").unwrap_or(true),
                user: env::var("EMAIL_HOST_USER").ok(),
                password: env::var("EMAIL_HOST_PASSWORD").ok(),
            },
        })
    }
}
