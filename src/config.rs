use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub ttl_minutes: u64,
}

/// Credentials that earn the `admin` claim at login.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    pub sender: String,
    pub region: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub host: String,
    pub port: u16,
    pub public_base_url: String,
    pub jwt: JwtConfig,
    pub admin: Option<AdminConfig>,
    pub mail: Option<MailConfig>,
}

/// Auth token lifetime; 60 when unset.
fn ttl_minutes(raw: Option<String>) -> anyhow::Result<u64> {
    let Some(raw) = raw else {
        return Ok(60);
    };
    match raw.trim().parse::<u64>() {
        Ok(minutes) if minutes > 0 => Ok(minutes),
        _ => anyhow::bail!("JWT_TTL_MINUTES must be a positive number of minutes, got {raw:?}"),
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "aerobook".into()),
            ttl_minutes: ttl_minutes(std::env::var("JWT_TTL_MINUTES").ok())?,
        };

        let admin = match (std::env::var("ADMIN_EMAIL"), std::env::var("ADMIN_PASSWORD")) {
            (Ok(email), Ok(password)) => Some(AdminConfig {
                email: email.trim().to_lowercase(),
                password,
            }),
            _ => None,
        };

        let mail = std::env::var("MAIL_SENDER").ok().map(|sender| MailConfig {
            sender,
            region: std::env::var("AWS_REGION").unwrap_or_else(|_| "eu-central-1".into()),
        });

        Ok(Self {
            database_url,
            max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(10),
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: std::env::var("APP_PORT")
                .ok()
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(8080),
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:8080".into())
                .trim_end_matches('/')
                .to_string(),
            jwt,
            admin,
            mail,
        })
    }

    /// True when `email`/`password` match the configured admin account.
    pub fn is_admin_login(&self, email: &str, password: &str) -> bool {
        self.admin
            .as_ref()
            .map(|a| a.email == email && a.password == password)
            .unwrap_or(false)
    }
}
