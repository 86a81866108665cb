use serde::Deserialize;

/// Shared demo key published by USDA; fine for development, heavily
/// rate limited.
const DEMO_API_KEY: &str = "DEMO_KEY";
const DEFAULT_USDA_BASE_URL: &str = "https://api.nal.usda.gov/fdc/v1";

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UsdaConfig {
    pub api_key: String,
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub usda: UsdaConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "mealdiary".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "mealdiary-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24),
        };
        let usda = UsdaConfig {
            api_key: std::env::var("USDA_API_KEY").unwrap_or_else(|_| DEMO_API_KEY.into()),
            base_url: std::env::var("USDA_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_USDA_BASE_URL.into()),
        };
        Ok(Self {
            database_url,
            jwt,
            usda,
        })
    }
}
