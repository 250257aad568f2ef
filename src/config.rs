use serde::Deserialize;

use crate::nutrition::progress::ProgressThresholds;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UsdaConfig {
    pub api_key: Option<String>,
    pub api_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub usda: UsdaConfig,
    pub progress: ProgressThresholds,
}

pub const DEFAULT_USDA_API_URL: &str = "https://api.nal.usda.gov/fdc/v1/foods/search";

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "macrolog".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "macrolog-users".into()),
            ttl_minutes: env_parse("JWT_TTL_MINUTES").unwrap_or(60),
        };
        let usda = UsdaConfig {
            api_key: std::env::var("USDA_API_KEY").ok().filter(|k| !k.trim().is_empty()),
            api_url: std::env::var("USDA_API_URL").unwrap_or_else(|_| DEFAULT_USDA_API_URL.into()),
        };

        let defaults = ProgressThresholds::default();
        let progress = ProgressThresholds {
            on_target_min_pct: env_parse("PROGRESS_ON_TARGET_MIN_PCT")
                .unwrap_or(defaults.on_target_min_pct),
            on_target_max_pct: env_parse("PROGRESS_ON_TARGET_MAX_PCT")
                .unwrap_or(defaults.on_target_max_pct),
            slightly_over_max_pct: env_parse("PROGRESS_SLIGHTLY_OVER_MAX_PCT")
                .unwrap_or(defaults.slightly_over_max_pct),
        };
        progress.validate()?;

        Ok(Self {
            database_url,
            jwt,
            usda,
            progress,
        })
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}
