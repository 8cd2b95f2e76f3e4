use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// PostgreSQL connection URL; the in-memory backend is used when unset
    #[serde(default)]
    pub database_url: Option<String>,

    /// Secret used to sign and verify JWTs
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,

    /// Token lifetime in seconds
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: i64,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_jwt_secret() -> String {
    // Development fallback only; production deployments set JWT_SECRET
    "insecure-dev-secret".to_string()
}

fn default_token_ttl_secs() -> i64 {
    60 * 60 * 24 // 24 hours
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }
}
