use serde::{Deserialize, Serialize};

/// Deployment profile. Production turns on the `Secure` cookie flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    #[default]
    Production,
    Development,
}

impl Profile {
    pub fn is_production(&self) -> bool {
        matches!(self, Profile::Production)
    }
}

fn default_max_connections() -> u32 {
    5
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_admin_name() -> String {
    "Administrator".to_string()
}

/// Admin account to seed on startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitialUserConfig {
    pub email: String,
    pub password: String,
    #[serde(default = "default_admin_name")]
    pub name: String,
}

/// Auth configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HS256 signing secret. Left empty, startup fails.
    #[serde(default)]
    pub jwt_secret: String,
    pub initial_admin: Option<InitialUserConfig>,
}

/// Server configuration - loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub listen: String, // "0.0.0.0:8080"
    #[serde(default)]
    pub profile: Profile,
    /// Without a database the server keeps users in memory
    pub db: Option<DbConfig>,
    pub auth: AuthConfig,
}

/// Load server config from a YAML file with VANTAGE__ env var overrides.
pub fn load_config(path: &str) -> anyhow::Result<ServerConfig> {
    use anyhow::Context;
    let config: ServerConfig = config::Config::builder()
        .add_source(config::File::new(path, config::FileFormat::Yaml))
        .add_source(
            config::Environment::with_prefix("VANTAGE")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()
        .with_context(|| format!("Failed to build config from: {}", path))?
        .try_deserialize()
        .with_context(|| format!("Failed to deserialize config from: {}", path))?;
    Ok(config)
}
