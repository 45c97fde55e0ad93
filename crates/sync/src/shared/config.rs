use contracts::enums::campaign_type::CampaignType;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub feed: FeedConfig,
    pub ozon: OzonConfig,
    pub yandex: YandexConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FeedConfig {
    /// URL архива с остатками поставщика
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OzonConfig {
    pub client_id: String,
    pub api_key: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct YandexConfig {
    /// Bearer-токен Яндекс.Маркета, общий для всех кампаний
    pub token: String,
    pub fbs: CampaignConfig,
    pub dbs: CampaignConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CampaignConfig {
    pub campaign_id: String,
    pub warehouse_id: i64,
}

impl YandexConfig {
    pub fn campaign(&self, campaign_type: CampaignType) -> &CampaignConfig {
        match campaign_type {
            CampaignType::Fbs => &self.fbs,
            CampaignType::Dbs => &self.dbs,
        }
    }
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[feed]
url = "https://timeworld.ru/upload/files/ostatki.zip"

[ozon]
client_id = ""
api_key = ""

[yandex]
token = ""

[yandex.fbs]
campaign_id = ""
warehouse_id = 0

[yandex.dbs]
campaign_id = ""
warehouse_id = 0
"#;

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
///
/// Credentials may be overridden by environment variables, so the toml
/// can be committed without secrets.
pub fn load_config() -> anyhow::Result<Config> {
    let mut config = load_config_file()?;
    apply_env_overrides(&mut config);
    Ok(config)
}

fn load_config_file() -> anyhow::Result<Config> {
    // Try to find config.toml next to the executable
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                tracing::info!("Loading config from: {}", config_path.display());
                let contents = std::fs::read_to_string(&config_path)?;
                let config: Config = toml::from_str(&contents)?;
                return Ok(config);
            } else {
                tracing::warn!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    // Fall back to default config
    tracing::info!("Using default embedded configuration");
    let config: Config = toml::from_str(DEFAULT_CONFIG)?;
    Ok(config)
}

/// Переменные окружения имеют приоритет над config.toml
fn apply_env_overrides(config: &mut Config) {
    if let Ok(v) = std::env::var("OZON_CLIENT_ID") {
        config.ozon.client_id = v;
    }
    if let Ok(v) = std::env::var("OZON_API_KEY") {
        config.ozon.api_key = v;
    }
    if let Ok(v) = std::env::var("MARKET_TOKEN") {
        config.yandex.token = v;
    }
    if let Ok(v) = std::env::var("FBS_ID") {
        config.yandex.fbs.campaign_id = v;
    }
    if let Ok(v) = std::env::var("DBS_ID") {
        config.yandex.dbs.campaign_id = v;
    }
    if let Ok(v) = std::env::var("WAREHOUSE_FBS_ID") {
        if let Ok(id) = v.parse() {
            config.yandex.fbs.warehouse_id = id;
        }
    }
    if let Ok(v) = std::env::var("WAREHOUSE_DBS_ID") {
        if let Ok(id) = v.parse() {
            config.yandex.dbs.warehouse_id = id;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_loads() {
        let config: Result<Config, _> = toml::from_str(DEFAULT_CONFIG);
        assert!(config.is_ok());
        let config = config.unwrap();
        assert_eq!(config.feed.url, "https://timeworld.ru/upload/files/ostatki.zip");
        assert_eq!(config.yandex.fbs.warehouse_id, 0);
    }

    #[test]
    fn test_campaign_lookup() {
        let config: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(
            config.yandex.campaign(CampaignType::Fbs).campaign_id,
            config.yandex.fbs.campaign_id
        );
    }
}
