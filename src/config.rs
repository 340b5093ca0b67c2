use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Bridge configuration loaded from file and environment.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct BridgeConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub wordpress: WordPressDefaults,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ServerConfig {
    pub log_level: Option<String>,
}

/// Default site access applied to requests that omit credentials.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct WordPressDefaults {
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>, // Application Password
    pub timeout_seconds: Option<u64>,
}

impl BridgeConfig {
    /// 設定ファイルから読み込み、環境変数で上書き
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    pub fn load_from(explicit_path: Option<&str>) -> Result<Self> {
        let mut settings = config::Config::builder();

        let default_config = BridgeConfig::default();
        settings = settings.add_source(config::Config::try_from(&default_config)?);

        if let Some(path) = explicit_path {
            settings = settings.add_source(config::File::with_name(path));
        } else {
            let config_paths = ["bridge-config.toml", "config.toml"];
            for path in &config_paths {
                if std::path::Path::new(path).exists() {
                    // stdout carries envelopes, so the notice goes to stderr
                    eprintln!("📁 Loading configuration from: {}", path);
                    settings = settings.add_source(config::File::with_name(path));
                    break;
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("BRIDGE")
                .separator("_")
                .try_parsing(true),
        );

        let mut final_config: BridgeConfig = settings.build()?.try_deserialize()?;

        // WordPress設定の環境変数上書き（従来のブリッジとの互換性）
        if let Ok(url) = std::env::var("WORDPRESS_URL") {
            final_config.wordpress.url = Some(url);
        }
        if let Ok(username) = std::env::var("WORDPRESS_USERNAME") {
            final_config.wordpress.username = Some(username);
        }
        if let Ok(password) = std::env::var("WORDPRESS_PASSWORD") {
            final_config.wordpress.password = Some(password);
        }

        Ok(final_config)
    }
}
