use config::builder::{ConfigBuilder, DefaultState};
use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 环境变量前缀, 例如 RECONCILE__SERVER__PORT=9000
pub const ENV_PREFIX: &str = "RECONCILE";

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    #[serde(default)]
    pub comparison: ComparisonSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// 文档后端 (合同/发票 OCR 服务)
#[derive(Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub base_url: String,
    #[serde(default)]
    pub api_token: Option<String>,
    pub timeout_secs: u64,
}

// token 不进日志
impl fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendConfig")
            .field("base_url", &self.base_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "***"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// 比对选项
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComparisonSettings {
    /// 是否校验供应商名称 (默认关闭)
    #[serde(default)]
    pub check_supplier: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            backend: BackendConfig {
                base_url: "http://localhost:8009".to_string(),
                api_token: None,
                timeout_secs: 30,
            },
            comparison: ComparisonSettings::default(),
        }
    }
}

impl AppConfig {
    /// 加载配置: 默认值 + 环境变量覆盖
    pub fn load() -> Result<Self, ConfigError> {
        Self::builder()?
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    fn builder() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let defaults = Self::default();
        Config::builder()
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", i64::from(defaults.server.port))?
            .set_default("backend.base_url", defaults.backend.base_url)?
            .set_default("backend.timeout_secs", defaults.backend.timeout_secs as i64)?
            .set_default("comparison.check_supplier", defaults.comparison.check_supplier)
    }
}
