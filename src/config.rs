use config::{Config as ConfigBuilder, ConfigError, Environment, File, FileFormat};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 全局配置单例
static CONFIG: OnceCell<AppConfig> = OnceCell::new();

/// 后端接口配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// 接口基地址（包含 `/api` 前缀）
    #[serde(default = "ApiConfig::default_base_url")]
    pub base_url: String,
    /// 单次请求整体超时（秒）
    #[serde(default = "ApiConfig::default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ApiConfig {
    fn default_base_url() -> String {
        "http://127.0.0.1:8080/api".to_string()
    }
    fn default_timeout_secs() -> u64 {
        30
    }

    /// 请求超时
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: Self::default_base_url(),
            timeout_secs: Self::default_timeout_secs(),
        }
    }
}

/// 会话持久化配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// 会话文件目录
    #[serde(default = "StorageConfig::default_dir")]
    pub dir: String,
    /// 持久化键名
    #[serde(default = "StorageConfig::default_key")]
    pub key: String,
}

impl StorageConfig {
    fn default_dir() -> String {
        "./.group-buy".to_string()
    }
    fn default_key() -> String {
        crate::session::DEFAULT_STORAGE_KEY.to_string()
    }

    pub fn dir_path(&self) -> PathBuf {
        PathBuf::from(&self.dir)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: Self::default_dir(),
            key: Self::default_key(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
    /// 日志格式：full | compact
    #[serde(default = "LoggingConfig::default_format")]
    pub format: String,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }
    fn default_format() -> String {
        "full".to_string()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            format: Self::default_format(),
        }
    }
}

/// 展示配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandingConfig {
    /// 页面标题后缀
    #[serde(default = "BrandingConfig::default_title")]
    pub title: String,
}

impl BrandingConfig {
    fn default_title() -> String {
        "拼团营销系统".to_string()
    }
}

impl Default for BrandingConfig {
    fn default() -> Self {
        Self {
            title: Self::default_title(),
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default, alias = "branding")]
    pub app: BrandingConfig,
}

impl AppConfig {
    /// 从默认配置文件加载配置，支持环境变量覆盖
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::get_config_path())
    }

    /// 从指定路径加载配置（文件可缺省），环境变量 `APP__API__BASE_URL` 形式覆盖
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        tracing::info!("正在从 {:?} 加载配置文件", path);

        let builder = ConfigBuilder::builder()
            .add_source(
                File::from(path.to_path_buf())
                    .format(FileFormat::Toml)
                    .required(false),
            )
            // 双下划线分隔层级，避免与 base_url 这类字段名冲突
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = builder.try_deserialize()?;
        tracing::debug!(
            "配置加载完成: base_url = {}, storage = {}/{}",
            config.api.base_url,
            config.storage.dir,
            config.storage.key
        );
        Ok(config)
    }

    /// 从 TOML 文本解析配置（不读取环境变量）
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        ConfigBuilder::builder()
            .add_source(File::from_str(raw, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    /// 获取全局配置单例；未初始化时返回 None
    pub fn try_global() -> Option<&'static AppConfig> {
        CONFIG.get()
    }

    /// 初始化全局配置
    pub fn init_global() -> Result<&'static AppConfig, ConfigError> {
        let config = Self::load()?;
        CONFIG
            .set(config)
            .map_err(|_| ConfigError::Message("配置已经被初始化".to_string()))?;
        Self::try_global().ok_or_else(|| ConfigError::Message("配置初始化失败".to_string()))
    }

    /// 获取配置文件路径（可用 `GROUP_BUY_CONFIG` 指定）
    fn get_config_path() -> PathBuf {
        std::env::var("GROUP_BUY_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.toml"))
    }
}
