use config::{Config, ConfigError, Environment, File};
use std::sync::OnceLock;

use super::{AppConfig, ListenTarget};

static APP_CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// 常用的非前缀环境变量，优先级最高
const ENV_OVERRIDES: [(&str, &str); 9] = [
    ("app.environment", "APP_ENV"),
    ("app.log_level", "RUST_LOG"),
    ("server.host", "SERVER_HOST"),
    ("server.port", "SERVER_PORT"),
    ("server.unix_socket_path", "UNIX_SOCKET"),
    ("server.workers", "CPU_COUNT"),
    ("database.url", "DATABASE_URL"),
    ("cache.redis.url", "REDIS_URL"),
    ("cache.redis.key_prefix", "REDIS_KEY_PREFIX"),
];

impl AppConfig {
    /// 按 默认值 → config.toml → config.{APP_ENV}.toml → GRADING_* → 常用变量 的顺序合并
    pub fn load() -> Result<Self, ConfigError> {
        let profile = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());

        let mut builder = Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?)
            .add_source(File::with_name("config").required(false))
            .add_source(File::with_name(&format!("config.{profile}")).required(false))
            // GRADING_SERVER__PORT 之类，双下划线分隔层级
            .add_source(
                Environment::with_prefix("GRADING")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        for (key, var) in ENV_OVERRIDES {
            builder = builder.set_override_option(key, std::env::var(var).ok())?;
        }

        let mut app_config: AppConfig = builder.build()?.try_deserialize()?;
        app_config.finalize()?;
        Ok(app_config)
    }

    /// 补全派生值并校验
    fn finalize(&mut self) -> Result<(), ConfigError> {
        if self.server.workers == 0 {
            self.server.workers = num_cpus::get().clamp(1, self.server.max_workers.max(1));
        }
        self.grading.validate()
    }

    /// 获取全局配置实例
    pub fn get() -> &'static AppConfig {
        APP_CONFIG.get_or_init(|| {
            Self::load().unwrap_or_else(|e| {
                eprintln!("Failed to load configuration: {e}");
                std::process::exit(1);
            })
        })
    }

    /// 初始化配置 (在应用启动时调用)
    pub fn init() -> Result<(), ConfigError> {
        let config = Self::load()?;
        APP_CONFIG
            .set(config)
            .map_err(|_| ConfigError::Message("Configuration already initialized".to_string()))?;
        Ok(())
    }

    /// 检查是否为开发环境
    pub fn is_development(&self) -> bool {
        self.app.environment == "development"
    }

    /// 监听目标：配置了 Unix 套接字且平台支持时优先使用
    pub fn listen_target(&self) -> ListenTarget {
        let socket = self.server.unix_socket_path.trim();
        if cfg!(unix) && !socket.is_empty() {
            ListenTarget::Unix(socket.to_string())
        } else {
            ListenTarget::Tcp(format!("{}:{}", self.server.host, self.server.port))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_round_trip_through_config_builder() {
        let loaded: AppConfig = Config::builder()
            .add_source(Config::try_from(&AppConfig::default()).unwrap())
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(loaded.cache.cache_type, "moka");
        assert_eq!(loaded.server.port, 8080);
        assert_eq!(loaded.grading.step_range(), 1..=5);
    }

    #[test]
    fn test_finalize_fills_workers_and_validates() {
        let mut config = AppConfig::default();
        config.finalize().unwrap();
        assert!(config.server.workers >= 1);
        assert!(config.server.workers <= config.server.max_workers);

        let mut broken = AppConfig::default();
        broken.grading.score_max = 101;
        assert!(broken.finalize().is_err());
    }

    #[test]
    fn test_listen_target_prefers_socket_on_unix() {
        let mut config = AppConfig::default();
        assert_eq!(
            config.listen_target(),
            ListenTarget::Tcp("127.0.0.1:8080".to_string())
        );

        config.server.unix_socket_path = "/tmp/grading.sock".to_string();
        let expected = if cfg!(unix) {
            ListenTarget::Unix("/tmp/grading.sock".to_string())
        } else {
            ListenTarget::Tcp("127.0.0.1:8080".to_string())
        };
        assert_eq!(config.listen_target(), expected);
    }
}
