use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app_env: String,
    pub log_level: String,
    #[serde(default)]
    pub user_id: Option<String>,
    pub store_backend: String,
    #[serde(default)]
    pub seed_path: Option<String>,
    pub firebase_url: String,
    #[serde(default)]
    pub firebase_auth_token: Option<String>,
    pub store_timeout_ms: u64,
    pub store_retry_max_attempts: u32,
    pub store_retry_backoff_base_ms: u64,
    pub store_retry_backoff_max_ms: u64,
    pub camera_device: String,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();
        let cfg = config::Config::builder()
            .set_default("app_env", "development")?
            .set_default("log_level", "info")?
            .set_default("store_backend", "memory")?
            .set_default("firebase_url", "http://127.0.0.1:9000")?
            .set_default("store_timeout_ms", 5000)?
            .set_default("store_retry_max_attempts", 3)?
            .set_default("store_retry_backoff_base_ms", 200)?
            .set_default("store_retry_backoff_max_ms", 2000)?
            .set_default("camera_device", "/dev/video0")?
            .add_source(config::Environment::default().separator("__"))
            .build()?;
        cfg.try_deserialize()
    }

    pub fn is_production(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("production")
    }

    pub fn uses_firebase(&self) -> bool {
        self.store_backend.eq_ignore_ascii_case("firebase")
    }
}
