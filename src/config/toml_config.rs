use crate::core::registry::{default_services, ServiceEntry, ServiceRegistry};
use crate::utils::error::{RelayError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_origin, validate_positive_number, Validate,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub probe: ProbeConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default = "default_services")]
    pub services: BTreeMap<String, ServiceEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
    /// Honor HTTP_PROXY / HTTPS_PROXY from the environment.
    #[serde(default = "default_use_env_proxy")]
    pub use_env_proxy: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    pub api_key: Option<String>,
}

fn default_port() -> u16 {
    5000
}

fn default_allowed_origins() -> Vec<String> {
    vec!["https://your-frontend-domain.com".to_string()]
}

fn default_window_ms() -> u64 {
    60_000
}

fn default_max_requests() -> u32 {
    20
}

fn default_timeout_ms() -> u64 {
    5_000
}

fn default_max_redirects() -> usize {
    5
}

fn default_use_env_proxy() -> bool {
    true
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            rate_limit: RateLimitConfig::default(),
            probe: ProbeConfig::default(),
            auth: AuthConfig::default(),
            services: default_services(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            allowed_origins: default_allowed_origins(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_ms: default_window_ms(),
            max_requests: default_max_requests(),
        }
    }
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            max_redirects: default_max_redirects(),
            use_env_proxy: default_use_env_proxy(),
        }
    }
}

impl RelayConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(RelayError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| RelayError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${API_KEY})；未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| RelayError::ConfigError {
            message: format!("placeholder pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// PORT, ALLOWED_ORIGINS, RATE_LIMIT_WINDOW_MS, RATE_LIMIT_MAX, API_KEY
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|name| std::env::var(name).ok())
    }

    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            self.server.port = parse_env("PORT", &port)?;
        }
        if let Some(origins) = lookup("ALLOWED_ORIGINS") {
            self.server.allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(window) = lookup("RATE_LIMIT_WINDOW_MS") {
            self.rate_limit.window_ms = parse_env("RATE_LIMIT_WINDOW_MS", &window)?;
        }
        if let Some(max) = lookup("RATE_LIMIT_MAX") {
            self.rate_limit.max_requests = parse_env("RATE_LIMIT_MAX", &max)?;
        }
        if let Some(key) = lookup("API_KEY") {
            self.auth.api_key = Some(key);
        }
        Ok(())
    }

    /// The gating key, if one is configured. Empty strings disable gating.
    pub fn api_key(&self) -> Option<&str> {
        self.auth.api_key.as_deref().filter(|k| !k.is_empty())
    }

    pub fn registry(&self) -> ServiceRegistry {
        ServiceRegistry::new(self.services.clone())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_positive_number("server.port", self.server.port, 1)?;

        if self.server.allowed_origins.is_empty() {
            return Err(RelayError::MissingConfigError {
                field: "server.allowed_origins".to_string(),
            });
        }
        for origin in &self.server.allowed_origins {
            validate_origin("server.allowed_origins", origin)?;
        }

        validate_positive_number("rate_limit.window_ms", self.rate_limit.window_ms, 1)?;
        validate_positive_number("rate_limit.max_requests", self.rate_limit.max_requests, 1)?;
        validate_positive_number("probe.timeout_ms", self.probe.timeout_ms, 1)?;

        if let Some(key) = self.api_key() {
            validate_non_empty_string("auth.api_key", key)?;
            // ${VAR} left behind by substitution means the variable was never set
            if key.starts_with("${") && key.ends_with('}') {
                return Err(RelayError::MissingConfigError {
                    field: format!("auth.api_key ({})", key),
                });
            }
        }

        self.registry().validate()
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| RelayError::InvalidConfigValueError {
            field: name.to_string(),
            value: value.to_string(),
            reason: e.to_string(),
        })
}

impl Validate for RelayConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
