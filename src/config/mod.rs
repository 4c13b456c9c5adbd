use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub redis_url: Option<String>,
    pub jwt_secret: String,
    pub jwt_expiration_secs: u64,
    pub bcrypt_cost: u32,
    pub rate_limit_window_secs: u64,
    pub rate_limit_requests: u32,
    pub server_host: String,
    pub server_port: u16,
    pub api_base_uri: String,
    pub client_url: String,
    pub webhooks: WebhookConfig,
}

/// 各通知频道的 webhook 地址，未配置的频道直接跳过
#[derive(Debug, Clone, Default)]
pub struct WebhookConfig {
    pub user_url: Option<String>,
    pub recipe_url: Option<String>,
    pub review_url: Option<String>,
    pub contact_url: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenv::dotenv().ok();

        let jwt_expiration = optional("JWT_EXPIRATION")
            .and_then(|v| v.trim_end_matches('h').parse::<u64>().ok())
            .unwrap_or(24);

        Ok(Config {
            database_url: env::var("DATABASE_URL")?,
            database_max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 10),
            redis_url: optional("REDIS_URL"),
            jwt_secret: env::var("JWT_SECRET")?,
            jwt_expiration_secs: jwt_expiration * 3600,
            bcrypt_cost: parse_or("BCRYPT_COST", bcrypt::DEFAULT_COST),
            rate_limit_window_secs: parse_or("RATE_LIMIT_WINDOW", 60),
            rate_limit_requests: parse_or("RATE_LIMIT_REQUESTS", 100),
            server_host: optional("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            server_port: parse_or("SERVER_PORT", 3000),
            api_base_uri: optional("API_BASE_URI").unwrap_or_else(|| "/api".into()),
            client_url: optional("CLIENT_URL")
                .unwrap_or_else(|| "http://localhost:5173".into()),
            webhooks: WebhookConfig {
                user_url: optional("USER_WEBHOOK_URL"),
                recipe_url: optional("RECIPE_WEBHOOK_URL"),
                review_url: optional("REVIEW_WEBHOOK_URL"),
                contact_url: optional("CONTACT_WEBHOOK_URL"),
            },
        })
    }

    pub fn jwt_expiration(&self) -> Duration {
        Duration::from_secs(self.jwt_expiration_secs)
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }

    /// 测试和本地开发用的配置，不读取环境变量
    pub fn for_tests(jwt_secret: &str) -> Self {
        Config {
            database_url: String::new(),
            database_max_connections: 1,
            redis_url: None,
            jwt_secret: jwt_secret.to_string(),
            jwt_expiration_secs: 3600,
            bcrypt_cost: 4,
            rate_limit_window_secs: 60,
            rate_limit_requests: 100,
            server_host: "127.0.0.1".into(),
            server_port: 0,
            api_base_uri: "/api".into(),
            client_url: "http://localhost:5173".into(),
            webhooks: WebhookConfig::default(),
        }
    }
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    optional(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_durations() {
        let config = Config::for_tests("secret");
        assert_eq!(config.jwt_expiration(), Duration::from_secs(3600));
        assert_eq!(config.rate_limit_window(), Duration::from_secs(60));
        assert!(config.redis_url.is_none());
    }
}
