use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub session: SessionConfig,
    pub security: SecurityConfig,
    pub pagination: PaginationConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub secret: String,
    pub expiration_hours: i64,
    pub cookie_name: String,
    pub cookie_secure: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    pub password_hash_cost: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaginationConfig {
    pub groups_per_page: u64,
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parsed_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenv::dotenv().ok();

        Ok(Config {
            server: ServerConfig {
                host: var_or("SERVER_HOST", "0.0.0.0"),
                port: parsed_or("SERVER_PORT", 8080),
            },
            database: DatabaseConfig {
                url: var_or("DATABASE_URL", "sqlite://community.db?mode=rwc"),
                max_connections: parsed_or("DATABASE_MAX_CONNECTIONS", 5),
            },
            session: SessionConfig {
                secret: var_or("SESSION_SECRET", "your-secret-key-change-this"),
                expiration_hours: parsed_or("SESSION_EXPIRATION_HOURS", 24 * 14),
                cookie_name: var_or("SESSION_COOKIE_NAME", "sessionid"),
                cookie_secure: parsed_or("SESSION_COOKIE_SECURE", false),
            },
            security: SecurityConfig {
                password_hash_cost: parsed_or("PASSWORD_HASH_COST", bcrypt::DEFAULT_COST),
            },
            pagination: PaginationConfig {
                groups_per_page: parsed_or("GROUPS_PER_PAGE", 5u64).max(1),
            },
        })
    }

    pub fn is_in_memory_database(&self) -> bool {
        self.database.url.contains(":memory:")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unparseable_numbers_fall_back_to_default() {
        env::set_var("COMMUNITY_TEST_PORT", "not-a-number");
        assert_eq!(parsed_or("COMMUNITY_TEST_PORT", 8080u16), 8080);

        env::set_var("COMMUNITY_TEST_PORT", " 9090 ");
        assert_eq!(parsed_or("COMMUNITY_TEST_PORT", 8080u16), 9090);
    }

    #[test]
    fn in_memory_database_is_detected() {
        let mut config = Config::from_env().unwrap();
        config.database.url = "sqlite::memory:".to_string();
        assert!(config.is_in_memory_database());

        config.database.url = "sqlite://community.db?mode=rwc".to_string();
        assert!(!config.is_in_memory_database());
    }
}
