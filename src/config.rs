use std::collections::HashMap;
use thiserror::Error;

use crate::datasource::NotionConfig;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_path: String,
    pub record_store_url: String,
    pub record_store_token: String,
    pub record_store_database_id: String,
    pub record_store_version: String,
    pub identity_url: String,
    pub identity_api_key: String,
    /// Validity of an issued dashboard session, in seconds.
    pub session_ttl_secs: i64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = env_map
            .get("PORT")
            .map(|s| s.as_str())
            .unwrap_or("8080")
            .parse::<u16>()
            .map_err(|_| {
                ConfigError::InvalidValue("PORT".to_string(), "must be a valid u16".to_string())
            })?;

        let session_ttl_secs = env_map
            .get("SESSION_TTL_SECS")
            .map(|s| s.as_str())
            .unwrap_or("7200")
            .parse::<i64>()
            .ok()
            .filter(|ttl| *ttl > 0)
            .ok_or_else(|| {
                ConfigError::InvalidValue(
                    "SESSION_TTL_SECS".to_string(),
                    "must be a positive integer".to_string(),
                )
            })?;

        Ok(Config {
            port,
            database_path: required(&env_map, "DATABASE_PATH")?,
            record_store_url: env_map
                .get("RECORD_STORE_URL")
                .cloned()
                .unwrap_or_else(|| "https://api.notion.com".to_string()),
            record_store_token: required(&env_map, "RECORD_STORE_TOKEN")?,
            record_store_database_id: required(&env_map, "RECORD_STORE_DATABASE_ID")?,
            record_store_version: env_map
                .get("RECORD_STORE_VERSION")
                .cloned()
                .unwrap_or_else(|| "2022-06-28".to_string()),
            identity_url: required(&env_map, "IDENTITY_URL")?,
            identity_api_key: required(&env_map, "IDENTITY_API_KEY")?,
            session_ttl_secs,
        })
    }

    pub fn notion(&self) -> NotionConfig {
        NotionConfig {
            base_url: self.record_store_url.clone(),
            token: self.record_store_token.clone(),
            database_id: self.record_store_database_id.clone(),
            api_version: self.record_store_version.clone(),
        }
    }
}

fn required(env_map: &HashMap<String, String>, key: &str) -> Result<String, ConfigError> {
    env_map
        .get(key)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ConfigError::MissingEnv(key.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_required_env() -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert("DATABASE_PATH".to_string(), "/tmp/test.db".to_string());
        map.insert("RECORD_STORE_TOKEN".to_string(), "secret_abc".to_string());
        map.insert("RECORD_STORE_DATABASE_ID".to_string(), "db123".to_string());
        map.insert(
            "IDENTITY_URL".to_string(),
            "https://project.supabase.co".to_string(),
        );
        map.insert("IDENTITY_API_KEY".to_string(), "anon-key".to_string());
        map
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_env_map(setup_required_env()).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.record_store_url, "https://api.notion.com");
        assert_eq!(config.record_store_version, "2022-06-28");
        assert_eq!(config.session_ttl_secs, 7200);
    }

    #[test]
    fn test_notion_config_from_env() {
        let mut env_map = setup_required_env();
        env_map.insert("RECORD_STORE_URL".to_string(), "http://localhost:9999".to_string());
        let notion = Config::from_env_map(env_map).unwrap().notion();
        assert_eq!(notion.base_url, "http://localhost:9999");
        assert_eq!(notion.token, "secret_abc");
        assert_eq!(notion.database_id, "db123");
    }

    #[test]
    fn test_missing_required_vars() {
        for key in [
            "DATABASE_PATH",
            "RECORD_STORE_TOKEN",
            "RECORD_STORE_DATABASE_ID",
            "IDENTITY_URL",
            "IDENTITY_API_KEY",
        ] {
            let mut env_map = setup_required_env();
            env_map.remove(key);
            match Config::from_env_map(env_map) {
                Err(ConfigError::MissingEnv(s)) => assert_eq!(s, key),
                _ => panic!("Expected MissingEnv error for {}", key),
            }
        }
    }

    #[test]
    fn test_blank_required_var_is_missing() {
        let mut env_map = setup_required_env();
        env_map.insert("IDENTITY_API_KEY".to_string(), "   ".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::MissingEnv(s)) => assert_eq!(s, "IDENTITY_API_KEY"),
            _ => panic!("Expected MissingEnv error"),
        }
    }

    #[test]
    fn test_invalid_port() {
        let mut env_map = setup_required_env();
        env_map.insert("PORT".to_string(), "not_a_number".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "PORT"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_invalid_session_ttl() {
        for bad in ["0", "-5", "two hours"] {
            let mut env_map = setup_required_env();
            env_map.insert("SESSION_TTL_SECS".to_string(), bad.to_string());
            match Config::from_env_map(env_map) {
                Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "SESSION_TTL_SECS"),
                _ => panic!("Expected InvalidValue error for {}", bad),
            }
        }
    }
}
