use crate::{env_or_default, ConfigError, FromEnv};

const DEFAULT_PREFIX: &str = "/api";

/// Where the REST routes are mounted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiConfig {
    /// Always starts with `/` and never ends with one, e.g. `/api` or `/blog/v1`.
    pub prefix: String,
}

impl ApiConfig {
    pub fn new(prefix: &str) -> Result<Self, ConfigError> {
        let trimmed = prefix.trim().trim_matches('/');
        if trimmed.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "API_PREFIX".to_string(),
                details: "prefix cannot be empty or '/'".to_string(),
            });
        }
        Ok(Self {
            prefix: format!("/{}", trimmed),
        })
    }
}

impl FromEnv for ApiConfig {
    /// - API_PREFIX: defaults to `/api`
    fn from_env() -> Result<Self, ConfigError> {
        Self::new(&env_or_default("API_PREFIX", DEFAULT_PREFIX))
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_config_default_prefix() {
        temp_env::with_var_unset("API_PREFIX", || {
            assert_eq!(ApiConfig::from_env().unwrap().prefix, "/api");
        });
    }

    #[test]
    fn test_api_config_normalises_slashes() {
        assert_eq!(ApiConfig::new("blog/v1/").unwrap().prefix, "/blog/v1");
        assert_eq!(ApiConfig::new("/api").unwrap().prefix, "/api");
    }

    #[test]
    fn test_api_config_rejects_root() {
        temp_env::with_var("API_PREFIX", Some("/"), || {
            let err = ApiConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("API_PREFIX"));
        });
    }
}
