use crate::{env_or_default, env_parse, ConfigError, FromEnv};

/// Settings for the interactive API documentation.
#[derive(Clone, Debug)]
pub struct DocsConfig {
    pub enabled: bool,
    /// Path serving the Swagger UI
    pub path: String,
    /// Path serving the generated OpenAPI JSON document
    pub json_url: String,
}

impl FromEnv for DocsConfig {
    /// - DOCS_ENABLED: defaults to true
    /// - DOCS_PATH: defaults to `/swagger-ui`
    /// - DOCS_JSON_URL: defaults to `/api-docs/openapi.json`
    fn from_env() -> Result<Self, ConfigError> {
        let enabled = env_parse("DOCS_ENABLED", "true")?;
        let path = env_or_default("DOCS_PATH", "/swagger-ui");
        let json_url = env_or_default("DOCS_JSON_URL", "/api-docs/openapi.json");

        for (key, value) in [("DOCS_PATH", &path), ("DOCS_JSON_URL", &json_url)] {
            if !value.starts_with('/') {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    details: format!("'{}' must start with '/'", value),
                });
            }
        }

        Ok(Self {
            enabled,
            path,
            json_url,
        })
    }
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/swagger-ui".to_string(),
            json_url: "/api-docs/openapi.json".to_string(),
        }
    }
}
