//! Configuration management
//!
//! This module handles loading and parsing configuration for the IDEAL platform.
//! Configuration can be loaded from:
//! - config.yml file
//! - Environment variables (override file settings)
//!
//! Missing optional values are filled with sensible defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Backend REST API configuration
    #[serde(default)]
    pub backend: BackendConfig,
    /// Session configuration
    #[serde(default)]
    pub session: SessionConfig,
    /// Response cache configuration
    #[serde(default)]
    pub cache: CacheConfig,
    /// Upload configuration
    #[serde(default)]
    pub upload: UploadConfig,
    /// View (template) configuration
    #[serde(default)]
    pub views: ViewsConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Backend REST API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the API, with trailing slash
    #[serde(default = "default_backend_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_backend_timeout")]
    pub timeout_seconds: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_backend_url(),
            timeout_seconds: default_backend_timeout(),
        }
    }
}

fn default_backend_url() -> String {
    "http://127.0.0.1:8000/api/".to_string()
}

fn default_backend_timeout() -> u64 {
    30
}

impl BackendConfig {
    /// Base URL guaranteed to end with a slash so relative joins keep the path
    pub fn normalized_base_url(&self) -> String {
        if self.base_url.ends_with('/') {
            self.base_url.clone()
        } else {
            format!("{}/", self.base_url)
        }
    }
}

/// Session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Name of the session cookie
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Session lifetime in seconds
    #[serde(default = "default_session_ttl")]
    pub ttl_seconds: u64,
    /// Mark cookies as Secure (HTTPS deployments)
    #[serde(default)]
    pub secure: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            ttl_seconds: default_session_ttl(),
            secure: false,
        }
    }
}

fn default_cookie_name() -> String {
    "ideal_session".to_string()
}

fn default_session_ttl() -> u64 {
    8 * 60 * 60
}

/// Response cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// TTL of cached public listings in seconds (0 disables caching)
    #[serde(default = "default_cache_ttl")]
    pub ttl_seconds: u64,
    /// Maximum number of cached entries
    #[serde(default = "default_cache_capacity")]
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_cache_ttl(),
            max_capacity: default_cache_capacity(),
        }
    }
}

fn default_cache_ttl() -> u64 {
    60
}

fn default_cache_capacity() -> u64 {
    1_000
}

/// Upload configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Maximum file size in bytes (default: 10MB)
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    /// Allowed image MIME types (event and ad pictures)
    #[serde(default = "default_image_types")]
    pub image_types: Vec<String>,
    /// Allowed attachment MIME types (annonce attachments)
    #[serde(default = "default_attachment_types")]
    pub attachment_types: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size: default_max_file_size(),
            image_types: default_image_types(),
            attachment_types: default_attachment_types(),
        }
    }
}

fn default_max_file_size() -> u64 {
    10 * 1024 * 1024 // 10MB
}

fn default_image_types() -> Vec<String> {
    vec!["image/jpeg".to_string(), "image/png".to_string()]
}

fn default_attachment_types() -> Vec<String> {
    vec![
        "application/pdf".to_string(),
        "image/jpeg".to_string(),
        "image/png".to_string(),
        "application/msword".to_string(),
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document".to_string(),
    ]
}

impl UploadConfig {
    /// Check if an image MIME type is allowed
    pub fn is_image_allowed(&self, mime_type: &str) -> bool {
        self.image_types.iter().any(|t| t == mime_type)
    }

    /// Check if an attachment MIME type is allowed
    pub fn is_attachment_allowed(&self, mime_type: &str) -> bool {
        self.attachment_types.iter().any(|t| t == mime_type)
    }
}

/// View configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewsConfig {
    /// Site name shown in the header and page titles
    #[serde(default = "default_site_name")]
    pub site_name: String,
    /// Directory whose templates override the embedded ones
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Default for ViewsConfig {
    fn default() -> Self {
        Self {
            site_name: default_site_name(),
            path: None,
        }
    }
}

fn default_site_name() -> String {
    "IDEAL Platform".to_string()
}

/// Error type for configuration parsing
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {message}")]
    ParseError { path: String, message: String },
}

impl Config {
    /// Load configuration from file
    ///
    /// If the file doesn't exist, returns default configuration.
    /// If the file exists but is invalid YAML, returns an error with details.
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            source: e,
        })?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: format_yaml_error(&e),
        })
    }

    /// Load configuration from file with environment variable overrides
    ///
    /// Environment variables follow the pattern:
    /// - IDEAL_SERVER_HOST
    /// - IDEAL_SERVER_PORT
    /// - IDEAL_BACKEND_URL
    /// - IDEAL_BACKEND_TIMEOUT_SECONDS
    /// - IDEAL_SESSION_TTL_SECONDS
    /// - IDEAL_SESSION_SECURE
    /// - IDEAL_CACHE_TTL_SECONDS
    /// - IDEAL_VIEWS_PATH
    pub fn load_with_env(path: &std::path::Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply overrides from a key lookup (the process environment in production)
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(host) = lookup("IDEAL_SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("IDEAL_SERVER_PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }

        if let Some(url) = lookup("IDEAL_BACKEND_URL") {
            self.backend.base_url = url;
        }
        if let Some(timeout) = lookup("IDEAL_BACKEND_TIMEOUT_SECONDS").and_then(|t| t.parse().ok()) {
            self.backend.timeout_seconds = timeout;
        }

        if let Some(ttl) = lookup("IDEAL_SESSION_TTL_SECONDS").and_then(|t| t.parse().ok()) {
            self.session.ttl_seconds = ttl;
        }
        if let Some(secure) = lookup("IDEAL_SESSION_SECURE") {
            match secure.to_lowercase().as_str() {
                "1" | "true" | "yes" => self.session.secure = true,
                "0" | "false" | "no" => self.session.secure = false,
                _ => {} // Ignore invalid values
            }
        }

        if let Some(ttl) = lookup("IDEAL_CACHE_TTL_SECONDS").and_then(|t| t.parse().ok()) {
            self.cache.ttl_seconds = ttl;
        }

        if let Some(path) = lookup("IDEAL_VIEWS_PATH") {
            self.views.path = Some(PathBuf::from(path));
        }
    }
}

/// Format YAML parsing error with location and context
fn format_yaml_error(e: &serde_yaml::Error) -> String {
    if let Some(location) = e.location() {
        format!(
            "at line {}, column {}: {}",
            location.line(),
            location.column(),
            e
        )
    } else {
        e.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_returns_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load(&temp_dir.path().join("config.yml")).unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.backend.base_url, "http://127.0.0.1:8000/api/");
        assert_eq!(config.session.cookie_name, "ideal_session");
        assert_eq!(config.views.site_name, "IDEAL Platform");
    }

    #[test]
    fn test_empty_file_returns_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yml");
        fs::write(&path, "   \n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.cache.ttl_seconds, 60);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yml");
        fs::write(
            &path,
            "server:\n  port: 9000\nbackend:\n  base_url: https://api.example.com/api/\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.backend.base_url, "https://api.example.com/api/");
        assert_eq!(config.backend.timeout_seconds, 30);
    }

    #[test]
    fn test_invalid_yaml_reports_location() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yml");
        fs::write(&path, "server:\n  port: [not a port\n").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
        assert!(err.to_string().contains("line"));
    }

    #[test]
    fn test_overrides_apply_and_ignore_garbage() {
        let vars: HashMap<&str, &str> = [
            ("IDEAL_SERVER_PORT", "3000"),
            ("IDEAL_BACKEND_URL", "http://backend:8000/api"),
            ("IDEAL_SESSION_SECURE", "true"),
            ("IDEAL_CACHE_TTL_SECONDS", "not-a-number"),
            ("IDEAL_VIEWS_PATH", "/srv/views"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.backend.base_url, "http://backend:8000/api");
        assert!(config.session.secure);
        assert_eq!(config.cache.ttl_seconds, 60);
        assert_eq!(config.views.path, Some(PathBuf::from("/srv/views")));
    }

    #[test]
    fn test_normalized_base_url_appends_slash() {
        let mut backend = BackendConfig::default();
        backend.base_url = "http://backend:8000/api".to_string();
        assert_eq!(backend.normalized_base_url(), "http://backend:8000/api/");

        backend.base_url = "http://backend:8000/api/".to_string();
        assert_eq!(backend.normalized_base_url(), "http://backend:8000/api/");
    }

    #[test]
    fn test_upload_type_checks() {
        let upload = UploadConfig::default();
        assert!(upload.is_image_allowed("image/png"));
        assert!(!upload.is_image_allowed("image/gif"));
        assert!(upload.is_attachment_allowed("application/pdf"));
        assert!(!upload.is_attachment_allowed("application/x-msdownload"));
    }
}
