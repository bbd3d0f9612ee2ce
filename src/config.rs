//! Configuration Management
//!
//! Handles persistent identity configuration for gbooks. The service
//! account email and impersonated subject are never compiled in; they come
//! from CLI flags, environment variables, or this config file.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Service account email (JWT issuer)
    #[serde(default)]
    pub client_email: Option<String>,
    /// User email to impersonate
    #[serde(default)]
    pub subject: Option<String>,
    /// Path to the PEM private key file
    #[serde(default)]
    pub key_file: Option<PathBuf>,
}

impl Config {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("gbooks").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };

        // Create parent directory
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)?;

        Ok(())
    }

    /// Get effective service account email (env > config file)
    pub fn effective_client_email(&self) -> Option<String> {
        if let Ok(email) = std::env::var("GBOOKS_CLIENT_EMAIL") {
            if !email.is_empty() {
                return Some(email);
            }
        }
        self.client_email.clone()
    }

    /// Get effective impersonation subject (env > config file)
    pub fn effective_subject(&self) -> Option<String> {
        if let Ok(subject) = std::env::var("GBOOKS_SUBJECT") {
            if !subject.is_empty() {
                return Some(subject);
            }
        }
        self.subject.clone()
    }

    /// Get effective key file path (env > config file > key.pem)
    pub fn effective_key_file(&self) -> PathBuf {
        if let Ok(path) = std::env::var("GBOOKS_KEY_FILE") {
            if !path.is_empty() {
                return PathBuf::from(path);
            }
        }
        self.key_file
            .clone()
            .unwrap_or_else(|| PathBuf::from("key.pem"))
    }
}
