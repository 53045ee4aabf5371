//! persist-config — loads the external JSON configuration file described
//! in SPEC_FULL.md §6.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Similarity thresholds, overridable per SPEC_FULL.md §4.C / §9.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimilarityThresholds {
    pub publication_title: f64,
    pub author_name: f64,
    pub interest_name: f64,
    pub journal_title: f64,
    pub conference_acronym: f64,
}

impl Default for SimilarityThresholds {
    fn default() -> Self {
        Self {
            publication_title: 0.87,
            author_name: 0.70,
            interest_name: 0.80,
            journal_title: 0.75,
            conference_acronym: 0.94,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PersistConfig {
    pub db_url: String,
    pub db_port: u16,
    pub db_name: String,
    pub db_user: String,
    pub db_password: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_max_unactive_connection_seconds")]
    pub max_unactive_connection_seconds: u64,

    #[serde(default = "default_unactive_conn_listen_seconds")]
    pub unactive_conn_listen_seconds: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_delay_secs")]
    pub delay_secs: f64,

    #[serde(default = "default_bind_host")]
    pub bind_host: String,

    #[serde(default = "default_bind_port")]
    pub bind_port: u16,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default = "default_log_file_prefix")]
    pub log_file_prefix: String,

    #[serde(default = "default_log_max_lines")]
    pub log_max_lines: u64,

    #[serde(default)]
    pub similarity: SimilarityThresholds,

    #[serde(default = "default_deadletter_path")]
    pub deadletter_path: String,
}

fn default_max_connections() -> u32 {
    128
}
fn default_max_unactive_connection_seconds() -> u64 {
    1200
}
fn default_unactive_conn_listen_seconds() -> u64 {
    60
}
fn default_max_retries() -> u32 {
    3
}
fn default_delay_secs() -> f64 {
    2.0
}
fn default_bind_host() -> String {
    "0.0.0.0".to_string()
}
fn default_bind_port() -> u16 {
    5151
}
fn default_log_dir() -> String {
    "./logs".to_string()
}
fn default_log_file_prefix() -> String {
    "persist".to_string()
}
fn default_log_max_lines() -> u64 {
    100_000
}
fn default_deadletter_path() -> String {
    "persister.errors.json".to_string()
}

impl PersistConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn postgres_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.db_user, self.db_password, self.db_url, self.db_port, self.db_name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_in_missing_keys() {
        let json = r#"{
            "db_url": "localhost",
            "db_port": 5432,
            "db_name": "persist",
            "db_user": "persist",
            "db_password": "secret"
        }"#;
        let cfg: PersistConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.max_retries, 3);
        assert_eq!(cfg.bind_port, 5151);
        assert_eq!(cfg.similarity.publication_title, 0.87);
    }

    #[test]
    fn postgres_url_is_well_formed() {
        let json = r#"{
            "db_url": "db.internal",
            "db_port": 5432,
            "db_name": "persist",
            "db_user": "u",
            "db_password": "p"
        }"#;
        let cfg: PersistConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.postgres_url(), "postgres://u:p@db.internal:5432/persist");
    }
}
