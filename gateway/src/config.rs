// Copyright 2024-2026 KERP Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Gateway configuration: serde-deserialized TOML with environment
//! overrides. Unknown keys are ignored so deployments can carry settings
//! for collaborating services in the same file.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use kedi_edi::{ConnectionConfig, InsuranceType, ProtocolConfig};
use kedi_providers::ProviderConfig;

/// Config error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Could not parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("aria_encryption_key is not valid hex: {0}")]
    BadKey(hex::FromHexError),
    #[error("Invalid value for {key}: {value}")]
    BadEnv { key: &'static str, value: String },
    #[error("Failed to initialize provider: {0}")]
    Provider(#[from] kedi_edi::Error),
}

/// Log output style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Console,
}

/// One authority's EDI endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthorityEndpoint {
    pub host: String,
    pub port: u16,
    /// Per-operation timeout in seconds.
    pub timeout: u64,
}

impl Default for AuthorityEndpoint {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 9100,
            timeout: 30,
        }
    }
}

impl AuthorityEndpoint {
    fn with_host(host: &str) -> Self {
        Self {
            host: host.to_string(),
            ..Self::default()
        }
    }
}

/// Signer and cipher material.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CryptoSettings {
    /// ARIA key as hex; encryption is disabled when unset.
    pub aria_encryption_key: Option<String>,
    pub cert_path: Option<PathBuf>,
    pub private_key_path: Option<PathBuf>,
    pub public_key_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service_name: String,
    pub service_version: String,
    pub environment: String,

    pub grpc_host: String,
    pub grpc_port: u16,
    pub grpc_max_workers: usize,

    pub log_level: String,
    pub log_format: LogFormat,

    /// Sessions per authority pool.
    pub pool_size: usize,

    pub nps: AuthorityEndpoint,
    pub nhis: AuthorityEndpoint,
    pub ei: AuthorityEndpoint,

    pub crypto: CryptoSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "kedi-gateway".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            environment: "development".to_string(),
            grpc_host: "0.0.0.0".to_string(),
            grpc_port: 50052,
            grpc_max_workers: 10,
            log_level: "info".to_string(),
            log_format: LogFormat::Json,
            pool_size: 5,
            nps: AuthorityEndpoint::with_host("edi.nps.or.kr"),
            nhis: AuthorityEndpoint::with_host("edi.nhis.or.kr"),
            ei: AuthorityEndpoint::with_host("edi.comwel.or.kr"),
            crypto: CryptoSettings::default(),
        }
    }
}

impl Config {
    /// Defaults, an optional TOML file, then environment overrides, in
    /// increasing precedence.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
                toml::from_str(&text)?
            }
            None => Self::default(),
        };
        config.apply_env()?;
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<(), ConfigError> {
        fn var(key: &'static str) -> Option<String> {
            env::var(key).ok().filter(|v| !v.is_empty())
        }
        fn parsed<T: std::str::FromStr>(key: &'static str) -> Result<Option<T>, ConfigError> {
            match var(key) {
                None => Ok(None),
                Some(value) => value
                    .parse()
                    .map(Some)
                    .map_err(|_| ConfigError::BadEnv { key, value }),
            }
        }

        if let Some(v) = var("GRPC_HOST") {
            self.grpc_host = v;
        }
        if let Some(v) = parsed::<u16>("GRPC_PORT")? {
            self.grpc_port = v;
        }
        if let Some(v) = parsed::<usize>("GRPC_MAX_WORKERS")? {
            self.grpc_max_workers = v;
        }
        if let Some(v) = var("ENVIRONMENT") {
            self.environment = v;
        }
        if let Some(v) = var("LOG_LEVEL") {
            self.log_level = v;
        }
        if let Some(v) = var("LOG_FORMAT") {
            self.log_format = match v.as_str() {
                "json" => LogFormat::Json,
                "console" => LogFormat::Console,
                _ => return Err(ConfigError::BadEnv { key: "LOG_FORMAT", value: v }),
            };
        }
        if let Some(v) = parsed::<usize>("EDI_POOL_SIZE")? {
            self.pool_size = v;
        }

        if let Some(v) = var("NPS_EDI_HOST") {
            self.nps.host = v;
        }
        if let Some(v) = parsed::<u16>("NPS_EDI_PORT")? {
            self.nps.port = v;
        }
        if let Some(v) = parsed::<u64>("NPS_EDI_TIMEOUT")? {
            self.nps.timeout = v;
        }
        if let Some(v) = var("NHIS_EDI_HOST") {
            self.nhis.host = v;
        }
        if let Some(v) = parsed::<u16>("NHIS_EDI_PORT")? {
            self.nhis.port = v;
        }
        if let Some(v) = parsed::<u64>("NHIS_EDI_TIMEOUT")? {
            self.nhis.timeout = v;
        }
        if let Some(v) = var("EI_EDI_HOST") {
            self.ei.host = v;
        }
        if let Some(v) = parsed::<u16>("EI_EDI_PORT")? {
            self.ei.port = v;
        }
        if let Some(v) = parsed::<u64>("EI_EDI_TIMEOUT")? {
            self.ei.timeout = v;
        }

        if let Some(v) = var("ARIA_ENCRYPTION_KEY") {
            self.crypto.aria_encryption_key = Some(v);
        }
        if let Some(v) = var("CERT_PATH") {
            self.crypto.cert_path = Some(PathBuf::from(v));
        }
        if let Some(v) = var("PRIVATE_KEY_PATH") {
            self.crypto.private_key_path = Some(PathBuf::from(v));
        }
        if let Some(v) = var("PUBLIC_KEY_PATH") {
            self.crypto.public_key_path = Some(PathBuf::from(v));
        }
        Ok(())
    }

    fn endpoint(&self, insurance: InsuranceType) -> &AuthorityEndpoint {
        match insurance {
            InsuranceType::Nps => &self.nps,
            InsuranceType::Nhis => &self.nhis,
            // Both COMWEL programs share one endpoint.
            InsuranceType::Employment | InsuranceType::WorkersComp => &self.ei,
        }
    }

    /// Provider settings for one authority, with the shared crypto
    /// material applied.
    pub fn provider_config(&self, insurance: InsuranceType) -> Result<ProviderConfig, ConfigError> {
        let endpoint = self.endpoint(insurance);
        let timeout = Duration::from_secs(endpoint.timeout);

        let mut connection = ConnectionConfig::new(endpoint.host.clone(), endpoint.port);
        connection.timeout = timeout;

        let encryption_key = self
            .crypto
            .aria_encryption_key
            .as_deref()
            .map(hex::decode)
            .transpose()
            .map_err(ConfigError::BadKey)?;

        let protocol = ProtocolConfig {
            encryption_enabled: encryption_key.is_some(),
            encryption_key,
            encryption_iv: None,
            signing_enabled: self.crypto.private_key_path.is_some(),
            private_key_path: self.crypto.private_key_path.clone(),
            certificate_path: self.crypto.cert_path.clone(),
            public_key_path: self.crypto.public_key_path.clone(),
            timeout,
            ..ProtocolConfig::default()
        };

        Ok(ProviderConfig {
            connection,
            protocol,
            pool_size: self.pool_size,
        })
    }
}
