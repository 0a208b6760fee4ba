use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use tracing::{info, warn};

pub const DEFAULT_DOCUMENT_ID: &str = "xyz";

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub source_pdf_path: PathBuf,
    pub document_paths: BTreeMap<String, PathBuf>,
    pub cors_allowed_origin: String,
    pub max_body_size_kb: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let source_pdf_path = PathBuf::from(env::var("SOURCE_PDF_PATH").unwrap_or_else(|_| {
            info!("SOURCE_PDF_PATH not set, using default: document.pdf");
            "document.pdf".to_string()
        }));

        let document_paths = match env::var("DOCUMENT_PATHS") {
            Ok(raw) => Self::parse_document_paths(&raw).context("Failed to parse DOCUMENT_PATHS")?,
            Err(_) => {
                info!(
                    "DOCUMENT_PATHS not set, mapping '{}' to the source PDF",
                    DEFAULT_DOCUMENT_ID
                );
                BTreeMap::from([(DEFAULT_DOCUMENT_ID.to_string(), source_pdf_path.clone())])
            }
        };

        // PORT takes precedence for hosting platforms that inject it
        let server_port = match env::var("PORT") {
            Ok(_) => Self::parse_env_var("PORT", 8000).context("Failed to parse PORT")?,
            Err(_) => Self::parse_env_var("SERVER_PORT", 8000)
                .context("Failed to parse SERVER_PORT")?,
        };

        let config = Config {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| {
                info!("SERVER_HOST not set, using default: 0.0.0.0");
                "0.0.0.0".to_string()
            }),
            server_port,
            source_pdf_path,
            document_paths,
            cors_allowed_origin: env::var("CORS_ALLOWED_ORIGIN").unwrap_or_else(|_| {
                info!("CORS_ALLOWED_ORIGIN not set, using default: http://localhost:3000");
                "http://localhost:3000".to_string()
            }),
            max_body_size_kb: Self::parse_env_var("MAX_BODY_SIZE_KB", 64)
                .context("Failed to parse MAX_BODY_SIZE_KB")?,
        };

        config.validate()?;

        info!("Configuration loaded successfully: {:?}", config);
        Ok(config)
    }

    /// Builds a configuration serving a single file, with defaults for
    /// everything else. The file is registered under [`DEFAULT_DOCUMENT_ID`].
    pub fn for_source(source_pdf_path: impl Into<PathBuf>) -> Self {
        let source_pdf_path = source_pdf_path.into();
        Config {
            server_host: "127.0.0.1".to_string(),
            server_port: 8000,
            document_paths: BTreeMap::from([(
                DEFAULT_DOCUMENT_ID.to_string(),
                source_pdf_path.clone(),
            )]),
            source_pdf_path,
            cors_allowed_origin: "http://localhost:3000".to_string(),
            max_body_size_kb: 64,
        }
    }

    fn parse_env_var<T>(var_name: &str, default: T) -> Result<T>
    where
        T: std::str::FromStr + Copy + std::fmt::Debug,
        T::Err: std::fmt::Display,
    {
        match env::var(var_name) {
            Ok(val) => match val.parse() {
                Ok(parsed) => Ok(parsed),
                Err(e) => {
                    warn!("Failed to parse {}: {} (using default: {:?})", var_name, e, default);
                    Ok(default)
                }
            },
            Err(_) => {
                info!("{} not set, using default: {:?}", var_name, default);
                Ok(default)
            }
        }
    }

    /// Parses `id=path` pairs separated by commas. Empty segments are skipped.
    pub fn parse_document_paths(raw: &str) -> Result<BTreeMap<String, PathBuf>> {
        let mut paths = BTreeMap::new();
        for entry in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let (id, path) = entry
                .split_once('=')
                .ok_or_else(|| anyhow::anyhow!("Expected id=path, got '{}'", entry))?;
            let (id, path) = (id.trim(), path.trim());
            if id.is_empty() || path.is_empty() {
                return Err(anyhow::anyhow!("Empty document id or path in '{}'", entry));
            }
            if paths.insert(id.to_string(), PathBuf::from(path)).is_some() {
                warn!(document_id = id, "Duplicate document id, keeping the last path");
            }
        }
        Ok(paths)
    }

    fn validate(&self) -> Result<()> {
        if self.server_port == 0 {
            return Err(anyhow::anyhow!("SERVER_PORT must be greater than 0"));
        }
        if self.max_body_size_kb == 0 {
            return Err(anyhow::anyhow!("MAX_BODY_SIZE_KB must be greater than 0"));
        }
        if self.source_pdf_path.as_os_str().is_empty() {
            return Err(anyhow::anyhow!("SOURCE_PDF_PATH must not be empty"));
        }
        HeaderValue::from_str(&self.cors_allowed_origin)
            .context("CORS_ALLOWED_ORIGIN is not a valid header value")?;
        if !self.source_pdf_path.exists() {
            warn!(
                path = %self.source_pdf_path.display(),
                "Source PDF does not exist yet; page endpoints will answer 400 until it does"
            );
        }
        Ok(())
    }

    pub fn document_path(&self, document_id: &str) -> Option<&Path> {
        self.document_paths.get(document_id).map(PathBuf::as_path)
    }

    pub fn max_body_size_bytes(&self) -> usize {
        self.max_body_size_kb * 1024
    }
}
