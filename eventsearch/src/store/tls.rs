//! Custom TLS settings for MySQL connections
//!
//! The settings arrive as a query string, for example
//! `root_cert=/etc/ssl/ca.pem&client_cert=/etc/ssl/client.pem&client_key=/etc/ssl/client.key&tls_mode=1`.
//! Certificate files are read and PEM-parsed up front so a bad path fails
//! at startup rather than on the first connection.

use rustls_pemfile::{certs, private_key};
use sqlx::mysql::{MySqlConnectOptions, MySqlSslMode};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Parsed custom TLS configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomTlsConfig {
    /// CA bundle used to verify the server
    pub root_cert: Option<PathBuf>,
    /// Client certificate chain
    pub client_cert: Option<PathBuf>,
    /// Client private key
    pub client_key: Option<PathBuf>,
    /// Skip server certificate verification (`tls_mode=1`)
    pub skip_verify: bool,
}

impl CustomTlsConfig {
    /// Parse the query-string form; an empty string means no custom TLS
    pub fn parse(raw: &str) -> Result<Option<Self>> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        if !raw.contains('=') {
            return Err(Error::Tls(format!("unable to parse tls config {:?}", raw)));
        }

        let mut config = Self::default();
        for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
            let path = (!value.is_empty()).then(|| PathBuf::from(&*value));
            match &*key {
                "root_cert" => config.root_cert = path,
                "client_cert" => config.client_cert = path,
                "client_key" => config.client_key = path,
                "tls_mode" => config.skip_verify = value == "1",
                other => tracing::debug!(key = other, "Ignoring unknown custom TLS key"),
            }
        }
        Ok(Some(config))
    }

    /// The client certificate and key, when both are set
    pub fn client_identity(&self) -> Option<(&Path, &Path)> {
        match (&self.client_cert, &self.client_key) {
            (Some(cert), Some(key)) => Some((cert.as_path(), key.as_path())),
            _ => None,
        }
    }

    /// Read and parse every referenced PEM file
    pub fn validate(&self) -> Result<()> {
        if let Some(root) = &self.root_cert {
            load_certificates(root)
                .map_err(|e| Error::Tls(format!("unable to load root certificate: {}", e)))?;
        }
        if let Some((cert, key)) = self.client_identity() {
            load_certificates(cert).and_then(|_| load_private_key(key)).map_err(|e| {
                Error::Tls(format!(
                    "unable to load key pair {:?}, {:?}: {}",
                    cert, key, e
                ))
            })?;
        }
        Ok(())
    }

    /// Apply the settings to MySQL connect options
    pub fn apply(&self, mut options: MySqlConnectOptions) -> MySqlConnectOptions {
        options = options.ssl_mode(if self.skip_verify {
            MySqlSslMode::Required
        } else {
            MySqlSslMode::VerifyIdentity
        });
        if let Some(root) = &self.root_cert {
            options = options.ssl_ca(root);
        }
        if let Some((cert, key)) = self.client_identity() {
            options = options.ssl_client_cert(cert).ssl_client_key(key);
        }
        options
    }
}

fn open(path: &Path) -> std::result::Result<BufReader<File>, String> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|e| format!("{:?}: {}", path, e))
}

fn load_certificates(path: &Path) -> std::result::Result<usize, String> {
    let mut reader = open(path)?;
    let chain = certs(&mut reader)
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| format!("{:?}: {}", path, e))?;
    if chain.is_empty() {
        return Err(format!("{:?} contains no certificates", path));
    }
    Ok(chain.len())
}

fn load_private_key(path: &Path) -> std::result::Result<(), String> {
    let mut reader = open(path)?;
    private_key(&mut reader)
        .map_err(|e| format!("{:?}: {}", path, e))?
        .ok_or_else(|| format!("{:?} contains no private key", path))?;
    Ok(())
}
