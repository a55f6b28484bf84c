// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Environment variable names, defaults, and the typed settings built from
//! them at startup. Loading is split from parsing: every `from_lookup`
//! constructor takes a `Fn(&str) -> Option<String>` so tests never touch the
//! process environment.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `JWT_SECRET` | Shared HMAC secret for token signing and verification | Required |
//! | `JWT_EXPIRATION_MS` | Access token lifetime in milliseconds | Required (identity service) |
//! | `JWT_ISSUER` | Issuer URI placed in and expected from `iss` | `http://identity-service` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Identity service bind port | `8081` |
//! | `GATEWAY_PORT` | Edge gateway bind port | `8080` |
//! | `DOWNSTREAM_URL` | Base URL the gateway forwards to | Required (gateway) |
//! | `TLS_CERT_PATH` / `TLS_KEY_PATH` | PEM files; HTTPS is served when both are set | Unset |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::SocketAddr;
use std::path::PathBuf;

use url::Url;

pub const JWT_SECRET_ENV: &str = "JWT_SECRET";
pub const JWT_EXPIRATION_MS_ENV: &str = "JWT_EXPIRATION_MS";
pub const JWT_ISSUER_ENV: &str = "JWT_ISSUER";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const GATEWAY_PORT_ENV: &str = "GATEWAY_PORT";
pub const DOWNSTREAM_URL_ENV: &str = "DOWNSTREAM_URL";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Issuer used when `JWT_ISSUER` is not set.
pub const DEFAULT_ISSUER: &str = "http://identity-service";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_IDENTITY_PORT: u16 = 8081;
pub const DEFAULT_GATEWAY_PORT: u16 = 8080;

/// Startup configuration failure. Always fatal.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("required environment variable {0} is not set")]
    Missing(&'static str),

    #[error("JWT secret must not be blank")]
    BlankSecret,

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Token settings shared by the issuer and every verifier.
#[derive(Clone)]
pub struct TokenSettings {
    /// Shared secret. Never logged.
    pub secret: String,
    /// Expected (and issued) `iss` claim.
    pub issuer: String,
}

impl std::fmt::Debug for TokenSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSettings")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .finish()
    }
}

impl TokenSettings {
    pub fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup(JWT_SECRET_ENV).ok_or(ConfigurationError::Missing(JWT_SECRET_ENV))?;
        if secret.trim().is_empty() {
            return Err(ConfigurationError::BlankSecret);
        }

        let issuer = lookup(JWT_ISSUER_ENV)
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ISSUER.to_string());
        Url::parse(&issuer).map_err(|e| ConfigurationError::Invalid {
            name: JWT_ISSUER_ENV,
            reason: e.to_string(),
        })?;

        Ok(Self { secret, issuer })
    }
}

/// Optional TLS material. HTTPS is served only when both paths are set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

impl TlsPaths {
    fn from_lookup<F>(lookup: &F) -> Result<Option<Self>, ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        match (lookup(TLS_CERT_PATH_ENV), lookup(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Ok(Some(Self {
                cert: cert.into(),
                key: key.into(),
            })),
            (None, None) => Ok(None),
            (Some(_), None) => Err(ConfigurationError::Missing(TLS_KEY_PATH_ENV)),
            (None, Some(_)) => Err(ConfigurationError::Missing(TLS_CERT_PATH_ENV)),
        }
    }
}

/// Configuration of the identity-owning service.
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    pub token: TokenSettings,
    /// Access token lifetime in milliseconds.
    pub token_lifetime_ms: i64,
    pub bind_addr: SocketAddr,
    pub tls: Option<TlsPaths>,
}

impl IdentityConfig {
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_lookup(&|name: &str| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = TokenSettings::from_lookup(lookup)?;

        let raw_lifetime = lookup(JWT_EXPIRATION_MS_ENV)
            .ok_or(ConfigurationError::Missing(JWT_EXPIRATION_MS_ENV))?;
        let token_lifetime_ms: i64 =
            raw_lifetime
                .trim()
                .parse()
                .map_err(|_| ConfigurationError::Invalid {
                    name: JWT_EXPIRATION_MS_ENV,
                    reason: format!("'{raw_lifetime}' is not a whole number of milliseconds"),
                })?;
        if token_lifetime_ms <= 0 {
            return Err(ConfigurationError::Invalid {
                name: JWT_EXPIRATION_MS_ENV,
                reason: "lifetime must be positive".to_string(),
            });
        }

        Ok(Self {
            token,
            token_lifetime_ms,
            bind_addr: bind_addr(lookup, PORT_ENV, DEFAULT_IDENTITY_PORT)?,
            tls: TlsPaths::from_lookup(lookup)?,
        })
    }
}

/// Configuration of the edge gateway.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub token: TokenSettings,
    pub downstream: Url,
    pub bind_addr: SocketAddr,
    pub tls: Option<TlsPaths>,
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_lookup(&|name: &str| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = TokenSettings::from_lookup(lookup)?;

        let raw_downstream =
            lookup(DOWNSTREAM_URL_ENV).ok_or(ConfigurationError::Missing(DOWNSTREAM_URL_ENV))?;
        let downstream = Url::parse(&raw_downstream).map_err(|e| ConfigurationError::Invalid {
            name: DOWNSTREAM_URL_ENV,
            reason: e.to_string(),
        })?;
        if !matches!(downstream.scheme(), "http" | "https") {
            return Err(ConfigurationError::Invalid {
                name: DOWNSTREAM_URL_ENV,
                reason: format!("unsupported scheme '{}'", downstream.scheme()),
            });
        }

        Ok(Self {
            token,
            downstream,
            bind_addr: bind_addr(lookup, GATEWAY_PORT_ENV, DEFAULT_GATEWAY_PORT)?,
            tls: TlsPaths::from_lookup(lookup)?,
        })
    }
}

fn bind_addr<F>(lookup: &F, port_env: &'static str, default_port: u16) -> Result<SocketAddr, ConfigurationError>
where
    F: Fn(&str) -> Option<String>,
{
    let host = lookup(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
    let port = match lookup(port_env) {
        Some(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigurationError::Invalid {
            name: port_env,
            reason: format!("'{raw}' is not a valid port"),
        })?,
        None => default_port,
    };

    format!("{host}:{port}")
        .parse()
        .map_err(|_| ConfigurationError::Invalid {
            name: HOST_ENV,
            reason: format!("'{host}:{port}' is not a valid socket address"),
        })
}
