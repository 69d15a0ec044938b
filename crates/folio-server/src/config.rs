use anyhow::Context;
use folio_core::DEFAULT_MAX_PAGE_SIZE;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

/// HMAC key used to verify capability tokens, selected by the token's `kid`.
#[derive(Clone)]
pub struct CapKey {
    pub id: String,
    pub secret: String,
}

impl fmt::Debug for CapKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapKey")
            .field("id", &self.id)
            .field("secret", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Default)]
pub struct CapKeys {
    pub active: Option<CapKey>,
    pub next: Option<CapKey>,
}

impl CapKeys {
    /// No keys configured: tokens are not checked.
    pub fn is_open(&self) -> bool {
        self.active.is_none() && self.next.is_none()
    }

    pub fn secret_for(&self, kid: &str) -> Option<&str> {
        [&self.active, &self.next]
            .into_iter()
            .flatten()
            .find(|k| k.id == kid)
            .map(|k| k.secret.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub http_addr: SocketAddr,
    pub data_dir: Option<PathBuf>,
    pub caps: CapKeys,
    pub max_page_size: usize,
    pub tls: Option<TlsPaths>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            data_dir: None,
            caps: CapKeys::default(),
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
            tls: None,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |k: &str| lookup(k).filter(|v| !v.trim().is_empty());
        let mut cfg = ServerConfig::default();
        if let Some(addr) = get("FOLIO_HTTP_ADDR") {
            cfg.http_addr = addr
                .parse()
                .with_context(|| format!("FOLIO_HTTP_ADDR is not a socket address: {addr}"))?;
        }
        cfg.data_dir = get("DATA_DIR").map(PathBuf::from);
        if let Some(max) = get("MAX_PAGE_SIZE") {
            cfg.max_page_size = max
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .with_context(|| format!("MAX_PAGE_SIZE must be a positive integer: {max}"))?;
        }
        cfg.caps.active = get("CAP_KEY_ACTIVE").map(|secret| CapKey {
            id: get("CAP_KEY_ACTIVE_ID").unwrap_or_else(|| "active".into()),
            secret,
        });
        cfg.caps.next = get("CAP_KEY_NEXT").map(|secret| CapKey {
            id: get("CAP_KEY_NEXT_ID").unwrap_or_else(|| "next".into()),
            secret,
        });
        cfg.tls = match (get("TLS_CERT_PATH"), get("TLS_KEY_PATH")) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: cert.into(),
                key: key.into(),
            }),
            _ => None,
        };
        Ok(cfg)
    }
}
