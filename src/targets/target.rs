//! A single probe target.
//!
//! # Responsibilities
//! - Hold the configured base address (the target's identity)
//! - Pre-compute the full probe URL from base address and probe path
//! - Report whether the target is reached over TLS

use std::fmt;

use thiserror::Error;
use url::Url;

/// Errors raised while building targets from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// No base addresses were configured.
    #[error("no backend URLs configured")]
    Empty,

    /// The address could not be parsed as an absolute URL.
    #[error("invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Only plain and encrypted HTTP are probed.
    #[error("unsupported scheme {scheme:?} in {url:?} (expected http or https)")]
    UnsupportedScheme { url: String, scheme: String },
}

/// Parse a configured base address, accepting only http and https.
pub fn parse_base_url(raw: &str) -> Result<Url, RegistryError> {
    let url = Url::parse(raw).map_err(|e| RegistryError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(RegistryError::UnsupportedScheme {
                url: raw.to_string(),
                scheme: scheme.to_string(),
            })
        }
    }

    if url.host_str().is_none() {
        return Err(RegistryError::InvalidUrl {
            url: raw.to_string(),
            reason: "missing host".to_string(),
        });
    }

    Ok(url)
}

/// One backend under keep-alive supervision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Base address exactly as configured (trimmed).
    id: String,
    /// Base address joined with the probe path.
    probe_url: Url,
}

impl Target {
    /// Build a target from a base address and the shared probe path.
    pub fn new(base: &str, ping_endpoint: &str) -> Result<Self, RegistryError> {
        let base = base.trim();
        parse_base_url(base)?;

        let path = if ping_endpoint.starts_with('/') {
            ping_endpoint.to_string()
        } else {
            format!("/{ping_endpoint}")
        };
        let joined = format!("{}{}", base.trim_end_matches('/'), path);
        let probe_url = parse_base_url(&joined)?;

        Ok(Self {
            id: base.to_string(),
            probe_url,
        })
    }

    /// Identity used as the statistics key.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Full URL requested by each probe.
    pub fn probe_url(&self) -> &Url {
        &self.probe_url
    }

    /// True when probes go over TLS.
    pub fn is_secure(&self) -> bool {
        self.probe_url.scheme() == "https"
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_base_and_path() {
        let target = Target::new("https://api.example.com", "/api/health").unwrap();
        assert_eq!(target.id(), "https://api.example.com");
        assert_eq!(target.probe_url().as_str(), "https://api.example.com/api/health");
        assert!(target.is_secure());
    }

    #[test]
    fn trailing_slash_does_not_double() {
        let target = Target::new(" http://a.test/ ", "health").unwrap();
        assert_eq!(target.id(), "http://a.test/");
        assert_eq!(target.probe_url().as_str(), "http://a.test/health");
        assert!(!target.is_secure());
    }

    #[test]
    fn keeps_base_path_prefix() {
        let target = Target::new("http://a.test:8080/svc", "/api/health?deep=1").unwrap();
        assert_eq!(target.probe_url().as_str(), "http://a.test:8080/svc/api/health?deep=1");
    }

    #[test]
    fn rejects_bad_addresses() {
        assert!(matches!(
            Target::new("not a url", "/"),
            Err(RegistryError::InvalidUrl { .. })
        ));
        assert!(matches!(
            Target::new("ftp://files.test", "/"),
            Err(RegistryError::UnsupportedScheme { .. })
        ));
        // Bare host:port parses with the host as the scheme.
        assert!(matches!(
            Target::new("localhost:3000", "/"),
            Err(RegistryError::UnsupportedScheme { .. })
        ));
    }
}
