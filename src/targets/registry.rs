//! Static target registry.

use std::collections::HashSet;

use crate::config::TargetsConfig;
use crate::targets::target::{RegistryError, Target};

/// Ordered, immutable list of targets built once at startup.
#[derive(Debug, Clone)]
pub struct TargetRegistry {
    targets: Vec<Target>,
    ping_endpoint: String,
}

impl TargetRegistry {
    /// Build the registry, preserving configuration order.
    ///
    /// Blank entries are dropped. Duplicates are kept (each is probed every
    /// round and they share one statistics entry) but logged.
    pub fn new<S: AsRef<str>>(urls: &[S], ping_endpoint: &str) -> Result<Self, RegistryError> {
        let mut targets = Vec::with_capacity(urls.len());
        let mut seen = HashSet::new();

        for raw in urls.iter().map(|u| u.as_ref().trim()).filter(|u| !u.is_empty()) {
            let target = Target::new(raw, ping_endpoint)?;
            if !seen.insert(target.id().to_string()) {
                tracing::warn!(target = %target, "Duplicate backend URL configured");
            }
            targets.push(target);
        }

        if targets.is_empty() {
            return Err(RegistryError::Empty);
        }

        Ok(Self {
            targets,
            ping_endpoint: ping_endpoint.to_string(),
        })
    }

    pub fn from_config(config: &TargetsConfig) -> Result<Self, RegistryError> {
        Self::new(&config.backend_urls, &config.ping_endpoint)
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn ping_endpoint(&self) -> &str {
        &self.ping_endpoint
    }

    /// Distinct identities in registry order.
    pub fn identities(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.targets
            .iter()
            .map(Target::id)
            .filter(|id| seen.insert(*id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_order_and_drops_blanks() {
        let registry =
            TargetRegistry::new(&["http://b.test", "", "  ", "http://a.test"], "/api/health").unwrap();
        let ids: Vec<_> = registry.targets().iter().map(Target::id).collect();
        assert_eq!(ids, vec!["http://b.test", "http://a.test"]);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.ping_endpoint(), "/api/health");
    }

    #[test]
    fn empty_list_fails_fast() {
        let empty: [&str; 0] = [];
        assert_eq!(TargetRegistry::new(&empty, "/").unwrap_err(), RegistryError::Empty);
        assert_eq!(TargetRegistry::new(&[" "], "/").unwrap_err(), RegistryError::Empty);
    }

    #[test]
    fn one_bad_entry_fails_the_whole_list() {
        let err = TargetRegistry::new(&["http://a.test", "mailto:x@y.z"], "/").unwrap_err();
        assert!(matches!(err, RegistryError::UnsupportedScheme { .. }));
    }

    #[test]
    fn duplicates_are_probed_but_share_identity() {
        let registry =
            TargetRegistry::new(&["http://a.test", "http://b.test", "http://a.test"], "/").unwrap();
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.identities(), vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn builds_from_config() {
        let config = TargetsConfig {
            backend_urls: vec!["https://a.test".into()],
            ping_endpoint: "/ping".into(),
        };
        let registry = TargetRegistry::from_config(&config).unwrap();
        assert_eq!(registry.targets()[0].probe_url().as_str(), "https://a.test/ping");
    }
}
