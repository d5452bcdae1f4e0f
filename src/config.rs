//! Host-supplied configuration, deserialized from TOML.

use serde::Deserialize;

/// Tunables a host passes in when wiring up a [`crate::Provider`]. None of these
/// affect correctness of the coordination logic; they bound its resource usage.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Upper bound on requests a single [`crate::RequestManager`] will hold
    /// pending at once before `create_request` starts refusing new work with
    /// [`crate::ErrorKind::InvalidArgument`]. `0` means unbounded.
    pub max_pending_requests: u32,
    /// Default `opened_files_limit` applied to a mount when the caller leaves
    /// [`crate::options::MountOptions::opened_files_limit`] at its zero default.
    pub default_opened_files_limit: u32,
    /// Log level filter passed through to `tracing-subscriber` by the demo binary.
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_pending_requests: 0,
            default_opened_files_limit: 0,
            log_filter: "info".to_string(),
        }
    }
}

impl Config {
    /// Parses a TOML document into a `Config`, falling back to defaults for any
    /// field the document omits.
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config = Config::from_toml("max_pending_requests = 64").unwrap();
        assert_eq!(config.max_pending_requests, 64);
        assert_eq!(config.default_opened_files_limit, 0);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn empty_document_is_all_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
    }
}
