//! Session client configuration loaded via OrthoConfig.
//!
//! Values come from CLI flags, `SESSION_CLIENT_*` environment variables or a
//! configuration file, in OrthoConfig's usual precedence.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::outbound::identity::IdentityEndpoints;

const DEFAULT_BASE_URL: &str = "http://userauth.test/";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Errors raised while turning settings into runtime values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The base URL could not be parsed or used as a base.
    #[error("invalid identity provider base URL '{value}': {message}")]
    InvalidBaseUrl {
        /// Configured value.
        value: String,
        /// Parser diagnostic.
        message: String,
    },
    /// A zero timeout would leave requests unbounded.
    #[error("request timeout must be at least one second")]
    ZeroTimeout,
}

/// Configuration values for reaching the identity provider.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SESSION_CLIENT")]
pub struct ClientSettings {
    /// Base URL the `api/<operation>` paths are resolved against.
    pub base_url: Option<String>,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: Option<u64>,
    /// Emit logs as JSON lines instead of human-readable text.
    #[ortho_config(default = false)]
    pub log_json: bool,
}

impl ClientSettings {
    /// Return the configured base URL text, falling back to the default.
    pub fn base_url_text(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    /// Resolve the provider endpoints below the configured base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] when the base URL does not
    /// parse or cannot carry a path.
    pub fn endpoints(&self) -> Result<IdentityEndpoints, ConfigError> {
        let value = self.base_url_text();
        let invalid = |message: String| ConfigError::InvalidBaseUrl {
            value: value.to_owned(),
            message,
        };
        let base = Url::parse(value).map_err(|error| invalid(error.to_string()))?;
        IdentityEndpoints::from_base(&base).map_err(|error| invalid(error.to_string()))
    }

    /// Return the request timeout, falling back to the default.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroTimeout`] when configured as zero.
    pub fn request_timeout(&self) -> Result<Duration, ConfigError> {
        match self.request_timeout_secs.unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS) {
            0 => Err(ConfigError::ZeroTimeout),
            secs => Ok(Duration::from_secs(secs)),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for configuration parsing and resolution.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    fn load_from_empty_args() -> ClientSettings {
        ClientSettings::load_from_iter([OsString::from("session-console")])
            .expect("config should load")
    }

    fn settings(base_url: Option<&str>, timeout: Option<u64>) -> ClientSettings {
        ClientSettings {
            base_url: base_url.map(str::to_owned),
            request_timeout_secs: timeout,
            log_json: false,
        }
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env([
            ("SESSION_CLIENT_BASE_URL", None::<String>),
            ("SESSION_CLIENT_REQUEST_TIMEOUT_SECS", None::<String>),
            ("SESSION_CLIENT_LOG_JSON", None::<String>),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.base_url_text(), DEFAULT_BASE_URL);
        assert_eq!(
            settings.request_timeout(),
            Ok(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
        );
        assert!(!settings.log_json);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            (
                "SESSION_CLIENT_BASE_URL",
                Some("https://id.example/auth".to_owned()),
            ),
            ("SESSION_CLIENT_REQUEST_TIMEOUT_SECS", Some("3".to_owned())),
            ("SESSION_CLIENT_LOG_JSON", Some("true".to_owned())),
        ]);

        let settings = load_from_empty_args();
        let endpoints = settings.endpoints().expect("endpoints resolve");
        assert_eq!(
            endpoints.logout().as_str(),
            "https://id.example/auth/api/logout"
        );
        assert_eq!(settings.request_timeout(), Ok(Duration::from_secs(3)));
        assert!(settings.log_json);
    }

    #[rstest]
    #[case::garbage("not a url")]
    #[case::no_base("mailto:ops@example.com")]
    fn unusable_base_urls_are_reported(#[case] base_url: &str) {
        let error = settings(Some(base_url), None)
            .endpoints()
            .expect_err("base url should be rejected");
        assert!(matches!(error, ConfigError::InvalidBaseUrl { ref value, .. } if value == base_url));
    }

    #[rstest]
    fn zero_timeout_is_rejected() {
        assert_eq!(
            settings(None, Some(0)).request_timeout(),
            Err(ConfigError::ZeroTimeout)
        );
    }
}
