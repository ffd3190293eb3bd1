//! Runtime configuration
//!
//! Loads controller and back-end settings from a TOML document. Every key
//! is optional; missing keys keep their defaults.
//!
//! ```toml
//! [controller]
//! rate_hz = 10
//! auto_spin = true
//! backend = "simulated"
//!
//! [backend]
//! lookahead = 1
//! buffer_steps = 4
//! ```

use serde::Deserialize;

use cadence_core::config::{BackendConfig, ControllerConfig};
use cadence_drivers::{Backend, RegistryError};

/// Configuration loading errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Document is not valid TOML or a value has the wrong type
    TomlParse,
    /// Selected back-end is not compiled in
    UnknownBackend,
}

impl From<RegistryError> for ConfigError {
    fn from(e: RegistryError) -> Self {
        match e {
            RegistryError::UnknownBackend => ConfigError::UnknownBackend,
        }
    }
}

/// Complete runtime configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(default)]
pub struct RuntimeConfig {
    pub controller: ControllerConfig,
    pub backend: BackendConfig,
}

impl RuntimeConfig {
    /// Instantiate the configured back-end
    pub fn instantiate_backend(&self) -> Result<Backend, RegistryError> {
        Backend::from_name(&self.controller.backend, &self.backend)
    }
}

/// Parse TOML configuration into RuntimeConfig
///
/// The back-end name is checked against the registry so a typo fails at
/// load time rather than at the first tick.
pub fn parse_config(text: &str) -> Result<RuntimeConfig, ConfigError> {
    let config: RuntimeConfig = toml::from_str(text).map_err(|_| {
        error!("Failed to parse configuration");
        ConfigError::TomlParse
    })?;

    if !Backend::NAMES.contains(&config.controller.backend.as_str()) {
        error!("Unknown back-end '{}'", config.controller.backend.as_str());
        return Err(ConfigError::UnknownBackend);
    }

    info!(
        "Configuration loaded: {} Hz, back-end '{}'",
        config.controller.effective_rate_hz(),
        config.controller.backend.as_str()
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config, RuntimeConfig::default());
        assert_eq!(config.controller.rate_hz, 10);
        assert_eq!(config.controller.backend.as_str(), "simulated");
        assert_eq!(config.backend.lookahead, 1);
    }

    #[test]
    fn test_full_document() {
        let text = r#"
            # Dry run at 50 Hz
            [controller]
            rate_hz = 50
            auto_spin = false
            backend = "recording"

            [backend]
            lookahead = 3
            buffer_steps = 8
            fail_at = 12
        "#;
        let config = parse_config(text).unwrap();

        assert_eq!(config.controller.rate_hz, 50);
        assert!(!config.controller.auto_spin);
        assert_eq!(config.controller.backend.as_str(), "recording");
        assert_eq!(config.backend.lookahead, 3);
        assert_eq!(config.backend.buffer_steps, 8);
        assert_eq!(config.backend.fail_at, Some(12));
    }

    #[test]
    fn test_partial_section_keeps_defaults() {
        let config = parse_config("[backend]\nlookahead = 2\n").unwrap();
        assert_eq!(config.backend.lookahead, 2);
        assert_eq!(config.backend.buffer_steps, 4);
        assert_eq!(config.controller.rate_hz, 10);
    }

    #[test]
    fn test_unknown_backend() {
        let text = "[controller]\nbackend = \"hydraulic\"\n";
        assert_eq!(parse_config(text), Err(ConfigError::UnknownBackend));
    }

    #[test]
    fn test_malformed_document() {
        assert_eq!(
            parse_config("[controller\nrate_hz = 10"),
            Err(ConfigError::TomlParse)
        );
        assert_eq!(
            parse_config("[controller]\nrate_hz = \"fast\""),
            Err(ConfigError::TomlParse)
        );
    }

    #[test]
    fn test_instantiate_backend() {
        let config = parse_config("[controller]\nbackend = \"recording\"\n").unwrap();
        let backend = config.instantiate_backend().unwrap();
        assert!(matches!(backend, Backend::Recording(_)));
    }
}
