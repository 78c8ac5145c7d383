//! Error types for strikeflow

use thiserror::Error;

/// Result alias used across the workspace
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error
#[derive(Debug, Error)]
pub enum Error {
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Coordinator error: {0}")]
    Coordinator(#[from] CoordinatorError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors reported by an input provider
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("Start failed: {0}")]
    StartFailed(String),

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("Operation not supported by provider: {0}")]
    Unsupported(&'static str),

    #[error("Hardware error: {0}")]
    Hardware(String),
}

/// Errors reported by the provider coordinator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinatorError {
    #[error("Provider already registered: {0}")]
    DuplicateProvider(String),

    #[error("Startup probe failed for {id}: {source}")]
    ProbeFailed { id: String, source: ProviderError },

    #[error("Provider not registered: {0}")]
    UnknownProvider(String),

    #[error("Failed to activate {id}: {source}")]
    ActivationFailed { id: String, source: ProviderError },
}

impl CoordinatorError {
    /// Identifier of the provider the error refers to
    pub fn provider_id(&self) -> &str {
        match self {
            CoordinatorError::DuplicateProvider(id)
            | CoordinatorError::UnknownProvider(id)
            | CoordinatorError::ProbeFailed { id, .. }
            | CoordinatorError::ActivationFailed { id, .. } => id,
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to convert provider settings: {0}")]
    Settings(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinator_error_reports_provider_id() {
        let err = CoordinatorError::ProbeFailed {
            id: "gamepad".to_string(),
            source: ProviderError::Hardware("unplugged".to_string()),
        };
        assert_eq!(err.provider_id(), "gamepad");
        assert_eq!(
            err.to_string(),
            "Startup probe failed for gamepad: Hardware error: unplugged"
        );
    }

    #[test]
    fn errors_convert_into_umbrella() {
        let err: Error = ProviderError::Unsupported("haptics").into();
        assert!(matches!(err, Error::Provider(ProviderError::Unsupported(_))));
    }
}
