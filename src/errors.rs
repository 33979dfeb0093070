use forecast_config::ConfigError;
use forecast_core::CoreError;
use thiserror::Error;

/// Unified error type for configuration, pipeline and output failures.
#[derive(Debug, Error)]
pub enum ForecastError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<ConfigError> for ForecastError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Io(io) => ForecastError::Io(io),
            ConfigError::Serde(message) | ConfigError::Invalid(message) => {
                ForecastError::Config(message)
            }
        }
    }
}

/// User-facing CLI error wrapper.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Forecast(#[from] ForecastError),
    #[error("Invalid input: {0}")]
    Input(String),
    #[error("Command failed: {0}")]
    Command(String),
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        CliError::from(ForecastError::from(err))
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        CliError::from(ForecastError::from(err))
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Command(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_keep_their_message() {
        let err = ForecastError::from(ConfigError::Invalid("bad width".into()));
        assert_eq!(err.to_string(), "Configuration error: bad width");
    }

    #[test]
    fn core_errors_pass_through_unchanged() {
        let err = CliError::from(CoreError::DataQuality("no rows".into()));
        assert_eq!(err.to_string(), "Data quality error: no rows");
    }
}
