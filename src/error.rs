use std::fmt::{self, Debug, Display};
use std::io;

/// Provides `EpisimError` and maps to other errors to
/// convert to an `EpisimError`
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum EpisimError {
    IoError(io::Error),
    JsonError(serde_json::Error),
    CsvError(csv::Error),
    ParameterError(String),
    ReportError(String),
    EpisimError(String),
}

impl From<io::Error> for EpisimError {
    fn from(error: io::Error) -> Self {
        EpisimError::IoError(error)
    }
}

impl From<serde_json::Error> for EpisimError {
    fn from(error: serde_json::Error) -> Self {
        EpisimError::JsonError(error)
    }
}

impl From<csv::Error> for EpisimError {
    fn from(error: csv::Error) -> Self {
        EpisimError::CsvError(error)
    }
}

impl From<String> for EpisimError {
    fn from(error: String) -> Self {
        EpisimError::EpisimError(error)
    }
}

impl From<&str> for EpisimError {
    fn from(error: &str) -> Self {
        EpisimError::EpisimError(error.to_string())
    }
}

impl std::error::Error for EpisimError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EpisimError::IoError(error) => Some(error),
            EpisimError::JsonError(error) => Some(error),
            EpisimError::CsvError(error) => Some(error),
            _ => None,
        }
    }
}

impl Display for EpisimError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EpisimError::IoError(error) => write!(f, "I/O error: {error}"),
            EpisimError::JsonError(error) => write!(f, "invalid JSON: {error}"),
            EpisimError::CsvError(error) => write!(f, "CSV error: {error}"),
            EpisimError::ParameterError(msg) => write!(f, "invalid parameter: {msg}"),
            EpisimError::ReportError(msg) => write!(f, "report error: {msg}"),
            EpisimError::EpisimError(msg) => write!(f, "{msg}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::EpisimError;
    use std::error::Error;

    #[test]
    fn converts_from_str_and_string() {
        let from_str: EpisimError = "bad things".into();
        assert_eq!(from_str.to_string(), "bad things");
        let from_string: EpisimError = String::from("worse things").into();
        assert!(matches!(from_string, EpisimError::EpisimError(ref msg) if msg == "worse things"));
    }

    #[test]
    fn io_error_keeps_source() {
        let error: EpisimError =
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing").into();
        assert!(error.to_string().starts_with("I/O error"));
        assert!(error.source().is_some());
    }

    #[test]
    fn parameter_error_display() {
        let error = EpisimError::ParameterError("death_probability must be in [0, 1]".into());
        assert_eq!(
            error.to_string(),
            "invalid parameter: death_probability must be in [0, 1]"
        );
    }
}
