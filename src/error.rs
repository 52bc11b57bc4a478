use std::error::Error;
use std::fmt;

use crate::bridge::DriverError;


/// Categorized data-access error reported to the host.
#[derive(Debug)]
#[non_exhaustive]
pub struct DataError {
    pub kind: DataErrorKind,
}

impl DataError {
    pub fn configuration(message: impl Into<String>) -> Self {
        DataError { kind: DataErrorKind::Configuration(message.into()) }
    }

    pub fn connection(provider: &'static str, source: DriverError) -> Self {
        DataError { kind: DataErrorKind::Connection { provider, source } }
    }

    pub fn execution(source: DriverError) -> Self {
        DataError { kind: DataErrorKind::Execution(source) }
    }

    pub fn parameter_not_found(name: impl Into<String>) -> Self {
        DataError { kind: DataErrorKind::ParameterNotFound(name.into()) }
    }

    /// Only failures coming back from the driver are eligible for the
    /// original-text fallback; caller contract violations are not.
    pub(crate) fn is_execution_failure(&self) -> bool {
        matches!(self.kind, DataErrorKind::Execution(_))
    }
}

impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DataError: {}", self.kind)
    }
}

impl Error for DataError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.kind)
    }
}

#[derive(Debug)]
pub enum DataErrorKind {
    /// Invalid request or descriptor. Never retried.
    Configuration(String),
    /// The driver refused to open a connection.
    Connection { provider: &'static str, source: DriverError },
    /// Statement execution failed.
    Execution(DriverError),
    /// A parameter referenced in the command text was not supplied.
    ParameterNotFound(String),
}

impl fmt::Display for DataErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration(message) => write!(f, "{message}"),
            Self::Connection { provider, .. } => {
                write!(f, "Failed to open connection with data provider <{provider}>.")
            }
            Self::Execution(error) => write!(f, "Query execution failed: {error}"),
            Self::ParameterNotFound(name) => {
                write!(f, "Can't find the definition of the parameter '{name}'")
            }
        }
    }
}

impl Error for DataErrorKind {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Connection { source, .. } => Some(source),
            Self::Execution(source) => Some(source),
            _ => None,
        }
    }
}

impl From<DriverError> for DataError {
    fn from(error: DriverError) -> Self {
        DataError::execution(error)
    }
}
