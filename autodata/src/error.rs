//! Error types for data sources, specimen generation and configuration.

use std::fmt;

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Invalid max depth (must be > 0)
    InvalidMaxDepth(usize),
    /// Invalid number of runner workers (must be > 0)
    InvalidWorkers(usize),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidMaxDepth(n) => {
                write!(f, "Invalid max depth: {} (must be > 0)", n)
            }
            ConfigError::InvalidWorkers(n) => {
                write!(f, "Invalid worker count: {} (must be > 0)", n)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Error raised while producing theory data
///
/// The first two variants are configuration errors made by the test author;
/// the generation variants come from the specimen builder and are passed
/// through data sources untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum DataError {
    /// A row does not line up with the parameter list
    ParameterCountMismatch { expected: usize, actual: usize },

    /// A literal value has a different type than the parameter it lands on
    TypeMismatch {
        position: usize,
        expected: &'static str,
        actual: &'static str,
    },

    /// Nothing knows how to create the requested type
    NoSpecimenBuilder { type_name: &'static str },

    /// Object graph nested deeper than the fixture allows
    RecursionLimit {
        type_name: &'static str,
        depth: usize,
    },

    /// A registered factory or customization reported a failure
    GenerationFailed {
        message: String,
        type_name: Option<&'static str>,
    },

    /// Invalid configuration
    Config(ConfigError),

    /// Internal error in the library
    Internal { message: String },
}

impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataError::ParameterCountMismatch { expected, actual } => {
                write!(
                    f,
                    "Expected {} parameters, got {} parameters",
                    expected, actual
                )
            }
            DataError::TypeMismatch {
                position,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "Parameter {} expects a value of type {}, got {}",
                    position, expected, actual
                )
            }
            DataError::NoSpecimenBuilder { type_name } => {
                write!(f, "No specimen builder can create an instance of {}", type_name)
            }
            DataError::RecursionLimit { type_name, depth } => {
                write!(
                    f,
                    "Recursion limit reached while creating {} (depth: {})",
                    type_name, depth
                )
            }
            DataError::GenerationFailed { message, type_name } => {
                write!(f, "Generation failed: {}", message)?;
                if let Some(name) = type_name {
                    write!(f, " (type: {})", name)?;
                }
                Ok(())
            }
            DataError::Config(err) => write!(f, "Configuration error: {}", err),
            DataError::Internal { message } => write!(f, "Internal error: {}", message),
        }
    }
}

impl std::error::Error for DataError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DataError::Config(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ConfigError> for DataError {
    fn from(err: ConfigError) -> Self {
        DataError::Config(err)
    }
}

impl DataError {
    /// Create a parameter count mismatch error
    pub fn parameter_count(expected: usize, actual: usize) -> Self {
        Self::ParameterCountMismatch { expected, actual }
    }

    /// Create a type mismatch error for the given parameter position
    pub fn type_mismatch(position: usize, expected: &'static str, actual: &'static str) -> Self {
        Self::TypeMismatch {
            position,
            expected,
            actual,
        }
    }

    /// Create a generation failure, optionally naming the requested type
    pub fn generation_failed(message: impl Into<String>, type_name: Option<&'static str>) -> Self {
        Self::GenerationFailed {
            message: message.into(),
            type_name,
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether the error stems from how the theory was declared rather than
    /// from specimen generation
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            DataError::ParameterCountMismatch { .. }
                | DataError::TypeMismatch { .. }
                | DataError::Config(_)
        )
    }
}
