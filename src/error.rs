//! Error types for the match_colors library

use thiserror::Error;

/// Result type alias for match_colors operations
pub type Result<T> = std::result::Result<T, MatchError>;

/// Comprehensive error types for color matching operations
#[derive(Error, Debug)]
pub enum MatchError {
    /// Color name table could not be constructed from its resource
    #[error("Color table error: {message}")]
    TableError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Learning data for one model could not be loaded
    #[error("Failed to load model '{model}': {message}")]
    ModelLoadError {
        model: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Image and mask dimensions do not agree
    #[error(
        "Dimension mismatch: image is {image_width}x{image_height}, \
         mask is {mask_width}x{mask_height}"
    )]
    DimensionMismatch {
        image_width: u32,
        image_height: u32,
        mask_width: u32,
        mask_height: u32,
    },

    /// A color distribution violates its invariants
    #[error("Invalid distribution in {context}: {reason}")]
    InvalidDistribution { context: String, reason: String },

    /// A color name outside the fixed vocabulary was encountered
    #[error("Unknown color name: '{name}'")]
    UnknownColorName { name: String },
}

impl MatchError {
    /// Create a table construction error with context
    pub fn table<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::TableError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a table construction error without an underlying cause
    pub fn table_msg(message: impl Into<String>) -> Self {
        Self::TableError {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error with context
    pub fn config<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ConfigError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a model load error with context
    pub fn model_load<E>(model: impl Into<String>, message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ModelLoadError {
            model: model.into(),
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a model load error without an underlying cause
    pub fn model_load_msg(model: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ModelLoadError {
            model: model.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Check if this error is fatal to the matcher as a whole
    ///
    /// Table and configuration errors leave the matcher unable to operate;
    /// load and input errors are scoped to one model or one call.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            MatchError::TableError { .. } | MatchError::ConfigError { .. }
        )
    }
}
