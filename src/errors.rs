/*!
 * Error types for the script-aligner application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors raised by the alignment core
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AlignError {
    /// Malformed sequences, non-monotonic timing, dimensionality mismatch or bad configuration
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No embedding could be produced for a text unit
    #[error("Embedding unavailable for '{text}': {reason}")]
    EmbeddingUnavailable {
        /// Normalized text that failed to embed
        text: String,
        /// Why the collaborator failed
        reason: String,
    },

    /// The search band excluded every path from the origin to the final cell
    #[error("Alignment band of width {band_width} is too narrow to reach the origin")]
    BandTooNarrow {
        /// Band width that failed
        band_width: usize,
    },
}

impl AlignError {
    /// Shorthand for building an `InvalidInput` error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

/// Errors that can occur when parsing subtitle or screenplay input
#[derive(Error, Debug)]
pub enum ParseError {
    /// A timestamp could not be parsed
    #[error("Invalid timestamp format: {0}")]
    InvalidTimestamp(String),

    /// The input had no usable entries
    #[error("No valid entries were found in {0}")]
    NoEntries(String),

    /// The script had no non-empty lines
    #[error("Script is empty")]
    EmptyScript,
}

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),
}

/// Errors produced by an embedding collaborator
#[derive(Error, Debug)]
pub enum EmbeddingError {
    /// The backing provider failed
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The provider answered with an empty vector
    #[error("Embedding for '{0}' is empty")]
    Empty(String),
}
