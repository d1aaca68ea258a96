//! Error types for the `support-rag` crate.

use thiserror::Error;

/// Errors that can occur while ingesting documents, retrieving context,
/// or processing a conversation turn.
#[derive(Debug, Error)]
pub enum SupportError {
    /// A configuration validation error. Fatal at startup.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A document could not be read or parsed.
    #[error("Loader error ({path}): {message}")]
    Loader {
        /// The file that failed to load.
        path: String,
        /// A description of the failure.
        message: String,
    },

    /// A file extension with no registered parser.
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    Embedding {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred in the vector store backend.
    #[error("Vector store error ({backend}): {message}")]
    VectorStore {
        /// The vector store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// An error from the language model backend.
    #[error("Model error ({provider}): {message}")]
    Model {
        /// The model provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// A tool body failed while executing.
    #[error("Tool error: {0}")]
    Tool(String),

    /// The model requested a tool that is not in the registry.
    #[error("unknown tool requested: {0}")]
    UnknownTool(String),

    /// A conversation turn exceeded the tool-call round limit.
    #[error("tool-call round limit ({0}) exceeded")]
    ToolRoundLimit(usize),
}

/// A convenience result type for support-rag operations.
pub type Result<T> = std::result::Result<T, SupportError>;
