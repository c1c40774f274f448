//! Failure taxonomy for tool workflows.
//!
//! Every variant renders as the text shown inline in the tool's panel, so
//! `Display` output is user-facing. Transport details are kept as the error
//! source for the log.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
  /// The server answered with an `error` field.
  #[error("{0}")]
  Server(String),

  /// The request never produced a response.
  #[error("Could not reach the server")]
  Transport(#[source] reqwest::Error),

  /// A blob endpoint answered with a non-2xx status.
  #[error("Failed to download file")]
  Transfer { status: u16 },

  /// The body was not the JSON we expected.
  #[error("Unexpected response from server: {0}")]
  Decode(#[source] serde_json::Error),

  /// Reading the upload or writing the saved artifact failed.
  #[error("{context}: {source}")]
  Io {
    context: String,
    #[source]
    source: std::io::Error,
  },

  /// The background task ended without reporting a result.
  #[error("The request was interrupted")]
  Interrupted,
}

impl ToolError {
  pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
    ToolError::Io { context: context.into(), source }
  }
}

pub type ToolResult<T> = std::result::Result<T, ToolError>;
