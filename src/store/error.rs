use thiserror::Error;

/// A failed remote operation.
///
/// The variants only differ in where the failure happened; the UI shows all of
/// them the same way, as the `Display` text.
#[derive(Debug, Error)]
pub enum StoreError {
  /// The store answered with a non-success status
  #[error("{message}")]
  Remote {
    status: reqwest::StatusCode,
    message: String,
  },

  /// Network or TLS failure
  #[error("request failed: {0}")]
  Http(#[from] reqwest::Error),

  /// The response body did not have the expected shape
  #[error("unexpected response from {context}: {source}")]
  Decode {
    context: String,
    #[source]
    source: serde_json::Error,
  },

  /// The store accepted the request but returned no row
  #[error("{0}")]
  Empty(String),

  /// Bad local settings (URL, key, table); no request was made
  #[error("{0}")]
  Config(String),
}
