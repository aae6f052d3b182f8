//! Error taxonomy for secret resolution.

use std::path::PathBuf;

/// Result type for secretfile operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading a manifest or resolving a key.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Manifest file could not be read.
    #[error("read manifest {path}: {source}")]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Manifest line did not split into exactly two tokens.
    #[error("manifest line {line}: expected 'KEY address', found {found} token(s)")]
    MalformedLine { line: usize, found: usize },

    /// An address referenced an environment variable that is not set.
    #[error("environment variable {var} not set but required in address for {key}")]
    UnresolvedVariable { var: String, key: String },

    /// Address contained more than one colon.
    #[error("invalid address '{address}': at most one ':' allowed")]
    MalformedAddress { address: String },

    /// Grouped lookup reached a key whose address has no field.
    #[error("grouped lookup for {key} requires a 'path:field' address, found '{address}'")]
    FieldRequired { key: String, address: String },

    /// Key absent from environment, cache, and manifest.
    #[error("key '{0}' not found in environment, cache, or manifest")]
    KeyNotResolvable(String),

    /// Requested field absent from the fetched secret.
    #[error("field '{field}' not present in secret at '{path}'")]
    FieldNotFound { field: String, path: String },

    /// Field indexing attempted on a plain-string secret.
    #[error("secret at '{path}' is not field-indexable")]
    NotIndexable { path: String },

    /// A resolution needed the backend but none was configured.
    #[error("no secret backend configured")]
    BackendNotConfigured,

    /// Backend constructor was missing a required setting.
    #[error("backend configuration: {0}")]
    BackendSetting(String),

    /// Backend failed to fetch a path.
    #[error("backend fetch '{path}': {message}")]
    BackendFetch { path: String, message: String },
}
