//! Centralized constants for file names and environment variables.

/// Default manifest filename, looked up in the working directory.
pub const DEFAULT_MANIFEST_NAME: &str = "Secretfile";

/// Environment variable overriding the manifest path.
pub const MANIFEST_PATH_ENV: &str = "SECRETFILE_PATH";

/// Vault server address, consumed by the Vault backend constructor.
pub const VAULT_ADDR_ENV: &str = "VAULT_ADDR";

/// Vault client token, consumed by the Vault backend constructor.
pub const VAULT_TOKEN_ENV: &str = "VAULT_TOKEN";

/// API path prefix for Vault KV reads.
pub const VAULT_API_PREFIX: &str = "v1";
