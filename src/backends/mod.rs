//! Secret backend capability and implementations.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Error, Result};

pub mod memory;
pub mod vault;

pub use memory::MemoryBackend;
pub use vault::VaultBackend;

/// A value fetched from a backend: either a plain string, or a structured
/// set of named fields that an address's `:field` suffix indexes into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Secret {
    Text(String),
    Fields(BTreeMap<String, String>),
}

impl Secret {
    /// Build a `Fields` secret from `(name, value)` pairs.
    pub fn fields<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Secret::Fields(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Index into a structured secret by field name.
    ///
    /// `path` is only used to name the secret in errors.
    pub fn field(&self, name: &str, path: &str) -> Result<Secret> {
        match self {
            Secret::Text(_) => Err(Error::NotIndexable {
                path: path.to_string(),
            }),
            Secret::Fields(map) => match map.get(name) {
                Some(value) => Ok(Secret::Text(value.clone())),
                None => Err(Error::FieldNotFound {
                    field: name.to_string(),
                    path: path.to_string(),
                }),
            },
        }
    }

    /// The plain text of a `Text` secret, if that is what this is.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Secret::Text(s) => Some(s),
            Secret::Fields(_) => None,
        }
    }
}

impl From<&str> for Secret {
    fn from(s: &str) -> Self {
        Secret::Text(s.to_string())
    }
}

impl From<String> for Secret {
    fn from(s: String) -> Self {
        Secret::Text(s)
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Secret::Text(s) => f.write_str(s),
            // Structured secrets render as JSON when printed whole.
            Secret::Fields(map) => {
                let obj: serde_json::Map<String, serde_json::Value> = map
                    .iter()
                    .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
                    .collect();
                f.write_str(&serde_json::Value::Object(obj).to_string())
            }
        }
    }
}

/// Capability contract the resolution engine requires of any secret store.
///
/// Implementors provide `fetch_secret`; `deserialize` defaults to identity
/// and exists for backends whose storage format needs decoding after every
/// read. The engine always goes through `fetch`.
pub trait SecretBackend {
    /// Fetch the raw value stored at `path`.
    fn fetch_secret(&self, path: &str) -> Result<Secret>;

    /// Decode a raw fetched value. Most backends leave this as identity.
    fn deserialize(&self, raw: Secret) -> Result<Secret> {
        Ok(raw)
    }

    /// Fetch and decode the value at `path`.
    fn fetch(&self, path: &str) -> Result<Secret> {
        let raw = self.fetch_secret(path)?;
        self.deserialize(raw)
    }
}
