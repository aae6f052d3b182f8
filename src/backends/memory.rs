//! In-memory backend for tests and fixtures.

use std::collections::HashMap;

use crate::backends::{Secret, SecretBackend};
use crate::error::{Error, Result};

/// Backend over a seeded path → secret map. No ambient configuration.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    secrets: HashMap<String, Secret>,
}

impl MemoryBackend {
    pub fn new(secrets: HashMap<String, Secret>) -> Self {
        Self { secrets }
    }

    /// Seed a path with a secret, replacing any previous value.
    pub fn insert(&mut self, path: impl Into<String>, secret: Secret) -> &mut Self {
        self.secrets.insert(path.into(), secret);
        self
    }
}

impl SecretBackend for MemoryBackend {
    fn fetch_secret(&self, path: &str) -> Result<Secret> {
        match self.secrets.get(path) {
            Some(secret) => Ok(secret.clone()),
            None => Err(Error::BackendFetch {
                path: path.to_string(),
                message: "no secret at path".to_string(),
            }),
        }
    }
}
