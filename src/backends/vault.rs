//! HashiCorp Vault KV backend.
//!
//! Reads secrets over the Vault HTTP API (`GET /v1/<path>`) and unwraps the
//! response's `data` object into named fields. Connection settings come from
//! the process environment at construction time.

use std::collections::BTreeMap;
use std::env;
use std::time::Duration;

use reqwest::blocking::Client;

use crate::backends::{Secret, SecretBackend};
use crate::constants;
use crate::error::{Error, Result};

#[derive(Debug)]
pub struct VaultBackend {
    addr: String,
    token: String,
    client: Client,
}

impl VaultBackend {
    /// Build a backend from `VAULT_ADDR` and `VAULT_TOKEN`.
    ///
    /// A missing setting fails here, before any fetch is attempted.
    pub fn new() -> Result<Self> {
        let addr = require_env(constants::VAULT_ADDR_ENV)?;
        let token = require_env(constants::VAULT_TOKEN_ENV)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::BackendSetting(format!("http client: {e}")))?;
        Ok(Self {
            addr: addr.trim_end_matches('/').to_string(),
            token,
            client,
        })
    }
}

fn require_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::BackendSetting(format!("{name} is not set")))
}

impl SecretBackend for VaultBackend {
    fn fetch_secret(&self, path: &str) -> Result<Secret> {
        let url = format!("{}/{}/{}", self.addr, constants::VAULT_API_PREFIX, path);
        let response = self
            .client
            .get(&url)
            .header("X-Vault-Token", &self.token)
            .send()
            .map_err(|e| Error::BackendFetch {
                path: path.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::BackendFetch {
                path: path.to_string(),
                message: format!("server returned {status}"),
            });
        }

        let body: serde_json::Value = response.json().map_err(|e| Error::BackendFetch {
            path: path.to_string(),
            message: format!("invalid response body: {e}"),
        })?;

        match body.get("data") {
            Some(serde_json::Value::Object(data)) => Ok(Secret::Fields(flatten_fields(data))),
            _ => Err(Error::BackendFetch {
                path: path.to_string(),
                message: "response has no 'data' object".to_string(),
            }),
        }
    }
}

/// String values pass through; anything else keeps its compact JSON form.
fn flatten_fields(data: &serde_json::Map<String, serde_json::Value>) -> BTreeMap<String, String> {
    data.iter()
        .map(|(k, v)| {
            let value = match v {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (k.clone(), value)
        })
        .collect()
}
